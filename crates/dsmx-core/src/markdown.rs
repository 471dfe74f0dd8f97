//! Markdown rendering of extracted pages.
//!
//! The page texts go through the same normalization as the plain-text
//! document, then each line is classified (disorder heading, section
//! heading, criterion letter, note, numbered item, specifier bullet) and
//! emitted as GitHub Flavored Markdown. Tables found on the pages are
//! appended at the end as GFM tables.

use std::sync::LazyLock;

use regex::Regex;

use crate::document::{cleanup_blank_lines, prepare_text};
use crate::page::PageRecord;
use crate::tables::TableBlock;

/// Section headings rendered at level 2.
const H2_HEADINGS: [&str; 4] = [
    "Diagnostic Criteria",
    "Coding and Recording Procedures",
    "Recording the Diagnosis Name",
    "Specifiers",
];

/// Section headings rendered at level 3.
const H3_HEADINGS: [&str; 2] = ["Severity / Course Specifiers", "Specify if:"];

/// The H3 heading that opens a bullet list of specifier options.
const SPECIFY_LIST_HEADING: &str = "Specify if:";

static SEVERITY_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(Mild|Moderate|Severe|With|In)\b").expect("valid severity prefix regex")
});
static DISORDER_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z][A-Za-z].*(Disorder|Disorders)\b$").expect("valid disorder title regex")
});
static CRITERION_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]\.$").expect("valid criterion letter regex"));
static NOTE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Note:\s*").expect("valid note prefix regex"));
static NUMBERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s+").expect("valid numbered item regex"));
static LIST_LEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+\.\s+)([^,.;:]+)(.*)$").expect("valid list lead regex")
});
static SPECIFIER_OPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(With|Without|In)\b").expect("valid specifier option regex")
});

/// Longest numbered-item lead (in words) that is rendered bold.
const MAX_BOLD_LEAD_WORDS: usize = 6;

/// How a single non-blank line is rendered.
#[derive(Debug, Clone, PartialEq)]
enum MarkdownLine<'a> {
    Heading { level: u8, text: &'a str },
    Criterion(&'a str),
    Note(&'a str),
    Footnote(&'a str),
    Numbered(&'a str),
    Plain(&'a str),
}

impl<'a> MarkdownLine<'a> {
    fn classify(line: &'a str) -> Self {
        if is_disorder_heading(line) {
            MarkdownLine::Heading { level: 1, text: line }
        } else if H2_HEADINGS.contains(&line) {
            MarkdownLine::Heading { level: 2, text: line }
        } else if H3_HEADINGS.contains(&line) {
            MarkdownLine::Heading { level: 3, text: line }
        } else if CRITERION_LETTER.is_match(line) {
            MarkdownLine::Criterion(line)
        } else if let Some(m) = NOTE_PREFIX.find(line) {
            MarkdownLine::Note(&line[m.end()..])
        } else if line.starts_with("Connected footnote") {
            MarkdownLine::Footnote(line)
        } else if NUMBERED_ITEM.is_match(line) {
            MarkdownLine::Numbered(line)
        } else {
            MarkdownLine::Plain(line)
        }
    }
}

/// Renderer state carried from one line to the next.
#[derive(Debug, Default)]
struct MarkdownWriter {
    out: Vec<String>,
    in_blockquote: bool,
    in_specify_list: bool,
}

impl MarkdownWriter {
    fn push_block(&mut self, text: String) {
        self.out.push(String::new());
        self.out.push(text);
        self.out.push(String::new());
    }

    fn write_line(&mut self, line: &str) {
        if line.is_empty() {
            self.out.push(String::new());
            self.in_blockquote = false;
            self.in_specify_list = false;
            return;
        }

        match MarkdownLine::classify(line) {
            MarkdownLine::Heading { level, text } => {
                self.push_block(format!("{} {text}", "#".repeat(level as usize)));
                self.in_blockquote = false;
                if level == 3 {
                    self.in_specify_list = text == SPECIFY_LIST_HEADING;
                }
            }
            MarkdownLine::Criterion(text) => {
                self.push_block(format!("### {text}"));
                self.in_blockquote = false;
                self.in_specify_list = false;
            }
            MarkdownLine::Note(body) => {
                self.out.push(format!("> **Note:** {body}").trim_end().to_string());
                self.in_blockquote = true;
                self.in_specify_list = false;
            }
            MarkdownLine::Footnote(text) => {
                self.out.push(format!("> {text}"));
                self.in_blockquote = true;
                self.in_specify_list = false;
            }
            MarkdownLine::Numbered(text) => {
                self.out.push(bold_list_lead(text));
                self.in_blockquote = false;
                self.in_specify_list = false;
            }
            MarkdownLine::Plain(text) => {
                if self.in_specify_list && SPECIFIER_OPTION.is_match(text) {
                    self.out.push(format!("- {text}"));
                } else if self.in_blockquote {
                    self.out.push(format!("> {text}"));
                } else {
                    self.out.push(text.to_string());
                }
            }
        }
    }

    fn write_table(&mut self, table: &TableBlock) {
        let rows = table_to_gfm(&table.rows);
        if rows.is_empty() {
            return;
        }
        self.out.push(String::new());
        self.out.push("### Table".to_string());
        self.out.extend(rows);
        self.out.push(String::new());
    }

    fn finish(self) -> String {
        cleanup_blank_lines(&self.out.join("\n"))
    }
}

/// Render extracted pages as Markdown.
///
/// All page texts are joined and normalized first; tables from every page
/// follow the text, in page order.
pub fn format_markdown(pages: &[PageRecord]) -> String {
    let raw = pages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let text = prepare_text(&raw);

    let mut writer = MarkdownWriter::default();
    for line in text.lines() {
        writer.write_line(line.trim());
    }
    writer.out.push(String::new());
    for table in pages.iter().flat_map(|p| p.tables.iter()) {
        writer.write_table(table);
    }
    writer.finish()
}

/// Whether a line is the title of a disorder (or disorder family).
///
/// Cross references (`"(p. 123)"`) and severity/specifier lines that happen
/// to end in "Disorder" are rejected.
pub fn is_disorder_heading(line: &str) -> bool {
    if line.contains("(p.") || line.contains("(pp.") {
        return false;
    }
    if SEVERITY_PREFIX.is_match(line) {
        return false;
    }
    DISORDER_TITLE.is_match(line)
}

/// Bold the lead phrase of a numbered item when it is short.
pub fn bold_list_lead(line: &str) -> String {
    let Some(caps) = LIST_LEAD.captures(line) else {
        return line.to_string();
    };
    let lead = caps[2].trim();
    if lead.split_whitespace().count() > MAX_BOLD_LEAD_WORDS {
        return line.to_string();
    }
    format!("{}**{lead}**{}", &caps[1], &caps[3])
}

/// Convert table rows to GFM lines; the first row is the header.
///
/// Ragged rows are padded with empty cells up to the widest row.
pub fn table_to_gfm(rows: &[Vec<String>]) -> Vec<String> {
    let Some(width) = rows.iter().map(Vec::len).max() else {
        return Vec::new();
    };

    let render = |cells: Vec<String>| format!("| {} |", cells.join(" | "));
    let normalized = rows.iter().map(|row| {
        let mut cells: Vec<String> = row
            .iter()
            .map(|cell| cell.replace('|', "\\|").trim().to_string())
            .collect();
        cells.resize(width, String::new());
        cells
    });

    let mut lines = Vec::with_capacity(rows.len() + 1);
    for (i, cells) in normalized.enumerate() {
        lines.push(render(cells));
        if i == 0 {
            lines.push(render(vec!["---".to_string(); width]));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::ColumnMode;
    use crate::geometry::BBox;
    use crate::page::PageDebug;
    use std::collections::BTreeSet;

    fn make_page(text: &str, tables: Vec<TableBlock>) -> PageRecord {
        PageRecord {
            page: 1,
            text: text.to_string(),
            headers: BTreeSet::new(),
            footers: BTreeSet::new(),
            debug: PageDebug {
                column_mode: ColumnMode::One,
                num_words: 0,
                num_tables: tables.len(),
            },
            tables,
        }
    }

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    // --- line classification ---

    #[test]
    fn test_disorder_heading_detection() {
        assert!(is_disorder_heading("Major Depressive Disorder"));
        assert!(is_disorder_heading("Depressive Disorders"));
        assert!(!is_disorder_heading("Mild Neurocognitive Disorder"));
        assert!(!is_disorder_heading("With Panic Disorder"));
        assert!(!is_disorder_heading("Major Depressive Disorder (p. 160)"));
        assert!(!is_disorder_heading("the disorder"));
    }

    #[test]
    fn test_bold_list_lead() {
        assert_eq!(
            bold_list_lead("1. Depressed mood, most of the day."),
            "1. **Depressed mood**, most of the day."
        );
        assert_eq!(
            bold_list_lead("2. A very long lead phrase that keeps on going, then"),
            "2. A very long lead phrase that keeps on going, then"
        );
        assert_eq!(bold_list_lead("not a list item"), "not a list item");
    }

    // --- tables ---

    #[test]
    fn test_table_to_gfm_pads_ragged_rows() {
        let lines = table_to_gfm(&rows(&[&["Severity", "Criteria"], &["Mild"], &["A|B", " x "]]));
        assert_eq!(
            lines,
            vec![
                "| Severity | Criteria |",
                "| --- | --- |",
                "| Mild |  |",
                "| A\\|B | x |",
            ]
        );
    }

    #[test]
    fn test_table_to_gfm_empty() {
        assert!(table_to_gfm(&[]).is_empty());
    }

    // --- full rendering ---

    #[test]
    fn test_format_markdown_structure() {
        let text = "Major Depressive Disorder\nDiagnostic Criteria\nA.\n1. Depressed mood, most days.\nNote: In children\nirritable mood.\n\nSpecify if:\nWith anxious distress\nplain line";
        let md = format_markdown(&[make_page(text, Vec::new())]);
        assert_eq!(
            md,
            "# Major Depressive Disorder\n\n\n## Diagnostic Criteria\n\n\n### A.\n\n1. **Depressed mood**, most days.\n> **Note:** In children\n> irritable mood.\n\n\n### Specify if:\n\n- With anxious distress\nplain line"
                .replace("\n\n\n", "\n\n")
        );
    }

    #[test]
    fn test_format_markdown_appends_tables() {
        let table = TableBlock {
            bbox: BBox::new(0.0, 0.0, 10.0, 10.0),
            rows: rows(&[&["Level", "Text"], &["Mild", "Few"]]),
        };
        let md = format_markdown(&[make_page("Some text", vec![table])]);
        assert_eq!(
            md,
            "Some text\n\n### Table\n| Level | Text |\n| --- | --- |\n| Mild | Few |"
        );
    }

    #[test]
    fn test_blank_line_resets_blockquote() {
        let md = format_markdown(&[make_page("Note: first\nmore\n\nafter", Vec::new())]);
        assert_eq!(md, "> **Note:** first\n> more\n\nafter");
    }
}
