//! Plain-text document formatting of extracted pages.
//!
//! A fixed sequence of string rewrites turns the concatenated page texts
//! into a readable document: codes are compacted, running headers dropped,
//! spacing normalized, and criteria, numbered items and notes broken onto
//! their own paragraphs.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::page::PageRecord;

static HYPHEN_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-\s*\n\s*").expect("valid hyphen break regex"));
static ICD_IN_PARENS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(\s*F\s*([0-9][0-9.\s]*)\)").expect("valid parenthesized ICD regex")
});
static ICD_BARE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bF\s*([0-9][0-9.\s]*[0-9])\b").expect("valid bare ICD regex")
});
static RUNNING_HEADERS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"^\s*\d{1,4}\s+[A-Z][A-Za-z].*(Disorder|Disorders)\s*$")
            .expect("valid leading page header regex"),
        Regex::new(r"^\s*[A-Z][A-Za-z].*(Disorder|Disorders)\s+\d{1,4}\s*$")
            .expect("valid trailing page header regex"),
    ]
});
static INLINE_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").expect("valid inline space regex"));
static SPACE_AROUND_NEWLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" ?\n ?").expect("valid newline space regex"));
static PUNCT_BEFORE_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([,;:])(\S)").expect("valid punctuation spacing regex"));
static GLUED_PAREN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z0-9])\(").expect("valid glued paren regex"));
static SPACE_BEFORE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([,.;:!?])").expect("valid punctuation regex"));
static SPACE_AFTER_OPEN_PAREN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s+").expect("valid open paren regex"));
static SPACE_BEFORE_CLOSE_PAREN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+\)").expect("valid close paren regex"));
static SPACED_LETTERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:[A-Za-z][ \t]){2,}[A-Za-z]").expect("valid spaced letters regex")
});
static SPACED_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\d[ \t])+\d").expect("valid spaced digits regex"));
static LOWER_UPPER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])([A-Z])").expect("valid case glue regex"));
static LOWER_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])(\d)").expect("valid letter digit glue regex"));
static DIGIT_UPPER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d)([A-Z][a-z])").expect("valid digit letter glue regex"));
static DISORDER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n([A-Z][A-Za-z][^\n]*(?:Disorder|Disorders)\b)").expect("valid disorder line regex")
});
static NOTE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*(Note:)\s*").expect("valid note regex"));
static LETTERED_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*([A-Z])\.\s*").expect("valid lettered marker regex"));
static CRITERIA_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bCriteria\s+([A-Z])\s*[–-]\s*([A-Z])\b").expect("valid criteria range regex")
});
static NUMBERED_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\b\d{1,2})\.\s*").expect("valid numbered marker regex"));
static NUMBERED_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[ \t]*(\b\d{1,2})\.\s*").expect("valid numbered break regex")
});
static CODING_SECTIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*(Coding and Recording Procedures|Recording Procedures)\s*")
        .expect("valid coding section regex")
});
static SPECIFY_SECTIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*(Specify if:|Specify:)\s*").expect("valid specify regex"));
static EXCESS_BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid blank line regex"));

/// Format extracted pages as a plain-text document.
pub fn format_document(pages: &[PageRecord]) -> String {
    let raw = pages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    format_document_text(&raw)
}

/// Run every document pass over already concatenated text.
pub fn format_document_text(raw: &str) -> String {
    let text = prepare_text(raw);
    let text = insert_section_breaks(&text);
    let text = format_lettered_criteria(&text);
    let text = format_numbered_list(&text);
    let text = format_notes_and_coding(&text);
    cleanup_blank_lines(&text)
}

/// The normalization passes shared by the document and Markdown formatters.
pub fn prepare_text(raw: &str) -> String {
    let text = fix_hyphen_linebreaks(raw);
    let text = normalize_icd_codes(&text);
    let text = remove_running_headers(&text);
    let text = normalize_spaces(&text);
    let text = collapse_spaced_letters(&text);
    deglue_common_collapses(&text)
}

pub fn fix_hyphen_linebreaks(text: &str) -> String {
    HYPHEN_BREAK.replace_all(text, "").into_owned()
}

/// Remove whitespace inside ICD-10 codes: `"( F 32. 0 )"` becomes `"(F32.0)"`.
pub fn normalize_icd_codes(text: &str) -> String {
    let compact = |code: &str| code.split_whitespace().collect::<String>();
    let text = ICD_IN_PARENS.replace_all(text, |caps: &Captures| {
        format!("(F{})", compact(&caps[1]))
    });
    ICD_BARE
        .replace_all(&text, |caps: &Captures| format!("F{}", compact(&caps[1])))
        .into_owned()
}

/// Drop lines shaped like a running header: a page number before or after
/// a "... Disorder(s)" title.
pub fn remove_running_headers(text: &str) -> String {
    text.lines()
        .filter(|line| {
            let trimmed = line.trim();
            !RUNNING_HEADERS.iter().any(|re| re.is_match(trimmed))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn normalize_spaces(text: &str) -> String {
    let text = INLINE_SPACES.replace_all(text, " ");
    let text = SPACE_AROUND_NEWLINE.replace_all(&text, "\n");
    let text = PUNCT_BEFORE_TEXT.replace_all(&text, "$1 $2");
    let text = GLUED_PAREN.replace_all(&text, "$1 (");
    let text = SPACE_BEFORE_PUNCT.replace_all(&text, "$1");
    let text = SPACE_AFTER_OPEN_PAREN.replace_all(&text, "(");
    let text = SPACE_BEFORE_CLOSE_PAREN.replace_all(&text, ")");
    text.trim().to_string()
}

/// Collapse letter-spaced words (`"D S M"`) and digit runs (`"1 2 3"`).
///
/// A run is only collapsed when it is not glued to a word character on
/// either side; when the character after the run is a word character the
/// final letter is left out of the run.
pub fn collapse_spaced_letters(text: &str) -> String {
    let text = collapse_runs(text, &SPACED_LETTERS, 3, |c| c.is_alphanumeric() || c == '_');
    collapse_runs(&text, &SPACED_DIGITS, 2, |c| c.is_ascii_digit())
}

/// Replace each run matched by `re` with its collapsed form.
///
/// `glued` decides whether a neighbouring character blocks the collapse.
fn collapse_runs(text: &str, re: &Regex, min_units: usize, glued: fn(char) -> bool) -> String {
    re.replace_all(text, |caps: &Captures| {
        let Some(m) = caps.get(0) else {
            return String::new();
        };
        let before = text[..m.start()].chars().next_back().is_some_and(glued);
        let after = text[m.end()..].chars().next().is_some_and(glued);
        collapse_run(m.as_str(), before, after, min_units)
    })
    .into_owned()
}

/// Collapse one run of single-character units separated by one blank each.
///
/// A unit glued on the left is left out of the run, as is a unit glued on
/// the right. Runs shorter than `min_units` after that stay as they are.
fn collapse_run(run: &str, before_glued: bool, after_glued: bool, min_units: usize) -> String {
    let units = run.chars().filter(|c| !c.is_whitespace()).count();
    if before_glued {
        let Some((sep, sep_char)) = run.char_indices().find(|(_, c)| c.is_whitespace()) else {
            return run.to_string();
        };
        let rest = sep + sep_char.len_utf8();
        if units - 1 < min_units {
            return run.to_string();
        }
        return format!(
            "{}{}",
            &run[..rest],
            collapse_run(&run[rest..], false, after_glued, min_units)
        );
    }
    if !after_glued {
        return run.chars().filter(|c| !c.is_whitespace()).collect();
    }
    if units - 1 < min_units {
        return run.to_string();
    }
    let last_sep = run
        .char_indices()
        .filter(|(_, c)| c.is_whitespace())
        .map(|(i, _)| i)
        .last()
        .unwrap_or(run.len());
    let head: String = run[..last_sep].chars().filter(|c| !c.is_whitespace()).collect();
    format!("{head}{}", &run[last_sep..])
}

/// Split words glued by lost spaces: `"disorderMajor"`, `"episode2"`, `"94Major"`.
///
/// ICD-10 codes (`"F32"`) and ordinals (`"5th"`) are left alone.
pub fn deglue_common_collapses(text: &str) -> String {
    let text = LOWER_UPPER.replace_all(text, "$1 $2");
    let text = LOWER_DIGIT.replace_all(&text, "$1 $2");
    DIGIT_UPPER.replace_all(&text, "$1 $2").into_owned()
}

/// Blank line before lines naming a disorder and before each `Note:`.
pub fn insert_section_breaks(text: &str) -> String {
    let text = DISORDER_LINE.replace_all(text, "\n\n$1");
    NOTE_MARKER.replace_all(&text, "\n\n$1 ").into_owned()
}

/// Put each lettered criterion marker on its own paragraph line.
pub fn format_lettered_criteria(text: &str) -> String {
    let text = LETTERED_MARKER.replace_all(text, "\n\n$1.\n");
    CRITERIA_RANGE
        .replace_all(&text, "Criteria $1\u{2013}$2")
        .into_owned()
}

/// Normalize `"1."` markers and start each on a new paragraph.
pub fn format_numbered_list(text: &str) -> String {
    let text = NUMBERED_MARKER.replace_all(text, "$1. ");
    NUMBERED_BREAK
        .replace_all(&text, |caps: &Captures| {
            let Some(m) = caps.get(0) else {
                return String::new();
            };
            if m.start() == 0 || text[..m.start()].ends_with('\n') {
                m.as_str().to_string()
            } else {
                format!("\n\n{}. ", &caps[1])
            }
        })
        .into_owned()
}

pub fn format_notes_and_coding(text: &str) -> String {
    let text = CODING_SECTIONS.replace_all(text, "\n\n$1\n");
    SPECIFY_SECTIONS.replace_all(&text, "\n\n$1\n").into_owned()
}

pub fn cleanup_blank_lines(text: &str) -> String {
    EXCESS_BLANK_LINES
        .replace_all(text, "\n\n")
        .trim()
        .to_string()
}
