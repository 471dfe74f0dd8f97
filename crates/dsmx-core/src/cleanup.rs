//! Cosmetic normalization of assembled page text.
//!
//! Joins words split across lines by a trailing hyphen, re-flows soft line
//! breaks inside sentences, and collapses whitespace. Headings, lettered and
//! numbered list items always start on their own line.

use std::sync::LazyLock;

use regex::Regex;

static HYPHEN_WORD_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z])-[ \t]*\n\s*([a-z])").expect("valid hyphen word break regex")
});
static HYPHEN_COMPOUND_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-[ \t]*\n\s*").expect("valid hyphen compound regex"));
static LETTERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]\.\s+").expect("valid lettered item regex"));
static NUMBERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s+").expect("valid numbered item regex"));
static EXCESS_BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid blank line regex"));
static INLINE_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").expect("valid inline space regex"));
static LEADING_LINE_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]+").expect("valid leading space regex"));

/// Run every cleanup pass over raw page text.
pub fn clean_page_text(raw: &str) -> String {
    let text = raw.replace('\r', "");
    let text = join_hyphenated_breaks(&text);
    let text = join_soft_line_breaks(&text);
    let text = EXCESS_BLANK_LINES.replace_all(&text, "\n\n");
    let text = INLINE_SPACES.replace_all(&text, " ");
    let text = LEADING_LINE_SPACES.replace_all(&text, "\n");
    text.trim().to_string()
}

/// Join words broken by a line-final hyphen.
///
/// `"develop-\nmental"` becomes `"developmental"`. When the continuation does
/// not start with a lowercase letter the hyphen is kept (`"Obsessive-\nCompulsive"`
/// becomes `"Obsessive-Compulsive"`).
pub fn join_hyphenated_breaks(text: &str) -> String {
    let text = HYPHEN_WORD_BREAK.replace_all(text, "$1$2");
    HYPHEN_COMPOUND_BREAK.replace_all(&text, "-").into_owned()
}

/// Re-flow soft line breaks.
///
/// A line is appended to the previous one with a space when the previous
/// line is not an all-caps heading and does not end in `. : ; ? !`, and the
/// line itself starts lowercase and is not a list item. Blank lines become
/// paragraph breaks.
pub fn join_soft_line_breaks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<&str> = None;
    let mut blank = false;
    for line in text.split('\n').map(str::trim) {
        if line.is_empty() {
            blank = true;
            continue;
        }
        match prev {
            None => {}
            Some(_) if blank => out.push_str("\n\n"),
            Some(p) if continues_sentence(p, line) => out.push(' '),
            Some(_) => out.push('\n'),
        }
        out.push_str(line);
        prev = Some(line);
        blank = false;
    }
    out
}

fn continues_sentence(prev: &str, line: &str) -> bool {
    !is_mostly_upper(prev)
        && !is_list_item(line)
        && !prev.ends_with(['.', ':', ';', '?', '!'])
        && line.chars().next().is_some_and(char::is_lowercase)
}

/// At least eight letters, more than three quarters of them uppercase.
fn is_mostly_upper(line: &str) -> bool {
    let letters: Vec<char> = line.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() < 8 {
        return false;
    }
    let upper = letters.iter().filter(|c| c.is_uppercase()).count();
    upper as f64 / letters.len() as f64 > 0.75
}

fn is_list_item(line: &str) -> bool {
    LETTERED_ITEM.is_match(line) || NUMBERED_ITEM.is_match(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- hyphens ---

    #[test]
    fn test_hyphen_word_break_is_joined() {
        assert_eq!(join_hyphenated_breaks("neurodevelop-\n  mental"), "neurodevelopmental");
    }

    #[test]
    fn test_hyphen_compound_break_keeps_hyphen() {
        assert_eq!(
            join_hyphenated_breaks("Obsessive-\nCompulsive and Related"),
            "Obsessive-Compulsive and Related"
        );
    }

    // --- soft breaks ---

    #[test]
    fn test_soft_break_joins_lowercase_continuation() {
        assert_eq!(
            join_soft_line_breaks("symptoms have been present\nduring the same period."),
            "symptoms have been present during the same period."
        );
    }

    #[test]
    fn test_sentence_end_blocks_join() {
        assert_eq!(
            join_soft_line_breaks("First sentence.\nsecond line"),
            "First sentence.\nsecond line"
        );
    }

    #[test]
    fn test_list_items_start_new_lines() {
        let text = "A. Five symptoms\nB. The symptoms cause distress\n1. Depressed mood\nmost of the day";
        assert_eq!(
            join_soft_line_breaks(text),
            "A. Five symptoms\nB. The symptoms cause distress\n1. Depressed mood most of the day"
        );
    }

    #[test]
    fn test_uppercase_heading_is_not_continued() {
        assert_eq!(
            join_soft_line_breaks("DIAGNOSTIC CRITERIA\nfor the disorder"),
            "DIAGNOSTIC CRITERIA\nfor the disorder"
        );
    }

    #[test]
    fn test_blank_lines_become_paragraphs() {
        assert_eq!(
            join_soft_line_breaks("\n\nHeading (94)\n\n\n\nA. Five\n"),
            "Heading (94)\n\nA. Five"
        );
    }

    // --- full pipeline ---

    #[test]
    fn test_clean_page_text() {
        let raw = "Major Depressive Disorder (94)\r\n\nA. Five (or more)   symptoms have\n   been present during the same 2-\nweek period.";
        assert_eq!(
            clean_page_text(raw),
            "Major Depressive Disorder (94)\n\nA. Five (or more) symptoms have been present during the same 2-week period."
        );
    }

    #[test]
    fn test_clean_empty() {
        assert_eq!(clean_page_text("  \n\n "), "");
    }
}
