//! Family and group headings of the classification listing.
//!
//! Group headings are found by a two-state scanner over the text lines:
//!
//! | state                 | input                                      | next                         |
//! |-----------------------|--------------------------------------------|------------------------------|
//! | `Scanning(i)`         | line opens a heading                       | `Composing(i, i, [])`        |
//! | `Scanning(i)`         | anything else                              | `Scanning(i + 1)`            |
//! | `Composing(s, i, ps)` | `ps` full, end of text, or line rejected   | `Scanning(s + 1)`            |
//! | `Composing(s, i, ps)` | joined parts end in `(page)`               | emit heading, `Scanning(i + 1)` |
//! | `Composing(s, i, ps)` | otherwise                                  | `Composing(s, i + 1, ps + line)` |
//!
//! A line opens a heading when it is not skippable, starts uppercase and
//! has a heading-shaped prefix. A line is rejected while composing when it
//! is skippable or its prefix is not heading-shaped.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::hierarchy::ParserOptions;

static ROMAN_NUMERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[ivxlcdm]+$").expect("valid roman numeral regex"));
static HEADING_PAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d{1,3})\)\s*$").expect("valid heading page regex"));
static HEADING_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z &'’/,–—\-()]+$").expect("valid heading prefix regex")
});
static HYPHEN_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-\s*\n").expect("valid hyphen break regex"));
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// A composed `"<Title> (<page>)"` heading.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Heading {
    pub title: String,
    pub page: u32,
}

impl Heading {
    pub fn new(title: impl Into<String>, page: u32) -> Self {
        Self {
            title: title.into(),
            page,
        }
    }
}

/// Where a composed heading belongs in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingTier {
    /// A known top-level family; becomes the current family.
    Family,
    /// A diagnostic group under the current family.
    Group,
    /// Neither.
    Ignored,
}

enum ScanState {
    Scanning {
        at: usize,
    },
    Composing {
        start: usize,
        at: usize,
        parts: Vec<String>,
    },
}

/// Locate each known family title followed by `(page)`.
///
/// Only the first occurrence of a title counts. Results are ordered by
/// page; titles with equal pages keep the configured order.
pub fn find_family_headings(text: &str, options: &ParserOptions) -> Vec<Heading> {
    let normalized = HYPHEN_BREAK.replace_all(text, "-");
    let normalized = WHITESPACE_RUN.replace_all(&normalized, " ");

    let mut families: Vec<Heading> = options
        .family_titles
        .iter()
        .filter_map(|title| {
            let pattern = format!(r"{}\s*\((\d{{1,4}})\)", regex::escape(title));
            let re = Regex::new(&pattern).ok()?;
            let caps = re.captures(&normalized)?;
            let page = caps[1].parse::<u32>().ok()?;
            Some(Heading::new(title.clone(), page))
        })
        .collect();
    families.sort_by_key(|h| h.page);
    families
}

/// Run the heading scanner over the lines of `text`.
///
/// Returns every composed heading in document order, whatever its tier.
pub fn scan_headings(text: &str, options: &ParserOptions) -> Vec<Heading> {
    let lines: Vec<&str> = text.lines().collect();
    let mut headings = Vec::new();
    let mut state = ScanState::Scanning { at: 0 };

    loop {
        state = match state {
            ScanState::Scanning { at } if at >= lines.len() => break,
            ScanState::Scanning { at } => {
                if opens_heading(lines[at], options) {
                    ScanState::Composing {
                        start: at,
                        at,
                        parts: Vec::new(),
                    }
                } else {
                    ScanState::Scanning { at: at + 1 }
                }
            }
            ScanState::Composing { start, at, mut parts } => {
                let accepted = at < lines.len()
                    && parts.len() < options.max_heading_lines
                    && continues_heading(lines[at], options);
                if !accepted {
                    ScanState::Scanning { at: start + 1 }
                } else {
                    parts.push(lines[at].trim().to_string());
                    let joined = join_heading_parts(&parts);
                    let candidate = WHITESPACE_RUN.replace_all(&joined, " ").trim().to_string();
                    match split_heading(&candidate) {
                        Some((title, Some(page))) => {
                            headings.push(Heading::new(title, page));
                            ScanState::Scanning { at: at + 1 }
                        }
                        // A bare "(page)" with no title.
                        Some((_, None)) => ScanState::Scanning { at: at + 1 },
                        None => ScanState::Composing {
                            start,
                            at: at + 1,
                            parts,
                        },
                    }
                }
            }
        };
    }
    headings
}

/// Join heading lines with spaces; a part ending in `-` is a broken word
/// and joins the next part directly.
fn join_heading_parts(parts: &[String]) -> String {
    let mut joined = String::new();
    for part in parts {
        if !joined.is_empty() && !joined.ends_with('-') {
            joined.push(' ');
        }
        joined.push_str(part);
    }
    joined
}

/// Split `"<Title> (<page>)"`. Returns `Some((title, None))` when the marker
/// matched but the title is empty or the page unparsable.
fn split_heading(candidate: &str) -> Option<(String, Option<u32>)> {
    let caps = HEADING_PAGE.captures(candidate)?;
    let marker = caps.get(0)?;
    let title = candidate[..marker.start()].trim();
    if title.is_empty() {
        return Some((String::new(), None));
    }
    Some((title.to_string(), caps[1].parse::<u32>().ok()))
}

/// Decide the tier of a heading given the current family context.
pub fn resolve_tier(
    title: &str,
    current_family: Option<&str>,
    options: &ParserOptions,
) -> HeadingTier {
    if options.is_family(title) {
        return HeadingTier::Family;
    }
    if current_family.is_none() || title.chars().any(char::is_numeric) {
        return HeadingTier::Ignored;
    }
    let words = title
        .split(|c: char| !c.is_ascii_alphabetic())
        .filter(|w| !w.is_empty())
        .count();
    if words >= 2 || options.single_word_groups.iter().any(|g| g == title) {
        HeadingTier::Group
    } else {
        HeadingTier::Ignored
    }
}

/// Scan headings and file group headings under their family.
///
/// Keys are family titles; groups keep document order.
pub fn find_group_headings(
    text: &str,
    options: &ParserOptions,
) -> BTreeMap<String, Vec<Heading>> {
    let mut groups: BTreeMap<String, Vec<Heading>> = BTreeMap::new();
    let mut current_family: Option<String> = None;
    for heading in scan_headings(text, options) {
        match resolve_tier(&heading.title, current_family.as_deref(), options) {
            HeadingTier::Family => current_family = Some(heading.title),
            HeadingTier::Group => {
                if let Some(family) = &current_family {
                    groups.entry(family.clone()).or_default().push(heading);
                }
            }
            HeadingTier::Ignored => {}
        }
    }
    groups
}

fn is_skippable(line: &str, options: &ParserOptions) -> bool {
    let stripped = line.trim();
    stripped.is_empty()
        || ROMAN_NUMERAL.is_match(stripped)
        || stripped.contains(options.section_banner.as_str())
}

/// The text before the first `(` must look like words, with no stray `)`.
fn has_heading_prefix(line: &str) -> bool {
    let stripped = line.trim();
    let prefix = stripped
        .split_once('(')
        .map_or(stripped, |(prefix, _)| prefix)
        .trim();
    prefix.is_empty() || (!prefix.contains(')') && HEADING_PREFIX.is_match(prefix))
}

fn opens_heading(line: &str, options: &ParserOptions) -> bool {
    !is_skippable(line, options)
        && line.trim().chars().next().is_some_and(char::is_uppercase)
        && has_heading_prefix(line)
}

fn continues_heading(line: &str, options: &ParserOptions) -> bool {
    !is_skippable(line, options) && has_heading_prefix(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ParserOptions {
        ParserOptions::default()
    }

    // --- families ---

    #[test]
    fn test_family_titles_found_across_lines() {
        let text = "Obsessive-\nCompulsive and Related Disorders (235)\nDepressive Disorders\n(155)";
        let families = find_family_headings(text, &options());
        assert_eq!(
            families,
            vec![
                Heading::new("Depressive Disorders", 155),
                Heading::new("Obsessive-Compulsive and Related Disorders", 235),
            ]
        );
    }

    #[test]
    fn test_family_first_occurrence_only() {
        let text = "Anxiety Disorders (189)\nAnxiety Disorders (999)";
        let families = find_family_headings(text, &options());
        assert_eq!(families, vec![Heading::new("Anxiety Disorders", 189)]);
    }

    // --- scanner transitions ---

    #[test]
    fn test_single_line_heading() {
        let headings = scan_headings("Depressive Disorders (155)", &options());
        assert_eq!(headings, vec![Heading::new("Depressive Disorders", 155)]);
    }

    #[test]
    fn test_multi_line_heading() {
        let text = "Schizophrenia Spectrum and Other\nPsychotic Disorders (87)";
        let headings = scan_headings(text, &options());
        assert_eq!(
            headings,
            vec![Heading::new("Schizophrenia Spectrum and Other Psychotic Disorders", 87)]
        );
    }

    #[test]
    fn test_composition_gives_up_after_max_lines() {
        let text = "Alpha one\nBeta two\nGamma three\nDelta four\nEpsilon five (12)";
        let headings = scan_headings(text, &options());
        assert_eq!(
            headings,
            vec![Heading::new("Beta two Gamma three Delta four Epsilon five", 12)]
        );
    }

    #[test]
    fn test_roman_numeral_breaks_composition() {
        let text = "Substance-Related\nxiv\nDisorders (481)";
        let headings = scan_headings(text, &options());
        assert_eq!(headings, vec![Heading::new("Disorders", 481)]);
    }

    #[test]
    fn test_banner_and_blank_lines_skipped() {
        let text = "DSM-5 Classification (10)\n\nBipolar and Related Disorders (123)";
        let headings = scan_headings(text, &options());
        assert_eq!(headings, vec![Heading::new("Bipolar and Related Disorders", 123)]);
    }

    #[test]
    fn test_prefix_guards() {
        // digits before the page marker
        assert!(scan_headings("Major Depressive Disorder 296 (94)", &options()).is_empty());
        // stray closing paren
        assert!(scan_headings("Other) Disorders (12)", &options()).is_empty());
        // lowercase start
        assert!(scan_headings("with anxious distress (12)", &options()).is_empty());
        // code lines never open a heading
        assert!(scan_headings("296.21 (F32.0) Major Depressive Disorder (94)", &options()).is_empty());
    }

    // --- tier resolution ---

    #[test]
    fn test_tier_resolution() {
        let opts = options();
        assert_eq!(resolve_tier("Depressive Disorders", None, &opts), HeadingTier::Family);
        assert_eq!(
            resolve_tier("Intellectual Disabilities", Some("Neurodevelopmental Disorders"), &opts),
            HeadingTier::Group
        );
        assert_eq!(resolve_tier("Intellectual Disabilities", None, &opts), HeadingTier::Ignored);
        assert_eq!(
            resolve_tier("Parasomnias", Some("Sleep-Wake Disorders"), &opts),
            HeadingTier::Group
        );
        assert_eq!(
            resolve_tier("Narcolepsy", Some("Sleep-Wake Disorders"), &opts),
            HeadingTier::Ignored
        );
        assert_eq!(
            resolve_tier("Type 2 Disorders", Some("Sleep-Wake Disorders"), &opts),
            HeadingTier::Ignored
        );
    }

    #[test]
    fn test_groups_filed_under_current_family() {
        let text = "Orphan Group Heading (5)\n\
                    Neurodevelopmental Disorders (31)\n\
                    Intellectual Disabilities (33)\n\
                    Communication Disorders (41)\n\
                    Sleep-Wake Disorders (361)\n\
                    Parasomnias (399)";
        let groups = find_group_headings(text, &options());
        assert_eq!(groups.len(), 2);
        assert_eq!(
            groups["Neurodevelopmental Disorders"],
            vec![
                Heading::new("Intellectual Disabilities", 33),
                Heading::new("Communication Disorders", 41),
            ]
        );
        assert_eq!(groups["Sleep-Wake Disorders"], vec![Heading::new("Parasomnias", 399)]);
    }

    #[test]
    fn test_hyphen_broken_heading_joins_without_space() {
        let text = "Obsessive-\nCompulsive and Related Disorders (235)";
        let headings = scan_headings(text, &options());
        assert_eq!(
            headings,
            vec![Heading::new("Obsessive-Compulsive and Related Disorders", 235)]
        );
    }

    #[test]
    fn test_hyphen_broken_family_switches_context() {
        let text = "Anxiety Disorders (189)\n\
                    Panic Attack Group (210)\n\
                    Obsessive-\n\
                    Compulsive and Related Disorders (235)\n\
                    Body Dysmorphic Group (242)";
        let groups = find_group_headings(text, &options());
        assert_eq!(groups["Anxiety Disorders"], vec![Heading::new("Panic Attack Group", 210)]);
        assert_eq!(
            groups["Obsessive-Compulsive and Related Disorders"],
            vec![Heading::new("Body Dysmorphic Group", 242)]
        );
    }

    #[test]
    fn test_family_page_marker_is_bounded() {
        assert!(find_family_headings("Depressive Disorders (4294967295)", &options()).is_empty());
    }
}
