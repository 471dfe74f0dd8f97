//! Disorder entries of the shape `<code> (<ICD-10>) <Name> (<page>)`.

use std::sync::LazyLock;

use regex::Regex;

use crate::hierarchy::ParserOptions;
use crate::specifiers::{CODE_PATTERN, SpecifierBlock, parse_specifier_blocks};

static ENTRY_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"({CODE_PATTERN})\s+\(([^)]+)\)\s+")).expect("valid entry head regex")
});
static ENTRY_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\n\s*{CODE_PATTERN}\s+\(")).expect("valid entry boundary regex")
});
static PAGE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d{1,3})\)").expect("valid page marker regex"));
static HYPHEN_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-\s*\n\s*").expect("valid hyphen break regex"));
static INLINE_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").expect("valid inline space regex"));

/// One coded disorder line from the classification listing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DisorderEntry {
    /// ICD-9-CM code, or the `___.__` placeholder.
    pub icd9_code: String,
    /// ICD-10-CM code as printed inside the parentheses.
    pub icd10_code: String,
    pub name: String,
    /// Page the entry refers to.
    pub page: u32,
    pub specifiers: Vec<SpecifierBlock>,
}

struct RawEntry<'t> {
    start: usize,
    end: usize,
    icd9: &'t str,
    icd10: &'t str,
    name: &'t str,
    page: u32,
}

/// Extract disorder entries from classification text, in document order.
///
/// An entry's name runs from its code head up to the first `(page)` marker,
/// and may span lines but never crosses the start of the next code line.
/// The text between an entry and the next one is parsed for specifier
/// blocks. Names containing the section banner or starting with
/// "specify"/"note" are discarded as noise.
pub fn extract_disorder_entries(text: &str, options: &ParserOptions) -> Vec<DisorderEntry> {
    let normalized = normalize_entry_text(text);
    let raw = find_raw_entries(&normalized);

    raw.iter()
        .enumerate()
        .filter_map(|(idx, entry)| {
            let name = entry.name.split_whitespace().collect::<Vec<_>>().join(" ");
            if is_noise(&name, options) {
                return None;
            }
            let next_start = raw.get(idx + 1).map_or(normalized.len(), |next| next.start);
            let trail = normalized[entry.end..next_start].trim();
            Some(DisorderEntry {
                icd9_code: entry.icd9.trim().to_string(),
                icd10_code: entry.icd10.trim().to_string(),
                name,
                page: entry.page,
                specifiers: parse_specifier_blocks(trail),
            })
        })
        .collect()
}

fn normalize_entry_text(text: &str) -> String {
    let text = HYPHEN_BREAK.replace_all(text, "");
    INLINE_SPACES.replace_all(&text, " ").into_owned()
}

fn is_noise(name: &str, options: &ParserOptions) -> bool {
    let lowered = name.to_lowercase();
    name.contains(options.section_banner.as_str())
        || lowered.starts_with("specify")
        || lowered.starts_with("note")
}

fn find_raw_entries(text: &str) -> Vec<RawEntry<'_>> {
    let mut entries = Vec::new();
    let mut pos = 0;
    while pos < text.len() {
        let Some(head) = ENTRY_HEAD.captures_at(text, pos) else {
            break;
        };
        let Some(whole) = head.get(0) else {
            break;
        };
        let (head_start, head_end) = (whole.start(), whole.end());

        // The name may not run into the next code line.
        let limit = ENTRY_BOUNDARY
            .find_at(text, head_end)
            .map_or(text.len(), |m| m.start());
        let name_from = next_char_boundary(text, head_end);
        let marker = if name_from <= limit {
            PAGE_MARKER.captures(&text[name_from..limit])
        } else {
            None
        };

        let parsed = marker.and_then(|caps| {
            let m = caps.get(0)?;
            let page = caps[1].parse::<u32>().ok()?;
            Some((name_from + m.start(), name_from + m.end(), page))
        });
        match parsed {
            Some((marker_start, marker_end, page)) => {
                entries.push(RawEntry {
                    start: head_start,
                    end: marker_end,
                    icd9: head.get(1).map_or("", |m| m.as_str()),
                    icd10: head.get(2).map_or("", |m| m.as_str()),
                    name: text[head_end..marker_start].trim(),
                    page,
                });
                pos = marker_end;
            }
            None => pos = next_char_boundary(text, head_start),
        }
    }
    entries
}

fn next_char_boundary(text: &str, index: usize) -> usize {
    text[index..]
        .chars()
        .next()
        .map_or(text.len(), |c| index + c.len_utf8())
}
