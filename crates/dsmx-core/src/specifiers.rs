//! "Specify ..." blocks trailing a disorder entry.

use std::sync::LazyLock;

use regex::Regex;

/// Code alternatives accepted for ICD-9 slots: `296`, `296.21` or the `___.__` placeholder.
pub(crate) const CODE_PATTERN: &str = r"(?:\d{3}(?:\.\d+)?|___\.__)";

static CODED_OPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^({CODE_PATTERN})\s+\(([^)]+)\)\s+(.+)"))
        .expect("valid coded option regex")
});
static PAGE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\d{1,3}\)\s*$").expect("valid page suffix regex"));
static OPTION_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*|;\s*").expect("valid option separator regex"));

/// One selectable specifier value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum SpecifierValue {
    /// A value that carries its own codes, e.g. `296.21 (F32.0) Mild`.
    Coded {
        label: String,
        icd9_code: String,
        icd10_code: String,
    },
    /// A bare label.
    Plain { label: String },
}

impl SpecifierValue {
    pub fn label(&self) -> &str {
        match self {
            SpecifierValue::Coded { label, .. } | SpecifierValue::Plain { label } => label,
        }
    }

    pub fn icd9_code(&self) -> Option<&str> {
        match self {
            SpecifierValue::Coded { icd9_code, .. } => Some(icd9_code),
            SpecifierValue::Plain { .. } => None,
        }
    }

    pub fn icd10_code(&self) -> Option<&str> {
        match self {
            SpecifierValue::Coded { icd10_code, .. } => Some(icd10_code),
            SpecifierValue::Plain { .. } => None,
        }
    }
}

/// Value type of a specifier block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SpecifierKind {
    /// Pick one of the listed values.
    #[default]
    Enum,
}

impl SpecifierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecifierKind::Enum => "enum",
        }
    }
}

/// A labelled list of specifier values.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpecifierBlock {
    pub label: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: SpecifierKind,
    pub values: Vec<SpecifierValue>,
}

/// Parse every `Specify ...` block in the text that trails a disorder entry.
///
/// A block starts at a line beginning with "specify" (any case). Text after
/// the first `:` and the following lines are option lines, up to a blank
/// line, another "specify"/"note" line, or a line ending in a `(page)`
/// marker. Blocks without values are dropped.
pub fn parse_specifier_blocks(trail: &str) -> Vec<SpecifierBlock> {
    let lines: Vec<&str> = trail.trim().lines().map(str::trim).collect();
    let mut blocks = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if !line.to_lowercase().starts_with("specify") {
            i += 1;
            continue;
        }

        let (heading, after_colon) = match line.split_once(':') {
            Some((heading, rest)) => (heading, rest.trim()),
            None => (line, ""),
        };
        let label = block_label(heading);

        let mut option_lines: Vec<&str> = Vec::new();
        if !after_colon.is_empty() {
            option_lines.push(after_colon);
        }
        i += 1;
        while i < lines.len() {
            let next = lines[i];
            if next.is_empty() {
                i += 1;
                break;
            }
            let lowered = next.to_lowercase();
            if lowered.starts_with("specify")
                || lowered.starts_with("note")
                || PAGE_SUFFIX.is_match(next)
            {
                break;
            }
            option_lines.push(next);
            i += 1;
        }

        let values: Vec<SpecifierValue> = option_lines
            .iter()
            .flat_map(|l| parse_option_line(l))
            .collect();
        if !values.is_empty() {
            blocks.push(SpecifierBlock {
                label,
                kind: SpecifierKind::Enum,
                values,
            });
        }
    }
    blocks
}

/// Label for a block heading (the text before `:`).
fn block_label(heading: &str) -> String {
    let lowered = heading.to_lowercase();
    if lowered.contains("current severity") {
        return "Current Severity".to_string();
    }
    if lowered.starts_with("specify whether") || lowered.starts_with("specify if") {
        return "Specifiers".to_string();
    }
    let stripped = heading
        .replace("Specify", "")
        .trim_matches(|c| c == ':' || c == ' ')
        .to_string();
    if stripped.is_empty() {
        "Specifiers".to_string()
    } else {
        stripped
    }
}

fn parse_option_line(line: &str) -> Vec<SpecifierValue> {
    if let Some(caps) = CODED_OPTION.captures(line) {
        return vec![SpecifierValue::Coded {
            label: caps[3].trim().to_string(),
            icd9_code: caps[1].trim().to_string(),
            icd10_code: caps[2].trim().to_string(),
        }];
    }
    OPTION_SEPARATOR
        .split(line)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| SpecifierValue::Plain {
            label: part.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(label: &str) -> SpecifierValue {
        SpecifierValue::Plain {
            label: label.to_string(),
        }
    }

    #[test]
    fn test_bare_specify_gets_generic_label() {
        let blocks = parse_specifier_blocks("Specify: With anxious distress");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].label, "Specifiers");
        assert_eq!(blocks[0].kind, SpecifierKind::Enum);
        assert_eq!(blocks[0].values, vec![plain("With anxious distress")]);
    }

    #[test]
    fn test_current_severity_label() {
        let blocks = parse_specifier_blocks("Specify current severity:\nMild, Moderate; Severe");
        assert_eq!(blocks[0].label, "Current Severity");
        assert_eq!(
            blocks[0].values,
            vec![plain("Mild"), plain("Moderate"), plain("Severe")]
        );
    }

    #[test]
    fn test_specify_if_and_whether_labels() {
        let blocks = parse_specifier_blocks(
            "Specify if: With good or fair insight\n\nSpecify whether: Generalized",
        );
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.label == "Specifiers"));
    }

    #[test]
    fn test_custom_heading_label() {
        let blocks = parse_specifier_blocks("Specify type: Restricting type");
        assert_eq!(blocks[0].label, "type");
    }

    #[test]
    fn test_coded_option_lines() {
        let trail = "Specify current severity:\n317 (F70) Mild\n318.0 (F71) Moderate\n___.__ (F79) Unspecified";
        let blocks = parse_specifier_blocks(trail);
        assert_eq!(blocks[0].values.len(), 3);
        assert_eq!(
            blocks[0].values[1],
            SpecifierValue::Coded {
                label: "Moderate".to_string(),
                icd9_code: "318.0".to_string(),
                icd10_code: "F71".to_string(),
            }
        );
        assert_eq!(blocks[0].values[2].icd9_code(), Some("___.__"));
    }

    #[test]
    fn test_options_stop_at_page_marker_and_note() {
        let trail = "Specify if:\nWith catatonia\nBipolar I Disorder (123)\nNote: text";
        let blocks = parse_specifier_blocks(trail);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].values, vec![plain("With catatonia")]);
    }

    #[test]
    fn test_empty_block_dropped() {
        assert!(parse_specifier_blocks("Specify:\n\nOther text").is_empty());
        assert!(parse_specifier_blocks("").is_empty());
    }

    #[test]
    fn test_value_accessors() {
        let value = plain("Mild");
        assert_eq!(value.label(), "Mild");
        assert_eq!(value.icd9_code(), None);
        assert_eq!(value.icd10_code(), None);
    }
}
