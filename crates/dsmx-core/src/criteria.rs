//! Diagnostic criteria extraction from a disorder's pages.
//!
//! A [`CriteriaSpec`] names the page span of one disorder and the text
//! markers that delimit its criteria list. [`extract_criteria`] splits the
//! normalized page text into a description, the lettered criteria
//! (`"A. ... B. ..."`) and an optional note, and reads an optional
//! severity table into per-level detail text.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::export::ExportExtras;

static BROKEN_HYPHEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-\s*\n").expect("valid broken hyphen regex"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));
static CRITERION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z])\.\s+").expect("valid criterion marker regex"));
static NEXT_CRITERION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+[A-Z]\.\s+").expect("valid next criterion regex"));

/// Default criterion type.
pub const DEFAULT_CRITERION_KIND: &str = "symptom_cluster";

/// Where a severity table sits in the raw page text.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeverityTableSpec {
    /// Table caption that starts the table section.
    pub title: String,
    /// Text that ends the section; the rest of the text when absent.
    pub end_marker: String,
    /// Severity labels in table order.
    pub labels: Vec<String>,
}

/// Criteria extraction job for a single disorder.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CriteriaSpec {
    /// Disorder id the criteria belong to (as assigned by the exporter).
    pub disorder_id: String,
    /// 1-based inclusive page span holding the criteria.
    pub pages: (usize, usize),
    /// Text preceding the first criterion; everything before it is the
    /// disorder description.
    #[cfg_attr(feature = "serde", serde(default))]
    pub start_marker: Option<String>,
    /// Markers ending the criteria list, tried in order. A marker starting
    /// with "note" also captures the note that follows it.
    #[cfg_attr(feature = "serde", serde(default))]
    pub end_markers: Vec<String>,
    /// Criterion type. Default: `"symptom_cluster"`.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "type", default = "default_criterion_kind")
    )]
    pub kind: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub severity_table: Option<SeverityTableSpec>,
}

#[cfg(feature = "serde")]
fn default_criterion_kind() -> String {
    DEFAULT_CRITERION_KIND.to_string()
}

impl CriteriaSpec {
    /// A job with no markers and the default criterion type.
    pub fn new(disorder_id: impl Into<String>, pages: (usize, usize)) -> Self {
        Self {
            disorder_id: disorder_id.into(),
            pages,
            start_marker: None,
            end_markers: Vec::new(),
            kind: DEFAULT_CRITERION_KIND.to_string(),
            severity_table: None,
        }
    }
}

/// One lettered criterion.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Criterion {
    pub code: String,
    pub description: String,
    pub subcriteria: Vec<String>,
}

/// A criterion linked to its disorder.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CriterionRecord {
    /// `"<disorder id>_<code>"`.
    pub id: String,
    pub disorder_id: String,
    pub code: String,
    pub group: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: String,
    pub description: String,
    pub question_suggestion_id: Option<String>,
    pub required: bool,
    pub subcriteria: Vec<String>,
}

/// What one [`CriteriaSpec`] yields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CriteriaOutcome {
    pub criteria: Vec<CriterionRecord>,
    /// Text before the start marker, with the note appended.
    pub description: Option<String>,
    /// Severity detail text keyed by lowercased label.
    pub severity: HashMap<String, String>,
}

/// Join hyphen-broken words and collapse all whitespace to single spaces.
pub fn normalize_text_block(text: &str) -> String {
    let text = BROKEN_HYPHEN.replace_all(text, "");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Split normalized text into lettered criteria.
///
/// A criterion starts at `"X. "` and runs up to the next whitespace-led
/// `"Y. "` marker or the end of the text.
pub fn parse_lettered_criteria(text: &str) -> Vec<Criterion> {
    let mut criteria = Vec::new();
    let mut pos = 0;
    while let Some(caps) = CRITERION_MARKER.captures_at(text, pos) {
        let Some(marker) = caps.get(0) else {
            break;
        };
        let body_start = marker.end();
        let body_end = NEXT_CRITERION
            .find_at(text, body_start)
            .map_or(text.len(), |m| m.start());
        criteria.push(Criterion {
            code: caps[1].to_string(),
            description: text[body_start..body_end].trim().to_string(),
            subcriteria: Vec::new(),
        });
        if body_end == text.len() {
            break;
        }
        pos = body_end;
    }
    criteria
}

/// Run one criteria job over the raw text of its pages.
pub fn extract_criteria(raw_text: &str, spec: &CriteriaSpec) -> CriteriaOutcome {
    let normalized = normalize_text_block(raw_text);
    let mut segment = normalized.as_str();
    let mut description = None;

    if let Some(marker) = spec.start_marker.as_deref().filter(|m| !m.is_empty()) {
        if let Some((before, after)) = segment.split_once(marker) {
            description = Some(before.trim().to_string());
            segment = after;
        }
    }

    let mut note = None;
    if let Some((marker, (before, after))) = first_split(segment, &spec.end_markers) {
        if marker.to_lowercase().starts_with("note") {
            let body = after.trim();
            let body = body.split_once("Specify").map_or(body, |(head, _)| head);
            note = Some(body.trim().to_string()).filter(|n| !n.is_empty());
        }
        segment = before;
        // A later marker may still occur before the first one found.
        if let Some((_, (before, _))) = first_split(segment, &spec.end_markers) {
            segment = before;
        }
    }

    let criteria = parse_lettered_criteria(segment)
        .into_iter()
        .map(|criterion| CriterionRecord {
            id: format!("{}_{}", spec.disorder_id, criterion.code),
            disorder_id: spec.disorder_id.clone(),
            group: criterion.code.clone(),
            code: criterion.code,
            kind: spec.kind.clone(),
            description: criterion.description,
            question_suggestion_id: None,
            required: true,
            subcriteria: criterion.subcriteria,
        })
        .collect();

    if let Some(note) = note {
        let base = description.take().unwrap_or_default();
        description = Some(if base.is_empty() {
            format!("NOTE: {note}")
        } else {
            format!("{base}\nNOTE: {note}")
        });
    }

    let severity = spec
        .severity_table
        .as_ref()
        .map(|table| parse_severity_table(raw_text, table))
        .unwrap_or_default();

    CriteriaOutcome {
        criteria,
        description,
        severity,
    }
}

/// Split at the first marker (in list order) that occurs in `text`.
fn first_split<'t, 'm>(
    text: &'t str,
    markers: &'m [String],
) -> Option<(&'m str, (&'t str, &'t str))> {
    markers
        .iter()
        .filter(|m| !m.is_empty())
        .find_map(|m| text.split_once(m.as_str()).map(|parts| (m.as_str(), parts)))
}

/// Read per-level text from a severity table section.
///
/// The section runs from the table title to the end marker. Each label's
/// text runs up to the nearest following label. Labels absent from the
/// section are skipped.
pub fn parse_severity_table(raw_text: &str, table: &SeverityTableSpec) -> HashMap<String, String> {
    let mut entries = HashMap::new();
    let Some(start) = raw_text.find(&table.title) else {
        return entries;
    };
    let end = raw_text[start..]
        .find(&table.end_marker)
        .filter(|_| !table.end_marker.is_empty())
        .map_or(raw_text.len(), |offset| start + offset);
    let section = &raw_text[start..end];

    for (idx, label) in table.labels.iter().enumerate() {
        if label.is_empty() {
            continue;
        }
        let Some(label_start) = section.find(label.as_str()) else {
            continue;
        };
        let search_from = label_start + label.chars().next().map_or(1, char::len_utf8);
        let label_end = table.labels[idx + 1..]
            .iter()
            .filter(|next| !next.is_empty())
            .filter_map(|next| section[search_from..].find(next.as_str()))
            .min()
            .map_or(section.len(), |offset| search_from + offset);
        entries.insert(
            label.to_lowercase(),
            normalize_text_block(&section[label_start..label_end]),
        );
    }
    entries
}

/// Criteria outcomes gathered over several jobs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CriteriaSet {
    pub criteria: Vec<CriterionRecord>,
    pub extras: ExportExtras,
}

impl CriteriaSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge the outcome of the job for `disorder_id`.
    pub fn add(&mut self, disorder_id: &str, outcome: CriteriaOutcome) {
        let ids: Vec<String> = outcome.criteria.iter().map(|c| c.id.clone()).collect();
        if !ids.is_empty() {
            self.extras
                .criterion_ids
                .entry(disorder_id.to_string())
                .or_default()
                .extend(ids);
        }
        if let Some(description) = outcome.description {
            self.extras
                .descriptions
                .insert(disorder_id.to_string(), description);
        }
        if !outcome.severity.is_empty() {
            self.extras
                .specifier_details
                .insert(disorder_id.to_string(), outcome.severity);
        }
        self.criteria.extend(outcome.criteria);
    }
}
