//! Family / group / disorder hierarchy of the classification listing.
//!
//! Every family and group owns the half-open page interval
//! `[own page, next sibling page)`. The last group of a family ends where the
//! family ends, and the last family ends one past the highest page seen
//! anywhere in the listing. Disorder entries are placed by page containment.

use std::collections::BTreeMap;

use crate::entries::{DisorderEntry, extract_disorder_entries};
use crate::headings::{Heading, find_family_headings, find_group_headings};

/// The 22 top-level DSM-5 diagnostic families, in manual order.
pub const DSM5_FAMILY_TITLES: [&str; 22] = [
    "Neurodevelopmental Disorders",
    "Schizophrenia Spectrum and Other Psychotic Disorders",
    "Bipolar and Related Disorders",
    "Depressive Disorders",
    "Anxiety Disorders",
    "Obsessive-Compulsive and Related Disorders",
    "Trauma- and Stressor-Related Disorders",
    "Dissociative Disorders",
    "Somatic Symptom and Related Disorders",
    "Feeding and Eating Disorders",
    "Elimination Disorders",
    "Sleep-Wake Disorders",
    "Sexual Dysfunctions",
    "Gender Dysphoria",
    "Disruptive, Impulse-Control, and Conduct Disorders",
    "Substance-Related and Addictive Disorders",
    "Neurocognitive Disorders",
    "Personality Disorders",
    "Paraphilic Disorders",
    "Other Mental Disorders",
    "Medication-Induced Movement Disorders and Other Adverse Effects of Medication",
    "Other Conditions That May Be a Focus of Clinical Attention",
];

/// Options for parsing the classification listing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParserOptions {
    /// Known top-level family titles. Default: [`DSM5_FAMILY_TITLES`].
    pub family_titles: Vec<String>,
    /// One-word titles still accepted as groups. Default: `["Parasomnias"]`.
    pub single_word_groups: Vec<String>,
    /// Running banner text treated as noise. Default: `"DSM-5 Classification"`.
    pub section_banner: String,
    /// Maximum lines a heading may span. Default: 4.
    pub max_heading_lines: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            family_titles: DSM5_FAMILY_TITLES.iter().map(|t| t.to_string()).collect(),
            single_word_groups: vec!["Parasomnias".to_string()],
            section_banner: "DSM-5 Classification".to_string(),
            max_heading_lines: 4,
        }
    }
}

impl ParserOptions {
    /// Whether `title` is exactly one of the known family titles.
    pub fn is_family(&self, title: &str) -> bool {
        self.family_titles.iter().any(|t| t == title)
    }
}

/// A diagnostic group and the disorders filed under it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupNode {
    pub name: String,
    pub page_start: u32,
    /// Last page of the group (inclusive).
    pub page_end: u32,
    pub disorders: Vec<DisorderEntry>,
}

/// A top-level family with its groups and directly attached disorders.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FamilyNode {
    pub name: String,
    pub page_start: u32,
    /// Last page of the family (inclusive).
    pub page_end: u32,
    pub groups: Vec<GroupNode>,
    /// Disorders inside the family but outside every group.
    pub disorders: Vec<DisorderEntry>,
}

impl FamilyNode {
    /// Disorders in the family, grouped or not.
    pub fn disorder_count(&self) -> usize {
        self.disorders.len() + self.groups.iter().map(|g| g.disorders.len()).sum::<usize>()
    }
}

/// Parsed classification listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassificationTree {
    pub families: Vec<FamilyNode>,
    /// Every disorder entry found, in document order.
    pub entries: Vec<DisorderEntry>,
    /// Entries whose page falls in no family interval.
    pub unassigned: Vec<DisorderEntry>,
}

impl ClassificationTree {
    /// One line per family: `"{page:>4} {name} ({g} groups, {d} disorders)"`.
    pub fn summary_lines(&self) -> Vec<String> {
        self.families
            .iter()
            .map(|f| {
                format!(
                    "{:>4} {} ({} groups, {} disorders)",
                    f.page_start,
                    f.name,
                    f.groups.len(),
                    f.disorder_count()
                )
            })
            .collect()
    }
}

/// Half-open page interval `[start, end)`.
#[derive(Debug, Clone, Copy)]
struct PageSpan {
    start: u32,
    end: u32,
}

impl PageSpan {
    fn contains(&self, page: u32) -> bool {
        self.start <= page && page < self.end
    }

    /// Inclusive last page. A zero-width span yields `start - 1`.
    fn last_page(&self) -> u32 {
        self.end.saturating_sub(1)
    }
}

/// Parse the classification listing into a hierarchy.
pub fn parse_classification(text: &str, options: &ParserOptions) -> ClassificationTree {
    let families = find_family_headings(text, options);
    let groups = find_group_headings(text, options);
    let entries = extract_disorder_entries(text, options);
    build_hierarchy(&families, &groups, entries)
}

/// Assemble family and group headings and disorder entries into a tree.
///
/// `families` must be ordered by page. Groups are sorted by page within
/// their family; a group whose page lies outside its family's interval is
/// dropped. Siblings reporting the same page produce a zero-width
/// interval for the earlier one, which then never receives disorders.
pub fn build_hierarchy(
    families: &[Heading],
    groups: &BTreeMap<String, Vec<Heading>>,
    entries: Vec<DisorderEntry>,
) -> ClassificationTree {
    if families.is_empty() {
        return ClassificationTree {
            families: Vec::new(),
            unassigned: entries.clone(),
            entries,
        };
    }

    let classification_end = families
        .iter()
        .chain(groups.values().flatten())
        .map(|h| h.page)
        .chain(entries.iter().map(|e| e.page))
        .max()
        .unwrap_or(0);

    let mut nodes: Vec<FamilyNode> = Vec::with_capacity(families.len());
    let mut spans: Vec<(PageSpan, Vec<PageSpan>)> = Vec::with_capacity(families.len());
    for (idx, family) in families.iter().enumerate() {
        let family_span = PageSpan {
            start: family.page,
            end: families
                .get(idx + 1)
                .map_or(classification_end.saturating_add(1), |next| next.page),
        };

        // Groups outside the family's pages were filed under the wrong family.
        let mut family_groups: Vec<&Heading> = groups
            .get(&family.title)
            .map(|g| g.iter().filter(|h| family_span.contains(h.page)).collect())
            .unwrap_or_default();
        family_groups.sort_by_key(|g| g.page);

        let group_spans: Vec<PageSpan> = family_groups
            .iter()
            .enumerate()
            .map(|(gi, group)| PageSpan {
                start: group.page,
                end: family_groups
                    .get(gi + 1)
                    .map_or(family_span.end, |next| next.page),
            })
            .collect();

        nodes.push(FamilyNode {
            name: family.title.clone(),
            page_start: family_span.start,
            page_end: family_span.last_page(),
            groups: family_groups
                .iter()
                .zip(&group_spans)
                .map(|(group, span)| GroupNode {
                    name: group.title.clone(),
                    page_start: span.start,
                    page_end: span.last_page(),
                    disorders: Vec::new(),
                })
                .collect(),
            disorders: Vec::new(),
        });
        spans.push((family_span, group_spans));
    }

    let mut unassigned = Vec::new();
    for entry in &entries {
        let Some(fi) = spans.iter().position(|(span, _)| span.contains(entry.page)) else {
            unassigned.push(entry.clone());
            continue;
        };
        match spans[fi].1.iter().position(|span| span.contains(entry.page)) {
            Some(gi) => nodes[fi].groups[gi].disorders.push(entry.clone()),
            None => nodes[fi].disorders.push(entry.clone()),
        }
    }

    ClassificationTree {
        families: nodes,
        entries,
        unassigned,
    }
}
