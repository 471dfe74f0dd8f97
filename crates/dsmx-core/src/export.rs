//! Split relational export of a classification tree.
//!
//! Produces four flat record lists (families, groups, disorders,
//! specifiers) linked by explicit id fields. Ids are assigned in traversal
//! order: all families and their groups first, then per family the grouped
//! disorders followed by the directly attached ones.

use std::collections::HashMap;

use crate::entries::DisorderEntry;
use crate::hierarchy::{ClassificationTree, FamilyNode};
use crate::ids::{IdRegistry, slugify_id};
use crate::specifiers::SpecifierKind;

/// Options for the relational export.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExportOptions {
    /// Prefix of each disorder's `dsm_reference`. Default: `"DSM-5"`.
    pub reference_prefix: String,
    /// ICD-9 value meaning "no code"; never appended to ids. Default: `"___.__"`.
    pub placeholder_code: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            reference_prefix: "DSM-5".to_string(),
            placeholder_code: "___.__".to_string(),
        }
    }
}

/// Optional enrichment keyed by disorder id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportExtras {
    /// Description override per disorder id.
    pub descriptions: HashMap<String, String>,
    /// Per disorder id, detail text per lowercased specifier value label.
    pub specifier_details: HashMap<String, HashMap<String, String>>,
    /// Criterion ids per disorder id.
    pub criterion_ids: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FamilyRecord {
    pub id: String,
    pub name: String,
    pub page_start: u32,
    pub page_end: u32,
    pub description: String,
    pub group_ids: Vec<String>,
    pub disorder_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupRecord {
    pub id: String,
    pub family_id: String,
    pub name: String,
    pub page_start: u32,
    pub page_end: u32,
    pub disorder_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DisorderRecord {
    pub id: String,
    pub family_id: String,
    pub group_id: Option<String>,
    pub name: String,
    pub description: String,
    pub dsm_code: Option<String>,
    pub icd9_code: String,
    pub icd10_code: String,
    pub dsm_reference: String,
    pub page: u32,
    pub criterion_ids: Vec<String>,
    pub specifier_ids: Vec<String>,
    pub rule_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpecifierValueRecord {
    /// Unique within its specifier.
    pub id: String,
    pub label: String,
    pub icd9_code: Option<String>,
    pub icd10_code: Option<String>,
    /// Detail text from a severity table, when one was supplied.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub table_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpecifierRecord {
    pub id: String,
    pub label: String,
    /// Always `"disorder"`.
    pub applies_to: String,
    pub applies_to_disorders: Vec<String>,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: SpecifierKind,
    pub values: Vec<SpecifierValueRecord>,
}

/// The four record lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StructuredDataset {
    pub families: Vec<FamilyRecord>,
    pub groups: Vec<GroupRecord>,
    pub disorders: Vec<DisorderRecord>,
    pub specifiers: Vec<SpecifierRecord>,
}

/// Flatten a classification tree into linked records.
pub fn export_structured_dataset(
    tree: &ClassificationTree,
    options: &ExportOptions,
    extras: &ExportExtras,
) -> StructuredDataset {
    let mut exporter = Exporter {
        options,
        extras,
        family_ids: IdRegistry::new(),
        group_ids: IdRegistry::new(),
        disorder_ids: IdRegistry::new(),
        specifier_ids: IdRegistry::new(),
        dataset: StructuredDataset::default(),
    };

    let mut group_slots: Vec<Vec<usize>> = Vec::with_capacity(tree.families.len());
    for family in &tree.families {
        group_slots.push(exporter.register_family(family));
    }

    for (fi, family) in tree.families.iter().enumerate() {
        for (group, &slot) in family.groups.iter().zip(&group_slots[fi]) {
            for disorder in &group.disorders {
                exporter.register_disorder(disorder, fi, Some(slot));
            }
        }
        for disorder in &family.disorders {
            exporter.register_disorder(disorder, fi, None);
        }
    }

    exporter.dataset
}

struct Exporter<'a> {
    options: &'a ExportOptions,
    extras: &'a ExportExtras,
    family_ids: IdRegistry,
    group_ids: IdRegistry,
    disorder_ids: IdRegistry,
    specifier_ids: IdRegistry,
    dataset: StructuredDataset,
}

impl Exporter<'_> {
    /// Register a family and its groups; returns the group record indices.
    fn register_family(&mut self, family: &FamilyNode) -> Vec<usize> {
        let family_id = self.family_ids.claim(&slugify_id(&family.name));
        let mut slots = Vec::with_capacity(family.groups.len());
        let mut group_ids = Vec::with_capacity(family.groups.len());
        for group in &family.groups {
            let group_id = self.group_ids.claim(&slugify_id(&group.name));
            slots.push(self.dataset.groups.len());
            group_ids.push(group_id.clone());
            self.dataset.groups.push(GroupRecord {
                id: group_id,
                family_id: family_id.clone(),
                name: group.name.clone(),
                page_start: group.page_start,
                page_end: group.page_end,
                disorder_ids: Vec::new(),
            });
        }
        self.dataset.families.push(FamilyRecord {
            id: family_id,
            name: family.name.clone(),
            page_start: family.page_start,
            page_end: family.page_end,
            description: String::new(),
            group_ids,
            disorder_ids: Vec::new(),
        });
        slots
    }

    fn register_disorder(&mut self, disorder: &DisorderEntry, family: usize, group: Option<usize>) {
        let mut base = slugify_id(&disorder.name);
        if !disorder.icd9_code.is_empty() && disorder.icd9_code != self.options.placeholder_code {
            base = format!("{base}_{}", disorder.icd9_code.replace('.', "_"));
        }
        let disorder_id = self.disorder_ids.claim(&base);

        let extras = self.extras;
        let details = extras.specifier_details.get(&disorder_id);
        let mut specifier_ids = Vec::new();
        for block in &disorder.specifiers {
            let mut value_ids = IdRegistry::new();
            let values: Vec<SpecifierValueRecord> = block
                .values
                .iter()
                .map(|value| SpecifierValueRecord {
                    id: value_ids.claim(&slugify_id(value.label())),
                    label: value.label().to_string(),
                    icd9_code: value.icd9_code().map(str::to_string),
                    icd10_code: value.icd10_code().map(str::to_string),
                    table_text: details
                        .and_then(|d| d.get(&value.label().trim().to_lowercase()))
                        .filter(|text| !text.is_empty())
                        .cloned(),
                })
                .collect();
            if values.is_empty() {
                continue;
            }
            let base = if block.label.is_empty() {
                format!("SPEC_{disorder_id}")
            } else {
                format!("SPEC_{disorder_id}_{}", slugify_id(&block.label))
            };
            let specifier_id = self.specifier_ids.claim(&base);
            specifier_ids.push(specifier_id.clone());
            self.dataset.specifiers.push(SpecifierRecord {
                id: specifier_id,
                label: if block.label.is_empty() {
                    "Specifier".to_string()
                } else {
                    block.label.clone()
                },
                applies_to: "disorder".to_string(),
                applies_to_disorders: vec![disorder_id.clone()],
                kind: block.kind,
                values,
            });
        }

        let family_record = &mut self.dataset.families[family];
        family_record.disorder_ids.push(disorder_id.clone());
        let family_id = family_record.id.clone();
        let dsm_reference = format!("{} {}", self.options.reference_prefix, family_record.name);
        let group_id = group.map(|slot| {
            let record = &mut self.dataset.groups[slot];
            record.disorder_ids.push(disorder_id.clone());
            record.id.clone()
        });

        self.dataset.disorders.push(DisorderRecord {
            description: extras
                .descriptions
                .get(&disorder_id)
                .cloned()
                .unwrap_or_default(),
            criterion_ids: extras
                .criterion_ids
                .get(&disorder_id)
                .cloned()
                .unwrap_or_default(),
            id: disorder_id,
            family_id,
            group_id,
            name: disorder.name.clone(),
            dsm_code: None,
            icd9_code: disorder.icd9_code.clone(),
            icd10_code: disorder.icd10_code.clone(),
            dsm_reference,
            page: disorder.page,
            specifier_ids,
            rule_id: None,
        });
    }
}
