use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use dsmx::{
    ClassificationTree, CriteriaSet, CriteriaSpec, ExportOptions, Extractor, JsonWordSource,
    ParserOptions, export_structured_dataset, extract_criteria, parse_classification,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::shared::{emit_json, open_dump, report_error, resolve_pages};

pub fn run(
    file: &Path,
    pages: Option<&str>,
    output: Option<&Path>,
    structured_dir: Option<&Path>,
    criteria: Option<&Path>,
    criteria_output: Option<&Path>,
    print_summary: bool,
) -> Result<(), i32> {
    let extractor = Extractor::new(open_dump(file)?);
    let page_indices = resolve_pages(pages, extractor.page_count())?;

    let text = extractor.raw_text(&page_indices).map_err(report_error)?;
    let tree = parse_classification(&text, &ParserOptions::default());
    report_tree(&tree);

    emit_json(&tree, output)?;
    if let Some(path) = output {
        eprintln!(
            "Wrote {} families to {}",
            tree.families.len(),
            path.display()
        );
    }

    let set = match criteria {
        Some(path) => run_criteria_jobs(&extractor, path)?,
        None => CriteriaSet::new(),
    };
    if let Some(path) = criteria_output {
        emit_wrapped("criteria", &set.criteria, path)?;
        eprintln!(
            "Wrote {} criteria to {}",
            set.criteria.len(),
            path.display()
        );
    }

    if let Some(dir) = structured_dir {
        let dataset = export_structured_dataset(&tree, &ExportOptions::default(), &set.extras);
        emit_wrapped("families", &dataset.families, &dir.join("families.json"))?;
        emit_wrapped("groups", &dataset.groups, &dir.join("groups.json"))?;
        emit_wrapped("disorders", &dataset.disorders, &dir.join("disorders.json"))?;
        emit_wrapped("specifiers", &dataset.specifiers, &dir.join("specifiers.json"))?;
        eprintln!(
            "Wrote {} families, {} groups, {} disorders, {} specifiers to {}",
            dataset.families.len(),
            dataset.groups.len(),
            dataset.disorders.len(),
            dataset.specifiers.len(),
            dir.display()
        );
    }

    if print_summary {
        for line in tree.summary_lines() {
            println!("{line}");
        }
    }

    Ok(())
}

/// Write `{"<key>": records}` to `path`.
fn emit_wrapped<T: Serialize>(key: &str, records: &[T], path: &Path) -> Result<(), i32> {
    emit_json(&BTreeMap::from([(key, records)]), Some(path))
}

fn report_tree(tree: &ClassificationTree) {
    if tree.families.is_empty() {
        warn!("no disorder families found; check the page range");
    }
    for entry in &tree.unassigned {
        warn!(
            page = entry.page,
            name = %entry.name,
            "disorder entry outside every family"
        );
    }
    info!(
        families = tree.families.len(),
        entries = tree.entries.len(),
        "parsed classification"
    );
}

fn run_criteria_jobs(
    extractor: &Extractor<JsonWordSource>,
    path: &Path,
) -> Result<CriteriaSet, i32> {
    let specs = load_specs(path)?;
    let mut set = CriteriaSet::new();
    for spec in &specs {
        let (start, end) = spec.pages;
        let pages = extractor.page_indices(start, end).map_err(report_error)?;
        let text = extractor.raw_text(&pages).map_err(report_error)?;
        let outcome = extract_criteria(&text, spec);
        if outcome.criteria.is_empty() {
            warn!(disorder = %spec.disorder_id, "no criteria found");
        }
        info!(
            disorder = %spec.disorder_id,
            criteria = outcome.criteria.len(),
            "extracted criteria"
        );
        set.add(&spec.disorder_id, outcome);
    }
    Ok(set)
}

fn load_specs(path: &Path) -> Result<Vec<CriteriaSpec>, i32> {
    let json = fs::read_to_string(path).map_err(|e| {
        eprintln!("Error: cannot read {}: {e}", path.display());
        1
    })?;
    serde_json::from_str(&json).map_err(|e| {
        eprintln!("Error: invalid criteria config {}: {e}", path.display());
        1
    })
}
