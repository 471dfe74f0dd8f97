use std::path::Path;

use dsmx::{
    ExtractOptions, Extraction, Extractor, JsonWordSource, MarginBlacklist, PageRecord,
    format_document, format_markdown,
};
use tracing::info;

use crate::cli::DocumentFormat;
#[cfg(not(feature = "parallel"))]
use crate::shared::ProgressReporter;
use crate::shared::{emit_json, open_dump, report_error, resolve_pages, write_file};

pub fn run(
    file: &Path,
    pages: Option<&str>,
    scan_pages: Option<&str>,
    output: Option<&Path>,
    document: Option<(&Path, DocumentFormat)>,
    options: ExtractOptions,
) -> Result<(), i32> {
    let extractor = Extractor::with_options(open_dump(file)?, options);
    let page_indices = resolve_pages(pages, extractor.page_count())?;
    let scan_indices = match scan_pages {
        Some(range) => resolve_pages(Some(range), extractor.page_count())?,
        None => page_indices.clone(),
    };

    let blacklist = extractor.scan(&scan_indices).map_err(report_error)?;

    let records = extract_records(&extractor, &page_indices, &blacklist)?;

    let extraction = Extraction {
        blacklist,
        pages: records,
    };
    emit_json(&extraction, output)?;
    if let Some(path) = output {
        eprintln!(
            "Wrote {} pages to {}",
            extraction.pages.len(),
            path.display()
        );
    }

    if let Some((path, format)) = document {
        let text = match format {
            DocumentFormat::Text => format_document(&extraction.pages),
            DocumentFormat::Markdown => format_markdown(&extraction.pages),
        };
        write_file(path, &text)?;
        info!(path = %path.display(), "wrote formatted document");
        eprintln!("Wrote document to {}", path.display());
    }

    Ok(())
}

#[cfg(feature = "parallel")]
fn extract_records(
    extractor: &Extractor<JsonWordSource>,
    pages: &[usize],
    blacklist: &MarginBlacklist,
) -> Result<Vec<PageRecord>, i32> {
    info!(pages = pages.len(), "extracting pages in parallel");
    extractor
        .extract_parallel(pages, blacklist)
        .map_err(report_error)
}

#[cfg(not(feature = "parallel"))]
fn extract_records(
    extractor: &Extractor<JsonWordSource>,
    pages: &[usize],
    blacklist: &MarginBlacklist,
) -> Result<Vec<PageRecord>, i32> {
    let progress = ProgressReporter::new("Extracting", pages.len());
    let mut records = Vec::with_capacity(pages.len());
    for (i, &index) in pages.iter().enumerate() {
        progress.report(i + 1);
        records.push(
            extractor
                .extract_page(index, blacklist)
                .map_err(report_error)?,
        );
    }
    progress.finish();
    Ok(records)
}
