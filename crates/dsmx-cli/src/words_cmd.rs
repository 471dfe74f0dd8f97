use std::path::Path;

use dsmx::{Extractor, JsonWordSource, PageLayout};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::shared::{ProgressReporter, emit_json, open_dump, report_error, resolve_pages};

#[derive(Serialize)]
struct LineJson<'a> {
    text: &'a str,
    x0: f64,
    top: f64,
    x1: f64,
    bottom: f64,
}

#[derive(Serialize)]
struct PageJson<'a> {
    page: usize,
    column_mode: &'static str,
    lines: Vec<LineJson<'a>>,
}

pub fn run(file: &Path, pages: Option<&str>, format: &OutputFormat) -> Result<(), i32> {
    let extractor = Extractor::new(open_dump(file)?);
    let page_indices = resolve_pages(pages, extractor.page_count())?;
    let layouts = read_layouts(&extractor, &page_indices)?;

    match format {
        OutputFormat::Text => {
            write_text(&layouts);
            Ok(())
        }
        OutputFormat::Json => write_json(&layouts),
    }
}

fn read_layouts(
    extractor: &Extractor<JsonWordSource>,
    page_indices: &[usize],
) -> Result<Vec<PageLayout>, i32> {
    let progress = ProgressReporter::new("Reading", page_indices.len());
    let mut layouts = Vec::with_capacity(page_indices.len());
    for (i, &index) in page_indices.iter().enumerate() {
        progress.report(i + 1);
        layouts.push(extractor.page_layout(index).map_err(report_error)?);
    }
    progress.finish();
    Ok(layouts)
}

fn write_text(layouts: &[PageLayout]) {
    println!("page\tcolumns\tx0\ttop\tx1\tbottom\ttext");

    for layout in layouts {
        for line in &layout.lines {
            println!(
                "{}\t{}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{}",
                layout.page,
                layout.column_mode.as_str(),
                line.bbox.x0,
                line.bbox.top,
                line.bbox.x1,
                line.bbox.bottom,
                line.text,
            );
        }
    }
}

fn write_json(layouts: &[PageLayout]) -> Result<(), i32> {
    let pages: Vec<PageJson<'_>> = layouts
        .iter()
        .map(|layout| PageJson {
            page: layout.page,
            column_mode: layout.column_mode.as_str(),
            lines: layout
                .lines
                .iter()
                .map(|line| LineJson {
                    text: &line.text,
                    x0: line.bbox.x0,
                    top: line.bbox.top,
                    x1: line.bbox.x1,
                    bottom: line.bbox.bottom,
                })
                .collect(),
        })
        .collect();
    emit_json(&pages, None)
}
