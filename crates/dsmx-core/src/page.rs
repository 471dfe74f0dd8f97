//! Per-page assembly of narrative text.

use std::collections::BTreeSet;

use crate::cleanup::clean_page_text;
use crate::columns::{ColumnMode, ColumnOptions, detect_column_mode, order_lines};
use crate::lines::{LineOptions, TextLine, cluster_tokens_into_lines};
use crate::margins::{MarginBlacklist, MarginOptions, looks_like_page_number};
use crate::tables::{TableBlock, TableOptions, strip_table_tokens};
use crate::token::Token;

/// Options controlling page assembly.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtractOptions {
    pub line: LineOptions,
    pub column: ColumnOptions,
    pub margin: MarginOptions,
    pub table: TableOptions,
    /// Drop blacklisted margin lines and footer page numbers. Default: true.
    pub remove_headers_footers: bool,
    /// Insert a paragraph break when the vertical gap between consecutive
    /// lines exceeds this multiple of the previous line's height.
    /// `None` disables gap-based paragraphs. Default: `Some(1.0)`.
    pub paragraph_gap_ratio: Option<f64>,
    /// Run the cosmetic cleanup passes on the joined text. Default: true.
    pub cleanup: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            line: LineOptions::default(),
            column: ColumnOptions::default(),
            margin: MarginOptions::default(),
            table: TableOptions::default(),
            remove_headers_footers: true,
            paragraph_gap_ratio: Some(1.0),
            cleanup: true,
        }
    }
}

/// Everything the source yields for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageInput {
    /// 1-based page number.
    pub page_number: usize,
    pub width: f64,
    pub height: f64,
    pub tokens: Vec<Token>,
    pub tables: Vec<TableBlock>,
}

/// Diagnostics recorded for each page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageDebug {
    pub column_mode: ColumnMode,
    /// Tokens on the page before table stripping.
    pub num_words: usize,
    pub num_tables: usize,
}

/// Extraction result for one page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageRecord {
    /// 1-based page number.
    pub page: usize,
    /// Narrative text in reading order.
    pub text: String,
    /// Header-band line texts seen on this page, filtered or not.
    pub headers: BTreeSet<String>,
    /// Footer-band line texts seen on this page, filtered or not.
    pub footers: BTreeSet<String>,
    pub tables: Vec<TableBlock>,
    pub debug: PageDebug,
}

/// Assemble the narrative text of one page.
///
/// Tokens inside tables leave the flow, the rest are clustered into lines,
/// margin noise is removed, lines are put into column reading order and
/// joined, and the result is cleaned up. Margin lines are recorded in
/// `headers`/`footers` even when they are dropped from the text.
pub fn assemble_page(
    input: PageInput,
    blacklist: &MarginBlacklist,
    options: &ExtractOptions,
) -> PageRecord {
    let PageInput {
        page_number,
        width,
        height,
        tokens,
        tables,
    } = input;

    let num_words = tokens.len();
    let tables = if options.table.extract_tables {
        tables
    } else {
        Vec::new()
    };
    let flow = if options.table.strip_from_flow {
        strip_table_tokens(tokens, &tables, options.table.bbox_padding)
    } else {
        tokens
    };

    let mut headers = BTreeSet::new();
    let mut footers = BTreeSet::new();
    let mut kept = Vec::new();
    for line in cluster_tokens_into_lines(&flow, &options.line) {
        let in_header = options.margin.in_header_band(&line);
        let in_footer = options.margin.in_footer_band(&line, height);
        if in_header {
            headers.insert(line.text.clone());
        }
        if in_footer {
            footers.insert(line.text.clone());
        }
        if options.remove_headers_footers && is_margin_noise(&line, in_header, in_footer, blacklist)
        {
            continue;
        }
        kept.push(line);
    }

    let column_mode = detect_column_mode(&kept, width, &options.column);
    let ordered = order_lines(kept, column_mode, width);
    let raw = render_lines(&ordered, options.paragraph_gap_ratio);
    let text = if options.cleanup {
        clean_page_text(&raw)
    } else {
        raw
    };

    let num_tables = tables.len();
    PageRecord {
        page: page_number,
        text,
        headers,
        footers,
        tables,
        debug: PageDebug {
            column_mode,
            num_words,
            num_tables,
        },
    }
}

fn is_margin_noise(
    line: &TextLine,
    in_header: bool,
    in_footer: bool,
    blacklist: &MarginBlacklist,
) -> bool {
    (in_header && blacklist.headers.contains(&line.text))
        || (in_footer && blacklist.footers.contains(&line.text))
        || (in_footer && looks_like_page_number(&line.text))
}

/// Join ordered lines with newlines, adding a blank line at large vertical gaps.
pub fn render_lines(lines: &[TextLine], paragraph_gap_ratio: Option<f64>) -> String {
    let mut out = String::new();
    let mut prev: Option<&TextLine> = None;
    for line in lines {
        if let Some(p) = prev {
            out.push('\n');
            if let Some(ratio) = paragraph_gap_ratio {
                if line.bbox.top - p.bbox.bottom > ratio * p.bbox.height() {
                    out.push('\n');
                }
            }
        }
        out.push_str(&line.text);
        prev = Some(line);
    }
    out
}

/// Concatenate page texts in page order, one page per block.
pub fn join_page_texts(pages: &[PageRecord]) -> String {
    pages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
