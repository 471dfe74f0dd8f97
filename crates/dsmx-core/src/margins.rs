//! Running header/footer detection.
//!
//! Lines inside the top or bottom margin band are counted across the
//! scanned pages; texts that repeat on at least `min_repeat_ratio` of the
//! pages form the blacklist applied during extraction.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::Regex;

use crate::lines::TextLine;

static PAGE_NUMBER_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\d{1,4}\s*(?:[A-Za-z].*)?$").expect("valid page number regex")
});

/// Configuration for margin band classification and repetition detection.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarginOptions {
    /// A line whose top is at or above this offset is in the header band. Default: 70.0.
    pub top_margin: f64,
    /// A line whose bottom is within this distance of the page bottom is in the footer band. Default: 70.0.
    pub bottom_margin: f64,
    /// Minimum fraction of scanned pages a text must appear on. Default: 0.6.
    pub min_repeat_ratio: f64,
}

impl Default for MarginOptions {
    fn default() -> Self {
        Self {
            top_margin: 70.0,
            bottom_margin: 70.0,
            min_repeat_ratio: 0.6,
        }
    }
}

impl MarginOptions {
    /// Whether the line sits in the header band.
    pub fn in_header_band(&self, line: &TextLine) -> bool {
        line.bbox.top <= self.top_margin
    }

    /// Whether the line sits in the footer band of a page of `page_height`.
    pub fn in_footer_band(&self, line: &TextLine, page_height: f64) -> bool {
        page_height - line.bbox.bottom <= self.bottom_margin
    }
}

/// Exact line texts identified as running headers and footers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarginBlacklist {
    /// Repeating header texts.
    pub headers: BTreeSet<String>,
    /// Repeating footer texts.
    pub footers: BTreeSet<String>,
}

impl MarginBlacklist {
    /// True when neither set has entries.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.footers.is_empty()
    }
}

/// Accumulates margin-band occurrences page by page.
///
/// Every margin-band line counts toward its text's tally, so a text
/// repeated within one band counts once per line. Every recorded page
/// counts toward the denominator, including pages with no lines.
#[derive(Debug, Clone, Default)]
pub struct MarginScan {
    header_counts: HashMap<String, usize>,
    footer_counts: HashMap<String, usize>,
    pages: usize,
}

impl MarginScan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pages recorded so far.
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Record the lines of one page.
    pub fn record_page(&mut self, lines: &[TextLine], page_height: f64, options: &MarginOptions) {
        self.pages += 1;
        for line in lines.iter().filter(|l| !l.text.is_empty()) {
            if options.in_header_band(line) {
                *self.header_counts.entry(line.text.clone()).or_insert(0) += 1;
            }
            if options.in_footer_band(line, page_height) {
                *self.footer_counts.entry(line.text.clone()).or_insert(0) += 1;
            }
        }
    }

    /// Produce the blacklist from the recorded counts.
    pub fn finish(self, options: &MarginOptions) -> MarginBlacklist {
        let total = self.pages.max(1) as f64;
        let frequent = |counts: HashMap<String, usize>| -> BTreeSet<String> {
            counts
                .into_iter()
                .filter(|(_, count)| *count as f64 / total >= options.min_repeat_ratio)
                .map(|(text, _)| text)
                .collect()
        };
        MarginBlacklist {
            headers: frequent(self.header_counts),
            footers: frequent(self.footer_counts),
        }
    }
}

/// Scan pages given as `(lines, page_height)` pairs and build the blacklist.
pub fn scan_margins<'a, I>(pages: I, options: &MarginOptions) -> MarginBlacklist
where
    I: IntoIterator<Item = (&'a [TextLine], f64)>,
{
    let mut scan = MarginScan::new();
    for (lines, height) in pages {
        scan.record_page(lines, height, options);
    }
    scan.finish(options)
}

/// Whether a footer-band line looks like a page number, optionally followed
/// by running text (`"123"`, `"12 Depressive Disorders"`).
pub fn looks_like_page_number(line: &str) -> bool {
    PAGE_NUMBER_LIKE.is_match(line.trim())
}
