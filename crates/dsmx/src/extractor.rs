//! Two-phase page extraction over a word source.

use dsmx_core::{
    ColumnMode, ExtractError, ExtractOptions, MarginBlacklist, MarginScan, PageInput, PageRecord,
    SourceError, TableBlock, TextLine, WordSource, assemble_page, cluster_tokens_into_lines,
    detect_column_mode, order_lines,
};
use tracing::{debug, info, warn};

/// Result of a scan followed by extraction.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Extraction {
    pub blacklist: MarginBlacklist,
    pub pages: Vec<PageRecord>,
}

/// The clustered lines of one page in reading order.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    /// 1-based page number.
    pub page: usize,
    pub column_mode: ColumnMode,
    pub lines: Vec<TextLine>,
}

/// Builds page records from a [`WordSource`].
///
/// Extraction runs in two phases. [`scan`](Extractor::scan) reads the
/// margin bands of a set of pages and returns the repeating header/footer
/// blacklist; [`extract`](Extractor::extract) then assembles pages against
/// that blacklist. The blacklist is a plain value, so one scan can serve
/// several extractions.
///
/// Page arguments are 0-based indices; records carry 1-based page numbers.
///
/// # Example
///
/// ```ignore
/// let extractor = Extractor::new(JsonWordSource::open("words.json")?);
/// let pages: Vec<usize> = (9..49).collect();
/// let blacklist = extractor.scan(&pages)?;
/// let records = extractor.extract(&pages, &blacklist)?;
/// ```
#[derive(Debug, Clone)]
pub struct Extractor<S> {
    source: S,
    options: ExtractOptions,
}

impl<S: WordSource> Extractor<S> {
    /// Create an extractor with default options.
    pub fn new(source: S) -> Self {
        Self::with_options(source, ExtractOptions::default())
    }

    pub fn with_options(source: S, options: ExtractOptions) -> Self {
        Self { source, options }
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn page_count(&self) -> usize {
        self.source.page_count()
    }

    /// 0-based indices for the 1-based inclusive page range `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidPageRange`] if the range is empty,
    /// starts at 0, or runs past the last page.
    pub fn page_indices(&self, start: usize, end: usize) -> Result<Vec<usize>, ExtractError> {
        let page_count = self.page_count();
        if start == 0 || start > end || end > page_count {
            return Err(ExtractError::InvalidPageRange {
                start,
                end,
                page_count,
            });
        }
        Ok((start - 1..end).collect())
    }

    /// Scan the margin bands of `pages` and build the header/footer blacklist.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::SourceUnavailable`] if a page's tokens or
    /// dimensions cannot be read.
    pub fn scan(&self, pages: &[usize]) -> Result<MarginBlacklist, ExtractError> {
        let mut scan = MarginScan::new();
        for &index in pages {
            let (_, height) = self
                .source
                .page_dimensions(index)
                .map_err(unavailable(index))?;
            let tokens = self.source.page_tokens(index).map_err(unavailable(index))?;
            let lines = cluster_tokens_into_lines(&tokens, &self.options.line);
            debug!(page = index + 1, lines = lines.len(), "scanned page margins");
            scan.record_page(&lines, height, &self.options.margin);
        }

        let blacklist = scan.finish(&self.options.margin);
        info!(
            pages = pages.len(),
            headers = blacklist.headers.len(),
            footers = blacklist.footers.len(),
            "built margin blacklist"
        );
        Ok(blacklist)
    }

    /// Load everything the source has for one page.
    ///
    /// A failing table finder is not an error: the page is treated as
    /// having no tables.
    pub fn page_input(&self, index: usize) -> Result<PageInput, ExtractError> {
        let (width, height) = self
            .source
            .page_dimensions(index)
            .map_err(unavailable(index))?;
        let tokens = self.source.page_tokens(index).map_err(unavailable(index))?;
        let tables = if self.options.table.extract_tables {
            self.page_tables(index)
        } else {
            Vec::new()
        };
        Ok(PageInput {
            page_number: index + 1,
            width,
            height,
            tokens,
            tables,
        })
    }

    fn page_tables(&self, index: usize) -> Vec<TableBlock> {
        self.source.page_tables(index).unwrap_or_else(|err| {
            warn!(
                page = index + 1,
                error = %err,
                "table extraction failed, continuing without tables"
            );
            Vec::new()
        })
    }

    /// Assemble one page against `blacklist`.
    pub fn extract_page(
        &self,
        index: usize,
        blacklist: &MarginBlacklist,
    ) -> Result<PageRecord, ExtractError> {
        let input = self.page_input(index)?;
        let record = assemble_page(input, blacklist, &self.options);
        debug!(
            page = record.page,
            column_mode = record.debug.column_mode.as_str(),
            words = record.debug.num_words,
            tables = record.debug.num_tables,
            "extracted page"
        );
        Ok(record)
    }

    /// Assemble `pages` in order.
    ///
    /// # Errors
    ///
    /// Stops at the first page whose tokens or dimensions are unavailable.
    pub fn extract(
        &self,
        pages: &[usize],
        blacklist: &MarginBlacklist,
    ) -> Result<Vec<PageRecord>, ExtractError> {
        pages
            .iter()
            .map(|&index| self.extract_page(index, blacklist))
            .collect()
    }

    /// Scan `scan_pages` (or `pages` when `None`), then extract `pages`.
    pub fn extract_clean(
        &self,
        pages: &[usize],
        scan_pages: Option<&[usize]>,
    ) -> Result<Extraction, ExtractError> {
        let blacklist = self.scan(scan_pages.unwrap_or(pages))?;
        let pages = self.extract(pages, &blacklist)?;
        Ok(Extraction { blacklist, pages })
    }

    /// Plain text of `pages`: every line in reading order, one page after
    /// the other. Nothing is removed and no cleanup runs, so line structure
    /// survives for the classification and criteria parsers.
    pub fn raw_text(&self, pages: &[usize]) -> Result<String, ExtractError> {
        let mut texts = Vec::with_capacity(pages.len());
        for &index in pages {
            let layout = self.page_layout(index)?;
            let lines: Vec<&str> = layout.lines.iter().map(|l| l.text.as_str()).collect();
            texts.push(lines.join("\n"));
        }
        Ok(texts.join("\n"))
    }

    /// Every line of a page in reading order, tables and margins included.
    pub fn page_layout(&self, index: usize) -> Result<PageLayout, ExtractError> {
        let (width, _) = self
            .source
            .page_dimensions(index)
            .map_err(unavailable(index))?;
        let tokens = self.source.page_tokens(index).map_err(unavailable(index))?;
        let lines = cluster_tokens_into_lines(&tokens, &self.options.line);
        let column_mode = detect_column_mode(&lines, width, &self.options.column);
        Ok(PageLayout {
            page: index + 1,
            column_mode,
            lines: order_lines(lines, column_mode, width),
        })
    }
}

#[cfg(feature = "parallel")]
impl<S: WordSource + Sync> Extractor<S> {
    /// Assemble `pages` concurrently using rayon.
    ///
    /// The result is ordered like `pages`. Pages are independent once the
    /// blacklist is known, so the output equals [`extract`](Extractor::extract).
    pub fn extract_parallel(
        &self,
        pages: &[usize],
        blacklist: &MarginBlacklist,
    ) -> Result<Vec<PageRecord>, ExtractError> {
        use rayon::prelude::*;

        pages
            .par_iter()
            .map(|&index| self.extract_page(index, blacklist))
            .collect()
    }
}

fn unavailable(index: usize) -> impl Fn(SourceError) -> ExtractError {
    move |source| ExtractError::SourceUnavailable {
        page: index + 1,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsmx_core::Token;

    struct OnePage;

    impl WordSource for OnePage {
        fn page_count(&self) -> usize {
            1
        }

        fn page_dimensions(&self, page_index: usize) -> Result<(f64, f64), SourceError> {
            match page_index {
                0 => Ok((612.0, 792.0)),
                _ => Err(SourceError::PageOutOfRange {
                    index: page_index,
                    count: 1,
                }),
            }
        }

        fn page_tokens(&self, _page_index: usize) -> Result<Vec<Token>, SourceError> {
            Ok(vec![
                Token::new("Hello", 72.0, 300.0, 100.0, 310.0),
                Token::new("world", 104.0, 300.0, 130.0, 310.0),
            ])
        }

        fn page_tables(&self, page_index: usize) -> Result<Vec<TableBlock>, SourceError> {
            Err(SourceError::TableFinder {
                page: page_index,
                reason: "no ruling lines".to_string(),
            })
        }
    }

    #[test]
    fn test_page_indices() {
        let extractor = Extractor::new(OnePage);
        assert_eq!(extractor.page_indices(1, 1).unwrap(), vec![0]);
        assert!(matches!(
            extractor.page_indices(1, 2),
            Err(ExtractError::InvalidPageRange { page_count: 1, .. })
        ));
        assert!(extractor.page_indices(0, 1).is_err());
    }

    #[test]
    fn test_page_input_absorbs_table_failure() {
        let input = Extractor::new(OnePage).page_input(0).unwrap();
        assert_eq!(input.page_number, 1);
        assert_eq!(input.tokens.len(), 2);
        assert!(input.tables.is_empty());
    }

    #[test]
    fn test_page_out_of_range_is_unavailable() {
        let err = Extractor::new(OnePage)
            .extract_page(3, &MarginBlacklist::default())
            .unwrap_err();
        assert_eq!(
            err,
            ExtractError::SourceUnavailable {
                page: 4,
                source: SourceError::PageOutOfRange { index: 3, count: 1 },
            }
        );
    }

    #[test]
    fn test_page_layout() {
        let layout = Extractor::new(OnePage).page_layout(0).unwrap();
        assert_eq!(layout.page, 1);
        assert_eq!(layout.column_mode, ColumnMode::One);
        assert_eq!(layout.lines.len(), 1);
        assert_eq!(layout.lines[0].text, "Hello world");
    }

    #[test]
    fn test_raw_text() {
        let text = Extractor::new(OnePage).raw_text(&[0]).unwrap();
        assert_eq!(text, "Hello world");
    }
}
