//! The boundary between layout reconstruction and the document decoder.

use crate::error::SourceError;
use crate::tables::TableBlock;
use crate::token::Token;

/// A provider of positioned words and table candidates, page by page.
///
/// Page indices are 0-based. Implementations must return the same data for
/// repeated requests of the same page.
pub trait WordSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// `(width, height)` of the page in points.
    fn page_dimensions(&self, page_index: usize) -> Result<(f64, f64), SourceError>;

    /// Word tokens of the page, in any order.
    fn page_tokens(&self, page_index: usize) -> Result<Vec<Token>, SourceError>;

    /// Tables located on the page.
    ///
    /// Callers treat an error here as "no tables on this page".
    fn page_tables(&self, page_index: usize) -> Result<Vec<TableBlock>, SourceError>;
}

impl<S: WordSource + ?Sized> WordSource for &S {
    fn page_count(&self) -> usize {
        (**self).page_count()
    }

    fn page_dimensions(&self, page_index: usize) -> Result<(f64, f64), SourceError> {
        (**self).page_dimensions(page_index)
    }

    fn page_tokens(&self, page_index: usize) -> Result<Vec<Token>, SourceError> {
        (**self).page_tokens(page_index)
    }

    fn page_tables(&self, page_index: usize) -> Result<Vec<TableBlock>, SourceError> {
        (**self).page_tables(page_index)
    }
}
