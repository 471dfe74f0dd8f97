//! [`WordSource`] implementation over a loaded word dump.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use dsmx_core::{BBox, SourceError, TableBlock, Token, WordSource};

use crate::dump::{DumpPage, WordDump};
use crate::error::DumpError;

/// A word source backed by an in-memory word dump.
#[derive(Debug, Clone)]
pub struct JsonWordSource {
    pages: Vec<DumpPage>,
}

impl JsonWordSource {
    /// Load a dump from a file.
    ///
    /// # Errors
    ///
    /// Returns [`DumpError::Io`] if the file cannot be read, and
    /// [`DumpError::Json`] or [`DumpError::Invalid`] for malformed content.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DumpError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load a dump from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DumpError> {
        let dump: WordDump = serde_json::from_reader(reader)?;
        Self::from_dump(dump)
    }

    /// Load a dump from JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DumpError> {
        let dump: WordDump = serde_json::from_slice(bytes)?;
        Self::from_dump(dump)
    }

    /// Validate an already deserialized dump.
    ///
    /// Page sizes must be positive and finite, word and table boxes finite,
    /// and explicit page numbers must match the page position.
    pub fn from_dump(dump: WordDump) -> Result<Self, DumpError> {
        for (index, page) in dump.pages.iter().enumerate() {
            validate_page(index, page)?;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            pages = dump.pages.len(),
            words = dump.pages.iter().map(|p| p.words.len()).sum::<usize>(),
            "loaded word dump"
        );

        Ok(Self { pages: dump.pages })
    }

    fn page(&self, page_index: usize) -> Result<&DumpPage, SourceError> {
        self.pages.get(page_index).ok_or(SourceError::PageOutOfRange {
            index: page_index,
            count: self.pages.len(),
        })
    }
}

fn validate_page(index: usize, page: &DumpPage) -> Result<(), DumpError> {
    let number = index + 1;
    if let Some(declared) = page.page_number {
        if declared != number {
            return Err(DumpError::Invalid(format!(
                "page at position {number} declares page_number {declared}"
            )));
        }
    }
    if !(page.width.is_finite() && page.width > 0.0 && page.height.is_finite() && page.height > 0.0)
    {
        return Err(DumpError::Invalid(format!(
            "page {number} has unusable size {}x{}",
            page.width, page.height
        )));
    }
    let finite = |values: &[f64]| values.iter().all(|v| v.is_finite());
    if let Some(word) = page
        .words
        .iter()
        .find(|w| !finite(&[w.x0, w.x1, w.top, w.bottom]))
    {
        return Err(DumpError::Invalid(format!(
            "page {number} word {:?} has a non-finite box",
            word.text
        )));
    }
    if page.tables.iter().any(|t| !finite(&t.bbox)) {
        return Err(DumpError::Invalid(format!(
            "page {number} has a table with a non-finite box"
        )));
    }
    Ok(())
}

impl WordSource for JsonWordSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_dimensions(&self, page_index: usize) -> Result<(f64, f64), SourceError> {
        let page = self.page(page_index)?;
        Ok((page.width, page.height))
    }

    fn page_tokens(&self, page_index: usize) -> Result<Vec<Token>, SourceError> {
        let page = self.page(page_index)?;
        Ok(page
            .words
            .iter()
            .filter(|w| !w.text.trim().is_empty())
            .map(|w| Token::new(w.text.clone(), w.x0, w.top, w.x1, w.bottom))
            .collect())
    }

    fn page_tables(&self, page_index: usize) -> Result<Vec<TableBlock>, SourceError> {
        let page = self.page(page_index)?;
        if let Some(reason) = &page.table_error {
            return Err(SourceError::TableFinder {
                page: page_index,
                reason: reason.clone(),
            });
        }
        Ok(page
            .tables
            .iter()
            .map(|t| {
                let [x0, top, x1, bottom] = t.bbox;
                TableBlock::from_cells(BBox::new(x0, top, x1, bottom), t.rows.clone())
            })
            .collect())
    }
}
