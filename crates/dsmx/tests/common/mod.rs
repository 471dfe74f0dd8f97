//! In-memory word source for integration tests.

#![allow(dead_code)]

use dsmx::{SourceError, TableBlock, Token, WordSource};

pub const WIDTH: f64 = 612.0;
pub const HEIGHT: f64 = 792.0;

/// One page of the in-memory source.
#[derive(Debug, Clone, Default)]
pub struct MemPage {
    pub tokens: Vec<Token>,
    pub tables: Vec<TableBlock>,
    /// Reported by the table finder instead of `tables`.
    pub table_error: Option<String>,
    /// Reported instead of the tokens.
    pub token_error: Option<String>,
}

impl MemPage {
    /// Add a line of words starting at `x0`, 5pt per character plus a 4pt gap.
    pub fn line(mut self, text: &str, x0: f64, top: f64) -> Self {
        self.tokens.extend(make_line(text, x0, top));
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemSource {
    pub pages: Vec<MemPage>,
}

impl MemSource {
    pub fn new(pages: Vec<MemPage>) -> Self {
        Self { pages }
    }

    fn page(&self, index: usize) -> Result<&MemPage, SourceError> {
        self.pages.get(index).ok_or(SourceError::PageOutOfRange {
            index,
            count: self.pages.len(),
        })
    }
}

impl WordSource for MemSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_dimensions(&self, page_index: usize) -> Result<(f64, f64), SourceError> {
        self.page(page_index).map(|_| (WIDTH, HEIGHT))
    }

    fn page_tokens(&self, page_index: usize) -> Result<Vec<Token>, SourceError> {
        let page = self.page(page_index)?;
        match &page.token_error {
            Some(reason) => Err(SourceError::Unavailable(reason.clone())),
            None => Ok(page.tokens.clone()),
        }
    }

    fn page_tables(&self, page_index: usize) -> Result<Vec<TableBlock>, SourceError> {
        let page = self.page(page_index)?;
        match &page.table_error {
            Some(reason) => Err(SourceError::TableFinder {
                page: page_index,
                reason: reason.clone(),
            }),
            None => Ok(page.tables.clone()),
        }
    }
}

/// Tokens for the words of `text`, laid out left to right on one baseline.
pub fn make_line(text: &str, x0: f64, top: f64) -> Vec<Token> {
    let mut x = x0;
    text.split_whitespace()
        .map(|word| {
            let width = word.chars().count() as f64 * 5.0;
            let token = Token::new(word, x, top, x + width, top + 10.0);
            x += width + 4.0;
            token
        })
        .collect()
}

/// A book page: running header on top, one body line, page number at the bottom.
pub fn book_page(number: usize, with_header: bool) -> MemPage {
    let page = MemPage::default()
        .line(&format!("Body text of page {number}"), 72.0, 300.0)
        .line(&number.to_string(), 300.0, 760.0);
    if with_header {
        page.line("Depressive Disorders", 72.0, 30.0)
    } else {
        page
    }
}
