//! Detected tables and their separation from the text flow.

use crate::geometry::BBox;
use crate::token::Token;

/// A table located by the table finder.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableBlock {
    /// Table bounding box.
    pub bbox: BBox,
    /// Cell texts, row-major. Missing cells are empty strings.
    pub rows: Vec<Vec<String>>,
}

impl TableBlock {
    /// Build a table from raw finder cells, normalizing each cell.
    pub fn from_cells(bbox: BBox, cells: Vec<Vec<Option<String>>>) -> Self {
        let rows = cells
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| cell.as_deref().map(normalize_cell).unwrap_or_default())
                    .collect()
            })
            .collect();
        Self { bbox, rows }
    }
}

/// Collapse internal whitespace runs and trim a cell.
pub fn normalize_cell(cell: &str) -> String {
    cell.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Options for table handling during page assembly.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableOptions {
    /// Ask the source for tables at all. Default: true.
    pub extract_tables: bool,
    /// Remove tokens inside table boxes from the text flow. Default: true.
    pub strip_from_flow: bool,
    /// Padding added around each table box before the containment test. Default: 2.0.
    pub bbox_padding: f64,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            extract_tables: true,
            strip_from_flow: true,
            bbox_padding: 2.0,
        }
    }
}

/// Whether the token lies fully inside any padded table box.
pub fn token_in_tables(token: &Token, tables: &[TableBlock], padding: f64) -> bool {
    tables
        .iter()
        .any(|t| t.bbox.expand(padding).contains(&token.bbox))
}

/// Drop tokens that belong to tables, keeping the rest in order.
pub fn strip_table_tokens(tokens: Vec<Token>, tables: &[TableBlock], padding: f64) -> Vec<Token> {
    if tables.is_empty() {
        return tokens;
    }
    tokens
        .into_iter()
        .filter(|t| !token_in_tables(t, tables, padding))
        .collect()
}
