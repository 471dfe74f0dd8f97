//! On-disk shape of a positioned-word dump.
//!
//! A dump is what any PDF decoder can emit: per page its size, the words
//! with their boxes (top-left origin), and optionally the tables its table
//! finder located. `table_error` records a table finder failure for the
//! page.
//!
//! ```json
//! {"pages": [{"page_number": 1, "width": 612, "height": 792,
//!   "words": [{"text": "Depressive", "x0": 72, "x1": 130, "top": 90, "bottom": 101}],
//!   "tables": [{"bbox": [70, 300, 540, 420], "rows": [["Mild", null]]}]}]}
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordDump {
    pub pages: Vec<DumpPage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DumpPage {
    /// 1-based page number; when present it must match the page position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<usize>,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub words: Vec<DumpWord>,
    #[serde(default)]
    pub tables: Vec<DumpTable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DumpWord {
    pub text: String,
    pub x0: f64,
    pub x1: f64,
    pub top: f64,
    pub bottom: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DumpTable {
    /// `[x0, top, x1, bottom]`.
    pub bbox: [f64; 4],
    #[serde(default)]
    pub rows: Vec<Vec<Option<String>>>,
}
