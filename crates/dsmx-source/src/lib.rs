//! dsmx-source: Positioned-word dump backend for dsmx.
//!
//! Any PDF decoder that can report words with bounding boxes (and,
//! optionally, table candidates) can feed dsmx by writing a JSON word dump.
//! [`JsonWordSource`] loads such a dump and implements
//! [`WordSource`](dsmx_core::WordSource).

pub mod dump;
pub mod error;
pub mod json_source;

pub use dump::{DumpPage, DumpTable, DumpWord, WordDump};
pub use error::DumpError;
pub use json_source::JsonWordSource;
