//! dsmx: Reading-order text and classification data from positioned words.
//!
//! This is the public API facade crate. It re-exports the types of
//! dsmx-core, the word dump backend of dsmx-source, and provides the
//! [`Extractor`] that runs the two extraction phases over any
//! [`WordSource`].
//!
//! # Architecture
//!
//! - **dsmx-core**: Backend-independent data types and algorithms
//! - **dsmx-source**: Word dump loading ([`JsonWordSource`])
//! - **dsmx** (this crate): Page extraction orchestration and logging
//!
//! # Example
//!
//! ```ignore
//! let source = JsonWordSource::open("words.json")?;
//! let extractor = Extractor::new(source);
//! let pages = extractor.page_indices(10, 49)?;
//! let extraction = extractor.extract_clean(&pages, None)?;
//! println!("{}", format_document(&extraction.pages));
//! ```

mod extractor;

pub use dsmx_core;
pub use dsmx_source;

pub use dsmx_core::{
    BBox, ClassificationTree, ColumnMode, ColumnOptions, CriteriaOutcome, CriteriaSet,
    CriteriaSpec, CriterionRecord, DisorderEntry, ExportExtras, ExportOptions, ExtractError,
    ExtractOptions, FamilyNode, GroupNode, LineOptions, MarginBlacklist, MarginOptions,
    PageDebug, PageRecord, ParserOptions, SourceError, SpacedLetterPolicy, SpecifierBlock,
    SpecifierValue, StructuredDataset, TableBlock, TableOptions, TextLine, Token, WordSource,
    export_structured_dataset, extract_criteria, format_document, format_markdown,
    join_page_texts, parse_classification,
};
pub use dsmx_source::{DumpError, JsonWordSource};
pub use extractor::{Extraction, Extractor, PageLayout};
