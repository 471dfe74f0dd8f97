//! dsmx-core: Backend-independent layout reconstruction and classification parsing.
//!
//! This crate holds the data types and pure algorithms used by dsmx:
//!
//! - **Layout**: positioned word [`Token`]s are clustered into [`TextLine`]s,
//!   ordered by detected column mode, cleaned of repeating headers/footers
//!   ([`scan_margins`] then [`assemble_page`]) and of table content.
//! - **Formatting**: [`format_document`] and [`format_markdown`] turn page
//!   records into readable text.
//! - **Classification**: [`parse_classification`] reads the classification
//!   listing into a family/group/disorder [`ClassificationTree`], which
//!   [`export_structured_dataset`] flattens into linked records.
//! - **Criteria**: [`extract_criteria`] splits a disorder's pages into
//!   lettered criteria, a description and severity details.
//!
//! No I/O happens here; page data arrives through the [`WordSource`] trait.

pub mod cleanup;
pub mod columns;
pub mod criteria;
pub mod document;
pub mod entries;
pub mod error;
pub mod export;
pub mod geometry;
pub mod headings;
pub mod hierarchy;
pub mod ids;
pub mod lines;
pub mod margins;
pub mod markdown;
pub mod page;
pub mod source;
pub mod specifiers;
pub mod tables;
pub mod token;

pub use cleanup::clean_page_text;
pub use columns::{ColumnMode, ColumnOptions, detect_column_mode, order_lines};
pub use criteria::{
    CriteriaOutcome, CriteriaSet, CriteriaSpec, Criterion, CriterionRecord, SeverityTableSpec,
    extract_criteria, normalize_text_block, parse_lettered_criteria, parse_severity_table,
};
pub use document::{format_document, format_document_text};
pub use entries::{DisorderEntry, extract_disorder_entries};
pub use error::{ExtractError, SourceError};
pub use export::{
    DisorderRecord, ExportExtras, ExportOptions, FamilyRecord, GroupRecord, SpecifierRecord,
    SpecifierValueRecord, StructuredDataset, export_structured_dataset,
};
pub use geometry::BBox;
pub use headings::{Heading, HeadingTier, find_family_headings, find_group_headings};
pub use hierarchy::{
    ClassificationTree, DSM5_FAMILY_TITLES, FamilyNode, GroupNode, ParserOptions,
    build_hierarchy, parse_classification,
};
pub use ids::{IdRegistry, slugify_id};
pub use lines::{LineOptions, SpacedLetterPolicy, TextLine, cluster_tokens_into_lines};
pub use margins::{MarginBlacklist, MarginOptions, MarginScan, scan_margins};
pub use markdown::format_markdown;
pub use page::{
    ExtractOptions, PageDebug, PageInput, PageRecord, assemble_page, join_page_texts,
};
pub use source::WordSource;
pub use specifiers::{SpecifierBlock, SpecifierKind, SpecifierValue, parse_specifier_blocks};
pub use tables::{TableBlock, TableOptions, strip_table_tokens};
pub use token::Token;
