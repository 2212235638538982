//! # lexarc-core
//!
//! The ingest and query engine for lexarc - THE LOGIC.
//!
//! This crate turns very large, malformed tabular export files (one
//! logical record per row, with embedded unescaped newlines and
//! SQL-style null markers) into a durable, indexed, queryable document
//! store of legal records.
//!
//! ## Pipeline
//!
//! Data flows strictly forward:
//!
//! ```text
//! stream → rows → scalars → records → store + index → query results
//! ```
//!
//! - `reconstruct` recovers logical rows from the raw stream
//! - `decode` converts raw cells into typed scalars (or absent)
//! - `mapper` builds one validated typed record per row
//! - `store` persists documents with atomic per-record replacement
//! - `index` maintains equality indexes consistent with the store
//! - `engine` evaluates filtered/sorted/paginated queries and
//!   citation-graph traversal
//!
//! ## Architectural Constraints
//!
//! - No async, no network dependencies (pure Rust)
//! - Forward-only streaming: a bulk file is never buffered whole;
//!   memory is bounded by one logical row
//! - No process-wide state: every operation goes through an explicit
//!   `DocStore` handle
//! - Decompression and presentation belong to collaborators, not here

// =============================================================================
// MODULES
// =============================================================================

pub mod decode;
pub mod engine;
pub mod import;
pub mod index;
pub mod mapper;
pub mod primitives;
pub mod query;
pub mod reconstruct;
pub mod records;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    FieldValue, LexarcError, OpinionKind, PrecedentialStatus, RecordId, RecordKind,
};

// =============================================================================
// RE-EXPORTS: Pipeline
// =============================================================================

pub use engine::{CitationEdge, CitationNode, CitationTraversal, SearchEngine, SearchResult};
pub use import::{ImportReport, Importer};
pub use index::{IndexManager, RebuildReport};
pub use query::{Filter, FilterOp, FilterValue, SearchQuery, SortOrder, SortSpec};
pub use reconstruct::{Header, RawRow, RowReader};
pub use records::{
    Citation, Court, Docket, DomainRecord, Opinion, OpinionCluster, Person,
};
pub use store::{DocStore, StoreStats};
