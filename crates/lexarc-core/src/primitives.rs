//! # Export Format Primitives
//!
//! Hardcoded constants describing the bulk export dialect and the
//! operational bounds of the pipeline.
//!
//! The export is not standards-compliant CSV: every field is force-quoted
//! with backticks, backslash is the escape character, and rendered-markup
//! fields contain literal unescaped newlines. These constants are the
//! single source of truth for that dialect.

/// The field-opening/closing quote character used by the export.
///
/// A physical line beginning with this character starts a new logical row;
/// that anchor is the only reliable record-boundary signal in the format.
pub const QUOTE_CHAR: char = '`';

/// The escape character inside quoted fields.
pub const ESCAPE_CHAR: char = '\\';

/// The two-character token denoting a SQL NULL.
///
/// Distinct from a zero-length cell, which decodes to an empty-but-present
/// string.
pub const NULL_TOKEN: &str = "``";

/// Timestamp formats tried in order; first match wins.
///
/// A trailing `+HH[:MM]` zone suffix or `Z` is stripped before matching.
pub const TIMESTAMP_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d",
];

/// Date formats tried in order; first match wins.
pub const DATE_FORMATS: [&str; 1] = ["%Y-%m-%d"];

/// Tokens accepted as boolean true (after lowercasing).
pub const TRUE_TOKENS: [&str; 5] = ["true", "t", "1", "yes", "y"];

/// Tokens accepted as boolean false (after lowercasing).
pub const FALSE_TOKENS: [&str; 5] = ["false", "f", "0", "no", "n"];

// =============================================================================
// OPERATIONAL BOUNDS
// =============================================================================

/// Maximum length of an equality-index key.
///
/// Longer canonical values are truncated to this many bytes (on a char
/// boundary) before indexing, keeping index entries bounded for
/// markup-bearing fields.
pub const MAX_INDEX_KEY_LENGTH: usize = 100;

/// Maximum citation-graph traversal depth.
///
/// All queries must be computationally bounded; callers asking for more
/// are clamped to this.
pub const MAX_TRAVERSAL_DEPTH: usize = 100;

/// Maximum edit distance for the fuzzy query operator.
pub const FUZZY_MAX_DISTANCE: usize = 2;

/// zstd compression level for stored documents.
pub const COMPRESSION_LEVEL: i32 = 3;
