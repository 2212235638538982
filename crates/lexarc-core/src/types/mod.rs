//! # Core Type Definitions
//!
//! This module contains the shared vocabulary of the lexarc pipeline:
//! - Record identity and kind (`RecordId`, `RecordKind`)
//! - Typed field values exposed to the query engine (`FieldValue`)
//! - Closed enumeration vocabularies (`PrecedentialStatus`, `OpinionKind`)
//! - Error types (`LexarcError`)
//!
//! ## Determinism Guarantees
//!
//! All types implement `Ord` where they participate in `BTreeMap`/`BTreeSet`
//! keys, so iteration order — and therefore query output order — is stable.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// RECORD IDENTITY
// =============================================================================

/// Unique numeric identity of a record within its kind.
///
/// Identities come verbatim from the export's identity column and double
/// as the document address on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub u64);

impl RecordId {
    /// Create a new record identity.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw identity value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// RECORD KIND
// =============================================================================

/// The six entity kinds served by the document store.
///
/// Kind names double as storage directory names and bulk-file prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Court,
    Docket,
    OpinionCluster,
    Opinion,
    Citation,
    Person,
}

impl RecordKind {
    /// All kinds in storage order.
    pub const ALL: [RecordKind; 6] = [
        RecordKind::Court,
        RecordKind::Docket,
        RecordKind::OpinionCluster,
        RecordKind::Opinion,
        RecordKind::Citation,
        RecordKind::Person,
    ];

    /// Stable storage name for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            RecordKind::Court => "courts",
            RecordKind::Docket => "dockets",
            RecordKind::OpinionCluster => "opinion_clusters",
            RecordKind::Opinion => "opinions",
            RecordKind::Citation => "citations",
            RecordKind::Person => "people",
        }
    }

    /// Resolve a storage name back to a kind.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        RecordKind::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// FIELD VALUES
// =============================================================================

/// A typed scalar as exposed by a record to the query engine.
///
/// This is the comparison domain for filter operators and sort keys.
/// Structured (JSON) columns are not filterable and never surface here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl FieldValue {
    /// Canonical string form used as the equality-index key.
    ///
    /// Must be injective per field: two distinct values of the same field
    /// never share a key.
    #[must_use]
    pub fn index_key(&self) -> String {
        match self {
            FieldValue::Str(s) => s.clone(),
            FieldValue::Int(i) => i.to_string(),
            FieldValue::Float(x) => x.to_string(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            FieldValue::Timestamp(t) => t.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<RecordId> for FieldValue {
    fn from(id: RecordId) -> Self {
        FieldValue::Int(id.0 as i64)
    }
}

// =============================================================================
// VOCABULARIES
// =============================================================================

/// Precedential status of an opinion cluster.
///
/// Textual codes outside the closed vocabulary map to `Unknown` — never
/// an error path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PrecedentialStatus {
    Published,
    Unpublished,
    Errata,
    Separate,
    InChambers,
    RelatingTo,
    Unknown,
}

impl PrecedentialStatus {
    /// Map an export code to a status. Unrecognized codes become `Unknown`.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "Published" => PrecedentialStatus::Published,
            "Unpublished" => PrecedentialStatus::Unpublished,
            "Errata" => PrecedentialStatus::Errata,
            "Separate" => PrecedentialStatus::Separate,
            "In-chambers" => PrecedentialStatus::InChambers,
            "Relating-to" => PrecedentialStatus::RelatingTo,
            _ => PrecedentialStatus::Unknown,
        }
    }

    /// The export code for this status.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            PrecedentialStatus::Published => "Published",
            PrecedentialStatus::Unpublished => "Unpublished",
            PrecedentialStatus::Errata => "Errata",
            PrecedentialStatus::Separate => "Separate",
            PrecedentialStatus::InChambers => "In-chambers",
            PrecedentialStatus::RelatingTo => "Relating-to",
            PrecedentialStatus::Unknown => "Unknown",
        }
    }
}

/// The kind of an individual opinion within a cluster.
///
/// The export uses numerically-prefixed codes (`010combined`, ...);
/// the prefix encodes presentation order and is kept as part of the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OpinionKind {
    Combined,
    Unanimous,
    Lead,
    Plurality,
    Concurrence,
    ConcurrenceInPart,
    Dissent,
    Addendum,
    Remittitur,
    Rehearing,
    OnTheMerits,
    OnMotionToStrike,
    TrialCourt,
    Unknown,
}

impl OpinionKind {
    /// Map an export code to an opinion kind. Unrecognized codes become
    /// `Unknown`.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "010combined" => OpinionKind::Combined,
            "015unamimous" => OpinionKind::Unanimous,
            "020lead" => OpinionKind::Lead,
            "025plurality" => OpinionKind::Plurality,
            "030concurrence" => OpinionKind::Concurrence,
            "035concurrenceinpart" => OpinionKind::ConcurrenceInPart,
            "040dissent" => OpinionKind::Dissent,
            "050addendum" => OpinionKind::Addendum,
            "060remittitur" => OpinionKind::Remittitur,
            "070rehearing" => OpinionKind::Rehearing,
            "080onthemerits" => OpinionKind::OnTheMerits,
            "090onmotiontostrike" => OpinionKind::OnMotionToStrike,
            "100trialcourt" => OpinionKind::TrialCourt,
            _ => OpinionKind::Unknown,
        }
    }

    /// The export code for this opinion kind.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            OpinionKind::Combined => "010combined",
            OpinionKind::Unanimous => "015unamimous",
            OpinionKind::Lead => "020lead",
            OpinionKind::Plurality => "025plurality",
            OpinionKind::Concurrence => "030concurrence",
            OpinionKind::ConcurrenceInPart => "035concurrenceinpart",
            OpinionKind::Dissent => "040dissent",
            OpinionKind::Addendum => "050addendum",
            OpinionKind::Remittitur => "060remittitur",
            OpinionKind::Rehearing => "070rehearing",
            OpinionKind::OnTheMerits => "080onthemerits",
            OpinionKind::OnMotionToStrike => "090onmotiontostrike",
            OpinionKind::TrialCourt => "100trialcourt",
            OpinionKind::Unknown => "999unknown",
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the lexarc system.
///
/// - Decode-local failures never surface here; they degrade to absent values
/// - Row-local failures surface as `ValidationError` and are tallied, not fatal
/// - Everything else aborts the current operation and propagates to the caller
#[derive(Debug, Error)]
pub enum LexarcError {
    /// The input stream or storage medium failed.
    #[error("I/O error: {0}")]
    IoError(String),

    /// A record could not be serialized for storage.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A stored document could not be deserialized.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// A required field was missing or invalid; names the first such field.
    #[error("Validation failed: missing or invalid required field '{0}'")]
    ValidationError(String),

    /// A query was malformed (bad operator/value combination, invalid
    /// regular expression, unknown field).
    #[error("Query error: {0}")]
    QueryError(String),

    /// An index structure could not be read or written.
    #[error("Index error: {0}")]
    IndexError(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_round_trip() {
        for kind in RecordKind::ALL {
            assert_eq!(RecordKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(RecordKind::from_name("nonsense"), None);
    }

    #[test]
    fn precedential_status_unknown_fallback() {
        assert_eq!(
            PrecedentialStatus::from_code("Published"),
            PrecedentialStatus::Published
        );
        assert_eq!(
            PrecedentialStatus::from_code("Apocryphal"),
            PrecedentialStatus::Unknown
        );
    }

    #[test]
    fn opinion_kind_codes_round_trip() {
        for code in [
            "010combined",
            "020lead",
            "040dissent",
            "100trialcourt",
        ] {
            let kind = OpinionKind::from_code(code);
            assert_ne!(kind, OpinionKind::Unknown);
            assert_eq!(kind.code(), code);
        }
        assert_eq!(OpinionKind::from_code("500mystery"), OpinionKind::Unknown);
    }

    #[test]
    fn index_key_distinguishes_values() {
        let a = FieldValue::Int(10);
        let b = FieldValue::Int(100);
        assert_ne!(a.index_key(), b.index_key());
    }

    #[test]
    fn index_key_date_format() {
        let d = NaiveDate::from_ymd_opt(2021, 1, 29).expect("valid date");
        assert_eq!(FieldValue::Date(d).index_key(), "2021-01-29");
    }
}
