//! # Typed Domain Records
//!
//! One struct per entity kind. Records are constructed only at the
//! domain-mapper boundary, are immutable once built, and carry their
//! foreign identities verbatim — referential integrity is eventual.
//!
//! The `DomainRecord` trait is the seam between the concrete structs and
//! the store/index/query machinery: it exposes the record's kind, its
//! identity, its declared indexable fields, and typed by-name field
//! access for filter evaluation. Structured list columns are stored but
//! are not filterable.

use crate::types::{FieldValue, OpinionKind, PrecedentialStatus, RecordId, RecordKind};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

// =============================================================================
// DOMAIN RECORD TRAIT
// =============================================================================

/// Behavior every persisted record kind must provide.
pub trait DomainRecord: Serialize + DeserializeOwned + Clone + std::fmt::Debug {
    /// The entity kind of this record type.
    const KIND: RecordKind;

    /// Fields with a maintained equality index, in declaration order.
    const INDEXED_FIELDS: &'static [&'static str];

    /// The unique identity of this record within its kind.
    fn id(&self) -> RecordId;

    /// Typed access to a scalar field by name; `None` when the field is
    /// unknown or absent on this record.
    fn field_value(&self, field: &str) -> Option<FieldValue>;

    /// Current `(field, index key)` memberships for this record.
    ///
    /// Absent fields contribute no entry.
    fn index_entries(&self) -> Vec<(&'static str, String)> {
        Self::INDEXED_FIELDS
            .iter()
            .filter_map(|field| {
                self.field_value(field)
                    .map(|value| (*field, value.index_key()))
            })
            .collect()
    }
}

// =============================================================================
// FIELD VALUE HELPERS
// =============================================================================

fn fv_str(value: &Option<String>) -> Option<FieldValue> {
    value.as_ref().map(|s| FieldValue::Str(s.clone()))
}

fn fv_int(value: Option<i64>) -> Option<FieldValue> {
    value.map(FieldValue::Int)
}

fn fv_float(value: Option<f64>) -> Option<FieldValue> {
    value.map(FieldValue::Float)
}

fn fv_bool(value: Option<bool>) -> Option<FieldValue> {
    value.map(FieldValue::Bool)
}

fn fv_date(value: Option<NaiveDate>) -> Option<FieldValue> {
    value.map(FieldValue::Date)
}

fn fv_ts(value: Option<NaiveDateTime>) -> Option<FieldValue> {
    value.map(FieldValue::Timestamp)
}

fn fv_id(value: Option<RecordId>) -> Option<FieldValue> {
    value.map(FieldValue::from)
}

// =============================================================================
// COURT
// =============================================================================

/// A court of record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Court {
    pub id: RecordId,
    pub full_name: Option<String>,
    pub short_name: Option<String>,
    pub jurisdiction: Option<String>,
    pub position: Option<f64>,
    pub citation_string: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl DomainRecord for Court {
    const KIND: RecordKind = RecordKind::Court;
    const INDEXED_FIELDS: &'static [&'static str] = &["jurisdiction", "full_name"];

    fn id(&self) -> RecordId {
        self.id
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(FieldValue::from(self.id)),
            "full_name" => fv_str(&self.full_name),
            "short_name" => fv_str(&self.short_name),
            "jurisdiction" => fv_str(&self.jurisdiction),
            "position" => fv_float(self.position),
            "citation_string" => fv_str(&self.citation_string),
            "start_date" => fv_date(self.start_date),
            "end_date" => fv_date(self.end_date),
            "notes" => fv_str(&self.notes),
            _ => None,
        }
    }
}

// =============================================================================
// DOCKET
// =============================================================================

/// A docket: the record of proceedings for one case before one court.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Docket {
    pub id: RecordId,
    pub date_created: Option<NaiveDateTime>,
    pub date_modified: Option<NaiveDateTime>,
    pub source: Option<String>,
    pub court_id: RecordId,
    pub appeal_from_id: Option<RecordId>,
    pub case_name: String,
    pub case_name_short: Option<String>,
    pub case_name_full: Option<String>,
    pub slug: Option<String>,
    pub docket_number: String,
    pub date_filed: Option<NaiveDate>,
    pub date_filed_is_approximate: Option<bool>,
    pub date_terminated: Option<NaiveDate>,
    pub date_terminated_is_approximate: Option<bool>,
    pub federal_dn_case_type: Option<String>,
    pub federal_dn_office_code: Option<String>,
    pub federal_defendant_number: Option<String>,
}

impl DomainRecord for Docket {
    const KIND: RecordKind = RecordKind::Docket;
    const INDEXED_FIELDS: &'static [&'static str] = &["court_id", "case_name", "docket_number"];

    fn id(&self) -> RecordId {
        self.id
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(FieldValue::from(self.id)),
            "date_created" => fv_ts(self.date_created),
            "date_modified" => fv_ts(self.date_modified),
            "source" => fv_str(&self.source),
            "court_id" => Some(FieldValue::from(self.court_id)),
            "appeal_from_id" => fv_id(self.appeal_from_id),
            "case_name" => Some(FieldValue::Str(self.case_name.clone())),
            "case_name_short" => fv_str(&self.case_name_short),
            "case_name_full" => fv_str(&self.case_name_full),
            "slug" => fv_str(&self.slug),
            "docket_number" => Some(FieldValue::Str(self.docket_number.clone())),
            "date_filed" => fv_date(self.date_filed),
            "date_filed_is_approximate" => fv_bool(self.date_filed_is_approximate),
            "date_terminated" => fv_date(self.date_terminated),
            "date_terminated_is_approximate" => fv_bool(self.date_terminated_is_approximate),
            "federal_dn_case_type" => fv_str(&self.federal_dn_case_type),
            "federal_dn_office_code" => fv_str(&self.federal_dn_office_code),
            "federal_defendant_number" => fv_str(&self.federal_defendant_number),
            _ => None,
        }
    }
}

// =============================================================================
// OPINION CLUSTER
// =============================================================================

/// A cluster of opinions disposing of one case on one docket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpinionCluster {
    pub id: RecordId,
    pub date_created: Option<NaiveDateTime>,
    pub date_modified: Option<NaiveDateTime>,
    pub judges: Option<String>,
    pub date_filed: Option<NaiveDate>,
    pub date_filed_is_approximate: Option<bool>,
    pub slug: Option<String>,
    pub case_name: Option<String>,
    pub case_name_short: Option<String>,
    pub case_name_full: Option<String>,
    pub scdb_id: Option<String>,
    pub scdb_decision_direction: Option<String>,
    pub scdb_votes_majority: Option<i64>,
    pub scdb_votes_minority: Option<i64>,
    pub source: Option<String>,
    pub procedural_history: Option<String>,
    pub attorneys: Option<String>,
    pub nature_of_suit: Option<String>,
    pub posture: Option<String>,
    pub syllabus: Option<String>,
    pub headnotes: Option<String>,
    pub summary: Option<String>,
    pub disposition: Option<String>,
    pub history: Option<String>,
    pub other_dates: Option<String>,
    pub cross_reference: Option<String>,
    pub correction: Option<String>,
    pub citation_count: Option<i64>,
    pub precedential_status: PrecedentialStatus,
    pub date_blocked: Option<NaiveDate>,
    pub blocked: Option<bool>,
    pub docket_id: RecordId,
    pub sub_opinions: Vec<RecordId>,
}

impl DomainRecord for OpinionCluster {
    const KIND: RecordKind = RecordKind::OpinionCluster;
    const INDEXED_FIELDS: &'static [&'static str] = &["docket_id", "precedential_status"];

    fn id(&self) -> RecordId {
        self.id
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(FieldValue::from(self.id)),
            "date_created" => fv_ts(self.date_created),
            "date_modified" => fv_ts(self.date_modified),
            "judges" => fv_str(&self.judges),
            "date_filed" => fv_date(self.date_filed),
            "date_filed_is_approximate" => fv_bool(self.date_filed_is_approximate),
            "slug" => fv_str(&self.slug),
            "case_name" => fv_str(&self.case_name),
            "case_name_short" => fv_str(&self.case_name_short),
            "case_name_full" => fv_str(&self.case_name_full),
            "scdb_id" => fv_str(&self.scdb_id),
            "scdb_decision_direction" => fv_str(&self.scdb_decision_direction),
            "scdb_votes_majority" => fv_int(self.scdb_votes_majority),
            "scdb_votes_minority" => fv_int(self.scdb_votes_minority),
            "source" => fv_str(&self.source),
            "procedural_history" => fv_str(&self.procedural_history),
            "attorneys" => fv_str(&self.attorneys),
            "nature_of_suit" => fv_str(&self.nature_of_suit),
            "posture" => fv_str(&self.posture),
            "syllabus" => fv_str(&self.syllabus),
            "headnotes" => fv_str(&self.headnotes),
            "summary" => fv_str(&self.summary),
            "disposition" => fv_str(&self.disposition),
            "history" => fv_str(&self.history),
            "other_dates" => fv_str(&self.other_dates),
            "cross_reference" => fv_str(&self.cross_reference),
            "correction" => fv_str(&self.correction),
            "citation_count" => fv_int(self.citation_count),
            "precedential_status" => Some(FieldValue::Str(
                self.precedential_status.code().to_string(),
            )),
            "date_blocked" => fv_date(self.date_blocked),
            "blocked" => fv_bool(self.blocked),
            "docket_id" => Some(FieldValue::from(self.docket_id)),
            _ => None,
        }
    }
}

// =============================================================================
// OPINION
// =============================================================================

/// One authored opinion within a cluster. The markup fields are the
/// newline-bearing payloads the row reconstructor exists for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opinion {
    pub id: RecordId,
    pub date_created: Option<NaiveDateTime>,
    pub date_modified: Option<NaiveDateTime>,
    pub kind: OpinionKind,
    pub sha1: Option<String>,
    pub page_count: Option<i64>,
    pub download_url: Option<String>,
    pub local_path: Option<String>,
    pub plain_text: Option<String>,
    pub html: Option<String>,
    pub html_lawbox: Option<String>,
    pub html_columbia: Option<String>,
    pub html_anon_2020: Option<String>,
    pub xml_harvard: Option<String>,
    pub html_with_citations: Option<String>,
    pub extracted_by_ocr: Option<bool>,
    pub author_id: Option<RecordId>,
    pub per_curiam: Option<bool>,
    pub joined_by: Vec<RecordId>,
    pub cluster_id: RecordId,
}

impl DomainRecord for Opinion {
    const KIND: RecordKind = RecordKind::Opinion;
    const INDEXED_FIELDS: &'static [&'static str] = &["cluster_id", "kind", "author_id"];

    fn id(&self) -> RecordId {
        self.id
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(FieldValue::from(self.id)),
            "date_created" => fv_ts(self.date_created),
            "date_modified" => fv_ts(self.date_modified),
            "kind" => Some(FieldValue::Str(self.kind.code().to_string())),
            "sha1" => fv_str(&self.sha1),
            "page_count" => fv_int(self.page_count),
            "download_url" => fv_str(&self.download_url),
            "local_path" => fv_str(&self.local_path),
            "plain_text" => fv_str(&self.plain_text),
            "html" => fv_str(&self.html),
            "html_lawbox" => fv_str(&self.html_lawbox),
            "html_columbia" => fv_str(&self.html_columbia),
            "html_anon_2020" => fv_str(&self.html_anon_2020),
            "xml_harvard" => fv_str(&self.xml_harvard),
            "html_with_citations" => fv_str(&self.html_with_citations),
            "extracted_by_ocr" => fv_bool(self.extracted_by_ocr),
            "author_id" => fv_id(self.author_id),
            "per_curiam" => fv_bool(self.per_curiam),
            "cluster_id" => Some(FieldValue::from(self.cluster_id)),
            _ => None,
        }
    }
}

// =============================================================================
// CITATION
// =============================================================================

/// One directed citation edge: a citing opinion referencing a cited one.
///
/// The export carries no identity column for citations; identity is
/// synthesized from the (citing, cited) pair, which is the natural
/// upsert key for the edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub citing_opinion_id: RecordId,
    pub cited_opinion_id: RecordId,
    pub depth: i64,
    pub quoted: Option<bool>,
    pub parenthetical_id: Option<RecordId>,
    pub parenthetical_text: Option<String>,
}

impl Citation {
    /// Synthesize the stable identity for a (citing, cited) pair.
    #[must_use]
    pub const fn identity(citing: RecordId, cited: RecordId) -> RecordId {
        RecordId((citing.0 << 32) | (cited.0 & 0xFFFF_FFFF))
    }
}

impl DomainRecord for Citation {
    const KIND: RecordKind = RecordKind::Citation;
    const INDEXED_FIELDS: &'static [&'static str] = &["citing_opinion_id", "cited_opinion_id"];

    fn id(&self) -> RecordId {
        Self::identity(self.citing_opinion_id, self.cited_opinion_id)
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "citing_opinion_id" => Some(FieldValue::from(self.citing_opinion_id)),
            "cited_opinion_id" => Some(FieldValue::from(self.cited_opinion_id)),
            "depth" => Some(FieldValue::Int(self.depth)),
            "quoted" => fv_bool(self.quoted),
            "parenthetical_id" => fv_id(self.parenthetical_id),
            "parenthetical_text" => fv_str(&self.parenthetical_text),
            _ => None,
        }
    }
}

// =============================================================================
// PERSON
// =============================================================================

/// A judge or other person attached to opinions and dockets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: RecordId,
    pub date_created: Option<NaiveDateTime>,
    pub date_modified: Option<NaiveDateTime>,
    pub name_first: Option<String>,
    pub name_middle: Option<String>,
    pub name_last: Option<String>,
    pub name_suffix: Option<String>,
    pub date_dob: Option<NaiveDate>,
    pub date_granularity_dob: Option<String>,
    pub date_dod: Option<NaiveDate>,
    pub date_granularity_dod: Option<String>,
    pub dob_city: Option<String>,
    pub dob_state: Option<String>,
    pub dod_city: Option<String>,
    pub dod_state: Option<String>,
    pub gender: Option<String>,
    pub religion: Option<String>,
    pub ftm_total_received: Option<f64>,
    pub ftm_eid: Option<String>,
    pub has_photo: Option<bool>,
    pub is_alias_of: Option<RecordId>,
}

impl DomainRecord for Person {
    const KIND: RecordKind = RecordKind::Person;
    const INDEXED_FIELDS: &'static [&'static str] = &["name_last", "is_alias_of"];

    fn id(&self) -> RecordId {
        self.id
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(FieldValue::from(self.id)),
            "date_created" => fv_ts(self.date_created),
            "date_modified" => fv_ts(self.date_modified),
            "name_first" => fv_str(&self.name_first),
            "name_middle" => fv_str(&self.name_middle),
            "name_last" => fv_str(&self.name_last),
            "name_suffix" => fv_str(&self.name_suffix),
            "date_dob" => fv_date(self.date_dob),
            "date_granularity_dob" => fv_str(&self.date_granularity_dob),
            "date_dod" => fv_date(self.date_dod),
            "date_granularity_dod" => fv_str(&self.date_granularity_dod),
            "dob_city" => fv_str(&self.dob_city),
            "dob_state" => fv_str(&self.dob_state),
            "dod_city" => fv_str(&self.dod_city),
            "dod_state" => fv_str(&self.dod_state),
            "gender" => fv_str(&self.gender),
            "religion" => fv_str(&self.religion),
            "ftm_total_received" => fv_float(self.ftm_total_received),
            "ftm_eid" => fv_str(&self.ftm_eid),
            "has_photo" => fv_bool(self.has_photo),
            "is_alias_of" => fv_id(self.is_alias_of),
            _ => None,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
