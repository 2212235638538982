//! # Domain Mapper
//!
//! One mapping function per entity kind: (header, raw row) → typed
//! Record, or a Validation error naming the first missing/invalid
//! required field.
//!
//! Decode failures on optional fields degrade to absent; enumeration
//! codes outside the vocabulary map to the explicit Unknown member;
//! foreign identities are stored verbatim without existence checks.

use crate::decode;
use crate::reconstruct::Header;
use crate::records::{Citation, Court, Docket, Opinion, OpinionCluster, Person};
use crate::types::{LexarcError, OpinionKind, PrecedentialStatus, RecordId};
use chrono::{NaiveDate, NaiveDateTime};

// =============================================================================
// CELL ACCESS
// =============================================================================

/// Raw cell for a named column, when the header declares it.
fn cell<'a>(header: &Header, row: &'a [String], name: &str) -> Option<&'a str> {
    header
        .position(name)
        .and_then(|i| row.get(i))
        .map(String::as_str)
}

/// Decode a required identity column; absence or a non-integer value is
/// a validation failure naming the column.
fn require_id(header: &Header, row: &[String], name: &str) -> Result<RecordId, LexarcError> {
    cell(header, row, name)
        .and_then(decode::decode_id)
        .ok_or_else(|| LexarcError::ValidationError(name.to_string()))
}

/// Decode a required string column; the null token and an undeclared
/// column are validation failures, an empty-but-present string is not.
fn require_string(header: &Header, row: &[String], name: &str) -> Result<String, LexarcError> {
    cell(header, row, name)
        .and_then(decode::decode_string)
        .ok_or_else(|| LexarcError::ValidationError(name.to_string()))
}

/// Decode a required integer column.
fn require_int(header: &Header, row: &[String], name: &str) -> Result<i64, LexarcError> {
    cell(header, row, name)
        .and_then(decode::decode_int)
        .ok_or_else(|| LexarcError::ValidationError(name.to_string()))
}

fn opt_string(header: &Header, row: &[String], name: &str) -> Option<String> {
    cell(header, row, name).and_then(decode::decode_string)
}

fn opt_int(header: &Header, row: &[String], name: &str) -> Option<i64> {
    cell(header, row, name).and_then(decode::decode_int)
}

fn opt_float(header: &Header, row: &[String], name: &str) -> Option<f64> {
    cell(header, row, name).and_then(decode::decode_float)
}

fn opt_bool(header: &Header, row: &[String], name: &str) -> Option<bool> {
    cell(header, row, name).and_then(decode::decode_bool)
}

fn opt_date(header: &Header, row: &[String], name: &str) -> Option<NaiveDate> {
    cell(header, row, name).and_then(decode::decode_date)
}

fn opt_ts(header: &Header, row: &[String], name: &str) -> Option<NaiveDateTime> {
    cell(header, row, name).and_then(decode::decode_timestamp)
}

fn opt_id(header: &Header, row: &[String], name: &str) -> Option<RecordId> {
    cell(header, row, name).and_then(decode::decode_id)
}

fn id_list(header: &Header, row: &[String], name: &str) -> Vec<RecordId> {
    cell(header, row, name)
        .and_then(decode::decode_id_list)
        .unwrap_or_default()
}

// =============================================================================
// PER-KIND MAPPERS
// =============================================================================

/// Map a courts row. Required: id.
pub fn map_court(header: &Header, row: &[String]) -> Result<Court, LexarcError> {
    Ok(Court {
        id: require_id(header, row, "id")?,
        full_name: opt_string(header, row, "full_name"),
        short_name: opt_string(header, row, "short_name"),
        jurisdiction: opt_string(header, row, "jurisdiction"),
        position: opt_float(header, row, "position"),
        citation_string: opt_string(header, row, "citation_string"),
        start_date: opt_date(header, row, "start_date"),
        end_date: opt_date(header, row, "end_date"),
        notes: opt_string(header, row, "notes"),
    })
}

/// Map a dockets row. Required: id, court_id, case_name, docket_number.
pub fn map_docket(header: &Header, row: &[String]) -> Result<Docket, LexarcError> {
    Ok(Docket {
        id: require_id(header, row, "id")?,
        date_created: opt_ts(header, row, "date_created"),
        date_modified: opt_ts(header, row, "date_modified"),
        source: opt_string(header, row, "source"),
        court_id: require_id(header, row, "court_id")?,
        appeal_from_id: opt_id(header, row, "appeal_from_id"),
        case_name: require_string(header, row, "case_name")?,
        case_name_short: opt_string(header, row, "case_name_short"),
        case_name_full: opt_string(header, row, "case_name_full"),
        slug: opt_string(header, row, "slug"),
        docket_number: require_string(header, row, "docket_number")?,
        date_filed: opt_date(header, row, "date_filed"),
        date_filed_is_approximate: opt_bool(header, row, "date_filed_is_approximate"),
        date_terminated: opt_date(header, row, "date_terminated"),
        date_terminated_is_approximate: opt_bool(header, row, "date_terminated_is_approximate"),
        federal_dn_case_type: opt_string(header, row, "federal_dn_case_type"),
        federal_dn_office_code: opt_string(header, row, "federal_dn_office_code"),
        federal_defendant_number: opt_string(header, row, "federal_defendant_number"),
    })
}

/// Map an opinion_clusters row. Required: id, docket_id.
pub fn map_opinion_cluster(
    header: &Header,
    row: &[String],
) -> Result<OpinionCluster, LexarcError> {
    let precedential_status = opt_string(header, row, "precedential_status")
        .map(|code| PrecedentialStatus::from_code(&code))
        .unwrap_or(PrecedentialStatus::Unknown);

    Ok(OpinionCluster {
        id: require_id(header, row, "id")?,
        date_created: opt_ts(header, row, "date_created"),
        date_modified: opt_ts(header, row, "date_modified"),
        judges: opt_string(header, row, "judges"),
        date_filed: opt_date(header, row, "date_filed"),
        date_filed_is_approximate: opt_bool(header, row, "date_filed_is_approximate"),
        slug: opt_string(header, row, "slug"),
        case_name: opt_string(header, row, "case_name"),
        case_name_short: opt_string(header, row, "case_name_short"),
        case_name_full: opt_string(header, row, "case_name_full"),
        scdb_id: opt_string(header, row, "scdb_id"),
        scdb_decision_direction: opt_string(header, row, "scdb_decision_direction"),
        scdb_votes_majority: opt_int(header, row, "scdb_votes_majority"),
        scdb_votes_minority: opt_int(header, row, "scdb_votes_minority"),
        source: opt_string(header, row, "source"),
        procedural_history: opt_string(header, row, "procedural_history"),
        attorneys: opt_string(header, row, "attorneys"),
        nature_of_suit: opt_string(header, row, "nature_of_suit"),
        posture: opt_string(header, row, "posture"),
        syllabus: opt_string(header, row, "syllabus"),
        headnotes: opt_string(header, row, "headnotes"),
        summary: opt_string(header, row, "summary"),
        disposition: opt_string(header, row, "disposition"),
        history: opt_string(header, row, "history"),
        other_dates: opt_string(header, row, "other_dates"),
        cross_reference: opt_string(header, row, "cross_reference"),
        correction: opt_string(header, row, "correction"),
        citation_count: opt_int(header, row, "citation_count"),
        precedential_status,
        date_blocked: opt_date(header, row, "date_blocked"),
        blocked: opt_bool(header, row, "blocked"),
        docket_id: require_id(header, row, "docket_id")?,
        sub_opinions: id_list(header, row, "sub_opinions"),
    })
}

/// Map an opinions row. Required: id, cluster_id.
///
/// The CSV column is named `type`; absent or unrecognized codes map to
/// `OpinionKind::Unknown`.
pub fn map_opinion(header: &Header, row: &[String]) -> Result<Opinion, LexarcError> {
    let kind = opt_string(header, row, "type")
        .map(|code| OpinionKind::from_code(&code))
        .unwrap_or(OpinionKind::Unknown);

    Ok(Opinion {
        id: require_id(header, row, "id")?,
        date_created: opt_ts(header, row, "date_created"),
        date_modified: opt_ts(header, row, "date_modified"),
        kind,
        sha1: opt_string(header, row, "sha1"),
        page_count: opt_int(header, row, "page_count"),
        download_url: opt_string(header, row, "download_url"),
        local_path: opt_string(header, row, "local_path"),
        plain_text: opt_string(header, row, "plain_text"),
        html: opt_string(header, row, "html"),
        html_lawbox: opt_string(header, row, "html_lawbox"),
        html_columbia: opt_string(header, row, "html_columbia"),
        html_anon_2020: opt_string(header, row, "html_anon_2020"),
        xml_harvard: opt_string(header, row, "xml_harvard"),
        html_with_citations: opt_string(header, row, "html_with_citations"),
        extracted_by_ocr: opt_bool(header, row, "extracted_by_ocr"),
        author_id: opt_id(header, row, "author_id"),
        per_curiam: opt_bool(header, row, "per_curiam"),
        joined_by: id_list(header, row, "joined_by"),
        cluster_id: require_id(header, row, "cluster_id")?,
    })
}

/// Map a citations row. Required: citing_opinion_id, cited_opinion_id,
/// depth.
pub fn map_citation(header: &Header, row: &[String]) -> Result<Citation, LexarcError> {
    Ok(Citation {
        citing_opinion_id: require_id(header, row, "citing_opinion_id")?,
        cited_opinion_id: require_id(header, row, "cited_opinion_id")?,
        depth: require_int(header, row, "depth")?,
        quoted: opt_bool(header, row, "quoted"),
        parenthetical_id: opt_id(header, row, "parenthetical_id"),
        parenthetical_text: opt_string(header, row, "parenthetical_text"),
    })
}

/// Map a people row. Required: id.
pub fn map_person(header: &Header, row: &[String]) -> Result<Person, LexarcError> {
    Ok(Person {
        id: require_id(header, row, "id")?,
        date_created: opt_ts(header, row, "date_created"),
        date_modified: opt_ts(header, row, "date_modified"),
        name_first: opt_string(header, row, "name_first"),
        name_middle: opt_string(header, row, "name_middle"),
        name_last: opt_string(header, row, "name_last"),
        name_suffix: opt_string(header, row, "name_suffix"),
        date_dob: opt_date(header, row, "date_dob"),
        date_granularity_dob: opt_string(header, row, "date_granularity_dob"),
        date_dod: opt_date(header, row, "date_dod"),
        date_granularity_dod: opt_string(header, row, "date_granularity_dod"),
        dob_city: opt_string(header, row, "dob_city"),
        dob_state: opt_string(header, row, "dob_state"),
        dod_city: opt_string(header, row, "dod_city"),
        dod_state: opt_string(header, row, "dod_state"),
        gender: opt_string(header, row, "gender"),
        religion: opt_string(header, row, "religion"),
        ftm_total_received: opt_float(header, row, "ftm_total_received"),
        ftm_eid: opt_string(header, row, "ftm_eid"),
        has_photo: opt_bool(header, row, "has_photo"),
        is_alias_of: opt_id(header, row, "is_alias_of"),
    })
}

// =============================================================================
// TESTS
// =============================================================================
