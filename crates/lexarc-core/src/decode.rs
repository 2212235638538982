//! # Record Decoder
//!
//! Pure functions converting one raw cell string into one typed scalar,
//! or "absent".
//!
//! Every decoder degrades to absent on malformed input — decode failures
//! never abort row processing. Required-field enforcement happens later,
//! at the domain-mapper boundary.
//!
//! Raw cells arrive with the export's quoting intact (see `primitives`):
//! the two-character null token decodes to absent, while a zero-length
//! cell decodes to an empty-but-present string. The two are never
//! conflated.

use crate::primitives::{
    DATE_FORMATS, ESCAPE_CHAR, FALSE_TOKENS, NULL_TOKEN, QUOTE_CHAR, TIMESTAMP_FORMATS,
    TRUE_TOKENS,
};
use crate::types::RecordId;
use chrono::{NaiveDate, NaiveDateTime};

// =============================================================================
// QUOTING
// =============================================================================

/// Strip the export's quoting and escaping from a raw cell.
///
/// Returns `None` for the canonical null token. A zero-length cell stays
/// a zero-length string. Cells that are not quoted (the header line, or
/// hand-written input) pass through verbatim.
#[must_use]
pub fn unquote(raw: &str) -> Option<String> {
    if raw == NULL_TOKEN {
        return None;
    }

    if raw.len() >= 2 * QUOTE_CHAR.len_utf8()
        && raw.starts_with(QUOTE_CHAR)
        && raw.ends_with(QUOTE_CHAR)
    {
        let inner = &raw[QUOTE_CHAR.len_utf8()..raw.len() - QUOTE_CHAR.len_utf8()];
        return Some(unescape(inner));
    }

    Some(raw.to_string())
}

/// Resolve backslash escapes inside a quoted cell.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == ESCAPE_CHAR {
            match chars.next() {
                Some(escaped) => out.push(escaped),
                // Trailing lone escape: keep it literal.
                None => out.push(c),
            }
        } else {
            out.push(c);
        }
    }
    out
}

// =============================================================================
// SCALAR DECODERS
// =============================================================================

/// Decode a string cell. Null token → absent; empty cell → empty string.
#[must_use]
pub fn decode_string(raw: &str) -> Option<String> {
    unquote(raw)
}

/// Decode an integer cell. Parse failure → absent.
#[must_use]
pub fn decode_int(raw: &str) -> Option<i64> {
    let cell = unquote(raw)?;
    cell.trim().parse::<i64>().ok()
}

/// Decode an integer cell as a record identity. Negative or non-numeric
/// values are absent.
#[must_use]
pub fn decode_id(raw: &str) -> Option<RecordId> {
    let cell = unquote(raw)?;
    cell.trim().parse::<u64>().ok().map(RecordId)
}

/// Decode a floating-point cell. Parse failure → absent.
#[must_use]
pub fn decode_float(raw: &str) -> Option<f64> {
    let cell = unquote(raw)?;
    cell.trim().parse::<f64>().ok()
}

/// Decode a boolean cell from the closed token sets; anything else is
/// absent.
#[must_use]
pub fn decode_bool(raw: &str) -> Option<bool> {
    let cell = unquote(raw)?;
    let token = cell.trim().to_lowercase();
    if TRUE_TOKENS.contains(&token.as_str()) {
        Some(true)
    } else if FALSE_TOKENS.contains(&token.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Decode a date cell against the known formats; first match wins.
#[must_use]
pub fn decode_date(raw: &str) -> Option<NaiveDate> {
    let cell = unquote(raw)?;
    let value = strip_zone(cell.trim());
    if value.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

/// Decode a timestamp cell against the known formats; first match wins.
///
/// A date-only value decodes to midnight of that date.
#[must_use]
pub fn decode_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let cell = unquote(raw)?;
    let value = strip_zone(cell.trim());
    if value.is_empty() {
        return None;
    }
    for fmt in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(ts);
        }
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Decode a structured (JSON-like) cell into a nested container.
/// Parse failure → absent.
#[must_use]
pub fn decode_json(raw: &str) -> Option<serde_json::Value> {
    let cell = unquote(raw)?;
    let value = cell.trim();
    if value.is_empty() {
        return None;
    }
    serde_json::from_str(value).ok()
}

/// Decode a list of foreign identities.
///
/// Accepts a JSON array of integers or the export's comma-separated list
/// form. Non-numeric items are dropped; an empty cell is an empty list.
#[must_use]
pub fn decode_id_list(raw: &str) -> Option<Vec<RecordId>> {
    let cell = unquote(raw)?;
    let value = cell.trim();
    if value.is_empty() {
        return Some(Vec::new());
    }

    if let Ok(serde_json::Value::Array(items)) = serde_json::from_str(value) {
        return Some(
            items
                .iter()
                .filter_map(|item| item.as_u64().map(RecordId))
                .collect(),
        );
    }

    Some(
        value
            .split(',')
            .filter_map(|item| item.trim().parse::<u64>().ok().map(RecordId))
            .collect(),
    )
}

/// Strip a trailing zone suffix (`+HH[:MM]` or `Z`) from a timestamp.
///
/// The export emits offsets only with `+`; the date's own dashes make a
/// `-` suffix ambiguous, so only `+` is treated as a zone marker.
fn strip_zone(value: &str) -> &str {
    let value = value.strip_suffix('Z').unwrap_or(value);
    match value.rfind('+') {
        Some(pos) if pos > 0 => &value[..pos],
        _ => value,
    }
}

// =============================================================================
// TESTS
// =============================================================================
