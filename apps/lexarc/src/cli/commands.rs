//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use lexarc_core::{
    Citation, Court, DocStore, Docket, FieldValue, Filter, FilterOp, FilterValue, Importer,
    LexarcError, Opinion, OpinionCluster, Person, RecordId, RecordKind, SearchEngine, SearchQuery,
    SortOrder,
};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Run a block with `$ty` bound to the concrete record type of a kind.
macro_rules! with_kind {
    ($kind:expr, $ty:ident, $body:block) => {
        match $kind {
            RecordKind::Court => {
                type $ty = Court;
                $body
            }
            RecordKind::Docket => {
                type $ty = Docket;
                $body
            }
            RecordKind::OpinionCluster => {
                type $ty = OpinionCluster;
                $body
            }
            RecordKind::Opinion => {
                type $ty = Opinion;
                $body
            }
            RecordKind::Citation => {
                type $ty = Citation;
                $body
            }
            RecordKind::Person => {
                type $ty = Person;
                $body
            }
        }
    };
}

// =============================================================================
// ARGUMENT PARSING
// =============================================================================

/// Resolve a kind name given on the command line.
fn parse_kind(name: &str) -> Result<RecordKind, LexarcError> {
    RecordKind::from_name(name).ok_or_else(|| {
        LexarcError::QueryError(format!(
            "unknown kind '{name}' (expected one of: courts, dockets, opinion_clusters, opinions, citations, people)"
        ))
    })
}

/// Type a literal value: integer, float, boolean or date first, falling
/// back to a string.
fn typed_value(literal: &str) -> FieldValue {
    if let Ok(i) = literal.parse::<i64>() {
        return FieldValue::Int(i);
    }
    if let Ok(x) = literal.parse::<f64>() {
        return FieldValue::Float(x);
    }
    match literal {
        "true" => return FieldValue::Bool(true),
        "false" => return FieldValue::Bool(false),
        _ => {}
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(literal, "%Y-%m-%d") {
        return FieldValue::Date(date);
    }
    FieldValue::Str(literal.to_string())
}

/// Parse one `field:op:value` predicate.
fn parse_filter(spec: &str) -> Result<Filter, LexarcError> {
    let mut parts = spec.splitn(3, ':');
    let (Some(field), Some(op_name), Some(literal)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(LexarcError::QueryError(format!(
            "malformed filter '{spec}' (expected field:op:value)"
        )));
    };

    let op = FilterOp::from_name(op_name).ok_or_else(|| {
        LexarcError::QueryError(format!("unknown operator '{op_name}' in filter '{spec}'"))
    })?;

    let value = match op {
        FilterOp::Between => {
            let (low, high) = literal.split_once("..").ok_or_else(|| {
                LexarcError::QueryError(format!(
                    "operator 'between' expects low..high, got '{literal}'"
                ))
            })?;
            FilterValue::Range(typed_value(low), typed_value(high))
        }
        FilterOp::InSet | FilterOp::NotInSet => {
            FilterValue::Set(literal.split(',').map(typed_value).collect())
        }
        // Text operators always compare string forms.
        FilterOp::Contains
        | FilterOp::StartsWith
        | FilterOp::EndsWith
        | FilterOp::Regex
        | FilterOp::Fuzzy => FilterValue::Scalar(FieldValue::Str(literal.to_string())),
        _ => FilterValue::Scalar(typed_value(literal)),
    };

    Ok(Filter::new(field, op, value))
}

// =============================================================================
// IMPORT COMMAND
// =============================================================================

/// Import one decompressed bulk file.
pub fn cmd_import(
    data_dir: &Path,
    json_mode: bool,
    file: &Path,
    kind: &str,
    limit: Option<u64>,
    progress_every: u64,
) -> Result<(), LexarcError> {
    let kind = parse_kind(kind)?;
    let store = DocStore::open(data_dir)?;

    let handle = File::open(file)
        .map_err(|e| LexarcError::IoError(format!("cannot open {}: {e}", file.display())))?;

    let mut importer = Importer::new(&store).with_progress_every(progress_every);
    if let Some(limit) = limit {
        importer = importer.with_limit(limit);
    }

    let report = importer.import_stream(kind, BufReader::new(handle))?;

    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Import Summary ({kind})");
    println!("======================");
    println!("Logical rows:  {}", report.logical_rows);
    println!("Imported:      {}", report.imported);
    println!("Dropped rows:  {}", report.dropped_rows);
    println!("Failed rows:   {}", report.failed_rows);
    if !report.errors.is_empty() {
        println!();
        println!("Errors:");
        for (message, count) in &report.errors {
            println!("  {count:>6}  {message}");
        }
    }

    Ok(())
}

// =============================================================================
// GET / DELETE COMMANDS
// =============================================================================

/// Fetch and print one record.
pub fn cmd_get(data_dir: &Path, kind: &str, id: u64) -> Result<(), LexarcError> {
    let kind = parse_kind(kind)?;
    let store = DocStore::open(data_dir)?;

    with_kind!(kind, R, {
        match store.get::<R>(RecordId(id))? {
            Some(record) => {
                let rendered = serde_json::to_string_pretty(&record)
                    .map_err(|e| LexarcError::SerializationError(e.to_string()))?;
                println!("{rendered}");
            }
            None => println!("{kind}/{id}: not found"),
        }
    });

    Ok(())
}

/// Delete one record and its index memberships.
pub fn cmd_delete(data_dir: &Path, kind: &str, id: u64) -> Result<(), LexarcError> {
    let kind = parse_kind(kind)?;
    let store = DocStore::open(data_dir)?;

    let removed = with_kind!(kind, R, { store.delete::<R>(RecordId(id))? });
    if removed {
        println!("deleted {kind}/{id}");
    } else {
        println!("{kind}/{id}: not found");
    }

    Ok(())
}

// =============================================================================
// QUERY COMMAND
// =============================================================================

/// Search one kind.
pub fn cmd_query(
    data_dir: &Path,
    json_mode: bool,
    kind: &str,
    filter_specs: &[String],
    sort: Option<&str>,
    desc: bool,
    offset: usize,
    limit: Option<usize>,
) -> Result<(), LexarcError> {
    let kind = parse_kind(kind)?;
    let store = DocStore::open(data_dir)?;
    let engine = SearchEngine::new(&store);

    let mut query = SearchQuery::new().paginate(offset, limit);
    for spec in filter_specs {
        query = query.filter(parse_filter(spec)?);
    }
    if let Some(field) = sort {
        let order = if desc {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        };
        query = query.sort_by(field, order);
    }

    with_kind!(kind, R, {
        let result = engine.search::<R>(&query)?;

        if json_mode {
            println!(
                "{}",
                serde_json::to_string_pretty(&result).unwrap_or_default()
            );
            return Ok(());
        }

        println!(
            "{} matched, showing {} (offset {})",
            result.matched,
            result.records.len(),
            offset
        );
        for record in &result.records {
            let line = serde_json::to_string(&record)
                .map_err(|e| LexarcError::SerializationError(e.to_string()))?;
            println!("{line}");
        }
    });

    Ok(())
}

// =============================================================================
// CITATION NETWORK COMMAND
// =============================================================================

/// Traverse the citation graph from one opinion.
pub fn cmd_cite_network(
    data_dir: &Path,
    json_mode: bool,
    id: u64,
    depth: usize,
) -> Result<(), LexarcError> {
    let store = DocStore::open(data_dir)?;
    let engine = SearchEngine::new(&store);

    let traversal = engine.traverse_citations(RecordId(id), depth)?;

    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&traversal).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Citation Network from opinion {id} (depth {depth})");
    println!("=================================================");
    for node in &traversal.nodes {
        println!("  depth {}: opinion {}", node.depth, node.id);
    }
    println!();
    println!("Edges:");
    for edge in &traversal.edges {
        println!("  {} -> {}", edge.citing, edge.cited);
    }

    Ok(())
}

// =============================================================================
// STATS / REBUILD COMMANDS
// =============================================================================

/// Show per-kind storage statistics.
pub fn cmd_stats(data_dir: &Path, json_mode: bool) -> Result<(), LexarcError> {
    let store = DocStore::open(data_dir)?;

    let mut all = Vec::new();
    for kind in RecordKind::ALL {
        all.push(store.stats(kind)?);
    }

    if json_mode {
        println!("{}", serde_json::to_string_pretty(&all).unwrap_or_default());
        return Ok(());
    }

    println!("lexarc Store Status");
    println!("===================");
    println!("Store: {}", data_dir.display());
    println!();
    println!("{:<18} {:>10} {:>8} {:>12}", "kind", "documents", "fields", "bytes");
    for stats in &all {
        println!(
            "{:<18} {:>10} {:>8} {:>12}",
            stats.kind.as_str(),
            stats.documents,
            stats.indexed_fields,
            stats.bytes
        );
    }

    Ok(())
}

/// Recompute a kind's equality indexes.
pub fn cmd_rebuild_index(data_dir: &Path, json_mode: bool, kind: &str) -> Result<(), LexarcError> {
    let kind = parse_kind(kind)?;
    let store = DocStore::open(data_dir)?;

    let report = with_kind!(kind, R, { store.rebuild_index::<R>()? });

    if json_mode {
        let output = serde_json::json!({
            "kind": kind.as_str(),
            "indexed": report.indexed,
            "skipped": report.skipped,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Rebuilt indexes for {kind}");
    println!("  indexed: {}", report.indexed);
    println!("  skipped: {}", report.skipped);

    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn filters_parse_with_typed_values() {
        let filter = parse_filter("court_id:eq:5").expect("filter");
        assert_eq!(filter.field, "court_id");
        assert_eq!(filter.op, FilterOp::Equals);
        assert_eq!(filter.value, FilterValue::Scalar(FieldValue::Int(5)));
    }

    #[test]
    fn text_operators_keep_string_values() {
        let filter = parse_filter("docket_number:starts_with:1:20-cv").expect("filter");
        assert_eq!(
            filter.value,
            FilterValue::Scalar(FieldValue::Str("1:20-cv".to_string()))
        );
    }

    #[test]
    fn between_parses_a_range() {
        let filter = parse_filter("date_filed:between:2020-01-01..2020-12-31").expect("filter");
        match filter.value {
            FilterValue::Range(FieldValue::Date(_), FieldValue::Date(_)) => {}
            other => panic!("expected date range, got {other:?}"),
        }
    }

    #[test]
    fn in_set_splits_on_commas() {
        let filter = parse_filter("kind:in:020lead,040dissent").expect("filter");
        assert_eq!(
            filter.value,
            FilterValue::Set(vec![
                FieldValue::Str("020lead".to_string()),
                FieldValue::Str("040dissent".to_string()),
            ])
        );
    }

    #[test]
    fn malformed_specs_are_rejected() {
        assert!(parse_filter("no-separators").is_err());
        assert!(parse_filter("field:like:value").is_err());
        assert!(parse_filter("f:between:not-a-range").is_err());
    }

    #[test]
    fn kind_names_resolve() {
        assert_eq!(parse_kind("opinions").expect("kind"), RecordKind::Opinion);
        assert!(parse_kind("verdicts").is_err());
    }
}
