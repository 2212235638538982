//! # Pipeline Scenario Tests
//!
//! End-to-end coverage of the ingest pipeline: reconstruct → decode →
//! map → store/index → query.

#![allow(clippy::unwrap_used, clippy::panic)]

use lexarc_core::{
    Court, DocStore, FieldValue, Filter, FilterOp, FilterValue, Importer, Opinion, RecordId,
    RecordKind, RowReader, SearchEngine, SearchQuery, SortOrder, decode,
};
use std::io::Cursor;
use tempfile::tempdir;

fn open_store() -> (tempfile::TempDir, DocStore) {
    let temp = tempdir().expect("temp dir");
    let store = DocStore::open(temp.path()).expect("open store");
    (temp, store)
}

fn import(store: &DocStore, kind: RecordKind, input: &str) -> lexarc_core::ImportReport {
    Importer::new(store)
        .import_stream(kind, Cursor::new(input.as_bytes().to_vec()))
        .expect("import")
}

// =============================================================================
// RECONSTRUCTION SCENARIOS
// =============================================================================

#[test]
fn five_columns_two_physical_lines_one_logical_row() {
    // Header declares 5 columns; the third field carries an embedded
    // newline, splitting the record across two physical lines.
    let input = "c1,c2,c3,c4,c5\n`1`,`a`,`b\nc`,`d`,`e`\n";
    let mut rows = RowReader::new(Cursor::new(input.as_bytes().to_vec())).expect("header");

    let row = rows.next_row().expect("row").expect("one row");
    let decoded: Vec<String> = row
        .iter()
        .map(|cell| decode::decode_string(cell).expect("present"))
        .collect();
    assert_eq!(decoded, vec!["1", "a", "b\nc", "d", "e"]);

    assert_eq!(rows.next_row().expect("eof"), None);
    assert_eq!(rows.dropped_rows(), 0);
}

#[test]
fn embedded_newline_survives_the_whole_pipeline() {
    let (_guard, store) = open_store();

    let input = "id,type,cluster_id,html\n\
                 `11`,`020lead`,`7`,`<p>first line\nsecond line</p>`\n";
    let report = import(&store, RecordKind::Opinion, input);
    assert_eq!(report.imported, 1);

    let opinion: Opinion = store.get(RecordId(11)).expect("get").expect("present");
    assert_eq!(
        opinion.html.as_deref(),
        Some("<p>first line\nsecond line</p>")
    );
}

// =============================================================================
// VALIDATION SCENARIOS
// =============================================================================

#[test]
fn non_numeric_identity_fails_row_but_not_the_file() {
    let (_guard, store) = open_store();

    let input = "id,full_name,jurisdiction\n\
                 `abc`,`Broken Court`,`Federal`\n\
                 `21`,`Working Court`,`Federal`\n\
                 `22`,`Another Court`,`State`\n";
    let report = import(&store, RecordKind::Court, input);

    assert_eq!(report.imported, 2);
    assert_eq!(report.failed_rows, 1);
    assert_eq!(report.errors.len(), 1);
    assert!(store.get::<Court>(RecordId(21)).expect("get").is_some());
    assert!(store.get::<Court>(RecordId(22)).expect("get").is_some());
}

#[test]
fn null_marker_and_empty_string_stay_distinct() {
    let (_guard, store) = open_store();

    // notes is null for court 1, empty-but-present for court 2.
    let input = "id,full_name,jurisdiction,notes\n\
                 `1`,`A`,`Federal`,``\n\
                 `2`,`B`,`Federal`,\n";
    let report = import(&store, RecordKind::Court, input);
    assert_eq!(report.imported, 2);

    let with_null: Court = store.get(RecordId(1)).expect("get").expect("present");
    let with_empty: Court = store.get(RecordId(2)).expect("get").expect("present");
    assert_eq!(with_null.notes, None);
    assert_eq!(with_empty.notes, Some(String::new()));
}

// =============================================================================
// INDEX + QUERY SCENARIOS
// =============================================================================

#[test]
fn jurisdiction_equals_federal_finds_all_three_regardless_of_save_order() {
    for order in [[31u64, 32, 33], [33, 31, 32], [32, 33, 31]] {
        let (_guard, store) = open_store();
        let engine = SearchEngine::new(&store);

        for id in order {
            let header = "id,full_name,jurisdiction\n";
            let row = format!("`{id}`,`Court {id}`,`Federal`\n");
            import(&store, RecordKind::Court, &format!("{header}{row}"));
        }
        // One record outside the target value.
        import(
            &store,
            RecordKind::Court,
            "id,full_name,jurisdiction\n`40`,`Other`,`State`\n",
        );

        let query =
            SearchQuery::new().filter(Filter::equals("jurisdiction", FieldValue::from("Federal")));
        let result = engine.search::<Court>(&query).expect("search");
        let ids: Vec<u64> = result.records.iter().map(|c| c.id.value()).collect();
        assert_eq!(ids, vec![31, 32, 33]);
    }
}

#[test]
fn repeated_paginated_queries_are_deterministic() {
    let (_guard, store) = open_store();
    let engine = SearchEngine::new(&store);

    let mut input = String::from("id,full_name,jurisdiction\n");
    for id in [9u64, 2, 7, 4, 1, 8] {
        input.push_str(&format!("`{id}`,`Same Name`,`Federal`\n"));
    }
    import(&store, RecordKind::Court, &input);

    let query = SearchQuery::new()
        .filter(Filter::equals("jurisdiction", FieldValue::from("Federal")))
        .sort_by("full_name", SortOrder::Ascending)
        .paginate(2, Some(3));

    let page1: Vec<u64> = engine
        .search::<Court>(&query)
        .expect("search")
        .records
        .iter()
        .map(|c| c.id.value())
        .collect();
    let page2: Vec<u64> = engine
        .search::<Court>(&query)
        .expect("search")
        .records
        .iter()
        .map(|c| c.id.value())
        .collect();

    // Sort keys all tie; identity ascending decides: [1,2,4,7,8,9] → offset 2, limit 3.
    assert_eq!(page1, vec![4, 7, 8]);
    assert_eq!(page1, page2);
}

#[test]
fn mixed_operator_query_over_imported_dockets() {
    let (_guard, store) = open_store();
    let engine = SearchEngine::new(&store);

    let input = "id,court_id,case_name,docket_number,date_filed\n\
                 `1`,`5`,`United States v. Adams`,`1:20-cv-0001`,`2020-03-01`\n\
                 `2`,`5`,`United States v. Brown`,`1:21-cv-0002`,`2021-03-01`\n\
                 `3`,`6`,`United States v. Clark`,`1:20-cv-0003`,`2020-07-01`\n";
    let report = import(&store, RecordKind::Docket, input);
    assert_eq!(report.imported, 3);

    let query = SearchQuery::new()
        .filter(Filter::equals("court_id", FieldValue::Int(5)))
        .filter(Filter::new(
            "case_name",
            FilterOp::Contains,
            FilterValue::Scalar(FieldValue::from("United States")),
        ))
        .filter(Filter::new(
            "date_filed",
            FilterOp::LessThan,
            FilterValue::Scalar(FieldValue::Date(
                chrono::NaiveDate::from_ymd_opt(2021, 1, 1).expect("date"),
            )),
        ));
    let result = engine
        .search::<lexarc_core::Docket>(&query)
        .expect("search");
    let ids: Vec<u64> = result.records.iter().map(|d| d.id.value()).collect();
    assert_eq!(ids, vec![1]);
}

// =============================================================================
// CITATION GRAPH SCENARIOS
// =============================================================================

#[test]
fn citation_cycle_visits_each_node_once() {
    let (_guard, store) = open_store();
    let engine = SearchEngine::new(&store);

    // A(1) → B(2) → A(1): a two-node cycle.
    let input = "citing_opinion_id,cited_opinion_id,depth\n\
                 `1`,`2`,`1`\n\
                 `2`,`1`,`1`\n";
    let report = import(&store, RecordKind::Citation, input);
    assert_eq!(report.imported, 2);

    let traversal = engine.traverse_citations(RecordId(1), 2).expect("traverse");
    let mut visited: Vec<u64> = traversal.nodes.iter().map(|n| n.id.value()).collect();
    visited.sort_unstable();
    assert_eq!(visited, vec![1, 2]);
}

#[test]
fn citation_traversal_stops_at_depth_bound() {
    let (_guard, store) = open_store();
    let engine = SearchEngine::new(&store);

    let input = "citing_opinion_id,cited_opinion_id,depth\n\
                 `1`,`2`,`1`\n\
                 `2`,`3`,`1`\n\
                 `3`,`4`,`1`\n\
                 `4`,`5`,`1`\n";
    import(&store, RecordKind::Citation, input);

    let traversal = engine.traverse_citations(RecordId(1), 3).expect("traverse");
    let mut visited: Vec<u64> = traversal.nodes.iter().map(|n| n.id.value()).collect();
    visited.sort_unstable();
    assert_eq!(visited, vec![1, 2, 3, 4]);
}
