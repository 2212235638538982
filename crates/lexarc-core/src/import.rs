//! # Import Pipeline
//!
//! Sequentially ties the pipeline together for one bulk file:
//! reconstruct → map → save, one record at a time. Memory stays bounded
//! by one logical row; cancellation granularity is one row — a row is
//! either fully imported or fully skipped.
//!
//! Row-local failures (wrong column count, validation) are tallied in the
//! per-file report and never stop the run. Stream or storage failures
//! abort; records saved before the fault stay durable, so a rerun
//! resumes by identity through upsert semantics.

use crate::mapper;
use crate::reconstruct::{Header, RowReader};
use crate::records::DomainRecord;
use crate::store::DocStore;
use crate::types::{LexarcError, RecordKind};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::BufRead;

// =============================================================================
// REPORT
// =============================================================================

/// Per-file import summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub kind: RecordKind,
    /// Logical rows that survived reconstruction.
    pub logical_rows: u64,
    /// Records durably saved.
    pub imported: u64,
    /// Rows dropped by the reconstructor (wrong column count).
    pub dropped_rows: u64,
    /// Rows rejected by domain validation.
    pub failed_rows: u64,
    /// Error message → occurrence count.
    pub errors: BTreeMap<String, u64>,
}

impl ImportReport {
    fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            logical_rows: 0,
            imported: 0,
            dropped_rows: 0,
            failed_rows: 0,
            errors: BTreeMap::new(),
        }
    }

    fn tally(&mut self, message: String) {
        self.failed_rows = self.failed_rows.saturating_add(1);
        *self.errors.entry(message).or_insert(0) += 1;
    }
}

// =============================================================================
// IMPORTER
// =============================================================================

/// One-file-at-a-time importer over a store handle.
#[derive(Debug)]
pub struct Importer<'a> {
    store: &'a DocStore,
    limit: Option<u64>,
    progress_every: u64,
}

impl<'a> Importer<'a> {
    /// Create an importer with no record limit and no progress reporting.
    #[must_use]
    pub fn new(store: &'a DocStore) -> Self {
        Self {
            store,
            limit: None,
            progress_every: 0,
        }
    }

    /// Stop after importing this many records.
    #[must_use]
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Log progress every `every` imported records (0 disables).
    #[must_use]
    pub fn with_progress_every(mut self, every: u64) -> Self {
        self.progress_every = every;
        self
    }

    /// Import one decompressed bulk stream of the given kind.
    pub fn import_stream<S: BufRead>(
        &self,
        kind: RecordKind,
        stream: S,
    ) -> Result<ImportReport, LexarcError> {
        match kind {
            RecordKind::Court => self.run(kind, stream, mapper::map_court),
            RecordKind::Docket => self.run(kind, stream, mapper::map_docket),
            RecordKind::OpinionCluster => self.run(kind, stream, mapper::map_opinion_cluster),
            RecordKind::Opinion => self.run(kind, stream, mapper::map_opinion),
            RecordKind::Citation => self.run(kind, stream, mapper::map_citation),
            RecordKind::Person => self.run(kind, stream, mapper::map_person),
        }
    }

    fn run<S, R>(
        &self,
        kind: RecordKind,
        stream: S,
        map: fn(&Header, &[String]) -> Result<R, LexarcError>,
    ) -> Result<ImportReport, LexarcError>
    where
        S: BufRead,
        R: DomainRecord,
    {
        let mut rows = RowReader::new(stream)?;
        let mut report = ImportReport::new(kind);

        loop {
            if self.limit.is_some_and(|limit| report.imported >= limit) {
                tracing::info!(%kind, limit = self.limit, "record limit reached, stopping import");
                break;
            }
            let Some(row) = rows.next_row()? else {
                break;
            };
            report.logical_rows = report.logical_rows.saturating_add(1);

            match map(rows.header(), &row) {
                Ok(record) => {
                    // Storage failures are fatal; everything already
                    // saved stays durable.
                    self.store.save(&record)?;
                    report.imported = report.imported.saturating_add(1);

                    if self.progress_every > 0 && report.imported % self.progress_every == 0 {
                        tracing::info!(
                            %kind,
                            imported = report.imported,
                            failed = report.failed_rows,
                            "import progress"
                        );
                    }
                }
                Err(LexarcError::ValidationError(field)) => {
                    tracing::debug!(%kind, %field, "skipping row failing validation");
                    report.tally(format!("missing or invalid required field '{field}'"));
                }
                Err(e) => return Err(e),
            }
        }

        report.dropped_rows = rows.dropped_rows();
        Ok(report)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::records::Court;
    use crate::types::RecordId;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn import(input: &str, kind: RecordKind, importer: &Importer<'_>) -> ImportReport {
        importer
            .import_stream(kind, Cursor::new(input.as_bytes().to_vec()))
            .expect("import")
    }

    #[test]
    fn courts_import_end_to_end() {
        let temp = tempdir().expect("temp dir");
        let store = DocStore::open(temp.path()).expect("open");
        let importer = Importer::new(&store);

        let input = "id,full_name,jurisdiction\n\
                     `1`,`First Court`,`Federal`\n\
                     `2`,`Second Court`,`State`\n";
        let report = import(input, RecordKind::Court, &importer);

        assert_eq!(report.imported, 2);
        assert_eq!(report.failed_rows, 0);
        assert_eq!(report.dropped_rows, 0);

        let loaded: Court = store.get(RecordId(2)).expect("get").expect("present");
        assert_eq!(loaded.full_name.as_deref(), Some("Second Court"));
    }

    #[test]
    fn invalid_identity_skips_row_but_later_rows_import() {
        let temp = tempdir().expect("temp dir");
        let store = DocStore::open(temp.path()).expect("open");
        let importer = Importer::new(&store);

        let input = "id,full_name,jurisdiction\n\
                     `not-a-number`,`Bad Court`,`Federal`\n\
                     `3`,`Good Court`,`Federal`\n";
        let report = import(input, RecordKind::Court, &importer);

        assert_eq!(report.imported, 1);
        assert_eq!(report.failed_rows, 1);
        assert_eq!(
            report.errors.get("missing or invalid required field 'id'"),
            Some(&1)
        );
        assert!(store.get::<Court>(RecordId(3)).expect("get").is_some());
    }

    #[test]
    fn wrong_arity_rows_counted_as_dropped() {
        let temp = tempdir().expect("temp dir");
        let store = DocStore::open(temp.path()).expect("open");
        let importer = Importer::new(&store);

        let input = "id,full_name,jurisdiction\n\
                     `1`,`only two fields`\n\
                     `2`,`Fine Court`,`Federal`\n";
        let report = import(input, RecordKind::Court, &importer);

        assert_eq!(report.dropped_rows, 1);
        assert_eq!(report.imported, 1);
    }

    #[test]
    fn record_limit_stops_early() {
        let temp = tempdir().expect("temp dir");
        let store = DocStore::open(temp.path()).expect("open");
        let importer = Importer::new(&store).with_limit(2);

        let input = "id,full_name,jurisdiction\n\
                     `1`,`A`,`x`\n\
                     `2`,`B`,`x`\n\
                     `3`,`C`,`x`\n";
        let report = import(input, RecordKind::Court, &importer);

        assert_eq!(report.imported, 2);
        assert!(store.get::<Court>(RecordId(3)).expect("get").is_none());
    }

    #[test]
    fn reimport_is_resumable_by_identity() {
        let temp = tempdir().expect("temp dir");
        let store = DocStore::open(temp.path()).expect("open");

        let input = "id,full_name,jurisdiction\n\
                     `1`,`A`,`x`\n\
                     `2`,`B`,`x`\n";
        let first = import(input, RecordKind::Court, &Importer::new(&store).with_limit(1));
        assert_eq!(first.imported, 1);

        // Second pass re-saves record 1 (idempotent upsert) and picks up 2.
        let second = import(input, RecordKind::Court, &Importer::new(&store));
        assert_eq!(second.imported, 2);

        let ids: Vec<RecordId> = {
            let mut ids: Vec<RecordId> =
                store.list_ids(RecordKind::Court).expect("list").collect();
            ids.sort_unstable();
            ids
        };
        assert_eq!(ids, vec![RecordId(1), RecordId(2)]);
    }

    #[test]
    fn duplicate_identities_upsert_last_wins() {
        let temp = tempdir().expect("temp dir");
        let store = DocStore::open(temp.path()).expect("open");
        let importer = Importer::new(&store);

        let input = "id,full_name,jurisdiction\n\
                     `1`,`Old Name`,`Federal`\n\
                     `1`,`New Name`,`Federal`\n";
        let report = import(input, RecordKind::Court, &importer);
        assert_eq!(report.imported, 2);

        let loaded: Court = store.get(RecordId(1)).expect("get").expect("present");
        assert_eq!(loaded.full_name.as_deref(), Some("New Name"));
        let ids: Vec<RecordId> = store.list_ids(RecordKind::Court).expect("list").collect();
        assert_eq!(ids.len(), 1);
    }
}
