//! # Index Manager
//!
//! Equality indexes over declared record fields, backed by redb.
//!
//! One table maps `(kind, field, value key)` to a postcard-serialized
//! identity set. Updates are incremental — one ACID transaction per
//! record mutation — so bulk imports never rewrite whole index files.
//! Indexing is equality-only; there are no range structures.
//!
//! Consistency contract with the document store: a record's previous
//! memberships are removed and its new memberships inserted in the same
//! transaction, so no orphaned or missing entries survive a completed
//! `save` or `delete`.

use crate::primitives::MAX_INDEX_KEY_LENGTH;
use crate::records::DomainRecord;
use crate::types::{LexarcError, RecordId, RecordKind};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Table for field indexes: (kind, field, value key) -> serialized id set
const FIELD_INDEXES: TableDefinition<(&str, &str, &str), &[u8]> =
    TableDefinition::new("field_indexes");

/// Summary of one index rebuild pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildReport {
    /// Documents whose entries were recomputed.
    pub indexed: u64,
    /// Documents skipped because they failed to deserialize.
    pub skipped: u64,
}

/// redb-backed equality index manager.
pub struct IndexManager {
    db: Database,
}

impl std::fmt::Debug for IndexManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexManager").finish_non_exhaustive()
    }
}

impl IndexManager {
    /// Open or create the index database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LexarcError> {
        let db =
            Database::create(path.as_ref()).map_err(|e| LexarcError::IoError(e.to_string()))?;

        // Initialize the table if it doesn't exist
        {
            let write_txn = db
                .begin_write()
                .map_err(|e| LexarcError::IoError(e.to_string()))?;
            let _ = write_txn
                .open_table(FIELD_INDEXES)
                .map_err(|e| LexarcError::IoError(e.to_string()))?;
            write_txn
                .commit()
                .map_err(|e| LexarcError::IoError(e.to_string()))?;
        }

        Ok(Self { db })
    }

    /// Replace a record's memberships: remove `previous` entries, insert
    /// `current` ones, in a single transaction.
    ///
    /// Pass an empty `previous` for a first save and an empty `current`
    /// for a delete.
    pub fn update(
        &self,
        kind: RecordKind,
        id: RecordId,
        previous: &[(&'static str, String)],
        current: &[(&'static str, String)],
    ) -> Result<(), LexarcError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| LexarcError::IndexError(e.to_string()))?;

        {
            let mut table = write_txn
                .open_table(FIELD_INDEXES)
                .map_err(|e| LexarcError::IndexError(e.to_string()))?;

            for (field, value) in previous {
                let key = (kind.as_str(), *field, truncate_key(value));
                let mut members = read_set(&table, key)?;
                members.remove(&id.0);
                if members.is_empty() {
                    table
                        .remove(key)
                        .map_err(|e| LexarcError::IndexError(e.to_string()))?;
                } else {
                    write_set(&mut table, key, &members)?;
                }
            }

            for (field, value) in current {
                let key = (kind.as_str(), *field, truncate_key(value));
                let mut members = read_set(&table, key)?;
                members.insert(id.0);
                write_set(&mut table, key, &members)?;
            }
        }

        write_txn
            .commit()
            .map_err(|e| LexarcError::IndexError(e.to_string()))?;
        Ok(())
    }

    /// Identities whose `field` equals `value`, in ascending order.
    pub fn lookup(
        &self,
        kind: RecordKind,
        field: &str,
        value: &str,
    ) -> Result<BTreeSet<RecordId>, LexarcError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| LexarcError::IndexError(e.to_string()))?;
        let table = read_txn
            .open_table(FIELD_INDEXES)
            .map_err(|e| LexarcError::IndexError(e.to_string()))?;

        let key = (kind.as_str(), field, truncate_key(value));
        let members = table
            .get(key)
            .map_err(|e| LexarcError::IndexError(e.to_string()))?
            .map(|data| postcard::from_bytes::<BTreeSet<u64>>(data.value()))
            .transpose()
            .map_err(|e| LexarcError::DeserializationError(e.to_string()))?
            .unwrap_or_default();

        Ok(members.into_iter().map(RecordId).collect())
    }

    /// Drop every index entry belonging to a kind.
    pub fn clear_kind(&self, kind: RecordKind) -> Result<(), LexarcError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| LexarcError::IndexError(e.to_string()))?;

        {
            let mut table = write_txn
                .open_table(FIELD_INDEXES)
                .map_err(|e| LexarcError::IndexError(e.to_string()))?;

            let mut stale: Vec<(String, String)> = Vec::new();
            for entry in table
                .iter()
                .map_err(|e| LexarcError::IndexError(e.to_string()))?
            {
                let (key, _) = entry.map_err(|e| LexarcError::IndexError(e.to_string()))?;
                let (entry_kind, field, value) = key.value();
                if entry_kind == kind.as_str() {
                    stale.push((field.to_string(), value.to_string()));
                }
            }

            for (field, value) in &stale {
                table
                    .remove((kind.as_str(), field.as_str(), value.as_str()))
                    .map_err(|e| LexarcError::IndexError(e.to_string()))?;
            }
        }

        write_txn
            .commit()
            .map_err(|e| LexarcError::IndexError(e.to_string()))?;
        Ok(())
    }

    /// Recompute a kind's indexes from scanned documents.
    ///
    /// Documents that fail to load are skipped and counted — corruption
    /// in one record never blocks rebuilding the others. All recomputed
    /// entries are written in one transaction after the scan.
    pub fn rebuild<R, I>(&self, documents: I) -> Result<RebuildReport, LexarcError>
    where
        R: DomainRecord,
        I: Iterator<Item = Result<R, LexarcError>>,
    {
        self.clear_kind(R::KIND)?;

        let mut report = RebuildReport::default();
        let mut entries: BTreeMap<(&'static str, String), BTreeSet<u64>> = BTreeMap::new();

        for document in documents {
            match document {
                Ok(record) => {
                    let id = record.id();
                    for (field, value) in record.index_entries() {
                        entries
                            .entry((field, truncate_key(&value).to_string()))
                            .or_default()
                            .insert(id.0);
                    }
                    report.indexed = report.indexed.saturating_add(1);
                }
                Err(e) => {
                    report.skipped = report.skipped.saturating_add(1);
                    tracing::warn!(kind = %R::KIND, error = %e, "skipping unreadable document during rebuild");
                }
            }
        }

        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| LexarcError::IndexError(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(FIELD_INDEXES)
                .map_err(|e| LexarcError::IndexError(e.to_string()))?;
            for ((field, value), members) in &entries {
                write_set(&mut table, (R::KIND.as_str(), *field, value.as_str()), members)?;
            }
        }
        write_txn
            .commit()
            .map_err(|e| LexarcError::IndexError(e.to_string()))?;

        Ok(report)
    }
}

/// Bound an index key to `MAX_INDEX_KEY_LENGTH` characters.
fn truncate_key(value: &str) -> &str {
    match value.char_indices().nth(MAX_INDEX_KEY_LENGTH) {
        Some((offset, _)) => &value[..offset],
        None => value,
    }
}

fn read_set(
    table: &redb::Table<'_, (&str, &str, &str), &[u8]>,
    key: (&str, &str, &str),
) -> Result<BTreeSet<u64>, LexarcError> {
    let members = table
        .get(key)
        .map_err(|e| LexarcError::IndexError(e.to_string()))?
        .map(|data| postcard::from_bytes::<BTreeSet<u64>>(data.value()))
        .transpose()
        .map_err(|e| LexarcError::DeserializationError(e.to_string()))?
        .unwrap_or_default();
    Ok(members)
}

fn write_set(
    table: &mut redb::Table<'_, (&str, &str, &str), &[u8]>,
    key: (&str, &str, &str),
    members: &BTreeSet<u64>,
) -> Result<(), LexarcError> {
    let bytes = postcard::to_allocvec(members)
        .map_err(|e| LexarcError::SerializationError(e.to_string()))?;
    table
        .insert(key, bytes.as_slice())
        .map_err(|e| LexarcError::IndexError(e.to_string()))?;
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_manager(dir: &std::path::Path) -> IndexManager {
        IndexManager::open(dir.join("indexes.redb")).expect("open index db")
    }

    #[test]
    fn insert_then_lookup() {
        let temp = tempdir().expect("temp dir");
        let indexes = open_manager(temp.path());

        indexes
            .update(
                RecordKind::Court,
                RecordId(1),
                &[],
                &[("jurisdiction", "Federal".to_string())],
            )
            .expect("update");

        let hits = indexes
            .lookup(RecordKind::Court, "jurisdiction", "Federal")
            .expect("lookup");
        assert_eq!(hits, BTreeSet::from([RecordId(1)]));
    }

    #[test]
    fn update_moves_membership_between_values() {
        let temp = tempdir().expect("temp dir");
        let indexes = open_manager(temp.path());

        indexes
            .update(
                RecordKind::Court,
                RecordId(1),
                &[],
                &[("jurisdiction", "State".to_string())],
            )
            .expect("first save");
        indexes
            .update(
                RecordKind::Court,
                RecordId(1),
                &[("jurisdiction", "State".to_string())],
                &[("jurisdiction", "Federal".to_string())],
            )
            .expect("upsert");

        assert!(
            indexes
                .lookup(RecordKind::Court, "jurisdiction", "State")
                .expect("lookup")
                .is_empty()
        );
        assert_eq!(
            indexes
                .lookup(RecordKind::Court, "jurisdiction", "Federal")
                .expect("lookup"),
            BTreeSet::from([RecordId(1)])
        );
    }

    #[test]
    fn idempotent_save_keeps_single_membership() {
        let temp = tempdir().expect("temp dir");
        let indexes = open_manager(temp.path());
        let entries = [("jurisdiction", "Federal".to_string())];

        indexes
            .update(RecordKind::Court, RecordId(1), &[], &entries)
            .expect("save");
        indexes
            .update(RecordKind::Court, RecordId(1), &entries, &entries)
            .expect("resave");

        let hits = indexes
            .lookup(RecordKind::Court, "jurisdiction", "Federal")
            .expect("lookup");
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn delete_removes_all_memberships() {
        let temp = tempdir().expect("temp dir");
        let indexes = open_manager(temp.path());
        let entries = [
            ("jurisdiction", "Federal".to_string()),
            ("full_name", "Supreme Court".to_string()),
        ];

        indexes
            .update(RecordKind::Court, RecordId(1), &[], &entries)
            .expect("save");
        indexes
            .update(RecordKind::Court, RecordId(1), &entries, &[])
            .expect("delete");

        assert!(
            indexes
                .lookup(RecordKind::Court, "jurisdiction", "Federal")
                .expect("lookup")
                .is_empty()
        );
        assert!(
            indexes
                .lookup(RecordKind::Court, "full_name", "Supreme Court")
                .expect("lookup")
                .is_empty()
        );
    }

    #[test]
    fn clear_kind_leaves_other_kinds_intact() {
        let temp = tempdir().expect("temp dir");
        let indexes = open_manager(temp.path());

        indexes
            .update(
                RecordKind::Court,
                RecordId(1),
                &[],
                &[("jurisdiction", "Federal".to_string())],
            )
            .expect("court");
        indexes
            .update(
                RecordKind::Docket,
                RecordId(2),
                &[],
                &[("court_id", "1".to_string())],
            )
            .expect("docket");

        indexes.clear_kind(RecordKind::Court).expect("clear");

        assert!(
            indexes
                .lookup(RecordKind::Court, "jurisdiction", "Federal")
                .expect("lookup")
                .is_empty()
        );
        assert_eq!(
            indexes
                .lookup(RecordKind::Docket, "court_id", "1")
                .expect("lookup")
                .len(),
            1
        );
    }

    #[test]
    fn long_values_truncate_consistently() {
        let temp = tempdir().expect("temp dir");
        let indexes = open_manager(temp.path());
        let long_value = "x".repeat(MAX_INDEX_KEY_LENGTH + 50);

        indexes
            .update(
                RecordKind::Docket,
                RecordId(7),
                &[],
                &[("case_name", long_value.clone())],
            )
            .expect("save");

        let hits = indexes
            .lookup(RecordKind::Docket, "case_name", &long_value)
            .expect("lookup");
        assert_eq!(hits, BTreeSet::from([RecordId(7)]));
    }
}
