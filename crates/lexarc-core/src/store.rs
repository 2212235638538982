//! # Document Store
//!
//! Durable keyed persistence of typed records.
//!
//! Layout, per kind rooted at an explicit store directory (there is no
//! process-wide storage location — every operation goes through a
//! `DocStore` handle):
//!
//! ```text
//! <root>/<kind>/records/<id>.bin   one zstd(postcard(record)) per identity
//! <root>/indexes.redb              equality indexes, all kinds
//! ```
//!
//! A save serializes and compresses the record, writes it to a temporary
//! sibling and atomically renames it over any prior document, then
//! updates the record's index memberships in the same call. Readers never
//! observe a partially-written document.

use crate::index::{IndexManager, RebuildReport};
use crate::primitives::COMPRESSION_LEVEL;
use crate::records::{Citation, Court, Docket, DomainRecord, Opinion, OpinionCluster, Person};
use crate::types::{LexarcError, RecordId, RecordKind};
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

// =============================================================================
// STATS
// =============================================================================

/// On-demand aggregate statistics for one kind. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub kind: RecordKind,
    pub documents: u64,
    pub indexed_fields: usize,
    pub bytes: u64,
}

/// Number of declared indexable fields for a kind.
#[must_use]
pub fn indexed_field_count(kind: RecordKind) -> usize {
    match kind {
        RecordKind::Court => Court::INDEXED_FIELDS.len(),
        RecordKind::Docket => Docket::INDEXED_FIELDS.len(),
        RecordKind::OpinionCluster => OpinionCluster::INDEXED_FIELDS.len(),
        RecordKind::Opinion => Opinion::INDEXED_FIELDS.len(),
        RecordKind::Citation => Citation::INDEXED_FIELDS.len(),
        RecordKind::Person => Person::INDEXED_FIELDS.len(),
    }
}

// =============================================================================
// DOC STORE
// =============================================================================

/// Handle to one store directory.
pub struct DocStore {
    root: PathBuf,
    indexes: IndexManager,
}

impl std::fmt::Debug for DocStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocStore")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl DocStore {
    /// Open or create a store rooted at the given directory.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, LexarcError> {
        let root = root.as_ref().to_path_buf();
        for kind in RecordKind::ALL {
            fs::create_dir_all(records_dir(&root, kind))
                .map_err(|e| LexarcError::IoError(e.to_string()))?;
        }
        let indexes = IndexManager::open(root.join("indexes.redb"))?;
        Ok(Self { root, indexes })
    }

    /// The equality indexes maintained alongside the documents.
    #[must_use]
    pub fn indexes(&self) -> &IndexManager {
        &self.indexes
    }

    /// Upsert one record by identity.
    ///
    /// A later save with the same identity fully replaces the prior
    /// document; the prior document's index memberships are replaced in
    /// the same call.
    pub fn save<R: DomainRecord>(&self, record: &R) -> Result<(), LexarcError> {
        let id = record.id();

        // Previous memberships, when a readable prior document exists.
        // A corrupt prior document cannot surrender its entries; rebuild
        // reconciles whatever it leaves behind.
        let previous = match self.get::<R>(id) {
            Ok(Some(prior)) => prior.index_entries(),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(kind = %R::KIND, %id, error = %e, "overwriting unreadable prior document");
                Vec::new()
            }
        };

        let bytes = postcard::to_allocvec(record)
            .map_err(|e| LexarcError::SerializationError(e.to_string()))?;
        let compressed = zstd::encode_all(bytes.as_slice(), COMPRESSION_LEVEL)
            .map_err(|e| LexarcError::IoError(e.to_string()))?;

        let path = document_path(&self.root, R::KIND, id);
        let tmp = path.with_extension("bin.tmp");
        fs::write(&tmp, &compressed).map_err(|e| LexarcError::IoError(e.to_string()))?;
        fs::rename(&tmp, &path).map_err(|e| LexarcError::IoError(e.to_string()))?;

        self.indexes
            .update(R::KIND, id, &previous, &record.index_entries())
    }

    /// Load one record by identity; `Ok(None)` when absent.
    pub fn get<R: DomainRecord>(&self, id: RecordId) -> Result<Option<R>, LexarcError> {
        let path = document_path(&self.root, R::KIND, id);
        let compressed = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(LexarcError::IoError(e.to_string())),
        };

        let bytes = zstd::decode_all(compressed.as_slice())
            .map_err(|e| LexarcError::DeserializationError(e.to_string()))?;
        postcard::from_bytes(&bytes)
            .map(Some)
            .map_err(|e| LexarcError::DeserializationError(e.to_string()))
    }

    /// Remove one document and all of its index memberships.
    ///
    /// Returns whether a document existed.
    pub fn delete<R: DomainRecord>(&self, id: RecordId) -> Result<bool, LexarcError> {
        let path = document_path(&self.root, R::KIND, id);
        if !path.exists() {
            return Ok(false);
        }

        let previous = match self.get::<R>(id) {
            Ok(Some(prior)) => prior.index_entries(),
            _ => {
                tracing::warn!(kind = %R::KIND, %id, "deleting unreadable document; rebuild reconciles its index entries");
                Vec::new()
            }
        };

        fs::remove_file(&path).map_err(|e| LexarcError::IoError(e.to_string()))?;
        self.indexes.update(R::KIND, id, &previous, &[])?;
        Ok(true)
    }

    /// Lazy sequence of all identities currently stored for a kind.
    ///
    /// Order is unspecified; callers needing determinism sort.
    pub fn list_ids(
        &self,
        kind: RecordKind,
    ) -> Result<impl Iterator<Item = RecordId> + use<>, LexarcError> {
        let dir = records_dir(&self.root, kind);
        let entries = match fs::read_dir(&dir) {
            Ok(rd) => Some(rd),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(LexarcError::IoError(e.to_string())),
        };

        Ok(entries.into_iter().flatten().filter_map(|entry| {
            let name = entry.ok()?.file_name();
            let stem = name.to_str()?.strip_suffix(".bin")?;
            stem.parse::<u64>().ok().map(RecordId)
        }))
    }

    /// Aggregate statistics for a kind, computed on demand.
    pub fn stats(&self, kind: RecordKind) -> Result<StoreStats, LexarcError> {
        let dir = records_dir(&self.root, kind);
        let mut documents = 0u64;
        let mut bytes = 0u64;

        let entries = match fs::read_dir(&dir) {
            Ok(rd) => Some(rd),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(LexarcError::IoError(e.to_string())),
        };
        for entry in entries.into_iter().flatten() {
            let entry = entry.map_err(|e| LexarcError::IoError(e.to_string()))?;
            let name = entry.file_name();
            if name.to_str().is_some_and(|n| n.ends_with(".bin")) {
                documents = documents.saturating_add(1);
                let meta = entry
                    .metadata()
                    .map_err(|e| LexarcError::IoError(e.to_string()))?;
                bytes = bytes.saturating_add(meta.len());
            }
        }

        Ok(StoreStats {
            kind,
            documents,
            indexed_fields: indexed_field_count(kind),
            bytes,
        })
    }

    /// Recompute a kind's equality indexes by scanning its documents.
    ///
    /// Unreadable documents are skipped and counted, never fatal.
    pub fn rebuild_index<R: DomainRecord>(&self) -> Result<RebuildReport, LexarcError> {
        let ids: Vec<RecordId> = self.list_ids(R::KIND)?.collect();
        let documents = ids.into_iter().map(|id| match self.get::<R>(id) {
            Ok(Some(record)) => Ok(record),
            Ok(None) => Err(LexarcError::DeserializationError(format!(
                "document {id} vanished during rebuild"
            ))),
            Err(e) => Err(e),
        });
        self.indexes.rebuild(documents)
    }
}

fn records_dir(root: &Path, kind: RecordKind) -> PathBuf {
    root.join(kind.as_str()).join("records")
}

fn document_path(root: &Path, kind: RecordKind, id: RecordId) -> PathBuf {
    records_dir(root, kind).join(format!("{id}.bin"))
}

// =============================================================================
// TESTS
// =============================================================================
