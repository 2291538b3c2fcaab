// crates/prism-store/src/cache.rs
//
// EmbeddingCache: content-addressable store for computed embedding vectors.
//
// The whole cache is one JSON snapshot:
//
//   {
//     "schema_version": "1",
//     "embedding_model_id": "<model id>",
//     "updated_at": "<rfc3339>",
//     "entries": { "<sha256 hex of text>": [f32, ...], ... }
//   }
//
// Entries carry no per-entry model tag. A snapshot stamped with a different
// model id than the one currently configured is discarded in full on load.
//
// Writes are full rewrites: the snapshot is written to a sibling temp file
// and renamed over the target, so readers never observe a partial file.
// Concurrent writers are not coordinated; the last rename wins.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use prism_core::error::PrismError;
use prism_core::fingerprint::Fingerprint;

/// Current on-disk schema version. Snapshots with any other version are discarded.
pub const CACHE_SCHEMA_VERSION: &str = "1";

/// One cached vector, as seen through its store.
///
/// Entries are stored as a bare fingerprint -> vector map; the model id is
/// the store's, shared by every entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheEntry<'a> {
    pub fingerprint: &'a Fingerprint,
    pub vector: &'a [f32],
    pub embedding_model_id: &'a str,
}

/// In-memory view of the persisted cache snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStore {
    pub schema_version: String,
    /// Embedding model every entry was produced under.
    pub embedding_model_id: String,
    /// Time of the last rewrite. Absent on a store that was never persisted.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    pub entries: HashMap<Fingerprint, Vec<f32>>,
}

impl CacheStore {
    /// Create an empty store stamped with the given model id.
    pub fn empty(embedding_model_id: &str) -> Self {
        Self {
            schema_version: CACHE_SCHEMA_VERSION.to_string(),
            embedding_model_id: embedding_model_id.to_string(),
            updated_at: None,
            entries: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Single owner of the persisted embedding cache file.
#[derive(Debug, Clone)]
pub struct EmbeddingCache {
    path: PathBuf,
    model_id: String,
}

impl EmbeddingCache {
    /// Create a cache handle for the snapshot at `path`, bound to the
    /// currently configured embedding model.
    pub fn new(path: impl Into<PathBuf>, model_id: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            model_id: model_id.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Load the persisted store.
    ///
    /// Never fails. A missing, unreadable, or corrupt snapshot, a snapshot
    /// with an unknown schema version, or one produced under a different
    /// embedding model all yield a fresh empty store stamped with the current
    /// model id.
    pub fn load(&self) -> CacheStore {
        match self.read_snapshot() {
            Ok(Some(store)) => {
                if store.schema_version != CACHE_SCHEMA_VERSION {
                    tracing::info!(
                        "Embedding cache schema {} != {}, starting empty",
                        store.schema_version,
                        CACHE_SCHEMA_VERSION
                    );
                    return CacheStore::empty(&self.model_id);
                }
                if store.embedding_model_id != self.model_id {
                    tracing::info!(
                        "Embedding model changed ({} -> {}), discarding {} cached vectors",
                        store.embedding_model_id,
                        self.model_id,
                        store.len()
                    );
                    return CacheStore::empty(&self.model_id);
                }
                tracing::debug!(
                    "Loaded {} cached embeddings from {}",
                    store.len(),
                    self.path.display()
                );
                store
            }
            Ok(None) => {
                tracing::debug!("No embedding cache at {}, starting empty", self.path.display());
                CacheStore::empty(&self.model_id)
            }
            Err(e) => {
                tracing::warn!("{}. Starting with an empty embedding cache.", e);
                CacheStore::empty(&self.model_id)
            }
        }
    }

    /// Look up a vector by fingerprint.
    pub fn lookup<'a>(
        &self,
        store: &'a CacheStore,
        fingerprint: &Fingerprint,
    ) -> Option<CacheEntry<'a>> {
        store
            .entries
            .get_key_value(fingerprint)
            .map(|(fingerprint, vector)| CacheEntry {
                fingerprint,
                vector,
                embedding_model_id: &store.embedding_model_id,
            })
    }

    /// Insert `new_entries` into `store` and atomically rewrite the snapshot.
    ///
    /// Existing entries with the same fingerprint are overwritten; since
    /// entries are content-addressed the values are interchangeable.
    pub fn merge_and_persist(
        &self,
        store: &mut CacheStore,
        new_entries: HashMap<Fingerprint, Vec<f32>>,
    ) -> Result<(), PrismError> {
        if store.embedding_model_id != self.model_id {
            return Err(PrismError::InvalidInput(format!(
                "Cache store stamped with model {} cannot be persisted under model {}",
                store.embedding_model_id, self.model_id
            )));
        }

        let added = new_entries.len();
        store.entries.extend(new_entries);
        store.updated_at = Some(Utc::now());
        self.write_snapshot(store)?;

        tracing::debug!(
            "Persisted embedding cache: {} new, {} total at {}",
            added,
            store.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Replace the snapshot with an empty store for the current model.
    pub fn clear(&self) -> Result<CacheStore, PrismError> {
        let mut store = CacheStore::empty(&self.model_id);
        store.updated_at = Some(Utc::now());
        self.write_snapshot(&store)?;
        Ok(store)
    }

    /// Read and parse the snapshot. `Ok(None)` means no file exists.
    fn read_snapshot(&self) -> Result<Option<CacheStore>, PrismError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(PrismError::CacheUnavailable(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        serde_json::from_slice::<CacheStore>(&bytes)
            .map(Some)
            .map_err(|e| {
                PrismError::CacheUnavailable(format!(
                    "Corrupt embedding cache {}: {}",
                    self.path.display(),
                    e
                ))
            })
    }

    /// Write the full snapshot to a temp file beside the target, then rename.
    fn write_snapshot(&self, store: &CacheStore) -> Result<(), PrismError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_vec(store)?;
        let tmp_path = self.temp_path();

        let write_result = (|| -> Result<(), std::io::Error> {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(&json)?;
            file.sync_all()?;
            fs::rename(&tmp_path, &self.path)
        })();

        if let Err(e) = write_result {
            let _ = fs::remove_file(&tmp_path);
            return Err(PrismError::Io(format!(
                "Failed to write embedding cache {}: {}",
                self.path.display(),
                e
            )));
        }
        Ok(())
    }

    /// Unique sibling temp path: `{file_name}.{uuid}.tmp`.
    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "embedding_cache.json".to_string());
        self.path
            .with_file_name(format!("{}.{}.tmp", file_name, Uuid::now_v7()))
    }
}
