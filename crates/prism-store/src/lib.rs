// crates/prism-store/src/lib.rs
//
// prism-store: Persisted state for Prism.
//
// Provides the content-addressable embedding cache (a single JSON snapshot
// file, atomically replaced on every write and discarded wholesale when the
// embedding model changes) and a reader for the flat prompt/response JSON
// files written by the response collector.

pub mod cache;
pub mod records;

// Re-export key types for ergonomic access from downstream crates.
pub use cache::{CacheEntry, CacheStore, EmbeddingCache, CACHE_SCHEMA_VERSION};
pub use records::JsonRecordStore;
