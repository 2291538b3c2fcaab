// crates/prism-core/src/lib.rs
//
// prism-core: Core types, traits, and fingerprint primitives for Prism.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines the record shapes handed over by the prompt/response store,
// the content fingerprint used as the embedding cache key, the error type,
// and the `Embedder` trait implemented by the embedding backends.

pub mod embedding;
pub mod error;
pub mod fingerprint;
pub mod record;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use prism_core::TextRecord;`

// Record types
pub use record::{Prompt, ProjectedPoint, ResponseRecord, TextRecord};

// Fingerprint
pub use fingerprint::Fingerprint;

// Embedding helpers
pub use embedding::{cosine_distance, hash_embedding};

// Error type
pub use error::PrismError;

// Traits
pub use traits::Embedder;
