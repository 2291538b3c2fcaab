// crates/prism-embed/src/lib.rs
//
// prism-embed: Embedding computation for Prism.
//
// Holds the `Embedder` backends (a deterministic offline hash embedder and an
// HTTP client for OpenAI-compatible embedding endpoints) and the
// `EmbeddingResolver`, which serves vectors from the content-addressable
// cache and computes only the distinct texts that are missing.

pub mod hash;
pub mod http;
pub mod resolver;

pub use hash::HashEmbedder;
pub use http::{HttpEmbedder, HttpEmbedderConfig};
pub use resolver::{EmbeddingResolver, Resolution};
