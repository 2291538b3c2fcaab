// crates/prism-project/src/lib.rs
//
// prism-project: The numeric core of Prism.
//
// - `centering`: subtract each group's mean vector from its members, removing
//   the variance shared by every response to the same prompt.
// - `knn`, `fuzzy`, `layout`, `umap`: a seeded UMAP implementation with a
//   cosine metric that reduces embeddings to a 2D layout.

pub mod centering;
pub mod fuzzy;
pub mod knn;
pub mod layout;
pub mod umap;

pub use centering::center_by_group;
pub use umap::{UmapConfig, UmapProjector};
