// crates/prism-project/src/umap.rs
//
// UmapProjector: embeddings -> 2D layout.
//
// Pipeline:
//   1. Exact cosine kNN graph with k = min(n_neighbors, n - 1).
//   2. Smooth kNN distances and fuzzy union into a symmetric weighted graph;
//      edges lighter than max_weight / n_epochs are dropped.
//   3. Seeded uniform random initialization in [-10, 10]^d.
//   4. SGD layout optimization with negative sampling.
//
// The seed is part of the contract: the same input and configuration always
// produce the same coordinates. The coordinates themselves have no absolute
// meaning (scale, rotation, and translation are arbitrary); consumers should
// only read relative distances and clusters.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use prism_core::error::PrismError;
use prism_core::record::ProjectedPoint;

use crate::fuzzy::{fuzzy_simplicial_set, smooth_knn_dist};
use crate::knn::nearest_neighbors;
use crate::layout::{find_ab_params, optimize_layout, LayoutParams};

/// Minimum number of points a projection needs.
pub const MIN_POINTS: usize = 2;

const INIT_RANGE: f64 = 10.0;

/// UMAP hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UmapConfig {
    /// Upper bound on neighbours per point. Default: 15.
    pub n_neighbors: usize,
    /// Minimum distance between points in the layout. Default: 0.1.
    pub min_dist: f64,
    /// Scale of the layout. Default: 1.0.
    pub spread: f64,
    /// Optimization epochs. Default: 500 up to 10 000 points, else 200.
    pub n_epochs: Option<usize>,
    /// Initial SGD learning rate. Default: 1.0.
    pub learning_rate: f64,
    /// Negative samples per positive sample. Default: 5.
    pub negative_sample_rate: usize,
    /// Random seed for initialization and negative sampling. Default: 42.
    pub seed: u64,
}

impl Default for UmapConfig {
    fn default() -> Self {
        Self {
            n_neighbors: 15,
            min_dist: 0.1,
            spread: 1.0,
            n_epochs: None,
            learning_rate: 1.0,
            negative_sample_rate: 5,
            seed: 42,
        }
    }
}

/// Seeded UMAP projector with a cosine metric.
#[derive(Debug, Clone)]
pub struct UmapProjector {
    config: UmapConfig,
    a: f64,
    b: f64,
}

impl UmapProjector {
    /// Validate the configuration and fit the curve parameters once.
    pub fn new(config: UmapConfig) -> Result<Self, PrismError> {
        if config.n_neighbors == 0 {
            return Err(PrismError::Config("n_neighbors must be at least 1".to_string()));
        }
        if !(config.spread > 0.0) {
            return Err(PrismError::Config("spread must be positive".to_string()));
        }
        if !(config.min_dist >= 0.0) || config.min_dist > config.spread {
            return Err(PrismError::Config(format!(
                "min_dist must be in [0, spread], got {}",
                config.min_dist
            )));
        }
        if !(config.learning_rate > 0.0) {
            return Err(PrismError::Config("learning_rate must be positive".to_string()));
        }
        if config.n_epochs == Some(0) {
            return Err(PrismError::Config("n_epochs must be at least 1".to_string()));
        }

        let (a, b) = find_ab_params(config.spread, config.min_dist);
        Ok(Self { config, a, b })
    }

    pub fn config(&self) -> &UmapConfig {
        &self.config
    }

    /// Neighbours actually used for `n` points.
    pub fn effective_neighbors(&self, n: usize) -> usize {
        self.config.n_neighbors.min(n.saturating_sub(1))
    }

    fn epochs_for(&self, n: usize) -> usize {
        self.config
            .n_epochs
            .unwrap_or(if n <= 10_000 { 500 } else { 200 })
    }

    /// Project embeddings to 2D points, index-aligned with the input.
    pub fn project(&self, embeddings: &[Vec<f32>]) -> Result<Vec<ProjectedPoint>, PrismError> {
        let coords = self.fit_transform(embeddings, 2)?;
        Ok(coords
            .into_iter()
            .map(|c| ProjectedPoint { x: c[0], y: c[1] })
            .collect())
    }

    /// Project embeddings to `target_dims` coordinates per point.
    ///
    /// Fails with `InsufficientData` for fewer than two points.
    pub fn fit_transform(
        &self,
        embeddings: &[Vec<f32>],
        target_dims: usize,
    ) -> Result<Vec<Vec<f64>>, PrismError> {
        let n = embeddings.len();
        if n < MIN_POINTS {
            return Err(PrismError::InsufficientData {
                required: MIN_POINTS,
                actual: n,
            });
        }
        if target_dims == 0 {
            return Err(PrismError::InvalidInput(
                "target_dims must be at least 1".to_string(),
            ));
        }
        validate_vectors(embeddings)?;

        let k = self.effective_neighbors(n);
        let n_epochs = self.epochs_for(n);
        tracing::debug!(
            "UMAP: {} points, {} neighbours, {} epochs, seed {}",
            n,
            k,
            n_epochs,
            self.config.seed
        );

        let graph = nearest_neighbors(embeddings, k)?;
        let scales = smooth_knn_dist(&graph);
        let mut edges = fuzzy_simplicial_set(&graph, &scales);

        let max_weight = edges.iter().map(|e| e.2).fold(0.0_f64, f64::max);
        let cutoff = max_weight / n_epochs as f64;
        edges.retain(|e| e.2 >= cutoff);

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut layout: Vec<Vec<f64>> = (0..n)
            .map(|_| {
                (0..target_dims)
                    .map(|_| rng.gen_range(-INIT_RANGE..INIT_RANGE))
                    .collect()
            })
            .collect();

        let params = LayoutParams {
            a: self.a,
            b: self.b,
            n_epochs,
            learning_rate: self.config.learning_rate,
            negative_sample_rate: self.config.negative_sample_rate,
            repulsion_strength: 1.0,
        };
        optimize_layout(&mut layout, &edges, &params, &mut rng);

        Ok(layout)
    }
}

/// All vectors must share one non-zero width and contain only finite values.
fn validate_vectors(embeddings: &[Vec<f32>]) -> Result<(), PrismError> {
    let dims = embeddings[0].len();
    if dims == 0 {
        return Err(PrismError::InvalidInput("Embeddings have zero width".to_string()));
    }
    for (i, v) in embeddings.iter().enumerate() {
        if v.len() != dims {
            return Err(PrismError::InvalidInput(format!(
                "Vector {} has {} dimensions, expected {}",
                i,
                v.len(),
                dims
            )));
        }
        if v.iter().any(|x| !x.is_finite()) {
            return Err(PrismError::InvalidInput(format!(
                "Vector {} contains non-finite values",
                i
            )));
        }
    }
    Ok(())
}
