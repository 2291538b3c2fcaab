// crates/prism-project/src/knn.rs
//
// Exact k-nearest-neighbour graph under cosine distance.
//
// Brute force over all pairs: response sets are small (prompts x models),
// and exact neighbours keep the projection reproducible.

use prism_core::embedding::cosine_distance;
use prism_core::error::PrismError;

/// For every point, its `k` nearest other points in ascending distance.
#[derive(Debug, Clone, PartialEq)]
pub struct KnnGraph {
    /// `indices[i]` are the neighbour indices of point `i`.
    pub indices: Vec<Vec<usize>>,
    /// `distances[i][j]` is the distance from `i` to `indices[i][j]`.
    pub distances: Vec<Vec<f64>>,
}

impl KnnGraph {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Mean of every neighbour distance in the graph.
    pub fn mean_distance(&self) -> f64 {
        let (sum, count) = self
            .distances
            .iter()
            .flatten()
            .fold((0.0_f64, 0usize), |(s, c), d| (s + d, c + 1));
        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }
}

/// Build the exact kNN graph. A point is never its own neighbour, so `k`
/// must be strictly less than the number of points. Ties are broken by index.
pub fn nearest_neighbors(data: &[Vec<f32>], k: usize) -> Result<KnnGraph, PrismError> {
    let n = data.len();
    if k == 0 || k >= n {
        return Err(PrismError::InvalidInput(format!(
            "Cannot take {} neighbours among {} points",
            k, n
        )));
    }

    // Symmetric distance matrix, computed once per pair.
    let mut matrix = vec![vec![0.0_f64; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = cosine_distance(&data[i], &data[j]);
            matrix[i][j] = d;
            matrix[j][i] = d;
        }
    }

    let mut indices = Vec::with_capacity(n);
    let mut distances = Vec::with_capacity(n);
    for (i, row) in matrix.iter().enumerate() {
        let mut candidates: Vec<(usize, f64)> = row
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(j, d)| (j, *d))
            .collect();
        candidates.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        candidates.truncate(k);

        indices.push(candidates.iter().map(|(j, _)| *j).collect());
        distances.push(candidates.iter().map(|(_, d)| *d).collect());
    }

    Ok(KnnGraph { indices, distances })
}
