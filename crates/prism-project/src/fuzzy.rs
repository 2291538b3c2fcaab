// crates/prism-project/src/fuzzy.rs
//
// Fuzzy simplicial set construction from a kNN graph.
//
// Each point gets a local scale: `rho` is the distance to its nearest
// non-identical neighbour and `sigma` is chosen so that the smoothed
// membership strengths of its neighbours sum to log2(k + 1). Directed
// memberships are then merged with the fuzzy union `a + b - a*b`.

use std::collections::BTreeMap;

use crate::knn::KnnGraph;

const SMOOTH_K_TOLERANCE: f64 = 1e-5;
const MIN_K_DIST_SCALE: f64 = 1e-3;
const BISECTION_ITERATIONS: usize = 64;

/// Per-point bandwidth (`sigma`) and local connectivity offset (`rho`).
#[derive(Debug, Clone, PartialEq)]
pub struct LocalScales {
    pub sigmas: Vec<f64>,
    pub rhos: Vec<f64>,
}

/// Binary-search each point's `sigma`.
pub fn smooth_knn_dist(graph: &KnnGraph) -> LocalScales {
    let mean_distances = graph.mean_distance();
    let mut sigmas = Vec::with_capacity(graph.len());
    let mut rhos = Vec::with_capacity(graph.len());

    for row in &graph.distances {
        let target = ((row.len() + 1) as f64).log2();
        let rho = row.iter().copied().find(|d| *d > 0.0).unwrap_or(0.0);

        let mut lo = 0.0_f64;
        let mut hi = f64::INFINITY;
        let mut mid = 1.0_f64;

        for _ in 0..BISECTION_ITERATIONS {
            let psum: f64 = row
                .iter()
                .map(|d| {
                    let dd = d - rho;
                    if dd > 0.0 {
                        (-dd / mid).exp()
                    } else {
                        1.0
                    }
                })
                .sum();

            if (psum - target).abs() < SMOOTH_K_TOLERANCE {
                break;
            }
            if psum > target {
                hi = mid;
                mid = (lo + hi) / 2.0;
            } else {
                lo = mid;
                if hi == f64::INFINITY {
                    mid *= 2.0;
                } else {
                    mid = (lo + hi) / 2.0;
                }
            }
        }

        let floor = if rho > 0.0 {
            let mean_ith = row.iter().sum::<f64>() / row.len() as f64;
            MIN_K_DIST_SCALE * mean_ith
        } else {
            MIN_K_DIST_SCALE * mean_distances
        };

        sigmas.push(mid.max(floor));
        rhos.push(rho);
    }

    LocalScales { sigmas, rhos }
}

/// Symmetric weighted edge list `(head, tail, weight)`.
///
/// Both directions of every edge are present, ordered by `(head, tail)`, so
/// downstream optimization visits edges in a fixed order.
pub fn fuzzy_simplicial_set(graph: &KnnGraph, scales: &LocalScales) -> Vec<(usize, usize, f64)> {
    let mut directed: BTreeMap<(usize, usize), f64> = BTreeMap::new();
    for (i, (neighbours, dists)) in graph.indices.iter().zip(graph.distances.iter()).enumerate() {
        let rho = scales.rhos[i];
        let sigma = scales.sigmas[i];
        for (&j, &d) in neighbours.iter().zip(dists.iter()) {
            let strength = if d - rho <= 0.0 || sigma == 0.0 {
                1.0
            } else {
                (-(d - rho) / sigma).exp()
            };
            directed.insert((i, j), strength);
        }
    }

    let mut symmetric: BTreeMap<(usize, usize), f64> = BTreeMap::new();
    for (&(i, j), &w_ij) in &directed {
        let w_ji = directed.get(&(j, i)).copied().unwrap_or(0.0);
        let w = w_ij + w_ji - w_ij * w_ji;
        symmetric.insert((i, j), w);
        symmetric.insert((j, i), w);
    }

    symmetric
        .into_iter()
        .filter(|(_, w)| *w > 0.0)
        .map(|((i, j), w)| (i, j, w))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knn::nearest_neighbors;

    fn sample() -> Vec<Vec<f32>> {
        vec![
            vec![1.0, 0.0, 0.0],
            vec![0.9, 0.2, 0.0],
            vec![0.8, 0.3, 0.1],
            vec![0.0, 1.0, 0.0],
            vec![0.1, 0.9, 0.2],
            vec![0.0, 0.1, 1.0],
        ]
    }

    #[test]
    fn test_memberships_hit_target_sum() {
        let graph = nearest_neighbors(&sample(), 3).unwrap();
        let scales = smooth_knn_dist(&graph);
        let target = 4.0_f64.log2();
        for (i, row) in graph.distances.iter().enumerate() {
            let psum: f64 = row
                .iter()
                .map(|d| {
                    let dd = d - scales.rhos[i];
                    if dd > 0.0 {
                        (-dd / scales.sigmas[i]).exp()
                    } else {
                        1.0
                    }
                })
                .sum();
            assert!((psum - target).abs() < 1e-3, "row {} psum {}", i, psum);
        }
    }

    #[test]
    fn test_rho_is_nearest_nonzero_distance() {
        let graph = nearest_neighbors(&sample(), 2).unwrap();
        let scales = smooth_knn_dist(&graph);
        for (i, row) in graph.distances.iter().enumerate() {
            assert_eq!(scales.rhos[i], row[0]);
            assert!(scales.sigmas[i] > 0.0);
        }
    }

    #[test]
    fn test_edges_are_symmetric_and_bounded() {
        let graph = nearest_neighbors(&sample(), 2).unwrap();
        let scales = smooth_knn_dist(&graph);
        let edges = fuzzy_simplicial_set(&graph, &scales);

        let lookup: BTreeMap<(usize, usize), f64> =
            edges.iter().map(|&(i, j, w)| ((i, j), w)).collect();
        for &(i, j, w) in &edges {
            assert_ne!(i, j);
            assert!(w > 0.0 && w <= 1.0);
            assert_eq!(lookup.get(&(j, i)), Some(&w));
        }
    }

    #[test]
    fn test_duplicate_points_get_full_membership() {
        let data = vec![vec![1.0, 0.0], vec![1.0, 0.0]];
        let graph = nearest_neighbors(&data, 1).unwrap();
        let scales = smooth_knn_dist(&graph);
        assert_eq!(scales.rhos, vec![0.0, 0.0]);
        let edges = fuzzy_simplicial_set(&graph, &scales);
        assert_eq!(edges, vec![(0, 1, 1.0), (1, 0, 1.0)]);
    }
}
