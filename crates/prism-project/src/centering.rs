// crates/prism-project/src/centering.rs
//
// Group centering: for every distinct key, subtract the mean of the vectors
// sharing that key from each of them. Dimensionality is unchanged.
//
// Properties:
//   - Each group's centered vectors average to zero.
//   - A group with one member centers to the exact zero vector (a single
//     response is indistinguishable from the prompt's average response).
//   - The result for a group depends only on the multiset of its vectors:
//     members are summed in a canonical order, not input order.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

use prism_core::error::PrismError;

/// Center `embeddings` by the group each index belongs to in `keys`.
///
/// `keys` must be index-aligned with `embeddings`; the output is too.
pub fn center_by_group<K: Eq + Hash>(
    embeddings: &[Vec<f32>],
    keys: &[K],
) -> Result<Vec<Vec<f32>>, PrismError> {
    if embeddings.len() != keys.len() {
        return Err(PrismError::InvalidInput(format!(
            "Centering needs one key per vector: {} vectors, {} keys",
            embeddings.len(),
            keys.len()
        )));
    }
    let Some(first) = embeddings.first() else {
        return Ok(Vec::new());
    };
    let dims = first.len();
    if let Some(bad) = embeddings.iter().position(|v| v.len() != dims) {
        return Err(PrismError::InvalidInput(format!(
            "Vector {} has {} dimensions, expected {}",
            bad,
            embeddings[bad].len(),
            dims
        )));
    }

    let mut groups: HashMap<&K, Vec<usize>> = HashMap::new();
    for (i, key) in keys.iter().enumerate() {
        groups.entry(key).or_default().push(i);
    }

    let mut centered = vec![Vec::new(); embeddings.len()];
    for members in groups.values() {
        if members.len() == 1 {
            centered[members[0]] = vec![0.0; dims];
            continue;
        }

        let mean = group_mean(embeddings, members, dims);
        for &i in members {
            centered[i] = embeddings[i]
                .iter()
                .zip(mean.iter())
                .map(|(&x, &m)| (x as f64 - m) as f32)
                .collect();
        }
    }

    Ok(centered)
}

/// Arithmetic mean of the member vectors, accumulated in f64.
fn group_mean(embeddings: &[Vec<f32>], members: &[usize], dims: usize) -> Vec<f64> {
    let mut ordered: Vec<&Vec<f32>> = members.iter().map(|&i| &embeddings[i]).collect();
    ordered.sort_by(|a, b| lexicographic(a, b));

    let mut sum = vec![0.0_f64; dims];
    for v in ordered {
        for (s, &x) in sum.iter_mut().zip(v.iter()) {
            *s += x as f64;
        }
    }
    let n = members.len() as f64;
    sum.into_iter().map(|s| s / n).collect()
}

fn lexicographic(a: &[f32], b: &[f32]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        match x.total_cmp(y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}
