//! Vector math shared by the chunker, extractor and narrator.

use ndarray::{ArrayView1, ArrayView2, Axis};

/// Euclidean norm.
pub fn l2_norm(v: ArrayView1<f64>) -> f64 {
    v.dot(&v).sqrt()
}

/// Cosine similarity between two vectors.
///
/// Defined as 0 when either vector has zero norm; clamped to [-1, 1].
pub fn cosine_similarity(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    let denom = l2_norm(a) * l2_norm(b);
    if denom == 0.0 || !denom.is_finite() {
        return 0.0;
    }
    (a.dot(&b) / denom).clamp(-1.0, 1.0)
}

/// Cosine similarity of every row of `matrix` with `direction`.
pub fn row_cosine_similarities(matrix: ArrayView2<f64>, direction: ArrayView1<f64>) -> Vec<f64> {
    let dir_norm = l2_norm(direction);
    let dots = matrix.dot(&direction);
    matrix
        .axis_iter(Axis(0))
        .zip(dots.iter())
        .map(|(row, &dot)| {
            let denom = l2_norm(row) * dir_norm;
            if denom == 0.0 || !denom.is_finite() {
                0.0
            } else {
                (dot / denom).clamp(-1.0, 1.0)
            }
        })
        .collect()
}

/// Quantile with linear interpolation between closest ranks.
///
/// NaN values are ignored. Returns None when no finite value remains.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Indices of values at or above the `q` quantile, in input order.
///
/// Ties at the threshold are all kept, so more than `1 - q` of the
/// values may be selected.
pub fn top_quantile_indices(values: &[f64], q: f64) -> Vec<usize> {
    let Some(threshold) = quantile(values, q) else {
        return Vec::new();
    };
    values
        .iter()
        .enumerate()
        .filter(|(_, &v)| v >= threshold)
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn test_cosine_basic() {
        let a = array![1.0, 0.0];
        let b = array![0.0, 2.0];
        let c = array![-3.0, 0.0];
        assert_eq!(cosine_similarity(a.view(), b.view()), 0.0);
        assert!((cosine_similarity(a.view(), a.view()) - 1.0).abs() < 1e-12);
        assert!((cosine_similarity(a.view(), c.view()) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_zero_norm() {
        let zero = array![0.0, 0.0, 0.0];
        let v = array![1.0, 2.0, 3.0];
        assert_eq!(cosine_similarity(zero.view(), v.view()), 0.0);
    }

    #[test]
    fn test_row_similarities_in_range() {
        let m = Array2::from_shape_vec(
            (4, 3),
            vec![1.0, 2.0, 3.0, -1.0, 0.5, 0.0, 0.0, 0.0, 0.0, 1e-3, 1e3, -7.0],
        )
        .unwrap();
        let dir = array![0.3, -0.2, 0.9];
        let sims = row_cosine_similarities(m.view(), dir.view());
        assert_eq!(sims.len(), 4);
        assert_eq!(sims[2], 0.0);
        assert!(sims.iter().all(|s| (-1.0..=1.0).contains(s)));
    }

    #[test]
    fn test_quantile_linear() {
        let values: Vec<f64> = (1..=10).map(|v| v as f64).collect();
        // (n - 1) * 0.95 = 8.55 -> 9 + 0.55 * (10 - 9)
        assert!((quantile(&values, 0.95).unwrap() - 9.55).abs() < 1e-12);
        assert_eq!(quantile(&values, 0.0), Some(1.0));
        assert_eq!(quantile(&values, 1.0), Some(10.0));
        assert_eq!(quantile(&[], 0.5), None);
        assert_eq!(quantile(&[f64::NAN, 2.0], 0.5), Some(2.0));
    }

    #[test]
    fn test_top_quantile_non_empty() {
        let values = vec![0.1, 0.7, 0.3, 0.9, 0.2];
        assert_eq!(top_quantile_indices(&values, 0.95), vec![3]);
    }

    #[test]
    fn test_top_quantile_keeps_ties() {
        let values = vec![0.5, 0.9, 0.9, 0.9, 0.1];
        assert_eq!(top_quantile_indices(&values, 0.95), vec![1, 2, 3]);

        let flat = vec![0.4; 6];
        assert_eq!(top_quantile_indices(&flat, 0.95).len(), 6);
    }
}
