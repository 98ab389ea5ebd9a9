//! Principal component analysis on a stacked embedding matrix.
//!
//! The decomposition itself comes from `linfa-reduction`. Variance shares are
//! reported against the total variance of the input, so they sum to at most
//! one even when fewer components than dimensions are kept. Components are
//! unit vectors whose largest-magnitude loading is positive.

use innotrend_core::{Error, Result};
use linfa::prelude::*;
use linfa_ndarray as la;
use linfa_reduction::Pca as LinfaPca;
use ndarray::{Array1, Array2, ArrayView2, ArrayViewMut1, Axis};
use tracing::debug;

/// Fitted decomposition.
#[derive(Debug, Clone)]
pub struct Pca {
    /// Column means of the input, shape `(d,)`.
    pub mean: Array1<f64>,
    /// Principal axes, shape `(k, d)`, one unit vector per row.
    pub components: Array2<f64>,
    /// Variance along each axis.
    pub explained_variance: Array1<f64>,
    /// Share of total variance along each axis.
    pub explained_variance_ratio: Array1<f64>,
}

impl Pca {
    /// Fit `n_components` axes to the rows of `x` (shape `(n, d)`).
    pub fn fit(x: ArrayView2<f64>, n_components: usize) -> Result<Self> {
        let (n, d) = x.dim();
        if n_components == 0 || n_components > n.min(d) {
            return Err(Error::Analysis(format!(
                "cannot fit {} components to a {}x{} matrix",
                n_components, n, d
            )));
        }
        if n < 2 {
            return Err(Error::Analysis("need at least two rows".into()));
        }

        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| Error::Analysis("empty matrix".into()))?;
        let dof = n as f64 - 1.0;
        let total_variance = (&x - &mean).mapv(|v| v * v).sum() / dof;
        if !(total_variance > 0.0) {
            return Err(Error::Analysis("matrix has zero variance".into()));
        }

        let records = la::Array2::from_shape_vec((n, d), x.iter().copied().collect())
            .map_err(|e| Error::Analysis(e.to_string()))?;
        let dataset = DatasetBase::from(records);
        let fitted = LinfaPca::params(n_components)
            .fit(&dataset)
            .map_err(|e| Error::Analysis(format!("PCA fit failed: {}", e)))?;

        let axes = fitted.components();
        let sigma = fitted.singular_values();
        if axes.dim() != (n_components, d) || sigma.len() != n_components {
            return Err(Error::Analysis(format!(
                "PCA returned {:?} axes for {} components of dimension {}",
                axes.dim(),
                n_components,
                d
            )));
        }

        // largest variance first
        let mut order: Vec<usize> = (0..n_components).collect();
        order.sort_by(|&i, &j| sigma[j].total_cmp(&sigma[i]));

        let mut components = Array2::<f64>::zeros((n_components, d));
        for (dst, &src) in order.iter().enumerate() {
            let mut row = components.row_mut(dst);
            for (slot, &v) in row.iter_mut().zip(axes.row(src).iter()) {
                *slot = v;
            }
            normalize(row.view_mut());
            orient(row);
        }
        let explained_variance: Array1<f64> =
            order.iter().map(|&i| sigma[i] * sigma[i] / dof).collect();
        let explained_variance_ratio = &explained_variance / total_variance;

        debug!(
            "PCA on {}x{}: variance ratios {:?}",
            n, d, explained_variance_ratio
        );

        Ok(Self {
            mean,
            components,
            explained_variance,
            explained_variance_ratio,
        })
    }
}

/// Scale to unit length; zero vectors are left alone.
fn normalize(mut v: ArrayViewMut1<f64>) {
    let norm = v.dot(&v).sqrt();
    if norm > 0.0 {
        v.mapv_inplace(|x| x / norm);
    }
}

/// Flip a component so its largest-magnitude loading is positive.
fn orient(mut v: ArrayViewMut1<f64>) {
    let pivot = v
        .iter()
        .copied()
        .fold(0.0_f64, |best, x| if x.abs() > best.abs() { x } else { best });
    if pivot < 0.0 {
        v.mapv_inplace(|x| -x);
    }
}
