use ndarray::{s, Array1, Array2, Axis};
use super::linalg::symmetric_eigen;
/// Principal-component projection fitted on the residual table.
#[derive(Clone, Debug)]
pub struct Pca {
    pub mean: Array1<f64>,
    /// One principal axis per column.
    pub components: Array2<f64>,
    pub explained_variance_ratio: Vec<f64>,
}
impl Pca {
    /// Keeps the fewest leading components whose cumulative explained variance
    /// reaches `target`, but at least `min_components`. Returns `None` when
    /// the rows carry no variance at all.
    pub fn fit(data: &Array2<f64>, target: f64, min_components: usize) -> Option<Self> {
        let (rows, cols) = data.dim();
        if rows < 2 || cols == 0 {
            return None;
        }
        let mean = data.mean_axis(Axis(0))?;
        let centered = data - &mean;
        let covariance = centered.t().dot(&centered) / (rows - 1) as f64;
        let eigen = symmetric_eigen(&covariance);
        let variances: Vec<f64> = eigen.values.iter().map(|v| v.max(0.0)).collect();
        let total: f64 = variances.iter().sum();
        if total <= f64::EPSILON {
            return None;
        }
        let ratios: Vec<f64> = variances.iter().map(|v| v / total).collect();
        let mut cumulative = 0.0;
        let mut keep = ratios.len();
        for (i, ratio) in ratios.iter().enumerate() {
            cumulative += ratio;
            if cumulative >= target {
                keep = i + 1;
                break;
            }
        }
        let keep = keep.max(min_components).min(cols);
        Some(Self {
            mean,
            components: eigen.vectors.slice(s![.., ..keep]).to_owned(),
            explained_variance_ratio: ratios[..keep].to_vec(),
        })
    }
    pub fn n_components(&self) -> usize {
        self.components.ncols()
    }
    pub fn transform(&self, data: &Array2<f64>) -> Array2<f64> {
        (data - &self.mean).dot(&self.components)
    }
}
