use ndarray::Array2;
use rand::rngs::StdRng;
use super::consensus::Clusterer;
use super::kmeans::{lloyd, plus_plus_centroids};
use super::linalg::leading_eigenvectors;
use crate::stats;
/// Normalised spectral clustering on a Gaussian affinity graph.
#[derive(Clone, Debug)]
pub struct SpectralClustering {
    pub eigen_iterations: usize,
    pub kmeans_iterations: usize,
}
impl Default for SpectralClustering {
    fn default() -> Self {
        Self {
            eigen_iterations: 300,
            kmeans_iterations: 100,
        }
    }
}
impl SpectralClustering {
    /// `D^-1/2 W D^-1/2` with `W_ij = exp(-d_ij^2 / (2 sigma^2))`, where sigma is
    /// the median pairwise distance.
    pub fn normalized_affinity(points: &Array2<f64>) -> Array2<f64> {
        let n = points.nrows();
        let mut distances = Array2::<f64>::zeros((n, n));
        let mut pairwise = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n {
            for j in i + 1..n {
                let d = (&points.row(i) - &points.row(j)).mapv(|x| x * x).sum().sqrt();
                distances[[i, j]] = d;
                distances[[j, i]] = d;
                pairwise.push(d);
            }
        }
        let sigma = stats::median(&pairwise).max(f64::EPSILON);
        let mut affinity = distances.mapv(|d| (-(d * d) / (2.0 * sigma * sigma)).exp());
        affinity.diag_mut().fill(0.0);
        let degree: Vec<f64> = affinity
            .outer_iter()
            .map(|row| row.sum().max(f64::MIN_POSITIVE).sqrt().recip())
            .collect();
        for ((i, j), value) in affinity.indexed_iter_mut() {
            *value *= degree[i] * degree[j];
        }
        affinity
    }
}
impl Clusterer for SpectralClustering {
    fn name(&self) -> &'static str {
        "spectral"
    }
    fn cluster(&self, points: &Array2<f64>, k: usize, rng: &mut StdRng) -> Vec<usize> {
        let n = points.nrows();
        if n <= k {
            return (0..n).collect();
        }
        // Shift the spectrum into [0, 1] so the leading eigenvectors are the
        // algebraically largest ones.
        let mut shifted = Self::normalized_affinity(points);
        shifted.diag_mut().mapv_inplace(|d| d + 1.0);
        shifted.mapv_inplace(|x| 0.5 * x);
        let mut embedding = leading_eigenvectors(&shifted, k, self.eigen_iterations, rng);
        for mut row in embedding.outer_iter_mut() {
            let norm = row.dot(&row).sqrt();
            if norm > f64::EPSILON {
                row.mapv_inplace(|x| x / norm);
            }
        }
        let centroids = plus_plus_centroids(&embedding, k, rng);
        lloyd(&embedding, centroids, self.kmeans_iterations).0
    }
}
