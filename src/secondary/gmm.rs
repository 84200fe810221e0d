use std::f64::consts::PI;
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use thiserror::Error;
use super::kmeans::{lloyd, plus_plus_centroids};
use super::linalg::{cholesky, forward_substitute};
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GmmError {
    #[error("EM did not converge with {components} components after {iterations} iterations")]
    NotConverged { components: usize, iterations: usize },
    #[error("covariance of component {component} is not positive definite")]
    SingularCovariance { component: usize },
    #[error("{points} points cannot support {components} components")]
    TooFewPoints { points: usize, components: usize },
}
#[derive(Clone, Debug)]
pub struct GmmOptions {
    pub max_iterations: usize,
    /// Convergence threshold on the change of the mean log-likelihood.
    pub tolerance: f64,
    /// Added to every covariance diagonal.
    pub regularization: f64,
}
/// Full-covariance Gaussian mixture fitted by expectation-maximisation.
#[derive(Clone, Debug)]
pub struct GaussianMixture {
    pub weights: Vec<f64>,
    pub means: Array2<f64>,
    pub covariances: Vec<Array2<f64>>,
    pub iterations: usize,
    pub mean_log_likelihood: f64,
    factors: Vec<Array2<f64>>,
}
impl GaussianMixture {
    /// Initialises from a k-means partition, then iterates EM.
    pub fn fit(
        points: &Array2<f64>,
        components: usize,
        options: &GmmOptions,
        rng: &mut StdRng,
    ) -> Result<Self, GmmError> {
        let n = points.nrows();
        if components == 0 || n < components.max(2) {
            return Err(GmmError::TooFewPoints {
                points: n,
                components,
            });
        }
        let centroids = plus_plus_centroids(points, components, rng);
        let (labels, _) = lloyd(points, centroids, 100);
        let mut responsibilities = Array2::<f64>::zeros((n, components));
        for (i, &label) in labels.iter().enumerate() {
            responsibilities[[i, label]] = 1.0;
        }
        let mut model = Self::m_step(points, &responsibilities, options.regularization)?;
        let mut previous = f64::NEG_INFINITY;
        for iteration in 1..=options.max_iterations {
            let (next, log_likelihood) = model.e_step(points);
            responsibilities = next;
            model = Self::m_step(points, &responsibilities, options.regularization)?;
            model.iterations = iteration;
            model.mean_log_likelihood = log_likelihood;
            if (log_likelihood - previous).abs() < options.tolerance {
                return Ok(model);
            }
            previous = log_likelihood;
        }
        Err(GmmError::NotConverged {
            components,
            iterations: options.max_iterations,
        })
    }
    pub fn n_components(&self) -> usize {
        self.weights.len()
    }
    /// Most likely component of every point.
    pub fn predict(&self, points: &Array2<f64>) -> Vec<usize> {
        let log_probs = self.weighted_log_densities(points);
        log_probs
            .outer_iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .fold((0, f64::NEG_INFINITY), |best, (c, &p)| {
                        if p > best.1 {
                            (c, p)
                        } else {
                            best
                        }
                    })
                    .0
            })
            .collect()
    }
    fn m_step(
        points: &Array2<f64>,
        responsibilities: &Array2<f64>,
        regularization: f64,
    ) -> Result<Self, GmmError> {
        let n = points.nrows();
        let components = responsibilities.ncols();
        let totals: Array1<f64> =
            responsibilities.sum_axis(Axis(0)).mapv(|t| t + 10.0 * f64::EPSILON);
        let means = responsibilities.t().dot(points) / &totals.view().insert_axis(Axis(1));
        let mut covariances = Vec::with_capacity(components);
        let mut factors = Vec::with_capacity(components);
        for c in 0..components {
            let centered = points - &means.row(c);
            let weighted = &centered * &responsibilities.column(c).insert_axis(Axis(1));
            let mut covariance = weighted.t().dot(&centered) / totals[c];
            covariance.diag_mut().mapv_inplace(|v| v + regularization);
            let factor =
                cholesky(&covariance).ok_or(GmmError::SingularCovariance { component: c })?;
            covariances.push(covariance);
            factors.push(factor);
        }
        Ok(Self {
            weights: totals.iter().map(|t| t / n as f64).collect(),
            means,
            covariances,
            iterations: 0,
            mean_log_likelihood: f64::NEG_INFINITY,
            factors,
        })
    }
    /// Responsibilities and the mean log-likelihood of the data.
    fn e_step(&self, points: &Array2<f64>) -> (Array2<f64>, f64) {
        let mut log_probs = self.weighted_log_densities(points);
        let mut total = 0.0;
        for mut row in log_probs.outer_iter_mut() {
            let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let norm = max + row.iter().map(|p| (p - max).exp()).sum::<f64>().ln();
            total += norm;
            row.mapv_inplace(|p| (p - norm).exp());
        }
        (log_probs, total / points.nrows() as f64)
    }
    fn weighted_log_densities(&self, points: &Array2<f64>) -> Array2<f64> {
        let (n, dim) = points.dim();
        let mut out = Array2::<f64>::zeros((n, self.n_components()));
        for (c, factor) in self.factors.iter().enumerate() {
            let log_det: f64 = factor.diag().iter().map(|v| v.ln()).sum::<f64>() * 2.0;
            let constant =
                self.weights[c].ln() - 0.5 * (dim as f64 * (2.0 * PI).ln() + log_det);
            for i in 0..n {
                let diff: Vec<f64> = points
                    .row(i)
                    .iter()
                    .zip(self.means.row(c).iter())
                    .map(|(x, m)| x - m)
                    .collect();
                let y = forward_substitute(factor, &diff);
                let mahalanobis: f64 = y.iter().map(|v| v * v).sum();
                out[[i, c]] = constant - 0.5 * mahalanobis;
            }
        }
        out
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    fn options() -> GmmOptions {
        GmmOptions {
            max_iterations: 200,
            tolerance: 1e-6,
            regularization: 1e-6,
        }
    }
    fn blobs() -> Array2<f64> {
        Array2::from_shape_fn((60, 2), |(i, j)| {
            let centre = if i < 30 { -4.0 } else { 4.0 };
            let jitter = (((i * 13 + j * 7) % 11) as f64 - 5.0) * 0.2;
            centre + jitter
        })
    }
    #[test]
    fn recovers_two_components() {
        let points = blobs();
        let gmm = GaussianMixture::fit(&points, 2, &options(), &mut StdRng::seed_from_u64(5)).unwrap();
        let labels = gmm.predict(&points);
        assert!(labels[..30].iter().all(|&l| l == labels[0]));
        assert!(labels[30..].iter().all(|&l| l == labels[30]));
        assert_ne!(labels[0], labels[30]);
        assert!((gmm.weights.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }
    #[test]
    fn too_few_points() {
        let points = Array2::zeros((1, 2));
        let err = GaussianMixture::fit(&points, 2, &options(), &mut StdRng::seed_from_u64(5))
            .unwrap_err();
        assert_eq!(err, GmmError::TooFewPoints { points: 1, components: 2 });
    }
    #[test]
    fn degenerate_component_is_singular() {
        // Every point identical: zero covariance and no regularisation.
        let points = Array2::from_elem((10, 2), 1.0);
        let opts = GmmOptions {
            regularization: 0.0,
            ..options()
        };
        let err = GaussianMixture::fit(&points, 1, &opts, &mut StdRng::seed_from_u64(5))
            .unwrap_err();
        assert_eq!(err, GmmError::SingularCovariance { component: 0 });
    }
}
