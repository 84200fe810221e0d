// src/secondary/mod.rs
// Population-wide removal of the stimulus-locked residual left by the shape fit.
pub mod consensus;
pub mod gmm;
pub mod hierarchy;
pub mod kmeans;
pub mod linalg;
pub mod pca;
pub mod spectral;
use std::collections::{BTreeMap, BTreeSet};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
pub use consensus::{consensus_cluster_count, Clusterer, CoAssociation};
pub use gmm::{GaussianMixture, GmmError, GmmOptions};
pub use hierarchy::{Dendrogram, Merge};
pub use kmeans::KMeans;
pub use pca::Pca;
pub use spectral::SpectralClustering;
use crate::options::{seconds_to_samples, SecondaryOptions};
use crate::progress::Progress;
/// Fixed-width windows of `raw - reconstruction` following each fitted
/// trial's blanking boundary.
#[derive(Clone, Debug, Default)]
pub struct ResidualTable {
    width: usize,
    trials: Vec<usize>,
    starts: Vec<usize>,
    values: Vec<f64>,
    overruns: BTreeSet<usize>,
}
impl ResidualTable {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }
    pub fn width(&self) -> usize {
        self.width
    }
    /// `residual` holds the residual samples available from trace position
    /// `start` up to the end of the fitted segment. A trial with fewer than
    /// `width` samples is recorded as an overrun instead of a row.
    pub fn push(&mut self, trial: usize, start: usize, residual: &[f64]) {
        if residual.len() < self.width || self.width == 0 {
            self.overruns.insert(trial);
            return;
        }
        self.trials.push(trial);
        self.starts.push(start);
        self.values.extend_from_slice(&residual[..self.width]);
    }
    pub fn len(&self) -> usize {
        self.trials.len()
    }
    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }
    pub fn trials(&self) -> &[usize] {
        &self.trials
    }
    pub fn overruns(&self) -> &BTreeSet<usize> {
        &self.overruns
    }
    pub fn to_matrix(&self) -> Array2<f64> {
        Array2::from_shape_vec((self.len(), self.width), self.values.clone())
            .unwrap_or_else(|_| Array2::zeros((0, self.width)))
    }
}
/// What the secondary pass did.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SecondaryReport {
    /// `true` when at least one cluster mean was subtracted.
    pub applied: bool,
    pub rows: usize,
    pub principal_components: usize,
    /// Cluster count suggested by the consensus cut.
    pub consensus_clusters: usize,
    /// Components of the mixture that finally converged (0 if none did).
    pub mixture_components: usize,
    pub cluster_sizes: Vec<usize>,
    /// Mixture component of each clustered trial.
    pub labels: BTreeMap<usize, usize>,
    pub corrected_trials: BTreeSet<usize>,
    /// Trials whose residual window ran past their fitted segment.
    pub overrun_trials: BTreeSet<usize>,
}
/// Clusters residual windows and subtracts each large cluster's mean shape.
#[derive(Clone, Debug)]
pub struct SecondaryArtifactRemover {
    options: SecondaryOptions,
    seed: u64,
    width: usize,
}
impl SecondaryArtifactRemover {
    pub fn new(options: SecondaryOptions, sample_rate_hz: f64, seed: u64) -> Self {
        let width = seconds_to_samples(options.window_s, sample_rate_hz);
        Self {
            options,
            seed,
            width,
        }
    }
    /// Width of one residual row in samples.
    pub fn window_len(&self) -> usize {
        self.width
    }
    pub fn table(&self) -> ResidualTable {
        ResidualTable::new(self.width)
    }
    /// Corrects `output` in place. Progress is reported from `progress_start`
    /// to 1.0.
    pub fn remove<P: Progress + ?Sized>(
        &self,
        output: &mut [f64],
        table: &ResidualTable,
        progress: &mut P,
        progress_start: f64,
    ) -> SecondaryReport {
        let mut report = SecondaryReport {
            rows: table.len(),
            overrun_trials: table.overruns().clone(),
            ..SecondaryReport::default()
        };
        if !report.overrun_trials.is_empty() {
            log::warn!(
                "{} trial(s) skipped by the secondary pass: residual window overruns the fitted segment",
                report.overrun_trials.len()
            );
        }
        if !self.options.enabled {
            log::info!("secondary artifact removal disabled");
            return report;
        }
        if table.len() < self.options.min_cluster_size.max(2) {
            log::info!(
                "secondary artifact removal skipped: {} residual rows, need {}",
                table.len(),
                self.options.min_cluster_size
            );
            return report;
        }
        let step = |done: f64| progress_start + (1.0 - progress_start) * done;
        let residuals = table.to_matrix();
        let Some(pca) = Pca::fit(
            &residuals,
            self.options.explained_variance,
            self.options.min_components,
        ) else {
            log::info!("secondary artifact removal skipped: residuals carry no variance");
            return report;
        };
        let projected = pca.transform(&residuals);
        report.principal_components = pca.n_components();
        progress.update(step(0.1), "secondary: projection");
        let mut rng = StdRng::seed_from_u64(self.seed);
        let kmeans = KMeans::default();
        let spectral = SpectralClustering::default();
        let max_k = self.options.max_clusters;
        let consensus = consensus_cluster_count(
            &projected,
            &[&kmeans, &spectral],
            2..=max_k,
            self.options.runs_per_k,
            self.options.cophenetic_cutoff,
            &mut rng,
            |k| {
                let done = (k - 1) as f64 / (max_k - 1).max(1) as f64;
                progress.update(step(0.1 + 0.7 * done), "secondary: consensus clustering");
            },
        )
        .min(max_k);
        report.consensus_clusters = consensus;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let gmm_options = GmmOptions {
            max_iterations: self.options.gmm_max_iterations,
            tolerance: self.options.gmm_tolerance,
            regularization: self.options.gmm_regularization,
        };
        let mut components = consensus;
        let mixture = loop {
            if components == 0 {
                break None;
            }
            match GaussianMixture::fit(&projected, components, &gmm_options, &mut rng) {
                Ok(mixture) => break Some(mixture),
                Err(err) => {
                    log::debug!("mixture fit failed: {err}");
                    components -= 1;
                }
            }
        };
        progress.update(step(0.9), "secondary: mixture model");
        let Some(mixture) = mixture else {
            log::warn!(
                "secondary artifact removal disabled: no mixture converged for {consensus} or fewer components"
            );
            progress.update(1.0, "secondary: done");
            return report;
        };
        report.mixture_components = mixture.n_components();
        let labels = mixture.predict(&projected);
        let mut sizes = vec![0usize; mixture.n_components()];
        for &label in &labels {
            sizes[label] += 1;
        }
        for (cluster, &size) in sizes.iter().enumerate() {
            if size < self.options.min_cluster_size {
                continue;
            }
            let members: Vec<usize> = (0..labels.len()).filter(|&r| labels[r] == cluster).collect();
            let mut mean = vec![0.0; self.width];
            for &row in &members {
                for (m, v) in mean.iter_mut().zip(residuals.row(row)) {
                    *m += v / size as f64;
                }
            }
            for &row in &members {
                let start = table.starts[row];
                for (out, m) in output[start..start + self.width].iter_mut().zip(&mean) {
                    *out -= m;
                }
                report.corrected_trials.insert(table.trials[row]);
            }
        }
        report.applied = !report.corrected_trials.is_empty();
        report.labels = table.trials.iter().copied().zip(labels).collect();
        report.cluster_sizes = sizes;
        log::info!(
            "secondary pass: {} rows, {} components, {} clusters, {} trials corrected",
            report.rows,
            report.principal_components,
            report.mixture_components,
            report.corrected_trials.len()
        );
        progress.update(1.0, "secondary: done");
        report
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::Silent;
    fn options(min_cluster_size: usize) -> SecondaryOptions {
        SecondaryOptions {
            window_s: 1e-3,
            min_cluster_size,
            max_clusters: 3,
            runs_per_k: 2,
            ..SecondaryOptions::default()
        }
    }
    /// Residual rows: a shared bump on every trial plus small per-trial wiggles.
    fn table(trials: usize, width: usize) -> ResidualTable {
        let mut table = ResidualTable::new(width);
        for t in 0..trials {
            let row: Vec<f64> = (0..width)
                .map(|i| {
                    let bump = 20.0 * (-((i as f64 - 5.0) / 3.0).powi(2)).exp();
                    bump + (((t * 31 + i * 17) % 13) as f64 - 6.0) * 0.5
                })
                .collect();
            table.push(t, 100 + t * 50, &row);
        }
        table
    }
    #[test]
    fn short_rows_are_overruns() {
        let mut table = ResidualTable::new(10);
        table.push(0, 0, &[0.0; 10]);
        table.push(1, 20, &[0.0; 4]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.overruns().iter().copied().collect::<Vec<_>>(), vec![1]);
        assert_eq!(table.to_matrix().dim(), (1, 10));
    }
    #[test]
    fn too_few_rows_leave_output_untouched() {
        let remover = SecondaryArtifactRemover::new(options(50), 10_000.0, 1);
        let table = table(20, remover.window_len());
        let mut output = vec![1.0; 2000];
        let report = remover.remove(&mut output, &table, &mut Silent, 0.0);
        assert!(!report.applied);
        assert!(output.iter().all(|&v| v == 1.0));
    }
    #[test]
    fn shared_shape_is_subtracted() {
        let remover = SecondaryArtifactRemover::new(options(5), 10_000.0, 1);
        let width = remover.window_len();
        let table = table(30, width);
        let mut output = vec![0.0; 3000];
        let report = remover.remove(&mut output, &table, &mut Silent, 0.0);
        assert!(report.mixture_components >= 1);
        assert!(report.applied);
        assert_eq!(report.cluster_sizes.iter().sum::<usize>(), 30);
        // Every corrected trial belongs to a cluster of at least the minimum size.
        for trial in &report.corrected_trials {
            let label = report.labels[trial];
            assert!(report.cluster_sizes[label] >= 5);
        }
        // The bump peak (sample 5) was pulled down on corrected trials.
        for trial in &report.corrected_trials {
            let start = 100 + trial * 50;
            assert!(output[start + 5] < -10.0);
        }
    }
    #[test]
    fn same_seed_is_reproducible() {
        let remover = SecondaryArtifactRemover::new(options(5), 10_000.0, 42);
        let table = table(30, remover.window_len());
        let mut a = vec![0.0; 3000];
        let mut b = vec![0.0; 3000];
        let ra = remover.remove(&mut a, &table, &mut Silent, 0.0);
        let rb = remover.remove(&mut b, &table, &mut Silent, 0.0);
        assert_eq!(ra, rb);
        assert_eq!(a, b);
    }
    #[test]
    fn failed_mixture_fits_leave_output_untouched() {
        let options = SecondaryOptions {
            gmm_max_iterations: 0,
            ..options(5)
        };
        let remover = SecondaryArtifactRemover::new(options, 10_000.0, 1);
        let table = table(30, remover.window_len());
        let mut output = vec![0.0; 3000];
        let report = remover.remove(&mut output, &table, &mut Silent, 0.0);
        assert!(report.consensus_clusters >= 1);
        assert_eq!(report.mixture_components, 0);
        assert!(!report.applied);
        assert!(report.labels.is_empty());
        assert!(report.corrected_trials.is_empty());
        assert!(output.iter().all(|&v| v == 0.0));
    }
}
