// src/options.rs
//! Every tunable of a rejection run, with the empirically chosen defaults.
use serde::{Deserialize, Serialize};
use crate::error::LogssarError;
/// Saturation limits of the recording system.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SaturationVoltage {
    /// Symmetric limits at `±v`.
    Symmetric(f64),
    /// Explicit `[low, high]` limits.
    Band([f64; 2]),
}
impl SaturationVoltage {
    /// Limits as `(low, high)` multiplied by `scale`.
    pub fn band(&self, scale: f64) -> (f64, f64) {
        match *self {
            SaturationVoltage::Symmetric(v) => (-v.abs() * scale, v.abs() * scale),
            SaturationVoltage::Band([low, high]) => (low * scale, high * scale),
        }
    }
}
/// How the seam between a corrected segment and its neighbours is bridged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrectionMethod {
    #[default]
    Linear,
    /// Shape-preserving piecewise cubic (PCHIP).
    Cubic,
    /// Natural cubic spline.
    Spline,
}
/// Interpolant used between the log-spaced nodes of the shape fit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMethod {
    #[default]
    Linear,
    Spline,
}
/// What a fully skipped trial leaves in the output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkippedFill {
    #[default]
    Raw,
    Zero,
}
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineOptions {
    /// Length of each pre-stimulus window.
    pub duration_s: f64,
    /// Gap between the end of the window and the onset.
    pub offset_s: f64,
    /// `[low, high]` percentiles of the acceptance band.
    pub percentiles: [f64; 2],
}
impl Default for BaselineOptions {
    fn default() -> Self {
        Self {
            duration_s: 5e-3,
            offset_s: 5e-4,
            percentiles: [2.5, 97.5],
        }
    }
}
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtentOptions {
    /// Sliding window whose median must fall inside the baseline band.
    pub search_window_s: f64,
    /// Post-blanking std above this multiple of the pre-onset std marks an artifact.
    pub artifact_std_ratio: f64,
}
impl Default for ExtentOptions {
    fn default() -> Self {
        Self {
            search_window_s: 3e-3,
            artifact_std_ratio: 2.0,
        }
    }
}
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    pub method: FitMethod,
    /// Number of log-spaced nodes as a fraction of the window length.
    pub node_fraction: f64,
    pub min_half_width: usize,
    pub max_half_width: usize,
    /// Extra raw samples appended to the fit window (spline variant only).
    pub end_padding_s: f64,
}
impl Default for FitOptions {
    fn default() -> Self {
        Self {
            method: FitMethod::Linear,
            node_fraction: 0.1,
            min_half_width: 2,
            max_half_width: 15,
            end_padding_s: 0.0,
        }
    }
}
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecondaryOptions {
    pub enabled: bool,
    /// Residual window following the blanking boundary.
    pub window_s: f64,
    /// Cumulative explained variance the principal components must reach.
    pub explained_variance: f64,
    pub min_components: usize,
    /// Clusters smaller than this are left uncorrected.
    pub min_cluster_size: usize,
    /// Largest candidate cluster count tried by the consensus step.
    pub max_clusters: usize,
    /// Runs per algorithm and candidate count.
    pub runs_per_k: usize,
    pub cophenetic_cutoff: f64,
    pub gmm_max_iterations: usize,
    pub gmm_tolerance: f64,
    pub gmm_regularization: f64,
}
impl Default for SecondaryOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            window_s: 2e-3,
            explained_variance: 0.7,
            min_components: 2,
            min_cluster_size: 50,
            max_clusters: 6,
            runs_per_k: 5,
            cophenetic_cutoff: 0.8,
            gmm_max_iterations: 200,
            gmm_tolerance: 1e-6,
            gmm_regularization: 1e-6,
        }
    }
}
pub const DEFAULT_RANDOM_SEED: u64 = 0x5EED;
/// Options of a single [`reject_artifacts`](crate::reject_artifacts) call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RejectionOptions {
    pub blanking_period_s: f64,
    /// `None` uses `saturation_margin` of the input's absolute maximum.
    pub saturation_voltage: Option<SaturationVoltage>,
    /// Multiplier bringing `saturation_voltage` into trace units (1000.0 for mV limits on a µV trace).
    pub saturation_scale: f64,
    pub saturation_margin: f64,
    pub min_clipped_samples: usize,
    pub random_seed: u64,
    pub correction_method: CorrectionMethod,
    pub correction_window_s: f64,
    pub skipped_fill: SkippedFill,
    pub baseline: BaselineOptions,
    pub extent: ExtentOptions,
    pub fit: FitOptions,
    pub secondary: SecondaryOptions,
}
impl Default for RejectionOptions {
    fn default() -> Self {
        Self {
            blanking_period_s: 1e-3,
            saturation_voltage: None,
            saturation_scale: 1.0,
            saturation_margin: 0.95,
            min_clipped_samples: 2,
            random_seed: DEFAULT_RANDOM_SEED,
            correction_method: CorrectionMethod::Linear,
            correction_window_s: 2e-4,
            skipped_fill: SkippedFill::Raw,
            baseline: BaselineOptions::default(),
            extent: ExtentOptions::default(),
            fit: FitOptions::default(),
            secondary: SecondaryOptions::default(),
        }
    }
}
impl RejectionOptions {
    pub fn validate(&self) -> Result<(), LogssarError> {
        if !self.blanking_period_s.is_finite() || self.blanking_period_s < 0.0 {
            return Err(LogssarError::InvalidBlankingPeriod(self.blanking_period_s));
        }
        if let Some(saturation) = self.saturation_voltage {
            let (low, high) = saturation.band(1.0);
            if !(low.is_finite() && high.is_finite()) || low >= high {
                return Err(LogssarError::option(
                    "saturation_voltage",
                    format!("limits [{low}, {high}] must be finite with low < high"),
                ));
            }
        }
        positive("saturation_scale", self.saturation_scale)?;
        fraction("saturation_margin", self.saturation_margin)?;
        if self.min_clipped_samples == 0 {
            return Err(LogssarError::option("min_clipped_samples", "must be at least 1"));
        }
        non_negative("correction_window_s", self.correction_window_s)?;
        let [low, high] = self.baseline.percentiles;
        if !(0.0..=100.0).contains(&low) || !(0.0..=100.0).contains(&high) || low >= high {
            return Err(LogssarError::InvalidPercentiles { low, high });
        }
        positive("baseline.duration_s", self.baseline.duration_s)?;
        non_negative("baseline.offset_s", self.baseline.offset_s)?;
        positive("extent.search_window_s", self.extent.search_window_s)?;
        positive("extent.artifact_std_ratio", self.extent.artifact_std_ratio)?;
        fraction("fit.node_fraction", self.fit.node_fraction)?;
        if self.fit.min_half_width > self.fit.max_half_width {
            return Err(LogssarError::option(
                "fit.min_half_width",
                "must not exceed fit.max_half_width",
            ));
        }
        non_negative("fit.end_padding_s", self.fit.end_padding_s)?;
        let secondary = &self.secondary;
        positive("secondary.window_s", secondary.window_s)?;
        fraction("secondary.explained_variance", secondary.explained_variance)?;
        if secondary.min_components == 0 {
            return Err(LogssarError::option("secondary.min_components", "must be at least 1"));
        }
        if secondary.max_clusters < 2 {
            return Err(LogssarError::option("secondary.max_clusters", "must be at least 2"));
        }
        if secondary.runs_per_k == 0 {
            return Err(LogssarError::option("secondary.runs_per_k", "must be at least 1"));
        }
        positive("secondary.cophenetic_cutoff", secondary.cophenetic_cutoff)?;
        if secondary.gmm_max_iterations == 0 {
            return Err(LogssarError::option("secondary.gmm_max_iterations", "must be at least 1"));
        }
        positive("secondary.gmm_tolerance", secondary.gmm_tolerance)?;
        non_negative("secondary.gmm_regularization", secondary.gmm_regularization)?;
        Ok(())
    }
}
fn positive(name: &'static str, value: f64) -> Result<(), LogssarError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LogssarError::option(name, format!("must be finite and > 0 (got {value})")))
    }
}
fn non_negative(name: &'static str, value: f64) -> Result<(), LogssarError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(LogssarError::option(name, format!("must be finite and >= 0 (got {value})")))
    }
}
fn fraction(name: &'static str, value: f64) -> Result<(), LogssarError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(LogssarError::option(name, format!("must lie in (0, 1] (got {value})")))
    }
}
/// Converts a duration to a whole number of samples.
pub(crate) fn seconds_to_samples(seconds: f64, sample_rate_hz: f64) -> usize {
    (seconds * sample_rate_hz).round().max(0.0) as usize
}
