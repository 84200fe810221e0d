use serde::Serialize;
use super::baseline::BaselineBand;
use crate::stats;
/// How far a trial's artifact reaches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ExtentReport {
    /// End of the artifact, in samples from the onset (exclusive).
    pub end: usize,
    /// `false` when the signal never settled back into the baseline band
    /// before the trial window ran out.
    pub reached_baseline: bool,
    pub has_artifact: bool,
}
/// Median-in-band search for the end of a stimulus artifact.
#[derive(Clone, Debug)]
pub struct ExtentDetector {
    band: BaselineBand,
    search_len: usize,
    std_ratio: f64,
}
impl ExtentDetector {
    pub fn new(band: BaselineBand, search_len: usize, std_ratio: f64) -> Self {
        Self {
            band,
            search_len: search_len.max(1),
            std_ratio,
        }
    }
    /// `trial` runs from the onset to the next onset (or trace end); the
    /// search starts `start` samples after the onset. `pre_onset` is the
    /// trial's own baseline window used for the artifact presence check.
    /// A search starting past the window marks the whole window as artifact.
    pub fn detect(&self, trial: &[f64], start: usize, pre_onset: &[f64]) -> ExtentReport {
        if start >= trial.len() {
            return ExtentReport {
                end: trial.len(),
                reached_baseline: false,
                has_artifact: true,
            };
        }
        match self.first_in_band(trial, start) {
            Some(offset) => ExtentReport {
                end: offset + self.search_len,
                reached_baseline: true,
                has_artifact: offset > start || self.exceeds_baseline_spread(trial, start, pre_onset),
            },
            None => ExtentReport {
                end: trial.len(),
                reached_baseline: false,
                has_artifact: true,
            },
        }
    }
    /// First offset `>= start` whose search window has its median inside the band.
    pub fn first_in_band(&self, trial: &[f64], start: usize) -> Option<usize> {
        let last = trial.len().checked_sub(self.search_len)?;
        (start..=last).find(|&offset| {
            self.band
                .contains(stats::median(&trial[offset..offset + self.search_len]))
        })
    }
    fn exceeds_baseline_spread(&self, trial: &[f64], start: usize, pre_onset: &[f64]) -> bool {
        let reference = if pre_onset.len() >= 2 {
            stats::std_dev(pre_onset)
        } else {
            self.band.spread
        };
        let post_end = (start + self.search_len).min(trial.len());
        stats::std_dev(&trial[..post_end]) > self.std_ratio * reference
    }
}
