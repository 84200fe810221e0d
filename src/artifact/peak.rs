//! Locates the last sample of a trial that cannot carry signal.
//!
//! The search only looks at the blanking window at the start of the trial,
//! but clipped runs that start there are followed for as long as the trial
//! window allows: a saturated amplifier can stay pinned far past the nominal
//! blanking period.
use std::ops::Range;
use serde::Serialize;
use crate::stats;
/// Fraction of the window extreme a sample must reach to be a peak candidate.
pub const PEAK_HEIGHT_FRACTION: f64 = 0.975;
/// Fraction of the absolute maximum used when no saturation limits are given.
pub const DEFAULT_SATURATION_MARGIN: f64 = 0.95;
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Polarity {
    Positive,
    Negative,
}
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PeakReport {
    /// Index, relative to the onset, of the last non-recoverable sample.
    pub peak_idx: usize,
    pub is_clipped: bool,
    /// The clipped run containing the peak, relative to the onset.
    pub clipped_samples: Option<Range<usize>>,
    pub polarity: Polarity,
}
impl PeakReport {
    /// Number of samples from the onset the peak forces into the blanking region.
    pub fn blanked_len(&self) -> usize {
        let clipped_end = self.clipped_samples.as_ref().map_or(0, |run| run.end);
        (self.peak_idx + 1).max(clipped_end)
    }
}
#[derive(Clone, Debug)]
pub struct PeakLocator {
    /// `(low, high)` saturation limits in trace units; `None` uses 95% of the
    /// trial's absolute maximum.
    pub saturation: Option<(f64, f64)>,
    pub min_clipped_samples: usize,
}
impl PeakLocator {
    pub fn new(saturation: Option<(f64, f64)>, min_clipped_samples: usize) -> Self {
        Self {
            saturation,
            min_clipped_samples: min_clipped_samples.max(1),
        }
    }
    /// `window` starts at the stimulus onset; `blanking_len` is the configured
    /// blanking period in samples. `None` means no discernible artifact.
    pub fn locate(&self, window: &[f64], blanking_len: usize) -> Option<PeakReport> {
        if window.len() < 3 {
            return None;
        }
        let search_len = blanking_len.max(2).min(window.len());
        let (low, high) = self
            .saturation
            .unwrap_or_else(|| saturation_band(window, DEFAULT_SATURATION_MARGIN));
        let mut runs = clipped_runs(window, search_len, |v| v >= high, self.min_clipped_samples);
        runs.extend(clipped_runs(window, search_len, |v| v <= low, self.min_clipped_samples));
        let search = &window[..search_len];
        let max = search.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = search.iter().copied().fold(f64::INFINITY, f64::min);
        let in_run = |i: usize| runs.iter().any(|run| run.contains(&i));
        let positive = (0..search_len).rev().find(|&i| {
            window[i] >= PEAK_HEIGHT_FRACTION * max && (is_local_max(window, i) || in_run(i))
        });
        let negative = (0..search_len).rev().find(|&i| {
            window[i] <= PEAK_HEIGHT_FRACTION * min && (is_local_min(window, i) || in_run(i))
        });
        let (peak, polarity) = match (positive, negative) {
            (Some(p), Some(n)) if p > n => (p, Polarity::Positive),
            (_, Some(n)) => (n, Polarity::Negative),
            (Some(p), None) => (p, Polarity::Positive),
            (None, None) => return None,
        };
        let run = runs.into_iter().find(|run| run.contains(&peak));
        Some(match run {
            Some(run) => PeakReport {
                peak_idx: run.end - 1,
                is_clipped: true,
                clipped_samples: Some(run),
                polarity,
            },
            None => PeakReport {
                peak_idx: peak,
                is_clipped: false,
                clipped_samples: None,
                polarity,
            },
        })
    }
}
/// `±margin` of the absolute maximum of `data`. A flat zero input has no
/// saturation limit at all.
pub fn saturation_band(data: &[f64], margin: f64) -> (f64, f64) {
    let limit = margin * stats::abs_max(data);
    if limit > 0.0 {
        (-limit, limit)
    } else {
        (f64::NEG_INFINITY, f64::INFINITY)
    }
}
/// Maximal runs satisfying `beyond` that start inside `[0, search_len)` and
/// are at least `min_len` long.
fn clipped_runs(
    window: &[f64],
    search_len: usize,
    beyond: impl Fn(f64) -> bool,
    min_len: usize,
) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut i = 0;
    while i < search_len {
        if !beyond(window[i]) {
            i += 1;
            continue;
        }
        let start = i;
        while i < window.len() && beyond(window[i]) {
            i += 1;
        }
        if i - start >= min_len {
            runs.push(start..i);
        }
    }
    runs
}
fn is_local_max(window: &[f64], i: usize) -> bool {
    let left = i == 0 || window[i] >= window[i - 1];
    let right = i + 1 >= window.len() || window[i] >= window[i + 1];
    left && right
}
fn is_local_min(window: &[f64], i: usize) -> bool {
    let left = i == 0 || window[i] <= window[i - 1];
    let right = i + 1 >= window.len() || window[i] <= window[i + 1];
    left && right
}
