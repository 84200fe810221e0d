use crate::error::LogssarError;
use crate::options::{seconds_to_samples, BaselineOptions};
use crate::stats;
/// Pooled pre-stimulus statistics defining what "looks like baseline".
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BaselineBand {
    pub median: f64,
    pub low: f64,
    pub high: f64,
    /// Standard deviation of the pooled samples.
    pub spread: f64,
}
impl BaselineBand {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}
/// Pools the windows `[onset - offset - duration, onset - offset)` of every
/// onset and summarises them. Windows are clipped at the trace start.
pub fn estimate_baseline(
    signal: &[f64],
    stimulus_indices: &[usize],
    sample_rate_hz: f64,
    options: &BaselineOptions,
) -> Result<BaselineBand, LogssarError> {
    let [low_pct, high_pct] = options.percentiles;
    if !(0.0..=100.0).contains(&low_pct) || !(0.0..=100.0).contains(&high_pct) || low_pct >= high_pct
    {
        return Err(LogssarError::InvalidPercentiles {
            low: low_pct,
            high: high_pct,
        });
    }
    let duration = seconds_to_samples(options.duration_s, sample_rate_hz).max(1);
    let offset = seconds_to_samples(options.offset_s, sample_rate_hz);
    let mut pooled = Vec::with_capacity(duration * stimulus_indices.len());
    for &onset in stimulus_indices {
        pooled.extend_from_slice(pre_stimulus_window(signal, onset, duration, offset, 0));
    }
    if pooled.is_empty() {
        return Err(LogssarError::EmptyBaseline);
    }
    let spread = stats::std_dev(&pooled);
    pooled.sort_by(|a, b| a.total_cmp(b));
    Ok(BaselineBand {
        median: stats::percentile_sorted(&pooled, 50.0),
        low: stats::percentile_sorted(&pooled, low_pct),
        high: stats::percentile_sorted(&pooled, high_pct),
        spread,
    })
}
/// Samples `[onset - offset - duration, onset - offset)`, clipped to the signal
/// and to nothing before `floor`.
pub(crate) fn pre_stimulus_window(
    signal: &[f64],
    onset: usize,
    duration: usize,
    offset: usize,
    floor: usize,
) -> &[f64] {
    let end = onset.saturating_sub(offset).min(signal.len());
    let start = end.saturating_sub(duration).max(floor).min(end);
    &signal[start..end]
}
