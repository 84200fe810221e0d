use serde::{Deserialize, Serialize};
use crate::error::LogssarError;
/// Single-channel recording with the stimulus onsets that produced artifacts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Recording {
    pub sample_rate_hz: f64,
    pub samples: Vec<f64>,
    /// 0-based onset sample indices, strictly ascending and >= 1.
    pub stimulus_indices: Vec<usize>,
}
impl Recording {
    pub fn new(sample_rate_hz: f64, samples: Vec<f64>, stimulus_indices: Vec<usize>) -> Self {
        Self {
            sample_rate_hz,
            samples,
            stimulus_indices,
        }
    }
    pub fn validate(&self) -> Result<(), LogssarError> {
        validate_inputs(&self.samples, &self.stimulus_indices, self.sample_rate_hz)
    }
    pub fn len(&self) -> usize {
        self.samples.len()
    }
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
    pub fn duration_s(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate_hz
    }
    pub fn inter_stimulus_intervals(&self) -> Vec<usize> {
        inter_stimulus_intervals(&self.stimulus_indices, self.samples.len())
    }
}
/// Checks the preconditions shared by every entry point.
pub fn validate_inputs(
    signal: &[f64],
    stimulus_indices: &[usize],
    sample_rate_hz: f64,
) -> Result<(), LogssarError> {
    if !sample_rate_hz.is_finite() || sample_rate_hz <= 0.0 {
        return Err(LogssarError::InvalidSampleRate(sample_rate_hz));
    }
    if signal.is_empty() {
        return Err(LogssarError::EmptySignal);
    }
    if stimulus_indices.is_empty() {
        return Err(LogssarError::NoStimuli);
    }
    let mut previous: Option<usize> = None;
    for (position, &index) in stimulus_indices.iter().enumerate() {
        if index == 0 {
            return Err(LogssarError::StimulusNotPositive { position });
        }
        if index >= signal.len() {
            return Err(LogssarError::StimulusOutOfRange {
                position,
                index,
                len: signal.len(),
            });
        }
        if let Some(previous) = previous {
            if index <= previous {
                return Err(LogssarError::StimuliNotAscending {
                    position,
                    previous,
                    index,
                });
            }
        }
        previous = Some(index);
    }
    Ok(())
}
/// Distance from each onset to the next one, or to the trace end for the last onset.
pub fn inter_stimulus_intervals(stimulus_indices: &[usize], trace_len: usize) -> Vec<usize> {
    stimulus_indices
        .iter()
        .enumerate()
        .map(|(i, &onset)| {
            let next = stimulus_indices.get(i + 1).copied().unwrap_or(trace_len);
            next.saturating_sub(onset)
        })
        .collect()
}
