use std::collections::BTreeSet;
use serde::Serialize;
use crate::artifact::baseline::pre_stimulus_window;
use crate::artifact::peak::saturation_band;
use crate::artifact::{
    estimate_baseline, DiscontinuityCorrector, ExtentDetector, PeakLocator, ShapeFitter,
};
use crate::error::LogssarError;
use crate::options::{seconds_to_samples, RejectionOptions, SkippedFill};
use crate::progress::{Progress, Silent};
use crate::recording::{inter_stimulus_intervals, validate_inputs, Recording};
use crate::secondary::{SecondaryArtifactRemover, SecondaryReport};
use crate::trial::{TrialReport, TrialState};
/// Share of the progress range spent on the per-trial loop.
const TRIAL_PROGRESS_SHARE: f64 = 0.8;
/// Shortest trial window the peak checks can work on.
const MIN_TRIAL_SAMPLES: usize = 3;
/// Result of one rejection run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ArtifactRejection {
    /// Corrected trace, same length as the input.
    pub signal: Vec<f64>,
    /// Effective blanking length of each shape-fitted trial.
    pub blanking_lengths: Vec<Option<usize>>,
    /// Trials whose whole window had to be blanked.
    pub skipped_trials: BTreeSet<usize>,
    pub trials: Vec<TrialReport>,
    pub secondary: SecondaryReport,
}
/// Runs the per-trial stages in onset order, then the secondary pass.
pub struct ArtifactPipeline<P: Progress> {
    options: RejectionOptions,
    progress: P,
}
impl ArtifactPipeline<Silent> {
    pub fn with_options(options: RejectionOptions) -> Self {
        Self::new(options, Silent)
    }
}
impl<P: Progress> ArtifactPipeline<P> {
    pub fn new(options: RejectionOptions, progress: P) -> Self {
        Self { options, progress }
    }
    pub fn into_progress(self) -> P {
        self.progress
    }
    pub fn run_recording(&mut self, recording: &Recording) -> Result<ArtifactRejection, LogssarError> {
        self.run(
            &recording.samples,
            &recording.stimulus_indices,
            recording.sample_rate_hz,
        )
    }
    pub fn run(
        &mut self,
        signal: &[f64],
        stimulus_indices: &[usize],
        sample_rate_hz: f64,
    ) -> Result<ArtifactRejection, LogssarError> {
        self.options.validate()?;
        validate_inputs(signal, stimulus_indices, sample_rate_hz)?;
        let options = &self.options;
        let band = estimate_baseline(signal, stimulus_indices, sample_rate_hz, &options.baseline)?;
        log::debug!(
            "baseline median {:.3}, band [{:.3}, {:.3}]",
            band.median,
            band.low,
            band.high
        );
        let blanking = seconds_to_samples(options.blanking_period_s, sample_rate_hz);
        let pre_duration = seconds_to_samples(options.baseline.duration_s, sample_rate_hz).max(1);
        let pre_offset = seconds_to_samples(options.baseline.offset_s, sample_rate_hz);
        let saturation = match options.saturation_voltage {
            Some(limits) => limits.band(options.saturation_scale),
            None => saturation_band(signal, options.saturation_margin),
        };
        let detector = ExtentDetector::new(
            band,
            seconds_to_samples(options.extent.search_window_s, sample_rate_hz),
            options.extent.artifact_std_ratio,
        );
        let locator = PeakLocator::new(Some(saturation), options.min_clipped_samples);
        let fitter = ShapeFitter::from_options(&options.fit, sample_rate_hz);
        let corrector = DiscontinuityCorrector::from_options(
            options.correction_method,
            options.correction_window_s,
            sample_rate_hz,
        );
        let remover = SecondaryArtifactRemover::new(
            options.secondary.clone(),
            sample_rate_hz,
            options.random_seed,
        );
        let intervals = inter_stimulus_intervals(stimulus_indices, signal.len());
        let mut output = signal.to_vec();
        let mut blanking_lengths = vec![None; stimulus_indices.len()];
        let mut skipped_trials = BTreeSet::new();
        let mut trials = Vec::with_capacity(stimulus_indices.len());
        let mut table = remover.table();
        // Trace position up to which earlier trials left artifact behind.
        let mut settled = 0;
        for (index, (&onset, &interval)) in stimulus_indices.iter().zip(&intervals).enumerate() {
            let mut report = TrialReport::new(index, onset, interval);
            let window = &signal[onset..onset + interval];
            let pre_onset = pre_stimulus_window(signal, onset, pre_duration, pre_offset, settled);
            let mut extent = detector.detect(window, blanking, pre_onset);
            report.advance(TrialState::ExtentBounded);
            let peak = locator.locate(window, blanking);
            let effective = blanking.max(peak.as_ref().map_or(0, |p| p.blanked_len()));
            if effective > blanking && extent.reached_baseline {
                extent = detector.detect(window, effective, pre_onset);
            }
            report.advance(TrialState::PeakLocated);
            let degenerate = blanking >= interval || interval < MIN_TRIAL_SAMPLES;
            if !degenerate && (peak.is_none() || !extent.has_artifact) {
                report.advance(TrialState::PureBlanked);
                report.advance(TrialState::DiscontinuityCorrected);
                log::debug!("trial {index} at {onset}: no artifact, left as recorded");
            } else {
                let fit = if degenerate {
                    None
                } else {
                    let fit = fitter.fit(window, extent.end, blanking, peak.as_ref());
                    let blanked = fit.blanking_len;
                    blanked.map(|effective| (fit, effective))
                };
                match fit {
                    None => {
                        report.advance(TrialState::FullySkipped);
                        skipped_trials.insert(index);
                        settled = onset + interval;
                        if options.skipped_fill == SkippedFill::Zero {
                            output[onset..onset + interval].fill(0.0);
                        }
                        log::debug!("trial {index} at {onset}: blanking covers the whole window");
                    }
                    Some((fit, effective)) => {
                        let end = fit.reconstruction.len();
                        let segment = &mut output[onset..onset + end];
                        for ((out, raw), recon) in
                            segment.iter_mut().zip(window).zip(&fit.reconstruction)
                        {
                            *out = raw - recon;
                        }
                        table.push(
                            index,
                            onset + effective,
                            &output[onset + effective..onset + end],
                        );
                        report.advance(TrialState::ShapeFitted);
                        corrector.apply(
                            &mut output,
                            &signal[..onset + interval],
                            onset..onset + end,
                            !extent.reached_baseline,
                        );
                        report.advance(TrialState::DiscontinuityCorrected);
                        settled = onset + end;
                        blanking_lengths[index] = Some(effective);
                        report.blanking_len = Some(effective);
                        log::debug!(
                            "trial {index} at {onset}: blanked {effective}, fitted to {end}, {} nodes",
                            fit.nodes.len()
                        );
                    }
                }
            }
            report.extent = Some(extent);
            report.peak = peak;
            trials.push(report);
            let done = (index + 1) as f64 / stimulus_indices.len() as f64;
            self.progress.update(TRIAL_PROGRESS_SHARE * done, "trials");
        }
        if !skipped_trials.is_empty() {
            log::warn!(
                "{} of {} trial(s) fully blanked: artifact covers the whole window",
                skipped_trials.len(),
                stimulus_indices.len()
            );
        }
        let secondary = remover.remove(&mut output, &table, &mut self.progress, TRIAL_PROGRESS_SHARE);
        for trial in &mut trials {
            trial.cluster = secondary.labels.get(&trial.index).copied();
            trial.secondary_corrected = secondary.corrected_trials.contains(&trial.index);
            trial.advance(TrialState::Finalized);
        }
        log::info!(
            "{} trials: {} fitted, {} left as recorded, {} skipped",
            trials.len(),
            blanking_lengths.iter().flatten().count(),
            trials
                .iter()
                .filter(|t| t.outcome() == Some(TrialState::PureBlanked))
                .count(),
            skipped_trials.len()
        );
        Ok(ArtifactRejection {
            signal: output,
            blanking_lengths,
            skipped_trials,
            trials,
            secondary,
        })
    }
}
/// Removes stimulation artifacts from `signal`.
///
/// `stimulus_indices` are 0-based onsets, strictly ascending and at least 1.
/// The input is never modified; invalid arguments fail before any processing.
pub fn reject_artifacts(
    signal: &[f64],
    stimulus_indices: &[usize],
    sample_rate_hz: f64,
    options: &RejectionOptions,
) -> Result<ArtifactRejection, LogssarError> {
    ArtifactPipeline::with_options(options.clone()).run(signal, stimulus_indices, sample_rate_hz)
}
#[cfg(test)]
mod tests {
    use super::*;
    fn decaying_trace(len: usize, onsets: &[usize], amplitude: f64, tau: f64) -> Vec<f64> {
        let mut trace: Vec<f64> = (0..len)
            .map(|i| ((i * 7919) % 23) as f64 - 11.0)
            .collect();
        for &onset in onsets {
            for (k, v) in trace[onset..].iter_mut().enumerate() {
                *v += amplitude * (-(k as f64) / tau).exp();
            }
        }
        trace
    }
    #[test]
    fn rejects_bad_arguments_before_processing() {
        let signal = vec![0.0; 100];
        let options = RejectionOptions::default();
        assert!(matches!(
            reject_artifacts(&signal, &[50, 40], 1000.0, &options),
            Err(LogssarError::StimuliNotAscending { .. })
        ));
        assert!(matches!(
            reject_artifacts(&signal, &[0], 1000.0, &options),
            Err(LogssarError::StimulusNotPositive { .. })
        ));
        assert!(matches!(
            reject_artifacts(&signal, &[10], 0.0, &options),
            Err(LogssarError::InvalidSampleRate(_))
        ));
        let negative = RejectionOptions {
            blanking_period_s: -1.0,
            ..RejectionOptions::default()
        };
        assert!(matches!(
            reject_artifacts(&signal, &[10], 1000.0, &negative),
            Err(LogssarError::InvalidBlankingPeriod(_))
        ));
    }
    #[test]
    fn artifact_is_removed_and_trials_finalized() {
        let onsets = [3000, 6000, 9000];
        let signal = decaying_trace(12_000, &onsets, 1500.0, 30.0);
        let mut options = RejectionOptions::default();
        options.secondary.enabled = false;
        let result = reject_artifacts(&signal, &onsets, 30_000.0, &options).unwrap();
        assert_eq!(result.signal.len(), signal.len());
        assert_eq!(&result.signal[..2000], &signal[..2000]);
        assert!(result.skipped_trials.is_empty());
        for (trial, &onset) in result.trials.iter().zip(&onsets) {
            assert_eq!(trial.state(), TrialState::Finalized);
            assert_eq!(trial.outcome(), Some(TrialState::ShapeFitted));
            let blanked = trial.blanking_len.unwrap();
            assert!(blanked >= 30);
            // Well past the blanking region the artifact is gone.
            let tail = &result.signal[onset + 90..onset + 200];
            assert!(tail.iter().all(|v| v.abs() < 60.0), "trial at {onset}");
        }
    }
    #[derive(Default)]
    struct Recorder(Vec<(f64, String)>);
    impl Progress for Recorder {
        fn update(&mut self, fraction: f64, phase: &str) {
            self.0.push((fraction, phase.to_owned()));
        }
    }
    #[test]
    fn progress_reaches_completion() {
        let onsets = [3000, 6000];
        let signal = decaying_trace(9000, &onsets, 1500.0, 30.0);
        let mut pipeline = ArtifactPipeline::new(RejectionOptions::default(), Recorder::default());
        pipeline.run(&signal, &onsets, 30_000.0).unwrap();
        let seen = pipeline.into_progress().0;
        assert!(seen.iter().any(|(_, phase)| phase == "trials"));
        assert!(seen.windows(2).all(|w| w[0].0 <= w[1].0));
        assert!(seen.last().unwrap().0 <= 1.0);
    }
    #[test]
    fn trials_shorter_than_the_blanking_period_are_skipped() {
        let onsets = [1000, 1500, 1520, 1998];
        let signal = decaying_trace(2000, &[], 0.0, 30.0);
        let result = reject_artifacts(&signal, &onsets, 30_000.0, &RejectionOptions::default())
            .unwrap();
        assert_eq!(result.skipped_trials, BTreeSet::from([1, 3]));
        let outcomes: Vec<_> = result.trials.iter().map(|t| t.outcome()).collect();
        assert_eq!(
            outcomes,
            vec![
                Some(TrialState::PureBlanked),
                Some(TrialState::FullySkipped),
                Some(TrialState::PureBlanked),
                Some(TrialState::FullySkipped),
            ]
        );
        assert!(result.blanking_lengths.iter().all(Option::is_none));
        assert_eq!(result.signal, signal);
    }
    #[test]
    fn previous_artifact_tail_does_not_mask_the_next_trial() {
        // 200-sample intervals: each pre-onset window overlaps the previous decay.
        let onsets: Vec<usize> = (0..10).map(|k| 3000 + 200 * k).collect();
        let signal = decaying_trace(6000, &onsets, 800.0, 30.0);
        let mut options = RejectionOptions::default();
        options.extent.artifact_std_ratio = 4.0;
        options.secondary.enabled = false;
        let result = reject_artifacts(&signal, &onsets, 30_000.0, &options).unwrap();
        for trial in &result.trials {
            assert_eq!(
                trial.outcome(),
                Some(TrialState::ShapeFitted),
                "trial {}",
                trial.index
            );
        }
    }
}
