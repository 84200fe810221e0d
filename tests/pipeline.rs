use logssar::{
    reject_artifacts, ArtifactRejection, CorrectionMethod, FitMethod, RejectionOptions,
    SaturationVoltage, TrialState,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
const SAMPLE_RATE: f64 = 30_000.0;
const SIGMA: f64 = 5.0;
const AMPLITUDE: f64 = 2000.0;
/// 1 ms at 30 kHz.
const TAU: f64 = 30.0;
fn gaussian_noise(len: usize, sigma: f64, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|_| {
            let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
            let u2: f64 = rng.gen();
            sigma * (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
        })
        .collect()
}
fn onsets() -> Vec<usize> {
    (0..50).map(|k| 1000 + 2000 * k).collect()
}
/// 100 000 samples of noise with an exponential artifact after each of `onsets`.
fn noisy_artifacts(onsets: &[usize]) -> Vec<f64> {
    let mut signal = gaussian_noise(100_000, SIGMA, 2024);
    for (i, &onset) in onsets.iter().enumerate() {
        let end = onsets.get(i + 1).copied().unwrap_or(signal.len());
        for (k, v) in signal[onset..end].iter_mut().enumerate() {
            *v += AMPLITUDE * (-(k as f64) / TAU).exp();
        }
    }
    signal
}
fn exponential_scenario() -> (Vec<f64>, Vec<usize>) {
    let onsets = onsets();
    (noisy_artifacts(&onsets), onsets)
}
fn std_dev(data: &[f64]) -> f64 {
    let mean = data.iter().sum::<f64>() / data.len() as f64;
    let var = data.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (data.len() - 1) as f64;
    var.sqrt()
}
/// Mean per-trial standard deviation of the output from 3 ms after the onset
/// to the end of the fitted segment.
fn late_residual_std(result: &ArtifactRejection) -> f64 {
    let stds: Vec<f64> = result
        .trials
        .iter()
        .map(|trial| {
            let end = trial.extent.as_ref().unwrap().end;
            assert!(end > 120, "trial {} ends at {end}", trial.index);
            std_dev(&result.signal[trial.onset + 90..trial.onset + end])
        })
        .collect();
    stds.iter().sum::<f64>() / stds.len() as f64
}
#[test]
fn exponential_artifacts_are_removed() {
    let (signal, onsets) = exponential_scenario();
    let result = reject_artifacts(&signal, &onsets, SAMPLE_RATE, &RejectionOptions::default())
        .unwrap();
    assert_eq!(result.signal.len(), signal.len());
    assert_eq!(&result.signal[..onsets[0]], &signal[..onsets[0]]);
    assert!(result.skipped_trials.is_empty());
    assert_eq!(result.trials.len(), 50);
    for trial in &result.trials {
        assert_eq!(trial.state(), TrialState::Finalized);
        assert_eq!(trial.outcome(), Some(TrialState::ShapeFitted));
        let peak = trial.peak.as_ref().unwrap();
        assert!(peak.peak_idx < 30, "trial {} peak at {}", trial.index, peak.peak_idx);
        assert!(result.blanking_lengths[trial.index].is_some());
    }
    let late = late_residual_std(&result);
    assert!(
        (late - SIGMA).abs() < 0.2 * SIGMA,
        "late residual std {late:.2}"
    );
}
#[test]
fn seams_are_smaller_than_the_raw_steps() {
    let (signal, onsets) = exponential_scenario();
    let result = reject_artifacts(&signal, &onsets, SAMPLE_RATE, &RejectionOptions::default())
        .unwrap();
    let out = &result.signal;
    for trial in &result.trials {
        let onset = trial.onset;
        let end = onset + trial.extent.as_ref().unwrap().end;
        let left = (out[onset] - out[onset - 1]).abs();
        assert!(left < (signal[onset] - signal[onset - 1]).abs());
        assert!(left < 4.0 * SIGMA, "trial {} left seam {left}", trial.index);
        if end < out.len() {
            let right = (out[end] - out[end - 1]).abs();
            assert!(right < 1.0, "trial {} right seam {right}", trial.index);
        }
    }
}
#[test]
fn other_interpolants_stay_close_to_the_noise_floor() {
    let (signal, onsets) = exponential_scenario();
    let mut options = RejectionOptions {
        correction_method: CorrectionMethod::Cubic,
        ..RejectionOptions::default()
    };
    options.fit.method = FitMethod::Spline;
    options.fit.end_padding_s = 1e-3;
    let result = reject_artifacts(&signal, &onsets, SAMPLE_RATE, &options).unwrap();
    assert!(result.skipped_trials.is_empty());
    let late = late_residual_std(&result);
    assert!(late < 2.0 * SIGMA, "late residual std {late:.2}");
}
#[test]
fn same_seed_gives_identical_results() {
    let (signal, onsets) = exponential_scenario();
    let options = RejectionOptions::default();
    let a = reject_artifacts(&signal, &onsets, SAMPLE_RATE, &options).unwrap();
    let b = reject_artifacts(&signal, &onsets, SAMPLE_RATE, &options).unwrap();
    assert_eq!(a.signal, b.signal);
    assert_eq!(a.secondary, b.secondary);
    assert_eq!(a, b);
}
#[test]
fn fully_clipped_trial_is_skipped() {
    let (mut signal, onsets) = exponential_scenario();
    let clipped = 10;
    for v in &mut signal[onsets[clipped]..onsets[clipped] + 2000] {
        *v = 5000.0;
    }
    let options = RejectionOptions {
        saturation_voltage: Some(SaturationVoltage::Symmetric(5.0)),
        saturation_scale: 1000.0,
        ..RejectionOptions::default()
    };
    let result = reject_artifacts(&signal, &onsets, SAMPLE_RATE, &options).unwrap();
    let trial = &result.trials[clipped];
    let peak = trial.peak.as_ref().unwrap();
    assert!(peak.is_clipped);
    assert_eq!(peak.clipped_samples, Some(0..2000));
    assert_eq!(trial.outcome(), Some(TrialState::FullySkipped));
    assert_eq!(result.skipped_trials.iter().copied().collect::<Vec<_>>(), vec![clipped]);
    assert_eq!(result.blanking_lengths[clipped], None);
    let window = onsets[clipped]..onsets[clipped] + 2000;
    assert_eq!(&result.signal[window.clone()], &signal[window]);
}
#[test]
fn clean_noise_passes_through_unchanged() {
    let signal = gaussian_noise(30_000, SIGMA, 7);
    let onsets: Vec<usize> = (0..14).map(|k| 1000 + 2000 * k).collect();
    let result = reject_artifacts(&signal, &onsets, SAMPLE_RATE, &RejectionOptions::default())
        .unwrap();
    assert!(result.skipped_trials.is_empty());
    for trial in &result.trials {
        assert_eq!(trial.outcome(), Some(TrialState::PureBlanked));
    }
    for (out, raw) in result.signal.iter().zip(&signal) {
        assert!((out - raw).abs() < 1e-9);
    }
}
#[test]
fn small_clusters_are_never_corrected() {
    let (signal, onsets) = exponential_scenario();
    let result = reject_artifacts(&signal, &onsets, SAMPLE_RATE, &RejectionOptions::default())
        .unwrap();
    let secondary = &result.secondary;
    for trial in &secondary.corrected_trials {
        let label = secondary.labels[trial];
        assert!(secondary.cluster_sizes[label] >= 50);
    }
    let mut options = RejectionOptions::default();
    options.secondary.min_cluster_size = 51;
    let result = reject_artifacts(&signal, &onsets, SAMPLE_RATE, &options).unwrap();
    assert!(result.secondary.corrected_trials.is_empty());
    assert!(!result.secondary.applied);
    assert!(result.trials.iter().all(|t| !t.secondary_corrected));
}
#[test]
fn next_stimulus_never_leaks_into_the_seam() {
    // Trial 48 is cut short by a stimulus 204 samples later, about where its
    // artifact settles.
    let mut onsets: Vec<usize> = (0..49).map(|k| 1000 + 2000 * k).collect();
    onsets.push(onsets[48] + 204);
    let signal = noisy_artifacts(&onsets);
    for method in [CorrectionMethod::Linear, CorrectionMethod::Cubic, CorrectionMethod::Spline] {
        let options = RejectionOptions {
            correction_method: method,
            ..RejectionOptions::default()
        };
        let result = reject_artifacts(&signal, &onsets, SAMPLE_RATE, &options).unwrap();
        let next = onsets[49];
        let tail = &result.signal[next - 4..next];
        assert!(
            tail.iter().all(|v| v.abs() < 10.0 * SIGMA),
            "{method:?} tail before the next onset {tail:?}"
        );
        let seam = (result.signal[next] - result.signal[next - 1]).abs();
        assert!(seam < (signal[next] - signal[next - 1]).abs(), "{method:?} seam {seam}");
    }
}
