use std::ops::Range;
use crate::interp::{NaturalSpline, Pchip};
use crate::options::{seconds_to_samples, CorrectionMethod};
/// Blends an artifact-subtracted segment into its untouched neighbours.
///
/// The segment of `output` is expected to hold `raw - reconstruction`, which is
/// zero inside the blanking region and at the far anchor. Adding a bridge that
/// runs from the last finalized sample before the segment to the first raw
/// sample after it removes the voltage step at both seams.
#[derive(Clone, Debug)]
pub struct DiscontinuityCorrector {
    method: CorrectionMethod,
    window: usize,
}
impl DiscontinuityCorrector {
    pub fn new(method: CorrectionMethod, window: usize) -> Self {
        Self {
            method,
            window: window.max(1),
        }
    }
    pub fn from_options(method: CorrectionMethod, window_s: f64, sample_rate_hz: f64) -> Self {
        Self::new(method, seconds_to_samples(window_s, sample_rate_hz))
    }
    /// Adds the bridge over `segment` in place. `flat` forces a constant bridge
    /// at the left anchor, used when the right neighbour is still contaminated.
    ///
    /// `raw` must end where trustworthy samples end, normally at the next
    /// stimulus onset: right anchors are never taken from beyond it, and a
    /// segment reaching its end gets a flat bridge.
    pub fn apply(&self, output: &mut [f64], raw: &[f64], segment: Range<usize>, flat: bool) {
        let bridge = self.bridge(output, raw, segment.clone(), flat);
        for (value, offset) in output[segment].iter_mut().zip(bridge) {
            *value += offset;
        }
    }
    /// Bridge values for every sample of `segment`; empty when the segment
    /// has no left neighbour.
    pub fn bridge(&self, output: &[f64], raw: &[f64], segment: Range<usize>, flat: bool) -> Vec<f64> {
        let Range { start, end } = segment;
        if start == 0 || start >= end || end > output.len() {
            return Vec::new();
        }
        let left = output[start - 1];
        let n = end - start;
        if flat || end >= raw.len() {
            return vec![left; n];
        }
        let right = raw[end];
        match self.method {
            CorrectionMethod::Linear => (0..n)
                .map(|k| left + (right - left) * (k + 1) as f64 / (n + 1) as f64)
                .collect(),
            CorrectionMethod::Cubic | CorrectionMethod::Spline => {
                let (xs, ys) = self.anchors(output, raw, start, end);
                let queries: Vec<f64> = (start..end).map(|i| i as f64).collect();
                match self.method {
                    CorrectionMethod::Cubic => Pchip::fit(&xs, &ys).eval_many(&queries),
                    _ => NaturalSpline::fit(&xs, &ys).eval_many(&queries),
                }
            }
        }
    }
    /// Finalized samples before the segment and raw samples after it.
    fn anchors(&self, output: &[f64], raw: &[f64], start: usize, end: usize) -> (Vec<f64>, Vec<f64>) {
        let before = start.saturating_sub(self.window)..start;
        let after = end..(end + self.window).min(raw.len());
        let xs = before.clone().chain(after.clone()).map(|i| i as f64).collect();
        let ys = output[before].iter().chain(&raw[after]).copied().collect();
        (xs, ys)
    }
}
