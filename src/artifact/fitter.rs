//! Reconstruction of the artifact decay from sparse, log-spaced nodes.
//!
//! Stimulation artifacts recover fastest right after the blanking boundary
//! and flatten out later, so nodes are packed densely near the boundary and
//! thinned out towards the tail. Each interior node takes the mean of a small
//! neighbourhood, which keeps spikes out of the reconstruction while the slow
//! decay passes through.
use super::peak::PeakReport;
use crate::interp::{interp_linear, NaturalSpline};
use crate::options::{FitMethod, FitOptions};
/// Outcome of fitting one trial.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeFit {
    /// Reconstructed artifact over `[onset, onset + end)`; equal to the raw
    /// samples inside the blanking region.
    pub reconstruction: Vec<f64>,
    /// Effective blanking length, or `None` when the blanking region swallowed
    /// the whole window and nothing could be fitted.
    pub blanking_len: Option<usize>,
    pub peak_idx: Option<usize>,
    /// Node positions relative to the onset.
    pub nodes: Vec<usize>,
}
impl ShapeFit {
    pub fn is_skipped(&self) -> bool {
        self.blanking_len.is_none()
    }
}
#[derive(Clone, Debug)]
pub struct ShapeFitter {
    pub method: FitMethod,
    pub node_fraction: f64,
    pub min_half_width: usize,
    pub max_half_width: usize,
    /// Raw samples appended past the window end before a spline fit.
    pub end_padding: usize,
}
impl ShapeFitter {
    pub fn from_options(options: &FitOptions, sample_rate_hz: f64) -> Self {
        Self {
            method: options.method,
            node_fraction: options.node_fraction,
            min_half_width: options.min_half_width,
            max_half_width: options.max_half_width,
            end_padding: crate::options::seconds_to_samples(options.end_padding_s, sample_rate_hz),
        }
    }
    /// Fits `trial[..end]`. `trial` may extend past `end` (up to the next
    /// onset); those samples are only read as end padding by the spline variant.
    pub fn fit(
        &self,
        trial: &[f64],
        end: usize,
        blanking_len: usize,
        peak: Option<&PeakReport>,
    ) -> ShapeFit {
        let end = end.min(trial.len());
        let peak_idx = peak.map(|p| p.peak_idx);
        let effective = blanking_len.max(peak.map_or(0, PeakReport::blanked_len));
        if effective >= end {
            return ShapeFit {
                reconstruction: trial[..end].to_vec(),
                blanking_len: None,
                peak_idx,
                nodes: Vec::new(),
            };
        }
        let fit_end = match self.method {
            FitMethod::Linear => end,
            FitMethod::Spline => (end + self.end_padding).min(trial.len()),
        };
        let window = &trial[..fit_end];
        let snap = match self.method {
            FitMethod::Linear => Snap::Nearest,
            FitMethod::Spline => Snap::Previous,
        };
        let nodes = log_nodes(effective, fit_end, self.node_count(fit_end), snap);
        let values = self.node_values(window, effective, &nodes);
        let xs: Vec<f64> = nodes.iter().map(|&n| n as f64).collect();
        let queries: Vec<f64> = (effective..end).map(|i| i as f64).collect();
        let fitted = match self.method {
            FitMethod::Linear => interp_linear(&xs, &values, &queries),
            FitMethod::Spline => NaturalSpline::fit(&xs, &values).eval_many(&queries),
        };
        let mut reconstruction = Vec::with_capacity(end);
        reconstruction.extend_from_slice(&trial[..effective]);
        reconstruction.extend(fitted);
        ShapeFit {
            reconstruction,
            blanking_len: Some(effective),
            peak_idx,
            nodes,
        }
    }
    fn node_count(&self, window_len: usize) -> usize {
        ((self.node_fraction * window_len as f64).round() as usize).max(3)
    }
    /// Neighbourhood means at interior nodes, raw samples at the two anchors.
    fn node_values(&self, window: &[f64], first: usize, nodes: &[usize]) -> Vec<f64> {
        let last = window.len() - 1;
        nodes
            .iter()
            .enumerate()
            .map(|(j, &node)| {
                if j == 0 || j + 1 == nodes.len() {
                    return window[node];
                }
                let gap = (node - nodes[j - 1]).min(nodes[j + 1] - node);
                let half = (gap / 2)
                    .max(self.min_half_width)
                    .min(self.max_half_width)
                    .min((gap - 1) / 2);
                let lo = node.saturating_sub(half).max(first);
                let hi = (node + half).min(last);
                let neighbourhood = &window[lo..=hi];
                neighbourhood.iter().sum::<f64>() / neighbourhood.len() as f64
            })
            .collect()
    }
}
#[derive(Clone, Copy, Debug)]
enum Snap {
    Nearest,
    Previous,
}
/// Node positions from `first` to `len - 1`, log-spaced in distance from the
/// blanking boundary. The sparse log tail is re-filled at the largest interior
/// log spacing so the end of the window is never under-sampled.
fn log_nodes(first: usize, len: usize, count: usize, snap: Snap) -> Vec<usize> {
    let last = len - 1;
    let span = (len - first) as f64;
    let mut nodes: Vec<usize> = Vec::with_capacity(count + 4);
    for j in 0..count {
        let offset = span.powf(j as f64 / (count - 1) as f64);
        let offset = match snap {
            Snap::Nearest => offset.round(),
            Snap::Previous => offset.floor(),
        } as usize;
        let node = first + offset.max(1) - 1;
        if node <= last && nodes.last() != Some(&node) {
            nodes.push(node);
        }
    }
    if nodes.last() == Some(&last) {
        nodes.pop();
    }
    if nodes.len() >= 2 {
        let spacing = nodes.windows(2).map(|w| w[1] - w[0]).max().unwrap_or(1);
        let mut tail = nodes[nodes.len() - 1];
        while last - tail > spacing {
            tail += spacing;
            nodes.push(tail);
        }
    }
    if nodes.last() != Some(&last) {
        nodes.push(last);
    }
    nodes
}
