use serde::Serialize;
use crate::artifact::{ExtentReport, PeakReport};
/// Processing stage of one stimulus trial.
///
/// ```text
/// Unprocessed -> ExtentBounded -> PeakLocated -> ShapeFitted  -> DiscontinuityCorrected -> Finalized
///                                             -> PureBlanked  -> DiscontinuityCorrected
///                                             -> FullySkipped -> Finalized
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TrialState {
    Unprocessed,
    ExtentBounded,
    PeakLocated,
    ShapeFitted,
    PureBlanked,
    FullySkipped,
    DiscontinuityCorrected,
    Finalized,
}
impl TrialState {
    pub fn can_advance_to(self, next: TrialState) -> bool {
        use TrialState::*;
        matches!(
            (self, next),
            (Unprocessed, ExtentBounded)
                | (ExtentBounded, PeakLocated)
                | (PeakLocated, ShapeFitted | PureBlanked | FullySkipped)
                | (ShapeFitted | PureBlanked, DiscontinuityCorrected)
                | (DiscontinuityCorrected | FullySkipped, Finalized)
        )
    }
    /// The branch taken after the peak was located.
    pub fn is_outcome(self) -> bool {
        matches!(
            self,
            TrialState::ShapeFitted | TrialState::PureBlanked | TrialState::FullySkipped
        )
    }
}
/// Per-trial diagnostics returned alongside the corrected trace.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrialReport {
    pub index: usize,
    pub onset: usize,
    /// Samples up to the next onset (or the trace end).
    pub interval: usize,
    /// Every state the trial passed through, in order.
    pub states: Vec<TrialState>,
    pub extent: Option<ExtentReport>,
    pub peak: Option<PeakReport>,
    pub blanking_len: Option<usize>,
    /// Mixture component assigned by the secondary pass.
    pub cluster: Option<usize>,
    pub secondary_corrected: bool,
}
impl TrialReport {
    pub fn new(index: usize, onset: usize, interval: usize) -> Self {
        Self {
            index,
            onset,
            interval,
            states: vec![TrialState::Unprocessed],
            extent: None,
            peak: None,
            blanking_len: None,
            cluster: None,
            secondary_corrected: false,
        }
    }
    pub fn state(&self) -> TrialState {
        self.states
            .last()
            .copied()
            .unwrap_or(TrialState::Unprocessed)
    }
    pub fn outcome(&self) -> Option<TrialState> {
        self.states.iter().copied().find(|s| s.is_outcome())
    }
    pub fn advance(&mut self, next: TrialState) {
        debug_assert!(
            self.state().can_advance_to(next),
            "trial {}: {:?} -> {:?}",
            self.index,
            self.state(),
            next
        );
        self.states.push(next);
    }
}
