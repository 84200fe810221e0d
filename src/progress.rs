/// Receives advisory progress while a rejection run is in flight.
pub trait Progress {
    /// `fraction` lies in `[0, 1]`; `phase` names the running stage.
    fn update(&mut self, fraction: f64, phase: &str);
}
impl<F: FnMut(f64, &str)> Progress for F {
    fn update(&mut self, fraction: f64, phase: &str) {
        self(fraction, phase)
    }
}
/// Discards every update.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;
impl Progress for Silent {
    fn update(&mut self, _fraction: f64, _phase: &str) {}
}
/// Forwards updates to the `log` facade at trace level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogProgress;
impl Progress for LogProgress {
    fn update(&mut self, fraction: f64, phase: &str) {
        log::trace!("{phase}: {:.1}%", fraction * 100.0);
    }
}
