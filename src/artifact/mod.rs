// src/artifact/mod.rs
// Per-trial stages: baseline band, extent, peak, shape fit, seam correction.
pub mod baseline;
pub mod correction;
pub mod extent;
pub mod fitter;
pub mod peak;
pub use baseline::{estimate_baseline, BaselineBand};
pub use correction::DiscontinuityCorrector;
pub use extent::{ExtentDetector, ExtentReport};
pub use fitter::{ShapeFit, ShapeFitter};
pub use peak::{PeakLocator, PeakReport, Polarity};
