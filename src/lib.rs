// src/lib.rs
//! Stimulation artifact rejection for single-channel extracellular recordings.
//!
//! Each stimulus trial is bounded, its non-recoverable blanking region is
//! located, and the artifact decay beyond it is reconstructed from sparse
//! log-spaced nodes and subtracted. Seams are bridged into the untouched
//! signal, and a population-wide pass removes residual transients shared by
//! large clusters of trials.
pub mod artifact;
pub mod error;
pub mod interp;
pub mod options;
pub mod pipeline;
pub mod plot;
pub mod progress;
pub mod recording;
pub mod secondary;
pub mod stats;
pub mod trial;
pub use error::LogssarError;
pub use options::{
    BaselineOptions, CorrectionMethod, ExtentOptions, FitMethod, FitOptions, RejectionOptions,
    SaturationVoltage, SecondaryOptions, SkippedFill, DEFAULT_RANDOM_SEED,
};
pub use pipeline::{reject_artifacts, ArtifactPipeline, ArtifactRejection};
pub use plot::{render_trial_png, PlotStyle};
pub use progress::{LogProgress, Progress, Silent};
pub use recording::{inter_stimulus_intervals, Recording};
pub use secondary::SecondaryReport;
pub use trial::{TrialReport, TrialState};
