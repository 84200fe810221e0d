use thiserror::Error;
#[derive(Debug, Error)]
pub enum LogssarError {
    #[error("sample rate must be greater than zero (got {0})")]
    InvalidSampleRate(f64),
    #[error("signal is empty")]
    EmptySignal,
    #[error("no stimulus indices were supplied")]
    NoStimuli,
    #[error("stimulus #{position} has index 0; onsets must be strictly positive")]
    StimulusNotPositive { position: usize },
    #[error("stimulus #{position} at sample {index} lies outside a signal of {len} samples")]
    StimulusOutOfRange {
        position: usize,
        index: usize,
        len: usize,
    },
    #[error("stimulus #{position} at sample {index} does not follow the previous onset {previous}")]
    StimuliNotAscending {
        position: usize,
        previous: usize,
        index: usize,
    },
    #[error("blanking period must be finite and non-negative (got {0})")]
    InvalidBlankingPeriod(f64),
    #[error("percentiles must satisfy 0 <= low < high <= 100 (got {low}, {high})")]
    InvalidPercentiles { low: f64, high: f64 },
    #[error("invalid option `{name}`: {reason}")]
    InvalidOption { name: &'static str, reason: String },
    #[error("no pre-stimulus samples available for the baseline estimate")]
    EmptyBaseline,
    #[error("failed to render plot: {0}")]
    Plot(String),
}
impl LogssarError {
    pub(crate) fn option(name: &'static str, reason: impl Into<String>) -> Self {
        LogssarError::InvalidOption {
            name,
            reason: reason.into(),
        }
    }
}
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for LogssarError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        LogssarError::Plot(format!("{value:?}"))
    }
}
impl From<image::ImageError> for LogssarError {
    fn from(value: image::ImageError) -> Self {
        LogssarError::Plot(value.to_string())
    }
}
