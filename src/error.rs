use std::fmt::Display;

/// Failures surfaced by the detector. Payloads are rendered messages so the
/// error can be cloned into state machine messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DetectorError {
    /// Model or metadata could not be fetched or parsed.
    #[error("failed to load classifier: {0}")]
    Load(String),
    /// Camera permission or hardware failure.
    #[error("camera unavailable: {0}")]
    Device(String),
    /// A single refresh or paint failed inside the render loop.
    #[error("frame failed: {0}")]
    Frame(String),
    /// The classifier itself failed on a frame.
    #[error("classification failed: {0}")]
    Classify(String),
    /// The prediction set is too short to interpret.
    #[error("prediction set has {0} entries, at least 2 are required")]
    Data(usize),
    #[error("a camera session is already active")]
    SessionBusy,
}

impl DetectorError {
    pub fn load(err: impl Display) -> Self {
        Self::Load(err.to_string())
    }

    pub fn device(err: impl Display) -> Self {
        Self::Device(err.to_string())
    }

    pub fn frame(err: impl Display) -> Self {
        Self::Frame(err.to_string())
    }

    pub fn classify(err: impl Display) -> Self {
        Self::Classify(err.to_string())
    }
}
