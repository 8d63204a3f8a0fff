use crate::device_camera::interface::Frame;
use std::path::Path;
use std::sync::Arc;

/// One entry of a prediction set. Sets come back in the classifier's own
/// class order, not sorted by probability.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub probability: f32,
}

impl Prediction {
    pub fn new(label: &str, probability: f32) -> Self {
        Self {
            label: label.to_string(),
            probability,
        }
    }
}

pub trait ImageClassifier: Send + Sync {
    fn total_classes(&self) -> usize;
    fn classify(&self, frame: &Frame) -> Result<Vec<Prediction>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Builds a classifier from a model definition and its label metadata.
pub trait ImageClassifierLoader: Send + Sync {
    fn load(
        &self,
        model_path: &Path,
        metadata_path: &Path,
    ) -> Result<Arc<dyn ImageClassifier + Send + Sync>, Box<dyn std::error::Error + Send + Sync>>;
}
