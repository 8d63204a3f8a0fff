use crate::device_camera::interface::Frame;
use crate::image_classifier::interface::{ImageClassifier, ImageClassifierLoader, Prediction};
use crate::library::logger::interface::Logger;
use rand::distr::{Distribution, Uniform};
use std::path::Path;
use std::sync::Arc;

/// Returns canned predictions, or random ones over its labels when none are
/// fixed.
pub struct ImageClassifierFake {
    labels: Vec<String>,
    fixed: Option<Vec<Prediction>>,
    error: Option<String>,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl ImageClassifierFake {
    pub fn new(labels: Vec<String>, logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            labels,
            fixed: None,
            error: None,
            logger: logger.with_namespace("image_classifier").with_namespace("fake"),
        }
    }

    pub fn with_predictions(mut self, predictions: Vec<Prediction>) -> Self {
        self.fixed = Some(predictions);
        self
    }

    /// Every call to `classify` fails with `message`.
    pub fn with_error(mut self, message: &str) -> Self {
        self.error = Some(message.to_string());
        self
    }
}

impl ImageClassifier for ImageClassifierFake {
    fn total_classes(&self) -> usize {
        self.labels.len()
    }

    fn classify(&self, frame: &Frame) -> Result<Vec<Prediction>, Box<dyn std::error::Error + Send + Sync>> {
        self.logger.info(&format!(
            "Classifying {}x{} frame...",
            frame.width(),
            frame.height()
        ))?;

        if let Some(message) = &self.error {
            return Err(message.clone().into());
        }
        if let Some(fixed) = &self.fixed {
            return Ok(fixed.clone());
        }

        let mut rng = rand::rng();
        let weight_dist = Uniform::new(0.0f32, 1.0)?;
        let weights: Vec<f32> = self
            .labels
            .iter()
            .map(|_| weight_dist.sample(&mut rng))
            .collect();
        let total: f32 = weights.iter().sum::<f32>().max(f32::EPSILON);

        Ok(self
            .labels
            .iter()
            .zip(weights)
            .map(|(label, weight)| Prediction::new(label, weight / total))
            .collect())
    }
}

#[derive(Clone)]
pub struct ImageClassifierLoaderFake {
    labels: Vec<String>,
    fixed: Option<Vec<Prediction>>,
    error: Option<String>,
    classify_error: Option<String>,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl ImageClassifierLoaderFake {
    pub fn new(labels: &[&str], logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            labels: labels.iter().map(|label| label.to_string()).collect(),
            fixed: None,
            error: None,
            classify_error: None,
            logger,
        }
    }

    pub fn with_predictions(mut self, predictions: Vec<Prediction>) -> Self {
        self.fixed = Some(predictions);
        self
    }

    pub fn with_error(mut self, message: &str) -> Self {
        self.error = Some(message.to_string());
        self
    }

    /// Loads fine, but the classifier it hands out fails every call.
    pub fn with_classify_error(mut self, message: &str) -> Self {
        self.classify_error = Some(message.to_string());
        self
    }
}

impl ImageClassifierLoader for ImageClassifierLoaderFake {
    fn load(
        &self,
        model_path: &Path,
        metadata_path: &Path,
    ) -> Result<Arc<dyn ImageClassifier + Send + Sync>, Box<dyn std::error::Error + Send + Sync>> {
        self.logger.info(&format!(
            "Loading fake classifier from {} and {}",
            model_path.display(),
            metadata_path.display()
        ))?;

        if let Some(message) = &self.error {
            return Err(message.clone().into());
        }

        let mut classifier = ImageClassifierFake::new(self.labels.clone(), self.logger.clone());
        if let Some(fixed) = &self.fixed {
            classifier = classifier.with_predictions(fixed.clone());
        }
        if let Some(message) = &self.classify_error {
            classifier = classifier.with_error(message);
        }
        Ok(Arc::new(classifier))
    }
}
