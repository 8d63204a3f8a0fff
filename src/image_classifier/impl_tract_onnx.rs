use crate::device_camera::interface::Frame;
use crate::image_classifier::interface::{ImageClassifier, ImageClassifierLoader, Prediction};
use crate::image_classifier::metadata::ModelMetadata;
use crate::image_classifier::tract::image::resize_image_to_tensor;
use crate::library::logger::interface::Logger;
use std::path::Path;
use std::sync::Arc;
use tract_onnx::prelude::*;

/// Runs a Teachable Machine image model exported to ONNX.
pub struct ImageClassifierTractOnnx {
    model: SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>,
    metadata: ModelMetadata,
}

impl ImageClassifierTractOnnx {
    pub fn new(
        model_path: &Path,
        metadata: ModelMetadata,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let size = metadata.image_size as usize;
        let model = tract_onnx::onnx()
            .model_for_path(model_path)?
            .with_input_fact(0, f32::fact([1, size, size, 3]).into())?
            .into_optimized()?
            .into_runnable()?;

        let classifier = Self { model, metadata };
        classifier.check_output_width()?;
        Ok(classifier)
    }

    fn check_output_width(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let outlet = self.model.model().output_outlets()?[0];
        let fact = self.model.model().outlet_fact(outlet)?;
        let width = fact.shape.as_concrete().and_then(|shape| shape.last().copied());

        match width {
            Some(width) if width != self.metadata.total_classes() => Err(format!(
                "model outputs {} classes but metadata lists {} labels",
                width,
                self.metadata.total_classes()
            )
            .into()),
            _ => Ok(()),
        }
    }
}

impl ImageClassifier for ImageClassifierTractOnnx {
    fn total_classes(&self) -> usize {
        self.metadata.total_classes()
    }

    fn classify(&self, frame: &Frame) -> Result<Vec<Prediction>, Box<dyn std::error::Error + Send + Sync>> {
        let input = resize_image_to_tensor(&frame.0, self.metadata.image_size)?;

        let outputs = self.model.run(tvec!(input.into_tvalue()))?;
        let output = outputs[0].to_array_view::<f32>()?;

        // Probabilities stay in label order.
        let predictions = self
            .metadata
            .labels
            .iter()
            .zip(output.iter())
            .map(|(label, &probability)| Prediction::new(label, probability))
            .collect();

        Ok(predictions)
    }
}

pub struct ImageClassifierTractOnnxLoader {
    logger: Arc<dyn Logger + Send + Sync>,
}

impl ImageClassifierTractOnnxLoader {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("image_classifier").with_namespace("tract_onnx"),
        }
    }
}

impl ImageClassifierLoader for ImageClassifierTractOnnxLoader {
    fn load(
        &self,
        model_path: &Path,
        metadata_path: &Path,
    ) -> Result<Arc<dyn ImageClassifier + Send + Sync>, Box<dyn std::error::Error + Send + Sync>> {
        self.logger
            .info(&format!("Reading metadata {}", metadata_path.display()))?;
        let metadata = ModelMetadata::from_path(metadata_path)?;

        self.logger.info(&format!(
            "Loading model {} from {} ({} labels, {}px input)",
            metadata.model_name.as_deref().unwrap_or("unnamed"),
            model_path.display(),
            metadata.total_classes(),
            metadata.image_size
        ))?;
        let classifier = ImageClassifierTractOnnx::new(model_path, metadata)?;

        Ok(Arc::new(classifier))
    }
}
