use crate::error::DetectorError;
use crate::image_classifier::interface::{ImageClassifier, ImageClassifierLoader};
use crate::library::logger::interface::Logger;
use std::path::Path;
use std::sync::Arc;

/// The loaded classifier. Immutable once built and kept for the life of the
/// process.
#[derive(Clone)]
pub struct Capability {
    classifier: Arc<dyn ImageClassifier + Send + Sync>,
    total_classes: usize,
}

impl Capability {
    pub fn classifier(&self) -> &(dyn ImageClassifier + Send + Sync) {
        self.classifier.as_ref()
    }

    pub fn total_classes(&self) -> usize {
        self.total_classes
    }
}

impl std::fmt::Debug for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capability")
            .field("total_classes", &self.total_classes)
            .finish()
    }
}

pub fn load(
    loader: &dyn ImageClassifierLoader,
    model_path: &Path,
    metadata_path: &Path,
    logger: &Arc<dyn Logger + Send + Sync>,
) -> Result<Capability, DetectorError> {
    let logger = logger.with_namespace("capability");

    let classifier = loader
        .load(model_path, metadata_path)
        .map_err(DetectorError::load)?;

    let total_classes = classifier.total_classes();
    if total_classes == 0 {
        return Err(DetectorError::load("classifier reports no classes"));
    }

    let _ = logger.info(&format!("Classifier ready with {} classes", total_classes));
    Ok(Capability {
        classifier,
        total_classes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_classifier::impl_fake::ImageClassifierLoaderFake;
    use crate::library::logger::impl_fake::LoggerFake;

    #[test]
    fn test_load_publishes_total_classes() {
        let logger: Arc<dyn Logger + Send + Sync> = Arc::new(LoggerFake::new());
        let loader = ImageClassifierLoaderFake::new(&["perro", "gato"], logger.clone());

        let capability = load(
            &loader,
            Path::new("model/model.onnx"),
            Path::new("model/metadata.json"),
            &logger,
        )
        .unwrap();

        assert_eq!(capability.total_classes(), 2);
    }

    #[test]
    fn test_loader_failure_is_load_error() {
        let logger: Arc<dyn Logger + Send + Sync> = Arc::new(LoggerFake::new());
        let loader = ImageClassifierLoaderFake::new(&["perro", "gato"], logger.clone())
            .with_error("metadata.json: 404");

        let result = load(
            &loader,
            Path::new("model/model.onnx"),
            Path::new("model/metadata.json"),
            &logger,
        );

        assert_eq!(
            result.err(),
            Some(DetectorError::Load("metadata.json: 404".to_string()))
        );
    }

    #[test]
    fn test_zero_classes_is_load_error() {
        let logger: Arc<dyn Logger + Send + Sync> = Arc::new(LoggerFake::new());
        let loader = ImageClassifierLoaderFake::new(&[], logger.clone());

        let result = load(
            &loader,
            Path::new("model/model.onnx"),
            Path::new("model/metadata.json"),
            &logger,
        );

        assert!(matches!(result, Err(DetectorError::Load(_))));
    }
}
