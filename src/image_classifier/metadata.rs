use serde::Deserialize;
use std::path::Path;

/// The subset of a Teachable Machine `metadata.json` the classifier needs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetadata {
    pub labels: Vec<String>,
    #[serde(default = "default_image_size")]
    pub image_size: u32,
    #[serde(default)]
    pub model_name: Option<String>,
}

fn default_image_size() -> u32 {
    224
}

impl ModelMetadata {
    pub fn from_path(path: &Path) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let metadata: ModelMetadata = serde_json::from_str(raw)?;
        if metadata.labels.is_empty() {
            return Err("metadata lists no labels".into());
        }
        if metadata.image_size == 0 {
            return Err("metadata image size must be positive".into());
        }
        Ok(metadata)
    }

    pub fn total_classes(&self) -> usize {
        self.labels.len()
    }
}
