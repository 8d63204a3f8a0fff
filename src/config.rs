use crate::device_camera::interface::Facing;
use chrono::Offset;
use std::path::PathBuf;
use std::time::Duration;

/// Which prediction entry the displayed confidence is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfidenceSource {
    /// Entry 0 when the winner is the cat label, otherwise entry 1, whichever
    /// entry actually won.
    #[default]
    Observed,
    /// The winning entry's own probability.
    Winner,
}

impl ConfidenceSource {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "observed" => Some(ConfidenceSource::Observed),
            "winner" => Some(ConfidenceSource::Winner),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevices {
    pub user: String,
    pub environment: String,
}

impl CameraDevices {
    pub fn path_for(&self, facing: Facing) -> &str {
        match facing {
            Facing::User => &self.user,
            Facing::Environment => &self.environment,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub model_path: PathBuf,
    pub metadata_path: PathBuf,
    pub preferred_facing: Facing,
    pub frame_width: u32,
    pub frame_height: u32,
    pub mirrored: bool,
    pub render_interval: Duration,
    pub camera_devices: CameraDevices,
    pub use_fake_camera: bool,
    pub dog_label: String,
    pub cat_label: String,
    pub confidence_source: ConfidenceSource,
    pub logger_timezone: chrono::FixedOffset,
}

impl Default for Config {
    fn default() -> Self {
        let model_dir = PathBuf::from("model");
        Self {
            model_path: model_dir.join("model.onnx"),
            metadata_path: model_dir.join("metadata.json"),
            preferred_facing: Facing::User,
            frame_width: 300,
            frame_height: 300,
            mirrored: false,
            render_interval: Duration::from_millis(16),
            camera_devices: CameraDevices {
                user: "/dev/video0".to_string(),
                environment: "/dev/video2".to_string(),
            },
            use_fake_camera: false,
            dog_label: "perro".to_string(),
            cat_label: "gato".to_string(),
            confidence_source: ConfidenceSource::Observed,
            logger_timezone: utc(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default().with_vars(|key| std::env::var(key).ok())
    }

    fn with_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = var("DETECTRON_MODEL_DIR") {
            let dir = PathBuf::from(dir);
            self.model_path = dir.join("model.onnx");
            self.metadata_path = dir.join("metadata.json");
        }
        if let Some(facing) = var("DETECTRON_FACING").and_then(|value| Facing::parse(&value)) {
            self.preferred_facing = facing;
        }
        if let Some(path) = var("DETECTRON_CAMERA_USER") {
            self.camera_devices.user = path;
        }
        if let Some(path) = var("DETECTRON_CAMERA_ENVIRONMENT") {
            self.camera_devices.environment = path;
        }
        if let Some(source) =
            var("DETECTRON_CONFIDENCE").and_then(|value| ConfidenceSource::parse(&value))
        {
            self.confidence_source = source;
        }
        if let Some(flag) = var("DETECTRON_FAKE_CAMERA") {
            self.use_fake_camera = matches!(flag.as_str(), "1" | "true" | "yes");
        }
        self
    }
}

fn utc() -> chrono::FixedOffset {
    chrono::Utc.fix()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_session_shape() {
        let config = Config::default();
        assert_eq!((config.frame_width, config.frame_height), (300, 300));
        assert!(!config.mirrored);
        assert_eq!(config.model_path, PathBuf::from("model/model.onnx"));
        assert_eq!(config.metadata_path, PathBuf::from("model/metadata.json"));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("DETECTRON_MODEL_DIR", "/opt/pets"),
            ("DETECTRON_FACING", "environment"),
            ("DETECTRON_FAKE_CAMERA", "1"),
        ]);

        let config = Config::default().with_vars(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.model_path, PathBuf::from("/opt/pets/model.onnx"));
        assert_eq!(config.preferred_facing, Facing::Environment);
        assert!(config.use_fake_camera);
        assert_eq!(config.camera_devices.path_for(Facing::User), "/dev/video0");
    }

    #[test]
    fn test_unknown_facing_is_ignored() {
        let config = Config::default().with_vars(|key| {
            (key == "DETECTRON_FACING").then(|| "sideways".to_string())
        });
        assert_eq!(config.preferred_facing, Facing::User);
    }

    #[test]
    fn test_confidence_source_from_env() {
        assert_eq!(Config::default().confidence_source, ConfidenceSource::Observed);

        let config = Config::default().with_vars(|key| {
            (key == "DETECTRON_CONFIDENCE").then(|| "Winner".to_string())
        });
        assert_eq!(config.confidence_source, ConfidenceSource::Winner);

        let config = Config::default().with_vars(|key| {
            (key == "DETECTRON_CONFIDENCE").then(|| "loudest".to_string())
        });
        assert_eq!(config.confidence_source, ConfidenceSource::Observed);
    }
}
