use image::{imageops, DynamicImage};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    #[default]
    User,
    Environment,
}

impl Facing {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "user" | "front" => Some(Facing::User),
            "environment" | "back" | "rear" => Some(Facing::Environment),
            _ => None,
        }
    }
}

/// What a session asks the device for. Decided once at session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraRequest {
    pub facing: Facing,
    pub width: u32,
    pub height: u32,
    pub mirrored: bool,
}

/// Snapshot of the newest camera image. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Frame(pub Arc<DynamicImage>);

impl Frame {
    pub fn new(image: DynamicImage) -> Self {
        Self(Arc::new(image))
    }

    /// Centre-crops and scales a raw device image to the requested surface size.
    pub fn fit(image: DynamicImage, request: &CameraRequest) -> Self {
        let fitted = if image.width() == request.width && image.height() == request.height {
            image
        } else {
            image.resize_to_fill(request.width, request.height, imageops::FilterType::Triangle)
        };

        if request.mirrored {
            Self::new(fitted.fliph())
        } else {
            Self::new(fitted)
        }
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }
}

pub trait DeviceCamera: Send + Sync {
    fn start(&self, request: &CameraRequest) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn stop(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn capture_frame(&self) -> Result<Frame, Box<dyn std::error::Error + Send + Sync>>;
}
