use crate::device_camera::interface::{CameraRequest, DeviceCamera, Frame};
use crate::library::logger::interface::Logger;
use image::{DynamicImage, RgbImage};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Synthesises noise frames. Stands in for a webcam in tests and on machines
/// without one.
pub struct DeviceCameraFake {
    logger: Arc<dyn Logger + Send + Sync>,
    request: Mutex<Option<CameraRequest>>,
    start_error: Option<String>,
    fail_every: Option<u64>,
    captured: AtomicU64,
}

impl DeviceCameraFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("camera").with_namespace("fake"),
            request: Mutex::new(None),
            start_error: None,
            fail_every: None,
            captured: AtomicU64::new(0),
        }
    }

    /// Every call to `start` fails, as if permission was denied.
    pub fn with_start_error(mut self, message: &str) -> Self {
        self.start_error = Some(message.to_string());
        self
    }

    /// Every `n`th capture fails.
    pub fn with_fail_every(mut self, n: u64) -> Self {
        self.fail_every = Some(n.max(1));
        self
    }

    pub fn is_started(&self) -> bool {
        self.request
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl DeviceCamera for DeviceCameraFake {
    fn start(&self, request: &CameraRequest) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.logger
            .info(&format!("Starting camera {:?}...", request.facing))?;
        if let Some(message) = &self.start_error {
            return Err(message.clone().into());
        }
        *self.request.lock().unwrap_or_else(PoisonError::into_inner) = Some(*request);
        self.logger.info("Camera started")?;
        Ok(())
    }

    fn stop(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.logger.info("Stopping camera...")?;
        *self.request.lock().unwrap_or_else(PoisonError::into_inner) = None;
        self.logger.info("Camera stopped")?;
        Ok(())
    }

    fn capture_frame(&self) -> Result<Frame, Box<dyn std::error::Error + Send + Sync>> {
        let request = (*self.request.lock().unwrap_or_else(PoisonError::into_inner))
            .ok_or("camera not started")?;

        let count = self.captured.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(n) = self.fail_every {
            if count % n == 0 {
                return Err(format!("dropped frame {}", count).into());
            }
        }

        let mut image = RgbImage::new(request.width, request.height);
        for pixel in image.pixels_mut() {
            pixel.0 = rand::random::<[u8; 3]>();
        }

        Ok(Frame::fit(DynamicImage::ImageRgb8(image), &request))
    }
}
