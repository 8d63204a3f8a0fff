use crate::device_camera::interface::{CameraRequest, DeviceCamera, Frame};
use crate::error::DetectorError;
use crate::library::logger::interface::Logger;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// One open capture stream. Live from a successful `acquire` until
/// `mark_stopped`.
pub struct CameraSession {
    camera: Arc<dyn DeviceCamera + Send + Sync>,
    live: AtomicBool,
    current: Mutex<Option<Frame>>,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl CameraSession {
    pub fn acquire(
        camera: Arc<dyn DeviceCamera + Send + Sync>,
        request: CameraRequest,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Result<Self, DetectorError> {
        let logger = logger.with_namespace("session");
        let _ = logger.info(&format!(
            "Acquiring {}x{} camera facing {:?}",
            request.width, request.height, request.facing
        ));

        camera.start(&request).map_err(DetectorError::device)?;

        let _ = logger.info("Session live");
        Ok(Self {
            camera,
            live: AtomicBool::new(true),
            current: Mutex::new(None),
            logger,
        })
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Pull the newest frame from the device and remember it.
    pub fn refresh(&self) -> Result<Frame, DetectorError> {
        if !self.is_live() {
            return Err(DetectorError::frame("session is not live"));
        }
        let frame = self.camera.capture_frame().map_err(DetectorError::frame)?;
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(frame.clone());
        Ok(frame)
    }

    pub fn current_frame(&self) -> Option<Frame> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Flip the liveness flag. The render loop exits at its next check.
    pub fn mark_stopped(&self) {
        self.live.store(false, Ordering::SeqCst);
    }

    pub fn release(&self) -> Result<(), DetectorError> {
        self.mark_stopped();
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = None;
        let released = self.camera.stop().map_err(DetectorError::device);
        let _ = self.logger.info("Session released");
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device_camera::impl_fake::DeviceCameraFake;
    use crate::device_camera::interface::Facing;
    use crate::library::logger::impl_fake::LoggerFake;

    fn request() -> CameraRequest {
        CameraRequest {
            facing: Facing::Environment,
            width: 300,
            height: 300,
            mirrored: false,
        }
    }

    #[test]
    fn test_acquire_failure_is_device_error() {
        let logger = Arc::new(LoggerFake::new());
        let camera = Arc::new(DeviceCameraFake::new(logger.clone()).with_start_error("no camera"));

        let result = CameraSession::acquire(camera, request(), logger);

        assert_eq!(result.err(), Some(DetectorError::Device("no camera".to_string())));
    }

    #[test]
    fn test_refresh_updates_current_frame() {
        let logger = Arc::new(LoggerFake::new());
        let camera = Arc::new(DeviceCameraFake::new(logger.clone()));
        let session = CameraSession::acquire(camera, request(), logger).unwrap();

        assert!(session.is_live());
        assert!(session.current_frame().is_none());

        let frame = session.refresh().unwrap();
        let current = session.current_frame().unwrap();
        assert!(Arc::ptr_eq(&frame.0, &current.0));
    }

    #[test]
    fn test_release_stops_device() {
        let logger = Arc::new(LoggerFake::new());
        let camera = Arc::new(DeviceCameraFake::new(logger.clone()));
        let session = CameraSession::acquire(camera.clone(), request(), logger).unwrap();
        session.refresh().unwrap();

        session.release().unwrap();

        assert!(!session.is_live());
        assert!(!camera.is_started());
        assert!(session.current_frame().is_none());
        assert!(matches!(session.refresh(), Err(DetectorError::Frame(_))));
    }
}
