use crate::detector::session::CameraSession;
use crate::device_display::interface::DisplaySurface;
use crate::error::DetectorError;
use crate::library::logger::interface::Logger;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

/// Copies the session's newest frame onto the display surface every tick.
///
/// There is no cancel token: each iteration checks whether the session is
/// still live and exits when it is not. The liveness check is repeated under
/// the surface lock, so once the session is stopped and `join` returns no
/// further paint can land.
pub struct RenderLoop {
    handle: JoinHandle<()>,
}

impl RenderLoop {
    pub fn start(
        session: Arc<CameraSession>,
        surface: Arc<Mutex<dyn DisplaySurface + Send + Sync>>,
        logger: Arc<dyn Logger + Send + Sync>,
        interval: Duration,
    ) -> Self {
        let logger = logger.with_namespace("render_loop");
        let handle = std::thread::spawn(move || {
            let _ = logger.info("Render loop started");
            while session.is_live() {
                if let Err(e) = tick(&session, &surface) {
                    let _ = logger.error(&e.to_string());
                }
                std::thread::sleep(interval);
            }
            let _ = logger.info("Render loop finished");
        });

        Self { handle }
    }

    /// Blocks until the loop has noticed the session is no longer live.
    pub fn join(self) {
        let _ = self.handle.join();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

fn tick(
    session: &CameraSession,
    surface: &Mutex<dyn DisplaySurface + Send + Sync>,
) -> Result<(), DetectorError> {
    let frame = session.refresh()?;

    let mut surface = surface.lock().unwrap_or_else(PoisonError::into_inner);
    if !session.is_live() {
        return Ok(());
    }
    surface.paint(&frame).map_err(DetectorError::frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device_camera::impl_fake::DeviceCameraFake;
    use crate::device_camera::interface::{CameraRequest, Facing};
    use crate::device_display::impl_fake::{DisplaySurfaceFake, SurfaceOp};
    use crate::library::logger::impl_fake::LoggerFake;
    use std::time::Instant;

    fn request() -> CameraRequest {
        CameraRequest {
            facing: Facing::User,
            width: 300,
            height: 300,
            mirrored: false,
        }
    }

    fn wait_for(condition: impl Fn() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !condition() {
            assert!(Instant::now() < deadline, "timed out");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_paints_while_live_and_exits_when_stopped() {
        let logger = Arc::new(LoggerFake::new());
        let camera = Arc::new(DeviceCameraFake::new(logger.clone()));
        let session = Arc::new(CameraSession::acquire(camera, request(), logger.clone()).unwrap());
        let surface = Arc::new(Mutex::new(DisplaySurfaceFake::new()));

        let render_loop = RenderLoop::start(
            session.clone(),
            surface.clone(),
            logger.clone(),
            Duration::from_millis(1),
        );

        wait_for(|| surface.lock().unwrap().paint_count() >= 3);
        session.mark_stopped();
        render_loop.join();

        let painted = surface.lock().unwrap().paint_count();
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(surface.lock().unwrap().paint_count(), painted);
        assert!(session.current_frame().is_some());
    }

    #[test]
    fn test_frame_errors_do_not_end_the_loop() {
        let logger = Arc::new(LoggerFake::new());
        let camera = Arc::new(DeviceCameraFake::new(logger.clone()).with_fail_every(2));
        let session = Arc::new(CameraSession::acquire(camera, request(), logger.clone()).unwrap());
        let surface = Arc::new(Mutex::new(DisplaySurfaceFake::new().with_fail_every(3)));

        let render_loop = RenderLoop::start(
            session.clone(),
            surface.clone(),
            logger.clone(),
            Duration::from_millis(1),
        );

        wait_for(|| surface.lock().unwrap().paint_count() >= 5);
        assert!(!render_loop.is_finished());

        session.mark_stopped();
        render_loop.join();

        let errors = logger.errors();
        assert!(errors.iter().any(|line| line.contains("dropped frame")));
        assert!(errors.iter().any(|line| line.contains("paint")));
    }

    #[test]
    fn test_no_paint_after_stop_during_slow_tick() {
        let logger = Arc::new(LoggerFake::new());
        let camera = Arc::new(DeviceCameraFake::new(logger.clone()));
        let session = Arc::new(CameraSession::acquire(camera, request(), logger.clone()).unwrap());
        let surface = Arc::new(Mutex::new(
            DisplaySurfaceFake::new().with_paint_delay(Duration::from_millis(10)),
        ));

        let render_loop = RenderLoop::start(
            session.clone(),
            surface.clone(),
            logger.clone(),
            Duration::from_millis(0),
        );

        wait_for(|| surface.lock().unwrap().paint_count() >= 1);
        session.mark_stopped();
        render_loop.join();
        surface.lock().unwrap().clear().unwrap();

        std::thread::sleep(Duration::from_millis(30));
        let surface = surface.lock().unwrap();
        assert_eq!(surface.ops().last(), Some(&SurfaceOp::Clear));
        assert!(surface.is_blank());
    }
}
