use super::main::Detector;
use crate::detector::capability;
use crate::detector::classify::classify;
use crate::detector::core::{Effect, Msg};
use crate::detector::render_loop::RenderLoop;
use crate::detector::session::CameraSession;
use crate::device_camera::interface::CameraRequest;
use crate::error::DetectorError;
use std::path::Path;
use std::sync::{Arc, PoisonError};

impl Detector {
    pub fn run_effect(&self, effect: Effect) {
        let _ = self.logger.info(&format!("Running effect: {:?}", effect));

        match effect {
            Effect::LoadCapability {
                model_path,
                metadata_path,
            } => {
                let loaded = self.load_capability(&model_path, &metadata_path);
                self.send(Msg::CapabilityLoadDone(loaded));
            }
            Effect::StartCamera(request) => {
                let started = self.start_camera(request);
                self.send(Msg::CameraStartDone(started));
            }
            Effect::StartRenderLoop => self.start_render_loop(),
            Effect::StopCamera => {
                let stopped = self.stop_camera();
                self.send(Msg::CameraStopDone(stopped));
            }
            Effect::Classify { generation } => {
                let session = self.current_session();
                match classify(self.capability.get(), session.as_deref()) {
                    Some(Ok(predictions)) => {
                        self.send(Msg::ClassifyDone {
                            generation,
                            result: Ok(predictions),
                        });
                    }
                    Some(Err(e)) => {
                        let _ = self.logger.error(&e.to_string());
                        self.send(Msg::ClassifyDone {
                            generation,
                            result: Err(e),
                        });
                    }
                    None => self.send(Msg::ClassifySkipped),
                }
            }
        }
    }

    fn load_capability(&self, model_path: &Path, metadata_path: &Path) -> Result<usize, DetectorError> {
        if let Some(loaded) = self.capability.get() {
            return Ok(loaded.total_classes());
        }

        match capability::load(
            self.classifier_loader.as_ref(),
            model_path,
            metadata_path,
            &self.logger,
        ) {
            Ok(loaded) => {
                let total_classes = loaded.total_classes();
                let _ = self.capability.set(loaded);
                Ok(total_classes)
            }
            Err(e) => {
                let _ = self.logger.error(&e.to_string());
                Err(e)
            }
        }
    }

    fn start_camera(&self, request: CameraRequest) -> Result<(), DetectorError> {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if session.is_some() {
            return Err(DetectorError::SessionBusy);
        }

        match CameraSession::acquire(self.device_camera.clone(), request, self.logger.clone()) {
            Ok(acquired) => {
                *session = Some(Arc::new(acquired));
                Ok(())
            }
            Err(e) => {
                let _ = self.logger.error(&e.to_string());
                Err(e)
            }
        }
    }

    fn start_render_loop(&self) {
        let Some(session) = self.current_session() else {
            return;
        };

        let render_loop = RenderLoop::start(
            session,
            self.display_surface.clone(),
            self.logger.clone(),
            self.config.render_interval,
        );

        let previous = self
            .render_loop
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(render_loop);
        if let Some(previous) = previous {
            previous.join();
        }
    }

    /// Stop order matters: flag the session, wait for the render loop to
    /// see it, release the device, then blank the surface.
    fn stop_camera(&self) -> Result<(), DetectorError> {
        let session = self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(session) = &session {
            session.mark_stopped();
        }

        let render_loop = self
            .render_loop
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(render_loop) = render_loop {
            render_loop.join();
        }

        let released = match &session {
            Some(session) => session.release(),
            None => Ok(()),
        };
        if let Err(e) = &released {
            let _ = self.logger.error(&e.to_string());
        }

        let cleared = self
            .display_surface
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        if let Err(e) = cleared {
            let _ = self
                .logger
                .error(&format!("Failed to clear display surface: {}", e));
        }

        released
    }

    /// Releases the camera if a session is still open. Called when the
    /// window goes away.
    pub fn shutdown(&self) {
        if self.current_session().is_some() {
            let _ = self.logger.info("Shutting down open session");
            let _ = self.stop_camera();
        }
    }

    pub(super) fn current_session(&self) -> Option<Arc<CameraSession>> {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
