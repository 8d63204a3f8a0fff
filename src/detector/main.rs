use crate::config::Config;
use crate::detector::capability::Capability;
use crate::detector::core::{init, transition, Effect, Model, Msg};
use crate::detector::render_loop::RenderLoop;
use crate::detector::session::CameraSession;
use crate::device_camera::interface::DeviceCamera;
use crate::device_display::interface::DisplaySurface;
use crate::image_classifier::interface::ImageClassifierLoader;
use crate::library::logger::interface::Logger;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Duration;

#[derive(Clone)]
pub struct Detector {
    pub model: Arc<Mutex<Model>>,
    pub event_sender: Sender<Msg>,
    pub event_receiver: Arc<Mutex<Receiver<Msg>>>,
    pub config: Config,
    pub logger: Arc<dyn Logger + Send + Sync>,
    pub device_camera: Arc<dyn DeviceCamera + Send + Sync>,
    pub display_surface: Arc<Mutex<dyn DisplaySurface + Send + Sync>>,
    pub classifier_loader: Arc<dyn ImageClassifierLoader + Send + Sync>,
    pub(super) capability: Arc<OnceLock<Capability>>,
    pub(super) session: Arc<Mutex<Option<Arc<CameraSession>>>>,
    pub(super) render_loop: Arc<Mutex<Option<RenderLoop>>>,
}

impl Detector {
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger + Send + Sync>,
        device_camera: Arc<dyn DeviceCamera + Send + Sync>,
        display_surface: Arc<Mutex<dyn DisplaySurface + Send + Sync>>,
        classifier_loader: Arc<dyn ImageClassifierLoader + Send + Sync>,
    ) -> Self {
        let (event_sender, event_receiver) = channel();

        Self {
            config,
            logger: logger.with_namespace("detector"),
            device_camera,
            display_surface,
            classifier_loader,
            event_sender,
            event_receiver: Arc::new(Mutex::new(event_receiver)),
            model: Arc::new(Mutex::new(Model::default())),
            capability: Arc::new(OnceLock::new()),
            session: Arc::new(Mutex::new(None)),
            render_loop: Arc::new(Mutex::new(None)),
        }
    }

    pub fn send(&self, msg: Msg) {
        let _ = self.event_sender.send(msg);
    }

    pub fn model(&self) -> Model {
        self.model
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<Msg, RecvTimeoutError> {
        self.event_receiver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .recv_timeout(timeout)
    }

    fn spawn_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            let self_clone = self.clone();
            std::thread::spawn(move || self_clone.run_effect(effect));
        }
    }

    /// Applies one message to the model and starts the effects it asks for.
    pub fn process(&self, msg: Msg) -> Vec<Effect> {
        let mut model = self.model.lock().unwrap_or_else(PoisonError::into_inner);

        let _ = self.logger.info(&format!("msg: {:?}", msg));
        let (new_model, effects) = transition(&self.config, model.clone(), msg);
        if *model != new_model {
            let _ = self.logger.info(&format!("model: {:?}", new_model));
        }
        *model = new_model;
        drop(model);

        if !effects.is_empty() {
            let _ = self.logger.info(&format!("effects: {:?}", effects));
        }
        self.spawn_effects(effects.clone());
        effects
    }

    pub fn run(&self) {
        let (initial_model, effects) = init(&self.config);
        *self.model.lock().unwrap_or_else(PoisonError::into_inner) = initial_model;

        self.spawn_effects(effects);

        loop {
            let msg = self
                .event_receiver
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .recv();

            match msg {
                Ok(msg) => {
                    self.process(msg);
                }
                Err(e) => {
                    let _ = self.logger.error(&format!("event channel closed: {}", e));
                    return;
                }
            }
        }
    }
}
