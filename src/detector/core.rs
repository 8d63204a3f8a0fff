use crate::config::Config;
use crate::detector::interpret::{interpret, DisplayState};
use crate::device_camera::interface::CameraRequest;
use crate::error::DetectorError;
use crate::image_classifier::interface::Prediction;
use std::path::PathBuf;

//
//
//

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum CapabilityState {
    #[default]
    Loading,
    Loaded {
        total_classes: usize,
    },
    Failed {
        reason: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Acquiring {
        request: CameraRequest,
    },
    Live {
        request: CameraRequest,
    },
    Stopping,
}

/// The start/stop toggle has to be pressed twice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Confirmation {
    #[default]
    Unset,
    Armed,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct Model {
    pub capability: CapabilityState,
    pub session: SessionState,
    pub confirmation: Confirmation,
    pub classifying: bool,
    pub display: DisplayState,
    /// Bumped on every session start. Classification results carry the
    /// generation they were requested in.
    pub generation: u64,
}

impl Model {
    pub fn is_live(&self) -> bool {
        matches!(self.session, SessionState::Live { .. })
    }

    pub fn total_classes(&self) -> Option<usize> {
        match self.capability {
            CapabilityState::Loaded { total_classes } => Some(total_classes),
            _ => None,
        }
    }

    /// Detect needs a loaded classifier, a live camera and no
    /// classification already in flight.
    pub fn can_detect(&self) -> bool {
        self.is_live() && self.total_classes().is_some() && !self.classifying
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Msg {
    CapabilityLoadDone(Result<usize, DetectorError>),
    TogglePressed,
    DetectPressed,
    CameraStartDone(Result<(), DetectorError>),
    CameraStopDone(Result<(), DetectorError>),
    ClassifyDone {
        generation: u64,
        result: Result<Vec<Prediction>, DetectorError>,
    },
    ClassifySkipped,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    LoadCapability {
        model_path: PathBuf,
        metadata_path: PathBuf,
    },
    StartCamera(CameraRequest),
    StartRenderLoop,
    StopCamera,
    Classify {
        generation: u64,
    },
}

//
//
//

pub fn init(config: &Config) -> (Model, Vec<Effect>) {
    (
        Model::default(),
        vec![Effect::LoadCapability {
            model_path: config.model_path.clone(),
            metadata_path: config.metadata_path.clone(),
        }],
    )
}

/// Opens a session. Only allowed from `Idle`; anything else leaves the model
/// untouched.
pub fn start_session(config: &Config, model: Model) -> Result<(Model, Vec<Effect>), DetectorError> {
    if model.session != SessionState::Idle {
        return Err(DetectorError::SessionBusy);
    }

    let request = CameraRequest {
        facing: config.preferred_facing,
        width: config.frame_width,
        height: config.frame_height,
        mirrored: config.mirrored,
    };

    Ok((
        Model {
            session: SessionState::Acquiring { request },
            generation: model.generation.wrapping_add(1),
            ..model
        },
        vec![Effect::StartCamera(request)],
    ))
}

pub fn stop_session(model: Model) -> (Model, Vec<Effect>) {
    match model.session {
        SessionState::Live { .. } => (
            Model {
                session: SessionState::Stopping,
                display: DisplayState::empty(),
                ..model
            },
            vec![Effect::StopCamera],
        ),
        _ => (model, vec![]),
    }
}

//
//
//

pub fn transition(config: &Config, model: Model, msg: Msg) -> (Model, Vec<Effect>) {
    match msg {
        Msg::CapabilityLoadDone(result) => {
            let capability = match result {
                Ok(total_classes) => CapabilityState::Loaded { total_classes },
                Err(e) => CapabilityState::Failed {
                    reason: e.to_string(),
                },
            };
            (Model { capability, ..model }, vec![])
        }

        Msg::TogglePressed => match model.confirmation {
            Confirmation::Unset => (
                Model {
                    confirmation: Confirmation::Armed,
                    ..model
                },
                vec![],
            ),
            Confirmation::Armed => {
                let model = Model {
                    confirmation: Confirmation::Unset,
                    ..model
                };
                match model.session {
                    SessionState::Idle => match start_session(config, model.clone()) {
                        Ok(next) => next,
                        Err(_) => (model, vec![]),
                    },
                    SessionState::Live { .. } => stop_session(model),
                    SessionState::Acquiring { .. } | SessionState::Stopping => (model, vec![]),
                }
            }
        },

        Msg::DetectPressed => {
            let model = Model {
                confirmation: Confirmation::Unset,
                ..model
            };
            if model.can_detect() {
                let generation = model.generation;
                (
                    Model {
                        classifying: true,
                        ..model
                    },
                    vec![Effect::Classify { generation }],
                )
            } else {
                (model, vec![])
            }
        }

        Msg::CameraStartDone(result) => match (model.session.clone(), result) {
            (SessionState::Acquiring { request }, Ok(())) => (
                Model {
                    session: SessionState::Live { request },
                    ..model
                },
                vec![Effect::StartRenderLoop],
            ),
            (SessionState::Acquiring { .. }, Err(_)) => (
                Model {
                    session: SessionState::Idle,
                    ..model
                },
                vec![],
            ),
            _ => (model, vec![]),
        },

        Msg::CameraStopDone(_) => match model.session {
            SessionState::Stopping => (
                Model {
                    session: SessionState::Idle,
                    display: DisplayState::empty(),
                    ..model
                },
                vec![],
            ),
            _ => (model, vec![]),
        },

        // A classification outlives a stop; `classifying` stays set until
        // its result arrives, and results from an earlier session are dropped.
        Msg::ClassifyDone { generation, result } => {
            let model = Model {
                classifying: false,
                ..model
            };
            if !model.is_live() || generation != model.generation {
                return (model, vec![]);
            }

            let display = result
                .and_then(|predictions| {
                    interpret(&predictions, &config.cat_label, config.confidence_source)
                })
                .unwrap_or_else(|_| DisplayState::empty());

            (Model { display, ..model }, vec![])
        }

        Msg::ClassifySkipped => (
            Model {
                classifying: false,
                ..model
            },
            vec![],
        ),
    }
}
