use crate::config::Config;
use crate::detector::core::{CapabilityState, Confirmation, Model, SessionState};
use crate::detector::interpret::{DisplayState, Species};

pub const TITLE: &str = "Detectron MK-2";
pub const DETECTIONS_HEADING: &str = "Detecciones";
pub const DETECT_LABEL: &str = "Detectar";

const START_LABEL: &str = "Iniciar IA";
const STOP_LABEL: &str = "Finalizar IA";
const WAKE_PROMPT: &str = "¡Presiona de nuevo, para despertar la maquina!";
const SHUTDOWN_PROMPT: &str = "¡Presiona de nuevo, para apagar la maquina!";

/// Everything the window draws, derived from the detector model.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub prompt: Option<&'static str>,
    pub toggle_label: &'static str,
    pub show_feed: bool,
    pub show_detections: bool,
    pub detect_enabled: bool,
    pub result: String,
    pub species: Option<Species>,
    pub status: Option<String>,
}

pub fn view(config: &Config, model: &Model) -> View {
    let active = matches!(
        model.session,
        SessionState::Live { .. } | SessionState::Stopping
    );

    let prompt = match model.confirmation {
        Confirmation::Unset => None,
        Confirmation::Armed if active => Some(SHUTDOWN_PROMPT),
        Confirmation::Armed => Some(WAKE_PROMPT),
    };

    let species = model
        .display
        .label
        .as_deref()
        .and_then(|label| Species::of(label, config));

    View {
        prompt,
        toggle_label: if active { STOP_LABEL } else { START_LABEL },
        show_feed: model.is_live(),
        show_detections: model.is_live(),
        detect_enabled: model.can_detect(),
        result: result_text(&model.display),
        species,
        status: status_text(model),
    }
}

pub fn result_text(display: &DisplayState) -> String {
    format!(
        "Es un: {} - {:.2}%",
        display.label.as_deref().unwrap_or_default(),
        display.confidence_percent
    )
}

fn status_text(model: &Model) -> Option<String> {
    match (&model.capability, &model.session) {
        (CapabilityState::Failed { reason }, _) => Some(reason.clone()),
        (_, SessionState::Acquiring { .. }) => Some("Abriendo cámara...".to_string()),
        (CapabilityState::Loading, _) => Some("Cargando modelo...".to_string()),
        _ => None,
    }
}
