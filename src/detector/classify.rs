use crate::detector::capability::Capability;
use crate::detector::session::CameraSession;
use crate::error::DetectorError;
use crate::image_classifier::interface::Prediction;

/// Runs the classifier on the session's current frame.
///
/// Returns `None` without doing anything unless a capability is loaded and
/// the session is live. The result is cut to the capability's class count.
pub fn classify(
    capability: Option<&Capability>,
    session: Option<&CameraSession>,
) -> Option<Result<Vec<Prediction>, DetectorError>> {
    let capability = capability?;
    let session = session.filter(|session| session.is_live())?;

    Some(run(capability, session))
}

fn run(capability: &Capability, session: &CameraSession) -> Result<Vec<Prediction>, DetectorError> {
    let frame = match session.current_frame() {
        Some(frame) => frame,
        None => session.refresh()?,
    };

    let mut predictions = capability
        .classifier()
        .classify(&frame)
        .map_err(DetectorError::classify)?;
    predictions.truncate(capability.total_classes());

    Ok(predictions)
}
