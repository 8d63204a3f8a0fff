use crate::config::{Config, ConfidenceSource};
use crate::error::DetectorError;
use crate::image_classifier::interface::Prediction;

/// What the result panel shows. Replaced wholesale after every
/// classification.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplayState {
    pub label: Option<String>,
    pub confidence_percent: f64,
}

impl DisplayState {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.label.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Species {
    Dog,
    Cat,
}

impl Species {
    pub fn of(label: &str, config: &Config) -> Option<Self> {
        if label == config.dog_label {
            Some(Species::Dog)
        } else if label == config.cat_label {
            Some(Species::Cat)
        } else {
            None
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Species::Dog => "🐶",
            Species::Cat => "🐱",
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Maps a prediction set to the displayed label and confidence.
///
/// The winner is entry 0 when its rounded probability is above 0.5, else
/// entry 1. Under [`ConfidenceSource::Observed`] the confidence comes from
/// entry 0 when the winner is `cat_label` and from entry 1 otherwise, even
/// when that is not the winning entry.
pub fn interpret(
    predictions: &[Prediction],
    cat_label: &str,
    source: ConfidenceSource,
) -> Result<DisplayState, DetectorError> {
    let (first, second) = match predictions {
        [first, second, ..] => (first, second),
        _ => return Err(DetectorError::Data(predictions.len())),
    };

    let first_probability = round2(first.probability as f64);
    let winner_is_first = first_probability > 0.5;
    let label = if winner_is_first {
        &first.label
    } else {
        &second.label
    };

    let confidence_entry = match source {
        ConfidenceSource::Observed if label == cat_label => first,
        ConfidenceSource::Observed => second,
        ConfidenceSource::Winner if winner_is_first => first,
        ConfidenceSource::Winner => second,
    };
    let confidence = round2(confidence_entry.probability as f64);

    let percent = round2(confidence * 100.0);
    let confidence_percent = if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    };

    Ok(DisplayState {
        label: Some(label.clone()),
        confidence_percent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(entries: &[(&str, f32)]) -> Vec<Prediction> {
        entries
            .iter()
            .map(|(label, probability)| Prediction::new(label, *probability))
            .collect()
    }

    fn observed(entries: &[(&str, f32)]) -> DisplayState {
        interpret(&set(entries), "gato", ConfidenceSource::Observed).unwrap()
    }

    #[test]
    fn test_dog_wins_confidence_from_second_entry() {
        let state = observed(&[("perro", 0.82), ("gato", 0.15)]);
        assert_eq!(state.label.as_deref(), Some("perro"));
        assert_eq!(state.confidence_percent, 15.0);
    }

    #[test]
    fn test_cat_wins_confidence_from_first_entry() {
        let state = observed(&[("gato", 0.91), ("perro", 0.07)]);
        assert_eq!(state.label.as_deref(), Some("gato"));
        assert_eq!(state.confidence_percent, 91.0);
    }

    #[test]
    fn test_fallback_winner_keeps_observed_mismatch() {
        let state = observed(&[("perro", 0.40), ("gato", 0.55)]);
        assert_eq!(state.label.as_deref(), Some("gato"));
        assert_eq!(state.confidence_percent, 40.0);
    }

    #[test]
    fn test_winner_source_reads_winning_entry() {
        let predictions = set(&[("perro", 0.40), ("gato", 0.55)]);
        let state = interpret(&predictions, "gato", ConfidenceSource::Winner).unwrap();
        assert_eq!(state.label.as_deref(), Some("gato"));
        assert_eq!(state.confidence_percent, 55.0);

        let predictions = set(&[("perro", 0.82), ("gato", 0.15)]);
        let state = interpret(&predictions, "gato", ConfidenceSource::Winner).unwrap();
        assert_eq!(state.confidence_percent, 82.0);
    }

    #[test]
    fn test_threshold_uses_rounded_probability() {
        // 0.504 rounds to 0.50, which is not above 0.5.
        let state = observed(&[("perro", 0.504), ("gato", 0.496)]);
        assert_eq!(state.label.as_deref(), Some("gato"));

        // 0.506 rounds to 0.51.
        let state = observed(&[("perro", 0.506), ("gato", 0.494)]);
        assert_eq!(state.label.as_deref(), Some("perro"));
    }

    #[test]
    fn test_nan_probability_yields_zero_percent() {
        let state = observed(&[("perro", 0.9), ("gato", f32::NAN)]);
        assert_eq!(state.label.as_deref(), Some("perro"));
        assert_eq!(state.confidence_percent, 0.0);
    }

    #[test]
    fn test_percent_is_clamped() {
        let state = observed(&[("perro", 0.9), ("gato", 1.7)]);
        assert_eq!(state.confidence_percent, 100.0);

        let state = observed(&[("perro", 0.9), ("gato", -0.3)]);
        assert_eq!(state.confidence_percent, 0.0);
    }

    #[test]
    fn test_short_sets_are_data_errors() {
        assert_eq!(
            interpret(&[], "gato", ConfidenceSource::Observed),
            Err(DetectorError::Data(0))
        );
        assert_eq!(
            interpret(&set(&[("perro", 0.9)]), "gato", ConfidenceSource::Observed),
            Err(DetectorError::Data(1))
        );
    }

    #[test]
    fn test_label_always_from_first_two_entries() {
        let grid = [0.0f32, 0.2, 0.49, 0.5, 0.501, 0.51, 0.8, 1.0];
        for &a in &grid {
            for &b in &grid {
                let predictions = set(&[("perro", a), ("gato", b), ("conejo", 0.99)]);
                let state = interpret(&predictions, "gato", ConfidenceSource::Observed).unwrap();
                let label = state.label.unwrap();
                assert!(label == "perro" || label == "gato");
                assert!((0.0..=100.0).contains(&state.confidence_percent));
            }
        }
    }

    #[test]
    fn test_is_deterministic() {
        let predictions = set(&[("gato", 0.33), ("perro", 0.67)]);
        let first = interpret(&predictions, "gato", ConfidenceSource::Observed);
        for _ in 0..10 {
            assert_eq!(interpret(&predictions, "gato", ConfidenceSource::Observed), first);
        }
    }

    #[test]
    fn test_species() {
        let config = Config::default();
        assert_eq!(Species::of("perro", &config), Some(Species::Dog));
        assert_eq!(Species::of("gato", &config), Some(Species::Cat));
        assert_eq!(Species::of("conejo", &config), None);
    }
}
