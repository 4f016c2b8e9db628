//! Alert event taxonomy.
//!
//! An `AlertEvent` is one debounced, classified safety event produced by
//! frame analysis. Events are plain serde values so callers can ship them
//! over whatever transport they like; the kernel itself never persists
//! them.

use serde::{Deserialize, Serialize};

use crate::detect::Gender;

/// Alert classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertKind {
    LoneWoman,
    MoreMen,
    SosGesture,
}

/// Distress gestures recognized by the geometry rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GestureKind {
    WavingHands,
    HandOnMouth,
    CrossedHands,
    RaisedHand,
    BothHandsUp,
    HelpSign,
}

impl GestureKind {
    /// Human-readable gesture name.
    pub fn label(&self) -> &'static str {
        match self {
            GestureKind::WavingHands => "Waving Hands",
            GestureKind::HandOnMouth => "Hand on Mouth",
            GestureKind::CrossedHands => "Crossed Hands",
            GestureKind::RaisedHand => "Raised Hand",
            GestureKind::BothHandsUp => "Both Hands Up",
            GestureKind::HelpSign => "Help Sign",
        }
    }

    /// Fixed alert banner text.
    pub fn message(&self) -> &'static str {
        match self {
            GestureKind::WavingHands => "HELP NEEDED - WAVING HANDS",
            GestureKind::HandOnMouth => "DISTRESS SIGNAL - HAND ON MOUTH",
            GestureKind::CrossedHands => "DISTRESS SIGNAL - CROSSED HANDS",
            GestureKind::RaisedHand => "DISTRESS SIGNAL - RAISED HAND",
            GestureKind::BothHandsUp => "EMERGENCY ALERT - BOTH HANDS UP",
            GestureKind::HelpSign => "HELP SIGNAL - THUMB UP",
        }
    }

    /// Fixed descriptive text.
    pub fn description(&self) -> &'static str {
        match self {
            GestureKind::WavingHands => "Person is waving hands for help",
            GestureKind::HandOnMouth => "Person has hand on mouth indicating distress",
            GestureKind::CrossedHands => "Person has crossed hands indicating distress",
            GestureKind::RaisedHand => "Person has raised one hand in distress",
            GestureKind::BothHandsUp => "Person has raised both hands in emergency",
            GestureKind::HelpSign => "Person is showing thumb up for help",
        }
    }
}

/// Kind-specific alert payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AlertDetail {
    LoneWoman {
        gender: Gender,
        confidence: f32,
    },
    MoreMen {
        male_count: u32,
        female_count: u32,
    },
    SosGesture {
        gesture: GestureKind,
        description: String,
    },
}

impl AlertDetail {
    pub fn kind(&self) -> AlertKind {
        match self {
            AlertDetail::LoneWoman { .. } => AlertKind::LoneWoman,
            AlertDetail::MoreMen { .. } => AlertKind::MoreMen,
            AlertDetail::SosGesture { .. } => AlertKind::SosGesture,
        }
    }
}

/// One debounced safety alert.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    /// Stream time the alert fired, in seconds.
    pub at_secs: f64,
    /// Frame index for file-based streams; `None` for live frames.
    pub frame: Option<u64>,
    /// Fixed human-readable alert text.
    pub message: String,
    pub detail: AlertDetail,
}

impl AlertEvent {
    pub fn kind(&self) -> AlertKind {
        self.detail.kind()
    }

    /// Stamp the originating frame index (file-based streams).
    pub fn at_frame(mut self, frame: u64) -> Self {
        self.frame = Some(frame);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_maps_to_kind() {
        let detail = AlertDetail::MoreMen {
            male_count: 2,
            female_count: 1,
        };
        assert_eq!(detail.kind(), AlertKind::MoreMen);

        let detail = AlertDetail::SosGesture {
            gesture: GestureKind::HelpSign,
            description: GestureKind::HelpSign.description().to_string(),
        };
        assert_eq!(detail.kind(), AlertKind::SosGesture);
    }

    #[test]
    fn events_round_trip_as_json() {
        let event = AlertEvent {
            at_secs: 12.5,
            frame: Some(90),
            message: GestureKind::BothHandsUp.message().to_string(),
            detail: AlertDetail::SosGesture {
                gesture: GestureKind::BothHandsUp,
                description: GestureKind::BothHandsUp.description().to_string(),
            },
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: AlertEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
