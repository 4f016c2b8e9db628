//! Per-frame analysis orchestrator.
//!
//! `FrameAnalyzer::analyze` is a pure function of its inputs plus the
//! per-stream `DebounceState`: gender tally, More-Men rule, Lone-Woman
//! rule, then the gesture rules. It never panics on malformed detector
//! output and never fabricates events (demo injection lives in the stream
//! driver, behind its own opt-in flag).

use crate::alert::{AlertDetail, AlertEvent, AlertKind, GestureKind};
use crate::detect::{BoundingBox, Gender, LandmarkSet};

use super::debounce::DebounceState;
use super::gesture::{GestureRecognizer, GestureThresholds};

/// One classified person in a frame.
#[derive(Clone, Debug)]
pub struct PersonObservation {
    pub bbox: BoundingBox,
    pub gender: Gender,
    /// Gender-classification confidence in `[0, 1]`.
    pub confidence: f32,
}

/// Everything the orchestrator sees for one frame.
#[derive(Clone, Debug, Default)]
pub struct FrameObservations {
    pub persons: Vec<PersonObservation>,
    pub landmarks: LandmarkSet,
}

/// Gender counts over one frame's confident observations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenderTally {
    pub male_count: u32,
    pub female_count: u32,
}

impl GenderTally {
    /// Count observations above the confidence threshold. Below-threshold
    /// and Unknown observations contribute to neither side.
    pub fn count(persons: &[PersonObservation], min_confidence: f32) -> Self {
        let mut tally = GenderTally::default();
        for person in persons {
            if person.confidence <= min_confidence {
                continue;
            }
            match person.gender {
                Gender::Male => tally.male_count += 1,
                Gender::Female => tally.female_count += 1,
                Gender::Unknown => {}
            }
        }
        tally
    }
}

/// Frame analysis orchestrator.
#[derive(Clone, Debug)]
pub struct FrameAnalyzer {
    gender_confidence: f32,
    recognizer: GestureRecognizer,
}

impl FrameAnalyzer {
    pub fn new(gender_confidence: f32, thresholds: GestureThresholds) -> Self {
        Self {
            gender_confidence,
            recognizer: GestureRecognizer::new(thresholds),
        }
    }

    /// Analyze one frame's observations at stream time `now`.
    ///
    /// Returns alerts in a fixed order: More-Men, Lone-Woman, then
    /// gestures in rule-priority order. `state` must be the stream's own
    /// `DebounceState`; `now` must be non-decreasing across calls.
    pub fn analyze(
        &self,
        observations: &FrameObservations,
        now: f64,
        night: bool,
        state: &mut DebounceState,
    ) -> Vec<AlertEvent> {
        let mut events = Vec::new();

        let tally = GenderTally::count(&observations.persons, self.gender_confidence);
        if tally.male_count > tally.female_count
            && tally.male_count > 0
            && state.should_fire(AlertKind::MoreMen, now)
        {
            let message = format!(
                "MORE MEN THAN WOMEN DETECTED ({} men, {} women)",
                tally.male_count, tally.female_count
            );
            log::info!("{} at t={:.2}s", message, now);
            events.push(AlertEvent {
                at_secs: now,
                frame: None,
                message,
                detail: AlertDetail::MoreMen {
                    male_count: tally.male_count,
                    female_count: tally.female_count,
                },
            });
            state.record_fired(AlertKind::MoreMen, now);
        }

        // Lone-Woman applies only to frames with exactly one person.
        if let [person] = observations.persons.as_slice() {
            if person.confidence > self.gender_confidence
                && night
                && state.should_fire(AlertKind::LoneWoman, now)
            {
                let message = format!("PERSON DETECTED AT NIGHT ({})", person.gender);
                log::info!("{} at t={:.2}s", message, now);
                events.push(AlertEvent {
                    at_secs: now,
                    frame: None,
                    message,
                    detail: AlertDetail::LoneWoman {
                        gender: person.gender,
                        confidence: person.confidence,
                    },
                });
                state.record_fired(AlertKind::LoneWoman, now);
            }
        }

        for gesture in self.recognizer.detect(&observations.landmarks, now, state) {
            log::info!("{} at t={:.2}s", gesture.message(), now);
            events.push(gesture_event(gesture, now));
        }

        events
    }
}

/// Build the SOS alert for a recognized gesture.
pub fn gesture_event(gesture: GestureKind, now: f64) -> AlertEvent {
    AlertEvent {
        at_secs: now,
        frame: None,
        message: gesture.message().to_string(),
        detail: AlertDetail::SosGesture {
            gesture,
            description: gesture.description().to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Cooldowns;
    use crate::detect::{
        HandLandmarks, Point, HAND_LANDMARK_COUNT, HAND_MIDDLE_FINGER_TIP, HAND_WRIST,
    };

    fn analyzer() -> FrameAnalyzer {
        FrameAnalyzer::new(0.6, GestureThresholds::default())
    }

    fn person(gender: Gender, confidence: f32) -> PersonObservation {
        PersonObservation {
            bbox: BoundingBox::new(100.0, 50.0, 220.0, 400.0),
            gender,
            confidence,
        }
    }

    fn frame_with(persons: Vec<PersonObservation>) -> FrameObservations {
        FrameObservations {
            persons,
            landmarks: LandmarkSet::default(),
        }
    }

    #[test]
    fn empty_frame_yields_nothing() {
        let mut state = DebounceState::default();
        let events = analyzer().analyze(&frame_with(vec![]), 1.0, true, &mut state);
        assert!(events.is_empty());
    }

    #[test]
    fn lone_person_at_night_alerts_once() {
        // Scenario: one detection at 0.9 confidence, night, fresh state.
        let mut state = DebounceState::default();
        let frame = frame_with(vec![person(Gender::Female, 0.9)]);
        let events = analyzer().analyze(&frame, 1.0, true, &mut state);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), AlertKind::LoneWoman);
        assert_eq!(
            events[0].detail,
            AlertDetail::LoneWoman {
                gender: Gender::Female,
                confidence: 0.9
            }
        );
    }

    #[test]
    fn lone_person_needs_night_and_confidence() {
        let frame = frame_with(vec![person(Gender::Female, 0.9)]);
        let mut state = DebounceState::default();
        assert!(analyzer().analyze(&frame, 1.0, false, &mut state).is_empty());

        let faint = frame_with(vec![person(Gender::Female, 0.5)]);
        let mut state = DebounceState::default();
        assert!(analyzer().analyze(&faint, 1.0, true, &mut state).is_empty());
    }

    #[test]
    fn lone_person_rule_ignores_crowds() {
        // Two low-confidence detections: no tally, but also not "exactly
        // one person", so no lone-woman alert either.
        let frame = frame_with(vec![
            person(Gender::Female, 0.9),
            person(Gender::Unknown, 0.1),
        ]);
        let mut state = DebounceState::default();
        assert!(analyzer().analyze(&frame, 1.0, true, &mut state).is_empty());
    }

    #[test]
    fn more_men_counts_confident_observations() {
        // Scenario: Male, Male, Female above threshold.
        let frame = frame_with(vec![
            person(Gender::Male, 0.8),
            person(Gender::Male, 0.7),
            person(Gender::Female, 0.9),
        ]);
        let mut state = DebounceState::default();
        let events = analyzer().analyze(&frame, 1.0, false, &mut state);
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].detail,
            AlertDetail::MoreMen {
                male_count: 2,
                female_count: 1
            }
        );
        assert_eq!(
            events[0].message,
            "MORE MEN THAN WOMEN DETECTED (2 men, 1 women)"
        );
    }

    #[test]
    fn equal_tally_never_alerts() {
        let frame = frame_with(vec![
            person(Gender::Male, 0.8),
            person(Gender::Female, 0.9),
        ]);
        let mut state = DebounceState::default();
        assert!(analyzer().analyze(&frame, 1.0, false, &mut state).is_empty());
    }

    #[test]
    fn below_threshold_counts_as_unknown() {
        // Two males below threshold, one female above: tally is 0 vs 1,
        // so no more-men alert.
        let frame = frame_with(vec![
            person(Gender::Male, 0.2),
            person(Gender::Male, 0.3),
            person(Gender::Female, 0.9),
        ]);
        let tally = GenderTally::count(&frame.persons, 0.6);
        assert_eq!(tally.male_count, 0);
        assert_eq!(tally.female_count, 1);
        let mut state = DebounceState::default();
        assert!(analyzer().analyze(&frame, 1.0, false, &mut state).is_empty());
    }

    #[test]
    fn repeat_within_cooldown_is_silent() {
        // Scenario: identical lone-woman input twice within the 5s window.
        let frame = frame_with(vec![person(Gender::Female, 0.9)]);
        let analyzer = analyzer();
        let mut state = DebounceState::default();
        assert_eq!(analyzer.analyze(&frame, 1.0, true, &mut state).len(), 1);
        assert!(analyzer.analyze(&frame, 4.0, true, &mut state).is_empty());
        // Past the cooldown it fires again.
        assert_eq!(analyzer.analyze(&frame, 6.5, true, &mut state).len(), 1);
    }

    #[test]
    fn analysis_is_a_pure_function_of_input_and_state() {
        let frame = frame_with(vec![person(Gender::Male, 0.9)]);
        let analyzer = analyzer();

        // A state past all cooldowns.
        let mut base = DebounceState::new(Cooldowns::default());
        base.record_fired(AlertKind::MoreMen, 1.0);
        base.record_fired(AlertKind::LoneWoman, 1.0);
        base.record_fired(AlertKind::SosGesture, 1.0);

        let mut first_state = base.clone();
        let mut second_state = base.clone();
        let first = analyzer.analyze(&frame, 20.0, true, &mut first_state);
        let second = analyzer.analyze(&frame, 20.0, true, &mut second_state);
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn events_come_out_in_rule_order() {
        // One confident male at night with a raised hand: More-Men first
        // (1 man, 0 women), then Lone-Woman, then the gesture.
        let mut hand = [Point::new(0.5, 0.9, 0.0); HAND_LANDMARK_COUNT];
        hand[HAND_WRIST] = Point::new(0.5, 0.35, 0.0);
        hand[HAND_MIDDLE_FINGER_TIP] = Point::new(0.52, 0.2, 0.0);
        let frame = FrameObservations {
            persons: vec![person(Gender::Male, 0.9)],
            landmarks: LandmarkSet {
                right_hand: Some(HandLandmarks::new(hand)),
                ..Default::default()
            },
        };
        let mut state = DebounceState::default();
        let events = analyzer().analyze(&frame, 1.0, true, &mut state);
        let kinds: Vec<AlertKind> = events.iter().map(AlertEvent::kind).collect();
        assert_eq!(
            kinds,
            vec![AlertKind::MoreMen, AlertKind::LoneWoman, AlertKind::SosGesture]
        );
        assert_eq!(
            events[2].detail,
            AlertDetail::SosGesture {
                gesture: GestureKind::RaisedHand,
                description: GestureKind::RaisedHand.description().to_string(),
            }
        );
    }
}
