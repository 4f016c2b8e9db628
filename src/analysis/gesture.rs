//! Distress gesture recognition over normalized landmarks.
//!
//! Every rule is a pure geometry predicate; the only state it touches is
//! the per-stream `DebounceState`. All six gesture types share one gesture
//! cooldown: rules are evaluated in a fixed priority order (Wave, Hand on
//! Mouth, Crossed Hands, Raised Hand, Both Hands Up, Help Sign) and a rule
//! that fires consumes the cooldown for the rest of the window, so
//! lower-priority gestures can be starved by higher-priority ones.
//!
//! A rule that needs a hand treats an absent hand as "not detected", never
//! as an error.

use anyhow::{anyhow, Result};
use serde::Deserialize;

use crate::alert::{AlertKind, GestureKind};
use crate::detect::{HandLandmarks, LandmarkSet, PoseLandmarks};

use super::debounce::DebounceState;

/// Geometry thresholds for the gesture rules. All coordinates are
/// normalized image-relative values.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct GestureThresholds {
    /// Raised hand: wrist must sit above this y (head-level line).
    pub raised_hand_y: f32,
    /// Raised hand: fingertip must stay within this x-offset of the wrist.
    pub raised_hand_x: f32,
    /// Wave: minimum vertical fingertip-to-wrist spread.
    pub wave_vertical: f32,
    /// Wave: minimum horizontal fingertip-to-wrist spread.
    pub wave_horizontal: f32,
    /// Hand on mouth: maximum wrist-to-nose distance.
    pub hand_mouth_distance: f32,
    /// Crossed hands: maximum wrist-to-wrist distance.
    pub crossed_hands_distance: f32,
    /// Both hands up: both wrists above this y.
    pub both_hands_y: f32,
    /// Both hands up: maximum horizontal wrist separation.
    pub both_hands_x: f32,
    /// Help sign: maximum thumb-tip-to-IP x-offset (thumb held straight up).
    pub help_sign_x: f32,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            raised_hand_y: 0.4,
            raised_hand_x: 0.2,
            wave_vertical: 0.25,
            wave_horizontal: 0.15,
            hand_mouth_distance: 0.15,
            crossed_hands_distance: 0.2,
            both_hands_y: 0.4,
            both_hands_x: 0.3,
            help_sign_x: 0.05,
        }
    }
}

impl GestureThresholds {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("raised_hand_y", self.raised_hand_y),
            ("raised_hand_x", self.raised_hand_x),
            ("wave_vertical", self.wave_vertical),
            ("wave_horizontal", self.wave_horizontal),
            ("hand_mouth_distance", self.hand_mouth_distance),
            ("crossed_hands_distance", self.crossed_hands_distance),
            ("both_hands_y", self.both_hands_y),
            ("both_hands_x", self.both_hands_x),
            ("help_sign_x", self.help_sign_x),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(anyhow!(
                    "gesture threshold {} must be a positive number",
                    name
                ));
            }
        }
        Ok(())
    }
}

/// Gesture recognizer: geometry rules plus the shared-cooldown gate.
#[derive(Clone, Debug)]
pub struct GestureRecognizer {
    thresholds: GestureThresholds,
}

impl GestureRecognizer {
    pub fn new(thresholds: GestureThresholds) -> Self {
        Self { thresholds }
    }

    /// Evaluate all gesture rules for one frame, in priority order.
    ///
    /// Wave ticks are registered during predicate evaluation, before the
    /// shared cooldown gate: a wave observed while the cooldown is hot
    /// still advances the tick counter and can fire on a later frame.
    pub fn detect(
        &self,
        landmarks: &LandmarkSet,
        now: f64,
        state: &mut DebounceState,
    ) -> Vec<GestureKind> {
        let mut gestures = Vec::new();

        // Wave: right hand first, short-circuit on the first signal.
        let waved = self.wave_tick(landmarks.right_hand.as_ref(), now, state)
            || self.wave_tick(landmarks.left_hand.as_ref(), now, state);
        if waved && state.should_fire(AlertKind::SosGesture, now) {
            gestures.push(GestureKind::WavingHands);
            state.record_fired(AlertKind::SosGesture, now);
            state.reset_wave();
        }

        // Hand on mouth needs the pose (nose) plus at least one hand.
        if let Some(pose) = &landmarks.pose {
            let on_mouth = self.either_hand(landmarks, |hand| self.is_hand_on_mouth(hand, pose));
            if on_mouth && state.should_fire(AlertKind::SosGesture, now) {
                gestures.push(GestureKind::HandOnMouth);
                state.record_fired(AlertKind::SosGesture, now);
            }
        }

        if let (Some(left), Some(right)) = (&landmarks.left_hand, &landmarks.right_hand) {
            if self.is_crossed_hands(left, right) && state.should_fire(AlertKind::SosGesture, now) {
                gestures.push(GestureKind::CrossedHands);
                state.record_fired(AlertKind::SosGesture, now);
            }
        }

        let raised = self.either_hand(landmarks, |hand| self.is_raised_hand(hand));
        if raised && state.should_fire(AlertKind::SosGesture, now) {
            gestures.push(GestureKind::RaisedHand);
            state.record_fired(AlertKind::SosGesture, now);
        }

        if let (Some(left), Some(right)) = (&landmarks.left_hand, &landmarks.right_hand) {
            if self.is_both_hands_up(left, right) && state.should_fire(AlertKind::SosGesture, now) {
                gestures.push(GestureKind::BothHandsUp);
                state.record_fired(AlertKind::SosGesture, now);
            }
        }

        let help = self.either_hand(landmarks, |hand| self.is_help_sign(hand));
        if help && state.should_fire(AlertKind::SosGesture, now) {
            gestures.push(GestureKind::HelpSign);
            state.record_fired(AlertKind::SosGesture, now);
        }

        gestures
    }

    fn either_hand<F>(&self, landmarks: &LandmarkSet, predicate: F) -> bool
    where
        F: Fn(&HandLandmarks) -> bool,
    {
        landmarks.right_hand.as_ref().is_some_and(&predicate)
            || landmarks.left_hand.as_ref().is_some_and(&predicate)
    }

    /// Feed a hand's geometry into the wave micro-debounce. Returns true
    /// when the tick count reaches the wave threshold.
    fn wave_tick(
        &self,
        hand: Option<&HandLandmarks>,
        now: f64,
        state: &mut DebounceState,
    ) -> bool {
        let Some(hand) = hand else {
            return false;
        };
        let wrist = hand.wrist();
        let tip = hand.middle_finger_tip();
        let horizontal = (tip.x - wrist.x).abs();
        let vertical = (tip.y - wrist.y).abs();
        if vertical > self.thresholds.wave_vertical && horizontal > self.thresholds.wave_horizontal
        {
            state.register_wave_tick(now)
        } else {
            false
        }
    }

    /// Hand above a head-level line: fingertip above wrist, wrist above
    /// the y-threshold, fingertip roughly over the wrist.
    fn is_raised_hand(&self, hand: &HandLandmarks) -> bool {
        let wrist = hand.wrist();
        let tip = hand.middle_finger_tip();
        tip.y < wrist.y
            && wrist.y < self.thresholds.raised_hand_y
            && (tip.x - wrist.x).abs() < self.thresholds.raised_hand_x
    }

    fn is_hand_on_mouth(&self, hand: &HandLandmarks, pose: &PoseLandmarks) -> bool {
        hand.wrist().distance_2d(&pose.nose()) < self.thresholds.hand_mouth_distance
    }

    fn is_crossed_hands(&self, left: &HandLandmarks, right: &HandLandmarks) -> bool {
        left.wrist().distance_2d(&right.wrist()) < self.thresholds.crossed_hands_distance
    }

    fn is_both_hands_up(&self, left: &HandLandmarks, right: &HandLandmarks) -> bool {
        let (lw, rw) = (left.wrist(), right.wrist());
        lw.y < self.thresholds.both_hands_y
            && rw.y < self.thresholds.both_hands_y
            && (lw.x - rw.x).abs() < self.thresholds.both_hands_x
    }

    /// Thumb held straight up: tip above the interphalangeal joint and
    /// nearly vertical.
    fn is_help_sign(&self, hand: &HandLandmarks) -> bool {
        let tip = hand.thumb_tip();
        let ip = hand.thumb_ip();
        tip.y < ip.y && (tip.x - ip.x).abs() < self.thresholds.help_sign_x
    }
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new(GestureThresholds::default())
    }
}
