//! Typed landmark sets from a pose/hand estimator.
//!
//! Landmarks are normalized image-relative coordinates: `(x, y)` in
//! `[0, 1]`, origin top-left, y increasing downward; `z` is depth relative
//! to the estimator's reference and unused by the gesture rules. Indices
//! follow the MediaPipe holistic layout.
//!
//! Absence of a landmark group (no hand in frame, no pose lock) is a valid
//! state, modeled as `None` on `LandmarkSet` fields rather than probed
//! dynamically.

use anyhow::Result;

/// Number of landmarks per hand.
pub const HAND_LANDMARK_COUNT: usize = 21;
/// Number of pose landmarks.
pub const POSE_LANDMARK_COUNT: usize = 33;

/// Hand landmark indices used by the gesture rules.
pub const HAND_WRIST: usize = 0;
pub const HAND_THUMB_IP: usize = 3;
pub const HAND_THUMB_TIP: usize = 4;
pub const HAND_MIDDLE_FINGER_TIP: usize = 12;

/// Pose landmark indices used by the gesture rules.
pub const POSE_NOSE: usize = 0;

/// One normalized landmark point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Planar Euclidean distance (z ignored; gesture rules are 2D).
    pub fn distance_2d(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Fixed-size ordered hand landmark collection.
#[derive(Clone, Debug)]
pub struct HandLandmarks {
    points: [Point; HAND_LANDMARK_COUNT],
}

impl HandLandmarks {
    pub fn new(points: [Point; HAND_LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    pub fn wrist(&self) -> Point {
        self.points[HAND_WRIST]
    }

    pub fn middle_finger_tip(&self) -> Point {
        self.points[HAND_MIDDLE_FINGER_TIP]
    }

    pub fn thumb_tip(&self) -> Point {
        self.points[HAND_THUMB_TIP]
    }

    pub fn thumb_ip(&self) -> Point {
        self.points[HAND_THUMB_IP]
    }

    pub fn point(&self, index: usize) -> Point {
        self.points[index]
    }
}

/// Fixed-size ordered pose landmark collection.
#[derive(Clone, Debug)]
pub struct PoseLandmarks {
    points: [Point; POSE_LANDMARK_COUNT],
}

impl PoseLandmarks {
    pub fn new(points: [Point; POSE_LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    pub fn nose(&self) -> Point {
        self.points[POSE_NOSE]
    }

    pub fn point(&self, index: usize) -> Point {
        self.points[index]
    }
}

/// Landmark groups detected in one frame. Each group is independently
/// present or absent.
#[derive(Clone, Debug, Default)]
pub struct LandmarkSet {
    pub pose: Option<PoseLandmarks>,
    pub left_hand: Option<HandLandmarks>,
    pub right_hand: Option<HandLandmarks>,
}

impl LandmarkSet {
    /// True when no group was detected at all.
    pub fn is_empty(&self) -> bool {
        self.pose.is_none() && self.left_hand.is_none() && self.right_hand.is_none()
    }
}

/// Landmark-estimator backend trait.
///
/// Implementations wrap an external holistic pose/hand estimator. An
/// all-absent `LandmarkSet` is a normal result, not an error.
pub trait LandmarkEstimator: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Estimate landmarks for a frame.
    fn estimate(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<LandmarkSet>;
}
