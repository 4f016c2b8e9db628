//! Detector trait seams and stub backends.
//!
//! Everything the core pipeline knows about the external models lives
//! behind three traits: person detection, gender classification, and
//! landmark estimation. Real model bindings implement these; the stubs
//! here back tests and the synthetic demo pipeline.

mod gender;
mod landmarks;
mod person;
mod stub;

pub use gender::{classify_region_soft, Gender, GenderClassifier};
pub use landmarks::{
    HandLandmarks, LandmarkEstimator, LandmarkSet, Point, PoseLandmarks, HAND_LANDMARK_COUNT,
    HAND_MIDDLE_FINGER_TIP, HAND_THUMB_IP, HAND_THUMB_TIP, HAND_WRIST, POSE_LANDMARK_COUNT,
    POSE_NOSE,
};
pub use person::{filter_persons, BoundingBox, ObjectClass, PersonDetector, RawDetection};
pub use stub::{StubGenderClassifier, StubLandmarkEstimator, StubPersonDetector};
