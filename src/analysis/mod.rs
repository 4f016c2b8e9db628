//! The detection-and-alert core: debouncing, gesture geometry, and the
//! per-frame orchestrator. Everything here is deterministic and free of
//! I/O; the stream layer feeds it observations and a time source.

mod analyzer;
mod debounce;
mod gesture;

pub use analyzer::{
    gesture_event, FrameAnalyzer, FrameObservations, GenderTally, PersonObservation,
};
pub use debounce::{Cooldowns, DebounceState};
pub use gesture::{GestureRecognizer, GestureThresholds};
