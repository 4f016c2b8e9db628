//! HerWatch analysis kernel
//!
//! This crate implements the detection-and-alert core of a women's-safety
//! video analysis system: per-frame person detection, gender tallying,
//! distress gesture recognition, and debounced alert emission.
//!
//! # Architecture
//!
//! The pipeline is a straight line per frame:
//!
//! 1. **Detect**: a `PersonDetector` backend proposes raw boxes; only
//!    confident, well-formed person boxes survive.
//! 2. **Classify**: a `GenderClassifier` labels each person's face region;
//!    failures degrade to `Unknown`, never abort the frame.
//! 3. **Analyze**: `FrameAnalyzer` applies the Lone-Woman, More-Men, and
//!    gesture rules against the stream's own `DebounceState`.
//! 4. **Emit**: debounced `AlertEvent`s come back to the caller; the
//!    kernel never persists or transports them itself.
//!
//! All mutable state lives in the per-stream `DebounceState`; the analysis
//! layer is deterministic given observations, a clock, and that state.
//!
//! # Module Structure
//!
//! - `frame`: raw frame container
//! - `detect`: detector trait seams plus stub backends
//! - `analysis`: debouncing, gesture geometry, per-frame orchestrator
//! - `ingest`: frame sources (local files, stub synthetic streams)
//! - `stream`: stream sessions, file jobs, demo injection
//! - `config`: defaults, JSON config file, environment overrides

use anyhow::{anyhow, Result};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Deserialize;

pub mod alert;
pub mod analysis;
pub mod config;
pub mod detect;
pub mod frame;
pub mod ingest;
pub mod stream;

pub use alert::{AlertDetail, AlertEvent, AlertKind, GestureKind};
pub use analysis::{
    Cooldowns, DebounceState, FrameAnalyzer, FrameObservations, GenderTally, GestureRecognizer,
    GestureThresholds, PersonObservation,
};
pub use config::{AnalysisConfig, DemoSettings, DetectionSettings, SamplingSettings};
pub use detect::{
    Gender, GenderClassifier, LandmarkEstimator, LandmarkSet, PersonDetector, StubGenderClassifier,
    StubLandmarkEstimator, StubPersonDetector,
};
pub use frame::Frame;
pub use ingest::{FileSource, FrameSource, SourceStats};
pub use stream::{DemoInjector, RunStats, StreamSession, VideoJob};

// -------------------- Night Gating --------------------

const DEFAULT_NIGHT_START_HOUR: u8 = 19;
const DEFAULT_NIGHT_END_HOUR: u8 = 6;

/// Hours treated as night for the Lone-Woman rule.
///
/// A window whose start is later than its end wraps midnight: the default
/// (19, 6) covers 19:00 through 06:59.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NightHours {
    pub start_hour: u8,
    pub end_hour: u8,
}

impl Default for NightHours {
    fn default() -> Self {
        Self {
            start_hour: DEFAULT_NIGHT_START_HOUR,
            end_hour: DEFAULT_NIGHT_END_HOUR,
        }
    }
}

impl NightHours {
    pub fn validate(&self) -> Result<()> {
        if self.start_hour > 23 || self.end_hour > 23 {
            return Err(anyhow!("night hours must be within 0-23"));
        }
        Ok(())
    }

    /// Whether `hour` falls inside the night window.
    pub fn contains(&self, hour: u8) -> bool {
        if self.start_hour > self.end_hour {
            hour >= self.start_hour || hour <= self.end_hour
        } else {
            hour >= self.start_hour && hour <= self.end_hour
        }
    }
}

/// Where the Lone-Woman rule gets its hour-of-day.
///
/// Live streams use the system clock; file jobs take a fixed time of day
/// so a recorded clip analyzes the same way every run.
#[derive(Clone, Copy, Debug)]
pub enum NightSource {
    SystemClock,
    TimeOfDay { hour: u8, minute: u8 },
}

impl NightSource {
    pub fn is_night(&self, window: &NightHours) -> Result<bool> {
        let hour = match self {
            NightSource::SystemClock => current_utc_hour()?,
            NightSource::TimeOfDay { hour, .. } => *hour,
        };
        Ok(window.contains(hour))
    }
}

fn current_utc_hour() -> Result<u8> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    Ok(((now / 3600) % 24) as u8)
}

/// Parse a wall-clock `"HH:MM"` string into (hour, minute).
pub fn parse_time_of_day(value: &str) -> Result<(u8, u8)> {
    // Compile once for hot paths.
    static TIME_RE: OnceLock<regex::Regex> = OnceLock::new();
    let re = TIME_RE
        .get_or_init(|| regex::Regex::new(r"^([01]?\d|2[0-3]):([0-5]\d)$").unwrap());

    let caps = re
        .captures(value.trim())
        .ok_or_else(|| anyhow!("time of day must match HH:MM (24-hour), got {:?}", value))?;
    let hour: u8 = caps[1].parse()?;
    let minute: u8 = caps[2].parse()?;
    Ok((hour, minute))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_night_window_wraps_midnight() {
        let window = NightHours::default();
        assert!(window.contains(19));
        assert!(window.contains(23));
        assert!(window.contains(0));
        assert!(window.contains(6));
        assert!(!window.contains(7));
        assert!(!window.contains(12));
        assert!(!window.contains(18));
    }

    #[test]
    fn non_wrapping_window_is_inclusive() {
        let window = NightHours {
            start_hour: 1,
            end_hour: 5,
        };
        assert!(window.contains(1));
        assert!(window.contains(5));
        assert!(!window.contains(0));
        assert!(!window.contains(6));
    }

    #[test]
    fn fixed_time_of_day_gates_the_night_rule() {
        let window = NightHours::default();
        let night = NightSource::TimeOfDay { hour: 22, minute: 30 };
        assert!(night.is_night(&window).unwrap());
        let day = NightSource::TimeOfDay { hour: 14, minute: 0 };
        assert!(!day.is_night(&window).unwrap());
    }

    #[test]
    fn time_of_day_parsing() {
        assert_eq!(parse_time_of_day("22:30").unwrap(), (22, 30));
        assert_eq!(parse_time_of_day("09:05").unwrap(), (9, 5));
        assert_eq!(parse_time_of_day("0:00").unwrap(), (0, 0));
        assert!(parse_time_of_day("24:00").is_err());
        assert!(parse_time_of_day("12:60").is_err());
        assert!(parse_time_of_day("noon").is_err());
        assert!(parse_time_of_day("").is_err());
    }

    #[test]
    fn out_of_range_night_hours_are_rejected() {
        let window = NightHours {
            start_hour: 24,
            end_hour: 6,
        };
        assert!(window.validate().is_err());
        assert!(NightHours::default().validate().is_ok());
    }
}
