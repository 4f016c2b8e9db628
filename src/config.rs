use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;

use crate::analysis::{Cooldowns, GestureThresholds};
use crate::NightHours;

const DEFAULT_PERSON_CONFIDENCE: f32 = 0.4;
const DEFAULT_GENDER_CONFIDENCE: f32 = 0.6;
const DEFAULT_FACE_HEIGHT_RATIO: f32 = 0.6;
const DEFAULT_MIN_FACE_SIZE_PX: f32 = 50.0;
const DEFAULT_SOURCE_URL: &str = "stub://front_camera";
const DEFAULT_SOURCE_FPS: u32 = 10;
const DEFAULT_SOURCE_WIDTH: u32 = 640;
const DEFAULT_SOURCE_HEIGHT: u32 = 480;
const DEFAULT_FRAME_SKIP: u32 = 3;
const DEFAULT_MAX_FRAMES: u64 = 1000;
const DEFAULT_DEMO_LONE_WOMAN_EVERY: u64 = 30;
const DEFAULT_DEMO_GESTURE_EVERY: u64 = 45;

#[derive(Debug, Deserialize, Default)]
struct AnalysisConfigFile {
    detection: Option<DetectionConfigFile>,
    cooldowns: Option<Cooldowns>,
    gestures: Option<GestureThresholds>,
    source: Option<SourceConfigFile>,
    sampling: Option<SamplingConfigFile>,
    night: Option<NightHours>,
    demo: Option<DemoConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct DetectionConfigFile {
    person_confidence: Option<f32>,
    gender_confidence: Option<f32>,
    face_height_ratio: Option<f32>,
    min_face_size_px: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
struct SourceConfigFile {
    url: Option<String>,
    target_fps: Option<u32>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct SamplingConfigFile {
    frame_skip: Option<u32>,
    max_frames: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct DemoConfigFile {
    enabled: Option<bool>,
    lone_woman_every: Option<u64>,
    gesture_every: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub detection: DetectionSettings,
    pub cooldowns: Cooldowns,
    pub gestures: GestureThresholds,
    pub source: SourceSettings,
    pub sampling: SamplingSettings,
    pub night: NightHours,
    pub demo: DemoSettings,
}

#[derive(Debug, Clone, Copy)]
pub struct DetectionSettings {
    /// Person detections at or below this confidence are discarded.
    pub person_confidence: f32,
    /// Gender classifications at or below this confidence count as Unknown.
    pub gender_confidence: f32,
    /// Fraction of the person box height treated as the face region.
    pub face_height_ratio: f32,
    /// Face regions smaller than this on either axis skip classification.
    pub min_face_size_px: f32,
}

#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub url: String,
    pub target_fps: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct SamplingSettings {
    /// Analyze every Nth frame.
    pub frame_skip: u32,
    /// Hard cap on analyzed frames for file-based jobs.
    pub max_frames: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct DemoSettings {
    /// Synthetic alert injection. Off unless explicitly enabled.
    pub enabled: bool,
    pub lone_woman_every: u64,
    pub gesture_every: u64,
}

impl AnalysisConfig {
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("HERWATCH_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: AnalysisConfigFile) -> Self {
        let detection = DetectionSettings {
            person_confidence: file
                .detection
                .as_ref()
                .and_then(|d| d.person_confidence)
                .unwrap_or(DEFAULT_PERSON_CONFIDENCE),
            gender_confidence: file
                .detection
                .as_ref()
                .and_then(|d| d.gender_confidence)
                .unwrap_or(DEFAULT_GENDER_CONFIDENCE),
            face_height_ratio: file
                .detection
                .as_ref()
                .and_then(|d| d.face_height_ratio)
                .unwrap_or(DEFAULT_FACE_HEIGHT_RATIO),
            min_face_size_px: file
                .detection
                .as_ref()
                .and_then(|d| d.min_face_size_px)
                .unwrap_or(DEFAULT_MIN_FACE_SIZE_PX),
        };
        let source = SourceSettings {
            url: file
                .source
                .as_ref()
                .and_then(|s| s.url.clone())
                .unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string()),
            target_fps: file
                .source
                .as_ref()
                .and_then(|s| s.target_fps)
                .unwrap_or(DEFAULT_SOURCE_FPS),
            width: file
                .source
                .as_ref()
                .and_then(|s| s.width)
                .unwrap_or(DEFAULT_SOURCE_WIDTH),
            height: file
                .source
                .as_ref()
                .and_then(|s| s.height)
                .unwrap_or(DEFAULT_SOURCE_HEIGHT),
        };
        let sampling = SamplingSettings {
            frame_skip: file
                .sampling
                .as_ref()
                .and_then(|s| s.frame_skip)
                .unwrap_or(DEFAULT_FRAME_SKIP),
            max_frames: file
                .sampling
                .as_ref()
                .and_then(|s| s.max_frames)
                .unwrap_or(DEFAULT_MAX_FRAMES),
        };
        let demo = DemoSettings {
            enabled: file
                .demo
                .as_ref()
                .and_then(|d| d.enabled)
                .unwrap_or(false),
            lone_woman_every: file
                .demo
                .as_ref()
                .and_then(|d| d.lone_woman_every)
                .unwrap_or(DEFAULT_DEMO_LONE_WOMAN_EVERY),
            gesture_every: file
                .demo
                .as_ref()
                .and_then(|d| d.gesture_every)
                .unwrap_or(DEFAULT_DEMO_GESTURE_EVERY),
        };
        Self {
            detection,
            cooldowns: file.cooldowns.unwrap_or_default(),
            gestures: file.gestures.unwrap_or_default(),
            source,
            sampling,
            night: file.night.unwrap_or_default(),
            demo,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("HERWATCH_SOURCE_URL") {
            if !url.trim().is_empty() {
                self.source.url = url;
            }
        }
        if let Ok(value) = std::env::var("HERWATCH_PERSON_CONFIDENCE") {
            self.detection.person_confidence = value
                .parse()
                .map_err(|_| anyhow!("HERWATCH_PERSON_CONFIDENCE must be a number"))?;
        }
        if let Ok(value) = std::env::var("HERWATCH_GENDER_CONFIDENCE") {
            self.detection.gender_confidence = value
                .parse()
                .map_err(|_| anyhow!("HERWATCH_GENDER_CONFIDENCE must be a number"))?;
        }
        if let Ok(value) = std::env::var("HERWATCH_FRAME_SKIP") {
            self.sampling.frame_skip = value
                .parse()
                .map_err(|_| anyhow!("HERWATCH_FRAME_SKIP must be a positive integer"))?;
        }
        if let Ok(value) = std::env::var("HERWATCH_MAX_FRAMES") {
            self.sampling.max_frames = value
                .parse()
                .map_err(|_| anyhow!("HERWATCH_MAX_FRAMES must be a positive integer"))?;
        }
        if let Ok(value) = std::env::var("HERWATCH_NIGHT_START") {
            self.night.start_hour = value
                .parse()
                .map_err(|_| anyhow!("HERWATCH_NIGHT_START must be an hour (0-23)"))?;
        }
        if let Ok(value) = std::env::var("HERWATCH_NIGHT_END") {
            self.night.end_hour = value
                .parse()
                .map_err(|_| anyhow!("HERWATCH_NIGHT_END must be an hour (0-23)"))?;
        }
        if let Ok(value) = std::env::var("HERWATCH_DEMO") {
            self.demo.enabled = match value.trim() {
                "1" | "true" | "on" => true,
                "0" | "false" | "off" | "" => false,
                other => return Err(anyhow!("HERWATCH_DEMO must be a boolean, got {:?}", other)),
            };
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("person_confidence", self.detection.person_confidence),
            ("gender_confidence", self.detection.gender_confidence),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(anyhow!("{} must be within [0, 1]", name));
            }
        }
        if !self.detection.face_height_ratio.is_finite()
            || self.detection.face_height_ratio <= 0.0
            || self.detection.face_height_ratio > 1.0
        {
            return Err(anyhow!("face_height_ratio must be within (0, 1]"));
        }
        if !self.detection.min_face_size_px.is_finite() || self.detection.min_face_size_px < 0.0 {
            return Err(anyhow!("min_face_size_px must be non-negative"));
        }
        self.cooldowns.validate()?;
        self.gestures.validate()?;
        if self.source.target_fps == 0 {
            return Err(anyhow!("source target_fps must be greater than zero"));
        }
        if self.source.width == 0 || self.source.height == 0 {
            return Err(anyhow!("source dimensions must be greater than zero"));
        }
        if self.sampling.frame_skip == 0 {
            return Err(anyhow!("frame_skip must be at least 1"));
        }
        if self.sampling.max_frames == 0 {
            return Err(anyhow!("max_frames must be greater than zero"));
        }
        self.night.validate()?;
        if self.demo.lone_woman_every == 0 || self.demo.gesture_every == 0 {
            return Err(anyhow!("demo intervals must be greater than zero"));
        }
        Ok(())
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::from_file(AnalysisConfigFile::default())
    }
}

fn read_config_file(path: &Path) -> Result<AnalysisConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
