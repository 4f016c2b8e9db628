//! Stub detector backends for tests and the synthetic demo pipeline.
//!
//! The person stub hashes pixels to approximate "someone moved" and emits a
//! single centered person box on change. All three stubs also accept a
//! scripted sequence of results, which is what the scenario tests use.

use std::collections::VecDeque;

use anyhow::Result;
use sha2::{Digest, Sha256};

use super::gender::{Gender, GenderClassifier};
use super::landmarks::{LandmarkEstimator, LandmarkSet};
use super::person::{BoundingBox, ObjectClass, PersonDetector, RawDetection};

/// Stub person detector. Without a script, emits one person detection
/// whenever the frame content hash changes.
pub struct StubPersonDetector {
    last_hash: Option<[u8; 32]>,
    script: VecDeque<Vec<RawDetection>>,
}

impl StubPersonDetector {
    pub fn new() -> Self {
        Self {
            last_hash: None,
            script: VecDeque::new(),
        }
    }

    /// Scripted mode: return the given results frame by frame, then empty.
    pub fn with_script(script: Vec<Vec<RawDetection>>) -> Self {
        Self {
            last_hash: None,
            script: script.into(),
        }
    }
}

impl Default for StubPersonDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl PersonDetector for StubPersonDetector {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<RawDetection>> {
        if let Some(step) = self.script.pop_front() {
            return Ok(step);
        }

        let current_hash: [u8; 32] = Sha256::digest(pixels).into();
        let changed = match self.last_hash {
            Some(prev) => prev != current_hash,
            None => false,
        };
        self.last_hash = Some(current_hash);

        if !changed {
            return Ok(vec![]);
        }

        let (w, h) = (width as f32, height as f32);
        Ok(vec![RawDetection {
            bbox: BoundingBox::new(w * 0.375, h * 0.125, w * 0.625, h * 0.875),
            class: ObjectClass::Person,
            confidence: 0.85,
        }])
    }
}

/// Stub gender classifier. Without a script, answers a fixed label.
pub struct StubGenderClassifier {
    fixed: (Gender, f32),
    script: VecDeque<(Gender, f32)>,
}

impl StubGenderClassifier {
    pub fn new(gender: Gender, confidence: f32) -> Self {
        Self {
            fixed: (gender, confidence),
            script: VecDeque::new(),
        }
    }

    /// Scripted mode: answer the given results in order, then the fallback.
    pub fn with_script(fallback: (Gender, f32), script: Vec<(Gender, f32)>) -> Self {
        Self {
            fixed: fallback,
            script: script.into(),
        }
    }
}

impl GenderClassifier for StubGenderClassifier {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn classify(
        &mut self,
        _pixels: &[u8],
        _width: u32,
        _height: u32,
        _region: &BoundingBox,
    ) -> Result<(Gender, f32)> {
        Ok(self.script.pop_front().unwrap_or(self.fixed))
    }
}

/// Stub landmark estimator. Returns scripted landmark sets, then all-absent.
pub struct StubLandmarkEstimator {
    script: VecDeque<LandmarkSet>,
}

impl StubLandmarkEstimator {
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
        }
    }

    pub fn with_script(script: Vec<LandmarkSet>) -> Self {
        Self {
            script: script.into(),
        }
    }
}

impl Default for StubLandmarkEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl LandmarkEstimator for StubLandmarkEstimator {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn estimate(&mut self, _pixels: &[u8], _width: u32, _height: u32) -> Result<LandmarkSet> {
        Ok(self.script.pop_front().unwrap_or_default())
    }
}
