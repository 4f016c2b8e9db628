use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::person::BoundingBox;

/// Gender label produced by the classifier.
///
/// `Unknown` covers classifier failure and below-threshold confidence; it
/// never contributes to the frame gender tally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "Male"),
            Gender::Female => write!(f, "Female"),
            Gender::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Gender-classifier backend trait.
///
/// Implementations wrap an external image classifier. `region` selects the
/// crop (typically a face region derived from a person box); coordinates
/// are pixel coordinates within the frame.
pub trait GenderClassifier: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Classify the cropped region. Returns the label with its confidence
    /// in `[0, 1]`.
    fn classify(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
        region: &BoundingBox,
    ) -> Result<(Gender, f32)>;
}

/// Classify a region, recovering classifier failure as `(Unknown, 0.0)`.
///
/// A failed classification excludes that person from the tally but must
/// never abort frame analysis; the failure is reported as a soft warning.
pub fn classify_region_soft(
    classifier: &mut dyn GenderClassifier,
    pixels: &[u8],
    width: u32,
    height: u32,
    region: &BoundingBox,
) -> (Gender, f32) {
    match classifier.classify(pixels, width, height, region) {
        Ok((gender, confidence)) => (gender, confidence.clamp(0.0, 1.0)),
        Err(e) => {
            log::warn!("gender classification failed, counting as Unknown: {}", e);
            (Gender::Unknown, 0.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    struct FailingClassifier;

    impl GenderClassifier for FailingClassifier {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn classify(
            &mut self,
            _pixels: &[u8],
            _width: u32,
            _height: u32,
            _region: &BoundingBox,
        ) -> Result<(Gender, f32)> {
            Err(anyhow!("model exploded"))
        }
    }

    #[test]
    fn failure_recovers_as_unknown() {
        let mut classifier = FailingClassifier;
        let region = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let (gender, confidence) = classify_region_soft(&mut classifier, &[], 640, 480, &region);
        assert_eq!(gender, Gender::Unknown);
        assert_eq!(confidence, 0.0);
    }
}
