use anyhow::Result;

/// Axis-aligned bounding box in pixel coordinates.
///
/// Invariant: `x1 < x2` and `y1 < y2`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    pub fn is_valid(&self) -> bool {
        self.x1 < self.x2 && self.y1 < self.y2
    }

    /// Face region of a person box: the top `ratio` fraction of its height,
    /// full width. Gender classification runs on this crop.
    pub fn face_region(&self, ratio: f32) -> BoundingBox {
        BoundingBox {
            x1: self.x1,
            y1: self.y1,
            x2: self.x2,
            y2: self.y1 + self.height() * ratio,
        }
    }
}

/// Object class reported by a person detector.
///
/// The pipeline only acts on `Person`; everything else is carried through
/// so backends can report their full class set.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectClass {
    Person,
    Other,
}

/// One raw detection from a person-detector backend.
#[derive(Clone, Debug)]
pub struct RawDetection {
    pub bbox: BoundingBox,
    pub class: ObjectClass,
    pub confidence: f32,
}

/// Person-detector backend trait.
///
/// Implementations wrap an external object detector (YOLO-class model or
/// similar). The pixel slice is read-only and ephemeral; implementations
/// must not retain it beyond the `detect` call.
pub trait PersonDetector: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Run detection on a frame.
    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<RawDetection>>;

    /// Optional warm-up hook.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Keep person-class detections above the confidence threshold with a
/// well-formed box. Everything else is discarded here, before any gender
/// classification runs.
pub fn filter_persons(detections: Vec<RawDetection>, min_confidence: f32) -> Vec<RawDetection> {
    detections
        .into_iter()
        .filter(|det| {
            det.class == ObjectClass::Person
                && det.confidence > min_confidence
                && det.bbox.is_valid()
        })
        .collect()
}
