//! Stream sessions and file jobs.
//!
//! A `StreamSession` owns one stream's detectors and debounce state and
//! turns raw frames into debounced alerts. `VideoJob` drives a session
//! over a `FrameSource` with frame skipping, a frame cap, and a stop flag.
//!
//! A session MUST NOT be shared across streams: its `DebounceState` is
//! per-stream by construction.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;

use crate::alert::{AlertDetail, AlertEvent, AlertKind, GestureKind};
use crate::analysis::{
    gesture_event, DebounceState, FrameAnalyzer, FrameObservations, PersonObservation,
};
use crate::config::{AnalysisConfig, DemoSettings, DetectionSettings, SamplingSettings};
use crate::detect::{
    classify_region_soft, filter_persons, Gender, GenderClassifier, LandmarkEstimator, LandmarkSet,
    PersonDetector,
};
use crate::frame::Frame;
use crate::ingest::FrameSource;
use crate::{NightHours, NightSource};

/// Counters for one finished job.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub frames_read: u64,
    pub frames_analyzed: u64,
    pub frames_failed: u64,
    pub alerts: u64,
    pub lone_woman_alerts: u64,
    pub more_men_alerts: u64,
    pub gesture_alerts: u64,
}

impl RunStats {
    fn count_alert(&mut self, kind: AlertKind) {
        self.alerts += 1;
        match kind {
            AlertKind::LoneWoman => self.lone_woman_alerts += 1,
            AlertKind::MoreMen => self.more_men_alerts += 1,
            AlertKind::SosGesture => self.gesture_alerts += 1,
        }
    }
}

/// One stream's detectors, analyzer, and debounce state.
pub struct StreamSession {
    detector: Box<dyn PersonDetector>,
    classifier: Box<dyn GenderClassifier>,
    landmarks: Box<dyn LandmarkEstimator>,
    analyzer: FrameAnalyzer,
    state: DebounceState,
    detection: DetectionSettings,
    night_window: NightHours,
    night_source: NightSource,
    demo: Option<DemoInjector>,
}

impl StreamSession {
    pub fn new(
        config: &AnalysisConfig,
        detector: Box<dyn PersonDetector>,
        classifier: Box<dyn GenderClassifier>,
        landmarks: Box<dyn LandmarkEstimator>,
        night_source: NightSource,
    ) -> Self {
        let demo = config.demo.enabled.then(|| DemoInjector::new(config.demo));
        Self {
            detector,
            classifier,
            landmarks,
            analyzer: FrameAnalyzer::new(config.detection.gender_confidence, config.gestures),
            state: DebounceState::new(config.cooldowns),
            detection: config.detection,
            night_window: config.night,
            night_source,
            demo,
        }
    }

    /// Warm up the detector backend before the first frame.
    pub fn warm_up(&mut self) -> Result<()> {
        self.detector.warm_up()
    }

    /// Run one frame through detect, classify, and analyze.
    ///
    /// Returns the alerts the frame produced, unstamped; file jobs stamp
    /// the frame index on the way out.
    pub fn process_frame(&mut self, frame: &Frame) -> Result<Vec<AlertEvent>> {
        let raw = self
            .detector
            .detect(&frame.pixels, frame.width, frame.height)?;
        let boxes = filter_persons(raw, self.detection.person_confidence);

        let mut persons = Vec::with_capacity(boxes.len());
        for detection in boxes {
            let face = detection.bbox.face_region(self.detection.face_height_ratio);
            let (gender, confidence) = if face.width() >= self.detection.min_face_size_px
                && face.height() >= self.detection.min_face_size_px
            {
                classify_region_soft(
                    self.classifier.as_mut(),
                    &frame.pixels,
                    frame.width,
                    frame.height,
                    &face,
                )
            } else {
                // Face crop too small to classify reliably.
                (Gender::Unknown, 0.0)
            };
            persons.push(PersonObservation {
                bbox: detection.bbox,
                gender,
                confidence,
            });
        }

        let landmarks = match self.landmarks.estimate(&frame.pixels, frame.width, frame.height) {
            Ok(set) => set,
            Err(e) => {
                log::warn!("landmark estimation failed, skipping gestures: {}", e);
                LandmarkSet::default()
            }
        };

        let observations = FrameObservations { persons, landmarks };
        let night = self.night_source.is_night(&self.night_window)?;
        let now = frame.timestamp_secs;
        let mut events = self
            .analyzer
            .analyze(&observations, now, night, &mut self.state);

        if let Some(demo) = &self.demo {
            demo.inject(frame.index, now, &mut self.state, &mut events);
        }

        Ok(events)
    }
}

/// Drives a `StreamSession` over a frame source until end of stream, the
/// frame cap, or a stop request.
pub struct VideoJob {
    session: StreamSession,
    sampling: SamplingSettings,
    stop: Arc<AtomicBool>,
}

impl VideoJob {
    pub fn new(session: StreamSession, sampling: SamplingSettings) -> Self {
        Self {
            session,
            sampling,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle for requesting a stop from another thread (e.g. Ctrl-C).
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Run to completion. Analyzes every `frame_skip`-th frame, up to
    /// `max_frames` analyzed frames. A frame whose analysis fails is
    /// counted and skipped; the job keeps going.
    pub fn run(&mut self, source: &mut dyn FrameSource) -> Result<(Vec<AlertEvent>, RunStats)> {
        source.connect()?;
        self.session.warm_up()?;

        let mut stats = RunStats::default();
        let mut alerts = Vec::new();

        while !self.stop.load(Ordering::SeqCst) {
            if stats.frames_analyzed >= self.sampling.max_frames {
                log::info!("frame cap of {} reached, stopping", self.sampling.max_frames);
                break;
            }
            let Some(frame) = source.next_frame()? else {
                break;
            };
            stats.frames_read += 1;
            if frame.index % u64::from(self.sampling.frame_skip) != 0 {
                continue;
            }
            match self.session.process_frame(&frame) {
                Ok(events) => {
                    stats.frames_analyzed += 1;
                    for event in events {
                        stats.count_alert(event.kind());
                        alerts.push(event.at_frame(frame.index));
                    }
                }
                Err(e) => {
                    stats.frames_failed += 1;
                    log::warn!("frame {}: analysis failed: {}", frame.index, e);
                }
            }
        }

        log::info!(
            "job finished: {} read, {} analyzed, {} failed, {} alerts \
             (lone_woman={}, more_men={}, gesture={})",
            stats.frames_read,
            stats.frames_analyzed,
            stats.frames_failed,
            stats.alerts,
            stats.lone_woman_alerts,
            stats.more_men_alerts,
            stats.gesture_alerts
        );
        Ok((alerts, stats))
    }
}

// ----------------------------------------------------------------------------
// Demo injection (opt-in)
// ----------------------------------------------------------------------------

/// Synthetic alert injection for demos and pipeline smoke tests.
///
/// Disabled unless `demo.enabled` is set; injected alerts go through the
/// same debounce state as real ones.
#[derive(Clone, Copy, Debug)]
pub struct DemoInjector {
    settings: DemoSettings,
}

const DEMO_GESTURES: [GestureKind; 5] = [
    GestureKind::WavingHands,
    GestureKind::HandOnMouth,
    GestureKind::CrossedHands,
    GestureKind::BothHandsUp,
    GestureKind::HelpSign,
];

impl DemoInjector {
    pub fn new(settings: DemoSettings) -> Self {
        Self { settings }
    }

    /// Append synthetic alerts for this frame, if it lands on an
    /// injection interval and the debounce window allows it.
    pub fn inject(
        &self,
        frame_index: u64,
        now: f64,
        state: &mut DebounceState,
        events: &mut Vec<AlertEvent>,
    ) {
        if frame_index > 0
            && frame_index % self.settings.lone_woman_every == 0
            && state.should_fire(AlertKind::LoneWoman, now)
        {
            events.push(AlertEvent {
                at_secs: now,
                frame: None,
                message: format!("PERSON DETECTED AT NIGHT ({})", Gender::Female),
                detail: AlertDetail::LoneWoman {
                    gender: Gender::Female,
                    confidence: 0.85,
                },
            });
            state.record_fired(AlertKind::LoneWoman, now);
        }
        if frame_index > 0
            && frame_index % self.settings.gesture_every == 0
            && state.should_fire(AlertKind::SosGesture, now)
        {
            let rotation = (frame_index / self.settings.gesture_every) as usize;
            let gesture = DEMO_GESTURES[rotation % DEMO_GESTURES.len()];
            events.push(gesture_event(gesture, now));
            state.record_fired(AlertKind::SosGesture, now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{
        BoundingBox, ObjectClass, RawDetection, StubGenderClassifier, StubLandmarkEstimator,
        StubPersonDetector,
    };

    fn person_script(frames: usize) -> Vec<Vec<RawDetection>> {
        let detection = RawDetection {
            bbox: BoundingBox::new(100.0, 50.0, 300.0, 420.0),
            class: ObjectClass::Person,
            confidence: 0.9,
        };
        vec![vec![detection]; frames]
    }

    fn night_session(config: &AnalysisConfig, script: Vec<Vec<RawDetection>>) -> StreamSession {
        StreamSession::new(
            config,
            Box::new(StubPersonDetector::with_script(script)),
            Box::new(StubGenderClassifier::new(Gender::Female, 0.9)),
            Box::new(StubLandmarkEstimator::new()),
            NightSource::TimeOfDay {
                hour: 22,
                minute: 0,
            },
        )
    }

    fn frame_at(index: u64, secs: f64) -> Frame {
        Frame::new(vec![0u8; 64 * 48 * 3], 64, 48, index, secs)
    }

    #[test]
    fn session_emits_debounced_lone_woman_alerts() {
        let config = AnalysisConfig::default();
        let mut session = night_session(&config, person_script(3));

        let events = session.process_frame(&frame_at(0, 0.0)).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), AlertKind::LoneWoman);

        // Within cooldown: same scene, no alert.
        let events = session.process_frame(&frame_at(3, 0.3)).unwrap();
        assert!(events.is_empty());

        // Past cooldown: fires again.
        let events = session.process_frame(&frame_at(60, 6.0)).unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn daytime_session_stays_quiet() {
        let config = AnalysisConfig::default();
        let mut session = StreamSession::new(
            &config,
            Box::new(StubPersonDetector::with_script(person_script(1))),
            Box::new(StubGenderClassifier::new(Gender::Female, 0.9)),
            Box::new(StubLandmarkEstimator::new()),
            NightSource::TimeOfDay {
                hour: 12,
                minute: 0,
            },
        );
        let events = session.process_frame(&frame_at(0, 0.0)).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn tiny_person_box_skips_gender_classification() {
        // A 40px-wide box yields a face crop under min_face_size_px, so the
        // person counts as Unknown and the lone-woman rule never passes.
        let detection = RawDetection {
            bbox: BoundingBox::new(10.0, 10.0, 50.0, 90.0),
            class: ObjectClass::Person,
            confidence: 0.9,
        };
        let config = AnalysisConfig::default();
        let mut session = night_session(&config, vec![vec![detection]]);
        let events = session.process_frame(&frame_at(0, 0.0)).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn demo_injector_is_off_by_default() {
        let config = AnalysisConfig::default();
        assert!(!config.demo.enabled);
        let mut session = night_session(&config, vec![vec![]; 31]);
        // Frame 30 would be an injection point if demo mode were on.
        let events = session.process_frame(&frame_at(30, 3.0)).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn demo_injector_rotates_gestures_through_debounce() {
        let mut config = AnalysisConfig::default();
        config.demo.enabled = true;
        let injector = DemoInjector::new(config.demo);
        let mut state = DebounceState::new(config.cooldowns);

        let mut events = Vec::new();
        injector.inject(45, 4.5, &mut state, &mut events);
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].detail,
            AlertDetail::SosGesture {
                gesture: GestureKind::HandOnMouth,
                description: GestureKind::HandOnMouth.description().to_string(),
            }
        );

        // Next interval lands inside the shared gesture cooldown; only the
        // lone-woman injection (frame 90 is also a multiple of 30) fires.
        let mut events = Vec::new();
        injector.inject(90, 5.5, &mut state, &mut events);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), AlertKind::LoneWoman);

        // Past the cooldown the rotation continues.
        let mut events = Vec::new();
        injector.inject(135, 13.5, &mut state, &mut events);
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].detail,
            AlertDetail::SosGesture {
                gesture: GestureKind::BothHandsUp,
                description: GestureKind::BothHandsUp.description().to_string(),
            }
        );
    }

    #[test]
    fn demo_injector_emits_lone_woman_on_interval() {
        let mut config = AnalysisConfig::default();
        config.demo.enabled = true;
        let injector = DemoInjector::new(config.demo);
        let mut state = DebounceState::new(config.cooldowns);

        let mut events = Vec::new();
        injector.inject(29, 2.9, &mut state, &mut events);
        assert!(events.is_empty());
        injector.inject(30, 3.0, &mut state, &mut events);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), AlertKind::LoneWoman);
        assert_eq!(events[0].message, "PERSON DETECTED AT NIGHT (Female)");
    }
}
