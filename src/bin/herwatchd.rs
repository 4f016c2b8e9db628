//! herwatchd - live stream analysis daemon
//!
//! This daemon:
//! 1. Ingests frames from the configured source
//! 2. Runs person detection, gender classification, and gesture analysis
//! 3. Emits debounced safety alerts to the log
//!
//! Backends are stubs until real model bindings are wired in; the stub
//! person detector reacts to pixel-level scene changes.

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use herwatch_kernel::ingest::file::FileConfig;
use herwatch_kernel::{
    AnalysisConfig, FileSource, FrameSource, Gender, NightSource, StreamSession,
    StubGenderClassifier, StubLandmarkEstimator, StubPersonDetector,
};

fn main() -> Result<()> {
    // Initialize logging (simple stderr for MVP)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = AnalysisConfig::load()?;

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || {
            log::info!("stop requested");
            stop.store(true, Ordering::SeqCst);
        })?;
    }

    let mut source = FileSource::new(FileConfig {
        path: cfg.source.url.clone(),
        target_fps: cfg.source.target_fps,
        width: cfg.source.width,
        height: cfg.source.height,
    })?;
    source.connect()?;

    let mut session = StreamSession::new(
        &cfg,
        Box::new(StubPersonDetector::new()),
        Box::new(StubGenderClassifier::new(Gender::Unknown, 0.0)),
        Box::new(StubLandmarkEstimator::new()),
        NightSource::SystemClock,
    );
    session.warm_up()?;

    let frame_interval = Duration::from_millis(1000 / u64::from(cfg.source.target_fps).max(1));
    let mut last_health_log = Instant::now();
    let mut alert_count = 0u64;
    let mut analyzed = 0u64;

    log::info!(
        "herwatchd running. source={} fps={} demo={}",
        cfg.source.url,
        cfg.source.target_fps,
        cfg.demo.enabled
    );

    while !stop.load(Ordering::SeqCst) {
        let Some(frame) = source.next_frame()? else {
            log::info!("source ended");
            break;
        };
        if frame.index % u64::from(cfg.sampling.frame_skip) != 0 {
            std::thread::sleep(frame_interval);
            continue;
        }

        match session.process_frame(&frame) {
            Ok(events) => {
                analyzed += 1;
                for event in events {
                    alert_count += 1;
                    log::info!(
                        "alert #{}: {} (frame {}, t={:.2}s)",
                        alert_count,
                        event.message,
                        frame.index,
                        event.at_secs
                    );
                }
            }
            Err(e) => {
                log::warn!("frame {}: analysis failed: {}", frame.index, e);
            }
        }

        if last_health_log.elapsed() >= Duration::from_secs(5) {
            let stats = source.stats();
            log::info!(
                "source health={} frames={} analyzed={} alerts={} path={}",
                source.is_healthy(),
                stats.frames_captured,
                analyzed,
                alert_count,
                stats.path
            );
            last_health_log = Instant::now();
        }

        std::thread::sleep(frame_interval);
    }

    log::info!("herwatchd stopped. {} alerts emitted", alert_count);
    Ok(())
}
