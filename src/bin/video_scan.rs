//! video_scan - analyze a recorded clip and print alerts as JSON

use anyhow::Result;
use clap::Parser;

use herwatch_kernel::ingest::file::FileConfig;
use herwatch_kernel::{
    parse_time_of_day, AnalysisConfig, FileSource, Gender, NightSource, StreamSession,
    StubGenderClassifier, StubLandmarkEstimator, StubPersonDetector, VideoJob,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Local video path, or stub://<name> for a synthetic clip.
    video: String,
    /// Wall-clock time of day the clip was recorded (HH:MM, 24-hour).
    /// Defaults to the system clock.
    #[arg(long, value_name = "HH:MM")]
    time: Option<String>,
    /// Enable synthetic alert injection for pipeline smoke tests.
    #[arg(long)]
    demo: bool,
    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut cfg = AnalysisConfig::load()?;
    if args.demo {
        cfg.demo.enabled = true;
    }

    let night_source = match args.time.as_deref() {
        Some(value) => {
            let (hour, minute) = parse_time_of_day(value)?;
            NightSource::TimeOfDay { hour, minute }
        }
        None => NightSource::SystemClock,
    };

    let mut source = FileSource::new(FileConfig {
        path: args.video.clone(),
        target_fps: cfg.source.target_fps,
        width: cfg.source.width,
        height: cfg.source.height,
    })?;

    let session = StreamSession::new(
        &cfg,
        Box::new(StubPersonDetector::new()),
        Box::new(StubGenderClassifier::new(Gender::Unknown, 0.0)),
        Box::new(StubLandmarkEstimator::new()),
        night_source,
    );

    let mut job = VideoJob::new(session, cfg.sampling);
    {
        let stop = job.stop_flag();
        ctrlc::set_handler(move || {
            log::info!("stop requested");
            stop.store(true, std::sync::atomic::Ordering::SeqCst);
        })?;
    }

    let (alerts, stats) = job.run(&mut source)?;
    log::info!(
        "scanned {}: {} frames read, {} analyzed, {} alerts",
        args.video,
        stats.frames_read,
        stats.frames_analyzed,
        alerts.len()
    );

    let json = if args.pretty {
        serde_json::to_string_pretty(&alerts)?
    } else {
        serde_json::to_string(&alerts)?
    };
    println!("{}", json);
    Ok(())
}
