use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use facial_expression::config::config::AppConfig;
use facial_expression::modules::action_unit::ActionUnitClassifier;
use facial_expression::modules::face_detection_client::CascadeFaceDetector;
use facial_expression::modules::face_landmark_client::LbfLandmarkPredictor;
use facial_expression::modules::summary::ExpressionSummary;
use facial_expression::pipeline::frame_loop::{Camera, DisplayWindow, FrameLoop, Termination};
use facial_expression::pipeline::pipeline::ExpressionPipeline;
use log::{info, warn, LevelFilter};

/// Label facial expressions on a live webcam feed. Press Esc to quit.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Optional settings JSON (defaults to the built-in thresholds and paths).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to the 68-point LBF landmark model.
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Path to the frontal face Haar cascade.
    #[arg(long)]
    cascade: Option<PathBuf>,

    /// Camera device index.
    #[arg(long)]
    camera: Option<i32>,

    /// Stop after this many frames.
    #[arg(long)]
    max_frames: Option<u64>,

    /// Write one JSON line per classified face to this file.
    #[arg(long)]
    summary: Option<PathBuf>,
}

impl Args {
    fn apply(self, config: &mut AppConfig) {
        if let Some(model) = self.model {
            config.landmarks.model_path = model;
        }
        if let Some(cascade) = self.cascade {
            config.detector.cascade_path = cascade;
        }
        if let Some(camera) = self.camera {
            config.capture.camera_index = camera;
        }
        if self.max_frames.is_some() {
            config.capture.max_frames = self.max_frames;
        }
        if self.summary.is_some() {
            config.summary_path = self.summary;
        }
    }
}

fn init_logging(default_filter: LevelFilter) {
    let builder_result = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter.as_str()),
    )
    .try_init();

    if builder_result.is_err() {
        // Logger already initialized; nothing to do.
    }
}

fn main() -> Result<()> {
    init_logging(LevelFilter::Info);
    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref()).context("failed to load settings")?;
    match args.config.as_ref() {
        Some(path) => info!("Loaded settings from {}", path.display()),
        None => info!("Using built-in settings"),
    }
    args.apply(&mut config);

    info!("Preparing the program");
    let detector =
        CascadeFaceDetector::new(config.detector.clone()).context("failed to load face detector")?;
    let predictor = LbfLandmarkPredictor::new(config.landmarks.clone())
        .context("failed to load landmark predictor")?;
    let pipeline = ExpressionPipeline::new(
        detector,
        predictor,
        ActionUnitClassifier::new(config.action_units.clone()),
    );

    if config.capture.warmup_secs > 0 {
        thread::sleep(Duration::from_secs(config.capture.warmup_secs));
    }

    info!("Starting camera {}", config.capture.camera_index);
    let camera = Camera::open(config.capture.camera_index).context("failed to open camera")?;
    let window =
        DisplayWindow::open(&config.capture.window_title).context("failed to open display")?;

    let mut frame_loop = FrameLoop::new(camera, window, pipeline, &config.capture);
    if let Some(path) = config.summary_path.as_deref() {
        let summary = ExpressionSummary::create(path)
            .with_context(|| format!("failed to create summary {}", path.display()))?;
        frame_loop = frame_loop.with_summary(summary);
    }

    match frame_loop.run().context("frame loop failed")? {
        Termination::OperatorExit => info!("Exit requested by operator"),
        Termination::FrameLimit(frames) => info!("Stopped after {frames} frames"),
        Termination::DeviceFailure(reason) => {
            warn!("Capture device failed: {reason}");
            anyhow::bail!("capture device failed: {reason}");
        }
    }
    Ok(())
}
