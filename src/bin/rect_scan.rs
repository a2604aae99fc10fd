use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use rectscan::{
    Accuracy, CandidateSelection, ContourDetector, DetectorConfig, ImageDirSource, LogPresenter,
    OverlayMode, PipelineBuilder,
};

/// Run rectangle detection over a directory of images and log the overlay.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
struct Args {
    /// Directory of frames, read in file-name order.
    dir: PathBuf,
    /// Presentation surface width in points.
    #[arg(long, default_value_t = 390.0)]
    view_width: f32,
    /// Presentation surface height in points.
    #[arg(long, default_value_t = 844.0)]
    view_height: f32,
    /// Candidate rendered when a frame has several: first, last, largest, most-confident.
    #[arg(long, default_value = "last")]
    selection: CandidateSelection,
    /// Overlay shape: quad or rect.
    #[arg(long, default_value = "quad")]
    mode: OverlayMode,
    /// Milliseconds a detection stays visible.
    #[arg(long, default_value_t = 2000)]
    hide_delay_ms: u64,
    /// Frames buffered for the detector before the oldest is dropped.
    #[arg(long, default_value_t = 1)]
    queue: usize,
    /// Frames per second to replay at; 0 replays as fast as possible.
    #[arg(long, default_value_t = 30)]
    fps: u32,
    /// Rectangles reported per frame by the detector.
    #[arg(long, default_value_t = 1)]
    max_features: usize,
    /// Skip smoothing and accept rougher shapes.
    #[arg(long, default_value_t = false)]
    low_accuracy: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut source = ImageDirSource::open(&args.dir)
        .with_context(|| format!("cannot open frame directory {}", args.dir.display()))?;
    if args.fps > 0 {
        source = source.with_frame_interval(Duration::from_secs(1) / args.fps);
    }
    log::info!("{} frame(s) in {}", source.remaining(), args.dir.display());

    let detector = ContourDetector::new(DetectorConfig {
        accuracy: if args.low_accuracy {
            Accuracy::Low
        } else {
            Accuracy::High
        },
        max_features: args.max_features,
        ..DetectorConfig::default()
    });

    let report = PipelineBuilder::new()
        .view_size(args.view_width, args.view_height)
        .selection(args.selection)
        .overlay_mode(args.mode)
        .hide_delay(Duration::from_millis(args.hide_delay_ms))
        .frame_queue_capacity(args.queue)
        .build(detector)
        .run(&mut source, LogPresenter::new())?;

    let stats = report.stats;
    let presenter = report.overlay.presenter();
    println!("frames processed:  {}", stats.processed);
    println!("frames dropped:    {}", stats.dropped);
    println!("missing buffer:    {}", stats.missing_buffer);
    println!("degenerate view:   {}", stats.degenerate_view);
    println!("no detection:      {}", stats.no_detection);
    println!("rendered:          {}", stats.rendered);
    println!("overlay shows:     {}", presenter.shown());
    println!("overlay hides:     {}", presenter.hidden());

    Ok(())
}
