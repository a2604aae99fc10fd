//! Wiring between frame intake, detection and the overlay.
//!
//! Frames are processed one at a time on a dedicated detection worker, and
//! the overlay lives on its own presentation thread. The worker hands each
//! rendered shape to the presentation thread and waits for it to be applied
//! before taking the next frame, so the overlay always reflects frames in
//! arrival order.

mod config;
mod error;
mod presentation;
mod runner;

pub use config::{
    DEFAULT_FLASH_DURATION, DEFAULT_HIDE_DELAY, OverlayMode, ParseOverlayModeError,
    PipelineBuilder, PipelineConfig,
};
pub use error::PipelineError;
pub use presentation::{PresentationHandle, spawn_presentation};
pub use runner::{DetectionPipeline, FrameOutcome, PipelineReport, PipelineStats, RunningPipeline};
