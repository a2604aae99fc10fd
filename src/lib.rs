//! Real-time rectangle detection on camera frames, mapped onto a rotated
//! presentation surface and drawn as a self-hiding overlay.
//!
//! ```no_run
//! use rectscan::{ContourDetector, LogPresenter, PipelineBuilder, SyntheticSource};
//!
//! let mut source = SyntheticSource::new(Vec::new());
//! let report = PipelineBuilder::new()
//!     .view_size(390.0, 844.0)
//!     .build(ContourDetector::default())
//!     .run(&mut source, LogPresenter::new())?;
//! println!("{:?}", report.stats);
//! # Ok::<(), rectscan::PipelineError>(())
//! ```

pub mod capture;
pub mod detection;
pub mod geometry;
pub mod mapping;
pub mod overlay;
pub mod pipeline;

pub use capture::{Frame, FrameSource, ImageBuffer, ImageDirSource, SyntheticSource};
pub use detection::{
    Accuracy, CandidateSelection, ContourDetector, DetectorConfig, Feature, FeatureDetector,
    RectangleDetector, RectangleFeature,
};
pub use geometry::{DetectedQuadrilateral, Point, PresentationQuadrilateral, Rect, Size};
pub use mapping::CoordinateMapper;
pub use overlay::{FlashPhase, LogPresenter, Overlay, OverlayPresenter, OverlayShape, OverlayState};
pub use pipeline::{
    DetectionPipeline, FrameOutcome, OverlayMode, PipelineBuilder, PipelineConfig, PipelineError,
    PipelineReport, PipelineStats, RunningPipeline,
};
