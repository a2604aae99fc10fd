use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::detection::{CandidateSelection, FeatureDetector};
use crate::geometry::Size;

use super::DetectionPipeline;

/// How long a detection stays on screen without a newer one.
pub const DEFAULT_HIDE_DELAY: Duration = Duration::from_secs(2);

/// Fade in plus fade out of the capture flash.
pub const DEFAULT_FLASH_DURATION: Duration = Duration::from_millis(300);

/// What the overlay draws for a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayMode {
    /// The mapped quadrilateral itself.
    #[default]
    Quadrilateral,
    /// The axis-aligned bounds of the mapped quadrilateral.
    BoundingRect,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown overlay mode `{0}` (expected quad or rect)")]
pub struct ParseOverlayModeError(String);

impl FromStr for OverlayMode {
    type Err = ParseOverlayModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "quad" | "quadrilateral" => Ok(Self::Quadrilateral),
            "rect" | "bounding-rect" => Ok(Self::BoundingRect),
            _ => Err(ParseOverlayModeError(s.to_owned())),
        }
    }
}

impl fmt::Display for OverlayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Quadrilateral => "quad",
            Self::BoundingRect => "rect",
        })
    }
}

/// Configuration for the detection pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub hide_delay: Duration,
    pub flash_duration: Duration,
    pub selection: CandidateSelection,
    pub overlay_mode: OverlayMode,
    /// Frames waiting for the detector before the oldest is discarded.
    pub frame_queue_capacity: usize,
    /// Initial view size. Zero until the view has been laid out.
    pub view_size: Size,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            hide_delay: DEFAULT_HIDE_DELAY,
            flash_duration: DEFAULT_FLASH_DURATION,
            selection: CandidateSelection::Last,
            overlay_mode: OverlayMode::Quadrilateral,
            frame_queue_capacity: 1,
            view_size: Size::default(),
        }
    }
}

/// Builder for assembling a `DetectionPipeline`.
#[derive(Debug, Clone, Default)]
pub struct PipelineBuilder {
    config: PipelineConfig,
}

impl PipelineBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how long a detection stays visible.
    pub fn hide_delay(mut self, delay: Duration) -> Self {
        self.config.hide_delay = delay;
        self
    }

    /// Set the total capture flash duration.
    pub fn flash_duration(mut self, duration: Duration) -> Self {
        self.config.flash_duration = duration;
        self
    }

    /// Set the policy for frames with several candidates.
    pub fn selection(mut self, selection: CandidateSelection) -> Self {
        self.config.selection = selection;
        self
    }

    /// Set what the overlay draws.
    pub fn overlay_mode(mut self, mode: OverlayMode) -> Self {
        self.config.overlay_mode = mode;
        self
    }

    /// Set the frame queue capacity.
    pub fn frame_queue_capacity(mut self, capacity: usize) -> Self {
        self.config.frame_queue_capacity = capacity;
        self
    }

    /// Set the initial view size in WH format.
    pub fn view_size(mut self, width: f32, height: f32) -> Self {
        self.config.view_size = Size::new(width, height);
        self
    }

    /// The configuration assembled so far.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Build the final `DetectionPipeline` around `detector`.
    pub fn build<D: FeatureDetector>(self, detector: D) -> DetectionPipeline<D> {
        DetectionPipeline::new(detector, self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_builder() {
        let builder = PipelineBuilder::new()
            .hide_delay(Duration::from_millis(500))
            .selection(CandidateSelection::Largest)
            .overlay_mode(OverlayMode::BoundingRect)
            .frame_queue_capacity(3)
            .view_size(390.0, 844.0);

        let config = builder.config();
        assert_eq!(config.hide_delay, Duration::from_millis(500));
        assert_eq!(config.flash_duration, DEFAULT_FLASH_DURATION);
        assert_eq!(config.selection, CandidateSelection::Largest);
        assert_eq!(config.overlay_mode, OverlayMode::BoundingRect);
        assert_eq!(config.frame_queue_capacity, 3);
        assert_eq!(config.view_size, Size::new(390.0, 844.0));
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.hide_delay, Duration::from_secs(2));
        assert_eq!(config.selection, CandidateSelection::Last);
        assert!(config.view_size.is_degenerate());
    }

    #[test]
    fn test_parse_overlay_mode() {
        assert_eq!("rect".parse::<OverlayMode>(), Ok(OverlayMode::BoundingRect));
        assert_eq!("Quad".parse::<OverlayMode>(), Ok(OverlayMode::Quadrilateral));
        assert!("circle".parse::<OverlayMode>().is_err());
    }
}
