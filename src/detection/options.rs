/// Trade-off between detection speed and how closely a shape must match a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Accuracy {
    Low,
    #[default]
    High,
}

impl Accuracy {
    /// Polygon approximation tolerance as a fraction of the contour perimeter.
    pub(crate) fn approx_tolerance(self) -> f64 {
        match self {
            Accuracy::Low => 0.04,
            Accuracy::High => 0.02,
        }
    }

    /// Gaussian pre-blur sigma; `None` skips the blur.
    pub(crate) fn blur_sigma(self) -> Option<f32> {
        match self {
            Accuracy::Low => None,
            Accuracy::High => Some(1.0),
        }
    }
}

/// Configuration for the contour rectangle detector.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub accuracy: Accuracy,
    /// Smallest accepted quadrilateral area, as a fraction of the frame area.
    pub min_area_fraction: f32,
    /// Smallest accepted confidence in `[0, 1]`.
    pub min_confidence: f32,
    /// Maximum number of rectangles reported per frame, largest first.
    pub max_features: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            accuracy: Accuracy::High,
            min_area_fraction: 0.05,
            min_confidence: 0.6,
            max_features: 1,
        }
    }
}
