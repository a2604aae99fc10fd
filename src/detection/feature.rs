//! Trait for vision backends that report features found in a frame.

use crate::capture::ImageBuffer;
use crate::geometry::{DetectedQuadrilateral, Rect};

/// A quadrilateral found by a detector together with its confidence in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectangleFeature {
    pub quad: DetectedQuadrilateral,
    pub confidence: f32,
}

impl RectangleFeature {
    pub fn new(quad: DetectedQuadrilateral, confidence: f32) -> Self {
        Self { quad, confidence }
    }
}

/// Generic result of a feature detector.
///
/// Backends may report several kinds of features for the same frame; only
/// `Rectangle` takes part in the overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Feature {
    Rectangle(RectangleFeature),
    Text(RectangleFeature),
    QrCode(RectangleFeature),
}

impl Feature {
    /// The rectangle payload, if this is a rectangle feature.
    pub fn into_rectangle(self) -> Option<RectangleFeature> {
        match self {
            Feature::Rectangle(feature) => Some(feature),
            Feature::Text(_) | Feature::QrCode(_) => None,
        }
    }

    /// Axis-aligned bounds of the feature in detector coordinates.
    pub fn bounds(&self) -> Rect {
        match self {
            Feature::Rectangle(f) | Feature::Text(f) | Feature::QrCode(f) => f.quad.bounding_rect(),
        }
    }
}

/// Trait for feature detection backends.
///
/// Implement this trait to plug any vision library into the pipeline. A
/// detector is constructed once and must not keep per-frame state: calling
/// `features` twice on the same buffer yields the same result.
///
/// # Example
///
/// ```ignore
/// use rectscan::{Feature, FeatureDetector, ImageBuffer};
///
/// struct MyDetector {
///     // Your backend here
/// }
///
/// impl FeatureDetector for MyDetector {
///     type Error = std::io::Error;
///
///     fn features(&self, image: &ImageBuffer) -> Result<Vec<Feature>, Self::Error> {
///         // Run the backend and convert its results
///         Ok(vec![])
///     }
/// }
/// ```
pub trait FeatureDetector {
    /// Error type for detection failures.
    type Error: std::fmt::Display;

    /// Run detection on one frame.
    ///
    /// # Arguments
    /// * `image` - Frame pixels; only borrowed for the duration of the call
    ///
    /// # Returns
    /// The features in the order the backend reports them, or an error.
    fn features(&self, image: &ImageBuffer) -> Result<Vec<Feature>, Self::Error>;
}

impl<F, E> FeatureDetector for F
where
    F: Fn(&ImageBuffer) -> Result<Vec<Feature>, E>,
    E: std::fmt::Display,
{
    type Error = E;

    fn features(&self, image: &ImageBuffer) -> Result<Vec<Feature>, E> {
        self(image)
    }
}
