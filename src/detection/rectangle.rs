use crate::capture::ImageBuffer;

use super::{ContourDetector, DetectorConfig, Feature, FeatureDetector, RectangleFeature};

/// Per-frame rectangle extractor on top of a feature backend.
///
/// Non-rectangle features are filtered out and backend failures are treated
/// as an empty result: a frame without rectangles is not an error.
pub struct RectangleDetector<D> {
    backend: D,
}

impl<D: FeatureDetector> RectangleDetector<D> {
    pub fn new(backend: D) -> Self {
        Self { backend }
    }

    /// Rectangle candidates in backend order. Empty on failure.
    pub fn detect(&self, image: &ImageBuffer) -> Vec<RectangleFeature> {
        match self.backend.features(image) {
            Ok(features) => features
                .into_iter()
                .filter_map(Feature::into_rectangle)
                .collect(),
            Err(err) => {
                log::debug!("rectangle detection failed, treating as empty: {}", err);
                Vec::new()
            }
        }
    }

    pub fn backend(&self) -> &D {
        &self.backend
    }
}

impl RectangleDetector<ContourDetector> {
    /// Detector backed by the built-in contour finder.
    pub fn with_config(config: DetectorConfig) -> Self {
        Self::new(ContourDetector::new(config))
    }
}

impl Default for RectangleDetector<ContourDetector> {
    fn default() -> Self {
        Self::with_config(DetectorConfig::default())
    }
}
