//! Rectangle detection for individual frames.
//!
//! Backends implement [`FeatureDetector`]; [`RectangleDetector`] narrows their
//! output to rectangle candidates and [`CandidateSelection`] picks the one
//! that gets rendered.

mod contour;
mod feature;
mod options;
mod rectangle;
mod selection;

pub use contour::{ContourDetector, DetectorError};
pub use feature::{Feature, FeatureDetector, RectangleFeature};
pub use options::{Accuracy, DetectorConfig};
pub use rectangle::RectangleDetector;
pub use selection::{CandidateSelection, ParseSelectionError};
