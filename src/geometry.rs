//! Points, rectangles and quadrilaterals shared by the detector, the mapper
//! and the overlay.

mod quad;
mod rect;
mod size;

/// 2D point in either detector or view coordinates.
pub type Point = nalgebra::Point2<f32>;

pub use quad::{
    DetectedQuadrilateral, DetectorSpace, PresentationQuadrilateral, Quadrilateral, ViewSpace,
};
pub use rect::Rect;
pub use size::Size;
