//! Detector space to presentation space.
//!
//! The capture pipeline reports image extents with width and height
//! exchanged relative to the view, because the sensor is mounted rotated by
//! 90° against the display. Mapping therefore:
//!
//! 1. treats `extent.height` as the effective width and `extent.width` as the
//!    effective height,
//! 2. scales uniformly by `min(view.w / eff.w, view.h / eff.h)` (aspect fit),
//! 3. swaps the axes of every corner: `(x, y) -> (y * s, x * s)`,
//! 4. shifts the corner labels one step: detector tl becomes view bl, tr
//!    becomes tl, br becomes tr and bl becomes br.
//!
//! The label shift is a cyclic rotation, so the drawing order
//! tl→tr→br→bl still traces a simple closed path.

use crate::geometry::{DetectedQuadrilateral, Point, PresentationQuadrilateral, Quadrilateral, Size};

/// Maps detected quadrilaterals onto a view of a given size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    view: Size,
}

impl CoordinateMapper {
    /// Create a mapper for a view of the given size.
    pub fn new(view: Size) -> Self {
        Self { view }
    }

    /// Get the view size this mapper targets.
    pub fn view(&self) -> Size {
        self.view
    }

    /// Aspect-fit scale for an image of `extent`, or `None` when either the
    /// view or the image has no usable area.
    pub fn scale_for(&self, extent: Size) -> Option<f32> {
        let effective = extent.swapped();
        if self.view.is_degenerate() || effective.is_degenerate() {
            return None;
        }
        let scale = (self.view.width / effective.width).min(self.view.height / effective.height);
        scale.is_finite().then_some(scale)
    }

    /// Map `quad`, detected in an image of `extent`, into view coordinates.
    ///
    /// Returns `None` instead of garbage when no scale can be computed; the
    /// frame should then not be rendered.
    pub fn map(
        &self,
        quad: &DetectedQuadrilateral,
        extent: Size,
    ) -> Option<PresentationQuadrilateral> {
        let scale = self.scale_for(extent)?;
        let project = |p: &Point| Point::new(p.y * scale, p.x * scale);

        Some(Quadrilateral::new(
            project(&quad.top_right),
            project(&quad.bottom_right),
            project(&quad.bottom_left),
            project(&quad.top_left),
        ))
    }
}
