//! Four-corner shapes tagged with the coordinate space they live in.

use std::marker::PhantomData;

use super::{Point, Rect};

/// Marker for detector (image pixel, sensor-oriented) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DetectorSpace;

/// Marker for presentation (view) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewSpace;

/// Quadrilateral with labeled corners.
///
/// The labels are the ones reported by whoever produced the shape; they are
/// not recomputed from the point positions. Traversal order for drawing is
/// always top-left, top-right, bottom-right, bottom-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadrilateral<S> {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_right: Point,
    pub bottom_left: Point,
    space: PhantomData<S>,
}

/// Quadrilateral as reported by a rectangle detector.
pub type DetectedQuadrilateral = Quadrilateral<DetectorSpace>;

/// Quadrilateral ready to be drawn on the presentation surface.
pub type PresentationQuadrilateral = Quadrilateral<ViewSpace>;

impl<S> Quadrilateral<S> {
    /// Create a quadrilateral from its labeled corners.
    pub fn new(top_left: Point, top_right: Point, bottom_right: Point, bottom_left: Point) -> Self {
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
            space: PhantomData,
        }
    }

    /// Corners in drawing order: tl, tr, br, bl.
    #[inline]
    pub fn corners(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// Shoelace area; positive when the corners wind counter-clockwise in a y-up frame.
    pub fn signed_area(&self) -> f32 {
        let c = self.corners();
        let mut acc = 0.0;
        for i in 0..4 {
            let a = c[i];
            let b = c[(i + 1) % 4];
            acc += a.x * b.y - b.x * a.y;
        }
        acc / 2.0
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.signed_area().abs()
    }

    pub fn bounding_rect(&self) -> Rect {
        Rect::enclosing(&self.corners()).unwrap_or_default()
    }

    /// Whether the closed path tl→tr→br→bl→tl has no self-intersection
    /// and encloses a non-zero area.
    pub fn is_simple(&self) -> bool {
        let [a, b, c, d] = self.corners();
        if self.area() <= f32::EPSILON {
            return false;
        }
        // Only opposite edges can cross in a four-sided path.
        !segments_cross(&a, &b, &c, &d) && !segments_cross(&b, &c, &d, &a)
    }

    /// Whether every turn along the path has the same handedness.
    pub fn is_convex(&self) -> bool {
        let c = self.corners();
        let mut sign = 0.0f32;
        for i in 0..4 {
            let turn = cross(&c[i], &c[(i + 1) % 4], &c[(i + 2) % 4]);
            if turn.abs() <= f32::EPSILON {
                return false;
            }
            if sign == 0.0 {
                sign = turn.signum();
            } else if turn.signum() != sign {
                return false;
            }
        }
        true
    }
}

/// z-component of (a - o) × (b - o).
#[inline]
fn cross(o: &Point, a: &Point, b: &Point) -> f32 {
    (a - o).perp(&(b - o))
}

/// Proper crossing test for segments p1p2 and p3p4.
fn segments_cross(p1: &Point, p2: &Point, p3: &Point, p4: &Point) -> bool {
    let d1 = cross(p3, p4, p1);
    let d2 = cross(p3, p4, p2);
    let d3 = cross(p1, p2, p3);
    let d4 = cross(p1, p2, p4);
    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}
