//! Built-in rectangle finder working on the luma plane.
//!
//! Steps:
//! 1. Optional Gaussian smoothing (high accuracy only).
//! 2. Global Otsu binarisation, bright regions as foreground.
//! 3. Outer contour tracing of each foreground region.
//! 4. Douglas-Peucker polygon approximation with a tolerance relative to
//!    the contour perimeter; only convex four-gons survive.
//! 5. Scoring by how close every interior angle is to 90°.

use std::borrow::Cow;

use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};
use imageproc::contrast::{ThresholdType, otsu_level, threshold};
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometry::approximate_polygon_dp;
use imageproc::point::Point as PixelPoint;
use thiserror::Error;

use crate::capture::ImageBuffer;
use crate::geometry::{DetectedQuadrilateral, Point, Quadrilateral};

use super::{DetectorConfig, Feature, FeatureDetector, RectangleFeature};

/// Regions covering more than this share of the frame are the background.
const MAX_AREA_FRACTION: f32 = 0.95;

/// Error type for the contour detector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectorError {
    #[error("cannot search an empty {width}x{height} frame")]
    EmptyFrame { width: u32, height: u32 },
}

/// Contour-based rectangle detector.
#[derive(Debug, Clone, Default)]
pub struct ContourDetector {
    config: DetectorConfig,
}

impl ContourDetector {
    /// Create a new detector with the given configuration.
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Rectangles found in `image`, largest first, at most `max_features` of them.
    pub fn rectangles(&self, image: &ImageBuffer) -> Result<Vec<RectangleFeature>, DetectorError> {
        let pixels = image.pixels();
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(DetectorError::EmptyFrame { width, height });
        }

        let smoothed: Cow<'_, GrayImage> = match self.config.accuracy.blur_sigma() {
            Some(sigma) => Cow::Owned(gaussian_blur_f32(pixels, sigma)),
            None => Cow::Borrowed(pixels),
        };
        let mask = binarize(&smoothed);

        let frame_area = width as f32 * height as f32;
        let min_area = self.config.min_area_fraction * frame_area;
        let max_area = MAX_AREA_FRACTION * frame_area;
        let tolerance = self.config.accuracy.approx_tolerance();

        let mut found: Vec<RectangleFeature> = find_contours::<i32>(&mask)
            .into_iter()
            .filter(|contour| matches!(contour.border_type, BorderType::Outer))
            .filter_map(|contour| quad_from_contour(&contour.points, tolerance))
            .filter(|quad| {
                let area = quad.area();
                area >= min_area && area <= max_area
            })
            .map(|quad| RectangleFeature::new(quad, right_angle_score(&quad)))
            .filter(|feature| feature.confidence >= self.config.min_confidence)
            .collect();

        found.sort_by(|a, b| b.quad.area().total_cmp(&a.quad.area()));
        found.truncate(self.config.max_features);

        log::trace!(
            "{}x{} frame: {} rectangle(s) above threshold",
            width,
            height,
            found.len()
        );
        Ok(found)
    }
}

impl FeatureDetector for ContourDetector {
    type Error = DetectorError;

    fn features(&self, image: &ImageBuffer) -> Result<Vec<Feature>, Self::Error> {
        Ok(self
            .rectangles(image)?
            .into_iter()
            .map(Feature::Rectangle)
            .collect())
    }
}

/// Foreground (255) wherever the pixel is brighter than the Otsu level.
fn binarize(image: &GrayImage) -> GrayImage {
    threshold(image, otsu_level(image), ThresholdType::Binary)
}

/// Reduce a closed contour to a labeled convex quadrilateral, if it is one.
fn quad_from_contour(points: &[PixelPoint<i32>], tolerance: f64) -> Option<DetectedQuadrilateral> {
    if points.len() < 4 {
        return None;
    }
    let epsilon = tolerance * perimeter(points);
    if epsilon <= 0.0 {
        return None;
    }

    // Split the loop at the point farthest from the start so that neither
    // half is a closed curve.
    let start = points[0];
    let split = points
        .iter()
        .enumerate()
        .max_by_key(|(_, p)| (p.x - start.x).pow(2) + (p.y - start.y).pow(2))
        .map(|(i, _)| i)?;
    if split == 0 {
        return None;
    }

    let mut second_half = points[split..].to_vec();
    second_half.push(start);

    let mut vertices = approximate_polygon_dp(&points[..=split], epsilon, false);
    vertices.pop();
    let mut tail = approximate_polygon_dp(&second_half, epsilon, false);
    tail.pop();
    vertices.extend(tail);

    let vertices = merge_close(&vertices, epsilon);
    let corners = <[Point; 4]>::try_from(vertices).ok()?;
    let quad = label_corners(corners);
    quad.is_convex().then_some(quad)
}

fn perimeter(points: &[PixelPoint<i32>]) -> f64 {
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| (((b.x - a.x).pow(2) + (b.y - a.y).pow(2)) as f64).sqrt())
        .sum()
}

/// Drop vertices within `min_dist` of the previously kept one, wrapping around.
fn merge_close(vertices: &[PixelPoint<i32>], min_dist: f64) -> Vec<Point> {
    let mut kept: Vec<Point> = Vec::with_capacity(vertices.len());
    for v in vertices {
        let p = Point::new(v.x as f32, v.y as f32);
        match kept.last() {
            Some(last) if (f64::from(nalgebra::distance(last, &p))) < min_dist => {}
            _ => kept.push(p),
        }
    }
    while kept.len() > 1 {
        let (first, last) = (kept[0], kept[kept.len() - 1]);
        if f64::from(nalgebra::distance(&first, &last)) < min_dist {
            kept.pop();
        } else {
            break;
        }
    }
    kept
}

/// Label corners tl, tr, br, bl in image axes (x right, y down).
fn label_corners(points: [Point; 4]) -> DetectedQuadrilateral {
    let cx = points.iter().map(|p| p.x).sum::<f32>() / 4.0;
    let cy = points.iter().map(|p| p.y).sum::<f32>() / 4.0;

    // With y pointing down, increasing angle walks clockwise on screen.
    let mut ordered = points;
    ordered.sort_by(|a, b| {
        let ta = (a.y - cy).atan2(a.x - cx);
        let tb = (b.y - cy).atan2(b.x - cx);
        ta.total_cmp(&tb)
    });
    let top_left = (0..4)
        .min_by(|&i, &j| {
            (ordered[i].x + ordered[i].y).total_cmp(&(ordered[j].x + ordered[j].y))
        })
        .unwrap_or(0);
    ordered.rotate_left(top_left);

    Quadrilateral::new(ordered[0], ordered[1], ordered[2], ordered[3])
}

/// 1 for a perfect rectangle, falling towards 0 as corners deviate from 90°.
fn right_angle_score(quad: &DetectedQuadrilateral) -> f32 {
    let c = quad.corners();
    let mut deviation = 0.0;
    for i in 0..4 {
        let prev = c[(i + 3) % 4] - c[i];
        let next = c[(i + 1) % 4] - c[i];
        let norms = prev.norm() * next.norm();
        if norms <= f32::EPSILON {
            return 0.0;
        }
        deviation += (prev.dot(&next) / norms).abs();
    }
    (1.0 - deviation / 4.0).clamp(0.0, 1.0)
}
