//! Camera-to-surface calibration.
//!
//! Four "knob" points, given in normalized video coordinates (`0..1` on both
//! axes), mark where the corners of the projection surface appear in the
//! camera image. Everything the detector reports lives in the unit square
//! spanned by those knobs.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::geom::Quad;
use crate::homography::{unit_square_to_quad, Homography};

/// Knob points in normalized video coordinates, TL, TR, BR, BL.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KnobPoints(pub Quad);

impl Default for KnobPoints {
    fn default() -> Self {
        Self(crate::homography::UNIT_SQUARE)
    }
}

impl KnobPoints {
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|p| p.x.is_finite() && p.y.is_finite())
    }

    /// Axis-aligned pixel bounding box of the knobs, clamped to the frame.
    pub fn pixel_roi(&self, width: usize, height: usize) -> PixelRect {
        let (w, h) = (width as f32, height as f32);
        let xs = self.0.map(|p| p.x.clamp(0.0, 1.0) * w);
        let ys = self.0.map(|p| p.y.clamp(0.0, 1.0) * h);
        let min_x = xs.iter().copied().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().copied().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        PixelRect {
            x: min_x.floor() as usize,
            y: min_y.floor() as usize,
            width: (max_x.ceil() - min_x.floor()) as usize,
            height: (max_y.ceil() - min_y.floor()) as usize,
        }
    }
}

/// Integer pixel rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl PixelRect {
    pub fn contains(&self, p: Point2<f32>) -> bool {
        p.x >= self.x as f32
            && p.y >= self.y as f32
            && p.x < (self.x + self.width) as f32
            && p.y < (self.y + self.height) as f32
    }
}

/// Maps between video pixels and the calibrated unit square.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceMapping {
    width: f32,
    height: f32,
    /// Unit square -> normalized video coordinates.
    knob_from_unit: Homography,
    /// Normalized video coordinates -> unit square (adjugate of the above).
    unit_from_knob: Homography,
}

impl SurfaceMapping {
    /// Build the mapping. Returns `None` for degenerate (collinear) knobs.
    pub fn new(knobs: &KnobPoints, width: usize, height: usize) -> Option<Self> {
        let knob_from_unit = unit_square_to_quad(&knobs.0)?;
        Some(Self {
            width: width as f32,
            height: height as f32,
            knob_from_unit,
            unit_from_knob: knob_from_unit.adjugate(),
        })
    }

    /// Pixel -> unit square.
    #[inline]
    pub fn to_unit(&self, p: Point2<f32>) -> Point2<f32> {
        self.unit_from_knob
            .apply(Point2::new(p.x / self.width, p.y / self.height))
    }

    /// Normalized video coordinates -> unit square.
    #[inline]
    pub fn normalized_to_unit(&self, p: Point2<f32>) -> Point2<f32> {
        self.to_unit(Point2::new(p.x * self.width, p.y * self.height))
    }

    /// Unit square -> pixel.
    #[inline]
    pub fn to_pixel(&self, p: Point2<f32>) -> Point2<f32> {
        let v = self.knob_from_unit.apply(p);
        Point2::new(v.x * self.width, v.y * self.height)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct CacheKey {
    knobs: KnobPoints,
    width: usize,
    height: usize,
}

/// Caller-owned memo of the surface mapping.
///
/// The mapping is rebuilt only when the knob points or the frame size change.
#[derive(Clone, Debug, Default)]
pub struct CalibrationCache {
    entry: Option<(CacheKey, Option<SurfaceMapping>)>,
    rebuilds: usize,
}

impl CalibrationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapping for the given calibration, rebuilt on key change.
    pub fn mapping(
        &mut self,
        knobs: &KnobPoints,
        width: usize,
        height: usize,
    ) -> Option<SurfaceMapping> {
        let key = CacheKey {
            knobs: *knobs,
            width,
            height,
        };
        match &self.entry {
            Some((cached, mapping)) if *cached == key => *mapping,
            _ => {
                let mapping = SurfaceMapping::new(knobs, width, height);
                if mapping.is_none() {
                    log::warn!("degenerate knob points {:?}", knobs.0);
                }
                self.rebuilds += 1;
                self.entry = Some((key, mapping));
                mapping
            }
        }
    }

    /// How many times the mapping has been (re)computed.
    pub fn rebuilds(&self) -> usize {
        self.rebuilds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn skewed_knobs() -> KnobPoints {
        KnobPoints([
            Point2::new(0.1, 0.05),
            Point2::new(0.9, 0.1),
            Point2::new(0.95, 0.9),
            Point2::new(0.05, 0.95),
        ])
    }

    #[test]
    fn identity_knobs_normalize_by_frame_size() {
        let m = SurfaceMapping::new(&KnobPoints::default(), 640, 480).expect("mapping");
        let u = m.to_unit(Point2::new(320.0, 120.0));
        assert_abs_diff_eq!(u.x, 0.5, epsilon = 1e-5);
        assert_abs_diff_eq!(u.y, 0.25, epsilon = 1e-5);
    }

    #[test]
    fn knob_corners_map_to_unit_square_corners() {
        let knobs = skewed_knobs();
        let m = SurfaceMapping::new(&knobs, 800, 600).expect("mapping");
        for (knob, unit) in knobs.0.iter().zip(crate::homography::UNIT_SQUARE) {
            let u = m.normalized_to_unit(*knob);
            assert_abs_diff_eq!(u.x, unit.x, epsilon = 1e-4);
            assert_abs_diff_eq!(u.y, unit.y, epsilon = 1e-4);
            let back = m.to_pixel(unit);
            assert_abs_diff_eq!(back.x, knob.x * 800.0, epsilon = 1e-2);
            assert_abs_diff_eq!(back.y, knob.y * 600.0, epsilon = 1e-2);
        }
    }

    #[test]
    fn cache_rebuilds_only_on_change() {
        let mut cache = CalibrationCache::new();
        let knobs = skewed_knobs();
        assert!(cache.mapping(&knobs, 800, 600).is_some());
        assert!(cache.mapping(&knobs, 800, 600).is_some());
        assert_eq!(cache.rebuilds(), 1);

        assert!(cache.mapping(&knobs, 1024, 768).is_some());
        assert_eq!(cache.rebuilds(), 2);

        let mut moved = knobs;
        moved.0[0].x += 0.01;
        assert!(cache.mapping(&moved, 1024, 768).is_some());
        assert_eq!(cache.rebuilds(), 3);
    }

    #[test]
    fn roi_covers_knobs() {
        let roi = skewed_knobs().pixel_roi(800, 600);
        assert_eq!(roi.x, 40);
        assert_eq!(roi.y, 30);
        assert!(roi.contains(Point2::new(400.0, 300.0)));
        assert!(!roi.contains(Point2::new(10.0, 10.0)));
    }

    #[test]
    fn roi_keeps_the_last_partial_column() {
        let knobs = KnobPoints([
            Point2::new(0.105, 0.105),
            Point2::new(0.905, 0.105),
            Point2::new(0.905, 0.905),
            Point2::new(0.105, 0.905),
        ]);
        let roi = knobs.pixel_roi(100, 100);
        assert_eq!((roi.x, roi.y), (10, 10));
        assert_eq!((roi.width, roi.height), (81, 81));
        assert!(roi.contains(Point2::new(90.4, 90.4)));
    }
}
