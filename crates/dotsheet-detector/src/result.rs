use std::time::Duration;

use dotsheet_core::{unit_square_to_quad, Homography, Keypoint, Quad, Rgb};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::memory::GeometryMemory;
use crate::overlay::OverlayItem;

/// Per-keypoint attributes decoded during one frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeypointInfo {
    pub keypoint: Keypoint,
    /// White-balanced mean color of the dot.
    pub color: Rgb,
    /// Palette index: from the shape decode when the dot is part of a decoded
    /// shape, else the nearest palette color.
    pub color_index: Option<usize>,
    /// Index into the frame's decoded shapes.
    pub shape: Option<usize>,
}

/// A located sheet, in calibrated unit-square coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: u32,
    /// Corners, top-left, top-right, bottom-right, bottom-left.
    pub points: Quad,
    /// Unit square -> `points`.
    pub forward: Homography,
    /// `points` -> unit square (sheet-local coordinates).
    pub inverse: Homography,
    /// Corners seen this frame; the others were predicted from memory.
    pub observed: [bool; 4],
    /// Injected by the caller rather than detected.
    pub debug: bool,
}

impl Page {
    /// Returns `None` for a degenerate quad.
    pub fn from_unit_points(id: u32, points: Quad, observed: [bool; 4], debug: bool) -> Option<Self> {
        let forward = unit_square_to_quad(&points)?;
        Some(Self {
            id,
            points,
            forward,
            inverse: forward.adjugate(),
            observed,
            debug,
        })
    }

    /// Unit-square point -> sheet-local coordinates.
    #[inline]
    pub fn to_local(&self, p: Point2<f32>) -> Point2<f32> {
        self.inverse.apply(p)
    }
}

/// A dark object resting on a sheet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub page_id: u32,
    /// Center of the minimum-area bounding rectangle, unit-square space.
    pub global_center: Point2<f32>,
    /// Rectangle vertices in consecutive order, unit-square space.
    pub global_points: Quad,
    pub local_center: Point2<f32>,
    pub local_points: Quad,
    /// Pixel count of the region, holes included.
    pub area: f32,
}

/// A caller-supplied sheet, corners in normalized video coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DebugPage {
    pub id: u32,
    pub points: Quad,
}

/// Everything one frame produced.
#[derive(Clone, Debug, Serialize)]
pub struct FrameDetection {
    /// Keypoints in ascending x order.
    pub keypoints: Vec<KeypointInfo>,
    /// Detected pages in ascending id order, then debug pages.
    pub pages: Vec<Page>,
    pub markers: Vec<Marker>,
    /// Memory to pass into the next frame.
    pub memory: GeometryMemory,
    pub elapsed: Duration,
    /// `1 / elapsed`, frames per second.
    pub frame_rate: f32,
    pub overlay: Vec<OverlayItem>,
}

impl FrameDetection {
    pub fn page(&self, id: u32) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == id && !p.debug)
    }

    pub fn markers_on(&self, id: u32) -> impl Iterator<Item = &Marker> + '_ {
        self.markers.iter().filter(move |m| m.page_id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn page_local_coordinates() {
        let points = [
            Point2::new(0.2, 0.2),
            Point2::new(0.6, 0.2),
            Point2::new(0.6, 0.5),
            Point2::new(0.2, 0.5),
        ];
        let page = Page::from_unit_points(1, points, [true; 4], false).expect("page");
        let c = page.to_local(Point2::new(0.4, 0.35));
        assert_abs_diff_eq!(c.x, 0.5, epsilon = 1e-5);
        assert_abs_diff_eq!(c.y, 0.5, epsilon = 1e-5);

        let tl = page.forward.apply(Point2::new(0.0, 0.0));
        assert_abs_diff_eq!(tl.x, 0.2, epsilon = 1e-5);
    }

    #[test]
    fn degenerate_page_is_rejected() {
        let p = Point2::new(0.3, 0.3);
        assert!(Page::from_unit_points(1, [p; 4], [true; 4], false).is_none());
    }
}
