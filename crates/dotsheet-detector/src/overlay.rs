//! Debug drawing primitives in video pixel space.
//!
//! The detector does not draw; it emits these and the caller renders them
//! on top of the camera image.

use dotsheet_code::{Palette, CODE_LENGTH};
use dotsheet_core::{Keypoint, Rgb, SurfaceMapping, UNIT_SQUARE};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::graph::NeighborGraph;
use crate::result::{KeypointInfo, Page};
use crate::shapes::DecodedShape;

const COLOR_NAMES: [&str; 4] = ["r", "g", "b", "k"];

const RED: Rgb = Rgb::new(255.0, 0.0, 0.0);
const BLUE: Rgb = Rgb::new(0.0, 0.0, 255.0);
const WHITE: Rgb = Rgb::new(255.0, 255.0, 255.0);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverlayItem {
    Circle {
        center: Point2<f32>,
        radius: f32,
        color: Rgb,
        thickness: f32,
    },
    Line {
        from: Point2<f32>,
        to: Point2<f32>,
        color: Rgb,
        thickness: f32,
    },
    Text {
        origin: Point2<f32>,
        text: String,
        color: Rgb,
        scale: f32,
    },
}

/// Accumulates overlay items for one frame.
#[derive(Clone, Debug, Default)]
pub struct Overlay {
    items: Vec<OverlayItem>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_items(self) -> Vec<OverlayItem> {
        self.items
    }

    fn line(&mut self, from: Point2<f32>, to: Point2<f32>, color: Rgb, thickness: f32) {
        self.items.push(OverlayItem::Line {
            from,
            to,
            color,
            thickness,
        });
    }

    /// Outline of the calibrated surface.
    pub fn knob_outline(&mut self, mapping: &SurfaceMapping) {
        let corners = UNIT_SQUARE.map(|p| mapping.to_pixel(p));
        for k in 0..4 {
            self.line(corners[k], corners[(k + 1) % 4], BLUE, 1.0);
        }
    }

    /// Neighbor graph edges.
    pub fn graph_edges(&mut self, graph: &NeighborGraph, keypoints: &[Keypoint]) {
        for (a, b) in graph.edges() {
            self.line(keypoints[a].position, keypoints[b].position, RED, 2.0);
        }
    }

    /// A ring around every dot in its palette color.
    pub fn keypoint_circles(&mut self, infos: &[KeypointInfo], palette: &Palette) {
        for info in infos {
            let color = info
                .color_index
                .and_then(|i| palette.color(i))
                .unwrap_or(WHITE);
            self.items.push(OverlayItem::Circle {
                center: info.keypoint.position,
                radius: info.keypoint.size / 2.0 + 3.0,
                color,
                thickness: 2.0,
            });
        }
    }

    /// One-letter color name inside every dot.
    pub fn keypoint_labels(&mut self, infos: &[KeypointInfo]) {
        for info in infos {
            let Some(name) = info.color_index.and_then(|i| COLOR_NAMES.get(i)) else {
                continue;
            };
            self.items.push(OverlayItem::Text {
                origin: info.keypoint.position + nalgebra::Vector2::new(-6.0, 6.0),
                text: (*name).to_string(),
                color: WHITE,
                scale: 0.6,
            });
        }
    }

    /// `"<id>,<corner>"` halfway between the two arm ends of every shape.
    pub fn shape_labels(&mut self, decoded: &[DecodedShape], keypoints: &[Keypoint]) {
        for d in decoded {
            let a = keypoints[d.shape[0]].position;
            let b = keypoints[d.shape[CODE_LENGTH - 1]].position;
            self.items.push(OverlayItem::Text {
                origin: nalgebra::center(&a, &b),
                text: format!("{},{}", d.code.id, d.code.corner.short_name()),
                color: BLUE,
                scale: 0.5,
            });
        }
    }

    /// Page outline plus a line from the bottom edge to the top edge, which
    /// shows the page orientation.
    pub fn page_outline(&mut self, page: &Page, mapping: &SurfaceMapping) {
        let p = page.points.map(|q| mapping.to_pixel(q));
        for k in 0..4 {
            self.line(p[k], p[(k + 1) % 4], BLUE, 1.0);
        }
        self.line(nalgebra::center(&p[2], &p[3]), nalgebra::center(&p[0], &p[1]), BLUE, 1.0);
    }
}
