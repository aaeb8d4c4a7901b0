//! Core types for dot-coded sheet detection.
//!
//! Geometry, image views and the camera/surface calibration shared by the
//! code and detector crates. Nothing in here knows about dot codes.

mod calibration;
mod geom;
mod homography;
mod image;
mod keypoint;
mod logger;

pub use calibration::{CalibrationCache, KnobPoints, PixelRect, SurfaceMapping};
pub use geom::{
    angle_diff_abs, centroid, cross, heading, point_in_quad, shrink_quad, unit, vertex_angle,
    wrap_angle, Quad,
};
pub use homography::{homography_from_4pt, unit_square_to_quad, Homography, UNIT_SQUARE};
pub use image::{GrayImage, GrayImageView, Rgb, RgbImageView};
pub use keypoint::Keypoint;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
