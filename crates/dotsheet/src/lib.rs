//! High-level facade crate for the `dotsheet-*` workspace.
//!
//! This crate provides:
//! - stable, convenient re-exports of the underlying crates
//! - (feature-gated) helpers that run the detector on `image` buffers
//! - (feature-gated) the `dotsheet` command line tool
//!
//! ## Quickstart
//!
//! ```no_run
//! use dotsheet::detect;
//! use dotsheet::{CalibrationCache, DetectorConfig, GeometryMemory, PaperDetector, PrecomputedBlobs};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let detector = PaperDetector::new(DetectorConfig::load_json("config.json")?)?;
//! let img = detect::load_rgb("frame.png")?;
//! let blobs: PrecomputedBlobs = serde_json::from_str(&std::fs::read_to_string("blobs.json")?)?;
//!
//! let mut cache = CalibrationCache::new();
//! let out = detect::detect_image(&detector, &img, &blobs, &[], &GeometryMemory::new(), &mut cache);
//! for page in &out.pages {
//!     println!("sheet {} at {:?}", page.id, page.points);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `dotsheet::core`: geometry, homographies, image views, calibration.
//! - `dotsheet::code`: palette classification and the corner code table.
//! - `dotsheet::detector`: the per-frame pipeline and sheet tracking.
//! - `dotsheet::detect` (feature `image`): helpers for `image::RgbImage`.

pub use dotsheet_code as code;
pub use dotsheet_core as core;
pub use dotsheet_detector as detector;

pub use dotsheet_code::{Corner, CornerCode, Palette};
pub use dotsheet_core::{CalibrationCache, Keypoint, KnobPoints, Rgb, RgbImageView};
pub use dotsheet_detector::{
    BlobDetector, DebugPage, DetectorConfig, FrameDetection, FrameReport, GeometryMemory, Marker,
    Page, PaperDetector, PrecomputedBlobs,
};

#[cfg(feature = "image")]
pub mod detect;
