//! Per-frame detection of dot-coded paper sheets.
//!
//! Pipeline:
//! - sample the color of every blob and build a proximity graph,
//! - find 7-dot corner shapes and decode them against the code table,
//! - reconstruct each sheet from its visible corners plus the geometry
//!   remembered from earlier frames,
//! - locate dark object markers resting on the reconstructed sheets.
//!
//! Blob detection is not part of this crate; feed keypoints through
//! [`PaperDetector::detect_from_keypoints`] or plug a [`BlobDetector`].

mod error;
mod graph;
mod io;
mod markers;
mod memory;
mod overlay;
mod params;
mod pipeline;
mod regions;
mod result;
mod sampling;
mod shapes;
mod tracker;

pub use error::ConfigError;
pub use graph::NeighborGraph;
pub use io::{FrameReport, IoError};
pub use markers::locate_markers;
pub use memory::{mirror_relations, CornerRelation, GeometryMemory, PairTable};
pub use overlay::{Overlay, OverlayItem};
pub use params::{
    DetectorConfig, GraphParams, MarkerParams, OverlayFlags, ShapeParams, ShapeStrategy,
    TrackerParams,
};
pub use pipeline::{BlobDetector, BlobQuery, FrameInput, PaperDetector, PrecomputedBlobs};
pub use regions::{
    connected_regions, convex_hull, external_regions, min_area_rect, Region, RotatedRect,
};
pub use result::{DebugPage, FrameDetection, KeypointInfo, Marker, Page};
pub use sampling::sample_dot_color;
pub use shapes::{
    decode_shapes, finder_for, CornerObservation, DecodedShape, FrameCorners, RightAngleFinder,
    Shape, ShapeFinder, TerminalPointFinder,
};
pub use tracker::{build_page, resolve_sheets, ResolvedSheet};
