//! One-call-per-frame detection pipeline.

use std::time::Instant;

use dotsheet_code::CodeMatcher;
use dotsheet_core::{CalibrationCache, Keypoint, PixelRect, Rgb, RgbImageView};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::graph::NeighborGraph;
use crate::markers::locate_markers;
use crate::memory::GeometryMemory;
use crate::overlay::Overlay;
use crate::params::DetectorConfig;
use crate::result::{DebugPage, FrameDetection, KeypointInfo, Page};
use crate::sampling::sample_dot_color;
use crate::shapes::{decode_shapes, finder_for, FrameCorners, ShapeFinder};
use crate::tracker::{build_page, resolve_sheets};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// What the pipeline asks of a blob detector.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlobQuery {
    /// Only blobs inside this pixel rectangle are wanted.
    pub roi: PixelRect,
    pub scale_factor: f32,
    /// Expected blob diameter in pixels.
    pub expected_dot_size: f32,
    /// Accepted deviation from `expected_dot_size`.
    pub dot_size_tolerance: f32,
}

/// Source of circular blobs. Blob detection itself lives outside this crate.
pub trait BlobDetector {
    fn detect_blobs(&self, frame: &RgbImageView<'_>, query: &BlobQuery) -> Vec<Keypoint>;
}

/// Replays a recorded keypoint list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrecomputedBlobs(pub Vec<Keypoint>);

impl BlobDetector for PrecomputedBlobs {
    fn detect_blobs(&self, _frame: &RgbImageView<'_>, query: &BlobQuery) -> Vec<Keypoint> {
        self.0
            .iter()
            .filter(|kp| query.roi.contains(kp.position))
            .copied()
            .collect()
    }
}

/// One frame worth of input.
#[derive(Clone, Debug)]
pub struct FrameInput<'a> {
    pub frame: RgbImageView<'a>,
    /// Blobs in video pixel coordinates, any order.
    pub keypoints: Vec<Keypoint>,
    /// Caller-injected sheets, appended to the detected ones.
    pub debug_pages: Vec<DebugPage>,
}

/// Locates dot-coded sheets and the markers on them.
pub struct PaperDetector {
    config: DetectorConfig,
    matcher: CodeMatcher<'static>,
    finder: Box<dyn ShapeFinder>,
}

impl PaperDetector {
    pub fn new(config: DetectorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let matcher = CodeMatcher::standard(config.palette.clone());
        let finder = finder_for(&config.shapes);
        Ok(Self {
            config,
            matcher,
            finder,
        })
    }

    #[inline]
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Blob query for a frame of the given size.
    pub fn blob_query(&self, width: usize, height: usize) -> BlobQuery {
        BlobQuery {
            roi: self.config.knob_points.pixel_roi(width, height),
            scale_factor: self.config.scale_factor,
            expected_dot_size: self.config.expected_dot_size(),
            dot_size_tolerance: self.config.dot_size_tolerance(),
        }
    }

    /// Ask `blobs` for keypoints inside the knob region, then run the frame.
    pub fn detect(
        &self,
        blobs: &dyn BlobDetector,
        frame: RgbImageView<'_>,
        debug_pages: &[DebugPage],
        memory: &GeometryMemory,
        cache: &mut CalibrationCache,
    ) -> FrameDetection {
        let query = self.blob_query(frame.width, frame.height);
        let keypoints = blobs.detect_blobs(&frame, &query);
        let input = FrameInput {
            frame,
            keypoints,
            debug_pages: debug_pages.to_vec(),
        };
        self.detect_from_keypoints(&input, memory, cache)
    }

    /// Run one frame from externally detected keypoints.
    ///
    /// `memory` is the state returned by the previous frame; the updated copy
    /// comes back in [`FrameDetection::memory`].
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip_all,
            fields(width = input.frame.width, height = input.frame.height, keypoints = input.keypoints.len())
        )
    )]
    pub fn detect_from_keypoints(
        &self,
        input: &FrameInput<'_>,
        memory: &GeometryMemory,
        cache: &mut CalibrationCache,
    ) -> FrameDetection {
        let start = Instant::now();
        let cfg = &self.config;
        let frame = &input.frame;
        let palette = self.matcher.palette();

        let mut keypoints = input.keypoints.clone();
        keypoints.sort_by(|a, b| a.position.x.total_cmp(&b.position.x));

        let samples: Vec<Rgb> = keypoints
            .iter()
            .map(|kp| sample_dot_color(frame, kp))
            .collect();
        let mut infos: Vec<KeypointInfo> = keypoints
            .iter()
            .zip(&samples)
            .map(|(kp, &color)| KeypointInfo {
                keypoint: *kp,
                color,
                color_index: palette.nearest(color),
                shape: None,
            })
            .collect();

        let graph = NeighborGraph::build(&keypoints, &cfg.graph);
        let shapes = self.finder.find_shapes(&keypoints, &graph);
        let decoded = decode_shapes(&shapes, &samples, &self.matcher);
        log::debug!(
            "{} edges, {} candidate shapes, {} decoded",
            graph.edge_count(),
            shapes.len(),
            decoded.len()
        );
        for (s, d) in decoded.iter().enumerate() {
            for (&k, &color) in d.shape.iter().zip(&d.colors) {
                infos[k].color_index = Some(color as usize);
                infos[k].shape = Some(s);
            }
        }

        let corners = FrameCorners::from_decoded(&decoded, &keypoints);
        let avg_dot = corners.average_dot_size();
        let mut memory = memory.clone();
        let sheets = resolve_sheets(&corners, &mut memory);

        let mapping = if frame.width == 0 || frame.height == 0 {
            None
        } else {
            cache.mapping(&cfg.knob_points, frame.width, frame.height)
        };

        let mut pages: Vec<Page> = Vec::new();
        let mut markers = Vec::new();
        let mut overlay = Overlay::new();
        if let Some(mapping) = mapping {
            pages = sheets
                .iter()
                .filter_map(|s| build_page(s, avg_dot, cfg.tracker.shrink_factor, &mapping))
                .collect();

            if cfg.markers.enabled && !pages.is_empty() {
                let gray = frame.to_gray();
                let binary = gray.view().threshold_below(cfg.markers.threshold);
                let roi = cfg.knob_points.pixel_roi(frame.width, frame.height);
                markers = locate_markers(&binary.view(), roi, &pages, &mapping, avg_dot);
            }

            for debug in &input.debug_pages {
                let points = debug.points.map(|p| mapping.normalized_to_unit(p));
                match Page::from_unit_points(debug.id, points, [false; 4], true) {
                    Some(page) => pages.push(page),
                    None => log::debug!("debug page {}: degenerate quad", debug.id),
                }
            }

            let flags = &cfg.overlay;
            if flags.show_knob_points {
                overlay.knob_outline(&mapping);
            }
            if flags.show_program {
                for page in &pages {
                    overlay.page_outline(page, &mapping);
                }
            }
        }

        let flags = &cfg.overlay;
        if flags.show_component_lines {
            overlay.graph_edges(&graph, &keypoints);
        }
        if flags.show_keypoint_circles {
            overlay.keypoint_circles(&infos, palette);
        }
        if flags.show_keypoint_text {
            overlay.keypoint_labels(&infos);
        }
        if flags.show_shape_id {
            overlay.shape_labels(&decoded, &keypoints);
        }

        let elapsed = start.elapsed();
        let secs = elapsed.as_secs_f32();
        let frame_rate = if secs > 0.0 { 1.0 / secs } else { 0.0 };
        log::info!(
            "frame {}x{}: {} keypoints, {} sheets, {} pages, {} markers in {:.2} ms",
            frame.width,
            frame.height,
            infos.len(),
            corners.sheets.len(),
            pages.len(),
            markers.len(),
            secs * 1000.0
        );

        FrameDetection {
            keypoints: infos,
            pages,
            markers,
            memory,
            elapsed,
            frame_rate,
            overlay: overlay.into_items(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::OverlayFlags;
    use approx::assert_abs_diff_eq;
    use dotsheet_code::Palette;
    use dotsheet_core::{KnobPoints, Rgb};
    use nalgebra::Point2;

    fn white(width: usize, height: usize) -> Vec<u8> {
        vec![255; width * height * 3]
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = DetectorConfig {
            palette: Palette::new(vec![Rgb::new(0.0, 0.0, 0.0)]),
            ..DetectorConfig::default()
        };
        assert!(matches!(
            PaperDetector::new(cfg),
            Err(ConfigError::PaletteSize { got: 1, .. })
        ));
    }

    #[test]
    fn precomputed_blobs_are_clipped_to_roi() {
        let data = white(100, 100);
        let frame = RgbImageView {
            width: 100,
            height: 100,
            data: &data,
        };
        let cfg = DetectorConfig {
            knob_points: KnobPoints([
                Point2::new(0.0, 0.0),
                Point2::new(0.5, 0.0),
                Point2::new(0.5, 0.5),
                Point2::new(0.0, 0.5),
            ]),
            ..DetectorConfig::default()
        };
        let detector = PaperDetector::new(cfg).expect("detector");
        let query = detector.blob_query(100, 100);
        assert_eq!(query.roi.width, 50);
        assert_eq!(query.expected_dot_size, 10.0);

        let blobs = PrecomputedBlobs(vec![
            Keypoint::new(10.0, 10.0, 8.0),
            Keypoint::new(70.0, 10.0, 8.0),
            Keypoint::new(49.0, 49.0, 8.0),
        ]);
        let kept = blobs.detect_blobs(&frame, &query);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn empty_frame_yields_nothing_and_keeps_memory() {
        let data = white(64, 48);
        let frame = RgbImageView {
            width: 64,
            height: 48,
            data: &data,
        };
        let detector = PaperDetector::new(DetectorConfig::default()).expect("detector");
        let mut memory = GeometryMemory::new();
        memory.observe(3, 0, 1, 0.0, 50.0);
        let mut cache = CalibrationCache::new();

        let out = detector.detect(&PrecomputedBlobs::default(), frame, &[], &memory, &mut cache);
        assert!(out.keypoints.is_empty());
        assert!(out.pages.is_empty());
        assert!(out.markers.is_empty());
        assert!(out.overlay.is_empty());
        assert_eq!(out.memory, memory);
        assert!(out.frame_rate >= 0.0);
    }

    #[test]
    fn keypoints_are_sorted_and_classified() {
        let mut data = white(60, 30);
        // Solid red 10 x 10 block around (45, 15).
        for y in 10..20 {
            for x in 40..50 {
                let i = 3 * (y * 60 + x);
                data[i..i + 3].copy_from_slice(&[230, 20, 20]);
            }
        }
        let frame = RgbImageView {
            width: 60,
            height: 30,
            data: &data,
        };
        let detector = PaperDetector::new(DetectorConfig::default()).expect("detector");
        let input = FrameInput {
            frame,
            keypoints: vec![Keypoint::new(45.0, 15.0, 8.0), Keypoint::new(10.0, 15.0, 8.0)],
            debug_pages: Vec::new(),
        };
        let out = detector.detect_from_keypoints(
            &input,
            &GeometryMemory::new(),
            &mut CalibrationCache::new(),
        );
        assert_eq!(out.keypoints.len(), 2);
        assert_eq!(out.keypoints[0].keypoint.position.x, 10.0);
        assert_eq!(out.keypoints[1].color_index, Some(0));
        assert!(out.keypoints.iter().all(|k| k.shape.is_none()));
    }

    #[test]
    fn debug_pages_are_appended_in_unit_space() {
        let data = white(100, 50);
        let frame = RgbImageView {
            width: 100,
            height: 50,
            data: &data,
        };
        let cfg = DetectorConfig {
            overlay: OverlayFlags {
                show_program: true,
                ..OverlayFlags::default()
            },
            ..DetectorConfig::default()
        };
        let detector = PaperDetector::new(cfg).expect("detector");
        let debug = DebugPage {
            id: 77,
            points: [
                Point2::new(0.1, 0.2),
                Point2::new(0.6, 0.2),
                Point2::new(0.6, 0.7),
                Point2::new(0.1, 0.7),
            ],
        };
        let out = detector.detect(
            &PrecomputedBlobs::default(),
            frame,
            &[debug],
            &GeometryMemory::new(),
            &mut CalibrationCache::new(),
        );
        assert_eq!(out.pages.len(), 1);
        let page = &out.pages[0];
        assert!(page.debug);
        assert_eq!(page.observed, [false; 4]);
        assert_abs_diff_eq!(page.points[2].x, 0.6, epsilon = 1e-5);
        assert_abs_diff_eq!(page.points[2].y, 0.7, epsilon = 1e-5);
        assert!(out.page(77).is_none());
        assert_eq!(out.overlay.len(), 5);
    }
}
