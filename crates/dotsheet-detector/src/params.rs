use dotsheet_code::{Palette, COLOR_COUNT};
use dotsheet_core::KnobPoints;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Neighbor graph construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphParams {
    /// Two dots are neighbors when their distance is below
    /// `distance_factor * (size_a + size_b)`.
    pub distance_factor: f32,
    /// The x-sorted sweep stops once the horizontal gap exceeds
    /// `scan_factor * size` of the left dot.
    pub scan_factor: f32,
}

impl Default for GraphParams {
    fn default() -> Self {
        Self {
            distance_factor: 0.9,
            scan_factor: 3.0,
        }
    }
}

/// How corner shapes are located in the neighbor graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeStrategy {
    /// Start from a vertex whose two neighbors form a right angle and grow
    /// both arms outwards.
    #[default]
    RightAngle,
    /// Start from a dot with exactly one neighbor and walk a 7-dot path.
    TerminalPoint,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeParams {
    pub strategy: ShapeStrategy,
    /// Accepted relative deviation of the vertex angle from 90 degrees.
    pub right_angle_tolerance: f32,
    /// Max angle (radians) between an arm candidate and the arm baseline,
    /// measured at the corner vertex.
    pub arm_angle_tolerance: f32,
    /// Shapes with `cross(p0 - p3, p6 - p3)` above this are reversed.
    pub winding_threshold: f32,
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self {
            strategy: ShapeStrategy::RightAngle,
            right_angle_tolerance: 0.10,
            arm_angle_tolerance: 0.2,
            winding_threshold: 100.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerParams {
    /// Page quads are shrunk inwards by `shrink_factor * average dot size`.
    pub shrink_factor: f32,
}

impl Default for TrackerParams {
    fn default() -> Self {
        Self {
            shrink_factor: 0.75,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerParams {
    pub enabled: bool,
    /// Gray values strictly below this are marker foreground.
    pub threshold: u8,
}

impl Default for MarkerParams {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 100,
        }
    }
}

/// Which debug primitives the pipeline emits.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayFlags {
    pub show_keypoint_circles: bool,
    pub show_keypoint_text: bool,
    pub show_component_lines: bool,
    pub show_shape_id: bool,
    pub show_program: bool,
    pub show_knob_points: bool,
}

/// Full detector configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Calibrated dot colors, red, green, blue, black by convention.
    pub palette: Palette,
    /// Expected dot diameter in pixels, one hint per palette color.
    pub dot_sizes: Vec<f32>,
    /// Projection surface corners in normalized video coordinates.
    pub knob_points: KnobPoints,
    /// Forwarded to the blob detector.
    pub scale_factor: f32,
    pub graph: GraphParams,
    pub shapes: ShapeParams,
    pub tracker: TrackerParams,
    pub markers: MarkerParams,
    pub overlay: OverlayFlags,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            dot_sizes: vec![10.0; COLOR_COUNT],
            knob_points: KnobPoints::default(),
            scale_factor: 1.0,
            graph: GraphParams::default(),
            shapes: ShapeParams::default(),
            tracker: TrackerParams::default(),
            markers: MarkerParams::default(),
            overlay: OverlayFlags::default(),
        }
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Parameter { name, value })
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.palette.len() != COLOR_COUNT {
            return Err(ConfigError::PaletteSize {
                expected: COLOR_COUNT,
                got: self.palette.len(),
            });
        }
        if self.dot_sizes.len() != self.palette.len() {
            return Err(ConfigError::DotSizeCount {
                expected: self.palette.len(),
                got: self.dot_sizes.len(),
            });
        }
        if let Some(&bad) = self
            .dot_sizes
            .iter()
            .find(|s| !s.is_finite() || **s <= 0.0)
        {
            return Err(ConfigError::DotSize(bad));
        }
        if !self.scale_factor.is_finite() || self.scale_factor <= 0.0 {
            return Err(ConfigError::ScaleFactor(self.scale_factor));
        }
        if !self.knob_points.is_finite() {
            return Err(ConfigError::KnobPoints);
        }
        positive("graph.distance_factor", self.graph.distance_factor)?;
        positive("graph.scan_factor", self.graph.scan_factor)?;
        positive(
            "shapes.right_angle_tolerance",
            self.shapes.right_angle_tolerance,
        )?;
        positive("shapes.arm_angle_tolerance", self.shapes.arm_angle_tolerance)?;
        if !self.shapes.winding_threshold.is_finite() {
            return Err(ConfigError::Parameter {
                name: "shapes.winding_threshold",
                value: self.shapes.winding_threshold,
            });
        }
        if !self.tracker.shrink_factor.is_finite() || self.tracker.shrink_factor < 0.0 {
            return Err(ConfigError::Parameter {
                name: "tracker.shrink_factor",
                value: self.tracker.shrink_factor,
            });
        }
        Ok(())
    }

    /// Mean of the per-color dot size hints.
    pub fn expected_dot_size(&self) -> f32 {
        if self.dot_sizes.is_empty() {
            return 0.0;
        }
        self.dot_sizes.iter().sum::<f32>() / self.dot_sizes.len() as f32
    }

    /// Tolerance around [`Self::expected_dot_size`] the blob detector should
    /// accept: twice the spread of the hints, at least 2 pixels.
    pub fn dot_size_tolerance(&self) -> f32 {
        let min = self.dot_sizes.iter().copied().fold(f32::INFINITY, f32::min);
        let max = self
            .dot_sizes
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max);
        if min > max {
            return 2.0;
        }
        (max - min).max(1.0) * 2.0
    }
}
