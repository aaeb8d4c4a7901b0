//! JSON configuration, memory persistence and frame reports.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::memory::GeometryMemory;
use crate::params::DetectorConfig;
use crate::result::{FrameDetection, Marker, Page};

#[derive(thiserror::Error, Debug)]
pub enum IoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DetectorConfig {
    /// Load a JSON config from disk. Missing fields take their defaults.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

impl GeometryMemory {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        let json = serde_json::to_string(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Serializable summary of one frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub keypoints: usize,
    /// Keypoints that are part of a decoded shape.
    pub decoded_keypoints: usize,
    pub pages: Vec<Page>,
    pub markers: Vec<Marker>,
    pub elapsed_ms: f64,
    pub frame_rate: f32,
}

impl FrameReport {
    pub fn from_detection(detection: &FrameDetection) -> Self {
        Self {
            keypoints: detection.keypoints.len(),
            decoded_keypoints: detection
                .keypoints
                .iter()
                .filter(|k| k.shape.is_some())
                .count(),
            pages: detection.pages.clone(),
            markers: detection.markers.clone(),
            elapsed_ms: detection.elapsed.as_secs_f64() * 1000.0,
            frame_rate: detection.frame_rate,
        }
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
