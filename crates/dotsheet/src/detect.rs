use std::path::Path;

use crate::core::{CalibrationCache, RgbImageView};
use crate::detector::{
    BlobDetector, ConfigError, DebugPage, FrameDetection, GeometryMemory, IoError, PaperDetector,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the high-level facade helpers.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("invalid RGB image buffer length (expected {expected} bytes, got {got})")]
    InvalidRgbBuffer { expected: usize, got: usize },

    #[error("invalid RGB image dimensions (width={width}, height={height})")]
    InvalidRgbDimensions { width: u32, height: u32 },

    #[error(transparent)]
    Image(#[from] ::image::ImageError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] IoError),
}

/// Convert an `image::RgbImage` into the lightweight `dotsheet-core` view type.
pub fn rgb_view(img: &::image::RgbImage) -> RgbImageView<'_> {
    RgbImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Decode an image file of any supported format into 8-bit RGB.
pub fn load_rgb(path: impl AsRef<Path>) -> Result<::image::RgbImage, DetectError> {
    Ok(::image::open(path)?.to_rgb8())
}

/// Build an `image::RgbImage` from a raw interleaved RGB buffer.
pub fn rgb_image_from_slice(
    width: u32,
    height: u32,
    pixels: &[u8],
) -> Result<::image::RgbImage, DetectError> {
    let w = usize::try_from(width).ok();
    let h = usize::try_from(height).ok();
    let Some((w, h)) = w.zip(h) else {
        return Err(DetectError::InvalidRgbDimensions { width, height });
    };
    let Some(expected) = w.checked_mul(h).and_then(|n| n.checked_mul(3)) else {
        return Err(DetectError::InvalidRgbDimensions { width, height });
    };
    if pixels.len() != expected {
        return Err(DetectError::InvalidRgbBuffer {
            expected,
            got: pixels.len(),
        });
    }
    ::image::RgbImage::from_raw(width, height, pixels.to_vec())
        .ok_or(DetectError::InvalidRgbDimensions { width, height })
}

/// Run one frame on an `image::RgbImage`.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip_all, fields(width = img.width(), height = img.height()))
)]
pub fn detect_image(
    detector: &PaperDetector,
    img: &::image::RgbImage,
    blobs: &dyn BlobDetector,
    debug_pages: &[DebugPage],
    memory: &GeometryMemory,
    cache: &mut CalibrationCache,
) -> FrameDetection {
    detector.detect(blobs, rgb_view(img), debug_pages, memory, cache)
}

/// Run one frame on a raw interleaved RGB buffer.
pub fn detect_rgb_u8(
    width: u32,
    height: u32,
    pixels: &[u8],
    detector: &PaperDetector,
    blobs: &dyn BlobDetector,
    memory: &GeometryMemory,
    cache: &mut CalibrationCache,
) -> Result<FrameDetection, DetectError> {
    let img = rgb_image_from_slice(width, height, pixels)?;
    Ok(detect_image(detector, &img, blobs, &[], memory, cache))
}
