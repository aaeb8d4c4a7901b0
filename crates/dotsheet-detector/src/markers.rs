//! Dark objects resting on located sheets.

use dotsheet_core::{point_in_quad, GrayImage, GrayImageView, PixelRect, Quad, SurfaceMapping};
use nalgebra::Point2;

use crate::regions::{external_regions, min_area_rect};
use crate::result::{Marker, Page};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Find markers on `pages`.
///
/// `binary` is the thresholded frame (non-zero = dark). Only pixels inside
/// `roi` are considered. Only outermost regions count, with their holes and
/// anything inside them filled in. Regions whose filled area is below
/// `min_area` pixels are ignored; a region belongs to the first page whose
/// quad contains the center of its bounding rectangle.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all, fields(pages = pages.len())))]
pub fn locate_markers(
    binary: &GrayImageView<'_>,
    roi: PixelRect,
    pages: &[Page],
    mapping: &SurfaceMapping,
    min_area: f32,
) -> Vec<Marker> {
    let mut markers = Vec::new();

    for page in pages {
        let quad = page.points.map(|p| mapping.to_pixel(p));
        let Some((mask, origin)) = page_mask(binary, roi, &quad) else {
            continue;
        };

        for region in external_regions(&mask) {
            if (region.area() as f32) < min_area {
                continue;
            }
            let pixels: Vec<Point2<f32>> = region
                .pixels
                .iter()
                .map(|p| Point2::new(p.x + origin.x, p.y + origin.y))
                .collect();
            let Some(rect) = min_area_rect(&pixels) else {
                continue;
            };

            let global_center = mapping.to_unit(rect.center);
            let Some(owner) = pages.iter().find(|p| point_in_quad(global_center, &p.points)) else {
                log::debug!("region at {:?} lies on no page", rect.center);
                continue;
            };
            let global_points = rect.points().map(|p| mapping.to_unit(p));
            markers.push(Marker {
                page_id: owner.id,
                global_center,
                global_points,
                local_center: owner.to_local(global_center),
                local_points: global_points.map(|p| owner.to_local(p)),
                area: region.area() as f32,
            });
        }
    }

    log::debug!("{} markers on {} pages", markers.len(), pages.len());
    markers
}

/// Foreground pixels inside both `roi` and the pixel-space `quad`, cropped
/// to the quad's bounding box. Returns the crop and its top-left offset.
fn page_mask(
    binary: &GrayImageView<'_>,
    roi: PixelRect,
    quad: &Quad,
) -> Option<(GrayImage, Point2<f32>)> {
    let x_end = (roi.x + roi.width).min(binary.width);
    let y_end = (roi.y + roi.height).min(binary.height);

    let min_x = quad.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
    let max_x = quad.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
    let min_y = quad.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
    let max_y = quad.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
    if !(min_x.is_finite() && max_x.is_finite() && min_y.is_finite() && max_y.is_finite()) {
        return None;
    }

    let x0 = (min_x.floor().max(0.0) as usize).max(roi.x);
    let y0 = (min_y.floor().max(0.0) as usize).max(roi.y);
    let x1 = (max_x.ceil().max(0.0) as usize).saturating_add(1).min(x_end);
    let y1 = (max_y.ceil().max(0.0) as usize).saturating_add(1).min(y_end);
    if x0 >= x1 || y0 >= y1 {
        return None;
    }

    let mut mask = GrayImage::new(x1 - x0, y1 - y0);
    for y in y0..y1 {
        for x in x0..x1 {
            if binary.data[y * binary.width + x] == 0 {
                continue;
            }
            if point_in_quad(Point2::new(x as f32, y as f32), quad) {
                mask.set(x - x0, y - y0, 255);
            }
        }
    }
    Some((mask, Point2::new(x0 as f32, y0 as f32)))
}
