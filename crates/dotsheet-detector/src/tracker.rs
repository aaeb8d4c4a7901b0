//! Sheet reconstruction from observed corners plus geometry memory.

use dotsheet_core::{centroid, heading, shrink_quad, unit, Quad, SurfaceMapping};
use nalgebra::Point2;

use crate::memory::{mirror_relations, GeometryMemory};
use crate::result::Page;
use crate::shapes::FrameCorners;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// A sheet with all four corners known, in pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedSheet {
    pub id: u32,
    pub corners: Quad,
    /// Which corners were seen this frame (the rest were predicted).
    pub observed: [bool; 4],
}

/// Update `memory` with this frame's corners and complete every sheet whose
/// missing corners can be predicted.
///
/// Sheets are handled in ascending id order. Sheets that stay incomplete are
/// left out; their memory is still updated.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all, fields(sheets = frame.sheets.len())))]
pub fn resolve_sheets(frame: &FrameCorners, memory: &mut GeometryMemory) -> Vec<ResolvedSheet> {
    let mut resolved = Vec::new();

    for (&id, slots) in &frame.sheets {
        for (i, from) in slots.iter().enumerate() {
            let Some(from) = from else { continue };
            for (j, to) in slots.iter().enumerate() {
                let Some(to) = to else { continue };
                if i == j {
                    continue;
                }
                let diff = to.position - from.position;
                memory.observe(
                    id,
                    i,
                    j,
                    heading(diff) - heading(from.direction),
                    diff.norm(),
                );
            }
        }

        let table = memory.sheet_mut(id);
        mirror_relations(table);
        let table = *table;

        let mut predictions: [Vec<Point2<f32>>; 4] = Default::default();
        for (i, from) in slots.iter().enumerate() {
            let Some(from) = from else { continue };
            for j in 0..4 {
                if slots[j].is_some() {
                    continue;
                }
                if let Some(rel) = table[i][j] {
                    let theta = heading(from.direction) + rel.angle;
                    predictions[j].push(from.position + unit(theta) * rel.magnitude);
                }
            }
        }

        let mut corners = [Point2::origin(); 4];
        let mut complete = true;
        for k in 0..4 {
            if let Some(obs) = &slots[k] {
                corners[k] = obs.position;
            } else if let Some(mean) = centroid(&predictions[k]) {
                corners[k] = mean;
            } else {
                complete = false;
            }
        }

        if !complete {
            log::debug!("sheet {id}: not enough geometry to complete");
            continue;
        }
        resolved.push(ResolvedSheet {
            id,
            corners,
            observed: std::array::from_fn(|k| slots[k].is_some()),
        });
    }

    resolved
}

/// Shrink a resolved sheet past its border dots and express it in the
/// calibrated unit square.
pub fn build_page(
    sheet: &ResolvedSheet,
    average_dot_size: f32,
    shrink_factor: f32,
    mapping: &SurfaceMapping,
) -> Option<Page> {
    let inner = shrink_quad(shrink_factor * average_dot_size, &sheet.corners);
    let points = inner.map(|p| mapping.to_unit(p));
    let page = Page::from_unit_points(sheet.id, points, sheet.observed, false);
    if page.is_none() {
        log::debug!("sheet {}: degenerate quad", sheet.id);
    }
    page
}
