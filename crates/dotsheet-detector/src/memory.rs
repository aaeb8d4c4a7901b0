//! Cross-frame corner geometry.
//!
//! For every sheet the memory holds, per ordered corner pair `(i, j)`, where
//! corner `j` lies relative to corner `i`: the distance, and the angle of the
//! offset measured against corner `i`'s own direction vector. Knowing one
//! corner and its direction is then enough to place the others when they
//! are occluded.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Relative placement of one corner with respect to another.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CornerRelation {
    /// Offset heading minus the heading of the source corner's direction.
    pub angle: f32,
    /// Offset length in pixels.
    pub magnitude: f32,
    /// Derived from the diagonally opposite pair rather than observed.
    pub mirrored: bool,
}

/// `relations[i][j]` describes corner `j` as seen from corner `i`.
pub type PairTable = [[Option<CornerRelation>; 4]; 4];

/// Geometry memory for all sheets ever seen. Entries never expire.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeometryMemory {
    sheets: BTreeMap<u32, PairTable>,
}

impl GeometryMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn sheet(&self, id: u32) -> Option<&PairTable> {
        self.sheets.get(&id)
    }

    pub fn relation(&self, id: u32, from: usize, to: usize) -> Option<CornerRelation> {
        self.sheets.get(&id)?.get(from)?.get(to).copied().flatten()
    }

    /// Table for `id`, created empty on first use.
    pub fn sheet_mut(&mut self, id: u32) -> &mut PairTable {
        self.sheets.entry(id).or_insert([[None; 4]; 4])
    }

    /// Store a directly observed relation, replacing whatever was there.
    pub fn observe(&mut self, id: u32, from: usize, to: usize, angle: f32, magnitude: f32) {
        self.sheet_mut(id)[from][to] = Some(CornerRelation {
            angle,
            magnitude,
            mirrored: false,
        });
    }
}

/// Copy every known pair onto its diagonally opposite pair, assuming a
/// rectangular sheet: `(i, j)` lands on `(i + 2, j + 2) mod 4`.
///
/// Observed entries are never overwritten; mirrored ones are refreshed.
/// Running it twice changes nothing.
pub fn mirror_relations(table: &mut PairTable) {
    for i in 0..4 {
        for j in 0..4 {
            let Some(rel) = table[i][j] else {
                continue;
            };
            let (oi, oj) = ((i + 2) % 4, (j + 2) % 4);
            let replace = match table[oi][oj] {
                None => true,
                Some(existing) => existing.mirrored,
            };
            if replace {
                table[oi][oj] = Some(CornerRelation {
                    mirrored: true,
                    ..rel
                });
            }
        }
    }
}
