//! Calibrated palette and nearest-color classification.

use dotsheet_core::Rgb;
use serde::{Deserialize, Serialize};

use crate::color::{ciede2000, Lab};

/// The calibrated dot colors, as the camera sees them.
///
/// Serialized as a plain list of `[r, g, b]` triples.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Rgb>", into = "Vec<Rgb>")]
pub struct Palette {
    colors: Vec<Rgb>,
    labs: Vec<Lab>,
}

impl Default for Palette {
    /// Red, green, blue, black.
    fn default() -> Self {
        Self::new(vec![
            Rgb::new(255.0, 0.0, 0.0),
            Rgb::new(0.0, 255.0, 0.0),
            Rgb::new(0.0, 0.0, 255.0),
            Rgb::new(0.0, 0.0, 0.0),
        ])
    }
}

impl From<Vec<Rgb>> for Palette {
    fn from(colors: Vec<Rgb>) -> Self {
        Self::new(colors)
    }
}

impl From<Palette> for Vec<Rgb> {
    fn from(p: Palette) -> Self {
        p.colors
    }
}

impl Palette {
    pub fn new(colors: Vec<Rgb>) -> Self {
        let labs = colors.iter().copied().map(Lab::from_rgb).collect();
        Self { colors, labs }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    #[inline]
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn color(&self, index: usize) -> Option<Rgb> {
        self.colors.get(index).copied()
    }

    /// Palette index perceptually closest to `sample`.
    pub fn nearest(&self, sample: Rgb) -> Option<usize> {
        nearest_lab(&self.labs, Lab::from_rgb(sample))
    }

    /// Assign a palette index to every sample of one shape.
    ///
    /// Palette entries are paired with samples greedily: the globally closest
    /// `(sample, entry)` pair is fixed first, both sides leave the pool, and
    /// so on until one side runs out. Each paired entry keeps its sample as
    /// an in-shape reference; samples left over afterwards take the entry
    /// whose reference is closest. Colors are thus judged relative to the
    /// other dots of the same shape rather than to the calibrated values
    /// alone.
    pub fn classify_shape(&self, samples: &[Rgb]) -> Vec<usize> {
        let sample_labs: Vec<Lab> = samples.iter().copied().map(Lab::from_rgb).collect();
        let n = sample_labs.len();
        let m = self.labs.len();

        let mut dist = Vec::with_capacity(n * m);
        for s in &sample_labs {
            for p in &self.labs {
                dist.push(ciede2000(*s, *p));
            }
        }

        let mut assigned: Vec<Option<usize>> = vec![None; n];
        // Per palette entry, the Lab of the sample it was paired with.
        let mut references: Vec<Option<Lab>> = vec![None; m];

        for _ in 0..n.min(m) {
            let mut best: Option<(usize, usize, f64)> = None;
            for (si, slot) in assigned.iter().enumerate() {
                if slot.is_some() {
                    continue;
                }
                for (pi, reference) in references.iter().enumerate() {
                    if reference.is_some() {
                        continue;
                    }
                    let d = dist[si * m + pi];
                    if best.is_none_or(|(_, _, bd)| d < bd) {
                        best = Some((si, pi, d));
                    }
                }
            }
            let Some((si, pi, _)) = best else { break };
            assigned[si] = Some(pi);
            references[pi] = Some(sample_labs[si]);
        }

        let paired: Vec<(usize, Lab)> = references
            .iter()
            .enumerate()
            .filter_map(|(pi, r)| r.map(|lab| (pi, lab)))
            .collect();

        assigned
            .iter()
            .zip(&sample_labs)
            .map(|(slot, lab)| match slot {
                Some(pi) => *pi,
                None => paired
                    .iter()
                    .map(|(pi, reference)| (*pi, ciede2000(*lab, *reference)))
                    .min_by(|a, b| a.1.total_cmp(&b.1))
                    .map(|(pi, _)| pi)
                    .unwrap_or(0),
            })
            .collect()
    }
}

fn nearest_lab(labs: &[Lab], sample: Lab) -> Option<usize> {
    labs.iter()
        .enumerate()
        .map(|(i, p)| (i, ciede2000(sample, *p)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}
