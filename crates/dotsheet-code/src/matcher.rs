//! Shape decoding: color samples in, corner code out.

use dotsheet_core::Rgb;

use crate::corner::CornerCode;
use crate::palette::Palette;
use crate::table::{CodeTable, CODE_LENGTH};

/// A decoded shape together with the per-dot palette indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match {
    pub code: CornerCode,
    pub colors: [u8; CODE_LENGTH],
}

/// Decodes the 7 color samples of a shape against a palette and a table.
#[derive(Clone, Debug)]
pub struct CodeMatcher<'t> {
    palette: Palette,
    table: &'t CodeTable,
}

impl CodeMatcher<'static> {
    /// Matcher over the standard table.
    pub fn standard(palette: Palette) -> Self {
        Self::new(palette, CodeTable::standard())
    }
}

impl<'t> CodeMatcher<'t> {
    pub fn new(palette: Palette, table: &'t CodeTable) -> Self {
        Self { palette, table }
    }

    #[inline]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    #[inline]
    pub fn table(&self) -> &'t CodeTable {
        self.table
    }

    /// Classify the samples within the shape and look the result up.
    ///
    /// Returns `None` when the sequence is not a printed code.
    pub fn decode(&self, samples: &[Rgb; CODE_LENGTH]) -> Option<Match> {
        let classes = self.palette.classify_shape(samples);
        let mut colors = [0u8; CODE_LENGTH];
        for (slot, c) in colors.iter_mut().zip(&classes) {
            *slot = u8::try_from(*c).ok()?;
        }
        let code = self.table.lookup(&colors)?;
        Some(Match { code, colors })
    }
}
