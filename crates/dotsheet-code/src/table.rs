//! The table of printable 7-dot corner codes.
//!
//! A code is a sequence of [`CODE_LENGTH`] palette indices read along one
//! corner of a sheet, far end of the first arm towards the far end of the
//! second. The table holds every such sequence over [`COLOR_COUNT`] colors
//! that uses each color at least once, in ascending base-4 order. Entry `k`
//! belongs to sheet `k % sheet_count()` at corner `k / sheet_count()`.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::corner::{Corner, CornerCode};
use crate::error::CodeError;

/// Number of palette colors a code is written with.
pub const COLOR_COUNT: usize = 4;
/// Dots per corner code.
pub const CODE_LENGTH: usize = 7;

/// One corner code, as palette indices.
pub type Code = [u8; CODE_LENGTH];

#[derive(Clone, Debug)]
pub struct CodeTable {
    codes: Vec<Code>,
    index: HashMap<Code, usize>,
}

static STANDARD: OnceLock<CodeTable> = OnceLock::new();

impl CodeTable {
    /// The shared standard table, built on first use.
    pub fn standard() -> &'static CodeTable {
        STANDARD.get_or_init(Self::build)
    }

    fn build() -> Self {
        let total = COLOR_COUNT.pow(CODE_LENGTH as u32);
        let mut codes = Vec::new();
        for n in 0..total {
            let code = digits(n);
            let mut used = [false; COLOR_COUNT];
            for &c in &code {
                used[c as usize] = true;
            }
            if used.iter().all(|&u| u) {
                codes.push(code);
            }
        }
        let index = codes.iter().enumerate().map(|(k, c)| (*c, k)).collect();
        log::debug!("built code table with {} entries", codes.len());
        Self { codes, index }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Number of distinct sheet ids; every sheet uses 4 entries.
    #[inline]
    pub fn sheet_count(&self) -> usize {
        self.codes.len() / 4
    }

    /// Table entry `k`.
    pub fn entry(&self, k: usize) -> Option<&Code> {
        self.codes.get(k)
    }

    /// Decode a color sequence into `(sheet id, corner)`.
    pub fn lookup(&self, colors: &[u8]) -> Option<CornerCode> {
        let code: Code = colors.try_into().ok()?;
        let k = *self.index.get(&code)?;
        let per_corner = self.sheet_count();
        let corner = Corner::from_index(k / per_corner)?;
        Some(CornerCode {
            id: (k % per_corner) as u32,
            corner,
        })
    }

    /// Code printed at `corner` of sheet `id`.
    pub fn code_for(&self, id: u32, corner: Corner) -> Result<Code, CodeError> {
        let per_corner = self.sheet_count();
        if id as usize >= per_corner {
            return Err(CodeError::IdOutOfRange {
                id,
                count: per_corner,
            });
        }
        Ok(self.codes[corner.index() * per_corner + id as usize])
    }
}

/// Base-4 digits of `n`, most significant first.
fn digits(mut n: usize) -> Code {
    let mut out = [0u8; CODE_LENGTH];
    for slot in out.iter_mut().rev() {
        *slot = (n % COLOR_COUNT) as u8;
        n /= COLOR_COUNT;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_has_8400_entries() {
        let t = CodeTable::standard();
        assert_eq!(t.len(), 8400);
        assert_eq!(t.sheet_count(), 2100);
    }

    #[test]
    fn first_entries_are_lexicographic() {
        let t = CodeTable::standard();
        assert_eq!(t.entry(0), Some(&[0, 0, 0, 0, 1, 2, 3]));
        assert_eq!(t.entry(1), Some(&[0, 0, 0, 0, 1, 3, 2]));
        assert_eq!(t.entry(8399), Some(&[3, 3, 3, 3, 2, 1, 0]));
        for w in t.codes.windows(2) {
            assert!(w[0] < w[1]);
        }
    }

    #[test]
    fn every_code_uses_every_color() {
        for code in &CodeTable::standard().codes {
            for c in 0..COLOR_COUNT as u8 {
                assert!(code.contains(&c), "{code:?} misses color {c}");
            }
        }
    }

    #[test]
    fn lookup_splits_index_into_id_and_corner() {
        let t = CodeTable::standard();
        for k in [0usize, 1, 2099, 2100, 4321, 8399] {
            let code = t.entry(k).copied().expect("entry");
            let cc = t.lookup(&code).expect("known code");
            assert_eq!(cc.id as usize, k % 2100);
            assert_eq!(cc.corner.index(), k / 2100);
        }
    }

    #[test]
    fn code_for_inverts_lookup() {
        let t = CodeTable::standard();
        for corner in Corner::ALL {
            let code = t.code_for(17, corner).expect("valid id");
            assert_eq!(t.lookup(&code), Some(CornerCode { id: 17, corner }));
        }
        assert!(matches!(
            t.code_for(2100, Corner::TopLeft),
            Err(CodeError::IdOutOfRange { id: 2100, .. })
        ));
    }

    #[test]
    fn unknown_sequences_are_rejected() {
        let t = CodeTable::standard();
        assert_eq!(t.lookup(&[0, 0, 0, 0, 0, 0, 0]), None);
        assert_eq!(t.lookup(&[0, 1, 2, 3]), None);
        assert_eq!(t.lookup(&[0, 1, 2, 3, 0, 1, 2, 3]), None);
    }
}
