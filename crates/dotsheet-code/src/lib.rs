//! Colored dot codes.
//!
//! Sheets carry a 7-dot code at each corner, printed with a small palette of
//! colors. This crate classifies sampled dot colors against a calibrated
//! [`Palette`] and decodes the resulting sequence with the [`CodeTable`].
//!
//! It does **not** find dots or shapes in images; see `dotsheet-detector`.

mod color;
mod corner;
mod error;
mod matcher;
mod palette;
mod table;

pub use color::{ciede2000, Lab};
pub use corner::{Corner, CornerCode};
pub use error::CodeError;
pub use matcher::{CodeMatcher, Match};
pub use palette::Palette;
pub use table::{Code, CodeTable, CODE_LENGTH, COLOR_COUNT};
