use serde::{Deserialize, Serialize};

use crate::error::CodeError;

/// Corner of a sheet, in clockwise order starting top-left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Corner {
    TopLeft = 0,
    TopRight = 1,
    BottomRight = 2,
    BottomLeft = 3,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Corner::TopLeft => "TL",
            Corner::TopRight => "TR",
            Corner::BottomRight => "BR",
            Corner::BottomLeft => "BL",
        }
    }
}

impl TryFrom<u8> for Corner {
    type Error = CodeError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        Self::from_index(v as usize).ok_or(CodeError::InvalidCorner(v))
    }
}

impl From<Corner> for u8 {
    fn from(c: Corner) -> Self {
        c as u8
    }
}

/// A decoded corner code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CornerCode {
    pub id: u32,
    pub corner: Corner,
}
