use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CodeError {
    #[error("sheet id {id} out of range (table holds {count} sheets)")]
    IdOutOfRange { id: u32, count: usize },
    #[error("invalid corner index {0}, expected 0..=3")]
    InvalidCorner(u8),
}
