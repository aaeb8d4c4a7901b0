/// Errors returned when validating a [`DetectorConfig`](crate::DetectorConfig).
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("palette must hold exactly {expected} colors, got {got}")]
    PaletteSize { expected: usize, got: usize },
    #[error("expected one dot size hint per palette color ({expected}), got {got}")]
    DotSizeCount { expected: usize, got: usize },
    #[error("dot size hints must be finite and positive, got {0}")]
    DotSize(f32),
    #[error("scale factor must be finite and positive, got {0}")]
    ScaleFactor(f32),
    #[error("knob points must be finite")]
    KnobPoints,
    #[error("{name} must be finite and positive, got {value}")]
    Parameter { name: &'static str, value: f32 },
}
