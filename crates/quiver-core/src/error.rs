use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("grid spacing must be a positive finite number, got {0}")]
    InvalidSpacing(f64),

    #[error("viewport dimensions must be finite and non-negative, got {width}x{height}")]
    InvalidDimensions { width: f64, height: f64 },

    #[error("ease factor must lie in [0, 1], got {0}")]
    InvalidEase(f64),

    #[error("explicit grid needs at least one row and one column, got {rows}x{cols}")]
    InvalidGrid { rows: u32, cols: u32 },

    #[error("fade distance must be a positive finite number, got {0}")]
    InvalidFade(f64),

    #[error("stroke width must be a positive finite number, got {0}")]
    InvalidStroke(f64),

    #[error("invalid {what}: {value}")]
    InvalidBehavior { what: &'static str, value: f64 },

    #[error("exclusion rectangle fractions must lie in [0, 1], got {width_vw}x{height_vw}")]
    InvalidExclusion { width_vw: f64, height_vw: f64 },

    #[error("invalid cell {what}: {value}")]
    InvalidCell { what: &'static str, value: f64 },

    #[error("arrow glyph {what} must be finite, got {value}")]
    InvalidGlyph { what: &'static str, value: f64 },

    #[error("{what} colour channels must lie in [0, 1], got {value}")]
    InvalidColor { what: &'static str, value: f32 },

    #[error("layout needs {requested} agents, more than the limit of {max}")]
    TooManyAgents { requested: f64, max: usize },

    #[error("unknown preset {0:?}")]
    UnknownPreset(String),

    #[error("failed to parse effect config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to read effect config: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("host error: {0}")]
    Platform(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
