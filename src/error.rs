use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedForgeError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported key count: {0} (expected one of 25, 37, 49, 61, 76, 88)")]
    UnsupportedKeyCount(usize),

    #[error("Invalid LED count: {0} (must be at least 1)")]
    InvalidLedCount(usize),

    #[error("Invalid LED range: start_led {start} is after end_led {end}")]
    InvalidLedRange { start: usize, end: usize },

    #[error("Invalid LED pitch: {0} mm (must be positive and finite)")]
    InvalidPitch(f64),

    #[error("Configuration Error: {0}")]
    Config(String),
}

impl LedForgeError {
    /// True for errors raised by parameter validation rather than file handling.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedKeyCount(_)
                | Self::InvalidLedCount(_)
                | Self::InvalidLedRange { .. }
                | Self::InvalidPitch(_)
                | Self::Config(_)
        )
    }
}

pub type LfResult<T> = Result<T, LedForgeError>;
