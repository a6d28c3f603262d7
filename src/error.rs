use serde::Serialize;
use thiserror::Error;

/// `ESP_FAIL` status code of the ESP-IDF USB stack
pub const ESP_FAIL: i32 = -1;
/// `ESP_ERR_INVALID_ARG` status code of the ESP-IDF USB stack
pub const ESP_ERR_INVALID_ARG: i32 = 0x102;
/// `ESP_ERR_INVALID_STATE` status code of the ESP-IDF USB stack
pub const ESP_ERR_INVALID_STATE: i32 = 0x103;

/// Crate-wide error type
#[derive(Error, Debug)]
pub enum CdcError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Allocation failure: {0}")]
    AllocationFailure(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error report (used in events and status dumps)
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub kind: &'static str,
    pub code: i32,
    pub message: String,
}

impl CdcError {
    /// Short, stable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            CdcError::InvalidArgument(_) => "invalid_argument",
            CdcError::InvalidState(_) => "invalid_state",
            CdcError::AllocationFailure(_) => "allocation_failure",
            CdcError::Config(_) => "config",
            CdcError::Io(_) => "io",
            CdcError::Serialization(_) => "serialization",
        }
    }

    /// Status code the ESP-IDF USB stack reports for the same failure
    pub fn esp_code(&self) -> i32 {
        match self {
            CdcError::InvalidArgument(_) => ESP_ERR_INVALID_ARG,
            CdcError::InvalidState(_) => ESP_ERR_INVALID_STATE,
            _ => ESP_FAIL,
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            code: self.esp_code(),
            message: self.to_string(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CdcError>;
