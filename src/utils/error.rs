use serde::Serialize;
use thiserror::Error;

/// Reasons the split calculator refuses a bill. The display strings are shown
/// to the user verbatim.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SplitValidationError {
    #[error("No total cost provided")]
    MissingTotal,

    #[error("Duplicate names found in the list of names")]
    DuplicateParticipantName,

    #[error("No cost provided for an item")]
    MissingItemCost,

    #[error("Subtotal is greater than total cost.")]
    SubtotalExceedsTotal,

    #[error("At least one item has a cost not assigned to somebody")]
    UnassignedPositiveCostItem,

    #[error("At least one item cost is not set")]
    UnsetItemCostWithParticipants,
}

#[derive(Error, Debug)]
pub enum SplitError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Extraction service returned {status}: {message}")]
    ExtractionError { status: u16, message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Unknown {kind} id: {id}")]
    UnknownEntity { kind: &'static str, id: String },

    #[error("Split validation failed: {0}")]
    Validation(#[from] SplitValidationError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Storage,
    Data,
    Configuration,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SplitError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SplitError::ApiError(_) | SplitError::ExtractionError { .. } => ErrorCategory::Network,
            SplitError::ZipError(_) | SplitError::IoError(_) => ErrorCategory::Storage,
            SplitError::CsvError(_) | SplitError::SerializationError(_) => ErrorCategory::Data,
            SplitError::ConfigValidationError { .. }
            | SplitError::InvalidConfigValueError { .. }
            | SplitError::MissingConfigError { .. } => ErrorCategory::Configuration,
            SplitError::UnknownEntity { .. } | SplitError::Validation(_) => ErrorCategory::Input,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 使用者修正輸入即可
            SplitError::Validation(_) | SplitError::UnknownEntity { .. } => ErrorSeverity::Low,
            SplitError::ApiError(_) | SplitError::ExtractionError { .. } => ErrorSeverity::Medium,
            SplitError::CsvError(_)
            | SplitError::SerializationError(_)
            | SplitError::ConfigValidationError { .. }
            | SplitError::InvalidConfigValueError { .. }
            | SplitError::MissingConfigError { .. } => ErrorSeverity::High,
            SplitError::ZipError(_) | SplitError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SplitError::ApiError(_) => "Could not reach the extraction service".to_string(),
            SplitError::ExtractionError { status, .. } => {
                format!("The extraction service rejected the request (HTTP {})", status)
            }
            SplitError::ZipError(_) | SplitError::IoError(_) => {
                "Could not write the split output".to_string()
            }
            SplitError::CsvError(_) | SplitError::SerializationError(_) => {
                "Could not serialize the split output".to_string()
            }
            SplitError::ConfigValidationError { field, .. }
            | SplitError::InvalidConfigValueError { field, .. }
            | SplitError::MissingConfigError { field } => {
                format!("Configuration problem with '{}': {}", field, self)
            }
            SplitError::UnknownEntity { kind, id } => format!("No {} with id {}", kind, id),
            SplitError::Validation(inner) => inner.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Check the endpoint, API key and network connection, or pass --json with an already extracted bill"
            }
            ErrorCategory::Storage => "Check that the output path exists and is writable",
            ErrorCategory::Data => "Re-run with --verbose and inspect the extracted bill",
            ErrorCategory::Configuration => "Fix the configuration value and try again",
            ErrorCategory::Input => "Correct the bill description and try again",
        }
    }
}

pub type Result<T> = std::result::Result<T, SplitError>;
