use thiserror::Error;

use crate::codes::messages;

/// The single application-level error raised by every EMR service
///
/// `Display` renders exactly the message callers see; the variants only
/// group messages by origin.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmrError {
    /// Rejected input (paging, sorting, filters, patch content)
    #[error("{0}")]
    Validation(String),

    /// The requested id does not resolve
    #[error("No data found!")]
    NotFound,

    /// A patch was requested without a patch document
    #[error("Patch document is missing!")]
    PatchMissing,

    /// Persistence provider failures
    #[error("{0}")]
    Database(String),

    /// Entity (de)serialization failures
    #[error("{0}")]
    Serialization(String),

    /// Configuration loading failures
    #[error("{0}")]
    Config(String),
}

impl EmrError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn page_size_invalid() -> Self {
        Self::validation(messages::PAGE_SIZE_INVALID)
    }

    pub fn page_number_invalid() -> Self {
        Self::validation(messages::PAGE_NUMBER_INVALID)
    }

    pub fn invalid_sort_order() -> Self {
        Self::validation(messages::INVALID_SORT_ORDER)
    }

    /// The human-readable message, identical to `to_string()`
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<serde_json::Error> for EmrError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias for EMR operations
pub type Result<T> = std::result::Result<T, EmrError>;

/// Log an error with the operation it came from
pub fn log_error(context: &str, error: &EmrError) {
    match error {
        EmrError::Validation(_) | EmrError::NotFound | EmrError::PatchMissing => {
            tracing::warn!(context = context, error = %error, "EMR request rejected");
        }
        _ => {
            tracing::error!(context = context, error = %error, "EMR operation failed");
        }
    }
}
