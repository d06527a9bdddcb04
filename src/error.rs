use thiserror::Error;

/// Rejections raised when checking raw loan input before it reaches the simulator.
///
/// The simulator itself never fails; these only exist for callers that want a
/// stricter contract than "degenerate input gives a zero result".
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PrepayError {
    #[error("invalid input: {field} {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("invalid input: {field} must be a finite number")]
    NonFinite { field: String },

    #[error("unknown payment frequency '{0}', expected monthly, quarterly or yearly")]
    UnknownFrequency(String),
}

impl PrepayError {
    pub(crate) fn invalid(field: &str, reason: &str) -> Self {
        PrepayError::InvalidInput {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}
