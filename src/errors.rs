use thiserror::Error;

/// errors raised while validating terms or generating a schedule
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("invalid {field}: {reason}")]
    InvalidTerms {
        field: String,
        reason: String,
    },

    /// a broken invariant inside the generator, never caused by user input
    #[error("internal inconsistency at installment {installment_no}: {message}")]
    InternalInconsistency {
        installment_no: u32,
        message: String,
    },

    #[error("malformed request: {message}")]
    MalformedRequest {
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },
}

impl ScheduleError {
    pub fn invalid_terms(field: &str, reason: impl Into<String>) -> Self {
        ScheduleError::InvalidTerms {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn internal(installment_no: u32, message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::error!(installment_no, %message, "schedule generator invariant broken");
        ScheduleError::InternalInconsistency {
            installment_no,
            message,
        }
    }

    /// field named by an `InvalidTerms` error
    pub fn field(&self) -> Option<&str> {
        match self {
            ScheduleError::InvalidTerms { field, .. } => Some(field),
            _ => None,
        }
    }

    pub fn is_invalid_terms(&self) -> bool {
        matches!(self, ScheduleError::InvalidTerms { .. })
    }
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
