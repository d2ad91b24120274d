//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`PorchlightError`] via `From` at the port boundaries.

/// Top-level error crossing port boundaries.
#[derive(Debug, thiserror::Error)]
pub enum PorchlightError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Domain invariant violations, reported back to the caller as client errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("invalid time {0:?}, expected HH:MM")]
    InvalidTimeOfDay(String),

    #[error("invalid action {0:?}, expected ON or OFF")]
    InvalidAction(String),

    #[error("invalid device address {0:?}")]
    InvalidAddress(String),

    #[error("invalid schedule id {0:?}")]
    InvalidScheduleId(String),

    #[error("invalid request body: {0}")]
    InvalidBody(String),
}

/// A lookup by identifier found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A device did not accept a command after every allowed attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("device {device} failed after {attempts} attempt(s): {detail}")]
pub struct DispatchError {
    /// Name of the device that failed.
    pub device: String,
    /// Number of attempts made, including the first one.
    pub attempts: u32,
    /// Text of the last error reported by the transport.
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_describe_not_found_error() {
        let err = NotFoundError {
            entity: "Schedule",
            id: "42".to_string(),
        };
        assert_eq!(err.to_string(), "Schedule 42 not found");
    }

    #[test]
    fn should_describe_dispatch_error_with_attempts() {
        let err = DispatchError {
            device: "Porch".to_string(),
            attempts: 4,
            detail: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "device Porch failed after 4 attempt(s): connection refused"
        );
    }

    #[test]
    fn should_convert_validation_error_into_top_level_error() {
        let err: PorchlightError = ValidationError::InvalidAction("DIM".to_string()).into();
        assert!(matches!(
            err,
            PorchlightError::Validation(ValidationError::InvalidAction(_))
        ));
    }
}
