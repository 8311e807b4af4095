use thiserror::Error;

/// Error taxonomy shared by both lifecycle managers. Every rejected
/// request maps to exactly one variant; the API layer translates the
/// variant into an HTTP status and keeps the message for the body.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Vehicle still busy from previous trip")]
    VehicleBusy,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("payment gateway failure: {0}")]
    Payment(String),

    #[error("storage failure: {0}")]
    Store(String),
}

impl DomainError {
    /// Machine-checkable kind, stable across message wording changes.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::Validation(_) => "VALIDATION",
            DomainError::NotFound(_) => "NOT_FOUND",
            DomainError::Conflict(_) => "CONFLICT",
            DomainError::VehicleBusy => "VEHICLE_BUSY",
            DomainError::Forbidden(_) => "FORBIDDEN",
            DomainError::InvalidState(_) => "INVALID_STATE",
            DomainError::Payment(_) => "PAYMENT",
            DomainError::Store(_) => "STORAGE",
        }
    }
}
