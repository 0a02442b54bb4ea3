// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid {entity} state transition: {from} -> {to}")]
    InvalidStateTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    #[error("Unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl DomainError {
    pub(crate) fn transition(
        entity: &'static str,
        from: impl std::fmt::Display,
        to: impl std::fmt::Display,
    ) -> Self {
        DomainError::InvalidStateTransition {
            entity,
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub(crate) fn unknown(kind: &'static str, value: &str) -> Self {
        DomainError::UnknownVariant {
            kind,
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;
