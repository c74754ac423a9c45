//! The storage kernel's single closed error type.
//!
//! Every failure mode of the operator and storage layers surfaces as one of these variants;
//! there is no partial result and no retry.

use crate::value::DataType;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: DataType, got: DataType },

    #[error("attempted to mutate an immutable {what}")]
    Immutable { what: &'static str },

    #[error("index {index} out of range (len {len})")]
    OutOfRange { index: usize, len: usize },

    #[error("'{name}' already exists")]
    DuplicateName { name: String },

    #[error("'{name}' not found")]
    NotFound { name: String },

    #[error("precondition violated: {reason}")]
    PreconditionViolation { reason: String },
}

pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    pub(crate) fn immutable(what: &'static str) -> Self {
        Self::Immutable { what }
    }

    pub(crate) fn type_mismatch(expected: DataType, got: DataType) -> Self {
        Self::TypeMismatch { expected, got }
    }

    pub(crate) fn out_of_range(index: usize, len: usize) -> Self {
        Self::OutOfRange { index, len }
    }

    pub(crate) fn duplicate_name(name: impl Into<String>) -> Self {
        Self::DuplicateName { name: name.into() }
    }

    pub(crate) fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    pub(crate) fn precondition(reason: impl Into<String>) -> Self {
        Self::PreconditionViolation {
            reason: reason.into(),
        }
    }
}
