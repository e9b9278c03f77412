//! Error taxonomy shared by the models and the repository.

use std::fmt;

use thiserror::Error;

use crate::repository::CollectionKind;

/// Bounded numeric fields guarded by the non-negative integer rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundedField {
    /// Worker seniority in years.
    Seniority,
    /// Number of carriages of a train.
    Carriages,
    /// Ticket price of a timetable entry.
    TicketPrice,
    /// Number of tickets on a sales sheet.
    TicketCount,
    /// Numeric brigade identifier.
    BrigadeNumber,
}

impl BoundedField {
    /// Human readable field label.
    pub fn label(self) -> &'static str {
        match self {
            BoundedField::Seniority => "seniority",
            BoundedField::Carriages => "number of carriages",
            BoundedField::TicketPrice => "ticket price",
            BoundedField::TicketCount => "number of tickets",
            BoundedField::BrigadeNumber => "brigade number",
        }
    }
}

impl fmt::Display for BoundedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rejected assignment to a bounded numeric field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The value is not an integer.
    #[error("value '{value}' for {field} must be an integer")]
    InvalidType {
        /// Field the value was meant for.
        field: BoundedField,
        /// Offending input as received.
        value: String,
    },
    /// The value is an integer below zero.
    #[error("value '{value}' for {field} must be a non-negative integer")]
    InvalidValue {
        /// Field the value was meant for.
        field: BoundedField,
        /// Offending integer.
        value: i64,
    },
    /// An adjustment divided the field by zero.
    #[error("{field} cannot be divided by zero")]
    DivisionByZero {
        /// Field being adjusted.
        field: BoundedField,
    },
    /// An adjustment produced a value too large to store.
    #[error("adjusted {field} is out of range")]
    OutOfRange {
        /// Field being adjusted.
        field: BoundedField,
    },
}

impl ValidationError {
    /// Field that rejected the value.
    pub fn field(&self) -> BoundedField {
        match self {
            ValidationError::InvalidType { field, .. }
            | ValidationError::InvalidValue { field, .. }
            | ValidationError::DivisionByZero { field }
            | ValidationError::OutOfRange { field } => *field,
        }
    }
}

/// Failures surfaced by repository operations.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("no entry '{key}' in {collection}")]
    NotFound {
        collection: CollectionKind,
        key: String,
    },

    #[error("key '{key}' is already taken in {collection}")]
    DuplicateKey {
        collection: CollectionKind,
        key: String,
    },

    #[error("keys in {collection} must not be empty")]
    EmptyKey { collection: CollectionKind },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("snapshot storage failed: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl RepositoryError {
    pub(crate) fn not_found(collection: CollectionKind, key: impl Into<String>) -> Self {
        RepositoryError::NotFound {
            collection,
            key: key.into(),
        }
    }

    pub(crate) fn duplicate(collection: CollectionKind, key: impl Into<String>) -> Self {
        RepositoryError::DuplicateKey {
            collection,
            key: key.into(),
        }
    }
}

/// Convenience alias for repository results.
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;
