//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core                                                            │
//! │  ├── CoreError        - Umbrella for every domain rejection            │
//! │  ├── ValidationError  - Input validation failures (this file)          │
//! │  ├── TabError         - Tab charge/settlement rejections (tab.rs)      │
//! │  └── VoidError        - Void rejections (void.rs)                      │
//! │                                                                         │
//! │  tally-db                                                              │
//! │  └── DbError          - Storage failures, wraps CoreError              │
//! │                                                                         │
//! │  Flow: TabError/VoidError/ValidationError → CoreError → DbError        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every message is written to be shown to staff as-is. Currency figures
//! are always rendered with two decimals.

use thiserror::Error;

use crate::tab::TabError;
use crate::void::VoidError;

// =============================================================================
// Core Error
// =============================================================================

/// A business rule rejected the request.
///
/// Callers translate this into a client error (HTTP 400/403); it is never a
/// storage or programming failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// Tab charge or settlement refused.
    #[error(transparent)]
    Tab(#[from] TabError),

    /// Void refused.
    #[error(transparent)]
    Void(#[from] VoidError),

    /// Input failed a format or range check.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before anything is written, by the guards in
/// [`crate::validation`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be strictly positive.
    #[error("{field} must be greater than 0")]
    MustBePositive { field: String },

    /// Value must be zero or more.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// NaN or infinite quantity.
    #[error("{field} must be a finite number")]
    NotFinite { field: String },

    /// Invalid format (e.g., a currency code that is not 3 letters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(ValidationError::required("name").to_string(), "name is required");

        let err = ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        };
        assert_eq!(err.to_string(), "name must be at most 200 characters");
    }

    #[test]
    fn test_core_error_is_transparent() {
        let err: CoreError = TabError::ExceedsBalance {
            balance: Money::from_cents(50_000),
        }
        .into();
        assert_eq!(err.to_string(), "Payment amount exceeds balance of $500.00");

        let err: CoreError = VoidError::AlreadyVoided.into();
        assert!(matches!(err, CoreError::Void(VoidError::AlreadyVoided)));
    }
}
