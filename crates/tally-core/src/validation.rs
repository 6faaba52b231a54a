//! # Validation Module
//!
//! Input guards run before anything is written.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Dashboard form                                               │
//! │  └── Immediate feedback (empty fields, number inputs)                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: tally-db repository call                                     │
//! │  ├── THIS MODULE: format and range checks                              │
//! │  └── availability / tab / void business rules                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                       │
//! │  └── NOT NULL, CHECK and foreign key constraints                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::validation::{validate_name, validate_count_quantity};
//!
//! assert!(validate_name("name", "Lime Juice").is_ok());
//! assert!(validate_count_quantity(12.5).is_ok());
//! assert!(validate_count_quantity(-1.0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::MAX_NAME_LENGTH;

/// Longest accepted currency symbol, e.g. `CHF` or `kr`.
const MAX_CURRENCY_SYMBOL_LENGTH: usize = 4;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name and returns it trimmed.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most [`MAX_NAME_LENGTH`] characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required(field));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(name.to_string())
}

/// Validates an ISO 4217 currency code and returns it uppercased.
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_currency_code;
///
/// assert_eq!(validate_currency_code(" eur ").unwrap(), "EUR");
/// assert!(validate_currency_code("dollars").is_err());
/// ```
pub fn validate_currency_code(code: &str) -> ValidationResult<String> {
    let code = code.trim().to_uppercase();

    if code.is_empty() {
        return Err(ValidationError::required("currency code"));
    }

    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::InvalidFormat {
            field: "currency code".to_string(),
            reason: "must be 3 letters".to_string(),
        });
    }

    Ok(code)
}

/// Validates a currency symbol and returns it trimmed.
pub fn validate_currency_symbol(symbol: &str) -> ValidationResult<String> {
    let symbol = symbol.trim();

    if symbol.is_empty() {
        return Err(ValidationError::required("currency symbol"));
    }

    if symbol.chars().count() > MAX_CURRENCY_SYMBOL_LENGTH {
        return Err(ValidationError::TooLong {
            field: "currency symbol".to_string(),
            max: MAX_CURRENCY_SYMBOL_LENGTH,
        });
    }

    Ok(symbol.to_string())
}

// =============================================================================
// Quantity Validators
// =============================================================================

fn finite(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a counted on-hand quantity. Zero is a valid count.
pub fn validate_count_quantity(quantity: f64) -> ValidationResult<()> {
    finite("quantity", quantity)?;
    if quantity < 0.0 {
        return Err(ValidationError::Negative {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates an ingredient's package size.
pub fn validate_package_size(size: f64) -> ValidationResult<()> {
    finite("package size", size)?;
    if size <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "package size".to_string(),
        });
    }
    Ok(())
}

/// Validates a par level, when one is given.
pub fn validate_par_level(par_level: Option<f64>) -> ValidationResult<()> {
    match par_level {
        None => Ok(()),
        Some(par) => {
            finite("par level", par)?;
            if par < 0.0 {
                return Err(ValidationError::Negative {
                    field: "par level".to_string(),
                });
            }
            Ok(())
        }
    }
}

/// Validates the amount of an ingredient a recipe consumes per serving.
pub fn validate_recipe_quantity(quantity: f64) -> ValidationResult<()> {
    finite("recipe quantity", quantity)?;
    if quantity <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "recipe quantity".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Money Validators
// =============================================================================

/// Validates a price. Zero is allowed (comps, free refills).
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }
    Ok(())
}

/// Validates a credit limit. Zero is allowed and disables tabs.
pub fn validate_credit_limit(limit: Money) -> ValidationResult<()> {
    if limit.is_negative() {
        return Err(ValidationError::Negative {
            field: "credit limit".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("name", "  Old Fashioned ").unwrap(), "Old Fashioned");
        assert_eq!(
            validate_name("name", "   "),
            Err(ValidationError::required("name"))
        );
        assert!(validate_name("name", &"A".repeat(MAX_NAME_LENGTH)).is_ok());
        assert!(validate_name("name", &"A".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_currency() {
        assert_eq!(validate_currency_code("usd").unwrap(), "USD");
        assert_eq!(
            validate_currency_code("  "),
            Err(ValidationError::required("currency code"))
        );
        assert!(validate_currency_code("US").is_err());
        assert!(validate_currency_code("U5D").is_err());

        assert_eq!(validate_currency_symbol(" € ").unwrap(), "€");
        assert!(validate_currency_symbol("").is_err());
        assert!(validate_currency_symbol("$$$$$").is_err());
    }

    #[test]
    fn test_quantities() {
        assert!(validate_count_quantity(0.0).is_ok());
        assert!(validate_count_quantity(-0.5).is_err());
        assert!(validate_count_quantity(f64::NAN).is_err());

        assert!(validate_package_size(750.0).is_ok());
        assert!(validate_package_size(0.0).is_err());
        assert!(validate_package_size(f64::INFINITY).is_err());

        assert!(validate_par_level(None).is_ok());
        assert!(validate_par_level(Some(0.0)).is_ok());
        assert!(validate_par_level(Some(-1.0)).is_err());

        assert!(validate_recipe_quantity(0.25).is_ok());
        assert!(validate_recipe_quantity(0.0).is_err());
    }

    #[test]
    fn test_money() {
        assert!(validate_price(Money::zero()).is_ok());
        assert!(validate_price(Money::from_cents(-1)).is_err());
        assert!(validate_credit_limit(Money::zero()).is_ok());
        assert!(validate_credit_limit(Money::from_cents(-100)).is_err());
    }
}
