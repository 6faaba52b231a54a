//! # Tab Credit Guards
//!
//! Decides whether a charge to, or a payment against, a customer's tab is
//! allowed, and reports how much of the credit line is in use.
//!
//! ## Charge Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate_tab_charge(amount, balance, limit, status, allow_override)    │
//! │       │                                                                 │
//! │       ├── amount ≤ 0?          → NonPositiveCharge                      │
//! │       ├── status suspended?    → Suspended                              │
//! │       ├── status frozen?       → Frozen                                 │
//! │       ├── limit = 0?           → TabsDisabled                           │
//! │       ├── balance + amount overflows?  → AmountTooLarge                 │
//! │       │                                                                 │
//! │       ├── balance + amount > limit                                      │
//! │       │     ├── allow_override → Ok, override_applied, NO cap           │
//! │       │     └── otherwise      → CreditLimitExceeded { by }             │
//! │       │                                                                 │
//! │       └── Ok { new_balance }                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Manager authority behind `allow_override` is asserted by the caller and
//! not re-checked here. An override lifts the cap completely; there is no
//! partial override.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::money::Money;

/// Usage percentage at which the warning level starts.
pub const CREDIT_WARNING_PERCENT: i64 = 80;

// =============================================================================
// Tab Status
// =============================================================================

/// Standing of a customer's tab account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum TabStatus {
    #[default]
    Active,
    /// Temporarily blocked, e.g. pending a conversation with a manager.
    Suspended,
    /// Blocked until the balance is dealt with.
    Frozen,
}

impl TabStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TabStatus::Active => "active",
            TabStatus::Suspended => "suspended",
            TabStatus::Frozen => "frozen",
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Why a tab charge or settlement was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TabError {
    #[error("Payment amount must be positive")]
    NonPositiveCharge,

    #[error("Tab account is suspended")]
    Suspended,

    #[error("Tab account is frozen")]
    Frozen,

    #[error("Tabs are not enabled for this customer")]
    TabsDisabled,

    #[error("Charge would exceed credit limit of {credit_limit} by {would_exceed_by}")]
    CreditLimitExceeded {
        new_balance: Money,
        credit_limit: Money,
        would_exceed_by: Money,
    },

    #[error("Amount is too large")]
    AmountTooLarge,

    #[error("Payment amount must be greater than 0")]
    NonPositiveSettlement,

    #[error("Payment amount exceeds balance of {balance}")]
    ExceedsBalance { balance: Money },
}

impl TabError {
    /// Amount over the limit, for a refused charge.
    pub fn would_exceed_by(&self) -> Option<Money> {
        match self {
            TabError::CreditLimitExceeded {
                would_exceed_by, ..
            } => Some(*would_exceed_by),
            _ => None,
        }
    }
}

// =============================================================================
// Charge / Settlement
// =============================================================================

/// An accepted tab charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TabCharge {
    pub new_balance: Money,
    /// True when the charge only went through because of a manager override.
    pub override_applied: bool,
}

/// An accepted tab payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TabSettlement {
    pub new_balance: Money,
}

/// Validates putting `amount` on a customer's tab.
///
/// ## Example
/// ```rust
/// use tally_core::money::Money;
/// use tally_core::tab::{validate_tab_charge, TabStatus};
///
/// let refused = validate_tab_charge(
///     Money::from_cents(10_000),
///     Money::from_cents(45_000),
///     Money::from_cents(50_000),
///     TabStatus::Active,
///     false,
/// )
/// .unwrap_err();
/// assert_eq!(refused.would_exceed_by(), Some(Money::from_cents(5_000)));
/// ```
pub fn validate_tab_charge(
    amount: Money,
    current_balance: Money,
    credit_limit: Money,
    status: TabStatus,
    allow_override: bool,
) -> Result<TabCharge, TabError> {
    if !amount.is_positive() {
        return Err(TabError::NonPositiveCharge);
    }

    match status {
        TabStatus::Active => {}
        TabStatus::Suspended => return Err(TabError::Suspended),
        TabStatus::Frozen => return Err(TabError::Frozen),
    }

    if !credit_limit.is_positive() {
        return Err(TabError::TabsDisabled);
    }

    let new_balance = current_balance
        .checked_add(amount)
        .ok_or(TabError::AmountTooLarge)?;

    if new_balance > credit_limit {
        if allow_override {
            return Ok(TabCharge {
                new_balance,
                override_applied: true,
            });
        }

        return Err(TabError::CreditLimitExceeded {
            new_balance,
            credit_limit,
            would_exceed_by: new_balance - credit_limit,
        });
    }

    Ok(TabCharge {
        new_balance,
        override_applied: false,
    })
}

/// Validates a payment of `amount` against the tab balance.
pub fn validate_tab_settlement(
    amount: Money,
    current_balance: Money,
) -> Result<TabSettlement, TabError> {
    if !amount.is_positive() {
        return Err(TabError::NonPositiveSettlement);
    }

    if amount > current_balance {
        return Err(TabError::ExceedsBalance {
            balance: current_balance,
        });
    }

    Ok(TabSettlement {
        new_balance: current_balance - amount,
    })
}

// =============================================================================
// Credit Usage
// =============================================================================

/// Share of the credit line in use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "percent", rename_all = "snake_case")]
pub enum CreditUsage {
    /// Percentage, rounded to one decimal.
    Percent(f64),
    /// Balance owed on an account with no credit line.
    Unbounded,
}

/// Dashboard badge for a tab's credit usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum CreditWarningLevel {
    Ok,
    Warning,
    Exceeded,
}

/// Returns `balance / limit × 100`, rounded to one decimal.
///
/// ## Example
/// ```rust
/// use tally_core::money::Money;
/// use tally_core::tab::{calculate_credit_usage, CreditUsage};
///
/// let usage = calculate_credit_usage(Money::from_cents(12_345), Money::from_cents(50_000));
/// assert_eq!(usage, CreditUsage::Percent(24.7));
/// ```
pub fn calculate_credit_usage(balance: Money, limit: Money) -> CreditUsage {
    if !limit.is_positive() {
        return if balance.is_positive() {
            CreditUsage::Unbounded
        } else {
            CreditUsage::Percent(0.0)
        };
    }

    let per_mille = balance.cents() as f64 * 1000.0 / limit.cents() as f64;
    CreditUsage::Percent(per_mille.round() / 10.0)
}

/// Classifies usage: Exceeded at 100 % or more, Warning from 80 %, else Ok.
///
/// Compared in whole cents so 99.99 % never rounds up into Exceeded.
pub fn credit_warning_level(balance: Money, limit: Money) -> CreditWarningLevel {
    if !limit.is_positive() {
        return if balance.is_positive() {
            CreditWarningLevel::Exceeded
        } else {
            CreditWarningLevel::Ok
        };
    }

    let balance = balance.cents() as i128;
    let limit = limit.cents() as i128;

    if balance >= limit {
        CreditWarningLevel::Exceeded
    } else if balance * 100 >= limit * CREDIT_WARNING_PERCENT as i128 {
        CreditWarningLevel::Warning
    } else {
        CreditWarningLevel::Ok
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
