//! # Void Rules
//!
//! Whether a completed transaction may still be voided, and what reason
//! gets recorded.
//!
//! ## Check Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate_void(request, now)                                            │
//! │       │                                                                 │
//! │       ├── 1. already voided?         → AlreadyVoided                    │
//! │       ├── 2. older than 7 days?      → WindowExpired                    │
//! │       ├── 3. reason not in the list? → InvalidReason                    │
//! │       │      "Other" without text?   → MissingCustomReason              │
//! │       │                                                                 │
//! │       └── Ok(VoidReason)  ← caller stores reason.to_string()            │
//! │                                                                         │
//! │  When several checks fail the earliest one is reported.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The clock is always passed in; nothing here reads the time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ts_rs::TS;

/// Days after creation during which a transaction can be voided.
pub const VOID_WINDOW_DAYS: i64 = 7;

// =============================================================================
// Void Reason
// =============================================================================

/// Why a transaction was voided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "reason", content = "detail")]
pub enum VoidReason {
    #[serde(rename = "Wrong Items")]
    WrongItems,
    #[serde(rename = "Test Transaction")]
    TestTransaction,
    #[serde(rename = "Customer Dispute")]
    CustomerDispute,
    #[serde(rename = "Duplicate Entry")]
    DuplicateEntry,
    /// Free-text reason, always non-blank.
    Other(String),
}

impl VoidReason {
    pub const OTHER_LABEL: &'static str = "Other";

    /// The fixed label, without any custom text.
    pub fn label(&self) -> &'static str {
        match self {
            VoidReason::WrongItems => "Wrong Items",
            VoidReason::TestTransaction => "Test Transaction",
            VoidReason::CustomerDispute => "Customer Dispute",
            VoidReason::DuplicateEntry => "Duplicate Entry",
            VoidReason::Other(_) => VoidReason::OTHER_LABEL,
        }
    }
}

/// The stored form: the label, or `Other: {text}`.
impl fmt::Display for VoidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoidReason::Other(text) => write!(f, "{}: {}", VoidReason::OTHER_LABEL, text),
            other => f.write_str(other.label()),
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Why a void was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoidError {
    #[error("Transaction has already been voided")]
    AlreadyVoided,

    #[error("Transactions can only be voided within {days} days of the sale")]
    WindowExpired { days: i64 },

    #[error("Invalid void reason: {0}")]
    InvalidReason(String),

    #[error("A custom reason is required when 'Other' is selected")]
    MissingCustomReason,
}

/// Parses a fixed label. `"Other"` alone is rejected because it needs text;
/// use [`validate_void_reason`] to supply it.
impl FromStr for VoidReason {
    type Err = VoidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_void_reason(s, None)
    }
}

// =============================================================================
// Individual Checks
// =============================================================================

/// Fails if the transaction already carries a void.
pub fn validate_not_already_voided(is_voided: bool) -> Result<(), VoidError> {
    if is_voided {
        return Err(VoidError::AlreadyVoided);
    }
    Ok(())
}

/// Fails once more than [`VOID_WINDOW_DAYS`] have elapsed since `created_at`.
///
/// Exactly seven days is still inside the window.
///
/// ## Example
/// ```rust
/// use chrono::{Duration, Utc};
/// use tally_core::void::validate_void_window;
///
/// let now = Utc::now();
/// assert!(validate_void_window(now - Duration::days(7), now).is_ok());
/// assert!(validate_void_window(now - Duration::days(7) - Duration::milliseconds(1), now).is_err());
/// ```
pub fn validate_void_window(created_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), VoidError> {
    if now - created_at > Duration::days(VOID_WINDOW_DAYS) {
        return Err(VoidError::WindowExpired {
            days: VOID_WINDOW_DAYS,
        });
    }
    Ok(())
}

/// Checks `reason` against the fixed list. `"Other"` needs a non-blank
/// `custom_reason`, which is trimmed and kept.
pub fn validate_void_reason(reason: &str, custom_reason: Option<&str>) -> Result<VoidReason, VoidError> {
    match reason {
        "Wrong Items" => Ok(VoidReason::WrongItems),
        "Test Transaction" => Ok(VoidReason::TestTransaction),
        "Customer Dispute" => Ok(VoidReason::CustomerDispute),
        "Duplicate Entry" => Ok(VoidReason::DuplicateEntry),
        VoidReason::OTHER_LABEL => match custom_reason.map(str::trim) {
            Some(text) if !text.is_empty() => Ok(VoidReason::Other(text.to_string())),
            _ => Err(VoidError::MissingCustomReason),
        },
        unknown => Err(VoidError::InvalidReason(unknown.to_string())),
    }
}

/// Returns `reason` verbatim, or `Other: {custom_reason}` for `"Other"`.
///
/// An `"Other"` with no usable text comes back as plain `"Other"`.
pub fn format_void_reason(reason: &str, custom_reason: Option<&str>) -> String {
    if reason != VoidReason::OTHER_LABEL {
        return reason.to_string();
    }

    match custom_reason.map(str::trim) {
        Some(text) if !text.is_empty() => format!("{}: {}", VoidReason::OTHER_LABEL, text),
        _ => VoidReason::OTHER_LABEL.to_string(),
    }
}

// =============================================================================
// Composed Check
// =============================================================================

/// Everything needed to decide a void, already fetched by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VoidRequest {
    pub is_voided: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub reason: String,
    pub custom_reason: Option<String>,
}

/// Runs the three checks in order: not already voided, inside the window,
/// valid reason.
pub fn validate_void(request: &VoidRequest, now: DateTime<Utc>) -> Result<VoidReason, VoidError> {
    validate_not_already_voided(request.is_voided)?;
    validate_void_window(request.created_at, now)?;
    validate_void_reason(&request.reason, request.custom_reason.as_deref())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn request(is_voided: bool, age: Duration, reason: &str) -> (VoidRequest, DateTime<Utc>) {
        let now = Utc::now();
        (
            VoidRequest {
                is_voided,
                created_at: now - age,
                reason: reason.to_string(),
                custom_reason: None,
            },
            now,
        )
    }

    #[test]
    fn test_not_already_voided() {
        assert!(validate_not_already_voided(false).is_ok());
        assert_eq!(validate_not_already_voided(true), Err(VoidError::AlreadyVoided));
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let now = Utc::now();
        let exactly_seven_days = now - Duration::hours(7 * 24);
        assert!(validate_void_window(exactly_seven_days, now).is_ok());

        let just_past = exactly_seven_days - Duration::milliseconds(1);
        assert_eq!(
            validate_void_window(just_past, now),
            Err(VoidError::WindowExpired { days: 7 })
        );
    }

    #[test]
    fn test_window_accepts_fresh_and_future_timestamps() {
        let now = Utc::now();
        assert!(validate_void_window(now, now).is_ok());
        assert!(validate_void_window(now + Duration::minutes(5), now).is_ok());
    }

    #[test]
    fn test_reason_list() {
        for label in ["Wrong Items", "Test Transaction", "Customer Dispute", "Duplicate Entry"] {
            let reason = validate_void_reason(label, None).unwrap();
            assert_eq!(reason.label(), label);
            assert_eq!(reason.to_string(), label);
        }

        assert_eq!(
            validate_void_reason("Changed mind", None),
            Err(VoidError::InvalidReason("Changed mind".to_string()))
        );
        assert!(validate_void_reason("wrong items", None).is_err());
    }

    #[test]
    fn test_other_requires_custom_text() {
        assert_eq!(
            validate_void_reason("Other", Some("")),
            Err(VoidError::MissingCustomReason)
        );
        assert_eq!(
            validate_void_reason("Other", Some("   ")),
            Err(VoidError::MissingCustomReason)
        );
        assert_eq!(validate_void_reason("Other", None), Err(VoidError::MissingCustomReason));

        let reason = validate_void_reason("Other", Some("damaged goods")).unwrap();
        assert_eq!(reason, VoidReason::Other("damaged goods".to_string()));
        assert_eq!(reason.to_string(), "Other: damaged goods");
    }

    #[test]
    fn test_format_void_reason() {
        assert_eq!(format_void_reason("Other", Some("damaged goods")), "Other: damaged goods");
        assert_eq!(format_void_reason("Wrong Items", Some("ignored")), "Wrong Items");
        assert_eq!(format_void_reason("Other", None), "Other");
    }

    #[test]
    fn test_from_str() {
        let reason: VoidReason = "Duplicate Entry".parse().unwrap();
        assert_eq!(reason, VoidReason::DuplicateEntry);
        assert!("Other".parse::<VoidReason>().is_err());
    }

    #[test]
    fn test_already_voided_takes_precedence() {
        let (req, now) = request(true, Duration::days(30), "Nope");
        assert_eq!(validate_void(&req, now), Err(VoidError::AlreadyVoided));
    }

    #[test]
    fn test_window_before_reason() {
        let (req, now) = request(false, Duration::days(8), "Nope");
        assert_eq!(validate_void(&req, now), Err(VoidError::WindowExpired { days: 7 }));
    }

    #[test]
    fn test_composed_success() {
        let (mut req, now) = request(false, Duration::days(2), "Other");
        req.custom_reason = Some("customer walked out".to_string());
        assert_eq!(
            validate_void(&req, now).unwrap().to_string(),
            "Other: customer walked out"
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            VoidError::WindowExpired { days: 7 }.to_string(),
            "Transactions can only be voided within 7 days of the sale"
        );
        assert_eq!(
            VoidError::AlreadyVoided.to_string(),
            "Transaction has already been voided"
        );
    }
}
