//! # Store Settings
//!
//! Store-wide configuration, loaded once at startup by the host process
//! (see `tally_db::config::SettingsStore`) and changed only through an
//! explicit upsert.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

/// Store-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StoreSettings {
    /// Store name (receipts, dashboard header).
    pub store_name: String,

    /// Currency code (ISO 4217).
    pub currency_code: String,

    /// Currency symbol for display.
    pub currency_symbol: String,

    /// Credit limit given to new customers, in cents. Zero means new
    /// customers start with tabs disabled.
    pub default_credit_limit_cents: i64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            store_name: "Tally POS".to_string(),
            currency_code: "USD".to_string(),
            currency_symbol: "$".to_string(),
            default_credit_limit_cents: 0,
        }
    }
}

impl StoreSettings {
    pub fn default_credit_limit(&self) -> Money {
        Money::from_cents(self.default_credit_limit_cents)
    }

    /// Formats money with this store's currency symbol.
    pub fn format_currency(&self, amount: Money) -> String {
        amount.format_with(&self.currency_symbol)
    }

    /// Applies the fields present in `update`, leaving the rest untouched.
    pub fn apply(&mut self, update: SettingsUpdate) {
        if let Some(store_name) = update.store_name {
            self.store_name = store_name;
        }
        if let Some(currency_code) = update.currency_code {
            self.currency_code = currency_code;
        }
        if let Some(currency_symbol) = update.currency_symbol {
            self.currency_symbol = currency_symbol;
        }
        if let Some(limit) = update.default_credit_limit_cents {
            self.default_credit_limit_cents = limit;
        }
    }
}

/// Partial settings change. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub store_name: Option<String>,
    pub currency_code: Option<String>,
    pub currency_symbol: Option<String>,
    pub default_credit_limit_cents: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        let mut settings = StoreSettings::default();
        assert_eq!(settings.format_currency(Money::from_cents(1234)), "$12.34");

        settings.currency_symbol = "£".to_string();
        assert_eq!(settings.format_currency(Money::from_cents(-5)), "-£0.05");
    }

    #[test]
    fn test_apply_partial_update() {
        let mut settings = StoreSettings::default();
        settings.apply(SettingsUpdate {
            store_name: Some("The Copper Still".to_string()),
            default_credit_limit_cents: Some(25_000),
            ..SettingsUpdate::default()
        });

        assert_eq!(settings.store_name, "The Copper Still");
        assert_eq!(settings.default_credit_limit(), Money::from_cents(25_000));
        assert_eq!(settings.currency_code, "USD");
    }

    #[test]
    fn test_serde_uses_camel_case() {
        let json = serde_json::to_value(StoreSettings::default()).unwrap();
        assert_eq!(json["defaultCreditLimitCents"], 0);
        assert_eq!(json["storeName"], "Tally POS");
    }
}
