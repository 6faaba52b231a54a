//! # Store Configuration
//!
//! Process-wide [`StoreSettings`], loaded once at startup from environment
//! variables and changed only through [`SettingsStore::reload`] or
//! [`SettingsStore::upsert`].
//!
//! ## Environment Variables
//! | Variable                     | Example      | Default      |
//! |------------------------------|--------------|--------------|
//! | `TALLY_STORE_NAME`           | `Copper Bar` | `Tally POS`  |
//! | `TALLY_CURRENCY_CODE`        | `EUR`        | `USD`        |
//! | `TALLY_CURRENCY_SYMBOL`      | `€`          | `$`          |
//! | `TALLY_DEFAULT_CREDIT_LIMIT` | `250.00`     | `0` (no tab) |
//!
//! ## Thread Safety
//! Reads take a shared lock and hand back a clone, so no lock is held
//! across a database call.

use std::env;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use tally_core::validation::{
    validate_credit_limit, validate_currency_code, validate_currency_symbol, validate_name,
};
use tally_core::{Money, SettingsUpdate, StoreSettings, ValidationError};

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Builds settings from a variable lookup, falling back to defaults.
fn settings_from_lookup<F>(lookup: F) -> Result<StoreSettings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut settings = StoreSettings::default();

    if let Some(name) = lookup("TALLY_STORE_NAME") {
        settings.store_name = validate_name("store name", &name)?;
    }

    if let Some(code) = lookup("TALLY_CURRENCY_CODE") {
        settings.currency_code = validate_currency_code(&code)?;
    }

    if let Some(symbol) = lookup("TALLY_CURRENCY_SYMBOL") {
        settings.currency_symbol = validate_currency_symbol(&symbol)?;
    }

    if let Some(raw) = lookup("TALLY_DEFAULT_CREDIT_LIMIT") {
        let amount: f64 = raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue("TALLY_DEFAULT_CREDIT_LIMIT".to_string()))?;
        if !amount.is_finite() {
            return Err(ConfigError::InvalidValue("TALLY_DEFAULT_CREDIT_LIMIT".to_string()));
        }
        let limit = Money::from_decimal(amount);
        validate_credit_limit(limit)?;
        settings.default_credit_limit_cents = limit.cents();
    }

    Ok(settings)
}

/// Shared, process-wide store settings.
///
/// Clones share the same underlying settings.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    inner: Arc<RwLock<StoreSettings>>,
}

impl SettingsStore {
    /// Wraps already-loaded settings.
    pub fn new(settings: StoreSettings) -> Self {
        SettingsStore {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    /// Loads settings from `TALLY_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let settings = settings_from_lookup(|key| env::var(key).ok())?;
        info!(store = %settings.store_name, "Store settings loaded");
        Ok(SettingsStore::new(settings))
    }

    /// Returns a snapshot of the current settings.
    pub async fn current(&self) -> StoreSettings {
        self.inner.read().await.clone()
    }

    /// Re-reads the environment and replaces the current settings.
    ///
    /// On error the current settings are left untouched.
    pub async fn reload(&self) -> Result<StoreSettings, ConfigError> {
        self.reload_from(|key| env::var(key).ok()).await
    }

    async fn reload_from<F>(&self, lookup: F) -> Result<StoreSettings, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fresh = settings_from_lookup(lookup)?;
        let mut guard = self.inner.write().await;
        *guard = fresh.clone();
        info!(store = %fresh.store_name, "Store settings reloaded");
        Ok(fresh)
    }

    /// Validates and applies a partial update, returning the new settings.
    pub async fn upsert(&self, mut update: SettingsUpdate) -> Result<StoreSettings, ConfigError> {
        if let Some(name) = update.store_name.as_deref() {
            update.store_name = Some(validate_name("store name", name)?);
        }
        if let Some(code) = update.currency_code.as_deref() {
            update.currency_code = Some(validate_currency_code(code)?);
        }
        if let Some(symbol) = update.currency_symbol.as_deref() {
            update.currency_symbol = Some(validate_currency_symbol(symbol)?);
        }
        if let Some(cents) = update.default_credit_limit_cents {
            validate_credit_limit(Money::from_cents(cents))?;
        }

        let mut guard = self.inner.write().await;
        guard.apply(update);
        info!(store = %guard.store_name, "Store settings updated");
        Ok(guard.clone())
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        SettingsStore::new(StoreSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = settings_from_lookup(|_| None).unwrap();
        assert_eq!(settings, StoreSettings::default());
    }

    #[test]
    fn test_reads_variables() {
        let env = vars(&[
            ("TALLY_STORE_NAME", "  The Copper Still "),
            ("TALLY_CURRENCY_CODE", "eur"),
            ("TALLY_CURRENCY_SYMBOL", "€"),
            ("TALLY_DEFAULT_CREDIT_LIMIT", "250.5"),
        ]);
        let settings = settings_from_lookup(|k| env.get(k).cloned()).unwrap();

        assert_eq!(settings.store_name, "The Copper Still");
        assert_eq!(settings.currency_code, "EUR");
        assert_eq!(settings.format_currency(Money::from_cents(500)), "€5.00");
        assert_eq!(settings.default_credit_limit_cents, 25_050);
    }

    #[test]
    fn test_rejects_bad_values() {
        let env = vars(&[("TALLY_DEFAULT_CREDIT_LIMIT", "lots")]);
        let err = settings_from_lookup(|k| env.get(k).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref v) if v == "TALLY_DEFAULT_CREDIT_LIMIT"));

        let env = vars(&[("TALLY_DEFAULT_CREDIT_LIMIT", "-10")]);
        let err = settings_from_lookup(|k| env.get(k).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let env = vars(&[("TALLY_CURRENCY_CODE", "dollars")]);
        assert!(settings_from_lookup(|k| env.get(k).cloned()).is_err());

        let env = vars(&[("TALLY_CURRENCY_SYMBOL", "  ")]);
        assert!(settings_from_lookup(|k| env.get(k).cloned()).is_err());
    }

    #[tokio::test]
    async fn test_upsert_checks_currency_like_the_environment() {
        let store = SettingsStore::default();

        let err = store
            .upsert(SettingsUpdate {
                currency_code: Some("dollars".to_string()),
                ..SettingsUpdate::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let err = store
            .upsert(SettingsUpdate {
                currency_symbol: Some(" ".to_string()),
                ..SettingsUpdate::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert_eq!(store.current().await, StoreSettings::default());

        let updated = store
            .upsert(SettingsUpdate {
                currency_code: Some("gbp".to_string()),
                currency_symbol: Some("£".to_string()),
                ..SettingsUpdate::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.currency_code, "GBP");
        assert_eq!(updated.format_currency(Money::from_cents(250)), "£2.50");
    }

    #[tokio::test]
    async fn test_upsert_applies_partial_update() {
        let store = SettingsStore::default();
        let shared = store.clone();

        let updated = store
            .upsert(SettingsUpdate {
                default_credit_limit_cents: Some(10_000),
                ..SettingsUpdate::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.default_credit_limit(), Money::from_cents(10_000));
        assert_eq!(updated.store_name, "Tally POS");
        assert_eq!(shared.current().await, updated);
    }

    #[tokio::test]
    async fn test_rejected_upsert_changes_nothing() {
        let store = SettingsStore::default();
        let result = store
            .upsert(SettingsUpdate {
                store_name: Some("   ".to_string()),
                default_credit_limit_cents: Some(5_000),
                ..SettingsUpdate::default()
            })
            .await;

        assert!(result.is_err());
        assert_eq!(store.current().await, StoreSettings::default());
    }

    #[tokio::test]
    async fn test_reload_replaces_settings() {
        let store = SettingsStore::default();
        store
            .upsert(SettingsUpdate {
                store_name: Some("Before".to_string()),
                ..SettingsUpdate::default()
            })
            .await
            .unwrap();

        let env = vars(&[("TALLY_STORE_NAME", "After")]);
        let reloaded = store.reload_from(|k| env.get(k).cloned()).await.unwrap();
        assert_eq!(reloaded.store_name, "After");
        assert_eq!(store.current().await.store_name, "After");

        let bad = vars(&[("TALLY_CURRENCY_CODE", "xx")]);
        assert!(store.reload_from(|k| bad.get(k).cloned()).await.is_err());
        assert_eq!(store.current().await.store_name, "After");
    }
}
