//! # Tab Repository
//!
//! Customers and their running tabs.
//!
//! Every balance change follows the same shape inside one SQL transaction:
//! read the customer row, ask `tally_core::tab` whether the change is
//! allowed, then write the balance the rule returned. A refused change
//! rolls back and writes nothing.

use chrono::Utc;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use tally_core::tab::{
    calculate_credit_usage, credit_warning_level, validate_tab_charge, validate_tab_settlement,
};
use tally_core::validation::{validate_credit_limit, validate_name};
use tally_core::{
    CreditUsage, CreditWarningLevel, Customer, Money, StoreSettings, TabCharge, TabSettlement,
    TabStatus,
};

use crate::error::{DbError, DbResult};

const CUSTOMER_COLUMNS: &str =
    "id, name, email, balance_cents, credit_limit_cents, tab_status, created_at, updated_at";

/// Input for a new customer.
#[derive(Debug, Clone, Default)]
pub struct NewCustomer {
    pub name: String,
    pub email: Option<String>,
    /// `None` takes the store's default credit limit.
    pub credit_limit: Option<Money>,
}

/// Balance, limit and how much of the line is in use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditSummary {
    pub balance: Money,
    pub credit_limit: Money,
    pub usage: CreditUsage,
    pub level: CreditWarningLevel,
}

/// Repository for customer tab operations.
#[derive(Debug, Clone)]
pub struct TabRepository {
    pool: SqlitePool,
}

impl TabRepository {
    /// Creates a new TabRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TabRepository { pool }
    }

    /// Opens a customer account with a zero balance.
    pub async fn create_customer(
        &self,
        new: NewCustomer,
        settings: &StoreSettings,
    ) -> DbResult<Customer> {
        let name = validate_name("name", &new.name)?;
        let credit_limit = new
            .credit_limit
            .unwrap_or_else(|| settings.default_credit_limit());
        validate_credit_limit(credit_limit)?;

        let email = new
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());

        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            balance_cents: 0,
            credit_limit_cents: credit_limit.cents(),
            tab_status: TabStatus::Active,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %customer.id, credit_limit = %credit_limit, "Creating customer");

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, name, email, balance_cents, credit_limit_cents,
                tab_status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(customer.balance_cents)
        .bind(customer.credit_limit_cents)
        .bind(customer.tab_status)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(customer)
    }

    pub async fn get_customer(&self, id: &str) -> DbResult<Option<Customer>> {
        let mut conn = self.pool.acquire().await?;
        fetch_customer(&mut conn, id).await
    }

    /// Suspends, freezes or reactivates a tab.
    pub async fn set_status(&self, id: &str, status: TabStatus) -> DbResult<Customer> {
        let result = sqlx::query("UPDATE customers SET tab_status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        info!(customer_id = %id, status = status.as_str(), "Tab status changed");
        self.require_customer(id).await
    }

    /// Sets the credit limit. Zero turns tabs off for the customer.
    pub async fn set_credit_limit(&self, id: &str, limit: Money) -> DbResult<Customer> {
        validate_credit_limit(limit)?;

        let result = sqlx::query(
            "UPDATE customers SET credit_limit_cents = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(limit.cents())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        info!(customer_id = %id, credit_limit = %limit, "Credit limit changed");
        self.require_customer(id).await
    }

    /// Puts `amount` on the customer's tab.
    ///
    /// `allow_override` is a manager override: it lifts the credit cap but
    /// not the status or tabs-disabled checks.
    pub async fn charge(&self, id: &str, amount: Money, allow_override: bool) -> DbResult<TabCharge> {
        let mut tx = self.pool.begin().await?;

        let customer = fetch_customer(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))?;

        let charge = validate_tab_charge(
            amount,
            customer.balance(),
            customer.credit_limit(),
            customer.tab_status,
            allow_override,
        )?;

        write_balance(&mut tx, id, charge.new_balance).await?;
        tx.commit().await?;

        if charge.override_applied {
            warn!(
                customer_id = %id,
                new_balance = %charge.new_balance,
                credit_limit = %customer.credit_limit(),
                "Tab charge accepted over credit limit by override"
            );
        } else {
            info!(customer_id = %id, amount = %amount, new_balance = %charge.new_balance, "Tab charged");
        }

        Ok(charge)
    }

    /// Records a payment against the customer's tab.
    pub async fn settle(&self, id: &str, amount: Money) -> DbResult<TabSettlement> {
        let mut tx = self.pool.begin().await?;

        let customer = fetch_customer(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))?;

        let settlement = validate_tab_settlement(amount, customer.balance())?;

        write_balance(&mut tx, id, settlement.new_balance).await?;
        tx.commit().await?;

        info!(
            customer_id = %id,
            amount = %amount,
            new_balance = %settlement.new_balance,
            "Tab payment recorded"
        );

        Ok(settlement)
    }

    /// Credit usage for the customer's dashboard badge.
    pub async fn credit_summary(&self, id: &str) -> DbResult<CreditSummary> {
        let customer = self.require_customer(id).await?;
        let balance = customer.balance();
        let credit_limit = customer.credit_limit();

        Ok(CreditSummary {
            balance,
            credit_limit,
            usage: calculate_credit_usage(balance, credit_limit),
            level: credit_warning_level(balance, credit_limit),
        })
    }

    async fn require_customer(&self, id: &str) -> DbResult<Customer> {
        self.get_customer(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }
}

async fn fetch_customer(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Customer>> {
    let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1");
    let customer = sqlx::query_as::<_, Customer>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(customer)
}

async fn write_balance(conn: &mut SqliteConnection, id: &str, balance: Money) -> DbResult<()> {
    sqlx::query("UPDATE customers SET balance_cents = ?2, updated_at = ?3 WHERE id = ?1")
        .bind(id)
        .bind(balance.cents())
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use tally_core::{CoreError, TabError};

    async fn setup() -> TabRepository {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.tabs()
    }

    async fn customer_with(repo: &TabRepository, limit_cents: i64, balance_cents: i64) -> Customer {
        let customer = repo
            .create_customer(
                NewCustomer {
                    name: "Sam Regular".to_string(),
                    credit_limit: Some(Money::from_cents(limit_cents)),
                    ..NewCustomer::default()
                },
                &StoreSettings::default(),
            )
            .await
            .unwrap();

        if balance_cents > 0 {
            repo.charge(&customer.id, Money::from_cents(balance_cents), true)
                .await
                .unwrap();
        }
        customer
    }

    fn balance_of(customer: &Option<Customer>) -> i64 {
        customer.as_ref().map(|c| c.balance_cents).unwrap_or(-1)
    }

    #[tokio::test]
    async fn test_new_customer_takes_default_limit() {
        let repo = setup().await;
        let settings = StoreSettings {
            default_credit_limit_cents: 20_000,
            ..StoreSettings::default()
        };

        let customer = repo
            .create_customer(
                NewCustomer {
                    name: "Alex".to_string(),
                    email: Some("  ".to_string()),
                    credit_limit: None,
                },
                &settings,
            )
            .await
            .unwrap();

        assert_eq!(customer.credit_limit_cents, 20_000);
        assert_eq!(customer.email, None);
        assert_eq!(repo.get_customer(&customer.id).await.unwrap(), Some(customer));
    }

    #[tokio::test]
    async fn test_charge_writes_new_balance() {
        let repo = setup().await;
        let customer = customer_with(&repo, 50_000, 40_000).await;

        let charge = repo
            .charge(&customer.id, Money::from_cents(10_000), false)
            .await
            .unwrap();
        assert_eq!(charge.new_balance, Money::from_cents(50_000));
        assert!(!charge.override_applied);

        let stored = repo.get_customer(&customer.id).await.unwrap();
        assert_eq!(balance_of(&stored), 50_000);
    }

    #[tokio::test]
    async fn test_rejected_charge_writes_nothing() {
        let repo = setup().await;
        let customer = customer_with(&repo, 50_000, 45_000).await;

        let err = repo
            .charge(&customer.id, Money::from_cents(10_000), false)
            .await
            .unwrap_err();

        match err {
            DbError::Core(CoreError::Tab(ref tab)) => {
                assert_eq!(tab.would_exceed_by(), Some(Money::from_cents(5_000)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.is_rejection());

        let stored = repo.get_customer(&customer.id).await.unwrap();
        assert_eq!(balance_of(&stored), 45_000);
    }

    #[tokio::test]
    async fn test_override_lifts_cap() {
        let repo = setup().await;
        let customer = customer_with(&repo, 50_000, 45_000).await;

        let charge = repo
            .charge(&customer.id, Money::from_cents(10_000), true)
            .await
            .unwrap();
        assert_eq!(charge.new_balance, Money::from_cents(55_000));
        assert!(charge.override_applied);

        let summary = repo.credit_summary(&customer.id).await.unwrap();
        assert_eq!(summary.usage, CreditUsage::Percent(110.0));
        assert_eq!(summary.level, CreditWarningLevel::Exceeded);
    }

    #[tokio::test]
    async fn test_status_and_disabled_tabs_block_charges() {
        let repo = setup().await;
        let customer = customer_with(&repo, 50_000, 0).await;

        repo.set_status(&customer.id, TabStatus::Frozen).await.unwrap();
        let err = repo
            .charge(&customer.id, Money::from_cents(100), true)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Tab(TabError::Frozen))));

        repo.set_status(&customer.id, TabStatus::Active).await.unwrap();
        repo.set_credit_limit(&customer.id, Money::zero()).await.unwrap();
        let err = repo
            .charge(&customer.id, Money::from_cents(100), true)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Tab(TabError::TabsDisabled))));

        assert!(repo
            .set_credit_limit(&customer.id, Money::from_cents(-1))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_settle() {
        let repo = setup().await;
        let customer = customer_with(&repo, 1_000, 30).await;

        let settlement = repo.settle(&customer.id, Money::from_cents(10)).await.unwrap();
        assert_eq!(settlement.new_balance, Money::from_cents(20));

        let err = repo
            .settle(&customer.id, Money::from_cents(600))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Payment amount exceeds balance of $0.20");

        let stored = repo.get_customer(&customer.id).await.unwrap();
        assert_eq!(balance_of(&stored), 20);
    }

    #[tokio::test]
    async fn test_credit_summary_warning_band() {
        let repo = setup().await;
        let customer = customer_with(&repo, 50_000, 40_000).await;

        let summary = repo.credit_summary(&customer.id).await.unwrap();
        assert_eq!(summary.usage, CreditUsage::Percent(80.0));
        assert_eq!(summary.level, CreditWarningLevel::Warning);
    }

    #[tokio::test]
    async fn test_unknown_customer() {
        let repo = setup().await;
        assert!(matches!(
            repo.charge("missing", Money::from_cents(100), false)
                .await
                .unwrap_err(),
            DbError::NotFound { .. }
        ));
        assert!(matches!(
            repo.set_status("missing", TabStatus::Suspended).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }
}
