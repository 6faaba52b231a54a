//! # Transaction Repository
//!
//! Finalized sales and their void overlay.
//!
//! ## Void Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Void Lifecycle                                   │
//! │                                                                         │
//! │  1. RECORD                                                             │
//! │     └── record_sale() → Transaction { is_voided: false }               │
//! │                                                                         │
//! │  2. VOID (at most once)                                                │
//! │     ├── fetch row                                                      │
//! │     ├── validate_void(): already voided? → window? → reason?           │
//! │     ├── voided_by present?                                             │
//! │     └── UPDATE ... WHERE id = ? AND is_voided = 0                      │
//! │             │                                                           │
//! │             └── 0 rows → someone else voided it first → AlreadyVoided  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use tally_core::validation::validate_price;
use tally_core::void::validate_void;
use tally_core::{Money, Transaction, ValidationError, VoidError, VoidRequest};

use crate::error::{DbError, DbResult};

const TRANSACTION_COLUMNS: &str = "id, receipt_number, customer_id, employee_id, total_cents, \
     created_at, is_voided, voided_at, voided_by, void_reason";

/// Input for recording a finalized sale.
#[derive(Debug, Clone)]
pub struct NewSale {
    pub customer_id: Option<String>,
    pub employee_id: String,
    pub total: Money,
    pub created_at: DateTime<Utc>,
}

/// Who is voiding and why.
#[derive(Debug, Clone)]
pub struct VoidCommand {
    pub voided_by: String,
    /// One of the fixed void reason labels.
    pub reason: String,
    /// Free text, required when `reason` is `"Other"`.
    pub custom_reason: Option<String>,
}

/// Repository for sale transactions.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Records a finalized sale and assigns its receipt number.
    pub async fn record_sale(&self, sale: NewSale) -> DbResult<Transaction> {
        validate_price(sale.total)?;
        if sale.employee_id.trim().is_empty() {
            return Err(ValidationError::required("employee").into());
        }

        let mut tx = self.pool.begin().await?;

        let prefix = sale.created_at.format("%Y%m%d").to_string();
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE receipt_number LIKE ?1")
                .bind(format!("{prefix}-%"))
                .fetch_one(&mut *tx)
                .await?;

        let transaction = Transaction {
            id: Uuid::new_v4().to_string(),
            receipt_number: receipt_number(&prefix, count + 1),
            customer_id: sale.customer_id,
            employee_id: sale.employee_id,
            total_cents: sale.total.cents(),
            created_at: sale.created_at,
            is_voided: false,
            voided_at: None,
            voided_by: None,
            void_reason: None,
        };

        debug!(
            id = %transaction.id,
            receipt_number = %transaction.receipt_number,
            "Recording sale"
        );

        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, receipt_number, customer_id, employee_id, total_cents,
                created_at, is_voided
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)
            "#,
        )
        .bind(&transaction.id)
        .bind(&transaction.receipt_number)
        .bind(&transaction.customer_id)
        .bind(&transaction.employee_id)
        .bind(transaction.total_cents)
        .bind(transaction.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(transaction)
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Transaction>> {
        let sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?1");
        let transaction = sqlx::query_as::<_, Transaction>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(transaction)
    }

    /// Most recent transactions first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Transaction>> {
        let sql = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions ORDER BY created_at DESC LIMIT ?1"
        );
        let transactions = sqlx::query_as::<_, Transaction>(&sql)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        Ok(transactions)
    }

    /// Voids a transaction as of `now`.
    ///
    /// The write only matches a row that is still unvoided, so of two
    /// racing voids exactly one succeeds and the other gets
    /// [`VoidError::AlreadyVoided`].
    pub async fn void(&self, id: &str, command: VoidCommand, now: DateTime<Utc>) -> DbResult<Transaction> {
        let transaction = self
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Transaction", id))?;

        let request = VoidRequest {
            is_voided: transaction.is_voided,
            created_at: transaction.created_at,
            reason: command.reason,
            custom_reason: command.custom_reason,
        };
        let reason = validate_void(&request, now)?;
        let void_reason = reason.to_string();

        let voided_by = command.voided_by.trim();
        if voided_by.is_empty() {
            return Err(ValidationError::required("voided by").into());
        }

        let result = sqlx::query(
            r#"
            UPDATE transactions SET
                is_voided = 1,
                voided_at = ?2,
                voided_by = ?3,
                void_reason = ?4
            WHERE id = ?1 AND is_voided = 0
            "#,
        )
        .bind(id)
        .bind(now)
        .bind(voided_by)
        .bind(&void_reason)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(VoidError::AlreadyVoided.into());
        }

        info!(
            transaction_id = %id,
            receipt_number = %transaction.receipt_number,
            voided_by = %voided_by,
            reason = %void_reason,
            "Transaction voided"
        );

        Ok(Transaction {
            is_voided: true,
            voided_at: Some(now),
            voided_by: Some(voided_by.to_string()),
            void_reason: Some(void_reason),
            ..transaction
        })
    }
}

/// Receipt number in format `YYYYMMDD-NNNN`, numbered per day.
///
/// ## Example
/// `20261019-0001`
fn receipt_number(date_prefix: &str, sequence: i64) -> String {
    format!("{}-{:04}", date_prefix, sequence)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::{Duration, TimeZone};
    use tally_core::CoreError;

    async fn setup() -> TransactionRepository {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.transactions()
    }

    fn sale_at(created_at: DateTime<Utc>) -> NewSale {
        NewSale {
            customer_id: None,
            employee_id: "emp-1".to_string(),
            total: Money::from_cents(1850),
            created_at,
        }
    }

    fn command(reason: &str, custom: Option<&str>) -> VoidCommand {
        VoidCommand {
            voided_by: "manager-1".to_string(),
            reason: reason.to_string(),
            custom_reason: custom.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_receipt_numbers_count_per_day() {
        let repo = setup().await;
        let day = Utc.with_ymd_and_hms(2026, 10, 19, 21, 0, 0).unwrap();

        let first = repo.record_sale(sale_at(day)).await.unwrap();
        let second = repo.record_sale(sale_at(day)).await.unwrap();
        let next_day = repo.record_sale(sale_at(day + Duration::days(1))).await.unwrap();

        assert_eq!(first.receipt_number, "20261019-0001");
        assert_eq!(second.receipt_number, "20261019-0002");
        assert_eq!(next_day.receipt_number, "20261020-0001");

        assert_eq!(repo.get(&first.id).await.unwrap(), Some(first));
        assert_eq!(repo.list_recent(10).await.unwrap()[0], next_day);
    }

    #[tokio::test]
    async fn test_void_marks_transaction() {
        let repo = setup().await;
        let now = Utc::now();
        let sale = repo.record_sale(sale_at(now - Duration::days(2))).await.unwrap();

        let voided = repo
            .void(&sale.id, command("Other", Some("  spilled drink ")), now)
            .await
            .unwrap();
        assert!(voided.is_voided);
        assert_eq!(voided.void_reason.as_deref(), Some("Other: spilled drink"));

        let stored = repo.get(&sale.id).await.unwrap().unwrap();
        assert!(stored.is_voided);
        assert_eq!(stored.voided_by.as_deref(), Some("manager-1"));
        assert_eq!(stored.void_reason.as_deref(), Some("Other: spilled drink"));
        assert_eq!(stored.total_cents, sale.total_cents);
    }

    #[tokio::test]
    async fn test_second_void_fails() {
        let repo = setup().await;
        let now = Utc::now();
        let sale = repo.record_sale(sale_at(now)).await.unwrap();

        repo.void(&sale.id, command("Wrong Items", None), now).await.unwrap();

        // Already-voided wins even with a bad reason.
        let err = repo
            .void(&sale.id, command("Because", None), now)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Void(VoidError::AlreadyVoided))));
        assert_eq!(err.to_string(), "Transaction has already been voided");

        // Also when no one is named as the voider.
        let mut anonymous = command("Wrong Items", None);
        anonymous.voided_by = "  ".to_string();
        let err = repo.void(&sale.id, anonymous, now).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Void(VoidError::AlreadyVoided))));
    }

    #[tokio::test]
    async fn test_void_window_boundary() {
        let repo = setup().await;
        let now = Utc::now();

        let edge = repo.record_sale(sale_at(now - Duration::days(7))).await.unwrap();
        assert!(repo.void(&edge.id, command("Duplicate Entry", None), now).await.is_ok());

        let stale = repo
            .record_sale(sale_at(now - Duration::days(7) - Duration::milliseconds(1)))
            .await
            .unwrap();
        let err = repo
            .void(&stale.id, command("Duplicate Entry", None), now)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::Void(VoidError::WindowExpired { days: 7 }))
        ));
        assert!(!repo.get(&stale.id).await.unwrap().unwrap().is_voided);
    }

    #[tokio::test]
    async fn test_void_rejects_bad_input() {
        let repo = setup().await;
        let now = Utc::now();
        let sale = repo.record_sale(sale_at(now)).await.unwrap();

        let err = repo.void(&sale.id, command("Other", Some("   ")), now).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::Void(VoidError::MissingCustomReason))
        ));

        let mut anonymous = command("Test Transaction", None);
        anonymous.voided_by = " ".to_string();
        let err = repo.void(&sale.id, anonymous, now).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::Validation(ValidationError::Required { .. }))
        ));

        assert!(matches!(
            repo.void("missing", command("Test Transaction", None), now)
                .await
                .unwrap_err(),
            DbError::NotFound { .. }
        ));
        assert!(!repo.get(&sale.id).await.unwrap().unwrap().is_voided);
    }

    #[tokio::test]
    async fn test_record_sale_validates() {
        let repo = setup().await;
        let mut sale = sale_at(Utc::now());
        sale.total = Money::from_cents(-1);
        assert!(repo.record_sale(sale).await.is_err());

        let mut sale = sale_at(Utc::now());
        sale.employee_id = String::new();
        assert!(repo.record_sale(sale).await.is_err());
    }
}
