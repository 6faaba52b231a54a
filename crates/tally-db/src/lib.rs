//! # tally-db: Database Layer for Tally POS
//!
//! SQLite persistence for the Tally bar POS, and the operations that run
//! `tally-core` rules against stored rows.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Data Flow                              │
//! │                                                                         │
//! │  Host process (register, dashboard)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     tally-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │   Config     │  │   │
//! │  │   │   (pool.rs)   │    │                │    │ (config.rs)  │  │   │
//! │  │   │               │    │ CatalogRepo    │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ TabRepo        │    │ Settings     │  │   │
//! │  │   │ + schema.rs   │    │ TransactionRepo│    │ Store        │  │   │
//! │  │   └───────────────┘    └───────┬────────┘    └──────────────┘  │   │
//! │  │                                │                                │   │
//! │  │                                ▼                                │   │
//! │  │                     tally-core rules (pure)                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (TALLY_DB_PATH)                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`schema`] - Table bootstrap
//! - [`config`] - Process-wide store settings
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_db::{Database, DbConfig, SettingsStore};
//!
//! let db = Database::new(DbConfig::from_env()?).await?;
//! let settings = SettingsStore::from_env()?;
//!
//! let availability = db.catalog().availability(&product_id).await?;
//! let charge = db.tabs().charge(&customer_id, amount, false).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod pool;
pub mod repository;
pub mod schema;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, SettingsStore};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::catalog::{CatalogRepository, NewIngredient, NewProduct};
pub use repository::tab::{CreditSummary, NewCustomer, TabRepository};
pub use repository::transaction::{NewSale, TransactionRepository, VoidCommand};
