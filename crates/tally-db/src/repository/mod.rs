//! # Repository Module
//!
//! Database repositories for Tally POS.
//!
//! ## Read → Rule → Write
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Repository Call Shape                               │
//! │                                                                         │
//! │  Dashboard / register handler                                          │
//! │       │                                                                 │
//! │       │  db.tabs().charge(id, amount, false)                           │
//! │       ▼                                                                 │
//! │  TabRepository                                                         │
//! │  ├── 1. SELECT the rows the rule needs                                 │
//! │  ├── 2. tally_core rule → Ok(new values) | Err(rejection)              │
//! │  └── 3. UPDATE with the values the rule returned                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CatalogRepository`](catalog::CatalogRepository) - Ingredients, products, recipes, stock
//! - [`TabRepository`](tab::TabRepository) - Customers, tab charges and payments
//! - [`TransactionRepository`](transaction::TransactionRepository) - Sales and voids

pub mod catalog;
pub mod tab;
pub mod transaction;
