//! # tally-core: Pure Business Logic for Tally POS
//!
//! Everything in here is a pure function over already-fetched data. The
//! persistence layer (`tally-db`) loads rows, calls into this crate, and
//! writes back whatever decision comes out.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │             Dashboard request handlers (external)               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tally-db (repositories)                      │   │
//! │  │    fetch rows ──► call tally-core ──► persist the outcome       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐          │   │
//! │  │  │ availability │  │     tab      │  │     void     │          │   │
//! │  │  │ recipe / BOM │  │ charge/settle│  │ 7-day window │          │   │
//! │  │  └──────────────┘  └──────────────┘  └──────────────┘          │   │
//! │  │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐          │   │
//! │  │  │    money     │  │   costing    │  │  validation  │          │   │
//! │  │  └──────────────┘  └──────────────┘  └──────────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`availability`] - Sellable status derived from a linked ingredient or a recipe
//! - [`tab`] - Customer tab charge/settlement guards and credit usage
//! - [`void`] - Void window, void reason rules
//! - [`costing`] - Cost and margin, recomputed on read
//! - [`money`] - Integer-cent money type
//! - [`types`] - Stored entities (Ingredient, Product, Customer, Transaction)
//! - [`settings`] - Store-wide settings shape
//! - [`validation`] - Input guards used before writes
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::money::Money;
//! use tally_core::tab::{validate_tab_charge, TabStatus};
//!
//! let charge = validate_tab_charge(
//!     Money::from_cents(10_000),
//!     Money::from_cents(40_000),
//!     Money::from_cents(50_000),
//!     TabStatus::Active,
//!     false,
//! )
//! .unwrap();
//!
//! assert_eq!(charge.new_balance, Money::from_cents(50_000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod availability;
pub mod costing;
pub mod error;
pub mod money;
pub mod settings;
pub mod tab;
pub mod types;
pub mod validation;
pub mod void;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use availability::{
    calculate_availability, ingredient_usage, Availability, IngredientUsage, LinkedStock,
    RecipeLine, StockHealth, StockSource, StockStatus,
};
pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use settings::{SettingsUpdate, StoreSettings};
pub use tab::{CreditUsage, CreditWarningLevel, TabCharge, TabError, TabSettlement, TabStatus};
pub use types::*;
pub use void::{VoidError, VoidReason, VoidRequest, VOID_WINDOW_DAYS};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a display name (ingredients, products, customers).
pub const MAX_NAME_LENGTH: usize = 200;
