//! # Domain Types
//!
//! Stored entities used throughout Tally POS.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Ingredient    │◄──│   RecipeItem    │──►│    Product      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  quantity (f64) │   │  qty required   │   │  price_cents    │       │
//! │  │  package_size   │   └─────────────────┘   │  linked_ingr.?  │       │
//! │  │  par_level?     │◄────────────────────────│  category_id?   │       │
//! │  └─────────────────┘                          └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │    Customer     │   │   Transaction   │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  balance_cents  │   │  total_cents    │                             │
//! │  │  credit_limit   │   │  void overlay   │                             │
//! │  │  tab_status     │   │  (once only)    │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Derived figures (availability, cost, margin) are deliberately absent;
//! they are computed on read by [`crate::availability`] and [`crate::costing`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::availability::LinkedStock;
use crate::money::Money;
use crate::tab::TabStatus;

// =============================================================================
// Catalog
// =============================================================================

/// A product category (Cocktails, Draft Beer, Merch...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// A stocked raw material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Ingredient {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub name: String,

    /// On-hand quantity, in `unit`.
    pub current_quantity: f64,

    /// Units per package. One unit of a directly linked product consumes
    /// one package.
    pub package_size: f64,

    /// Reorder threshold, in `unit`. `None` means no threshold.
    pub par_level: Option<f64>,

    /// Unit of measure label ("oz", "ml", "each").
    pub unit: String,

    /// Cost per `unit`, in cents.
    pub unit_cost_cents: Option<i64>,

    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Ingredient {
    /// Returns the unit cost as Money.
    #[inline]
    pub fn unit_cost(&self) -> Option<Money> {
        self.unit_cost_cents.map(Money::from_cents)
    }

    /// Stock view of this ingredient as a product's direct link.
    pub fn as_linked_stock(&self) -> LinkedStock {
        LinkedStock {
            ingredient_id: self.id.clone(),
            on_hand: self.current_quantity,
            package_size: self.package_size,
            par_level: self.par_level,
        }
    }
}

/// One line of a product's bill of materials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct RecipeItem {
    pub id: String,
    pub product_id: String,
    pub ingredient_id: String,
    /// Quantity of the ingredient consumed per unit sold, in the
    /// ingredient's unit.
    pub quantity_required: f64,
}

/// A sellable catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category_id: Option<String>,

    /// Price in cents.
    pub price_cents: i64,

    /// Direct stock link. Ignored when the product has recipe items.
    pub linked_ingredient_id: Option<String>,

    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Customers
// =============================================================================

/// A customer with a tab account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: Option<String>,

    /// Amount owed on the tab, in cents.
    pub balance_cents: i64,

    /// Credit limit in cents. Zero disables tabs for this customer.
    pub credit_limit_cents: i64,

    pub tab_status: TabStatus,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    #[inline]
    pub fn balance(&self) -> Money {
        Money::from_cents(self.balance_cents)
    }

    #[inline]
    pub fn credit_limit(&self) -> Money {
        Money::from_cents(self.credit_limit_cents)
    }
}

// =============================================================================
// Transactions
// =============================================================================

/// A finalized sale with its void overlay.
///
/// Everything except the `void*` fields is frozen once written. The overlay
/// moves from not-voided to voided at most once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Transaction {
    pub id: String,
    pub receipt_number: String,
    pub customer_id: Option<String>,
    pub employee_id: String,
    pub total_cents: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    pub is_voided: bool,

    #[ts(as = "Option<String>")]
    pub voided_at: Option<DateTime<Utc>>,

    /// Employee who voided the sale.
    pub voided_by: Option<String>,

    /// Formatted reason, e.g. `"Wrong Items"` or `"Other: damaged goods"`.
    pub void_reason: Option<String>,
}

impl Transaction {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn lime_juice() -> Ingredient {
        let now = Utc::now();
        Ingredient {
            id: "ing-lime".to_string(),
            name: "Lime Juice".to_string(),
            current_quantity: 32.0,
            package_size: 32.0,
            par_level: Some(64.0),
            unit: "oz".to_string(),
            unit_cost_cents: Some(25),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_ingredient_as_linked_stock() {
        let linked = lime_juice().as_linked_stock();
        assert_eq!(linked.ingredient_id, "ing-lime");
        assert_eq!(linked.package_size, 32.0);
        assert_eq!(linked.on_hand, 32.0);
        assert_eq!(linked.par_level, Some(64.0));
    }

    #[test]
    fn test_money_accessors() {
        assert_eq!(lime_juice().unit_cost(), Some(Money::from_cents(25)));
    }
}
