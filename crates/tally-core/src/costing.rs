//! # Costing
//!
//! Product cost and margin. Nothing here is stored: cost follows ingredient
//! prices, so it is recomputed whenever a product is read.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

/// One costed line of a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CostLine {
    pub quantity_required: f64,
    /// Cost per unit of the ingredient, if known.
    pub unit_cost: Option<Money>,
}

/// Price, cost and what is left over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Margin {
    pub price: Money,
    pub cost: Money,
    pub profit: Money,
    /// Profit as a share of price, one decimal. `None` for a free item.
    pub margin_percent: Option<f64>,
}

/// Total cost of one serving of a recipe.
///
/// Returns `None` if any line has no unit cost; a partial figure would read
/// as a better margin than the product really has.
pub fn recipe_cost(lines: &[CostLine]) -> Option<Money> {
    let mut exact_cents = 0.0;
    for line in lines {
        let unit_cost = line.unit_cost?;
        exact_cents += unit_cost.cents() as f64 * line.quantity_required;
    }
    Some(Money::from_cents(exact_cents.round() as i64))
}

/// Cost of one sale of a directly linked product (one package).
pub fn linked_cost(package_size: f64, unit_cost: Money) -> Money {
    unit_cost.scale(package_size)
}

/// Profit and margin for a price and a cost.
///
/// ## Example
/// ```rust
/// use tally_core::costing::calculate_margin;
/// use tally_core::money::Money;
///
/// let margin = calculate_margin(Money::from_cents(1200), Money::from_cents(300));
/// assert_eq!(margin.profit, Money::from_cents(900));
/// assert_eq!(margin.margin_percent, Some(75.0));
/// ```
pub fn calculate_margin(price: Money, cost: Money) -> Margin {
    let profit = price - cost;
    let margin_percent = if price.is_positive() {
        let per_mille = profit.cents() as f64 * 1000.0 / price.cents() as f64;
        Some(per_mille.round() / 10.0)
    } else {
        None
    };

    Margin {
        price,
        cost,
        profit,
        margin_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_cost_rounds_once() {
        // 2 oz at 37¢, 1 oz at 12¢, 0.25 oz at 10¢
        let lines = [
            CostLine {
                quantity_required: 2.0,
                unit_cost: Some(Money::from_cents(37)),
            },
            CostLine {
                quantity_required: 1.0,
                unit_cost: Some(Money::from_cents(12)),
            },
            CostLine {
                quantity_required: 0.25,
                unit_cost: Some(Money::from_cents(10)),
            },
        ];
        // 74 + 12 + 2.5 = 88.5 → 89
        assert_eq!(recipe_cost(&lines), Some(Money::from_cents(89)));
    }

    #[test]
    fn test_recipe_cost_unknown_when_a_line_is_uncosted() {
        let lines = [
            CostLine {
                quantity_required: 2.0,
                unit_cost: Some(Money::from_cents(37)),
            },
            CostLine {
                quantity_required: 1.0,
                unit_cost: None,
            },
        ];
        assert_eq!(recipe_cost(&lines), None);
        assert_eq!(recipe_cost(&[]), Some(Money::zero()));
    }

    #[test]
    fn test_linked_cost() {
        assert_eq!(linked_cost(12.0, Money::from_cents(45)), Money::from_cents(540));
    }

    #[test]
    fn test_margin() {
        let margin = calculate_margin(Money::from_cents(1000), Money::from_cents(1250));
        assert_eq!(margin.profit, Money::from_cents(-250));
        assert_eq!(margin.margin_percent, Some(-25.0));

        let free = calculate_margin(Money::zero(), Money::from_cents(50));
        assert_eq!(free.margin_percent, None);
    }
}
