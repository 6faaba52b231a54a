//! # Availability Calculator
//!
//! Derives how many units of a product can be sold right now, and how
//! healthy that stock is, from the ingredients behind it.
//!
//! ## Stock Modes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Where a product's stock comes from                 │
//! │                                                                         │
//! │  Recipe (bill of materials)       servings = min( floor(on_hand_i /     │
//! │  ├── 2 oz vodka                                      qty_required_i) )  │
//! │  └── 1 oz lime juice              the scarcest ingredient binds         │
//! │                                                                         │
//! │  Linked ingredient                servings = floor(on_hand /            │
//! │  └── 1 can = 1 package                               package_size)      │
//! │                                                                         │
//! │  Neither (service item)           always available, no count            │
//! │                                                                         │
//! │  A recipe wins over a direct link when a product somehow has both.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Classification
//! ```text
//!   servings ≤ 0                      → Out
//!   no par level anywhere             → Available
//!   servings / threshold ≤ 0.25       → Critical
//!   servings / threshold < 1          → Low
//!   otherwise                         → Available
//! ```
//! The threshold is the par level expressed in servings: `par / package_size`
//! for a linked ingredient, and the smallest `par_i / qty_required_i` across
//! a recipe's lines.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Slack applied before flooring so `0.3 / 0.1` counts as 3 servings, not 2.
const SERVING_EPSILON: f64 = 1e-9;

/// Ratio at or below which stock is critical.
pub const CRITICAL_RATIO: f64 = 0.25;

// =============================================================================
// Inputs
// =============================================================================

/// One ingredient of a recipe, with its current stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RecipeLine {
    pub ingredient_id: String,
    /// Amount consumed per serving. Lines with a non-positive amount do not
    /// constrain the recipe.
    pub quantity_required: f64,
    pub on_hand: f64,
    pub par_level: Option<f64>,
}

/// A product's single directly linked ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LinkedStock {
    pub ingredient_id: String,
    pub on_hand: f64,
    /// Units per package; a non-positive size counts as 1.
    pub package_size: f64,
    pub par_level: Option<f64>,
}

impl LinkedStock {
    fn effective_package_size(&self) -> f64 {
        if self.package_size.is_finite() && self.package_size > 0.0 {
            self.package_size
        } else {
            1.0
        }
    }
}

/// Where a product's stock comes from. Exactly one mode applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "mode", content = "stock", rename_all = "snake_case")]
pub enum StockSource {
    Recipe(Vec<RecipeLine>),
    Linked(LinkedStock),
    Unlimited,
}

impl StockSource {
    /// Picks the authoritative mode: a non-empty recipe, else the direct
    /// link, else unlimited.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::availability::{LinkedStock, RecipeLine, StockSource};
    ///
    /// let linked = LinkedStock {
    ///     ingredient_id: "can".into(),
    ///     on_hand: 24.0,
    ///     package_size: 1.0,
    ///     par_level: None,
    /// };
    /// let line = RecipeLine {
    ///     ingredient_id: "rum".into(),
    ///     quantity_required: 2.0,
    ///     on_hand: 10.0,
    ///     par_level: None,
    /// };
    ///
    /// assert!(matches!(
    ///     StockSource::resolve(vec![line], Some(linked.clone())),
    ///     StockSource::Recipe(_)
    /// ));
    /// assert!(matches!(StockSource::resolve(vec![], Some(linked)), StockSource::Linked(_)));
    /// assert_eq!(StockSource::resolve(vec![], None), StockSource::Unlimited);
    /// ```
    pub fn resolve(recipe: Vec<RecipeLine>, linked: Option<LinkedStock>) -> Self {
        if !recipe.is_empty() {
            return StockSource::Recipe(recipe);
        }

        match linked {
            Some(stock) => StockSource::Linked(stock),
            None => StockSource::Unlimited,
        }
    }
}

// =============================================================================
// Outputs
// =============================================================================

/// Stock health of a sellable product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    Available,
    Low,
    Critical,
    Out,
}

/// Result of [`calculate_availability`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Availability {
    pub status: StockStatus,
    /// Whole servings that can be sold. `None` means unbounded.
    pub quantity_available: Option<i64>,
}

impl Availability {
    /// Availability of a product with no stock behind it.
    pub const fn unlimited() -> Self {
        Availability {
            status: StockStatus::Available,
            quantity_available: None,
        }
    }

    /// Whether `quantity` units can be sold.
    pub fn can_sell(&self, quantity: i64) -> bool {
        match self.quantity_available {
            None => true,
            Some(available) => available >= quantity,
        }
    }
}

// =============================================================================
// Calculation
// =============================================================================

/// Computes a product's sellable quantity and stock status.
///
/// Pure: the same source always yields the same availability.
pub fn calculate_availability(source: &StockSource) -> Availability {
    match source {
        StockSource::Unlimited => Availability::unlimited(),

        StockSource::Linked(stock) => {
            let package_size = stock.effective_package_size();
            let servings = whole_servings(stock.on_hand, package_size);
            let threshold = stock.par_level.map(|par| par / package_size);
            classified(servings, threshold)
        }

        StockSource::Recipe(lines) => {
            let constraining = constraining_lines(lines);

            let servings = match constraining
                .iter()
                .map(|line| whole_servings(line.on_hand, line.quantity_required))
                .min()
            {
                Some(servings) => servings,
                None => return Availability::unlimited(),
            };

            let threshold = constraining
                .iter()
                .filter_map(|line| line.par_level.map(|par| par / line.quantity_required))
                .fold(None, |min: Option<f64>, t| match min {
                    Some(current) if current <= t => Some(current),
                    _ => Some(t),
                });

            classified(servings, threshold)
        }
    }
}

/// Drops lines that consume nothing and folds repeated ingredients into one
/// line, so an ingredient listed twice is drawn on for its combined amount.
fn constraining_lines(lines: &[RecipeLine]) -> Vec<RecipeLine> {
    let mut merged: Vec<RecipeLine> = Vec::with_capacity(lines.len());
    for line in lines {
        if !(line.quantity_required.is_finite() && line.quantity_required > 0.0) {
            continue;
        }
        match merged.iter_mut().find(|m| m.ingredient_id == line.ingredient_id) {
            Some(existing) => existing.quantity_required += line.quantity_required,
            None => merged.push(line.clone()),
        }
    }
    merged
}

fn whole_servings(on_hand: f64, per_serving: f64) -> i64 {
    ((on_hand / per_serving) + SERVING_EPSILON).floor() as i64
}

fn classified(servings: i64, threshold: Option<f64>) -> Availability {
    Availability {
        status: classify(servings, threshold),
        quantity_available: Some(servings.max(0)),
    }
}

/// Maps a serving count against a threshold (in servings) to a status.
pub fn classify(servings: i64, threshold: Option<f64>) -> StockStatus {
    if servings <= 0 {
        return StockStatus::Out;
    }

    let threshold = match threshold {
        Some(t) if t.is_finite() && t > 0.0 => t,
        _ => return StockStatus::Available,
    };

    let ratio = servings as f64 / threshold;
    if ratio <= CRITICAL_RATIO {
        StockStatus::Critical
    } else if ratio < 1.0 {
        StockStatus::Low
    } else {
        StockStatus::Available
    }
}

// =============================================================================
// Category Roll-up
// =============================================================================

/// Counts of products per status, for a category's stock-health summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockHealth {
    pub available: u32,
    pub low: u32,
    pub critical: u32,
    pub out: u32,
}

impl StockHealth {
    pub fn record(&mut self, status: StockStatus) {
        match status {
            StockStatus::Available => self.available += 1,
            StockStatus::Low => self.low += 1,
            StockStatus::Critical => self.critical += 1,
            StockStatus::Out => self.out += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.available + self.low + self.critical + self.out
    }

    /// Products that are low, critical or out.
    pub fn needing_attention(&self) -> u32 {
        self.low + self.critical + self.out
    }
}

impl FromIterator<StockStatus> for StockHealth {
    fn from_iter<I: IntoIterator<Item = StockStatus>>(iter: I) -> Self {
        let mut health = StockHealth::default();
        for status in iter {
            health.record(status);
        }
        health
    }
}

// =============================================================================
// Sale Consumption
// =============================================================================

/// Amount of one ingredient a sale draws down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct IngredientUsage {
    pub ingredient_id: String,
    pub quantity: f64,
}

/// Ingredient deductions implied by selling `quantity_sold` units.
///
/// A recipe that lists the same ingredient twice produces one combined entry.
pub fn ingredient_usage(source: &StockSource, quantity_sold: i64) -> Vec<IngredientUsage> {
    let sold = quantity_sold as f64;

    match source {
        StockSource::Unlimited => Vec::new(),

        StockSource::Linked(stock) => vec![IngredientUsage {
            ingredient_id: stock.ingredient_id.clone(),
            quantity: stock.effective_package_size() * sold,
        }],

        StockSource::Recipe(lines) => constraining_lines(lines)
            .into_iter()
            .map(|line| IngredientUsage {
                ingredient_id: line.ingredient_id,
                quantity: line.quantity_required * sold,
            })
            .collect(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
