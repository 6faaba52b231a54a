//! # Catalog Repository
//!
//! Categories, ingredients, products and recipes, plus everything derived
//! from them on read: availability, category stock health, cost and margin.
//!
//! ## Stock Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Stock Flow                                      │
//! │                                                                         │
//! │  record_count()  ──► ingredients.current_quantity                      │
//! │                              │                                          │
//! │                              ▼                                          │
//! │  stock_source()  ──► StockSource::{Recipe, Linked, Unlimited}          │
//! │                              │                                          │
//! │              ┌───────────────┼─────────────────┐                        │
//! │              ▼               ▼                 ▼                        │
//! │       availability()  category_health()   apply_sale()                 │
//! │                                            (draws stock down,          │
//! │                                             one SQL transaction)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use tally_core::availability::{calculate_availability, ingredient_usage};
use tally_core::costing::{calculate_margin, linked_cost, recipe_cost, CostLine, Margin};
use tally_core::validation::{
    validate_count_quantity, validate_name, validate_package_size, validate_par_level,
    validate_price, validate_recipe_quantity,
};
use tally_core::{
    Availability, Category, Ingredient, IngredientUsage, Money, Product, RecipeItem, RecipeLine,
    StockHealth, StockSource, ValidationError,
};

use crate::error::{DbError, DbResult};

const INGREDIENT_COLUMNS: &str = "id, name, current_quantity, package_size, par_level, unit, \
     unit_cost_cents, is_active, created_at, updated_at";

const PRODUCT_COLUMNS: &str =
    "id, name, category_id, price_cents, linked_ingredient_id, is_active, created_at, updated_at";

/// Input for a new ingredient.
#[derive(Debug, Clone)]
pub struct NewIngredient {
    pub name: String,
    pub unit: String,
    pub package_size: f64,
    pub par_level: Option<f64>,
    pub current_quantity: f64,
    pub unit_cost: Option<Money>,
}

/// Input for a new product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub category_id: Option<String>,
    pub price: Money,
    pub linked_ingredient_id: Option<String>,
}

/// Repository for catalog and stock operations.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    // =========================================================================
    // Categories
    // =========================================================================

    pub async fn create_category(&self, name: &str) -> DbResult<Category> {
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: validate_name("name", name)?,
        };

        debug!(id = %category.id, name = %category.name, "Creating category");

        sqlx::query("INSERT INTO categories (id, name) VALUES (?1, ?2)")
            .bind(&category.id)
            .bind(&category.name)
            .execute(&self.pool)
            .await?;

        Ok(category)
    }

    /// All categories, by name.
    pub async fn list_categories(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    // =========================================================================
    // Ingredients
    // =========================================================================

    /// Creates an ingredient after validating its quantities.
    pub async fn create_ingredient(&self, new: NewIngredient) -> DbResult<Ingredient> {
        let name = validate_name("name", &new.name)?;
        let unit = validate_name("unit", &new.unit)?;
        validate_package_size(new.package_size)?;
        validate_par_level(new.par_level)?;
        validate_count_quantity(new.current_quantity)?;
        if let Some(cost) = new.unit_cost {
            if cost.is_negative() {
                return Err(ValidationError::Negative {
                    field: "unit cost".to_string(),
                }
                .into());
            }
        }

        let now = Utc::now();
        let ingredient = Ingredient {
            id: Uuid::new_v4().to_string(),
            name,
            current_quantity: new.current_quantity,
            package_size: new.package_size,
            par_level: new.par_level,
            unit,
            unit_cost_cents: new.unit_cost.map(|c| c.cents()),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %ingredient.id, name = %ingredient.name, "Creating ingredient");

        sqlx::query(
            r#"
            INSERT INTO ingredients (
                id, name, current_quantity, package_size, par_level,
                unit, unit_cost_cents, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&ingredient.id)
        .bind(&ingredient.name)
        .bind(ingredient.current_quantity)
        .bind(ingredient.package_size)
        .bind(ingredient.par_level)
        .bind(&ingredient.unit)
        .bind(ingredient.unit_cost_cents)
        .bind(ingredient.is_active)
        .bind(ingredient.created_at)
        .bind(ingredient.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(ingredient)
    }

    pub async fn get_ingredient(&self, id: &str) -> DbResult<Option<Ingredient>> {
        let sql = format!("SELECT {INGREDIENT_COLUMNS} FROM ingredients WHERE id = ?1");
        let ingredient = sqlx::query_as::<_, Ingredient>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(ingredient)
    }

    /// Records a physical inventory count, replacing the on-hand quantity.
    pub async fn record_count(&self, ingredient_id: &str, quantity: f64) -> DbResult<Ingredient> {
        validate_count_quantity(quantity)?;

        let result = sqlx::query(
            "UPDATE ingredients SET current_quantity = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(ingredient_id)
        .bind(quantity)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Ingredient", ingredient_id));
        }

        info!(ingredient_id = %ingredient_id, quantity, "Inventory count recorded");

        self.get_ingredient(ingredient_id)
            .await?
            .ok_or_else(|| DbError::not_found("Ingredient", ingredient_id))
    }

    // =========================================================================
    // Products & Recipes
    // =========================================================================

    pub async fn create_product(&self, new: NewProduct) -> DbResult<Product> {
        let name = validate_name("name", &new.name)?;
        validate_price(new.price)?;

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name,
            category_id: new.category_id,
            price_cents: new.price.cents(),
            linked_ingredient_id: new.linked_ingredient_id,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, name = %product.name, "Creating product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, category_id, price_cents, linked_ingredient_id,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category_id)
        .bind(product.price_cents)
        .bind(&product.linked_ingredient_id)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    pub async fn get_product(&self, id: &str) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        fetch_product(&mut conn, id).await
    }

    /// Counts all products, active or not.
    pub async fn count_products(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Adds one ingredient line to a product's recipe.
    pub async fn add_recipe_item(
        &self,
        product_id: &str,
        ingredient_id: &str,
        quantity_required: f64,
    ) -> DbResult<RecipeItem> {
        validate_recipe_quantity(quantity_required)?;

        let item = RecipeItem {
            id: Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            ingredient_id: ingredient_id.to_string(),
            quantity_required,
        };

        debug!(product_id = %product_id, ingredient_id = %ingredient_id, "Adding recipe item");

        sqlx::query(
            r#"
            INSERT INTO recipe_items (id, product_id, ingredient_id, quantity_required)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&item.id)
        .bind(&item.product_id)
        .bind(&item.ingredient_id)
        .bind(item.quantity_required)
        .execute(&self.pool)
        .await?;

        Ok(item)
    }

    pub async fn recipe_items(&self, product_id: &str) -> DbResult<Vec<RecipeItem>> {
        let items = sqlx::query_as::<_, RecipeItem>(
            r#"
            SELECT id, product_id, ingredient_id, quantity_required
            FROM recipe_items
            WHERE product_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    // =========================================================================
    // Derived Stock Figures
    // =========================================================================

    /// Resolves where a product's stock comes from.
    pub async fn stock_source(&self, product_id: &str) -> DbResult<StockSource> {
        let mut conn = self.pool.acquire().await?;
        let product = fetch_product(&mut conn, product_id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", product_id))?;
        load_stock_source(&mut conn, &product).await
    }

    /// Sellable quantity and stock status of a product.
    pub async fn availability(&self, product_id: &str) -> DbResult<Availability> {
        let source = self.stock_source(product_id).await?;
        Ok(calculate_availability(&source))
    }

    /// Stock-health counts for the active products of a category.
    pub async fn category_health(&self, category_id: &str) -> DbResult<StockHealth> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE category_id = ?1 AND is_active = 1 ORDER BY name"
        );

        let mut conn = self.pool.acquire().await?;
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(category_id)
            .fetch_all(&mut *conn)
            .await?;

        let mut health = StockHealth::default();
        for product in &products {
            let source = load_stock_source(&mut conn, product).await?;
            health.record(calculate_availability(&source).status);
        }

        debug!(
            category_id = %category_id,
            products = health.total(),
            needing_attention = health.needing_attention(),
            "Category stock health"
        );

        Ok(health)
    }

    /// Draws ingredient stock down for `quantity` units sold.
    ///
    /// Runs in one SQL transaction. Stock never goes below zero; an
    /// oversell is logged rather than refused, since the sale already
    /// happened at the bar.
    pub async fn apply_sale(&self, product_id: &str, quantity: i64) -> DbResult<Vec<IngredientUsage>> {
        if quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }

        let mut tx = self.pool.begin().await?;

        let product = fetch_product(&mut tx, product_id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", product_id))?;
        let source = load_stock_source(&mut tx, &product).await?;

        if !calculate_availability(&source).can_sell(quantity) {
            warn!(product_id = %product_id, quantity, "Selling past available stock");
        }

        let usage = ingredient_usage(&source, quantity);
        let now = Utc::now();

        for used in &usage {
            sqlx::query(
                r#"
                UPDATE ingredients
                SET current_quantity = MAX(current_quantity - ?2, 0), updated_at = ?3
                WHERE id = ?1
                "#,
            )
            .bind(&used.ingredient_id)
            .bind(used.quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            product_id = %product_id,
            quantity,
            ingredients = usage.len(),
            "Sale consumption applied"
        );

        Ok(usage)
    }

    /// Cost and margin of one unit of a product, from current ingredient
    /// costs.
    ///
    /// `None` when the product has no stock behind it or an ingredient has
    /// no unit cost.
    pub async fn product_margin(&self, product_id: &str) -> DbResult<Option<Margin>> {
        let mut conn = self.pool.acquire().await?;
        let product = fetch_product(&mut conn, product_id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", product_id))?;

        let lines: Vec<CostLine> = sqlx::query_as::<_, (f64, Option<i64>)>(
            r#"
            SELECT ri.quantity_required, i.unit_cost_cents
            FROM recipe_items ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.product_id = ?1
            "#,
        )
        .bind(product_id)
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .map(|(quantity_required, cost)| CostLine {
            quantity_required,
            unit_cost: cost.map(Money::from_cents),
        })
        .collect();

        let cost = if !lines.is_empty() {
            recipe_cost(&lines)
        } else if let Some(ingredient_id) = product.linked_ingredient_id.as_deref() {
            let sql = format!("SELECT {INGREDIENT_COLUMNS} FROM ingredients WHERE id = ?1");
            sqlx::query_as::<_, Ingredient>(&sql)
                .bind(ingredient_id)
                .fetch_optional(&mut *conn)
                .await?
                .and_then(|ingredient| {
                    ingredient
                        .unit_cost()
                        .map(|unit_cost| linked_cost(ingredient.package_size, unit_cost))
                })
        } else {
            None
        };

        Ok(cost.map(|cost| calculate_margin(product.price(), cost)))
    }
}

async fn fetch_product(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Product>> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(product)
}

/// Reads recipe lines and the linked ingredient, then lets the core pick
/// the authoritative mode.
async fn load_stock_source(conn: &mut SqliteConnection, product: &Product) -> DbResult<StockSource> {
    let recipe: Vec<RecipeLine> = sqlx::query_as::<_, (String, f64, f64, Option<f64>)>(
        r#"
        SELECT ri.ingredient_id, ri.quantity_required, i.current_quantity, i.par_level
        FROM recipe_items ri
        JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE ri.product_id = ?1
        ORDER BY ri.rowid
        "#,
    )
    .bind(&product.id)
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .map(|(ingredient_id, quantity_required, on_hand, par_level)| RecipeLine {
        ingredient_id,
        quantity_required,
        on_hand,
        par_level,
    })
    .collect();

    let linked = match (&product.linked_ingredient_id, recipe.is_empty()) {
        (Some(ingredient_id), true) => {
            let sql = format!("SELECT {INGREDIENT_COLUMNS} FROM ingredients WHERE id = ?1");
            sqlx::query_as::<_, Ingredient>(&sql)
                .bind(ingredient_id)
                .fetch_optional(&mut *conn)
                .await?
                .map(|ingredient| ingredient.as_linked_stock())
        }
        _ => None,
    };

    Ok(StockSource::resolve(recipe, linked))
}

// =============================================================================
// Unit Tests
// =============================================================================
