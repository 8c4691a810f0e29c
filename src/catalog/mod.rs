// SPDX-License-Identifier: MIT
// catalog/mod.rs — Product catalog storage.
//
// Products are the single source for the storefront grid, the product detail
// page, and the chat recommendation engine. List-valued fields (sizes,
// colors, images, occasion, tags) are stored as JSON arrays in TEXT columns.
//
// Eligibility rule shared by every recommendation query: only active
// products with stock > 0 are ever returned.

use anyhow::{Context as _, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub original_price: Option<i64>,
    pub category: String,
    pub subcategory: Option<String>,
    /// JSON array of size labels, e.g. `["S","M","L"]`.
    pub sizes: String,
    /// JSON array of color names.
    pub colors: String,
    /// JSON array of image references.
    pub images: String,
    pub material: Option<String>,
    pub stock: i64,
    pub is_sale: bool,
    /// JSON array of occasion labels.
    pub occasion: String,
    pub style: String,
    /// JSON array of free-form tags.
    pub tags: String,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: i64,
    pub original_price: Option<i64>,
    pub category: String,
    pub subcategory: Option<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub material: Option<String>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub is_sale: bool,
    #[serde(default)]
    pub occasion: Vec<String>,
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial update — `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub original_price: Option<i64>,
    pub category: Option<String>,
    pub stock: Option<i64>,
    pub is_sale: Option<bool>,
    pub style: Option<String>,
}

#[derive(Clone)]
pub struct ProductStore {
    pool: SqlitePool,
}

impl ProductStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, product: NewProduct) -> Result<ProductRow> {
        if product.stock < 0 {
            anyhow::bail!("stock must be non-negative");
        }
        if product.price < 0 {
            anyhow::bail!("price must be non-negative");
        }
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO products (id, name, description, price, original_price, category,
                 subcategory, sizes, colors, images, material, stock, is_sale, occasion,
                 style, tags, is_active, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?)",
        )
        .bind(&id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.original_price)
        .bind(&product.category)
        .bind(&product.subcategory)
        .bind(serde_json::to_string(&product.sizes)?)
        .bind(serde_json::to_string(&product.colors)?)
        .bind(serde_json::to_string(&product.images)?)
        .bind(&product.material)
        .bind(product.stock)
        .bind(product.is_sale)
        .bind(serde_json::to_string(&product.occasion)?)
        .bind(&product.style)
        .bind(serde_json::to_string(&product.tags)?)
        .bind(&now)
        .execute(&self.pool)
        .await
        .context("Inserting product")?;
        self.get(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("product not found after insert"))
    }

    pub async fn get(&self, id: &str) -> Result<Option<ProductRow>> {
        Ok(sqlx::query_as("SELECT * FROM products WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Active products for the storefront grid, newest first, with optional
    /// category and free-text substring filters.
    pub async fn list(
        &self,
        category: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<ProductRow>> {
        let mut sql = String::from("SELECT * FROM products WHERE is_active = 1");
        if category.is_some() {
            sql.push_str(" AND category = ?");
        }
        if search.is_some() {
            sql.push_str(
                " AND (name LIKE ? ESCAPE '\\' OR description LIKE ? ESCAPE '\\' OR category LIKE ? ESCAPE '\\')",
            );
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query = sqlx::query_as(&sql);
        if let Some(cat) = category {
            query = query.bind(cat.to_string());
        }
        if let Some(term) = search {
            let pattern = like_pattern(term);
            query = query.bind(pattern.clone()).bind(pattern.clone()).bind(pattern);
        }
        Ok(query.fetch_all(&self.pool).await.context("Listing products")?)
    }

    pub async fn update(&self, id: &str, update: ProductUpdate) -> Result<Option<ProductRow>> {
        if update.stock.is_some_and(|s| s < 0) {
            anyhow::bail!("stock must be non-negative");
        }
        sqlx::query(
            "UPDATE products SET
                 name = COALESCE(?, name),
                 description = COALESCE(?, description),
                 price = COALESCE(?, price),
                 original_price = COALESCE(?, original_price),
                 category = COALESCE(?, category),
                 stock = COALESCE(?, stock),
                 is_sale = COALESCE(?, is_sale),
                 style = COALESCE(?, style)
             WHERE id = ?",
        )
        .bind(&update.name)
        .bind(&update.description)
        .bind(update.price)
        .bind(update.original_price)
        .bind(&update.category)
        .bind(update.stock)
        .bind(update.is_sale)
        .bind(&update.style)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Updating product")?;
        self.get(id).await
    }

    /// Soft-delete: deactivated products disappear from the grid and from
    /// recommendations but stay referenced by historical order items.
    pub async fn deactivate(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE products SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ─── Recommendation eligibility queries ──────────────────────────────────

    /// Eligible products whose category is in `categories`.
    /// No defined ordering beyond the limit.
    pub async fn eligible_in_categories(
        &self,
        categories: &[String],
        limit: i64,
    ) -> Result<Vec<ProductRow>> {
        if categories.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; categories.len()].join(", ");
        let sql = format!(
            "SELECT * FROM products
             WHERE category IN ({placeholders}) AND is_active = 1 AND stock > 0
             LIMIT ?"
        );
        let mut query = sqlx::query_as(&sql);
        for cat in categories {
            query = query.bind(cat);
        }
        Ok(query
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .context("Querying products by category")?)
    }

    /// Eligible products matching any term as a substring of name,
    /// description, category, or style (SQLite LIKE is case-insensitive
    /// for ASCII).
    pub async fn eligible_matching_terms(
        &self,
        terms: &[String],
        limit: i64,
    ) -> Result<Vec<ProductRow>> {
        if terms.is_empty() {
            return Ok(Vec::new());
        }
        let clause = vec![
            "name LIKE ? ESCAPE '\\' OR description LIKE ? ESCAPE '\\' OR category LIKE ? ESCAPE '\\' OR style LIKE ? ESCAPE '\\'";
            terms.len()
        ]
        .join(" OR ");
        let sql = format!(
            "SELECT * FROM products
             WHERE ({clause}) AND is_active = 1 AND stock > 0
             LIMIT ?"
        );
        let mut query = sqlx::query_as(&sql);
        for term in terms {
            let pattern = like_pattern(term);
            query = query
                .bind(pattern.clone())
                .bind(pattern.clone())
                .bind(pattern.clone())
                .bind(pattern);
        }
        Ok(query
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .context("Querying products by search terms")?)
    }

    /// Any eligible products at all — last-resort recommendation stage.
    pub async fn eligible_any(&self, limit: i64) -> Result<Vec<ProductRow>> {
        Ok(
            sqlx::query_as("SELECT * FROM products WHERE is_active = 1 AND stock > 0 LIMIT ?")
                .bind(limit)
                .fetch_all(&self.pool)
                .await
                .context("Querying in-stock products")?,
        )
    }

    pub async fn count(&self) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }
}

/// Wrap a raw term in `%…%`, escaping LIKE metacharacters so user input
/// always matches literally. Paired with `ESCAPE '\'` in the queries above.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
