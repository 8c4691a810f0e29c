// SPDX-License-Identifier: MIT
// cart/mod.rs — Shopping cart storage.
//
// One row per (user, product), enforced by a UNIQUE constraint: re-adding a
// product increments the existing quantity via upsert-on-conflict instead of
// creating a duplicate line. The backend's native upsert is the only
// atomicity guarantee here — no application-level locking.

use anyhow::{Context as _, Result};
use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

/// A cart line joined with the fields of its product that the UI renders.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct CartLine {
    pub id: String,
    pub user_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub size: Option<String>,
    pub created_at: String,
    pub product_name: String,
    pub product_price: i64,
    pub product_images: String,
    pub product_stock: i64,
    pub product_category: String,
}

#[derive(Clone)]
pub struct CartStore {
    pool: SqlitePool,
}

impl CartStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Add a product to a user's cart. An existing (user, product) line has
    /// its quantity incremented; otherwise a new line is inserted.
    ///
    /// Inactive or out-of-stock products are rejected — they are not
    /// purchasable.
    pub async fn add(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i64,
        size: Option<&str>,
    ) -> Result<CartLine> {
        if quantity < 1 {
            anyhow::bail!("quantity must be at least 1");
        }
        let eligible: Option<(i64,)> = sqlx::query_as(
            "SELECT 1 FROM products WHERE id = ? AND is_active = 1 AND stock > 0",
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;
        if eligible.is_none() {
            anyhow::bail!("product is not available");
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO cart_items (id, user_id, product_id, quantity, size, created_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(user_id, product_id) DO UPDATE SET
                 quantity = quantity + excluded.quantity",
        )
        .bind(&id)
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .bind(size)
        .bind(&now)
        .execute(&self.pool)
        .await
        .context("Upserting cart item")?;

        self.line(user_id, product_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("cart line not found after upsert"))
    }

    pub async fn line(&self, user_id: &str, product_id: &str) -> Result<Option<CartLine>> {
        Ok(sqlx::query_as(
            "SELECT c.id, c.user_id, c.product_id, c.quantity, c.size, c.created_at,
                    p.name AS product_name, p.price AS product_price,
                    p.images AS product_images, p.stock AS product_stock,
                    p.category AS product_category
             FROM cart_items c JOIN products p ON p.id = c.product_id
             WHERE c.user_id = ? AND c.product_id = ?",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<CartLine>> {
        Ok(sqlx::query_as(
            "SELECT c.id, c.user_id, c.product_id, c.quantity, c.size, c.created_at,
                    p.name AS product_name, p.price AS product_price,
                    p.images AS product_images, p.stock AS product_stock,
                    p.category AS product_category
             FROM cart_items c JOIN products p ON p.id = c.product_id
             WHERE c.user_id = ?
             ORDER BY c.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Listing cart items")?)
    }

    /// Set an exact quantity on an existing line. Returns false when the
    /// line does not exist.
    pub async fn set_quantity(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> Result<bool> {
        if quantity < 1 {
            anyhow::bail!("quantity must be at least 1");
        }
        let result = sqlx::query(
            "UPDATE cart_items SET quantity = ? WHERE user_id = ? AND product_id = ?",
        )
        .bind(quantity)
        .bind(user_id)
        .bind(product_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn remove(&self, user_id: &str, product_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = ? AND product_id = ?")
            .bind(user_id)
            .bind(product_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove every line for a user. Returns the number of lines removed.
    pub async fn clear(&self, user_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
