// orders/mod.rs — Order storage: checkout, status workflow, audit history.
//
// Checkout runs as one SQLite transaction (customer upsert → order insert →
// item inserts → cart clear); a failure anywhere rolls the whole sequence
// back. Status transitions are validated by the configured TransitionPolicy
// and then logged to order_status_history best-effort: a history failure is
// WARNed and swallowed, the transition itself still succeeds.

pub mod workflow;

use anyhow::{Context as _, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

pub use workflow::{OrderStatus, PaymentStatus, TransitionError, TransitionPolicy};

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct OrderStatusRow {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub color: String,
    pub sequence_order: i64,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct OrderRow {
    pub id: String,
    pub order_number: String,
    pub user_id: Option<String>,
    pub customer_id: String,
    pub status: String,
    pub payment_status: String,
    pub payment_method: Option<String>,
    pub subtotal: i64,
    pub tax: i64,
    pub shipping_cost: i64,
    pub discount_amount: i64,
    pub total_amount: i64,
    /// JSON snapshot captured at checkout; immutable afterwards.
    pub shipping_address: Option<String>,
    pub billing_address: Option<String>,
    pub tracking_number: Option<String>,
    pub estimated_delivery: Option<String>,
    pub notes: Option<String>,
    pub notes_admin: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct OrderItemRow {
    pub id: String,
    pub order_id: String,
    pub product_id: Option<String>,
    /// Denormalized at order time — later product edits do not follow.
    pub product_name: String,
    pub product_sku: Option<String>,
    pub quantity: i64,
    pub unit_price: i64,
    pub total_price: i64,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct CustomerRow {
    pub id: String,
    pub user_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct HistoryRow {
    pub id: String,
    pub order_id: String,
    pub status: String,
    pub changed_by: Option<String>,
    pub changed_by_type: String,
    pub notes: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderWithDetails {
    #[serde(flatten)]
    pub order: OrderRow,
    pub customer: Option<CustomerRow>,
    pub items: Vec<OrderItemRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
    /// "regular" or "express".
    #[serde(default = "default_shipping_method")]
    pub shipping_method: String,
    pub notes: Option<String>,
}

fn default_payment_method() -> String {
    "transfer".to_string()
}

fn default_shipping_method() -> String {
    "regular".to_string()
}

/// Partial admin update of the annotation fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderDetailsUpdate {
    pub tracking_number: Option<String>,
    pub estimated_delivery: Option<String>,
    pub notes_admin: Option<String>,
    pub payment_status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderStats {
    pub total: i64,
    pub pending: i64,
    pub confirmed: i64,
    pub processing: i64,
    pub shipped: i64,
    pub delivered: i64,
    pub cancelled: i64,
    pub refunded: i64,
    pub revenue: i64,
    pub customers: i64,
}

/// Flat shipping rates in rupiah, from config.
#[derive(Debug, Clone, Copy)]
pub struct ShippingRates {
    pub regular: i64,
    pub express: i64,
}

#[derive(Clone)]
pub struct OrderStore {
    pool: SqlitePool,
    policy: TransitionPolicy,
    rates: ShippingRates,
}

impl OrderStore {
    pub fn new(pool: SqlitePool, policy: TransitionPolicy, rates: ShippingRates) -> Self {
        Self { pool, policy, rates }
    }

    /// The status reference table, sorted by its sequence_order column.
    pub async fn statuses(&self) -> Result<Vec<OrderStatusRow>> {
        Ok(
            sqlx::query_as("SELECT * FROM order_statuses ORDER BY sequence_order ASC")
                .fetch_all(&self.pool)
                .await
                .context("Fetching order statuses")?,
        )
    }

    // ─── Checkout ────────────────────────────────────────────────────────────

    /// Create an order from the user's current cart, atomically.
    ///
    /// Inside one transaction: upsert the customer record keyed by user_id,
    /// insert the order with pending status and address snapshots, insert
    /// one order item per cart line (denormalizing name and unit price at
    /// this instant), delete the cart rows, commit.
    pub async fn checkout(&self, user_id: &str, req: CheckoutRequest) -> Result<OrderWithDetails> {
        if req.name.is_empty() || req.phone.is_empty() || req.address.is_empty() {
            anyhow::bail!("shipping name, phone, and address are required");
        }

        let mut tx = self.pool.begin().await?;
        let now = Utc::now().to_rfc3339();

        #[derive(sqlx::FromRow)]
        struct Line {
            product_id: String,
            quantity: i64,
            name: String,
            price: i64,
        }
        let lines: Vec<Line> = sqlx::query_as(
            "SELECT c.product_id, c.quantity, p.name, p.price
             FROM cart_items c JOIN products p ON p.id = c.product_id
             WHERE c.user_id = ?",
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await
        .context("Reading cart for checkout")?;

        if lines.is_empty() {
            anyhow::bail!("cart is empty");
        }

        // Customer upsert keyed by user_id.
        let (first_name, last_name) = split_name(&req.name);
        sqlx::query(
            "INSERT INTO customers (id, user_id, first_name, last_name, email, phone, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET
                 first_name = excluded.first_name,
                 last_name = excluded.last_name,
                 email = excluded.email,
                 phone = excluded.phone,
                 updated_at = excluded.updated_at",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(&first_name)
        .bind(&last_name)
        .bind(&req.email)
        .bind(&req.phone)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .context("Upserting customer")?;

        let customer_id: (String,) = sqlx::query_as("SELECT id FROM customers WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        let subtotal: i64 = lines.iter().map(|l| l.price * l.quantity).sum();
        let shipping_cost = match req.shipping_method.as_str() {
            "express" => self.rates.express,
            _ => self.rates.regular,
        };
        let total_amount = subtotal + shipping_cost;

        let address_snapshot = serde_json::json!({
            "street": req.address,
            "city": req.city,
            "postal_code": req.postal_code,
            "phone": req.phone,
        })
        .to_string();

        let order_id = Uuid::new_v4().to_string();
        let order_number = generate_order_number();
        sqlx::query(
            "INSERT INTO orders (id, order_number, user_id, customer_id, status, payment_status,
                 payment_method, subtotal, tax, shipping_cost, discount_amount, total_amount,
                 shipping_address, billing_address, notes, created_at, updated_at)
             VALUES (?, ?, ?, ?, 'pending', 'pending', ?, ?, 0, ?, 0, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&order_id)
        .bind(&order_number)
        .bind(user_id)
        .bind(&customer_id.0)
        .bind(&req.payment_method)
        .bind(subtotal)
        .bind(shipping_cost)
        .bind(total_amount)
        .bind(&address_snapshot)
        .bind(&address_snapshot)
        .bind(&req.notes)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .context("Inserting order")?;

        for line in &lines {
            sqlx::query(
                "INSERT INTO order_items (id, order_id, product_id, product_name, quantity, unit_price, total_price)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&order_id)
            .bind(&line.product_id)
            .bind(&line.name)
            .bind(line.quantity)
            .bind(line.price)
            .bind(line.price * line.quantity)
            .execute(&mut *tx)
            .await
            .context("Inserting order item")?;
        }

        sqlx::query("DELETE FROM cart_items WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .context("Clearing cart")?;

        tx.commit().await.context("Committing checkout")?;

        self.get(&order_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("order not found after checkout"))
    }

    // ─── Queries ─────────────────────────────────────────────────────────────

    pub async fn get(&self, order_id: &str) -> Result<Option<OrderWithDetails>> {
        let order: Option<OrderRow> = sqlx::query_as("SELECT * FROM orders WHERE id = ?")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;
        match order {
            Some(order) => Ok(Some(self.with_details(order).await?)),
            None => Ok(None),
        }
    }

    /// All orders, newest first, with customer and items joined in.
    pub async fn list(&self) -> Result<Vec<OrderWithDetails>> {
        crate::storage::with_timeout(async {
            let orders: Vec<OrderRow> =
                sqlx::query_as("SELECT * FROM orders ORDER BY created_at DESC")
                    .fetch_all(&self.pool)
                    .await
                    .context("Listing orders")?;
            let mut out = Vec::with_capacity(orders.len());
            for order in orders {
                out.push(self.with_details(order).await?);
            }
            Ok(out)
        })
        .await
    }

    pub async fn list_by_status(&self, status: OrderStatus) -> Result<Vec<OrderWithDetails>> {
        let orders: Vec<OrderRow> =
            sqlx::query_as("SELECT * FROM orders WHERE status = ? ORDER BY created_at DESC")
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await
                .context("Listing orders by status")?;
        let mut out = Vec::with_capacity(orders.len());
        for order in orders {
            out.push(self.with_details(order).await?);
        }
        Ok(out)
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<OrderWithDetails>> {
        let orders: Vec<OrderRow> =
            sqlx::query_as("SELECT * FROM orders WHERE user_id = ? ORDER BY created_at DESC")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
                .context("Listing user orders")?;
        let mut out = Vec::with_capacity(orders.len());
        for order in orders {
            out.push(self.with_details(order).await?);
        }
        Ok(out)
    }

    async fn with_details(&self, order: OrderRow) -> Result<OrderWithDetails> {
        let customer: Option<CustomerRow> =
            sqlx::query_as("SELECT * FROM customers WHERE id = ?")
                .bind(&order.customer_id)
                .fetch_optional(&self.pool)
                .await?;
        let items: Vec<OrderItemRow> =
            sqlx::query_as("SELECT * FROM order_items WHERE order_id = ?")
                .bind(&order.id)
                .fetch_all(&self.pool)
                .await?;
        Ok(OrderWithDetails { order, customer, items })
    }

    // ─── Status workflow ─────────────────────────────────────────────────────

    /// Admin-only status transition. The new status is validated against
    /// the configured policy; on success the order row is updated and a
    /// history row is appended best-effort.
    pub async fn update_status(
        &self,
        order_id: &str,
        new_status: OrderStatus,
        note: Option<&str>,
        changed_by: Option<&str>,
    ) -> Result<OrderRow> {
        let current: Option<(String,)> = sqlx::query_as("SELECT status FROM orders WHERE id = ?")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;
        let current = current.ok_or(TransitionError::OrderNotFound)?;
        let from = OrderStatus::parse(&current.0)
            .ok_or_else(|| TransitionError::UnknownStatus(current.0.clone()))?;

        if !self.policy.allows(from, new_status) {
            return Err(TransitionError::NotAllowed {
                from: from.as_str(),
                to: new_status.as_str(),
            }
            .into());
        }

        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE id = ?")
            .bind(new_status.as_str())
            .bind(&now)
            .bind(order_id)
            .execute(&self.pool)
            .await
            .context("Updating order status")?;

        // Best-effort audit trail: a failure here is logged, not fatal.
        let note = note
            .map(str::to_string)
            .unwrap_or_else(|| format!("Status updated to {}", new_status.as_str()));
        let result = sqlx::query(
            "INSERT INTO order_status_history (id, order_id, status, changed_by, changed_by_type, notes, created_at)
             VALUES (?, ?, ?, ?, 'admin', ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(order_id)
        .bind(new_status.as_str())
        .bind(changed_by)
        .bind(&note)
        .bind(&now)
        .execute(&self.pool)
        .await;
        if let Err(e) = result {
            warn!("failed to append status history for order {order_id}: {e}");
        }

        let order: OrderRow = sqlx::query_as("SELECT * FROM orders WHERE id = ?")
            .bind(order_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(order)
    }

    /// Status history for an order, newest first. Append-only — there is no
    /// update or delete path for this table.
    pub async fn history(&self, order_id: &str) -> Result<Vec<HistoryRow>> {
        Ok(sqlx::query_as(
            "SELECT * FROM order_status_history WHERE order_id = ? ORDER BY created_at DESC",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
        .context("Fetching status history")?)
    }

    /// Admin annotation update: tracking number, delivery estimate, notes,
    /// payment status. Address snapshots and totals are not touchable here.
    pub async fn update_details(
        &self,
        order_id: &str,
        update: OrderDetailsUpdate,
    ) -> Result<OrderRow> {
        if let Some(ref ps) = update.payment_status {
            if PaymentStatus::parse(ps).is_none() {
                anyhow::bail!("unknown payment status {ps:?}");
            }
        }
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "UPDATE orders SET
                 tracking_number = COALESCE(?, tracking_number),
                 estimated_delivery = COALESCE(?, estimated_delivery),
                 notes_admin = COALESCE(?, notes_admin),
                 payment_status = COALESCE(?, payment_status),
                 updated_at = ?
             WHERE id = ?",
        )
        .bind(&update.tracking_number)
        .bind(&update.estimated_delivery)
        .bind(&update.notes_admin)
        .bind(&update.payment_status)
        .bind(&now)
        .bind(order_id)
        .execute(&self.pool)
        .await
        .context("Updating order details")?;
        if result.rows_affected() == 0 {
            return Err(TransitionError::OrderNotFound.into());
        }
        let order: OrderRow = sqlx::query_as("SELECT * FROM orders WHERE id = ?")
            .bind(order_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(order)
    }

    /// Dashboard counters: per-status counts, revenue, customer count.
    pub async fn stats(&self) -> Result<OrderStats> {
        let count_for = |status: &'static str| {
            let pool = self.pool.clone();
            async move {
                let row: (i64,) =
                    sqlx::query_as("SELECT COUNT(*) FROM orders WHERE status = ?")
                        .bind(status)
                        .fetch_one(&pool)
                        .await?;
                Ok::<i64, anyhow::Error>(row.0)
            }
        };

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        let revenue: (i64,) =
            sqlx::query_as("SELECT COALESCE(SUM(total_amount), 0) FROM orders")
                .fetch_one(&self.pool)
                .await?;
        let customers: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;

        Ok(OrderStats {
            total: total.0,
            pending: count_for("pending").await?,
            confirmed: count_for("confirmed").await?,
            processing: count_for("processing").await?,
            shipped: count_for("shipped").await?,
            delivered: count_for("delivered").await?,
            cancelled: count_for("cancelled").await?,
            refunded: count_for("refunded").await?,
            revenue: revenue.0,
            customers: customers.0,
        })
    }
}

/// Human-readable unique order number: ORD + millisecond timestamp + short
/// random suffix (the UNIQUE constraint backstops collisions).
fn generate_order_number() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("ORD{}{}", millis, &suffix[..4])
}

fn split_name(full: &str) -> (String, String) {
    let mut parts = full.split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let rest: Vec<&str> = parts.collect();
    (first, rest.join(" "))
}
