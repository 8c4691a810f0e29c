// Integration tests for the checkout and order-status flows, run against
// in-memory SQLite through the same stores the REST layer uses.

use butikd::cart::CartStore;
use butikd::catalog::{NewProduct, ProductStore};
use butikd::orders::{
    CheckoutRequest, OrderStatus, OrderStore, ShippingRates, TransitionPolicy,
};
use butikd::storage::Storage;

const RATES: ShippingRates = ShippingRates {
    regular: 10_000,
    express: 25_000,
};

struct Stores {
    storage: Storage,
    products: ProductStore,
    carts: CartStore,
    orders: OrderStore,
}

async fn make_stores(policy: TransitionPolicy) -> Stores {
    let storage = Storage::new_in_memory().await.unwrap();
    Stores {
        products: ProductStore::new(storage.pool()),
        carts: CartStore::new(storage.pool()),
        orders: OrderStore::new(storage.pool(), policy, RATES),
        storage,
    }
}

async fn seed_product(products: &ProductStore, name: &str, price: i64) -> String {
    products
        .create(NewProduct {
            name: name.to_string(),
            price,
            category: "T-Shirt".to_string(),
            stock: 10,
            ..Default::default()
        })
        .await
        .unwrap()
        .id
}

fn checkout_request() -> CheckoutRequest {
    CheckoutRequest {
        name: "Budi Santoso".to_string(),
        email: "budi@example.com".to_string(),
        phone: "0812000111".to_string(),
        address: "Jl. Merdeka 1".to_string(),
        city: "Bandung".to_string(),
        postal_code: "40111".to_string(),
        payment_method: "transfer".to_string(),
        shipping_method: "regular".to_string(),
        notes: None,
    }
}

#[tokio::test]
async fn test_checkout_creates_items_totals_and_empties_cart() {
    let s = make_stores(TransitionPolicy::Linear).await;
    let p1 = seed_product(&s.products, "Kaos Polos", 100_000).await;
    let p2 = seed_product(&s.products, "Kaos Grafis", 150_000).await;

    s.carts.add("user-1", &p1, 2, None).await.unwrap();
    s.carts.add("user-1", &p2, 1, Some("L")).await.unwrap();

    let order = s.orders.checkout("user-1", checkout_request()).await.unwrap();

    assert_eq!(order.items.len(), 2);
    assert_eq!(order.order.subtotal, 2 * 100_000 + 150_000);
    assert_eq!(order.order.shipping_cost, 10_000);
    assert_eq!(order.order.total_amount, 350_000 + 10_000);
    assert_eq!(order.order.status, "pending");
    assert_eq!(order.order.payment_status, "pending");
    assert!(order.order.order_number.starts_with("ORD"));

    let items_total: i64 = order.items.iter().map(|i| i.total_price).sum();
    assert_eq!(items_total, order.order.subtotal);

    // Cart is emptied by the same transaction.
    assert!(s.carts.list("user-1").await.unwrap().is_empty());

    // Customer record was upserted.
    let customer = order.customer.unwrap();
    assert_eq!(customer.first_name.as_deref(), Some("Budi"));
    assert_eq!(customer.last_name.as_deref(), Some("Santoso"));
}

#[tokio::test]
async fn test_checkout_denormalizes_product_fields() {
    let s = make_stores(TransitionPolicy::Linear).await;
    let pid = seed_product(&s.products, "Kaos Polos", 100_000).await;
    s.carts.add("user-1", &pid, 1, None).await.unwrap();
    let order = s.orders.checkout("user-1", checkout_request()).await.unwrap();

    // A later price/name edit must not follow into the order item.
    s.products
        .update(
            &pid,
            butikd::catalog::ProductUpdate {
                name: Some("Kaos Baru".to_string()),
                price: Some(999_999),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let reloaded = s.orders.get(&order.order.id).await.unwrap().unwrap();
    assert_eq!(reloaded.items[0].product_name, "Kaos Polos");
    assert_eq!(reloaded.items[0].unit_price, 100_000);
}

#[tokio::test]
async fn test_checkout_empty_cart_rejected() {
    let s = make_stores(TransitionPolicy::Linear).await;
    assert!(s.orders.checkout("user-1", checkout_request()).await.is_err());
}

#[tokio::test]
async fn test_second_checkout_reuses_customer_row() {
    let s = make_stores(TransitionPolicy::Linear).await;
    let pid = seed_product(&s.products, "Kaos Polos", 100_000).await;

    s.carts.add("user-1", &pid, 1, None).await.unwrap();
    let first = s.orders.checkout("user-1", checkout_request()).await.unwrap();

    s.carts.add("user-1", &pid, 1, None).await.unwrap();
    let mut req = checkout_request();
    req.phone = "0899888777".to_string();
    let second = s.orders.checkout("user-1", req).await.unwrap();

    assert_eq!(first.order.customer_id, second.order.customer_id);
    assert_eq!(
        second.customer.unwrap().phone.as_deref(),
        Some("0899888777")
    );
}

#[tokio::test]
async fn test_linear_walk_to_delivered_appends_history() {
    let s = make_stores(TransitionPolicy::Linear).await;
    let pid = seed_product(&s.products, "Kaos Polos", 100_000).await;
    s.carts.add("user-1", &pid, 1, None).await.unwrap();
    let order = s.orders.checkout("user-1", checkout_request()).await.unwrap();
    let id = &order.order.id;

    for status in [
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ] {
        let updated = s.orders.update_status(id, status, None, None).await.unwrap();
        assert_eq!(updated.status, status.as_str());
    }

    let history = s.orders.history(id).await.unwrap();
    assert_eq!(history.len(), 4);
    // Newest first.
    assert_eq!(history[0].status, "delivered");
    assert_eq!(history[0].changed_by_type, "admin");
    assert_eq!(
        history
            .iter()
            .filter(|h| h.status == "delivered")
            .count(),
        1
    );
}

#[tokio::test]
async fn test_linear_policy_rejects_status_jump() {
    let s = make_stores(TransitionPolicy::Linear).await;
    let pid = seed_product(&s.products, "Kaos Polos", 100_000).await;
    s.carts.add("user-1", &pid, 1, None).await.unwrap();
    let order = s.orders.checkout("user-1", checkout_request()).await.unwrap();

    let result = s
        .orders
        .update_status(&order.order.id, OrderStatus::Delivered, None, None)
        .await;
    assert!(result.is_err());

    // Nothing was written — neither status nor history.
    let reloaded = s.orders.get(&order.order.id).await.unwrap().unwrap();
    assert_eq!(reloaded.order.status, "pending");
    assert!(s.orders.history(&order.order.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_any_policy_allows_status_jump() {
    let s = make_stores(TransitionPolicy::Any).await;
    let pid = seed_product(&s.products, "Kaos Polos", 100_000).await;
    s.carts.add("user-1", &pid, 1, None).await.unwrap();
    let order = s.orders.checkout("user-1", checkout_request()).await.unwrap();

    let updated = s
        .orders
        .update_status(&order.order.id, OrderStatus::Delivered, None, None)
        .await
        .unwrap();
    assert_eq!(updated.status, "delivered");
}

#[tokio::test]
async fn test_transition_survives_history_failure() {
    let s = make_stores(TransitionPolicy::Linear).await;
    let pid = seed_product(&s.products, "Kaos Polos", 100_000).await;
    s.carts.add("user-1", &pid, 1, None).await.unwrap();
    let order = s.orders.checkout("user-1", checkout_request()).await.unwrap();

    // Break the audit table: the history append is best-effort, so the
    // transition itself must still succeed.
    sqlx::query("DROP TABLE order_status_history")
        .execute(&s.storage.pool())
        .await
        .unwrap();

    let updated = s
        .orders
        .update_status(&order.order.id, OrderStatus::Confirmed, None, None)
        .await
        .unwrap();
    assert_eq!(updated.status, "confirmed");
}

#[tokio::test]
async fn test_update_details_and_stats() {
    let s = make_stores(TransitionPolicy::Linear).await;
    let pid = seed_product(&s.products, "Kaos Polos", 100_000).await;
    s.carts.add("user-1", &pid, 1, None).await.unwrap();
    let order = s.orders.checkout("user-1", checkout_request()).await.unwrap();

    let updated = s
        .orders
        .update_details(
            &order.order.id,
            butikd::orders::OrderDetailsUpdate {
                tracking_number: Some("JNE123".to_string()),
                payment_status: Some("paid".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.tracking_number.as_deref(), Some("JNE123"));
    assert_eq!(updated.payment_status, "paid");

    // Unknown payment status is rejected.
    assert!(s
        .orders
        .update_details(
            &order.order.id,
            butikd::orders::OrderDetailsUpdate {
                payment_status: Some("maybe".to_string()),
                ..Default::default()
            },
        )
        .await
        .is_err());

    let stats = s.orders.stats().await.unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.revenue, order.order.total_amount);
    assert_eq!(stats.customers, 1);
}

#[tokio::test]
async fn test_statuses_listed_by_sequence_order() {
    let s = make_stores(TransitionPolicy::Linear).await;
    let statuses = s.orders.statuses().await.unwrap();
    assert_eq!(statuses.len(), 7);
    assert_eq!(statuses[0].name, "pending");
    assert_eq!(statuses[4].name, "delivered");
    assert!(statuses.windows(2).all(|w| w[0].sequence_order < w[1].sequence_order));
}
