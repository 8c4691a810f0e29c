pub mod cart;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod orders;
pub mod rest;
pub mod storage;

use std::sync::Arc;

use cart::CartStore;
use catalog::ProductStore;
use chat::RecommendationEngine;
use config::StoreConfig;
use orders::{OrderStore, ShippingRates};
use rest::admin::AdminToken;
use storage::Storage;

/// Shared application state passed to every REST handler.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<StoreConfig>,
    pub storage: Arc<Storage>,
    pub products: ProductStore,
    pub carts: CartStore,
    pub orders: OrderStore,
    pub chat: RecommendationEngine,
    /// Operator credential. Every admin route must present
    /// `Authorization: Bearer <secret>`.
    pub admin: AdminToken,
    pub started_at: std::time::Instant,
}

impl AppContext {
    pub fn new(config: Arc<StoreConfig>, storage: Arc<Storage>, admin: AdminToken) -> Self {
        let pool = storage.pool();
        let products = ProductStore::new(pool.clone());
        let carts = CartStore::new(pool.clone());
        let orders = OrderStore::new(
            pool,
            config.orders.transition_policy,
            ShippingRates {
                regular: config.shipping.regular,
                express: config.shipping.express,
            },
        );
        let chat = RecommendationEngine::new(products.clone());
        Self {
            config,
            storage,
            products,
            carts,
            orders,
            chat,
            admin,
            started_at: std::time::Instant::now(),
        }
    }
}
