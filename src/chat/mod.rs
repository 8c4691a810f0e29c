// chat/mod.rs — Outfit recommendation engine.
//
// Maps a free-text utterance to at most five eligible products in three
// stages: matched-category query, substring-OR fallback, any-in-stock
// fallback. A storage error in any stage is logged and treated as zero rows
// for that stage; the engine never surfaces an error to the caller.

pub mod intent;
pub mod reply;

use tracing::warn;

use crate::catalog::{ProductRow, ProductStore};
use intent::{detect_gender, fallback_terms, match_intent, target_categories, Gender};
use reply::reply_text;

/// Maximum number of products a recommendation may carry.
pub const MAX_RESULTS: i64 = 5;

/// A recommendation turn: the assistant's reply line plus 0–5 products.
/// An empty product list is a valid outcome ("no recommendation found").
#[derive(Debug)]
pub struct Recommendation {
    pub reply: String,
    pub products: Vec<ProductRow>,
    pub gender: Gender,
}

#[derive(Clone)]
pub struct RecommendationEngine {
    products: ProductStore,
}

impl RecommendationEngine {
    pub fn new(products: ProductStore) -> Self {
        Self { products }
    }

    pub async fn recommend(&self, raw_input: &str) -> Recommendation {
        let input = raw_input.to_lowercase().trim().to_string();
        let gender = detect_gender(&input);
        let products = self.find_products(&input, gender).await;
        let reply = reply_text(raw_input.trim(), gender, products.len());
        Recommendation { reply, products, gender }
    }

    async fn find_products(&self, input: &str, gender: Gender) -> Vec<ProductRow> {
        let entry = match_intent(input);

        // Stage 1: products from the matched entry's category list.
        if let Some(entry) = entry {
            let categories = target_categories(entry, gender);
            match self.products.eligible_in_categories(&categories, MAX_RESULTS).await {
                Ok(rows) if !rows.is_empty() => return rows,
                Ok(_) => {}
                Err(e) => warn!("category stage failed, falling through: {e:#}"),
            }
        }

        // Stage 2: substring match over name/description/category/style.
        let terms = fallback_terms(entry, input);
        if !terms.is_empty() {
            match self.products.eligible_matching_terms(&terms, MAX_RESULTS).await {
                Ok(rows) if !rows.is_empty() => return rows,
                Ok(_) => {}
                Err(e) => warn!("search stage failed, falling through: {e:#}"),
            }
        }

        // Stage 3: anything active and in stock.
        match self.products.eligible_any(MAX_RESULTS).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("in-stock stage failed, returning empty: {e:#}");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{NewProduct, ProductStore};
    use crate::storage::Storage;

    async fn make_engine() -> (RecommendationEngine, ProductStore) {
        let storage = Storage::new_in_memory().await.unwrap();
        let products = ProductStore::new(storage.pool());
        (RecommendationEngine::new(products.clone()), products)
    }

    async fn seed(products: &ProductStore, name: &str, category: &str, style: &str, stock: i64) {
        products
            .create(NewProduct {
                name: name.to_string(),
                description: format!("{name} untuk sehari-hari"),
                price: 120_000,
                category: category.to_string(),
                style: style.to_string(),
                stock,
                ..Default::default()
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_nongkrong_cowo_hits_male_categories() {
        let (engine, products) = make_engine().await;
        seed(&products, "Kaos Oversize", "T-Shirt", "casual", 3).await;
        seed(&products, "Celana Chino", "Pants", "casual", 2).await;
        seed(&products, "Sneakers Putih", "Sepatu cowo", "casual", 1).await;
        seed(&products, "Dress Floral", "Dress", "feminine", 4).await;

        let rec = engine.recommend("mau nongkrong sama temen cowo").await;
        assert_eq!(rec.gender, Gender::Male);
        assert!(!rec.products.is_empty());
        assert!(rec.products.len() <= MAX_RESULTS as usize);
        // Male category list of the "nongkrong" entry only — no Dress.
        for p in &rec.products {
            assert!(["T-Shirt", "Pants", "Sepatu cowo"].contains(&p.category.as_str()));
        }
    }

    #[tokio::test]
    async fn test_no_trigger_keyword_uses_substring_fallback() {
        let (engine, products) = make_engine().await;
        seed(&products, "Kemeja Flanel Kotak", "Kemeja", "smart", 5).await;
        seed(&products, "Dress Polos", "Dress", "feminine", 5).await;

        // "flanel" is not a trigger keyword in any entry, so stage 1 cannot
        // run; the token reaches the product through the substring stage.
        let rec = engine.recommend("cari kemeja flanel dong").await;
        assert!(rec.products.iter().any(|p| p.name == "Kemeja Flanel Kotak"));
    }

    #[tokio::test]
    async fn test_final_fallback_returns_any_in_stock() {
        let (engine, products) = make_engine().await;
        seed(&products, "Blazer Hitam", "Blazer", "formal", 2).await;

        let rec = engine.recommend("xyzzy qqq").await;
        assert_eq!(rec.products.len(), 1);
        assert_eq!(rec.products[0].name, "Blazer Hitam");
        assert!(!rec.reply.is_empty());
    }

    #[tokio::test]
    async fn test_empty_catalog_yields_empty_apologetic_recommendation() {
        let (engine, _products) = make_engine().await;
        let rec = engine.recommend("outfit buat pesta").await;
        assert!(rec.products.is_empty());
        assert!(!rec.reply.is_empty());
    }

    #[tokio::test]
    async fn test_result_length_bounded_by_five() {
        let (engine, products) = make_engine().await;
        for i in 0..9 {
            seed(&products, &format!("Kaos {i}"), "T-Shirt", "casual", 1).await;
        }
        let rec = engine.recommend("nongkrong bareng cowo").await;
        assert_eq!(rec.products.len(), 5);
    }
}
