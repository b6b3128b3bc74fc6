//! Read-only client for the external commerce REST API.
//!
//! Every fetch degrades to an empty result on failure: a down commerce API
//! must never break chat. Ranking and filtering happen locally so the
//! upstream only needs plain list endpoints.

use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::models::{Brand, Category, Product};

/// Hard cap on name-search results.
const NAME_SEARCH_LIMIT: usize = 10;

/// Default recommendation count when the caller does not specify one.
pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 8;

pub struct CommerceClient {
    http: reqwest::Client,
    base_url: String,
}

impl CommerceClient {
    /// Build a client with a fixed request timeout. The timeout is the only
    /// failure bound applied to outbound calls; there are no retries.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Search products by name. Case-insensitive; an exact name match ranks
    /// first, name-substring matches next, description matches last.
    pub async fn products_by_name(&self, name: &str) -> Vec<Product> {
        let envelope: Option<ProductsEnvelope> =
            self.get_json("/products", &[("search", name)]).await;

        let products = envelope
            .map(|e| normalize_products(e.products))
            .unwrap_or_default();

        rank_by_name(products, name)
    }

    /// Fetch a single product. `None` on any failure, including 404.
    pub async fn product_by_id(&self, id: u64) -> Option<Product> {
        let raw: Option<RawProduct> = self.get_json(&format!("/products/{id}"), &[]).await;
        raw.map(Product::from)
    }

    /// Fetch recommendations: active products matching the optional
    /// category/brand filters, best-stocked and cheapest first.
    pub async fn recommendations(
        &self,
        category: Option<&str>,
        brand: Option<&str>,
        limit: usize,
    ) -> Vec<Product> {
        let envelope: Option<ProductsEnvelope> = self.get_json("/products", &[]).await;

        let products = envelope
            .map(|e| normalize_products(e.products))
            .unwrap_or_default();

        filter_recommendations(products, category, brand, limit)
    }

    pub async fn categories(&self) -> Vec<Category> {
        let envelope: Option<CategoriesEnvelope> = self.get_json("/categories", &[]).await;
        envelope.map(|e| e.categories).unwrap_or_default()
    }

    pub async fn brands(&self) -> Vec<Brand> {
        let envelope: Option<BrandsEnvelope> = self.get_json("/brands", &[]).await;
        envelope.map(|e| e.brands).unwrap_or_default()
    }

    /// Cheap liveness probe for the health endpoint.
    pub async fn ping(&self) -> bool {
        let url = format!("{}/categories", self.base_url);
        match self.http.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// GET a JSON document, converting every failure mode (timeout, non-2xx,
    /// malformed body) into `None` after logging.
    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Option<T> {
        let url = format!("{}{}", self.base_url, path);

        let response = match self.http.get(&url).query(query).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(%url, error = %e, "commerce request failed");
                return None;
            }
        };

        let response = match response.error_for_status() {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(%url, error = %e, "commerce returned error status");
                return None;
            }
        };

        match response.json::<T>().await {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::warn!(%url, error = %e, "commerce response body unparsable");
                None
            }
        }
    }
}

// ============================================================================
// Upstream wire shapes
// ============================================================================

/// Raw product record as the commerce API serves it. Fields default so a
/// partially-populated record normalizes instead of failing the whole page.
#[derive(Deserialize, Debug, Default)]
struct RawProduct {
    #[serde(default)]
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    price: f64,
    #[serde(default)]
    stock: i64,
    #[serde(default)]
    category: String,
    #[serde(default)]
    brand: String,
    #[serde(default = "default_active")]
    active: bool,
}

fn default_active() -> bool {
    true
}

impl From<RawProduct> for Product {
    fn from(raw: RawProduct) -> Self {
        Product {
            id: raw.id,
            name: raw.name,
            description: raw.description,
            price: raw.price.max(0.0),
            stock: raw.stock.max(0) as u32,
            category: raw.category,
            brand: raw.brand,
            active: raw.active,
        }
    }
}

#[derive(Deserialize, Debug)]
struct ProductsEnvelope {
    #[serde(default)]
    products: Vec<RawProduct>,
}

#[derive(Deserialize, Debug)]
struct CategoriesEnvelope {
    #[serde(default)]
    categories: Vec<Category>,
}

#[derive(Deserialize, Debug)]
struct BrandsEnvelope {
    #[serde(default)]
    brands: Vec<Brand>,
}

fn normalize_products(raw: Vec<RawProduct>) -> Vec<Product> {
    raw.into_iter().map(Product::from).collect()
}

// ============================================================================
// Local ranking and filtering (pure)
// ============================================================================

/// Rank products against a name query: exact matches, then name-substring
/// matches, then description matches. Non-matching products are dropped.
/// All comparisons are case-insensitive. Capped at `NAME_SEARCH_LIMIT`.
fn rank_by_name(products: Vec<Product>, query: &str) -> Vec<Product> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return Vec::new();
    }

    let mut exact = Vec::new();
    let mut by_name = Vec::new();
    let mut by_description = Vec::new();

    for product in products {
        let name = product.name.to_lowercase();
        if name == q {
            exact.push(product);
        } else if name.contains(&q) {
            by_name.push(product);
        } else if product.description.to_lowercase().contains(&q) {
            by_description.push(product);
        }
    }

    exact.extend(by_name);
    exact.extend(by_description);
    exact.truncate(NAME_SEARCH_LIMIT);
    exact
}

/// Apply recommendation rules: optional case-insensitive category/brand
/// substring filters, inactive products excluded, sorted by descending
/// stock then ascending price, capped at `limit`.
fn filter_recommendations(
    products: Vec<Product>,
    category: Option<&str>,
    brand: Option<&str>,
    limit: usize,
) -> Vec<Product> {
    let category = category.map(str::to_lowercase);
    let brand = brand.map(str::to_lowercase);

    let mut matches: Vec<Product> = products
        .into_iter()
        .filter(|p| p.active)
        .filter(|p| match &category {
            Some(c) => p.category.to_lowercase().contains(c),
            None => true,
        })
        .filter(|p| match &brand {
            Some(b) => p.brand.to_lowercase().contains(b),
            None => true,
        })
        .collect();

    matches.sort_by(|a, b| {
        b.stock
            .cmp(&a.stock)
            .then_with(|| a.price.total_cmp(&b.price))
    });

    matches.truncate(limit);
    matches
}
