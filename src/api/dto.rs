use serde::{Deserialize, Serialize};

use crate::models::{Brand, Category};

/// POST /chat request
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub question: String,
}

/// POST /chat response
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// GET /categories response
#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
}

/// GET /brands response
#[derive(Debug, Serialize)]
pub struct BrandsResponse {
    pub brands: Vec<Brand>,
}

/// GET /health response. Each field uses a small fixed vocabulary so the
/// frontend can switch on it.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub api: &'static str,
    pub commerce_api: &'static str,
    pub ai_model: &'static str,
    pub vectorstore: &'static str,
}
