use serde::{Deserialize, Serialize};

/// A product as served by the commerce API, normalized for chat context.
///
/// Fetched fresh per request; never cached or written back.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub description: String,
    /// Non-negative; upstream values below zero are clamped during normalization.
    pub price: f64,
    pub stock: u32,
    pub category: String,
    pub brand: String,
    pub active: bool,
}

impl Product {
    /// Availability label derived solely from stock count.
    pub fn availability(&self) -> &'static str {
        if self.stock > 0 { "In Stock" } else { "Out of Stock" }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Category {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub product_count: u32,
    pub active: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Brand {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub product_count: u32,
    pub active: bool,
}

/// A slice of question/answer text from the FAQ index.
///
/// Produced by the offline ingestion binary; immutable at request time.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FaqChunk {
    pub chunk_id: String,
    pub text: String,
}
