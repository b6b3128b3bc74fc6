//! Context assembly: turns a classified question into the bounded text
//! block the generator is grounded on.

use crate::commerce::{CommerceClient, DEFAULT_RECOMMENDATION_LIMIT};
use crate::models::{Brand, Category, FaqChunk, Product};

use super::intent::{Classification, Intent};

/// Persona instructions for the final generation call.
pub const PERSONA: &str = "You are a helpful customer support assistant for an online store.

Guidelines:
- Use the provided product data and FAQ context to give accurate, specific answers
- Only mention products, categories, and brands that appear in the context
- If the context doesn't contain enough information, say so honestly
- Be concise and friendly";

/// Max characters of product description shown in recommendation rows.
const DESCRIPTION_PREVIEW_CHARS: usize = 100;

/// Run the structured lookup for the classified intent and format the
/// result. `None` when the intent needs no lookup or the lookup came back
/// empty (including every upstream failure, which the client already
/// degraded to empty).
pub async fn gather_structured(
    classification: &Classification,
    commerce: &CommerceClient,
) -> Option<String> {
    match classification.intent {
        Intent::CategoryBrowsing => format_category_block(&commerce.categories().await),
        Intent::BrandBrowsing => format_brand_block(&commerce.brands().await),
        Intent::StockCheck => {
            let products = resolve_stock_products(classification, commerce).await;
            format_product_info_block(&products)
        }
        Intent::ProductRecommendation => {
            let recommendations = commerce
                .recommendations(
                    classification.category.as_deref(),
                    classification.brand.as_deref(),
                    DEFAULT_RECOMMENDATION_LIMIT,
                )
                .await;
            format_recommendation_block(&recommendations)
        }
        Intent::General => None,
    }
}

/// Stock questions resolve against the most specific extracted field that
/// yields results: product name, then brand, then category.
async fn resolve_stock_products(
    classification: &Classification,
    commerce: &CommerceClient,
) -> Vec<Product> {
    if let Some(name) = classification.product_name.as_deref() {
        let by_name = commerce.products_by_name(name).await;
        if !by_name.is_empty() {
            return by_name;
        }
    }

    if let Some(brand) = classification.brand.as_deref() {
        let by_brand = commerce
            .recommendations(None, Some(brand), DEFAULT_RECOMMENDATION_LIMIT)
            .await;
        if !by_brand.is_empty() {
            return by_brand;
        }
    }

    if let Some(category) = classification.category.as_deref() {
        return commerce
            .recommendations(Some(category), None, DEFAULT_RECOMMENDATION_LIMIT)
            .await;
    }

    Vec::new()
}

// ============================================================================
// Block formatting (pure)
// ============================================================================

pub fn format_category_block(categories: &[Category]) -> Option<String> {
    if categories.is_empty() {
        return None;
    }

    let mut out = String::from("Available Categories:\n");
    for category in categories {
        out.push_str(&format!(
            "- {}: {} ({} products)\n",
            category.name, category.description, category.product_count
        ));
    }
    Some(out.trim_end().to_string())
}

pub fn format_brand_block(brands: &[Brand]) -> Option<String> {
    if brands.is_empty() {
        return None;
    }

    let mut out = String::from("Available Brands:\n");
    for brand in brands {
        out.push_str(&format!(
            "- {}: {} ({} products)\n",
            brand.name, brand.description, brand.product_count
        ));
    }
    Some(out.trim_end().to_string())
}

pub fn format_product_info_block(products: &[Product]) -> Option<String> {
    if products.is_empty() {
        return None;
    }

    let mut out = String::from("Product Information:\n");
    for product in products {
        out.push_str(&format!(
            "- {}: ${:.2}, {}, stock: {}\n",
            product.name,
            product.price,
            product.availability(),
            product.stock
        ));
    }
    Some(out.trim_end().to_string())
}

pub fn format_recommendation_block(products: &[Product]) -> Option<String> {
    if products.is_empty() {
        return None;
    }

    let mut out = String::from("Recommended Products:\n");
    for product in products {
        out.push_str(&format!(
            "- {} (${:.2}, {}): {}\n",
            product.name,
            product.price,
            product.availability(),
            truncate_description(&product.description, DESCRIPTION_PREVIEW_CHARS)
        ));
    }
    Some(out.trim_end().to_string())
}

pub fn format_faq_block(chunks: &[FaqChunk]) -> Option<String> {
    if chunks.is_empty() {
        return None;
    }

    let mut out = String::from("FAQ Context:\n");
    for chunk in chunks {
        out.push_str(&chunk.text);
        out.push('\n');
    }
    Some(out.trim_end().to_string())
}

/// Cut a description for list display; char-based so multi-byte text is safe.
fn truncate_description(description: &str, max_chars: usize) -> String {
    if description.chars().count() <= max_chars {
        return description.to_string();
    }

    let truncated: String = description.chars().take(max_chars).collect();
    format!("{}...", truncated.trim_end())
}

/// Concatenate the structured block and the FAQ block into the final
/// context string, bounded at `max_chars`. The bound applies at block
/// boundaries: structured data has priority, FAQ is dropped first. A single
/// oversized block is hard-truncated rather than dropped so the generator
/// always sees something.
pub fn build_context(
    structured: Option<String>,
    faq: Option<String>,
    max_chars: usize,
) -> String {
    let mut context = String::new();

    for block in [structured, faq].into_iter().flatten() {
        let separator = if context.is_empty() { 0 } else { 2 };
        let block_len = block.chars().count();

        if context.chars().count() + separator + block_len <= max_chars {
            if separator > 0 {
                context.push_str("\n\n");
            }
            context.push_str(&block);
        } else if context.is_empty() {
            context = block.chars().take(max_chars).collect();
        } else {
            tracing::debug!(dropped_chars = block_len, "context budget reached, dropping block");
        }
    }

    if context.is_empty() {
        context.push_str("No matching store data or FAQ entries were found for this question.");
    }

    context
}

/// The complete prompt sent to the generator: persona, context, question.
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "{persona}\n\nContext:\n{context}\n\nQuestion: {question}\nAnswer:",
        persona = PERSONA,
        context = context,
        question = question
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str, description: &str, count: u32) -> Category {
        Category {
            id: 1,
            name: name.into(),
            description: description.into(),
            product_count: count,
            active: true,
        }
    }

    fn product(name: &str, price: f64, stock: u32) -> Product {
        Product {
            id: 1,
            name: name.into(),
            description: "A dependable household staple for everyday use.".into(),
            price,
            stock,
            category: "Home".into(),
            brand: "Acme".into(),
            active: true,
        }
    }

    #[test]
    fn test_category_block_lists_literal_names() {
        let categories = vec![
            category("Kitchen", "Cookware and utensils", 42),
            category("Garden", "Outdoor tools", 17),
        ];

        let block = format_category_block(&categories).unwrap();
        assert!(block.starts_with("Available Categories:"));
        assert!(block.contains("- Kitchen: Cookware and utensils (42 products)"));
        assert!(block.contains("- Garden: Outdoor tools (17 products)"));
    }

    #[test]
    fn test_category_block_empty_is_none() {
        assert_eq!(format_category_block(&[]), None);
    }

    #[test]
    fn test_product_info_block_has_price_availability_stock() {
        let products = vec![product("Blue Widget", 19.5, 3), product("Red Widget", 4.0, 0)];

        let block = format_product_info_block(&products).unwrap();
        assert!(block.starts_with("Product Information:"));
        assert!(block.contains("- Blue Widget: $19.50, In Stock, stock: 3"));
        assert!(block.contains("- Red Widget: $4.00, Out of Stock, stock: 0"));
    }

    #[test]
    fn test_recommendation_block_truncates_description() {
        let mut long = product("Widget Deluxe", 49.99, 12);
        long.description = "w".repeat(300);

        let block = format_recommendation_block(&[long]).unwrap();
        assert!(block.contains("..."));
        // 100 chars of description plus the ellipsis
        let row = block.lines().nth(1).unwrap();
        assert!(row.ends_with("..."));
        assert!(row.contains(&"w".repeat(100)));
        assert!(!row.contains(&"w".repeat(101)));
    }

    #[test]
    fn test_recommendation_block_short_description_untouched() {
        let block = format_recommendation_block(&[product("Widget", 5.0, 1)]).unwrap();
        assert!(block.contains("A dependable household staple"));
        assert!(!block.contains("..."));
    }

    #[test]
    fn test_faq_block_joins_chunks() {
        let chunks = vec![
            FaqChunk {
                chunk_id: "1".into(),
                text: "Q: How do returns work? A: 30 days.".into(),
            },
            FaqChunk {
                chunk_id: "2".into(),
                text: "Q: Shipping time? A: 3-5 days.".into(),
            },
        ];

        let block = format_faq_block(&chunks).unwrap();
        assert!(block.starts_with("FAQ Context:"));
        assert!(block.contains("30 days"));
        assert!(block.contains("3-5 days"));
    }

    #[test]
    fn test_build_context_joins_blocks() {
        let context = build_context(
            Some("Product Information:\n- Widget".into()),
            Some("FAQ Context:\nQ: A?".into()),
            6000,
        );

        assert!(context.contains("Product Information"));
        assert!(context.contains("FAQ Context"));
        assert!(context.contains("\n\n"));
    }

    #[test]
    fn test_build_context_faq_only_when_no_structured_data() {
        let context = build_context(None, Some("FAQ Context:\nQ: A?".into()), 6000);
        assert!(context.starts_with("FAQ Context:"));
    }

    #[test]
    fn test_build_context_empty_fallback() {
        let context = build_context(None, None, 6000);
        assert!(context.contains("No matching store data"));
    }

    #[test]
    fn test_build_context_drops_faq_over_budget() {
        let structured = "s".repeat(90);
        let faq = "f".repeat(90);

        let context = build_context(Some(structured.clone()), Some(faq), 100);
        assert_eq!(context, structured);
    }

    #[test]
    fn test_build_context_truncates_single_oversized_block() {
        let structured = "s".repeat(500);
        let context = build_context(Some(structured), None, 100);
        assert_eq!(context.chars().count(), 100);
    }

    #[test]
    fn test_build_prompt_shape() {
        let prompt = build_prompt("FAQ Context:\nQ: A?", "Do you ship abroad?");

        assert!(prompt.starts_with(PERSONA));
        assert!(prompt.contains("Context:\nFAQ Context:"));
        assert!(prompt.contains("Question: Do you ship abroad?"));
        assert!(prompt.ends_with("Answer:"));
    }

    #[tokio::test]
    async fn test_gather_structured_general_skips_lookups() {
        // Client pointed at a dead port: if General ever did a lookup it
        // would still return None, but this pins the no-network contract.
        let commerce = CommerceClient::new("http://127.0.0.1:59999", 1).unwrap();
        let classification = Classification::general();

        assert_eq!(gather_structured(&classification, &commerce).await, None);
    }

    #[tokio::test]
    async fn test_gather_structured_stock_check_degrades_to_none() {
        let commerce = CommerceClient::new("http://127.0.0.1:59999", 1).unwrap();
        let classification = Classification {
            intent: Intent::StockCheck,
            product_name: Some("blue widgets".into()),
            category: None,
            brand: None,
            confidence: 0.9,
        };

        // Commerce unreachable: lookup degrades to empty, block to None,
        // and the chat pipeline proceeds with FAQ-only context.
        assert_eq!(gather_structured(&classification, &commerce).await, None);
    }
}
