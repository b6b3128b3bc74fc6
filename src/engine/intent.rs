//! LLM-backed intent classification.
//!
//! One model call per chat turn asks for a fixed-shape JSON object; every
//! parsing failure degrades to `General` with no extracted fields. No retry.

use serde::{Deserialize, Serialize};

use super::LlmClient;
use super::generator;

/// What the user is trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// "Do you have X in stock?", "Is Y available?"
    StockCheck,
    /// "What would you recommend for ...?", "Show me something like X"
    ProductRecommendation,
    /// "What categories do you have?", "What kind of things do you sell?"
    CategoryBrowsing,
    /// "What brands do you carry?"
    BrandBrowsing,
    /// Anything else: policies, shipping, returns, small talk
    General,
}

/// Result of classifying one question. Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub intent: Intent,
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub confidence: f32,
}

impl Classification {
    /// The fallback for every degradation path.
    pub fn general() -> Self {
        Self {
            intent: Intent::General,
            product_name: None,
            category: None,
            brand: None,
            confidence: 0.0,
        }
    }
}

/// Build the structured-output instruction for one question.
pub fn classification_prompt(question: &str) -> String {
    format!(
        r#"Classify the customer question below into exactly one intent and extract any mentioned fields.

Intents:
- stock_check: the customer asks whether a specific product is available or in stock
- product_recommendation: the customer wants product suggestions
- category_browsing: the customer asks what categories or kinds of products exist
- brand_browsing: the customer asks what brands are carried
- general: anything else (policies, shipping, returns, greetings)

Respond with ONLY a JSON object, no other text:
{{"intent": "<one of the five labels>", "product_name": <string or null>, "category": <string or null>, "brand": <string or null>, "confidence": <number 0.0-1.0>}}

Question: {question}"#
    )
}

/// Classify a question with a single LLM call. A transport error degrades to
/// `General` exactly like a parse failure; the caller never sees an error.
pub async fn classify(question: &str, llm: &LlmClient) -> Classification {
    let prompt = classification_prompt(question);

    match generator::generate(&prompt, llm).await {
        Ok(reply) => parse_classification(&reply),
        Err(e) => {
            tracing::warn!(error = %e, "intent classification call failed");
            Classification::general()
        }
    }
}

/// Loosely-typed mirror of the JSON the model is asked to emit.
#[derive(Deserialize)]
struct RawClassification {
    intent: String,
    #[serde(default)]
    product_name: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    confidence: Option<f32>,
}

/// Parse the model's reply. Tolerates markdown fences and surrounding prose
/// by slicing the outermost `{...}`; anything unparsable, and any unknown
/// intent label, falls back to `General`.
pub fn parse_classification(reply: &str) -> Classification {
    let Some(json) = extract_json_object(reply) else {
        tracing::warn!("classifier reply contained no JSON object");
        return Classification::general();
    };

    let raw: RawClassification = match serde_json::from_str(json) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(error = %e, "classifier reply unparsable");
            return Classification::general();
        }
    };

    let Some(intent) = intent_from_label(&raw.intent) else {
        tracing::warn!(label = %raw.intent, "classifier returned unknown intent label");
        return Classification::general();
    };

    Classification {
        intent,
        product_name: non_empty(raw.product_name),
        category: non_empty(raw.category),
        brand: non_empty(raw.brand),
        confidence: raw.confidence.unwrap_or(0.0).clamp(0.0, 1.0),
    }
}

fn intent_from_label(label: &str) -> Option<Intent> {
    match label.trim() {
        "stock_check" => Some(Intent::StockCheck),
        "product_recommendation" => Some(Intent::ProductRecommendation),
        "category_browsing" => Some(Intent::CategoryBrowsing),
        "brand_browsing" => Some(Intent::BrandBrowsing),
        "general" => Some(Intent::General),
        _ => None,
    }
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|s| !s.trim().is_empty())
}

/// Slice the outermost `{...}` out of a reply that may be fenced or wrapped
/// in prose.
fn extract_json_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (end > start).then(|| &reply[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed_reply() {
        let reply = r#"{"intent": "stock_check", "product_name": "blue widgets", "category": null, "brand": null, "confidence": 0.92}"#;
        let c = parse_classification(reply);

        assert_eq!(c.intent, Intent::StockCheck);
        assert_eq!(c.product_name.as_deref(), Some("blue widgets"));
        assert_eq!(c.category, None);
        assert_eq!(c.brand, None);
        assert!((c.confidence - 0.92).abs() < 1e-6);
    }

    #[test]
    fn test_parse_fenced_reply() {
        let reply = "```json\n{\"intent\": \"brand_browsing\", \"confidence\": 0.8}\n```";
        let c = parse_classification(reply);

        assert_eq!(c.intent, Intent::BrandBrowsing);
    }

    #[test]
    fn test_parse_reply_with_prose() {
        let reply = "Sure! Here is the classification:\n{\"intent\": \"category_browsing\"}\nHope that helps.";
        assert_eq!(parse_classification(reply).intent, Intent::CategoryBrowsing);
    }

    #[test]
    fn test_parse_non_json_falls_back_to_general() {
        let c = parse_classification("I think the user wants to know about stock.");
        assert_eq!(c, Classification::general());
    }

    #[test]
    fn test_parse_missing_intent_key_falls_back() {
        let c = parse_classification(r#"{"product_name": "widget"}"#);
        assert_eq!(c, Classification::general());
    }

    #[test]
    fn test_parse_unknown_label_falls_back() {
        let c = parse_classification(r#"{"intent": "complaint"}"#);
        assert_eq!(c, Classification::general());
    }

    #[test]
    fn test_parse_missing_optional_fields_default() {
        let c = parse_classification(r#"{"intent": "product_recommendation"}"#);

        assert_eq!(c.intent, Intent::ProductRecommendation);
        assert_eq!(c.product_name, None);
        assert_eq!(c.confidence, 0.0);
    }

    #[test]
    fn test_parse_blank_fields_become_none() {
        let c = parse_classification(
            r#"{"intent": "stock_check", "product_name": "  ", "brand": ""}"#,
        );

        assert_eq!(c.product_name, None);
        assert_eq!(c.brand, None);
    }

    #[test]
    fn test_parse_confidence_clamped() {
        let c = parse_classification(r#"{"intent": "general", "confidence": 7.5}"#);
        assert_eq!(c.confidence, 1.0);
    }

    #[test]
    fn test_parse_empty_reply() {
        assert_eq!(parse_classification(""), Classification::general());
    }

    #[test]
    fn test_intent_serialization_labels() {
        assert_eq!(
            serde_json::to_string(&Intent::StockCheck).unwrap(),
            "\"stock_check\""
        );
        assert_eq!(
            serde_json::to_string(&Intent::General).unwrap(),
            "\"general\""
        );
    }

    #[test]
    fn test_prompt_contains_question_and_labels() {
        let prompt = classification_prompt("Do you have blue widgets in stock?");

        assert!(prompt.contains("Do you have blue widgets in stock?"));
        for label in [
            "stock_check",
            "product_recommendation",
            "category_browsing",
            "brand_browsing",
            "general",
        ] {
            assert!(prompt.contains(label));
        }
    }

    #[tokio::test]
    #[ignore = "requires GEMINI_API_KEY"]
    async fn test_classify_stock_question() {
        let llm = LlmClient::from_env("gemini-2.0-flash").unwrap();
        let c = classify("Do you have blue widgets in stock?", &llm).await;

        assert_eq!(c.intent, Intent::StockCheck);
        assert!(c.product_name.is_some());
    }
}
