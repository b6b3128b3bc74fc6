use std::sync::Arc;

use axum::{Json, extract::State};

use super::dto::*;
use super::state::AppState;
use crate::engine::intent::{self, Classification};
use crate::engine::{EngineError, context, generator};
use crate::models::FaqChunk;

/// Reply for empty/whitespace questions; no collaborator is invoked.
pub const EMPTY_QUESTION_REPLY: &str =
    "Please type a question and I'll do my best to help you.";

/// Fixed user-safe reply for any unexpected failure in the pipeline. No
/// internal detail ever reaches the client.
pub const APOLOGY_REPLY: &str =
    "Sorry, something went wrong on our side. Please try again in a moment.";

/// POST /chat - answer a customer question.
///
/// The pipeline runs received -> classified -> context-gathered -> answered;
/// any error at any stage lands in the single error-responded path below.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let question = req.question.trim();
    if question.is_empty() {
        return Json(ChatResponse {
            response: EMPTY_QUESTION_REPLY.into(),
        });
    }

    match answer_question(&state, question).await {
        Ok(response) => Json(ChatResponse { response }),
        Err(e) => {
            tracing::error!(error = %e, "chat pipeline failed");
            Json(ChatResponse {
                response: APOLOGY_REPLY.into(),
            })
        }
    }
}

/// The happy path. Classification, commerce lookups, and FAQ search all
/// degrade internally; the only hard failure left is the generation call.
async fn answer_question(state: &AppState, question: &str) -> Result<String, EngineError> {
    let classification = match &state.llm {
        Some(llm) => intent::classify(question, llm).await,
        None => Classification::general(),
    };
    tracing::info!(
        intent = ?classification.intent,
        confidence = classification.confidence,
        "question classified"
    );

    let structured = context::gather_structured(&classification, &state.commerce).await;
    let faq_chunks = fetch_faq_chunks(state, question).await;
    let faq_block = context::format_faq_block(&faq_chunks);

    let assembled = context::build_context(structured, faq_block, state.config.context_max_chars);
    let prompt = context::build_prompt(&assembled, question);

    let llm = state
        .llm
        .as_ref()
        .ok_or_else(|| EngineError::Generation("language model unavailable".into()))?;

    generator::generate(&prompt, llm).await
}

/// Top-k FAQ chunks for the question. Every failure (embedder missing,
/// index missing, embed error, search error) degrades to an empty list.
async fn fetch_faq_chunks(state: &AppState, question: &str) -> Vec<FaqChunk> {
    let (Some(embedder), Some(faq)) = (&state.embedder, &state.faq) else {
        return Vec::new();
    };

    // Lock held for the embedding only, not the index search.
    let query_embedding = {
        let mut embedder = embedder.lock().await;
        match embedder.embed_one(question) {
            Ok(embedding) => embedding,
            Err(e) => {
                tracing::warn!(error = %e, "query embedding failed, skipping FAQ context");
                return Vec::new();
            }
        }
    };

    match faq.search(&query_embedding, state.config.faq_top_k).await {
        Ok(chunks) => chunks,
        Err(e) => {
            tracing::warn!(error = %e, "FAQ search failed, skipping FAQ context");
            Vec::new()
        }
    }
}

/// GET /categories
pub async fn categories(State(state): State<Arc<AppState>>) -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        categories: state.commerce.categories().await,
    })
}

/// GET /brands
pub async fn brands(State(state): State<Arc<AppState>>) -> Json<BrandsResponse> {
    Json(BrandsResponse {
        brands: state.commerce.brands().await,
    })
}

/// GET /health - best-effort live probe of each collaborator.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let commerce_api = if state.commerce.ping().await {
        "connected"
    } else {
        "disconnected"
    };

    let ai_model = if state.llm.is_some() {
        "connected"
    } else {
        "unavailable"
    };

    let vectorstore = if state.embedder.is_some() && state.faq.is_some() {
        "loaded"
    } else {
        "unavailable"
    };

    Json(HealthResponse {
        api: "healthy",
        commerce_api,
        ai_model,
        vectorstore,
    })
}
