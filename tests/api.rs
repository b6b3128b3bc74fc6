//! Endpoint tests against a server with every collaborator degraded:
//! no LLM, no embedder, no FAQ index, and a commerce URL nothing listens
//! on. The service must still start, answer, and degrade per contract.

use std::net::SocketAddr;
use std::sync::Arc;

use support_rag_chat::api::{self, APOLOGY_REPLY, EMPTY_QUESTION_REPLY};
use support_rag_chat::commerce::CommerceClient;
use support_rag_chat::{AppState, Config};

fn degraded_state() -> Arc<AppState> {
    let config = Config {
        port: 0,
        allowed_origin: "http://localhost:3000".into(),
        commerce_api_url: "http://127.0.0.1:59998".into(),
        commerce_timeout_secs: 1,
        gemini_model: "gemini-2.0-flash".into(),
        faq_db_path: "/nonexistent/faq.lance".into(),
        faq_top_k: 2,
        context_max_chars: 6000,
    };

    let commerce = CommerceClient::new(&config.commerce_api_url, config.commerce_timeout_secs)
        .expect("client builds without network");

    Arc::new(AppState {
        embedder: None,
        faq: None,
        commerce,
        llm: None,
        config,
    })
}

async fn spawn_server() -> SocketAddr {
    let app = api::router(degraded_state());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

#[tokio::test]
async fn empty_question_returns_prompt_without_collaborators() {
    let addr = spawn_server().await;
    let client = reqwest::Client::new();

    for question in ["", "   ", "\n\t"] {
        let body: serde_json::Value = client
            .post(format!("http://{addr}/chat"))
            .json(&serde_json::json!({ "question": question }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body["response"], EMPTY_QUESTION_REPLY);
    }
}

#[tokio::test]
async fn missing_question_field_treated_as_empty() {
    let addr = spawn_server().await;
    let client = reqwest::Client::new();

    let body: serde_json::Value = client
        .post(format!("http://{addr}/chat"))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["response"], EMPTY_QUESTION_REPLY);
}

#[tokio::test]
async fn chat_without_model_apologizes_with_200() {
    let addr = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/chat"))
        .json(&serde_json::json!({ "question": "Do you ship abroad?" }))
        .send()
        .await
        .unwrap();

    assert!(resp.status().is_success());
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["response"], APOLOGY_REPLY);
}

#[tokio::test]
async fn health_reports_degraded_collaborators() {
    let addr = spawn_server().await;

    let body: serde_json::Value = reqwest::get(format!("http://{addr}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["api"], "healthy");
    assert_eq!(body["commerce_api"], "disconnected");
    assert_eq!(body["ai_model"], "unavailable");
    assert_eq!(body["vectorstore"], "unavailable");
}

#[tokio::test]
async fn categories_and_brands_degrade_to_empty_lists() {
    let addr = spawn_server().await;

    let categories: serde_json::Value = reqwest::get(format!("http://{addr}/categories"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(categories["categories"], serde_json::json!([]));

    let brands: serde_json::Value = reqwest::get(format!("http://{addr}/brands"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(brands["brands"], serde_json::json!([]));
}

#[tokio::test]
async fn cors_allows_configured_origin_only() {
    let addr = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("http://{addr}/health"))
        .header("Origin", "http://localhost:3000")
        .send()
        .await
        .unwrap();

    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:3000")
    );

    let resp = client
        .get(format!("http://{addr}/health"))
        .header("Origin", "http://evil.example")
        .send()
        .await
        .unwrap();

    assert!(resp.headers().get("access-control-allow-origin").is_none());
}
