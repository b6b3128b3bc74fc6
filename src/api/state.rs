use std::sync::Arc;

use tokio::sync::Mutex;

use crate::commerce::CommerceClient;
use crate::config::Config;
use crate::engine::LlmClient;
use crate::store::{Embedder, FaqStore};

/// Shared state for all handlers. Collaborators that fail to initialize are
/// stored as `None`: the server still starts, health reports the degraded
/// piece, and chat degrades accordingly instead of the process refusing to
/// boot.
pub struct AppState {
    /// Only the embedder needs mutation.
    pub embedder: Option<Mutex<Embedder>>,

    /// Similarity index over FAQ chunks; `None` when the offline ingestion
    /// has not run yet.
    pub faq: Option<FaqStore>,

    pub commerce: CommerceClient,
    pub llm: Option<LlmClient>,
    pub config: Config,
}

impl AppState {
    pub async fn from_config(config: Config) -> anyhow::Result<Arc<Self>> {
        let commerce = CommerceClient::new(&config.commerce_api_url, config.commerce_timeout_secs)?;

        let llm = if std::env::var("GEMINI_API_KEY").is_ok() {
            match LlmClient::from_env(&config.gemini_model) {
                Ok(client) => Some(client),
                Err(e) => {
                    tracing::warn!(error = %e, "language model client unavailable");
                    None
                }
            }
        } else {
            tracing::warn!("GEMINI_API_KEY not set, language model unavailable");
            None
        };

        let embedder = match Embedder::new() {
            Ok(embedder) => Some(embedder),
            Err(e) => {
                tracing::warn!(error = %e, "embedding model unavailable, FAQ search disabled");
                None
            }
        };

        let faq = match &embedder {
            Some(embedder) => open_faq_store(&config.faq_db_path, embedder.dimension()).await,
            None => None,
        };

        Ok(Arc::new(Self {
            embedder: embedder.map(Mutex::new),
            faq,
            commerce,
            llm,
            config,
        }))
    }
}

async fn open_faq_store(db_path: &str, dimension: usize) -> Option<FaqStore> {
    let store = match FaqStore::new(db_path, dimension).await {
        Ok(store) => store,
        Err(e) => {
            tracing::warn!(db_path, error = %e, "vector store unavailable");
            return None;
        }
    };

    match store.ensure_loaded().await {
        Ok(()) => Some(store),
        Err(e) => {
            tracing::warn!(db_path, error = %e, "FAQ index not loaded, run ingest first");
            None
        }
    }
}
