use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("failed to initialize embedding model: {0}")]
    Init(#[from] anyhow::Error),

    #[error("embedding generation failed: {0}")]
    Embed(String),
}

/// Wraps the fastembed model. Holds loaded model weights in memory; the
/// server shares one instance behind a `tokio::sync::Mutex` since embedding
/// needs `&mut self`.
pub struct Embedder {
    model: TextEmbedding,
    dimension: usize,
}

impl Embedder {
    /// Initialize with BGE-small-en-v1.5 (384 dimensions).
    pub fn new() -> Result<Self, EmbedError> {
        Self::with_model(EmbeddingModel::BGESmallENV15)
    }

    pub fn with_model(model_name: EmbeddingModel) -> Result<Self, EmbedError> {
        let dimension = embedding_dimension(&model_name);
        let model =
            TextEmbedding::try_new(InitOptions::new(model_name).with_show_download_progress(true))?;

        Ok(Self { model, dimension })
    }

    /// Embed a single text. Convenience wrapper around batch.
    pub fn embed_one(&mut self, text: &str) -> Result<Vec<f32>, EmbedError> {
        self.embed_batch(&[text])
            .map(|mut v| v.pop().unwrap_or_default())
    }

    /// Embed multiple texts in one call (more efficient).
    pub fn embed_batch(&mut self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        self.model
            .embed(texts.to_vec(), None)
            .map_err(|e| EmbedError::Embed(e.to_string()))
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

fn embedding_dimension(model: &EmbeddingModel) -> usize {
    match model {
        EmbeddingModel::BGESmallENV15 => 384,
        EmbeddingModel::BGEBaseENV15 => 768,
        EmbeddingModel::BGELargeENV15 => 1024,
        EmbeddingModel::AllMiniLML6V2 => 384,
        EmbeddingModel::AllMiniLML12V2 => 384,
        other => panic!("unsupported embedding model: {:?}", other),
    }
}
