pub mod embedder;
pub mod faq_index;

pub use embedder::{EmbedError, Embedder};
pub use faq_index::{FaqStore, StoreError};

use std::io::Read;

use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::FaqChunk;

/// Batch size for embedding to keep peak memory bounded.
const EMBEDDING_BATCH_SIZE: usize = 50;

/// Chunking parameters for FAQ text.
const CHUNK_SIZE: usize = 500;
const CHUNK_OVERLAP: usize = 50;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("embedding error: {0}")]
    Embed(#[from] EmbedError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// One question/answer row of the FAQ source file.
#[derive(Debug, Deserialize, PartialEq)]
pub struct FaqRecord {
    pub question: String,
    pub answer: String,
}

/// Read FAQ records from CSV (header `question,answer`). Malformed rows are
/// logged and skipped rather than aborting the whole ingestion.
pub fn read_faq_records(reader: impl Read) -> Vec<FaqRecord> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for (i, row) in csv_reader.deserialize::<FaqRecord>().enumerate() {
        match row {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!(row = i + 1, error = %e, "skipping malformed FAQ row"),
        }
    }

    records
}

/// Split text into chunks of at most `chunk_size` characters with
/// `overlap` characters carried over between consecutive chunks.
/// Operates on chars, so multi-byte text never splits mid-codepoint.
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    debug_assert!(overlap < chunk_size, "overlap must be smaller than chunk size");

    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }
    if chars.len() <= chunk_size {
        return vec![text.to_string()];
    }

    let step = chunk_size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }

    chunks
}

/// Render FAQ records into embeddable chunks, one `Q: … A: …` passage per
/// record, split when a passage exceeds the chunk size.
pub fn build_faq_chunks(records: &[FaqRecord]) -> Vec<FaqChunk> {
    records
        .iter()
        .flat_map(|record| {
            let passage = format!("Q: {} A: {}", record.question, record.answer);
            split_text(&passage, CHUNK_SIZE, CHUNK_OVERLAP)
        })
        .map(|text| FaqChunk {
            chunk_id: Uuid::new_v4().to_string(),
            text,
        })
        .collect()
}

/// Full offline pipeline: CSV → chunks → embeddings → LanceDB table.
/// Returns the number of chunks written.
pub async fn ingest_faq(
    csv_reader: impl Read,
    store: &FaqStore,
    embedder: &mut Embedder,
) -> Result<usize, PipelineError> {
    let records = read_faq_records(csv_reader);
    let chunks = build_faq_chunks(&records);

    if chunks.is_empty() {
        tracing::warn!("no FAQ chunks produced; index left untouched");
        return Ok(0);
    }

    let mut embeddings = Vec::with_capacity(chunks.len());
    for batch in chunks.chunks(EMBEDDING_BATCH_SIZE) {
        let texts: Vec<&str> = batch.iter().map(|c| c.text.as_str()).collect();
        embeddings.extend(embedder.embed_batch(&texts)?);
    }

    let written = store.replace_chunks(&chunks, embeddings).await?;
    Ok(written)
}
