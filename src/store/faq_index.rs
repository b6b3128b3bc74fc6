//! LanceDB-backed similarity index over FAQ chunks.
//!
//! The ingestion binary writes the table; the server only reads it. A
//! missing table at startup means the index is unavailable and chat
//! proceeds without FAQ context.

use std::sync::Arc;

use arrow_array::{RecordBatch, RecordBatchIterator, StringArray};
use futures::TryStreamExt;
use lancedb::{
    Connection, connect,
    query::{ExecutableQuery, QueryBase},
};
use thiserror::Error;

use crate::models::FaqChunk;

const FAQ_TABLE: &str = "faq_chunks";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] lancedb::Error),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),

    #[error("table '{0}' not found")]
    TableNotFound(String),

    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),
}

/// Handle on the FAQ vector store.
pub struct FaqStore {
    conn: Connection,
    dimension: usize,
}

impl FaqStore {
    /// Connect to LanceDB at the given path (creates the directory if needed).
    pub async fn new(db_path: &str, embedding_dimension: usize) -> Result<Self, StoreError> {
        if let Some(parent) = std::path::Path::new(db_path).parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn = connect(db_path).execute().await?;
        Ok(Self {
            conn,
            dimension: embedding_dimension,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Verify the FAQ table exists. Called once at server startup so a
    /// missing index surfaces as unavailable rather than as per-request
    /// errors.
    pub async fn ensure_loaded(&self) -> Result<(), StoreError> {
        self.conn
            .open_table(FAQ_TABLE)
            .execute()
            .await
            .map_err(|_| StoreError::TableNotFound(FAQ_TABLE.into()))?;
        Ok(())
    }

    /// Return the k nearest FAQ chunks to the query embedding.
    pub async fn search(
        &self,
        query_embedding: &[f32],
        k: usize,
    ) -> Result<Vec<FaqChunk>, StoreError> {
        let table = self
            .conn
            .open_table(FAQ_TABLE)
            .execute()
            .await
            .map_err(|_| StoreError::TableNotFound(FAQ_TABLE.into()))?;

        let results = table
            .vector_search(query_embedding.to_vec())?
            .limit(k)
            .execute()
            .await?;

        batches_to_faq_chunks(results).await
    }

    /// Replace the FAQ table with a freshly-ingested set of chunks.
    /// Write path: used only by the ingestion binary.
    pub async fn replace_chunks(
        &self,
        chunks: &[FaqChunk],
        embeddings: Vec<Vec<f32>>,
    ) -> Result<usize, StoreError> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let batch = faq_chunks_to_batch(chunks, embeddings, self.dimension)?;
        let count = batch.num_rows();
        let schema = batch.schema();

        // Stale index from a previous run is dropped wholesale; ingestion
        // is a full rebuild, not incremental.
        self.conn.drop_table(FAQ_TABLE).await.ok();

        let batches = RecordBatchIterator::new(vec![Ok(batch)], schema);
        self.conn
            .create_table(FAQ_TABLE, batches)
            .execute()
            .await?;

        Ok(count)
    }
}

// ============================================================================
// Arrow conversion (pure, no side effects)
// ============================================================================

fn faq_chunks_to_batch(
    chunks: &[FaqChunk],
    embeddings: Vec<Vec<f32>>,
    dim: usize,
) -> Result<RecordBatch, StoreError> {
    use arrow_array::builder::{FixedSizeListBuilder, Float32Builder};

    let chunk_ids: StringArray = chunks.iter().map(|c| Some(c.chunk_id.as_str())).collect();
    let texts: StringArray = chunks.iter().map(|c| Some(c.text.as_str())).collect();

    let mut vector_builder = FixedSizeListBuilder::new(Float32Builder::new(), dim as i32);
    for emb in &embeddings {
        vector_builder.values().append_slice(emb);
        vector_builder.append(true);
    }
    let vectors = vector_builder.finish();

    let schema = Arc::new(arrow_schema::Schema::new(vec![
        arrow_schema::Field::new("chunk_id", arrow_schema::DataType::Utf8, false),
        arrow_schema::Field::new("text", arrow_schema::DataType::Utf8, false),
        arrow_schema::Field::new(
            "vector",
            arrow_schema::DataType::FixedSizeList(
                Arc::new(arrow_schema::Field::new(
                    "item",
                    arrow_schema::DataType::Float32,
                    true,
                )),
                dim as i32,
            ),
            false,
        ),
    ]));

    Ok(RecordBatch::try_new(
        schema,
        vec![Arc::new(chunk_ids), Arc::new(texts), Arc::new(vectors)],
    )?)
}

async fn batches_to_faq_chunks(
    stream: impl futures::Stream<Item = Result<RecordBatch, lancedb::Error>> + Unpin,
) -> Result<Vec<FaqChunk>, StoreError> {
    stream
        .map_err(StoreError::from)
        .try_fold(Vec::new(), |mut acc, batch| async move {
            acc.extend(extract_faq_chunks_from_batch(&batch)?);
            Ok(acc)
        })
        .await
}

fn extract_faq_chunks_from_batch(batch: &RecordBatch) -> Result<Vec<FaqChunk>, StoreError> {
    let col = |name: &str| -> Result<&StringArray, StoreError> {
        batch
            .column_by_name(name)
            .and_then(|c| c.as_any().downcast_ref::<StringArray>())
            .ok_or_else(|| StoreError::SchemaMismatch(name.into()))
    };

    let chunk_ids = col("chunk_id")?;
    let texts = col("text")?;

    let chunks = (0..batch.num_rows())
        .map(|i| FaqChunk {
            chunk_id: chunk_ids.value(i).to_string(),
            text: texts.value(i).to_string(),
        })
        .collect();

    Ok(chunks)
}
