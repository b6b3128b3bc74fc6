pub mod context;
pub mod generator;
pub mod intent;

pub use generator::LlmClient;

use thiserror::Error;

/// Errors surfaced by the engine. Classification, commerce lookups, and
/// FAQ search all degrade internally, so generation is the one call left
/// that can fail a chat turn.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("generation failed: {0}")]
    Generation(String),
}
