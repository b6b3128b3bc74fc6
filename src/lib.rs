//! support-rag-chat: retrieval-augmented customer support chat backend.
//!
//! A single chat turn flows endpoint -> intent classification -> commerce
//! and/or FAQ lookups -> context assembly -> answer generation. Every
//! collaborator failure degrades (empty data, default intent, FAQ-less
//! context) rather than failing the request.

pub mod api;
pub mod commerce;
pub mod config;
pub mod engine;
pub mod models;
pub mod store;

pub use api::AppState;
pub use config::Config;
