//! Chat agent workflows for SalesAgent.
//!
//! This crate ties the provider client, catalog index and lead ledger into
//! the user-facing operations: `ingest`, conversational answering, lead
//! capture within a session, and caption generation.

pub mod answering;
pub mod captions;
pub mod catalog;
pub mod ingest;
pub mod provider;
pub mod session;

#[cfg(test)]
mod testing;

pub use answering::{AnswerResult, AnsweringService};
pub use provider::{ChatMessage, ChatModel, Embedder, OpenAiClient};
pub use session::ChatSession;
