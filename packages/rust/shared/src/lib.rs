//! Shared types, error model, and configuration for SalesAgent.
//!
//! This crate is the foundation depended on by all other SalesAgent crates.
//! It provides:
//! - [`SalesAgentError`] — the unified error type
//! - Domain types ([`Lead`], [`LeadStatus`], [`ConversationTurn`], [`CatalogDocument`])
//! - Configuration ([`AppConfig`], config loading, API key resolution)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, ProviderConfig, RetrievalConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, resolve_api_key,
};
pub use error::{Result, SalesAgentError};
pub use types::{CatalogDocument, ConversationTurn, Lead, LeadForm, LeadStatus, SourceRef};
