//! Application configuration for SalesAgent.
//!
//! User config lives at `~/.salesagent/salesagent.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, SalesAgentError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "salesagent.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".salesagent";

// ---------------------------------------------------------------------------
// Config structs (matching salesagent.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// File locations.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Embedding/chat provider settings.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Retrieval tuning.
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Lead ledger CSV file.
    #[serde(default = "default_leads_file")]
    pub leads_file: String,

    /// Vector index database file.
    #[serde(default = "default_index_path")]
    pub index_path: String,

    /// Product catalog CSV.
    #[serde(default = "default_products_csv")]
    pub products_csv: String,

    /// FAQ CSV.
    #[serde(default = "default_faqs_csv")]
    pub faqs_csv: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            leads_file: default_leads_file(),
            index_path: default_index_path(),
            products_csv: default_products_csv(),
            faqs_csv: default_faqs_csv(),
        }
    }
}

fn default_leads_file() -> String {
    "leads.csv".into()
}
fn default_index_path() -> String {
    "./index/catalog.db".into()
}
fn default_products_csv() -> String {
    "sample_products.csv".into()
}
fn default_faqs_csv() -> String {
    "sample_faqs.csv".into()
}

/// `[provider]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Chat completion model.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Embedding model.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Sampling temperature for chat completions.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            chat_model: default_chat_model(),
            embedding_model: default_embedding_model(),
            temperature: default_temperature(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_chat_model() -> String {
    "gpt-3.5-turbo".into()
}
fn default_embedding_model() -> String {
    "text-embedding-ada-002".into()
}
fn default_temperature() -> f32 {
    0.1
}
fn default_request_timeout() -> u64 {
    60
}

impl ProviderConfig {
    /// Parse and validate `base_url`.
    pub fn base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            SalesAgentError::config(format!("invalid provider base_url '{}': {e}", self.base_url))
        })?;
        if url.cannot_be_a_base() {
            return Err(SalesAgentError::config(format!(
                "provider base_url '{}' cannot be used as a base URL",
                self.base_url
            )));
        }
        Ok(url)
    }
}

/// `[retrieval]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of documents retrieved per question.
    #[serde(default = "default_k")]
    pub k: usize,

    /// Number of documents sent per embeddings request during ingestion.
    #[serde(default = "default_embed_batch_size")]
    pub embed_batch_size: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            k: default_k(),
            embed_batch_size: default_embed_batch_size(),
        }
    }
}

fn default_k() -> usize {
    4
}
fn default_embed_batch_size() -> usize {
    64
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.salesagent/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SalesAgentError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.salesagent/salesagent.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SalesAgentError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        SalesAgentError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SalesAgentError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| SalesAgentError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SalesAgentError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the provider API key from the env var named in config.
///
/// A missing or empty variable is a config error; callers halt the surface
/// they were starting and show the message.
pub fn resolve_api_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.provider.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(SalesAgentError::config(format!(
            "API key not found. Set the {var_name} environment variable."
        ))),
    }
}
