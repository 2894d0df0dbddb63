//! Embedding and chat-completion provider.
//!
//! [`Embedder`] and [`ChatModel`] are the seams the index, answering chain
//! and caption generator are written against. [`OpenAiClient`] implements
//! both over any OpenAI-compatible HTTP API.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use salesagent_shared::{AppConfig, ProviderConfig, Result, SalesAgentError, resolve_api_key};

/// User-Agent string for provider requests.
const USER_AGENT: &str = concat!("SalesAgent/", env!("CARGO_PKG_VERSION"));

/// Longest error body excerpt carried into error messages.
const ERROR_EXCERPT_CHARS: usize = 300;

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Turns text into vectors.
pub trait Embedder: Send + Sync {
    /// Identifier of the embedding model, stored alongside vectors.
    fn model_id(&self) -> &str;

    /// Embed `texts`, returning one vector per input in input order.
    fn embed(&self, texts: &[String]) -> impl Future<Output = Result<Vec<Vec<f32>>>> + Send;
}

/// Produces a completion for a chat transcript.
pub trait ChatModel: Send + Sync {
    fn complete(&self, messages: &[ChatMessage]) -> impl Future<Output = Result<String>> + Send;
}

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message sent to a [`ChatModel`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

// ---------------------------------------------------------------------------
// OpenAiClient
// ---------------------------------------------------------------------------

/// HTTP client for an OpenAI-compatible API.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    base_url: String,
    api_key: String,
    chat_model: String,
    embedding_model: String,
    temperature: f32,
}

impl OpenAiClient {
    /// Build a client from provider settings and an explicit API key.
    pub fn new(config: &ProviderConfig, api_key: impl Into<String>) -> Result<Self> {
        let base_url = config.base_url()?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| SalesAgentError::Provider(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            chat_model: config.chat_model.clone(),
            embedding_model: config.embedding_model.clone(),
            temperature: config.temperature,
        })
    }

    /// Build a client from app config, reading the API key from the environment.
    pub fn from_app_config(config: &AppConfig) -> Result<Self> {
        let api_key = resolve_api_key(config)?;
        Self::new(&config.provider, api_key)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: for<'de> Deserialize<'de>,
    {
        let url = self.endpoint(path);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| SalesAgentError::Provider(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SalesAgentError::Provider(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(SalesAgentError::Provider(format!(
                "{path} returned {status}: {}",
                error_message(&text)
            )));
        }

        serde_json::from_str(&text)
            .map_err(|e| SalesAgentError::Provider(format!("invalid {path} response: {e}")))
    }
}

impl Embedder for OpenAiClient {
    fn model_id(&self) -> &str {
        &self.embedding_model
    }

    #[instrument(skip_all, fields(model = %self.embedding_model, count = texts.len()))]
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingsRequest {
            model: &self.embedding_model,
            input: texts,
        };
        let response: EmbeddingsResponse = self.post_json("embeddings", &request).await?;

        if response.data.len() != texts.len() {
            return Err(SalesAgentError::Provider(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                response.data.len()
            )));
        }

        let mut data = response.data;
        data.sort_by_key(|d| d.index);
        debug!("embeddings received");
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

impl ChatModel for OpenAiClient {
    #[instrument(skip_all, fields(model = %self.chat_model, messages = messages.len()))]
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = ChatRequest {
            model: &self.chat_model,
            temperature: self.temperature,
            messages,
        };
        let response: ChatResponse = self.post_json("chat/completions", &request).await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        debug!(chars = content.len(), "completion received");
        Ok(content)
    }
}

/// Best-effort human-readable message from an error response body.
fn error_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        return parsed.error.message;
    }
    body.chars().take(ERROR_EXCERPT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenAiClient {
        let config = ProviderConfig {
            base_url: format!("{}/v1", server.uri()),
            ..ProviderConfig::default()
        };
        OpenAiClient::new(&config, "test-key").expect("build client")
    }

    #[tokio::test]
    async fn embed_orders_by_index() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "text-embedding-ada-002",
                "input": ["first", "second"],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    { "index": 1, "embedding": [0.0, 1.0] },
                    { "index": 0, "embedding": [1.0, 0.0] },
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let vectors = client
            .embed(&["first".to_string(), "second".to_string()])
            .await
            .expect("embed");
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn embed_empty_input_skips_request() {
        let server = MockServer::start().await;
        let client = client_for(&server);
        assert!(client.embed(&[]).await.expect("embed").is_empty());
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn embed_count_mismatch_is_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{ "index": 0, "embedding": [1.0] }]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .embed(&["a".to_string(), "b".to_string()])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("expected 2 embeddings"));
    }

    #[tokio::test]
    async fn complete_returns_first_choice() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-3.5-turbo",
                "messages": [{ "role": "user", "content": "hello" }],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [
                    { "index": 0, "message": { "role": "assistant", "content": "Hi there!" } }
                ]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let reply = client
            .complete(&[ChatMessage::user("hello")])
            .await
            .expect("complete");
        assert_eq!(reply, "Hi there!");
    }

    #[tokio::test]
    async fn api_error_message_is_surfaced() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .complete(&[ChatMessage::user("hello")])
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("401"));
        assert!(msg.contains("Incorrect API key provided"));
    }

    #[test]
    fn error_message_falls_back_to_excerpt() {
        let body = "x".repeat(1000);
        assert_eq!(error_message(&body).len(), ERROR_EXCERPT_CHARS);
        assert_eq!(error_message("gateway timeout"), "gateway timeout");
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::system("be brief")).unwrap();
        assert_eq!(json, r#"{"role":"system","content":"be brief"}"#);
    }

    #[test]
    fn trailing_slash_in_base_url() {
        let config = ProviderConfig {
            base_url: "http://localhost:8080/v1/".into(),
            ..ProviderConfig::default()
        };
        let client = OpenAiClient::new(&config, "k").unwrap();
        assert_eq!(client.endpoint("embeddings"), "http://localhost:8080/v1/embeddings");
    }
}
