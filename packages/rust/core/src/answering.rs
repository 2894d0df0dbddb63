//! Conversational retrieval over the catalog index.
//!
//! A follow-up question is first rewritten into a standalone question using
//! the prior turns, then the top-`k` catalog documents are retrieved and the
//! chat model answers from them alone.

use std::path::Path;

use tracing::{debug, info, instrument};

use salesagent_shared::{AppConfig, ConversationTurn, Result, SourceRef};
use salesagent_storage::{ScoredDocument, Storage};

use crate::provider::{ChatMessage, ChatModel, Embedder, OpenAiClient};

/// Shown when the model returns an empty completion.
pub const NO_ANSWER: &str = "(no answer)";

const CONDENSE_TEMPLATE: &str = "Given the following conversation and a follow up question, \
rephrase the follow up question to be a standalone question, in its original language.\n\n\
Chat History:\n{chat_history}\nFollow Up Input: {question}\nStandalone question:";

const ANSWER_TEMPLATE: &str = "Use the following pieces of context to answer the user's question. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\
----------------\n{context}";

/// An answer plus the documents it was grounded on.
#[derive(Debug, Clone)]
pub struct AnswerResult {
    pub answer: String,
    /// Retrieved documents, best match first.
    pub sources: Vec<SourceRef>,
    /// Question actually used for retrieval.
    pub standalone_question: String,
}

/// Retrieval + generation over an opened index.
pub struct AnsweringService<E, C> {
    embedder: E,
    chat: C,
    index: Storage,
    k: usize,
}

impl AnsweringService<OpenAiClient, OpenAiClient> {
    /// Connect to the configured provider and open the index read-only.
    ///
    /// Fails with a config error when the API key is missing and with an
    /// index-unavailable error when ingestion has not been run.
    pub async fn connect(config: &AppConfig, index_path: &Path) -> Result<Self> {
        let client = OpenAiClient::from_app_config(config)?;
        let index = Storage::open_readonly(index_path).await?;
        info!(
            index = %index_path.display(),
            documents = index.document_count().await?,
            "catalog index opened"
        );
        Ok(Self::new(client.clone(), client, index, config.retrieval.k))
    }
}

impl<E: Embedder, C: ChatModel> AnsweringService<E, C> {
    pub fn new(embedder: E, chat: C, index: Storage, k: usize) -> Self {
        Self {
            embedder,
            chat,
            index,
            k,
        }
    }

    /// The chat model, for callers that also generate free-form text.
    pub fn chat_model(&self) -> &C {
        &self.chat
    }

    /// Answer `question` in the context of `history`.
    #[instrument(skip_all, fields(history = history.len(), k = self.k))]
    pub async fn answer(&self, question: &str, history: &[ConversationTurn]) -> Result<AnswerResult> {
        let standalone_question = if history.is_empty() {
            question.to_string()
        } else {
            let prompt = condense_prompt(history, question);
            let rewritten = self.chat.complete(&[ChatMessage::user(prompt)]).await?;
            let rewritten = rewritten.trim();
            if rewritten.is_empty() {
                question.to_string()
            } else {
                rewritten.to_string()
            }
        };
        debug!(%standalone_question, "retrieval question");

        let query_vectors = self
            .embedder
            .embed(std::slice::from_ref(&standalone_question))
            .await?;
        let query = query_vectors.into_iter().next().unwrap_or_default();
        let documents = self.index.search(&query, self.k).await?;

        let messages = answer_messages(&documents, &standalone_question);
        let answer = self.chat.complete(&messages).await?;
        let answer = match answer.trim() {
            "" => NO_ANSWER.to_string(),
            text => text.to_string(),
        };

        let sources = documents
            .iter()
            .map(|d| SourceRef {
                source: d.source.clone(),
                score: d.similarity,
            })
            .collect();

        Ok(AnswerResult {
            answer,
            sources,
            standalone_question,
        })
    }
}

/// Render prior turns as a `Human:` / `Assistant:` transcript.
fn format_history(history: &[ConversationTurn]) -> String {
    history
        .iter()
        .map(|t| format!("\nHuman: {}\nAssistant: {}", t.question, t.answer))
        .collect()
}

fn condense_prompt(history: &[ConversationTurn], question: &str) -> String {
    CONDENSE_TEMPLATE
        .replace("{chat_history}", &format_history(history))
        .replace("{question}", question)
}

fn answer_messages(documents: &[ScoredDocument], question: &str) -> Vec<ChatMessage> {
    let context = documents
        .iter()
        .map(|d| d.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    vec![
        ChatMessage::system(ANSWER_TEMPLATE.replace("{context}", &context)),
        ChatMessage::user(question),
    ]
}
