//! In-process fakes for the provider traits.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use salesagent_shared::{Result, SalesAgentError};

use crate::provider::{ChatMessage, ChatModel, Embedder};

/// Vocabulary axes for [`KeywordEmbedder`].
const AXES: &[&str] = &["return", "ship", "warranty", "tripod", "light", "bag", "mic"];

/// Embeds text as keyword-presence vectors, so related text lands close together.
#[derive(Default)]
pub(crate) struct KeywordEmbedder {
    pub calls: AtomicUsize,
    pub texts_embedded: AtomicUsize,
}

impl KeywordEmbedder {
    pub(crate) fn vector(text: &str) -> Vec<f32> {
        let lowered = text.to_lowercase();
        let mut v: Vec<f32> = AXES
            .iter()
            .map(|axis| if lowered.contains(axis) { 1.0 } else { 0.0 })
            .collect();
        // Small constant component keeps unrelated text from being zero-length.
        v.push(0.1);
        v
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn texts_embedded(&self) -> usize {
        self.texts_embedded.load(Ordering::SeqCst)
    }
}

impl Embedder for KeywordEmbedder {
    fn model_id(&self) -> &str {
        "keyword-test"
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts_embedded.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }
}

/// Replies with queued responses in order and records every prompt.
#[derive(Default)]
pub(crate) struct ScriptedChat {
    replies: Mutex<VecDeque<Result<String>>>,
    pub prompts: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedChat {
    pub(crate) fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from([Err(SalesAgentError::Provider(
                message.to_string(),
            ))])),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn prompts(&self) -> Vec<Vec<ChatMessage>> {
        self.prompts.lock().unwrap().clone()
    }
}

impl ChatModel for ScriptedChat {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.prompts.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(SalesAgentError::Provider("no scripted reply left".into())))
    }
}
