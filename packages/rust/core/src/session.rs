//! Per-session chat state.
//!
//! A [`ChatSession`] is owned by whoever drives the conversation (the CLI
//! REPL, the TUI). Nothing here is global: two sessions never share turns.

use tracing::{info, instrument};
use uuid::Uuid;

use salesagent_leads::LeadLedger;
use salesagent_shared::{ConversationTurn, Lead, LeadForm, Result, SalesAgentError};

use crate::answering::{AnswerResult, AnsweringService};
use crate::provider::{ChatModel, Embedder};

/// Ordered question/answer history for one user session.
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: Uuid,
    turns: Vec<ConversationTurn>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::now_v7(),
            turns: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Number of completed exchanges; the interaction signal for lead scoring.
    pub fn interaction_count(&self) -> usize {
        self.turns.len()
    }

    /// Ask a question with this session's history as context.
    ///
    /// Blank questions are rejected before any service call. The turn is
    /// recorded only when an answer comes back.
    #[instrument(skip_all, fields(session = %self.id, turn = self.turns.len() + 1))]
    pub async fn ask<E: Embedder, C: ChatModel>(
        &mut self,
        service: &AnsweringService<E, C>,
        question: &str,
    ) -> Result<AnswerResult> {
        if question.trim().is_empty() {
            return Err(SalesAgentError::validation("Type a question first."));
        }

        let result = service.answer(question, &self.turns).await?;
        self.turns
            .push(ConversationTurn::new(question, result.answer.clone()));

        info!(sources = result.sources.len(), "question answered");
        Ok(result)
    }

    /// Score and store a lead captured during this session.
    pub fn capture_lead(&self, ledger: &LeadLedger, form: &LeadForm) -> Result<Lead> {
        ledger.capture(form, self.interaction_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{KeywordEmbedder, ScriptedChat};
    use salesagent_shared::LeadStatus;
    use salesagent_storage::Storage;

    async fn service(chat: ScriptedChat) -> AnsweringService<KeywordEmbedder, ScriptedChat> {
        let path = std::env::temp_dir().join(format!("sa_session_{}.db", Uuid::now_v7()));
        let index = Storage::open(&path).await.expect("open index");
        AnsweringService::new(KeywordEmbedder::default(), chat, index, 4)
    }

    #[tokio::test]
    async fn blank_question_rejected_without_calls() {
        let service = service(ScriptedChat::default()).await;
        let mut session = ChatSession::new();

        let err = session.ask(&service, "   ").await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Type a question first.");
        assert!(service.chat_model().prompts().is_empty());
        assert_eq!(session.interaction_count(), 0);
    }

    #[tokio::test]
    async fn successful_answers_are_appended_in_order() {
        let service = service(ScriptedChat::with_replies([
            "We ship worldwide.",
            "What does shipping cost?",
            "Shipping is free over $50.",
        ]))
        .await;
        let mut session = ChatSession::new();

        session.ask(&service, "Do you ship abroad?").await.unwrap();
        session.ask(&service, "How much?").await.unwrap();

        assert_eq!(
            session.turns(),
            &[
                ConversationTurn::new("Do you ship abroad?", "We ship worldwide."),
                ConversationTurn::new("How much?", "Shipping is free over $50."),
            ]
        );
    }

    #[tokio::test]
    async fn failed_answer_leaves_history_untouched() {
        let service = service(ScriptedChat::failing("timeout")).await;
        let mut session = ChatSession::new();

        assert!(session.ask(&service, "Hello?").await.is_err());
        assert!(session.turns().is_empty());
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let service = service(ScriptedChat::with_replies(["Hi!"])).await;
        let mut first = ChatSession::new();
        let second = ChatSession::new();

        first.ask(&service, "Hello").await.unwrap();
        assert_eq!(first.interaction_count(), 1);
        assert_eq!(second.interaction_count(), 0);
        assert_ne!(first.id(), second.id());
    }

    #[tokio::test]
    async fn lead_capture_uses_interaction_count() {
        let service = service(ScriptedChat::with_replies([
            "Yes.",
            "Do you have tripods in stock?",
            "Yes, ships today.",
        ]))
        .await;
        let mut session = ChatSession::new();
        session.ask(&service, "Do you sell tripods?").await.unwrap();
        session.ask(&service, "In stock?").await.unwrap();

        let ledger = LeadLedger::new(
            std::env::temp_dir()
                .join(format!("sa_session_leads_{}", Uuid::now_v7()))
                .join("leads.csv"),
        );
        let form = LeadForm {
            name: "Ada".into(),
            email: "a@b.com".into(),
            interest: "I need this urgently".into(),
            budget: "150".into(),
        };

        let lead = session.capture_lead(&ledger, &form).unwrap();
        assert_eq!(lead.lead_score, 90);
        assert_eq!(lead.status, LeadStatus::Hot);
        assert_eq!(ledger.read_all().unwrap(), vec![lead]);
        // Saving a lead does not touch the conversation.
        assert_eq!(session.interaction_count(), 2);
    }
}
