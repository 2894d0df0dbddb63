//! Core domain types for SalesAgent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// LeadStatus
// ---------------------------------------------------------------------------

/// Coarse qualification tier derived from a lead score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    Cold,
    Warm,
    Hot,
}

impl LeadStatus {
    /// Ledger representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cold => "cold",
            Self::Warm => "warm",
            Self::Hot => "hot",
        }
    }
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "cold" => Ok(Self::Cold),
            "warm" => Ok(Self::Warm),
            "hot" => Ok(Self::Hot),
            other => Err(format!("unknown lead status '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Lead
// ---------------------------------------------------------------------------

/// Raw lead-capture input. Every field is untrusted free text and may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadForm {
    pub name: String,
    pub email: String,
    pub interest: String,
    pub budget: String,
}

/// One row of the lead ledger.
///
/// Field order is the ledger column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    /// Capture instant (UTC).
    pub timestamp: DateTime<Utc>,
    pub name: String,
    pub email: String,
    pub interest: String,
    /// Budget exactly as entered; scoring parses it, the ledger keeps the text.
    pub budget: String,
    pub lead_score: u32,
    pub status: LeadStatus,
}

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

/// One completed question/answer exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub question: String,
    pub answer: String,
}

impl ConversationTurn {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog documents
// ---------------------------------------------------------------------------

/// A free-text catalog document ready for embedding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDocument {
    /// Stable source identifier, e.g. `product:3` or `faq:12`.
    pub source: String,
    /// Text that is embedded and shown to the model as context.
    pub content: String,
}

/// Reference to a retrieved document cited by an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub source: String,
    /// Cosine similarity to the (condensed) question.
    #[serde(default)]
    pub score: f32,
}
