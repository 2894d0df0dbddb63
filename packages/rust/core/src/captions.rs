//! Social media caption generator.

use tracing::{info, instrument};

use salesagent_shared::{Result, SalesAgentError};

use crate::provider::{ChatMessage, ChatModel};

/// Audience used when none is given.
const DEFAULT_AUDIENCE: &str = "general";

/// Build the caption prompt for a product and target audience.
pub fn caption_prompt(product: &str, audience: &str) -> String {
    let audience = match audience.trim() {
        "" => DEFAULT_AUDIENCE,
        a => a,
    };
    format!(
        "Create 3 short social media captions for the product: {product}.\n\
         Audience: {audience}. Keep each caption to 1-2 short sentences and include a call-to-action."
    )
}

/// Ask the chat model for three captions. Returns the model's text as-is.
#[instrument(skip_all, fields(product = %product))]
pub async fn generate_captions<C: ChatModel>(chat: &C, product: &str, audience: &str) -> Result<String> {
    let product = product.trim();
    if product.is_empty() {
        return Err(SalesAgentError::validation("Enter a product name."));
    }

    let text = chat
        .complete(&[ChatMessage::user(caption_prompt(product, audience))])
        .await?;
    info!(chars = text.len(), "captions generated");
    Ok(text)
}
