//! Prompt construction for the chat completion request.

use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessageArgs,
    ChatCompletionRequestUserMessageContent, ChatCompletionRequestUserMessageContentPart,
    CreateChatCompletionRequest,
};

use super::error::InferenceError;
use crate::constants::BODY_EXCERPT_CHARS;

pub const SYSTEM_PROMPT: &str = "You are an AI assistant that analyzes article titles and \
provides a relevance score from 1 to 10. Also, determine if the article is related to Ukraine.";

/// Returns at most `max_chars` characters of `text`, cut on a char boundary.
pub fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// The user prompt for one article. A body longer than the excerpt is cut and
/// marked with `...`.
pub fn user_prompt(title: &str, body_text: Option<&str>) -> String {
    let mut user = format!(
        "Analyze the following article title and provide a relevance score from 1 to 10, \
where 10 is highly relevant to technology and innovation. Also, indicate if it's related to \
Ukraine: \"{title}\""
    );

    if let Some(body) = body_text.map(str::trim).filter(|b| !b.is_empty()) {
        let cut = excerpt(body, BODY_EXCERPT_CHARS);
        user.push_str("\nArticle excerpt: \"");
        user.push_str(cut);
        if cut.len() < body.len() {
            user.push_str("...");
        }
        user.push('"');
    }

    user
}

/// Builds the system + user messages for one article.
pub fn build_messages(
    title: &str,
    body_text: Option<&str>,
) -> Result<Vec<ChatCompletionRequestMessage>, InferenceError> {
    let system = ChatCompletionRequestSystemMessageArgs::default()
        .content(SYSTEM_PROMPT)
        .build()
        .map_err(|e| InferenceError::InvalidRequest(e.to_string()))?;
    let user = ChatCompletionRequestUserMessageArgs::default()
        .content(user_prompt(title, body_text))
        .build()
        .map_err(|e| InferenceError::InvalidRequest(e.to_string()))?;

    Ok(vec![
        ChatCompletionRequestMessage::System(system),
        ChatCompletionRequestMessage::User(user),
    ])
}

/// Plain text of a system or user message; `None` for other roles.
pub fn message_text(message: &ChatCompletionRequestMessage) -> Option<&str> {
    match message {
        ChatCompletionRequestMessage::System(sys) => match &sys.content {
            ChatCompletionRequestSystemMessageContent::Text(t) => Some(t.as_str()),
            ChatCompletionRequestSystemMessageContent::Array(_) => None,
        },
        ChatCompletionRequestMessage::User(user) => match &user.content {
            ChatCompletionRequestUserMessageContent::Text(t) => Some(t.as_str()),
            ChatCompletionRequestUserMessageContent::Array(parts) => {
                parts.iter().find_map(|part| match part {
                    ChatCompletionRequestUserMessageContentPart::Text(t) => Some(t.text.as_str()),
                    _ => None,
                })
            }
        },
        _ => None,
    }
}

/// Content of the last user message (what the model is asked about).
pub fn user_content(request: &CreateChatCompletionRequest) -> &str {
    request
        .messages
        .iter()
        .rev()
        .filter(|m| matches!(m, ChatCompletionRequestMessage::User(_)))
        .find_map(message_text)
        .unwrap_or_default()
}
