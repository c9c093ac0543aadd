//! Pre-built helpers for testing code that drives models and tools.
//!
//! Available when the `test-utils` feature is enabled, so downstream
//! crates can reuse them; also compiled for this crate's own tests.

use serde_json::Value;

use crate::chat::{ChatMessage, ToolCall};
use crate::mock::MockProvider;
use crate::provider::{ChatResponse, ProviderMetadata};

/// A response holding a single assistant text message.
pub fn text_response(text: &str) -> ChatResponse {
    ChatResponse::new(vec![ChatMessage::assistant(text)])
}

/// A response holding one tool-call message per call, in order.
pub fn tool_call_response(calls: Vec<ToolCall>) -> ChatResponse {
    ChatResponse::new(calls.into_iter().map(ChatMessage::tool_call).collect())
}

/// A response that calls the default `formatter` tool with `payload`.
pub fn formatter_response(id: &str, payload: Value) -> ChatResponse {
    tool_call_response(vec![ToolCall::new(
        id,
        crate::structured::DEFAULT_FORMATTER_NAME,
        payload,
    )])
}

/// Shorthand for [`ChatMessage::user`].
pub fn user_msg(text: &str) -> ChatMessage {
    ChatMessage::user(text)
}

/// Shorthand for [`ChatMessage::assistant`].
pub fn assistant_msg(text: &str) -> ChatMessage {
    ChatMessage::assistant(text)
}

/// Shorthand for [`ChatMessage::system`].
pub fn system_msg(text: &str) -> ChatMessage {
    ChatMessage::system(text)
}

/// Creates a [`MockProvider`] with the given name and model.
pub fn mock_for(provider_name: &str, model: &str) -> MockProvider {
    MockProvider::new(ProviderMetadata {
        name: provider_name.to_owned().into(),
        model: model.into(),
    })
}
