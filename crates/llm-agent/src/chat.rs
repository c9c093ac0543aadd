//! Conversation messages, tool calls, and history.
//!
//! A conversation is an ordered, append-only sequence of [`ChatMessage`]s.
//! Each message is one of six closed kinds; [`ChatMessage::role`] and
//! [`ChatMessage::kind`] classify it without downcasting.
//!
//! ```text
//!   User ─► Assistant text ─┐
//!                           ├─► ToolCall(id=tc_1) ─► ToolResult(tc_1) ─► Assistant text
//!   System (preamble)       └─► ToolCall(id=tc_2) ─► ToolError(tc_2)
//! ```
//!
//! Tool results and tool errors always reference the [`ToolCall`] they
//! answer; [`History::validate_correlation`] checks that every such
//! reference points at an earlier call in the same history.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LlmError;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The human (or calling application).
    User,
    /// The model.
    Assistant,
    /// Request-level instructions.
    System,
    /// Output of an executed tool.
    Tool,
}

/// Coarse classification of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Free text from any role.
    Text,
    /// A model request to execute a tool.
    ToolCall,
    /// The outcome (success or failure) of a tool execution.
    ToolResult,
}

/// A model-issued request to execute a named tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Correlation id assigned by the transport. Results reference it.
    pub id: String,
    /// Name of the tool to execute.
    pub name: String,
    /// Arguments, shaped by the tool's input schema.
    pub arguments: Value,
}

impl ToolCall {
    /// Creates a tool call.
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Returns a copy of this call with replaced arguments, keeping `id`
    /// and `name`.
    #[must_use]
    pub fn with_arguments(&self, arguments: Value) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            arguments,
        }
    }
}

/// A single entry in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatMessage {
    /// Text from the user.
    User {
        /// Message text.
        content: String,
    },
    /// Free text from the model.
    Assistant {
        /// Message text.
        content: String,
    },
    /// A system preamble.
    System {
        /// Message text.
        content: String,
    },
    /// The model asking for `call` to be executed.
    ToolCall {
        /// The requested call.
        call: ToolCall,
    },
    /// A successful tool execution.
    ToolResult {
        /// The call this result answers.
        call: ToolCall,
        /// The tool's output payload.
        result: Value,
    },
    /// A failed tool execution.
    ToolError {
        /// The call this error answers.
        call: ToolCall,
        /// Human-readable failure description.
        error: String,
    },
}

impl ChatMessage {
    /// Shorthand for a user text message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    /// Shorthand for an assistant text message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: content.into(),
        }
    }

    /// Shorthand for a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    /// Shorthand for a tool-call message.
    pub fn tool_call(call: ToolCall) -> Self {
        Self::ToolCall { call }
    }

    /// Shorthand for a successful tool result.
    pub fn tool_result(call: ToolCall, result: Value) -> Self {
        Self::ToolResult { call, result }
    }

    /// Shorthand for a failed tool result.
    pub fn tool_error(call: ToolCall, error: impl Into<String>) -> Self {
        Self::ToolError {
            call,
            error: error.into(),
        }
    }

    /// The author of this message.
    pub fn role(&self) -> ChatRole {
        match self {
            Self::User { .. } => ChatRole::User,
            Self::Assistant { .. } | Self::ToolCall { .. } => ChatRole::Assistant,
            Self::System { .. } => ChatRole::System,
            Self::ToolResult { .. } | Self::ToolError { .. } => ChatRole::Tool,
        }
    }

    /// The kind of this message.
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::User { .. } | Self::Assistant { .. } | Self::System { .. } => MessageKind::Text,
            Self::ToolCall { .. } => MessageKind::ToolCall,
            Self::ToolResult { .. } | Self::ToolError { .. } => MessageKind::ToolResult,
        }
    }

    /// Returns `true` for [`ChatMessage::ToolCall`].
    pub fn is_tool_call(&self) -> bool {
        matches!(self, Self::ToolCall { .. })
    }

    /// Returns the requested call if this is a tool-call message.
    pub fn as_tool_call(&self) -> Option<&ToolCall> {
        match self {
            Self::ToolCall { call } => Some(call),
            _ => None,
        }
    }

    /// Returns the text of user, assistant, and system messages.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::User { content } | Self::Assistant { content } | Self::System { content } => {
                Some(content)
            }
            _ => None,
        }
    }

    /// For tool results and errors, the call being answered.
    pub fn answered_call(&self) -> Option<&ToolCall> {
        match self {
            Self::ToolResult { call, .. } | Self::ToolError { call, .. } => Some(call),
            _ => None,
        }
    }
}

/// An append-only conversation history.
///
/// The only mutations are [`push`](Self::push) and
/// [`extend`](Self::extend); entries already in the history are never
/// reordered or rewritten.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History(Vec<ChatMessage>);

impl History {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one message.
    pub fn push(&mut self, message: ChatMessage) {
        self.0.push(message);
    }

    /// Appends messages in order.
    pub fn extend(&mut self, messages: impl IntoIterator<Item = ChatMessage>) {
        self.0.extend(messages);
    }

    /// Returns a new history made of `self` followed by `messages`.
    #[must_use]
    pub fn concat<'a>(&self, messages: impl IntoIterator<Item = &'a ChatMessage>) -> Self {
        let mut next = self.clone();
        next.extend(messages.into_iter().cloned());
        next
    }

    /// Iterates messages in order.
    pub fn iter(&self) -> std::slice::Iter<'_, ChatMessage> {
        self.0.iter()
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The messages as a slice.
    pub fn as_slice(&self) -> &[ChatMessage] {
        &self.0
    }

    /// Consumes the history, returning its messages.
    pub fn into_vec(self) -> Vec<ChatMessage> {
        self.0
    }

    /// Checks that every tool result or tool error references a tool call
    /// that appears earlier in the history.
    pub fn validate_correlation(&self) -> Result<(), LlmError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for (index, message) in self.0.iter().enumerate() {
            if let Some(call) = message.as_tool_call() {
                seen.insert(call.id.as_str());
            } else if let Some(call) = message.answered_call() {
                if !seen.contains(call.id.as_str()) {
                    return Err(LlmError::InvalidRequest(format!(
                        "message {index} answers unknown tool call '{}' ({})",
                        call.id, call.name
                    )));
                }
            }
        }
        Ok(())
    }
}

impl From<Vec<ChatMessage>> for History {
    fn from(messages: Vec<ChatMessage>) -> Self {
        Self(messages)
    }
}

impl FromIterator<ChatMessage> for History {
    fn from_iter<I: IntoIterator<Item = ChatMessage>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a ChatMessage;
    type IntoIter = std::slice::Iter<'a, ChatMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for History {
    type Item = ChatMessage;
    type IntoIter = std::vec::IntoIter<ChatMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(id: &str) -> ToolCall {
        ToolCall::new(id, "calculator", json!({"a": 1}))
    }

    #[test]
    fn test_roles_and_kinds() {
        let cases = [
            (ChatMessage::user("hi"), ChatRole::User, MessageKind::Text),
            (
                ChatMessage::assistant("hello"),
                ChatRole::Assistant,
                MessageKind::Text,
            ),
            (ChatMessage::system("be brief"), ChatRole::System, MessageKind::Text),
            (
                ChatMessage::tool_call(call("tc_1")),
                ChatRole::Assistant,
                MessageKind::ToolCall,
            ),
            (
                ChatMessage::tool_result(call("tc_1"), json!(2)),
                ChatRole::Tool,
                MessageKind::ToolResult,
            ),
            (
                ChatMessage::tool_error(call("tc_1"), "boom"),
                ChatRole::Tool,
                MessageKind::ToolResult,
            ),
        ];
        for (message, role, kind) in cases {
            assert_eq!(message.role(), role, "{message:?}");
            assert_eq!(message.kind(), kind, "{message:?}");
        }
    }

    #[test]
    fn test_tool_call_accessors() {
        let msg = ChatMessage::tool_call(call("tc_1"));
        assert!(msg.is_tool_call());
        assert_eq!(msg.as_tool_call().unwrap().id, "tc_1");
        assert!(msg.text().is_none());

        let text = ChatMessage::assistant("done");
        assert!(!text.is_tool_call());
        assert_eq!(text.text(), Some("done"));
    }

    #[test]
    fn test_with_arguments_keeps_identity() {
        let original = call("tc_9");
        let fixed = original.with_arguments(json!({"a": 2}));
        assert_eq!(fixed.id, "tc_9");
        assert_eq!(fixed.name, "calculator");
        assert_eq!(fixed.arguments, json!({"a": 2}));
        assert_eq!(original.arguments, json!({"a": 1}));
    }

    #[test]
    fn test_history_concat_preserves_original() {
        let base: History = vec![ChatMessage::user("q")].into();
        let turn = [ChatMessage::assistant("a")];
        let next = base.concat(&turn);

        assert_eq!(base.len(), 1);
        assert_eq!(next.len(), 2);
        assert_eq!(next.as_slice()[0], base.as_slice()[0]);
    }

    #[test]
    fn test_correlation_accepts_answered_calls() {
        let history: History = vec![
            ChatMessage::user("q"),
            ChatMessage::tool_call(call("tc_1")),
            ChatMessage::tool_result(call("tc_1"), json!({"result": 2})),
        ]
        .into();
        assert!(history.validate_correlation().is_ok());
    }

    #[test]
    fn test_correlation_rejects_orphan_result() {
        let history: History = vec![
            ChatMessage::user("q"),
            ChatMessage::tool_error(call("tc_404"), "nope"),
        ]
        .into();
        let err = history.validate_correlation().unwrap_err();
        assert!(matches!(err, LlmError::InvalidRequest(ref m) if m.contains("tc_404")));
    }

    #[test]
    fn test_correlation_rejects_result_before_call() {
        let history: History = vec![
            ChatMessage::tool_result(call("tc_1"), json!(1)),
            ChatMessage::tool_call(call("tc_1")),
        ]
        .into();
        assert!(history.validate_correlation().is_err());
    }

    #[test]
    fn test_message_serde_tagged() {
        let msg = ChatMessage::tool_result(call("tc_1"), json!({"result": 42}));
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "tool_result");
        assert_eq!(value["call"]["id"], "tc_1");
        let back: ChatMessage = serde_json::from_value(value).unwrap();
        assert_eq!(back, msg);
    }
}
