//! Provider trait and request/response types.
//!
//! This module defines the seam between orchestration and the model
//! transport:
//!
//! - **[`Provider`]**: the trait every transport implements. It uses
//!   native async-fn-in-traits, so implementations are plain `async fn`s.
//!
//! - **[`DynProvider`]**: an object-safe mirror of `Provider` with boxed
//!   futures. A blanket `impl<T: Provider> DynProvider for T` bridges the
//!   two, so transports, [`StructuredOutput`](crate::StructuredOutput)
//!   wrappers, and [`Agent`](crate::Agent)s can all be stored as
//!   `Arc<dyn DynProvider>` and stacked on each other.
//!
//! # Request parameters
//!
//! A [`ChatRequest`] bundles history, tool definitions, the
//! [`ToolUsage`] policy, and generation parameters. Requests are values:
//! the `with_*` builders consume and return a new request, and
//! orchestration code always clones before overriding, so a caller's
//! request is never modified behind its back.
//!
//! # Transport obligations
//!
//! A transport must preserve tool-call ids when mapping replies into
//! [`ChatMessage`]s, and must honor [`ToolUsage::Forced`] exactly: if it
//! cannot produce a call to the forced tool it returns an error rather
//! than falling back to free text.

use std::borrow::Cow;
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chat::{ChatMessage, History, ToolCall};
use crate::error::LlmError;

/// The core trait every model transport implements.
///
/// `Provider` is **not** object-safe because it returns `impl Future`.
/// Use [`DynProvider`] for dynamic dispatch; every `Provider`
/// implements it automatically.
pub trait Provider: Send + Sync {
    /// Sends a request and returns the messages the model emitted.
    fn generate(
        &self,
        request: &ChatRequest,
    ) -> impl Future<Output = Result<ChatResponse, LlmError>> + Send;

    /// Returns static metadata describing this provider instance.
    fn metadata(&self) -> ProviderMetadata;
}

/// Object-safe counterpart of [`Provider`] for dynamic dispatch.
///
/// ```rust,no_run
/// use llm_agent::{ChatMessage, ChatRequest, DynProvider};
///
/// async fn ask(provider: &dyn DynProvider, question: &str) -> Option<String> {
///     let request = ChatRequest::new(vec![ChatMessage::user(question)]);
///     let resp = provider.generate_boxed(&request).await.ok()?;
///     resp.text().map(str::to_owned)
/// }
/// ```
pub trait DynProvider: Send + Sync {
    /// Boxed-future version of [`Provider::generate`].
    fn generate_boxed<'a>(
        &'a self,
        request: &'a ChatRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ChatResponse, LlmError>> + Send + 'a>>;

    /// Returns static metadata describing this provider instance.
    fn metadata(&self) -> ProviderMetadata;
}

impl<T: Provider> DynProvider for T {
    fn generate_boxed<'a>(
        &'a self,
        request: &'a ChatRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ChatResponse, LlmError>> + Send + 'a>> {
        Box::pin(self.generate(request))
    }

    fn metadata(&self) -> ProviderMetadata {
        Provider::metadata(self)
    }
}

/// Describes a provider instance.
///
/// `name` is a [`Cow<'static, str>`] so built-in transports can use a
/// static string while wrappers can build owned ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMetadata {
    /// Provider name, e.g. `"openai"`.
    pub name: Cow<'static, str>,
    /// Model identifier.
    pub model: String,
}

/// How the model may use the tools in a request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "tool", rename_all = "snake_case")]
pub enum ToolUsage {
    /// The model chooses freely: zero or more calls to any provided tool.
    #[default]
    Auto,
    /// The model must call exactly this tool.
    Forced(String),
}

impl ToolUsage {
    /// Shorthand for [`ToolUsage::Forced`].
    pub fn forced(tool_name: impl Into<String>) -> Self {
        Self::Forced(tool_name.into())
    }
}

/// A tool the model can invoke, as the transport sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name, matched against [`ToolCall::name`].
    pub name: String,
    /// Description shown to the model so it knows when to use the tool.
    pub description: String,
    /// Schema of the tool's arguments.
    pub input_schema: JsonSchema,
    /// Schema of the tool's result, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<JsonSchema>,
}

/// An opaque JSON Schema document.
///
/// Orchestration never introspects schemas; it only hands them to the
/// transport.
///
/// ```rust
/// use llm_agent::JsonSchema;
///
/// let schema = JsonSchema::new(serde_json::json!({
///     "type": "object",
///     "properties": { "name": { "type": "string" } },
///     "required": ["name"]
/// }));
/// assert_eq!(schema.as_value()["type"], "object");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonSchema(Value);

impl JsonSchema {
    /// Creates a schema from a raw JSON value.
    pub fn new(schema: Value) -> Self {
        Self(schema)
    }

    /// Returns a reference to the underlying JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Derives a JSON Schema from a Rust type that implements
    /// [`schemars::JsonSchema`].
    ///
    /// Requires the `schema` feature (enabled by default).
    #[cfg(feature = "schema")]
    pub fn from_type<T: schemars::JsonSchema>() -> Result<Self, serde_json::Error> {
        let schema = schemars::schema_for!(T);
        let value = serde_json::to_value(schema)?;
        Ok(Self(value))
    }
}

/// A single request to a model.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    /// System preamble, sent once per request.
    pub system: Option<String>,
    /// The conversation so far.
    pub history: History,
    /// Tools the model may call. Names must be unique.
    pub tools: Vec<ToolDefinition>,
    /// Tool-usage policy.
    pub tool_usage: ToolUsage,
    /// Upper bound on generated tokens.
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
}

impl ChatRequest {
    /// Creates a request with the given history and default parameters.
    pub fn new(history: impl Into<History>) -> Self {
        Self {
            history: history.into(),
            ..Default::default()
        }
    }

    /// Replaces the system preamble.
    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Replaces the history.
    #[must_use]
    pub fn with_history(mut self, history: impl Into<History>) -> Self {
        self.history = history.into();
        self
    }

    /// Replaces the tool set.
    #[must_use]
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    /// Replaces the tool-usage policy.
    #[must_use]
    pub fn with_tool_usage(mut self, tool_usage: ToolUsage) -> Self {
        self.tool_usage = tool_usage;
        self
    }

    /// Sets the token ceiling.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Checks tool-name uniqueness and that a forced tool is present.
    pub fn validate(&self) -> Result<(), LlmError> {
        let mut names = HashSet::with_capacity(self.tools.len());
        for tool in &self.tools {
            if !names.insert(tool.name.as_str()) {
                return Err(LlmError::InvalidRequest(format!(
                    "duplicate tool name '{}'",
                    tool.name
                )));
            }
        }
        if let ToolUsage::Forced(name) = &self.tool_usage {
            if !names.contains(name.as_str()) {
                return Err(LlmError::InvalidRequest(format!(
                    "forced tool '{name}' is not among the request's tools"
                )));
            }
        }
        Ok(())
    }
}

/// The messages a model emitted for one request.
///
/// Tool calls are not stored separately; [`tool_calls`](Self::tool_calls)
/// derives them from `messages` in emission order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Messages in emission order.
    pub messages: Vec<ChatMessage>,
}

impl ChatResponse {
    /// Creates a response from messages.
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }

    /// Appends a message.
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// The tool calls in this response, in emission order.
    pub fn tool_calls(&self) -> impl Iterator<Item = &ToolCall> {
        self.messages.iter().filter_map(ChatMessage::as_tool_call)
    }

    /// Whether the model asked for any tool.
    pub fn has_tool_calls(&self) -> bool {
        self.messages.iter().any(ChatMessage::is_tool_call)
    }

    /// Text of the last assistant text message, if any.
    pub fn text(&self) -> Option<&str> {
        self.messages.iter().rev().find_map(|m| match m {
            ChatMessage::Assistant { content } => Some(content.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn def(name: &str) -> ToolDefinition {
        ToolDefinition {
            name: name.into(),
            description: format!("{name} tool"),
            input_schema: JsonSchema::new(json!({"type": "object"})),
            output_schema: None,
        }
    }

    #[test]
    fn test_request_builders_do_not_touch_original() {
        let original = ChatRequest::new(vec![ChatMessage::user("hi")])
            .with_system("be brief")
            .with_max_tokens(256);
        let derived = original
            .clone()
            .with_tools(vec![def("calculator")])
            .with_tool_usage(ToolUsage::forced("calculator"));

        assert!(original.tools.is_empty());
        assert_eq!(original.tool_usage, ToolUsage::Auto);
        assert_eq!(derived.tools.len(), 1);
        assert_eq!(derived.system.as_deref(), Some("be brief"));
        assert_eq!(derived.max_tokens, Some(256));
    }

    #[test]
    fn test_validate_accepts_forced_present() {
        let request = ChatRequest::default()
            .with_tools(vec![def("a"), def("b")])
            .with_tool_usage(ToolUsage::forced("b"));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_forced_tool() {
        let request = ChatRequest::default()
            .with_tools(vec![def("a")])
            .with_tool_usage(ToolUsage::forced("formatter"));
        let err = request.validate().unwrap_err();
        assert!(matches!(err, LlmError::InvalidRequest(ref m) if m.contains("formatter")));
    }

    #[test]
    fn test_validate_rejects_duplicate_names() {
        let request = ChatRequest::default().with_tools(vec![def("a"), def("a")]);
        assert!(matches!(
            request.validate(),
            Err(LlmError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_response_tool_calls_in_emission_order() {
        let response = ChatResponse::new(vec![
            ChatMessage::assistant("let me check"),
            ChatMessage::tool_call(ToolCall::new("tc_1", "a", json!({}))),
            ChatMessage::tool_call(ToolCall::new("tc_2", "b", json!({}))),
        ]);
        let ids: Vec<_> = response.tool_calls().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["tc_1", "tc_2"]);
        assert!(response.has_tool_calls());
        assert_eq!(response.text(), Some("let me check"));
    }

    #[test]
    fn test_tool_usage_serde() {
        let forced = serde_json::to_value(ToolUsage::forced("formatter")).unwrap();
        assert_eq!(forced, json!({"type": "forced", "tool": "formatter"}));
        let auto = serde_json::to_value(ToolUsage::Auto).unwrap();
        assert_eq!(auto, json!({"type": "auto"}));
    }

    #[cfg(feature = "schema")]
    #[test]
    fn test_schema_from_type() {
        #[derive(schemars::JsonSchema)]
        #[allow(dead_code)]
        struct Booking {
            city: String,
            nights: u32,
        }
        let schema = JsonSchema::from_type::<Booking>().unwrap();
        assert!(schema.as_value()["properties"]["city"].is_object());
    }

    #[test]
    fn test_provider_is_object_safe() {
        let f: fn(&dyn DynProvider) = |_| {};
        let _ = f;
    }
}
