//! Structured output through a forced single tool.
//!
//! Many models only emit free text or tool calls. [`StructuredOutput`]
//! gets schema-shaped data out of them anyway: it offers the model exactly
//! one synthetic tool whose input schema is the target schema, forces the
//! model to call it, and returns the call's arguments as the result.
//!
//! ```text
//!   caller request ──► StructuredOutput ──► forced request
//!                                             tools      = [formatter(schema)]
//!                                             tool_usage = Forced("formatter")
//!                                                   │
//!                                                   ▼
//!                                            underlying provider
//!                                                   │
//!                           first ToolCall ◄────────┘
//!                                 │  (identity run)
//!                                 ▼
//!                 ChatResponse[Assistant(payload as JSON text)]
//! ```
//!
//! The wrapper is itself a [`Provider`], so it can stand wherever a model
//! can, including as the model of an [`Agent`](crate::Agent) or under
//! another wrapper. It is also a [`ToolHandler`] with an identity `run`.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use llm_agent::{ChatMessage, ChatRequest, DynProvider, JsonSchema, StructuredOutput};
//! use serde_json::json;
//!
//! # async fn example(model: Arc<dyn DynProvider>) -> Result<(), llm_agent::LlmError> {
//! let schema = JsonSchema::new(json!({
//!     "type": "object",
//!     "properties": { "city": { "type": "string" } },
//!     "required": ["city"]
//! }));
//! let wrapper = StructuredOutput::new(schema, model);
//!
//! let request = ChatRequest::new(vec![ChatMessage::user("Where is the Eiffel Tower?")]);
//! let payload = wrapper.extract(&request).await?;
//! println!("{}", payload["city"]);
//! # Ok(())
//! # }
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use serde_json::Value;

use crate::chat::ChatMessage;
use crate::error::LlmError;
use crate::provider::{
    ChatRequest, ChatResponse, DynProvider, JsonSchema, Provider, ProviderMetadata,
    ToolDefinition, ToolUsage,
};
use crate::tool::{ToolFuture, ToolHandler};

/// Default name of the synthetic tool.
pub const DEFAULT_FORMATTER_NAME: &str = "formatter";

/// Default description of the synthetic tool.
pub const DEFAULT_FORMATTER_DESCRIPTION: &str = "Must be called to provide structured output";

/// A provider façade that forces every call through one synthetic tool
/// and yields that tool's arguments.
#[derive(Clone)]
pub struct StructuredOutput {
    name: String,
    description: String,
    schema: JsonSchema,
    inner: Arc<dyn DynProvider>,
}

impl std::fmt::Debug for StructuredOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StructuredOutput")
            .field("name", &self.name)
            .field("inner", &self.inner.metadata())
            .finish_non_exhaustive()
    }
}

impl StructuredOutput {
    /// Wraps `inner` so that it produces values matching `schema`.
    pub fn new(schema: JsonSchema, inner: Arc<dyn DynProvider>) -> Self {
        Self {
            name: DEFAULT_FORMATTER_NAME.to_owned(),
            description: DEFAULT_FORMATTER_DESCRIPTION.to_owned(),
            schema,
            inner,
        }
    }

    /// Wraps `inner` with a schema derived from `T`.
    #[cfg(feature = "schema")]
    pub fn for_type<T: schemars::JsonSchema>(
        inner: Arc<dyn DynProvider>,
    ) -> Result<Self, LlmError> {
        let schema = JsonSchema::from_type::<T>()
            .map_err(|e| LlmError::InvalidRequest(format!("failed to derive JSON schema: {e}")))?;
        Ok(Self::new(schema, inner))
    }

    /// Renames the synthetic tool.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Changes the synthetic tool's description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Name of the synthetic tool.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The target schema.
    pub fn schema(&self) -> &JsonSchema {
        &self.schema
    }

    /// Builds the forced request: the caller's history and generation
    /// parameters, with the caller's tools and policy discarded.
    pub fn forced_request(&self, request: &ChatRequest) -> ChatRequest {
        request
            .clone()
            .with_tools(vec![self.tool_definition()])
            .with_tool_usage(ToolUsage::Forced(self.name.clone()))
    }

    /// Runs the forced round trip and returns the raw payload.
    ///
    /// Fails with [`LlmError::NoForcedCallProduced`] when the response has
    /// no tool call. Only the first call is honored; extra calls are
    /// dropped with a warning.
    pub async fn extract(&self, request: &ChatRequest) -> Result<Value, LlmError> {
        let forced = self.forced_request(request);
        let response = self.inner.generate_boxed(&forced).await?;

        let mut calls = response.tool_calls();
        let Some(call) = calls.next() else {
            return Err(LlmError::NoForcedCallProduced {
                tool_name: self.name.clone(),
            });
        };
        let extra = calls.count();
        if extra > 0 {
            tracing::warn!(
                tool = %self.name,
                discarded = extra,
                "forced response carried extra tool calls; keeping the first"
            );
        }
        if call.name != self.name {
            tracing::warn!(
                expected = %self.name,
                actual = %call.name,
                "forced response called a different tool name"
            );
        }

        self.run(call.arguments.clone())
            .await
            .map_err(|e| LlmError::ResponseFormat {
                message: e.message,
                raw: call.arguments.to_string(),
            })
    }

    fn tool_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.schema.clone(),
            output_schema: Some(self.schema.clone()),
        }
    }
}

impl ToolHandler for StructuredOutput {
    fn definition(&self) -> ToolDefinition {
        self.tool_definition()
    }

    fn run(&self, arguments: Value) -> ToolFuture<'_> {
        Box::pin(async move { Ok(arguments) })
    }
}

impl Provider for StructuredOutput {
    async fn generate(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let payload = self.extract(request).await?;
        let content = serde_json::to_string(&payload)?;
        Ok(ChatResponse::new(vec![ChatMessage::assistant(content)]))
    }

    fn metadata(&self) -> ProviderMetadata {
        let inner = self.inner.metadata();
        ProviderMetadata {
            name: Cow::Owned(format!("{}+{}", inner.name, self.name)),
            model: inner.model,
        }
    }
}
