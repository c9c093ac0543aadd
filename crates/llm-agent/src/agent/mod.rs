//! The tool-calling agent loop.
//!
//! An [`Agent`] pairs a model with a [`Toolbox`] and drives the
//! conversation until the model answers without calling a tool:
//!
//! ```text
//!        ┌──────────────────────────────────────────────┐
//!        ▼                                              │
//!   AwaitingModel ── no tool calls ──► Done             │
//!        │                                              │
//!        └── tool calls ──► Dispatching ── results ─────┘
//!                            (retry + self-correction per call)
//! ```
//!
//! Each turn sends the caller's history followed by everything emitted so
//! far, with the toolbox's definitions and [`ToolUsage::Auto`]. Model
//! failures end the run immediately; tool failures are answered with a
//! tool error message and the conversation goes on.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use llm_agent::tool::{tool_fn, Toolbox};
//! use llm_agent::{Agent, ChatMessage, ChatRequest, DynProvider, JsonSchema, ToolDefinition};
//! use serde_json::{json, Value};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example(model: Arc<dyn DynProvider>) -> Result<(), llm_agent::LlmError> {
//! let toolbox = Toolbox::builder()
//!     .tool(tool_fn(
//!         ToolDefinition {
//!             name: "add".into(),
//!             description: "Add two numbers".into(),
//!             input_schema: JsonSchema::new(json!({
//!                 "type": "object",
//!                 "properties": { "a": {"type": "number"}, "b": {"type": "number"} },
//!                 "required": ["a", "b"]
//!             })),
//!             output_schema: None,
//!         },
//!         |input: Value| async move {
//!             let sum = input["a"].as_f64().unwrap_or(0.0) + input["b"].as_f64().unwrap_or(0.0);
//!             Ok(json!({ "result": sum }))
//!         },
//!     ))
//!     .build()?;
//!
//! let agent = Agent::new(model, toolbox);
//! let request = ChatRequest::new(vec![ChatMessage::user("What is 15 + 27?")]);
//! let run = agent.run(&request, &CancellationToken::new()).await?;
//! println!("{:?} after {} turns", run.response.text(), run.turns);
//! # Ok(())
//! # }
//! ```

mod config;


use std::borrow::Cow;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::chat::{ChatMessage, History, ToolCall};
use crate::error::LlmError;
use crate::provider::{ChatRequest, ChatResponse, DynProvider, Provider, ProviderMetadata, ToolUsage};
use crate::tool::Toolbox;
use crate::tool::dispatch::Dispatcher;
use crate::tool::execution::execute_calls;

pub use config::AgentConfig;

/// A model plus a toolbox, run until the model stops calling tools.
#[derive(Clone)]
pub struct Agent {
    provider: Arc<dyn DynProvider>,
    toolbox: Toolbox,
    config: AgentConfig,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("provider", &self.provider.metadata())
            .field("toolbox", &self.toolbox)
            .field("config", &self.config)
            .finish()
    }
}

/// The outcome of [`Agent::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct AgentRun {
    /// The caller's history followed by every message emitted during the
    /// run, in emission order.
    pub history: History,
    /// Every message emitted during the run: model output and tool
    /// results/errors, in emission order.
    pub response: ChatResponse,
    /// How many times the model was invoked.
    pub turns: u32,
}

impl Agent {
    /// Creates an agent with [`AgentConfig::default`].
    pub fn new(provider: Arc<dyn DynProvider>, toolbox: Toolbox) -> Self {
        Self {
            provider,
            toolbox,
            config: AgentConfig::default(),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    /// The agent's tools.
    pub fn toolbox(&self) -> &Toolbox {
        &self.toolbox
    }

    /// The agent's configuration.
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Runs the conversation to completion and returns the emitted
    /// messages.
    ///
    /// If the model calls no tool on the first turn, the result is that
    /// turn's response, unchanged.
    pub async fn invoke(
        &self,
        request: &ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<ChatResponse, LlmError> {
        self.run(request, cancel).await.map(|run| run.response)
    }

    /// Runs the conversation to completion.
    ///
    /// # Errors
    ///
    /// - any model-invocation error, as returned by the provider
    /// - [`LlmError::InvalidRequest`] if the configuration fails
    ///   [`AgentConfig::validate`] or the caller's history answers a tool
    ///   call it does not contain
    /// - [`LlmError::MaxTurnsExceeded`] if the model is still calling
    ///   tools when the turn ceiling is reached
    /// - [`LlmError::Cancelled`] once `cancel` fires
    #[instrument(skip_all, fields(model = %self.provider.metadata().model))]
    pub async fn run(
        &self,
        request: &ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<AgentRun, LlmError> {
        self.config.validate()?;
        request.history.validate_correlation()?;

        let dispatcher = Dispatcher {
            provider: &self.provider,
            toolbox: &self.toolbox,
            retry: &self.config.retry,
            cancel,
        };
        let mut emitted: Vec<ChatMessage> = Vec::new();
        let mut turns: u32 = 0;

        loop {
            if let Some(limit) = self.config.max_turns {
                if turns >= limit {
                    tracing::warn!(limit, "turn ceiling reached while the model is still calling tools");
                    return Err(LlmError::MaxTurnsExceeded { limit });
                }
            }
            if cancel.is_cancelled() {
                return Err(LlmError::Cancelled);
            }
            turns += 1;

            let turn_request = self.turn_request(request, &emitted);
            tracing::debug!(turn = turns, messages = turn_request.history.len(), "invoking model");

            let response = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(LlmError::Cancelled),
                r = self.provider.generate_boxed(&turn_request) => r?,
            };

            let calls: Vec<ToolCall> = response.tool_calls().cloned().collect();
            emitted.extend(response.messages);
            if calls.is_empty() {
                tracing::debug!(turn = turns, "model answered without tool calls");
                break;
            }

            tracing::debug!(turn = turns, calls = calls.len(), "dispatching tool calls");
            let answers =
                execute_calls(&dispatcher, calls, self.config.parallel_tool_execution).await?;
            emitted.extend(answers);
        }

        Ok(AgentRun {
            history: request.history.concat(&emitted),
            response: ChatResponse::new(emitted),
            turns,
        })
    }

    /// Runs a single tool call outside the loop, with the agent's retry
    /// and self-correction.
    ///
    /// Unlike the loop, failures are returned as errors: `ToolNotFound`,
    /// `RetryExhausted`, or `Cancelled`.
    pub async fn call_tool(
        &self,
        call: &ToolCall,
        cancel: &CancellationToken,
    ) -> Result<ChatMessage, LlmError> {
        let dispatcher = Dispatcher {
            provider: &self.provider,
            toolbox: &self.toolbox,
            retry: &self.config.retry,
            cancel,
        };
        dispatcher.run_with_retry(call).await
    }

    /// The caller's request with the accumulated history, the toolbox,
    /// and free tool choice. System preamble and generation parameters
    /// carry over.
    fn turn_request(&self, request: &ChatRequest, emitted: &[ChatMessage]) -> ChatRequest {
        request
            .clone()
            .with_history(request.history.concat(emitted))
            .with_tools(self.toolbox.definitions().to_vec())
            .with_tool_usage(ToolUsage::Auto)
    }
}

impl Provider for Agent {
    async fn generate(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        self.invoke(request, &CancellationToken::new()).await
    }

    fn metadata(&self) -> ProviderMetadata {
        let inner = self.provider.metadata();
        ProviderMetadata {
            name: Cow::Owned(format!("{}+agent", inner.name)),
            model: inner.model,
        }
    }
}
