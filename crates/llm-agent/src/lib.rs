//! # llm-agent
//!
//! Provider-agnostic orchestration of tool-calling language models.
//!
//! The crate sits between application code and a model transport. It
//! contains no transport of its own: anything that implements
//! [`Provider`] (or its object-safe counterpart [`DynProvider`]) can be
//! driven by it.
//!
//! # Architecture
//!
//! ```text
//!   application
//!       │
//!       ├──► Agent ───────────► model (Provider)
//!       │      │  tool calls
//!       │      ▼
//!       │   Toolbox ── failure ──► StructuredOutput(tool input schema)
//!       │                                   │  corrected arguments
//!       │                                   ▼
//!       │                              model (Provider)
//!       │
//!       └──► Invoker ─► StructuredOutput(target schema) ─► model
//! ```
//!
//! - [`Agent`] loops model turns and tool dispatch until the model answers
//!   without calling a tool. Failed tool calls are retried with backoff,
//!   and before each retry the model is asked to correct its arguments.
//! - [`StructuredOutput`] forces the model to call a single synthetic tool
//!   and hands back that call's arguments as the structured result.
//! - [`Invoker`] is the one-shot form: history in, structured value out.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use llm_agent::{ChatMessage, DynProvider, Invoker, JsonSchema};
//! use serde_json::json;
//!
//! # async fn example(model: Arc<dyn DynProvider>) -> Result<(), llm_agent::LlmError> {
//! let schema = JsonSchema::new(json!({
//!     "type": "object",
//!     "properties": { "answer": { "type": "integer" } },
//!     "required": ["answer"]
//! }));
//! let invoker = Invoker::new(schema, model);
//! let value = invoker.invoke(vec![ChatMessage::user("What is 6 x 7?")]).await?;
//! assert!(value["answer"].is_number());
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`agent`] | The tool-calling loop and its configuration |
//! | [`chat`] | Messages, tool calls, and append-only history |
//! | [`error`] | Unified [`LlmError`] |
//! | [`invoker`] | One-shot structured invocation |
//! | [`provider`] | The [`Provider`] trait, requests, and responses |
//! | [`structured`] | The forced single-tool structured-output wrapper |
//! | [`tool`] | Tool contract, toolbox, retry policy |

#![warn(missing_docs)]

pub mod agent;
pub mod chat;
pub mod error;
pub mod invoker;
pub mod provider;
pub mod structured;
pub mod tool;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_helpers;

// ── Core re-exports ────────────────────────────────────────────────
//
//   llm_agent::tool::*        tool helpers, typed tools, correction prompt
//   llm_agent::chat::*        ChatRole, MessageKind
//   llm_agent::mock::*        MockProvider (test-utils feature)

pub use agent::{Agent, AgentConfig, AgentRun};
pub use chat::{ChatMessage, History, ToolCall};
pub use error::LlmError;
pub use invoker::Invoker;
pub use provider::{
    ChatRequest, ChatResponse, DynProvider, JsonSchema, Provider, ProviderMetadata,
    ToolDefinition, ToolUsage,
};
pub use structured::StructuredOutput;
pub use tool::{RetryConfig, ToolError, ToolHandler, Toolbox};
