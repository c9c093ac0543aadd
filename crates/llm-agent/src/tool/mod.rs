//! Tools: contract, toolbox, and self-correcting dispatch.
//!
//! # Architecture
//!
//! ```text
//!   ToolHandler     defines one tool (definition + run fn)
//!       │
//!   Toolbox         immutable, name-keyed set of handlers
//!       │
//!   Dispatcher      runs one call: retry, backoff, ask the model to fix args
//!       │
//!   Agent           automates the generate → dispatch → feedback cycle
//! ```
//!
//! # Example
//!
//! ```rust
//! use llm_agent::tool::{tool_fn, ToolError, Toolbox};
//! use llm_agent::{JsonSchema, ToolDefinition};
//! use serde_json::{json, Value};
//!
//! let divide = tool_fn(
//!     ToolDefinition {
//!         name: "divide".into(),
//!         description: "Divide a by b".into(),
//!         input_schema: JsonSchema::new(json!({
//!             "type": "object",
//!             "properties": {
//!                 "a": {"type": "number"},
//!                 "b": {"type": "number"}
//!             },
//!             "required": ["a", "b"]
//!         })),
//!         output_schema: None,
//!     },
//!     |input: Value| async move {
//!         let b = input["b"].as_f64().unwrap_or(0.0);
//!         if b == 0.0 {
//!             return Err(ToolError::new("b must not be zero"));
//!         }
//!         Ok(json!(input["a"].as_f64().unwrap_or(0.0) / b))
//!     },
//! );
//!
//! let toolbox = Toolbox::builder().tool(divide).build().unwrap();
//! assert_eq!(toolbox.definitions()[0].name, "divide");
//! ```

mod config;
mod correction;
pub(crate) mod dispatch;
mod error;
pub(crate) mod execution;
mod handler;
mod helpers;
mod toolbox;


pub use config::RetryConfig;
pub use correction::correction_prompt;
pub use error::ToolError;
pub use handler::{FnToolHandler, ToolFuture, ToolHandler};
pub use helpers::tool_fn;
#[cfg(feature = "schema")]
pub use helpers::{TypedTool, TypedToolBuilder, typed_tool};
pub use toolbox::{Toolbox, ToolboxBuilder};
