//! Tool handler trait and closure-backed implementation.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use super::ToolError;
use crate::provider::ToolDefinition;

/// Boxed future returned by [`ToolHandler::run`].
pub type ToolFuture<'a> = Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send + 'a>>;

/// A capability the model can call.
///
/// The trait is object-safe (boxed futures) so handlers can be stored as
/// `Arc<dyn ToolHandler>` in a [`Toolbox`](super::Toolbox). For simple
/// tools use [`tool_fn`](super::tool_fn) or
/// [`typed_tool`](super::typed_tool) instead of implementing it by hand.
///
/// # Example
///
/// ```rust
/// use llm_agent::tool::{ToolError, ToolFuture, ToolHandler};
/// use llm_agent::{JsonSchema, ToolDefinition};
/// use serde_json::{json, Value};
///
/// struct Clock;
///
/// impl ToolHandler for Clock {
///     fn definition(&self) -> ToolDefinition {
///         ToolDefinition {
///             name: "now".into(),
///             description: "Current UNIX time in seconds".into(),
///             input_schema: JsonSchema::new(json!({"type": "object"})),
///             output_schema: None,
///         }
///     }
///
///     fn run(&self, _arguments: Value) -> ToolFuture<'_> {
///         Box::pin(async { Ok(json!({"seconds": 1_700_000_000})) })
///     }
/// }
/// ```
pub trait ToolHandler: Send + Sync {
    /// The tool's identity and schemas.
    fn definition(&self) -> ToolDefinition;

    /// Executes the tool with the model-supplied arguments.
    fn run(&self, arguments: Value) -> ToolFuture<'_>;
}

/// A tool handler backed by an async closure.
///
/// Created via [`super::tool_fn`].
pub struct FnToolHandler<F> {
    pub(crate) definition: ToolDefinition,
    pub(crate) handler: F,
}

impl<F> std::fmt::Debug for FnToolHandler<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnToolHandler")
            .field("name", &self.definition.name)
            .finish_non_exhaustive()
    }
}

impl<F, Fut, O> ToolHandler for FnToolHandler<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<O, ToolError>> + Send + 'static,
    O: Into<Value> + Send + 'static,
{
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    fn run(&self, arguments: Value) -> ToolFuture<'_> {
        let fut = (self.handler)(arguments);
        Box::pin(async move { fut.await.map(Into::into) })
    }
}
