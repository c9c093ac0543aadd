//! Helper constructors for tool handlers.

use std::future::Future;
#[cfg(feature = "schema")]
use std::marker::PhantomData;

use serde_json::Value;

use super::{FnToolHandler, ToolError};
use crate::provider::ToolDefinition;
#[cfg(feature = "schema")]
use super::{ToolFuture, ToolHandler};
#[cfg(feature = "schema")]
use crate::error::LlmError;
#[cfg(feature = "schema")]
use crate::provider::JsonSchema;

/// Creates a [`ToolHandler`](super::ToolHandler) from a closure over raw
/// JSON arguments.
///
/// The closure may return anything convertible into a
/// [`serde_json::Value`] (`String`, `Value`, numbers, ...).
///
/// # Example
///
/// ```rust
/// use llm_agent::tool::tool_fn;
/// use llm_agent::{JsonSchema, ToolDefinition};
/// use serde_json::{json, Value};
///
/// let handler = tool_fn(
///     ToolDefinition {
///         name: "add".into(),
///         description: "Add two numbers".into(),
///         input_schema: JsonSchema::new(json!({
///             "type": "object",
///             "properties": {
///                 "a": { "type": "number" },
///                 "b": { "type": "number" }
///             },
///             "required": ["a", "b"]
///         })),
///         output_schema: None,
///     },
///     |input: Value| async move {
///         let a = input["a"].as_f64().unwrap_or(0.0);
///         let b = input["b"].as_f64().unwrap_or(0.0);
///         Ok(json!({ "result": a + b }))
///     },
/// );
/// ```
pub fn tool_fn<F, Fut, O>(definition: ToolDefinition, handler: F) -> FnToolHandler<F>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, ToolError>> + Send + 'static,
    O: Into<Value> + Send + 'static,
{
    FnToolHandler {
        definition,
        handler,
    }
}

/// Creates a tool whose input and output are Rust types.
///
/// Schemas are generated from `I` and `O`. Arguments that do not
/// deserialize into `I` fail the call with a [`ToolError`] describing the
/// mismatch, which the agent feeds back to the model for correction.
///
/// ```rust
/// use llm_agent::tool::{typed_tool, ToolError};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Deserialize, schemars::JsonSchema)]
/// struct Greet { name: String }
///
/// #[derive(Serialize, schemars::JsonSchema)]
/// struct Greeting { text: String }
///
/// let tool = typed_tool("greet", "Greets someone by name", |input: Greet| async move {
///     Ok::<_, ToolError>(Greeting { text: format!("Hello {}", input.name) })
/// });
/// ```
#[cfg(feature = "schema")]
pub fn typed_tool<I, O, F, Fut>(
    name: impl Into<String>,
    description: impl Into<String>,
    runner: F,
) -> TypedTool<I, O, F>
where
    I: serde::de::DeserializeOwned + schemars::JsonSchema + Send + 'static,
    O: serde::Serialize + schemars::JsonSchema + Send + 'static,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, ToolError>> + Send + 'static,
{
    TypedTool {
        definition: ToolDefinition {
            name: name.into(),
            description: description.into(),
            input_schema: schema_of::<I>(),
            output_schema: Some(schema_of::<O>()),
        },
        runner,
        _types: PhantomData,
    }
}

#[cfg(feature = "schema")]
fn schema_of<T: schemars::JsonSchema>() -> JsonSchema {
    JsonSchema::from_type::<T>().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "schema generation failed, falling back to open object");
        JsonSchema::new(serde_json::json!({ "type": "object" }))
    })
}

/// A tool over typed input `I` and output `O`.
///
/// Created via [`typed_tool`] or [`TypedToolBuilder`].
#[cfg(feature = "schema")]
pub struct TypedTool<I, O, F> {
    definition: ToolDefinition,
    runner: F,
    _types: PhantomData<fn(I) -> O>,
}

#[cfg(feature = "schema")]
impl<I, O, F> std::fmt::Debug for TypedTool<I, O, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedTool")
            .field("name", &self.definition.name)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "schema")]
impl<I, O, F, Fut> ToolHandler for TypedTool<I, O, F>
where
    I: serde::de::DeserializeOwned + Send + 'static,
    O: serde::Serialize + Send + 'static,
    F: Fn(I) -> Fut + Send + Sync,
    Fut: Future<Output = Result<O, ToolError>> + Send + 'static,
{
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    fn run(&self, arguments: Value) -> ToolFuture<'_> {
        let input: I = match serde_json::from_value(arguments) {
            Ok(input) => input,
            Err(e) => {
                let err = ToolError::new(format!("invalid arguments: {e}"));
                return Box::pin(async move { Err(err) });
            }
        };
        let fut = (self.runner)(input);
        Box::pin(async move {
            let output = fut.await?;
            serde_json::to_value(output).map_err(ToolError::from)
        })
    }
}

/// Step-by-step construction of a [`TypedTool`].
///
/// The runner is required by the type system; name and description are
/// checked by [`build`](Self::build).
///
/// ```rust
/// use llm_agent::tool::{ToolError, TypedToolBuilder};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Deserialize, schemars::JsonSchema)]
/// struct Query { city: String }
///
/// #[derive(Serialize, schemars::JsonSchema)]
/// struct Forecast { celsius: f64 }
///
/// let tool = TypedToolBuilder::<Query, Forecast>::new()
///     .name("forecast")
///     .description("Tomorrow's temperature for a city")
///     .runner(|_q: Query| async { Ok::<_, ToolError>(Forecast { celsius: 21.5 }) })
///     .build()
///     .unwrap();
/// ```
#[cfg(feature = "schema")]
pub struct TypedToolBuilder<I, O, F = ()> {
    name: Option<String>,
    description: Option<String>,
    runner: F,
    _types: PhantomData<fn(I) -> O>,
}

#[cfg(feature = "schema")]
impl<I, O> TypedToolBuilder<I, O> {
    /// Starts an empty builder.
    pub fn new() -> Self {
        Self {
            name: None,
            description: None,
            runner: (),
            _types: PhantomData,
        }
    }
}

#[cfg(feature = "schema")]
impl<I, O> Default for TypedToolBuilder<I, O> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "schema")]
impl<I, O, F> TypedToolBuilder<I, O, F> {
    /// Sets the tool name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the tool description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the function that runs the tool.
    pub fn runner<G>(self, runner: G) -> TypedToolBuilder<I, O, G> {
        TypedToolBuilder {
            name: self.name,
            description: self.description,
            runner,
            _types: PhantomData,
        }
    }
}

#[cfg(feature = "schema")]
impl<I, O, F, Fut> TypedToolBuilder<I, O, F>
where
    I: serde::de::DeserializeOwned + schemars::JsonSchema + Send + 'static,
    O: serde::Serialize + schemars::JsonSchema + Send + 'static,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, ToolError>> + Send + 'static,
{
    /// Builds the tool, failing if the name or description is missing.
    pub fn build(self) -> Result<TypedTool<I, O, F>, LlmError> {
        let name = self
            .name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| LlmError::InvalidRequest("tool name is required".into()))?;
        let description = self
            .description
            .filter(|d| !d.is_empty())
            .ok_or_else(|| LlmError::InvalidRequest("tool description is required".into()))?;
        Ok(typed_tool(name, description, self.runner))
    }
}
