//! Name-keyed, read-only set of tool handlers.

use std::collections::HashMap;
use std::sync::Arc;

use super::ToolHandler;
use crate::error::LlmError;
use crate::provider::ToolDefinition;

/// The immutable set of tools available to one agent.
///
/// Tools are keyed by [`ToolDefinition::name`]; duplicate names are
/// rejected when the toolbox is built. Once built, a toolbox cannot be
/// changed. Cloning is cheap (it clones `Arc`s).
///
/// ```rust
/// use llm_agent::tool::{tool_fn, Toolbox};
/// use llm_agent::{JsonSchema, ToolDefinition};
/// use serde_json::{json, Value};
///
/// let echo = tool_fn(
///     ToolDefinition {
///         name: "echo".into(),
///         description: "Echo the input".into(),
///         input_schema: JsonSchema::new(json!({"type": "object"})),
///         output_schema: None,
///     },
///     |input: Value| async move { Ok(input) },
/// );
///
/// let toolbox = Toolbox::builder().tool(echo).build().unwrap();
/// assert!(toolbox.contains("echo"));
/// ```
#[derive(Clone, Default)]
pub struct Toolbox {
    handlers: Vec<Arc<dyn ToolHandler>>,
    definitions: Vec<ToolDefinition>,
    index: HashMap<String, usize>,
}

impl std::fmt::Debug for Toolbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Toolbox")
            .field(
                "tools",
                &self.definitions.iter().map(|d| &d.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Toolbox {
    /// Starts building a toolbox.
    pub fn builder() -> ToolboxBuilder {
        ToolboxBuilder::default()
    }

    /// Builds a toolbox from shared handlers, rejecting duplicate names.
    pub fn from_handlers(
        handlers: impl IntoIterator<Item = Arc<dyn ToolHandler>>,
    ) -> Result<Self, LlmError> {
        let mut toolbox = Self::default();
        for handler in handlers {
            let definition = handler.definition();
            if toolbox.index.contains_key(&definition.name) {
                return Err(LlmError::InvalidRequest(format!(
                    "duplicate tool name '{}'",
                    definition.name
                )));
            }
            toolbox
                .index
                .insert(definition.name.clone(), toolbox.handlers.len());
            toolbox.handlers.push(handler);
            toolbox.definitions.push(definition);
        }
        Ok(toolbox)
    }

    /// Looks up a handler by name.
    pub fn get(&self, name: &str) -> Result<&Arc<dyn ToolHandler>, LlmError> {
        self.index
            .get(name)
            .map(|&i| &self.handlers[i])
            .ok_or_else(|| LlmError::ToolNotFound {
                name: name.to_owned(),
            })
    }

    /// Returns whether a tool with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Definitions of all tools, in registration order.
    ///
    /// This is what the agent places on each request.
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Number of tools.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the toolbox has no tools.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Collects handlers for a [`Toolbox`].
#[derive(Default)]
pub struct ToolboxBuilder {
    handlers: Vec<Arc<dyn ToolHandler>>,
}

impl ToolboxBuilder {
    /// Adds a handler.
    #[must_use]
    pub fn tool(mut self, handler: impl ToolHandler + 'static) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    /// Adds a shared handler.
    #[must_use]
    pub fn shared(mut self, handler: Arc<dyn ToolHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Builds the toolbox, failing on duplicate tool names.
    pub fn build(self) -> Result<Toolbox, LlmError> {
        Toolbox::from_handlers(self.handlers)
    }
}
