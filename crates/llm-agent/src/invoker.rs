//! One-shot structured invocation.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::chat::History;
use crate::error::LlmError;
use crate::provider::{ChatRequest, DynProvider, JsonSchema};
use crate::structured::StructuredOutput;

/// Turns a conversation into one schema-shaped value with a single
/// forced model call.
///
/// There is no loop and no retry. Callers that need self-correction
/// should run an [`Agent`](crate::Agent) with a one-tool toolbox instead.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use llm_agent::{ChatMessage, DynProvider, Invoker};
/// use serde::Deserialize;
///
/// #[derive(Deserialize, schemars::JsonSchema)]
/// struct Sentiment { score: f32 }
///
/// # async fn example(model: Arc<dyn DynProvider>) -> Result<(), llm_agent::LlmError> {
/// let invoker = Invoker::for_type::<Sentiment>(model)?;
/// let sentiment: Sentiment = invoker
///     .invoke_as(vec![ChatMessage::user("Rate: 'what a lovely day'")])
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Invoker {
    wrapper: StructuredOutput,
}

impl Invoker {
    /// Creates an invoker producing values that match `schema`.
    pub fn new(schema: JsonSchema, model: Arc<dyn DynProvider>) -> Self {
        Self::from_wrapper(StructuredOutput::new(schema, model))
    }

    /// Creates an invoker with a schema derived from `T`.
    #[cfg(feature = "schema")]
    pub fn for_type<T: schemars::JsonSchema>(model: Arc<dyn DynProvider>) -> Result<Self, LlmError> {
        StructuredOutput::for_type::<T>(model).map(Self::from_wrapper)
    }

    /// Uses an already configured wrapper.
    pub fn from_wrapper(wrapper: StructuredOutput) -> Self {
        Self { wrapper }
    }

    /// The wrapper every call goes through.
    pub fn wrapper(&self) -> &StructuredOutput {
        &self.wrapper
    }

    /// Sends `history` as a bare request and returns the raw payload.
    pub async fn invoke(&self, history: impl Into<History>) -> Result<Value, LlmError> {
        let request = ChatRequest::new(history);
        self.wrapper.extract(&request).await
    }

    /// Like [`invoke`](Self::invoke), deserializing the payload into `T`.
    ///
    /// A payload that does not fit `T` fails with
    /// [`LlmError::ResponseFormat`] carrying the raw JSON.
    pub async fn invoke_as<T: DeserializeOwned>(
        &self,
        history: impl Into<History>,
    ) -> Result<T, LlmError> {
        let payload = self.invoke(history).await?;
        T::deserialize(&payload).map_err(|e| LlmError::ResponseFormat {
            message: format!("structured payload does not match the target type: {e}"),
            raw: payload.to_string(),
        })
    }
}
