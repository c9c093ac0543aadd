//! Self-correction of failed tool arguments.
//!
//! When a tool fails, the model is shown what it sent and what went wrong,
//! and is forced through a [`StructuredOutput`] wrapper whose schema is the
//! tool's own input schema. Whatever comes back is the next set of
//! arguments to try.

use std::sync::Arc;

use serde_json::Value;

use crate::chat::{ChatMessage, ToolCall};
use crate::error::LlmError;
use crate::provider::{ChatRequest, DynProvider, ToolDefinition};
use crate::structured::StructuredOutput;

/// Builds the user message that asks for corrected arguments.
///
/// Names the tool, quotes the error verbatim, and shows the failed
/// arguments pretty-printed.
pub fn correction_prompt(call: &ToolCall, error: &str) -> String {
    let arguments = serde_json::to_string_pretty(&call.arguments)
        .unwrap_or_else(|_| call.arguments.to_string());
    format!(
        "The call to tool `{name}` failed.\n\
         \n\
         Error:\n\
         {error}\n\
         \n\
         Arguments that were sent:\n\
         {arguments}\n\
         \n\
         Reply with corrected arguments for `{name}`. They must satisfy the \
         tool's input schema and avoid the error above.",
        name = call.name,
    )
}

/// Asks `provider` for a corrected version of `call`'s arguments.
///
/// The request carries only the correction prompt, not the surrounding
/// conversation. Any failure is wrapped in [`LlmError::Correction`].
pub(crate) async fn request_correction(
    provider: &Arc<dyn DynProvider>,
    definition: &ToolDefinition,
    call: &ToolCall,
    error: &str,
) -> Result<Value, LlmError> {
    let wrapper = StructuredOutput::new(definition.input_schema.clone(), Arc::clone(provider));
    let request = ChatRequest::new(vec![ChatMessage::user(correction_prompt(call, error))]);
    wrapper
        .extract(&request)
        .await
        .map_err(|source| LlmError::Correction {
            tool_name: call.name.clone(),
            source: Box::new(source),
        })
}
