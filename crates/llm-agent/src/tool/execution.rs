//! Executing all tool calls of one model turn.

use futures::{StreamExt, stream};

use super::dispatch::Dispatcher;
use crate::chat::{ChatMessage, ToolCall};
use crate::error::LlmError;

/// Dispatches `calls` and returns one answering message per call, in call
/// order.
///
/// Sequential mode (`then`) finishes each call before starting the next.
/// Parallel mode (`buffered`) runs up to all calls at once but still
/// yields results in call order. Cancellation of any call aborts the turn.
pub(crate) async fn execute_calls(
    dispatcher: &Dispatcher<'_>,
    calls: Vec<ToolCall>,
    parallel: bool,
) -> Result<Vec<ChatMessage>, LlmError> {
    if calls.is_empty() {
        return Ok(Vec::new());
    }

    let call_count = calls.len();
    let outcomes: Vec<Result<ChatMessage, LlmError>> = if parallel {
        stream::iter(calls)
            .map(move |call| dispatcher.dispatch(call))
            .buffered(call_count)
            .collect()
            .await
    } else {
        stream::iter(calls)
            .then(move |call| dispatcher.dispatch(call))
            .collect()
            .await
    };

    outcomes.into_iter().collect()
}
