//! Running one tool call with bounded retry and self-correction.

use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use super::config::RetryConfig;
use super::correction::request_correction;
use super::Toolbox;
use crate::chat::{ChatMessage, ToolCall};
use crate::error::LlmError;
use crate::provider::DynProvider;

/// Everything needed to run tool calls on behalf of one agent.
pub(crate) struct Dispatcher<'a> {
    pub provider: &'a Arc<dyn DynProvider>,
    pub toolbox: &'a Toolbox,
    pub retry: &'a RetryConfig,
    pub cancel: &'a CancellationToken,
}

impl Dispatcher<'_> {
    /// Runs `call` and returns the message to append to the conversation.
    ///
    /// Tool-level failures (unknown tool, exhausted retries) become a
    /// [`ChatMessage::ToolError`] answering the call as last attempted.
    /// Only cancellation is returned as `Err`.
    pub async fn dispatch(&self, mut call: ToolCall) -> Result<ChatMessage, LlmError> {
        match self.retry_loop(&mut call).await {
            Ok(result) => Ok(ChatMessage::tool_result(call, result)),
            Err(LlmError::Cancelled) => Err(LlmError::Cancelled),
            Err(error) => {
                tracing::warn!(tool = %call.name, call_id = %call.id, %error, "tool call failed");
                Ok(ChatMessage::tool_error(call, error.to_string()))
            }
        }
    }

    /// Runs `call` and returns its result message, or the failure as `Err`.
    pub async fn run_with_retry(&self, call: &ToolCall) -> Result<ChatMessage, LlmError> {
        let mut current = call.clone();
        let result = self.retry_loop(&mut current).await?;
        Ok(ChatMessage::tool_result(current, result))
    }

    /// The retry loop proper.
    ///
    /// Attempt 0 runs the model's arguments. Before each further attempt
    /// the dispatcher waits out the backoff and asks the model for
    /// corrected arguments; a failed correction leaves the arguments as
    /// they were. After `max_retries` retries the last tool error is
    /// returned inside [`LlmError::RetryExhausted`].
    ///
    /// `current` always holds the arguments of the latest attempt.
    #[instrument(skip_all, fields(tool = %current.name, call_id = %current.id))]
    async fn retry_loop(&self, current: &mut ToolCall) -> Result<Value, LlmError> {
        let handler = self.toolbox.get(&current.name)?;
        let definition = handler.definition();
        let mut attempt: u32 = 0;

        loop {
            if self.cancel.is_cancelled() {
                return Err(LlmError::Cancelled);
            }

            tracing::debug!(attempt, "running tool");
            let source = match handler.run(current.arguments.clone()).await {
                Ok(result) => return Ok(result),
                Err(source) => source,
            };

            if attempt >= self.retry.max_retries {
                tracing::warn!(attempts = attempt + 1, error = %source, "tool retries exhausted");
                return Err(LlmError::RetryExhausted {
                    attempts: attempt + 1,
                    last_error: Box::new(LlmError::ToolExecution {
                        tool_name: current.name.clone(),
                        source,
                    }),
                });
            }

            let wait = self.retry.backoff(attempt);
            tracing::debug!(attempt, error = %source, ?wait, "tool failed, backing off");
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => return Err(LlmError::Cancelled),
                () = tokio::time::sleep(wait) => {}
            }

            tracing::info!(attempt, "requesting corrected arguments");
            let corrected = tokio::select! {
                biased;
                () = self.cancel.cancelled() => return Err(LlmError::Cancelled),
                r = request_correction(self.provider, &definition, current, &source.message) => r,
            };
            match corrected {
                Ok(arguments) => {
                    tracing::info!(attempt, "accepted corrected arguments");
                    current.arguments = arguments;
                }
                Err(error) => {
                    tracing::warn!(attempt, %error, "correction failed, retrying with previous arguments");
                }
            }

            attempt += 1;
        }
    }
}
