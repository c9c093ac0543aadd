//! Unified error type for model invocation and tool orchestration.
//!
//! Transports map their native failures into the transport-facing
//! variants of [`LlmError`] (`Http`, `Auth`, `Provider`, `Timeout`,
//! `ResponseFormat`, `InvalidRequest`). Together these form the
//! model-invocation class, which the agent never retries:
//!
//! ```rust
//! use llm_agent::LlmError;
//!
//! let err = LlmError::Auth("expired key".into());
//! assert!(err.is_model_invocation());
//!
//! let err = LlmError::NoForcedCallProduced { tool_name: "formatter".into() };
//! assert!(!err.is_model_invocation());
//! ```
//!
//! # Propagation
//!
//! | Variant | Scope |
//! |---------|-------|
//! | transport variants | fatal to the whole run |
//! | [`ToolNotFound`](LlmError::ToolNotFound) | recorded as a tool error message |
//! | [`ToolExecution`](LlmError::ToolExecution) | retried with self-correction |
//! | [`RetryExhausted`](LlmError::RetryExhausted) | recorded as a tool error message |
//! | [`Correction`](LlmError::Correction) | forfeits one correction, retry continues |
//! | [`NoForcedCallProduced`](LlmError::NoForcedCallProduced) | fatal to that wrapper call |
//! | [`MaxTurnsExceeded`](LlmError::MaxTurnsExceeded) | fatal to the whole run |
//! | [`Cancelled`](LlmError::Cancelled) | fatal to the whole run |

use crate::tool::ToolError;

/// The unified error type returned by providers, wrappers, and agents.
///
/// Variants are `#[non_exhaustive]`; always include a wildcard arm.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LlmError {
    /// An HTTP-level failure (transport error, unexpected status code).
    ///
    /// `status` is `None` when the request never received a response.
    #[error("HTTP error (status={status:?}): {message}")]
    Http {
        /// The HTTP status code, if one was received.
        status: Option<http::StatusCode>,
        /// A human-readable description of the failure.
        message: String,
        /// Whether the caller should retry this request.
        retryable: bool,
    },

    /// The API key or token was rejected.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The request was malformed (duplicate tools, unknown forced tool,
    /// uncorrelated history).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The provider returned an error payload.
    #[error("Provider error ({code}): {message}")]
    Provider {
        /// Provider-defined error code (e.g. `"overloaded"`).
        code: String,
        /// Human-readable error description.
        message: String,
        /// Whether the caller should retry this request.
        retryable: bool,
    },

    /// A response or payload could not be parsed.
    #[error("Response format error: {message}")]
    ResponseFormat {
        /// What went wrong during parsing.
        message: String,
        /// The raw text, for diagnostics.
        raw: String,
    },

    /// The transport exceeded its deadline.
    #[error("Operation timed out after {elapsed_ms}ms")]
    Timeout {
        /// Milliseconds elapsed before the timeout fired.
        elapsed_ms: u64,
    },

    /// A tool call named a tool that is not in the toolbox.
    #[error("tool not found: {name}")]
    ToolNotFound {
        /// The requested tool name.
        name: String,
    },

    /// A tool's `run` failed.
    #[error("Tool execution error ({tool_name}): {source}")]
    ToolExecution {
        /// The name of the tool that failed.
        tool_name: String,
        /// The error raised by the tool.
        source: ToolError,
    },

    /// Every attempt of a retried tool call failed.
    #[error("Retry exhausted after {attempts} attempts: {last_error}")]
    RetryExhausted {
        /// How many executions were attempted.
        attempts: u32,
        /// The error from the final attempt.
        #[source]
        last_error: Box<LlmError>,
    },

    /// The transport answered a forced-tool request without calling the
    /// forced tool.
    #[error("no call to forced tool '{tool_name}' in response")]
    NoForcedCallProduced {
        /// The tool that was forced.
        tool_name: String,
    },

    /// Asking the model for corrected tool arguments failed.
    #[error("correction for tool '{tool_name}' failed: {source}")]
    Correction {
        /// The tool whose arguments were being corrected.
        tool_name: String,
        /// Why the correction round-trip failed.
        #[source]
        source: Box<LlmError>,
    },

    /// The agent loop hit its turn ceiling while the model kept calling
    /// tools.
    #[error("agent exceeded {limit} model turns")]
    MaxTurnsExceeded {
        /// The configured ceiling.
        limit: u32,
    },

    /// The run was cancelled by its caller.
    #[error("operation cancelled")]
    Cancelled,
}

impl LlmError {
    /// Returns `true` if the error is transient and the request may succeed on retry.
    ///
    /// Applies to transport variants only; the agent itself never retries
    /// model invocations, but transport middleware can.
    ///
    /// ```rust
    /// use llm_agent::LlmError;
    ///
    /// assert!(LlmError::Timeout { elapsed_ms: 5000 }.is_retryable());
    /// assert!(!LlmError::Auth("bad key".into()).is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { retryable, .. } | Self::Provider { retryable, .. } => *retryable,
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` for failures raised by the model transport.
    pub fn is_model_invocation(&self) -> bool {
        matches!(
            self,
            Self::Http { .. }
                | Self::Auth(_)
                | Self::InvalidRequest(_)
                | Self::Provider { .. }
                | Self::ResponseFormat { .. }
                | Self::Timeout { .. }
        )
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        Self::ResponseFormat {
            message: err.to_string(),
            raw: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_http() {
        let err = LlmError::Http {
            status: Some(http::StatusCode::TOO_MANY_REQUESTS),
            message: "rate limited".into(),
            retryable: true,
        };
        let display = format!("{err}");
        assert!(display.contains("429"));
        assert!(display.contains("rate limited"));
    }

    #[test]
    fn test_error_display_tool_not_found() {
        let err = LlmError::ToolNotFound {
            name: "weather".into(),
        };
        assert_eq!(format!("{err}"), "tool not found: weather");
    }

    #[test]
    fn test_error_display_tool_execution() {
        let err = LlmError::ToolExecution {
            tool_name: "calculator".into(),
            source: ToolError::new("division by zero"),
        };
        let display = format!("{err}");
        assert!(display.contains("calculator"));
        assert!(display.contains("division by zero"));
    }

    #[test]
    fn test_error_retry_exhausted_source_chain() {
        use std::error::Error;
        let err = LlmError::RetryExhausted {
            attempts: 4,
            last_error: Box::new(LlmError::ToolExecution {
                tool_name: "calculator".into(),
                source: ToolError::new("bad operand"),
            }),
        };
        assert!(format!("{err}").contains("after 4 attempts"));
        let source = err.source().expect("RetryExhausted should have a source");
        assert!(format!("{source}").contains("bad operand"));
    }

    #[test]
    fn test_error_display_no_forced_call() {
        let err = LlmError::NoForcedCallProduced {
            tool_name: "formatter".into(),
        };
        assert!(format!("{err}").contains("formatter"));
    }

    #[test]
    fn test_error_display_max_turns() {
        let err = LlmError::MaxTurnsExceeded { limit: 10 };
        assert_eq!(format!("{err}"), "agent exceeded 10 model turns");
    }

    #[test]
    fn test_model_invocation_classification() {
        assert!(LlmError::Timeout { elapsed_ms: 1 }.is_model_invocation());
        assert!(
            LlmError::Provider {
                code: "overloaded".into(),
                message: "busy".into(),
                retryable: true,
            }
            .is_model_invocation()
        );
        assert!(!LlmError::Cancelled.is_model_invocation());
        assert!(!LlmError::MaxTurnsExceeded { limit: 1 }.is_model_invocation());
        assert!(
            !LlmError::ToolNotFound {
                name: "x".into()
            }
            .is_model_invocation()
        );
    }

    #[test]
    fn test_error_retryable() {
        let err = LlmError::Http {
            status: Some(http::StatusCode::SERVICE_UNAVAILABLE),
            message: "down".into(),
            retryable: true,
        };
        assert!(err.is_retryable());
        assert!(!LlmError::Cancelled.is_retryable());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LlmError>();
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not valid json").unwrap_err();
        let llm_err: LlmError = json_err.into();
        assert!(matches!(llm_err, LlmError::ResponseFormat { .. }));
    }
}
