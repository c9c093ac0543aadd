//! Mock provider for testing.
//!
//! [`MockProvider`] is a queue-based fake that lets tests script exactly
//! what a model answers, turn by turn, without any transport. It
//! implements [`Provider`], so it can sit under an
//! [`Agent`](crate::Agent), a [`StructuredOutput`](crate::StructuredOutput)
//! wrapper, or an [`Invoker`](crate::Invoker).
//!
//! # Usage
//!
//! ```rust,no_run
//! use llm_agent::mock::MockProvider;
//! use llm_agent::{ChatMessage, ChatRequest, ChatResponse, Provider, ProviderMetadata};
//!
//! # async fn example() {
//! let mock = MockProvider::new(ProviderMetadata {
//!     name: "test".into(),
//!     model: "test-model".into(),
//! });
//! mock.queue_response(ChatResponse::new(vec![ChatMessage::assistant("Hello!")]));
//!
//! let resp = mock.generate(&ChatRequest::default()).await.unwrap();
//! assert_eq!(resp.text(), Some("Hello!"));
//! assert_eq!(mock.recorded_calls().len(), 1);
//! # }
//! ```
//!
//! [`LlmError`] is not `Clone`, so queued failures use the cloneable
//! [`MockError`] mirror and are converted when dequeued.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;

use crate::error::LlmError;
use crate::provider::{ChatRequest, ChatResponse, Provider, ProviderMetadata};

/// A queue-based mock provider for unit and integration tests.
///
/// Every call to `generate` records its [`ChatRequest`] and pops the next
/// queued outcome.
///
/// # Panics
///
/// [`generate`](Provider::generate) panics if the queue is empty.
pub struct MockProvider {
    responses: Mutex<VecDeque<Result<ChatResponse, MockError>>>,
    meta: ProviderMetadata,
    calls: Mutex<Vec<ChatRequest>>,
    stall_when_empty: bool,
}

/// Cloneable mirror of the transport-facing [`LlmError`] variants.
#[derive(Debug, Clone)]
pub enum MockError {
    /// Maps to [`LlmError::Http`].
    Http {
        /// HTTP status code, if any.
        status: Option<http::StatusCode>,
        /// Error message.
        message: String,
        /// Whether the error is retryable.
        retryable: bool,
    },
    /// Maps to [`LlmError::Auth`].
    Auth(String),
    /// Maps to [`LlmError::InvalidRequest`].
    InvalidRequest(String),
    /// Maps to [`LlmError::Provider`].
    Provider {
        /// Provider error code.
        code: String,
        /// Error message.
        message: String,
        /// Whether the error is retryable.
        retryable: bool,
    },
    /// Maps to [`LlmError::Timeout`].
    Timeout {
        /// Elapsed milliseconds.
        elapsed_ms: u64,
    },
    /// Maps to [`LlmError::ResponseFormat`].
    ResponseFormat {
        /// What went wrong during parsing.
        message: String,
        /// The raw response body.
        raw: String,
    },
}

impl From<MockError> for LlmError {
    fn from(error: MockError) -> Self {
        match error {
            MockError::Http {
                status,
                message,
                retryable,
            } => LlmError::Http {
                status,
                message,
                retryable,
            },
            MockError::Auth(msg) => LlmError::Auth(msg),
            MockError::InvalidRequest(msg) => LlmError::InvalidRequest(msg),
            MockError::Provider {
                code,
                message,
                retryable,
            } => LlmError::Provider {
                code,
                message,
                retryable,
            },
            MockError::Timeout { elapsed_ms } => LlmError::Timeout { elapsed_ms },
            MockError::ResponseFormat { message, raw } => {
                LlmError::ResponseFormat { message, raw }
            }
        }
    }
}

impl fmt::Debug for MockProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let response_len = self.responses.lock().unwrap().len();
        let call_count = self.calls.lock().unwrap().len();
        f.debug_struct("MockProvider")
            .field("meta", &self.meta)
            .field("queued_responses", &response_len)
            .field("recorded_calls", &call_count)
            .field("stall_when_empty", &self.stall_when_empty)
            .finish()
    }
}

impl MockProvider {
    /// Creates a new mock with the given metadata and an empty queue.
    pub fn new(meta: ProviderMetadata) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            meta,
            calls: Mutex::new(Vec::new()),
            stall_when_empty: false,
        }
    }

    /// Once the queue is drained, `generate` never completes instead of
    /// panicking. Useful for holding a model call in flight.
    #[must_use]
    pub fn stall_when_empty(mut self) -> Self {
        self.stall_when_empty = true;
        self
    }

    /// Enqueues a successful response for the next `generate` call.
    pub fn queue_response(&self, response: ChatResponse) -> &Self {
        self.responses.lock().unwrap().push_back(Ok(response));
        self
    }

    /// Enqueues an error for the next `generate` call.
    pub fn queue_error(&self, error: MockError) -> &Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// Number of outcomes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }

    /// Returns a clone of every request passed to `generate`, in call
    /// order.
    pub fn recorded_calls(&self) -> Vec<ChatRequest> {
        self.calls.lock().unwrap().clone()
    }
}

impl Provider for MockProvider {
    async fn generate(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        self.calls.lock().unwrap().push(request.clone());
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(result) => result.map_err(LlmError::from),
            None if self.stall_when_empty => std::future::pending().await,
            None => panic!("MockProvider: no queued responses remaining"),
        }
    }

    fn metadata(&self) -> ProviderMetadata {
        self.meta.clone()
    }
}
