//! Agent configuration.

use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::tool::RetryConfig;

/// Immutable settings fixed when an [`Agent`](super::Agent) is built.
///
/// ```rust
/// use llm_agent::{AgentConfig, RetryConfig};
///
/// let config = AgentConfig {
///     retry: RetryConfig { max_retries: 1, ..RetryConfig::default() },
///     max_turns: Some(4),
///     ..AgentConfig::default()
/// };
/// assert!(!config.parallel_tool_execution);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Retry policy applied to every tool call.
    pub retry: RetryConfig,
    /// Most model turns one run may take. `None` removes the ceiling;
    /// `Some(0)` is rejected. Default: `Some(10)`.
    pub max_turns: Option<u32>,
    /// Run the tool calls of one turn concurrently. Results are still
    /// appended in call order. Default: `false`.
    pub parallel_tool_execution: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            max_turns: Some(10),
            parallel_tool_execution: false,
        }
    }
}

impl AgentConfig {
    /// Rejects settings no run could honor.
    ///
    /// # Errors
    ///
    /// [`LlmError::InvalidRequest`] if `max_turns` is `Some(0)`.
    pub fn validate(&self) -> Result<(), LlmError> {
        if self.max_turns == Some(0) {
            return Err(LlmError::InvalidRequest(
                "max_turns must be at least 1 (use None for no ceiling)".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AgentConfig::default();
        assert_eq!(config.max_turns, Some(10));
        assert_eq!(config.retry.max_retries, 3);
        assert!(!config.parallel_tool_execution);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: AgentConfig = serde_json::from_str(
            r#"{"max_turns": null, "retry": {"max_retries": 5}, "parallel_tool_execution": true}"#,
        )
        .unwrap();
        assert_eq!(config.max_turns, None);
        assert_eq!(config.retry.max_retries, 5);
        assert!(config.parallel_tool_execution);
    }

    #[test]
    fn test_zero_turn_ceiling_rejected() {
        let config = AgentConfig {
            max_turns: Some(0),
            ..AgentConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, LlmError::InvalidRequest(ref msg) if msg.contains("max_turns")));

        assert!(AgentConfig::default().validate().is_ok());
        let unbounded = AgentConfig {
            max_turns: None,
            ..AgentConfig::default()
        };
        assert!(unbounded.validate().is_ok());
    }
}
