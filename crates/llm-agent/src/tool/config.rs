//! Retry policy for failing tool calls.

use std::time::Duration;

use rand::Rng as _;
use serde::{Deserialize, Serialize};

/// How often, and how patiently, a failing tool call is retried.
///
/// Each retry waits for a backoff and then asks the model for corrected
/// arguments before running the tool again. With `max_retries = N` a tool
/// runs at most `N + 1` times.
///
/// The backoff before retry `k` (0-indexed) is
/// `min(initial_backoff * backoff_multiplier^k, max_backoff)`, scaled by a
/// random factor in `[1 - jitter, 1]` when `jitter > 0`.
///
/// ```rust
/// use llm_agent::RetryConfig;
/// use std::time::Duration;
///
/// let config = RetryConfig {
///     max_retries: 2,
///     initial_backoff: Duration::from_millis(250),
///     ..RetryConfig::default()
/// };
/// assert_eq!(config.backoff(0), Duration::from_millis(250));
/// assert_eq!(config.backoff(1), Duration::from_millis(500));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt. Default: 3.
    pub max_retries: u32,
    /// Wait before the first retry. Default: 100ms.
    pub initial_backoff: Duration,
    /// Upper bound on any single wait. Default: 5 seconds.
    pub max_backoff: Duration,
    /// Growth factor between consecutive waits. Default: 2.0.
    pub backoff_multiplier: f64,
    /// Jitter factor in `0.0..=1.0`. Default: 0.0 (deterministic waits).
    pub jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
            backoff_multiplier: 2.0,
            jitter: 0.0,
        }
    }
}

impl RetryConfig {
    /// A policy that runs each tool exactly once.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// The wait before retry number `retry` (0-indexed).
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let base = self.initial_backoff.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        let capped = base.min(self.max_backoff.as_secs_f64());

        let jitter = self.jitter.clamp(0.0, 1.0);
        let factor = if jitter > 0.0 {
            rand::rng().random_range((1.0 - jitter)..=1.0)
        } else {
            1.0
        };

        Duration::try_from_secs_f64(capped * factor).unwrap_or(self.max_backoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.initial_backoff, Duration::from_millis(100));
        assert_eq!(config.max_backoff, Duration::from_secs(5));
        assert!((config.backoff_multiplier - 2.0).abs() < f64::EPSILON);
        assert!(config.jitter.abs() < f64::EPSILON);
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let config = RetryConfig {
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(3),
            ..RetryConfig::default()
        };
        assert_eq!(config.backoff(0), Duration::from_secs(1));
        assert_eq!(config.backoff(1), Duration::from_secs(2));
        assert_eq!(config.backoff(2), Duration::from_secs(3));
        assert_eq!(config.backoff(10), Duration::from_secs(3));
    }

    #[test]
    fn test_backoff_jitter_stays_in_range() {
        let config = RetryConfig {
            initial_backoff: Duration::from_millis(1000),
            jitter: 0.5,
            ..RetryConfig::default()
        };
        for _ in 0..50 {
            let wait = config.backoff(0);
            assert!(wait >= Duration::from_millis(500));
            assert!(wait <= Duration::from_millis(1000));
        }
    }

    #[test]
    fn test_partial_deserialize_fills_defaults() {
        let config: RetryConfig = serde_json::from_str(r#"{"max_retries": 1}"#).unwrap();
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.initial_backoff, Duration::from_millis(100));
    }

    #[test]
    fn test_none_runs_once() {
        assert_eq!(RetryConfig::none().max_retries, 0);
    }
}
