use crate::error::ApiError;
use backoff::{ExponentialBackoff, backoff::Backoff};
use std::future::Future;
use std::time::Duration;

/// Retry configuration for API operations
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first
    pub max_retries: u32,
    /// Initial retry delay
    pub initial_delay: Duration,
    /// Maximum retry delay
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
    /// Whether to retry on client errors (4xx)
    pub retry_client_errors: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(60),
            multiplier: 2.0,
            retry_client_errors: false,
        }
    }
}

impl RetryConfig {
    /// Create a config for quick retry (shorter delays, fewer attempts)
    pub fn quick() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(10),
            multiplier: 1.5,
            retry_client_errors: false,
        }
    }
}

/// Retry executor with configurable policies
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    /// Create a new retry executor with the given config
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Execute an async operation with retry logic
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T, ApiError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut backoff = ExponentialBackoff {
            initial_interval: self.config.initial_delay,
            max_interval: self.config.max_delay,
            multiplier: self.config.multiplier,
            max_elapsed_time: None,
            ..Default::default()
        };

        let mut attempt = 0;

        loop {
            attempt += 1;

            match operation().await {
                Ok(result) => return Ok(result),
                Err(error) => {
                    if !self.should_retry(&error, attempt) {
                        return Err(error);
                    }

                    if let Some(delay) = backoff.next_backoff() {
                        log::debug!(
                            "Retrying operation after {:?} (attempt {}): {}",
                            delay,
                            attempt,
                            error
                        );
                        tokio::time::sleep(delay).await;
                    } else {
                        log::warn!(
                            "Max retry attempts reached ({}), giving up",
                            self.config.max_retries
                        );
                        return Err(error);
                    }
                }
            }
        }
    }

    /// Determine if an error should trigger a retry
    fn should_retry(&self, error: &ApiError, attempt: u32) -> bool {
        if attempt >= self.config.max_retries {
            return false;
        }

        match error {
            // The server explicitly asked for another attempt
            ApiError::Retryable { .. } => true,
            ApiError::Timeout { .. } => true,
            ApiError::Http {
                status: 500..=599, ..
            } => true,

            // Retry on client errors only if configured
            ApiError::Http {
                status: 400..=499, ..
            } => self.config.retry_client_errors,

            ApiError::Unauthorized { .. }
            | ApiError::Forbidden { .. }
            | ApiError::NotFound { .. }
            | ApiError::Validation { .. }
            | ApiError::Http { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn duplicate_id() -> ApiError {
        ApiError::Retryable {
            code: "DUPLICATE_TASK_ID".to_string(),
            endpoint: "/api/tasks".to_string(),
            message: "Task ID collision".to_string(),
        }
    }

    #[tokio::test]
    async fn test_retry_success_immediate() {
        let executor = RetryExecutor::new(RetryConfig::default());
        let result = executor.execute(|| async { Ok::<i32, ApiError>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retryable_error_is_retried_until_success() {
        let attempts = AtomicU32::new(0);
        let executor = RetryExecutor::new(RetryConfig::default());
        let result = executor
            .execute(|| async {
                if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(duplicate_id())
                } else {
                    Ok("TSK-0002")
                }
            })
            .await;
        assert_eq!(result.unwrap(), "TSK-0002");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_retries() {
        let attempts = AtomicU32::new(0);
        let executor = RetryExecutor::new(RetryConfig::quick());
        let result: Result<(), ApiError> = executor
            .execute(|| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(duplicate_id())
            })
            .await;
        assert!(matches!(result, Err(ApiError::Retryable { .. })));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_gives_up_on_validation_error() {
        let attempts = AtomicU32::new(0);
        let executor = RetryExecutor::new(RetryConfig::default());
        let result: Result<(), ApiError> = executor
            .execute(|| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(ApiError::Validation {
                    endpoint: "/api/tasks".to_string(),
                    message: "Title is required".to_string(),
                })
            })
            .await;
        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_retry_config_presets() {
        let default = RetryConfig::default();
        assert_eq!(default.max_retries, 3);
        assert_eq!(default.initial_delay, Duration::from_millis(100));

        let quick = RetryConfig::quick();
        assert_eq!(quick.max_retries, 2);
        assert_eq!(quick.initial_delay, Duration::from_millis(50));
    }
}
