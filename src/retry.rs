//! # Retry Module
//!
//! Bounded exponential backoff around a single call to the model service.
//!
//! Only failures classified as transient overload are retried; everything
//! else is returned to the caller unchanged on the first occurrence. The
//! delay starts at `base_retry_delay_ms` and doubles after each retry.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::RecoveryConfig;
use crate::errors::Result;

/// Delay to wait before retry number `retry` (0-based).
///
/// Doubles per retry and never exceeds `max_retry_delay_ms`.
pub fn calculate_retry_delay(retry: u32, config: &RecoveryConfig) -> Duration {
    let factor = 1u64.checked_shl(retry).unwrap_or(u64::MAX);
    let delay_ms = config
        .base_retry_delay_ms
        .saturating_mul(factor)
        .min(config.max_retry_delay_ms);
    Duration::from_millis(delay_ms)
}

/// Run `operation`, retrying on transient overload.
///
/// The operation is attempted at most `config.max_retries + 1` times. The
/// last failure is returned once retries are exhausted.
pub async fn with_retry<T, F, Fut>(config: &RecoveryConfig, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut retry = 0u32;
    loop {
        match operation().await {
            Ok(value) => {
                if retry > 0 {
                    debug!(retries = retry, "Call succeeded after retrying");
                }
                return Ok(value);
            }
            Err(err) if err.is_transient() && retry < config.max_retries => {
                let delay = calculate_retry_delay(retry, config);
                warn!(
                    attempt = retry + 1,
                    max_retries = config.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Service overloaded, retrying"
                );
                tokio::time::sleep(delay).await;
                retry += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
