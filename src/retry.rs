//! Retry with exponential backoff for transient upstream failures
//!
//! Used around the summarization call only — provider fetches are never
//! retried. Classification is a plain substring heuristic kept behind
//! [`classify_transient`] so it can be swapped out without touching the
//! retry loop.

use anyhow::Result;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Indicators of upstream failures that are likely to succeed on retry
const TRANSIENT_INDICATORS: &[&str] = &[
    "503",
    "502",
    "429",
    "unavailable",
    "overloaded",
    "rate limit",
    "timed out",
    "timeout",
];

/// Whether an error looks transient (worth retrying with backoff)
#[must_use]
pub fn classify_transient(error: &anyhow::Error) -> bool {
    let message = format!("{error:#}").to_lowercase();
    TRANSIENT_INDICATORS
        .iter()
        .any(|indicator| message.contains(indicator))
}

/// Invoke `op` up to `attempts` times, sleeping `base_delay * 2^attempt`
/// between tries. Non-transient errors fail immediately; the last error is
/// returned once attempts are exhausted.
pub async fn with_retries<T, F, Fut>(mut op: F, attempts: u32, base_delay: Duration) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = attempts.max(1);
    let mut last_error = None;

    for attempt in 0..attempts {
        match op().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("Upstream call succeeded on attempt {}", attempt + 1);
                }
                return Ok(value);
            }
            Err(err) => {
                if !classify_transient(&err) {
                    return Err(err);
                }
                if attempt + 1 < attempts {
                    let delay = base_delay * 2u32.pow(attempt);
                    warn!(
                        "Transient upstream failure (attempt {}/{}), retrying in {:?}: {:#}",
                        attempt + 1,
                        attempts,
                        delay,
                        err
                    );
                    tokio::time::sleep(delay).await;
                }
                last_error = Some(err);
            }
        }
    }

    Err(last_error.expect("retry loop ran at least once"))
}
