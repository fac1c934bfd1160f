//! Resilient call wrapper — one shared retry policy for every operation
//! that can fail transiently.
//!
//! The policy is a plain value handed in by the caller, so the same
//! behavior applies to the catalog fetch at bootstrap and to every spot
//! price fetch in the cycle. Each invocation starts its own attempt counter
//! from zero; nothing is remembered between calls.

use crate::control::{EngineMsg, StatusSink};
use crate::error::SourceError;
use std::future::Future;
use std::time::Duration;

/// Fixed-interval retry policy with a bounded time budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Sleep between attempts.
    pub interval: Duration,
    /// Total time to keep trying before escalating to `Exhausted`.
    pub budget: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            budget: Duration::from_secs(120),
        }
    }
}

impl BackoffPolicy {
    /// How many failed attempts fit in the budget. At least one.
    pub fn attempt_limit(&self) -> u32 {
        let interval = self.interval.as_millis().max(1);
        ((self.budget.as_millis() / interval) as u32).max(1)
    }
}

/// Run `op`, retrying transient failures until the policy's budget runs
/// out.
///
/// Every transient failure is announced to the sink as `ConnectionError`;
/// a success always announces `Connected` (idempotent, so a previously
/// shown error state is cleared even when none was announced through this
/// particular call). Non-transient errors propagate immediately. Once the
/// attempt limit is reached the error escalates to `Exhausted`, which is
/// fatal to the caller's current unit of work.
pub async fn with_retry<T, N, F, Fut>(
    policy: &BackoffPolicy,
    sink: &N,
    mut op: F,
) -> Result<T, SourceError>
where
    N: StatusSink,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    let limit = policy.attempt_limit();
    let mut attempts = 0u32;

    loop {
        match op().await {
            Ok(value) => {
                sink.notify(EngineMsg::Connected);
                return Ok(value);
            }
            Err(SourceError::Transient { reason }) => {
                attempts += 1;
                sink.notify(EngineMsg::ConnectionError);
                tracing::warn!(
                    attempt = attempts,
                    limit,
                    "transient upstream failure: {}",
                    reason
                );

                if attempts >= limit {
                    return Err(SourceError::Exhausted {
                        attempts,
                        budget: policy.budget,
                    });
                }
                tokio::time::sleep(policy.interval).await;
            }
            Err(other) => return Err(other),
        }
    }
}
