//! Retry classification and backoff curve for provider requests

use std::time::Duration;

/// Statuses worth another attempt: rate limiting and gateway/server hiccups
pub const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

pub fn is_retryable_status(status: u16) -> bool {
    RETRYABLE_STATUSES.contains(&status)
}

/// Linear backoff: `base * (attempt_index + 1)` (1.2s, 2.4s, 3.6s, ... for a 1.2s base)
///
/// `attempt_index` is zero-based.
pub fn backoff_duration(base: Duration, attempt_index: u32) -> Duration {
    base.saturating_mul(attempt_index.saturating_add(1))
}
