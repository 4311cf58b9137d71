//! Retry delays and rate-limit pacing.

use std::time::Duration;

use rand::Rng;

/// Calculate exponential backoff delay with jitter.
///
/// Attempt 1 waits `base_ms`, each further attempt doubles it, capped at
/// `max_ms`. Jitter adds up to 10% of an uncapped delay; a capped delay is
/// returned as is so `base_ms == max_ms` gives a constant pause.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let delay_ms = base_ms.saturating_mul(exponential_base);
    if delay_ms >= max_ms {
        return Duration::from_millis(max_ms);
    }

    let jitter_range = delay_ms / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis((delay_ms + jitter).min(max_ms))
}

/// Randomized pause in `[min_ms, min_ms + jitter_ms]` used to stay under the
/// API's informal rate limits.
pub fn pacing_delay(min_ms: u64, jitter_ms: u64) -> Duration {
    Duration::from_millis(min_ms + fastrand::u64(0..=jitter_ms))
}
