use rand::Rng;
use std::time::Duration;

use crate::settings::BackoffSettings;

/// Delay before reconnect attempt `attempt` (0-based), or `None` to give up.
///
/// `base * 2^attempt`, capped at `max_delay`, plus up to `jitter_ratio` of that as random jitter.
pub fn calculate_backoff(attempt: u32, settings: &BackoffSettings) -> Option<Duration> {
    if attempt > settings.max_retries {
        return None;
    }
    let delay = exponential_delay(attempt, settings);
    let jitter_ratio = settings.jitter_ratio.clamp(0.0, 1.0);
    let jitter = if jitter_ratio > 0.0 && delay > 0 {
        let span = (delay as f64 * jitter_ratio) as u64;
        rand::thread_rng().gen_range(0..=span)
    } else {
        0
    };
    Some(Duration::from_millis(delay + jitter))
}

fn exponential_delay(attempt: u32, settings: &BackoffSettings) -> u64 {
    let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    settings.base_delay_ms.saturating_mul(factor).min(settings.max_delay_ms)
}
