//! Token-bucket rate limiting over outbound LLM calls (§4.8: "if `rpm > 0`,
//! enforce a token-bucket over LLM calls at `rpm/60` per second").

use std::time::{Duration, Instant};

use tokio::sync::Mutex;

pub struct RateLimiter {
    interval: Option<Duration>,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// `rpm <= 0` disables limiting entirely (§6 default: `rpm=0`).
    pub fn new(rpm: u32) -> Self {
        let interval = if rpm == 0 {
            None
        } else {
            Some(Duration::from_secs_f64(60.0 / rpm as f64))
        };
        Self {
            interval,
            last_call: Mutex::new(None),
        }
    }

    /// Blocks until the next call is permitted under the configured rate.
    pub async fn acquire(&self) {
        let Some(interval) = self.interval else {
            return;
        };
        let mut guard = self.last_call.lock().await;
        let now = Instant::now();
        if let Some(last) = *guard {
            let elapsed = now.duration_since(last);
            if elapsed < interval {
                tokio::time::sleep(interval - elapsed).await;
            }
        }
        *guard = Some(Instant::now());
    }
}
