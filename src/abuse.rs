//! Inbound flood protection for WebSocket clients
//!
//! Each connection gets a fixed-window message budget. Frames over budget are
//! dropped and answered with a `RATE_LIMITED` error.

use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::sync::RwLock;
use tokio::time::Instant;

const DEFAULT_MAX_MESSAGES: u32 = 30;
const DEFAULT_WINDOW_SECS: u64 = 10;

/// Rate limiter state
#[derive(Debug, Clone)]
pub struct RateLimiter {
    /// Map of connection id to (message count, window start)
    requests: Arc<RwLock<HashMap<String, (u32, Instant)>>>,
    /// Maximum messages per window
    max_requests: u32,
    /// Time window duration
    window: Duration,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_MESSAGES,
            Duration::from_secs(DEFAULT_WINDOW_SECS),
        )
    }
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            requests: Arc::new(RwLock::new(HashMap::new())),
            max_requests,
            window,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Check if a message should be allowed
    /// Returns true if allowed, false if rate limited
    pub async fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut requests = self.requests.write().await;

        match requests.get_mut(key) {
            Some((count, window_start)) => {
                if now.duration_since(*window_start) >= self.window {
                    *count = 1;
                    *window_start = now;
                    true
                } else if *count >= self.max_requests {
                    false
                } else {
                    *count += 1;
                    true
                }
            }
            None => {
                requests.insert(key.to_string(), (1, now));
                true
            }
        }
    }

    /// Forget a connection that has gone away
    pub async fn forget(&self, key: &str) {
        self.requests.write().await.remove(key);
    }

    /// Clean up old entries (call periodically)
    pub async fn cleanup(&self) {
        let now = Instant::now();
        let mut requests = self.requests.write().await;
        requests.retain(|_, (_, window_start)| now.duration_since(*window_start) < self.window * 2);
    }

    pub async fn tracked(&self) -> usize {
        self.requests.read().await.len()
    }
}

/// Spawn a background task that prunes stale limiter entries every window
pub fn spawn_cleanup(limiter: RateLimiter) {
    tokio::spawn(async move {
        let period = limiter.window().max(Duration::from_secs(1));
        loop {
            tokio::time::sleep(period).await;
            limiter.cleanup().await;
        }
    });
}

/// Anti-abuse configuration
#[derive(Debug, Clone)]
pub struct AbuseConfig {
    /// Rate limiter (None = disabled)
    pub rate_limiter: Option<RateLimiter>,
}

impl Default for AbuseConfig {
    fn default() -> Self {
        Self {
            rate_limiter: Some(RateLimiter::default()),
        }
    }
}

impl AbuseConfig {
    pub fn disabled() -> Self {
        Self { rate_limiter: None }
    }

    /// Load config from environment variables. `RATE_LIMIT_MAX=0` disables
    /// limiting.
    pub fn from_env() -> Self {
        let max_requests = std::env::var("RATE_LIMIT_MAX")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_MESSAGES);

        let window_secs = std::env::var("RATE_LIMIT_WINDOW_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_WINDOW_SECS);

        let rate_limiter = (max_requests > 0)
            .then(|| RateLimiter::new(max_requests, Duration::from_secs(window_secs)));

        tracing::info!(
            rate_limit_enabled = rate_limiter.is_some(),
            max_requests,
            window_secs,
            "Anti-abuse config loaded"
        );

        Self { rate_limiter }
    }
}
