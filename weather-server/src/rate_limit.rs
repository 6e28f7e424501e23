use std::{collections::HashMap, net::IpAddr, time::Duration};
use tokio::{sync::Mutex, time::Instant};

use crate::config::RateLimitConfig;

/// Tables larger than this are swept for expired windows.
const SWEEP_THRESHOLD: usize = 1024;

#[derive(Debug, Clone)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32, reset_in: Duration },
    Limited { reset_in: Duration },
}

/// Fixed-window request counter keyed by client address.
#[derive(Debug)]
pub struct RateLimiter {
    cfg: RateLimitConfig,
    windows: Mutex<HashMap<IpAddr, Window>>,
}

impl RateLimiter {
    pub fn new(cfg: RateLimitConfig) -> Self {
        Self { cfg, windows: Mutex::new(HashMap::new()) }
    }

    pub fn limit(&self) -> u32 {
        self.cfg.max_requests
    }

    pub async fn check(&self, key: IpAddr) -> Decision {
        let now = Instant::now();
        let mut lock = self.windows.lock().await;

        if lock.len() > SWEEP_THRESHOLD {
            let window = self.cfg.window;
            lock.retain(|_, w| now.duration_since(w.started) < window);
        }

        let entry = lock.entry(key).or_insert_with(|| Window { started: now, count: 0 });
        if now.duration_since(entry.started) >= self.cfg.window {
            entry.started = now;
            entry.count = 0;
        }

        let reset_in = self.cfg.window.saturating_sub(now.duration_since(entry.started));
        if entry.count >= self.cfg.max_requests {
            return Decision::Limited { reset_in };
        }

        entry.count += 1;
        Decision::Allowed { remaining: self.cfg.max_requests - entry.count, reset_in }
    }
}
