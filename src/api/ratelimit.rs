//! Per-client Request Limiter
//!
//! Counts requests per client key in fixed windows. The first request after a window has
//! elapsed starts a new window; requests beyond `max_requests` inside a window are refused.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    started: Instant,
}

pub struct RateLimiter {
    clients: DashMap<String, Window>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            clients: DashMap::new(),
            max_requests,
            window,
        }
    }

    /// Records a request from `client` and returns whether it is allowed.
    pub fn check(&self, client: &str) -> bool {
        self.check_at(client, Instant::now())
    }

    pub fn check_at(&self, client: &str, now: Instant) -> bool {
        let mut entry = self.clients.entry(client.to_string()).or_insert(Window {
            count: 0,
            started: now,
        });

        if now.saturating_duration_since(entry.started) > self.window {
            entry.count = 0;
            entry.started = now;
        }

        entry.count = entry.count.saturating_add(1);
        entry.count <= self.max_requests
    }

    /// Drops clients idle for more than two windows. Returns how many were removed.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let before = self.clients.len();
        let horizon = self.window * 2;
        self.clients
            .retain(|_, w| now.saturating_duration_since(w.started) <= horizon);
        before.saturating_sub(self.clients.len())
    }

    /// Spawns a task that sweeps idle clients once per window.
    pub fn spawn_sweeper(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(limiter.window);
            interval.tick().await;

            loop {
                interval.tick().await;
                let removed = limiter.sweep_at(Instant::now());
                if removed > 0 {
                    tracing::debug!("Rate limiter swept {} idle clients", removed);
                }
            }
        })
    }

    pub fn tracked_clients(&self) -> usize {
        self.clients.len()
    }
}
