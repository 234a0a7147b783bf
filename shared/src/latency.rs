//! Artificial network latency applied before each simulated response.

use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

pub const DEFAULT_MIN_LATENCY: Duration = Duration::from_millis(500);
pub const DEFAULT_MAX_LATENCY: Duration = Duration::from_millis(1500);

#[async_trait]
pub trait Latency: Send + Sync {
    /// Suspend the current request. Other requests keep running.
    async fn wait(&self);
}

/// Uniformly distributed delay within `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomLatency {
    min: Duration,
    max: Duration,
}

impl RandomLatency {
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn bounds(&self) -> (Duration, Duration) {
        (self.min, self.max)
    }

    pub fn sample(&self) -> Duration {
        rand::thread_rng().gen_range(self.min..=self.max)
    }
}

impl Default for RandomLatency {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_LATENCY, DEFAULT_MAX_LATENCY)
    }
}

#[async_trait]
impl Latency for RandomLatency {
    async fn wait(&self) {
        let delay = self.sample();
        tracing::debug!("⏳ Simulating {}ms of network latency", delay.as_millis());
        tokio::time::sleep(delay).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedLatency(pub Duration);

#[async_trait]
impl Latency for FixedLatency {
    async fn wait(&self) {
        tokio::time::sleep(self.0).await;
    }
}

/// Zero delay, for tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoLatency;

#[async_trait]
impl Latency for NoLatency {
    async fn wait(&self) {}
}
