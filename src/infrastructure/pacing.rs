use crate::domain::ports::{Pacer, PacerBox};
use async_trait::async_trait;
use std::time::Duration;

/// Waits a fixed delay between submissions without blocking the runtime.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelayPacer {
    delay: Duration,
}

impl FixedDelayPacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Pacer for FixedDelayPacer {
    async fn pause(&self) {
        tokio::time::sleep(self.delay).await;
    }
}

/// Submits items back to back.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacing;

#[async_trait]
impl Pacer for NoPacing {
    async fn pause(&self) {}
}

/// Picks the pacing policy for a configured delay; zero disables pacing.
pub fn pacer_for(delay: Duration) -> PacerBox {
    if delay.is_zero() {
        Box::new(NoPacing)
    } else {
        Box::new(FixedDelayPacer::new(delay))
    }
}
