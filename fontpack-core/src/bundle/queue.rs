//! Sequential task queue
//!
//! Runs tasks one at a time with a fixed pause between them. This is the
//! only throttling toward the catalog; there is no backoff or retry.

use std::future::Future;
use std::time::Duration;
use tracing::trace;

#[derive(Debug, Clone, Copy)]
pub struct SequentialQueue {
    delay: Duration,
}

impl SequentialQueue {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Await `task` for each item in order, pausing between (not after) tasks
    pub async fn run<I, T, F, Fut, R>(&self, items: I, mut task: F) -> Vec<R>
    where
        I: IntoIterator<Item = T>,
        F: FnMut(T) -> Fut,
        Fut: Future<Output = R>,
    {
        let mut results = Vec::new();
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                trace!("Waiting {:?} before next task", self.delay);
                tokio::time::sleep(self.delay).await;
            }
            results.push(task(item).await);
        }
        results
    }
}
