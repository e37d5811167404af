use std::time::Duration;
use tokio::time::{Instant, sleep_until};

/// Enforces a minimum delay between consecutive requests.
///
/// The portal is a shared university system; hammering it gets sessions
/// dropped. The first request goes out immediately.
#[derive(Debug)]
pub struct Throttle {
    delay: Duration,
    last: Option<Instant>,
}
impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Self { delay, last: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait until the next request is allowed, then claim the slot.
    pub async fn wait(&mut self) {
        if let Some(last) = self.last {
            let next = last + self.delay;
            if next > Instant::now() {
                tracing::debug!(wait = ?(next - Instant::now()), "Throttling request");
                sleep_until(next).await;
            }
        }
        self.last = Some(Instant::now());
    }
}
