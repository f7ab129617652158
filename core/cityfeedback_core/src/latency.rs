use std::time::Duration;

/// Artificial delay in front of every simulated backend call, so clients see
/// loading states the way they would against a remote service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Latency {
    base: Duration,
    jitter: Duration,
}

impl Latency {
    pub fn new(base_ms: u64, jitter_ms: u64) -> Self {
        Self {
            base: Duration::from_millis(base_ms),
            jitter: Duration::from_millis(jitter_ms),
        }
    }

    pub fn none() -> Self {
        Self::new(0, 0)
    }

    /// `base` plus a uniform extra in `[0, jitter)`.
    pub fn sample(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        let extra = if jitter_ms == 0 {
            0
        } else {
            fastrand::u64(0..jitter_ms)
        };
        self.base + Duration::from_millis(extra)
    }

    pub async fn wait(&self) {
        let delay = self.sample();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for Latency {
    fn default() -> Self {
        Self::new(350, 250)
    }
}
