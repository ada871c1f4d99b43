//! Mock relay for testing.
//!
//! [`MockRelay`] implements the [`Relay`] trait with scripted output so the
//! channel, sensor and worker logic can be exercised without the rig's
//! Python helpers.
//!
//! # Features
//!
//! - **Scripted output**: queue the exact stdout of successive invocations
//! - **Failure injection**: make invocations fail as if the program were missing
//! - **Latency simulation**: delay each invocation

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::relay::RelayOutput;
use crate::traits::Relay;

/// A relay that replays queued output.
///
/// Queued outputs are consumed in order; once the queue is empty the last
/// output is repeated.
///
/// # Example
///
/// ```
/// use spinrig_core::{MockRelay, Relay};
///
/// #[tokio::main]
/// async fn main() {
///     let relay = MockRelay::scripted("slider", ["", "Python: Passed message"]);
///     assert_eq!(relay.invoke().await.unwrap().trimmed(), "");
///     assert_eq!(relay.invoke().await.unwrap().trimmed(), "Python: Passed message");
///     assert_eq!(relay.invocation_count(), 2);
/// }
/// ```
pub struct MockRelay {
    name: String,
    queue: Mutex<VecDeque<String>>,
    repeat: Mutex<String>,
    invocations: AtomicU32,
    should_fail: AtomicBool,
    /// Simulated latency in milliseconds (0 = no delay).
    latency_ms: AtomicU64,
}

impl std::fmt::Debug for MockRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockRelay")
            .field("name", &self.name)
            .field("invocations", &self.invocations.load(Ordering::Relaxed))
            .field("should_fail", &self.should_fail.load(Ordering::Relaxed))
            .finish()
    }
}

impl MockRelay {
    /// A relay that always prints `output`.
    pub fn always(name: &str, output: &str) -> Self {
        Self {
            name: name.to_string(),
            queue: Mutex::new(VecDeque::new()),
            repeat: Mutex::new(output.to_string()),
            invocations: AtomicU32::new(0),
            should_fail: AtomicBool::new(false),
            latency_ms: AtomicU64::new(0),
        }
    }

    /// A relay that prints each of `outputs` in turn, then repeats the last.
    pub fn scripted<I, S>(name: &str, outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queue: VecDeque<String> = outputs.into_iter().map(Into::into).collect();
        let repeat = queue.back().cloned().unwrap_or_default();
        Self {
            queue: Mutex::new(queue),
            repeat: Mutex::new(repeat),
            ..Self::always(name, "")
        }
    }

    /// Append an output to the queue.
    pub async fn push_output(&self, output: &str) {
        self.queue.lock().await.push_back(output.to_string());
        *self.repeat.lock().await = output.to_string();
    }

    /// Replace the queue with a single repeated output.
    pub async fn set_output(&self, output: &str) {
        self.queue.lock().await.clear();
        *self.repeat.lock().await = output.to_string();
    }

    /// Make subsequent invocations fail with a launch error.
    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::Relaxed);
    }

    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// Number of times the relay was invoked, failed runs included.
    pub fn invocation_count(&self) -> u32 {
        self.invocations.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Relay for MockRelay {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self) -> Result<RelayOutput> {
        self.invocations.fetch_add(1, Ordering::Relaxed);

        let latency = self.latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        if self.should_fail.load(Ordering::Relaxed) {
            return Err(Error::relay_launch(
                &self.name,
                std::io::Error::new(std::io::ErrorKind::NotFound, "mock relay failure"),
            ));
        }

        let next = self.queue.lock().await.pop_front();
        let stdout = match next {
            Some(output) => output,
            None => self.repeat.lock().await.clone(),
        };
        Ok(RelayOutput::new(stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_then_repeats_last() {
        let relay = MockRelay::scripted("sensor", ["a", "b"]);
        assert_eq!(relay.invoke().await.unwrap().stdout, "a");
        assert_eq!(relay.invoke().await.unwrap().stdout, "b");
        assert_eq!(relay.invoke().await.unwrap().stdout, "b");
        assert_eq!(relay.invocation_count(), 3);
    }

    #[tokio::test]
    async fn test_set_output_clears_queue() {
        let relay = MockRelay::scripted("sensor", ["a", "b"]);
        relay.set_output("c").await;
        assert_eq!(relay.invoke().await.unwrap().stdout, "c");
    }

    #[tokio::test]
    async fn test_push_output() {
        let relay = MockRelay::always("slider", "x");
        relay.push_output("y").await;
        assert_eq!(relay.invoke().await.unwrap().stdout, "y");
        assert_eq!(relay.invoke().await.unwrap().stdout, "y");
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let relay = MockRelay::always("belt", "Python: Passed message");
        relay.set_should_fail(true);
        assert!(relay.invoke().await.is_err());

        relay.set_should_fail(false);
        assert!(relay.invoke().await.is_ok());
        assert_eq!(relay.invocation_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency() {
        let relay = MockRelay::always("belt", "ok");
        relay.set_latency(Duration::from_secs(2));

        let started = tokio::time::Instant::now();
        relay.invoke().await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(2));
    }
}
