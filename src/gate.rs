//! Flood-control gate shared by every sender using the same bot credentials.
//!
//! Telegram applies flood control per bot token, not per chat, so a single
//! deadline is shared across all messages and destinations. Any sender that
//! receives a "retry after" signal moves the deadline, and every sender waits
//! for it before its next attempt.
//!
//! The deadline is an atomic cell with last-writer-wins semantics: a later,
//! shorter hold replaces an earlier, longer one. Reads and waits are not
//! serialized, so two senders may both observe an expired gate and go at once.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::debug;

/// Shared next-allowed-send deadline
#[derive(Debug)]
pub struct RateLimitGate {
    /// Reference point for the stored deadline
    origin: Instant,
    /// Deadline in milliseconds since `origin`; 0 means no restriction
    deadline_ms: AtomicU64,
}

impl RateLimitGate {
    /// Creates an unrestricted gate.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            deadline_ms: AtomicU64::new(0),
        }
    }

    /// Returns the process-scoped gate.
    ///
    /// Every [`crate::message::Dispatcher`] built from settings shares this
    /// instance. Tests construct their own gates instead.
    #[must_use]
    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<RateLimitGate>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Self::new())))
    }

    /// Blocks all senders until `retry_after` from now.
    ///
    /// Overwrites any existing deadline, even a later one.
    pub fn hold_for(&self, retry_after: Duration) {
        let deadline = self.elapsed_ms().saturating_add(duration_ms(retry_after));
        self.deadline_ms.store(deadline, Ordering::SeqCst);
    }

    /// Time left until the deadline, zero when unrestricted.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        let deadline = self.deadline_ms.load(Ordering::SeqCst);
        Duration::from_millis(deadline.saturating_sub(self.elapsed_ms()))
    }

    /// Whether a send attempted now would have to wait.
    #[must_use]
    pub fn is_restricted(&self) -> bool {
        !self.remaining().is_zero()
    }

    /// Lifts any restriction.
    pub fn clear(&self) {
        self.deadline_ms.store(0, Ordering::SeqCst);
    }

    /// Sleeps past the deadline plus `margin` if the gate is restricted.
    ///
    /// Returns how long the caller was suspended.
    pub async fn wait_turn(&self, margin: Duration) -> Duration {
        let remaining = self.remaining();
        if remaining.is_zero() {
            return Duration::ZERO;
        }
        let wait = remaining + margin;
        debug!("Flood control active, waiting {}ms", wait.as_millis());
        sleep(wait).await;
        wait
    }

    fn elapsed_ms(&self) -> u64 {
        duration_ms(self.origin.elapsed())
    }
}

impl Default for RateLimitGate {
    fn default() -> Self {
        Self::new()
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_new_gate_is_unrestricted() {
        let gate = RateLimitGate::new();
        assert!(!gate.is_restricted());
        assert_eq!(gate.wait_turn(Duration::from_secs(1)).await, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hold_sets_deadline() {
        let gate = RateLimitGate::new();
        gate.hold_for(Duration::from_secs(5));
        assert_eq!(gate.remaining(), Duration::from_secs(5));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(gate.remaining(), Duration::from_secs(3));

        tokio::time::advance(Duration::from_secs(3)).await;
        assert!(!gate.is_restricted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_turn_adds_margin() {
        let gate = RateLimitGate::new();
        gate.hold_for(Duration::from_secs(5));

        let start = Instant::now();
        let waited = gate.wait_turn(Duration::from_secs(1)).await;

        assert_eq!(waited, Duration::from_secs(6));
        assert_eq!(start.elapsed(), Duration::from_secs(6));
        assert!(!gate.is_restricted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_writer_wins() {
        let gate = RateLimitGate::new();
        gate.hold_for(Duration::from_secs(30));
        gate.hold_for(Duration::from_secs(2));
        assert_eq!(gate.remaining(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_lifts_restriction() {
        let gate = RateLimitGate::new();
        gate.hold_for(Duration::from_secs(10));
        gate.clear();
        assert!(!gate.is_restricted());
    }

    #[test]
    fn test_global_is_shared() {
        let a = RateLimitGate::global();
        let b = RateLimitGate::global();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
