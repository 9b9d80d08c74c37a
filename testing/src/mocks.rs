//! Mock implementations of the injected collaborators.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::expect_used)]
#![allow(clippy::missing_panics_doc)]

use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use vibe_core::{Clock, ConfirmationEmail, ReservationNotifier, VibeError};

/// Fixed clock for deterministic tests
///
/// Always returns the same time, making tests reproducible.
///
/// # Example
///
/// ```
/// use vibe_testing::mocks::FixedClock;
/// use vibe_core::Clock;
/// use chrono::Utc;
///
/// let clock = FixedClock::new(Utc::now());
/// let time1 = clock.now();
/// let time2 = clock.now();
/// assert_eq!(time1, time2); // Always the same!
/// ```
#[derive(Debug, Clone)]
pub struct FixedClock {
    time: DateTime<Utc>,
}

impl FixedClock {
    /// Create a new fixed clock with the given time
    #[must_use]
    pub const fn new(time: DateTime<Utc>) -> Self {
        Self { time }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.time
    }
}

/// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
///
/// # Panics
///
/// Never panics in practice - the hardcoded timestamp is always valid.
#[must_use]
pub fn test_clock() -> FixedClock {
    FixedClock::new(
        DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .expect("hardcoded timestamp should always parse")
            .with_timezone(&Utc),
    )
}

/// Notifier that records every confirmation it is asked to send.
///
/// Delivery happens on a spawned task, so tests wait with
/// [`RecordingNotifier::wait_for`] instead of asserting immediately.
#[derive(Clone, Debug, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<ConfirmationEmail>>>,
    notify: Arc<Notify>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything sent so far.
    #[must_use]
    pub fn sent(&self) -> Vec<ConfirmationEmail> {
        self.sent.lock().unwrap().clone()
    }

    /// Wait until at least `count` confirmations were recorded, or `timeout`
    /// elapses. Returns what was recorded.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> Vec<ConfirmationEmail> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notified = self.notify.notified();
            let sent = self.sent();
            if sent.len() >= count {
                return sent;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.sent();
            }
        }
    }
}

impl ReservationNotifier for RecordingNotifier {
    fn send_confirmation(
        &self,
        email: ConfirmationEmail,
    ) -> Pin<Box<dyn Future<Output = vibe_core::Result<()>> + Send + '_>> {
        Box::pin(async move {
            self.sent.lock().unwrap().push(email);
            self.notify.notify_waiters();
            Ok(())
        })
    }
}

/// Notifier whose delivery always fails.
#[derive(Clone, Debug, Default)]
pub struct FailingNotifier {
    attempts: Arc<Mutex<usize>>,
    notify: Arc<Notify>,
}

impl FailingNotifier {
    /// Create a failing notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivery attempts so far.
    #[must_use]
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }

    /// Wait until at least `count` attempts were made, or `timeout` elapses.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> usize {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notified = self.notify.notified();
            let attempts = self.attempts();
            if attempts >= count {
                return attempts;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.attempts();
            }
        }
    }
}

impl ReservationNotifier for FailingNotifier {
    fn send_confirmation(
        &self,
        _email: ConfirmationEmail,
    ) -> Pin<Box<dyn Future<Output = vibe_core::Result<()>> + Send + '_>> {
        Box::pin(async move {
            *self.attempts.lock().unwrap() += 1;
            self.notify.notify_waiters();
            Err(VibeError::Notification("smtp relay refused connection".to_string()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
    }
}
