//! Process-wide rate-limit cooldown gate
//!
//! Avature throttles by IP, not by connection, so a rate-limit response seen
//! by one worker means every worker must pause. The gate is a single shared
//! deadline: `trigger_cooldown` pushes it forward, `wait_if_cooling_down`
//! blocks the calling task until the deadline has passed.
//!
//! The gate is cloneable and all clones share state; one instance is created
//! per scraper and handed to every fetch call.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Shared cooldown gate for all fetch workers
///
/// Internally a mutex-guarded `Option<Instant>`. The deadline is
/// last-writer-wins: each trigger sets `now + duration` from its own
/// perception of now, it does not add to the previous deadline. The lock is
/// only held to read or write the deadline, never across a sleep.
#[derive(Clone, Debug, Default)]
pub struct RateLimitGate {
    cooldown_until: Arc<Mutex<Option<Instant>>>,
}

impl RateLimitGate {
    /// Create a gate with no active cooldown
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Block the calling task until any active cooldown has expired.
    ///
    /// Re-checks the deadline after sleeping: if another worker extended the
    /// cooldown while this one was waiting, it keeps waiting until the
    /// freshest deadline has passed.
    pub async fn wait_if_cooling_down(&self) {
        loop {
            let wait = self.remaining();
            let Some(wait) = wait else { return };
            if wait.is_zero() {
                return;
            }
            tracing::info!(
                wait_secs = wait.as_secs(),
                "waiting for global rate limit cooldown"
            );
            tokio::time::sleep(wait).await;
        }
    }

    /// Start (or extend) the shared cooldown.
    ///
    /// Safe to call from any number of concurrent workers; every worker
    /// currently or subsequently waiting on the gate observes the new
    /// deadline. There is no single-worker variant.
    pub fn trigger_cooldown(&self, duration: Duration) {
        let deadline = Instant::now() + duration;
        let mut until = self.lock();
        *until = Some(deadline);
    }

    /// Whether a cooldown is currently active
    pub fn cooling_down(&self) -> bool {
        self.remaining().is_some_and(|d| !d.is_zero())
    }

    /// Time left on the current cooldown, if one was ever triggered
    fn remaining(&self) -> Option<Duration> {
        let until = self.lock();
        until.map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Instant>> {
        // A poisoned lock only happens if a holder panicked while setting a
        // plain Option; the value is still usable.
        match self.cooldown_until.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
