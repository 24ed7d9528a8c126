use std::time::Duration;

use tokio::time::{sleep_until, Instant};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Holds the most recent value until no new value has arrived for `delay`.
#[derive(Debug)]
pub struct Debounced<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debounced<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replaces any pending value and restarts the idle window.
    pub fn push(&mut self, value: T) {
        self.pending = Some((value, Instant::now() + self.delay));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    /// Takes the pending value once its idle window has elapsed.
    pub fn poll_ready(&mut self) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if *deadline <= Instant::now() => {
                self.pending.take().map(|(value, _)| value)
            }
            _ => None,
        }
    }

    /// Takes the pending value immediately.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    /// Waits out the idle window and yields the value. `None` if nothing was pushed.
    pub async fn settled(&mut self) -> Option<T> {
        let deadline = self.deadline()?;
        sleep_until(deadline).await;
        self.flush()
    }
}

impl<T> Default for Debounced<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

#[cfg(test)]
#[path = "tests/debounce_tests.rs"]
mod tests;
