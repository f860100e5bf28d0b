//! Trailing-edge debounce for search input.
//!
//! The debouncer owns at most one live timer. Each `on_change` aborts the
//! pending timer and arms a new one, so only the last value of a burst is
//! ever committed, once the input has been quiet for the full delay.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use log::{debug, warn};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::AbortHandle;
use tokio::time::{Instant, sleep_until};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

pub struct Debouncer<T> {
    delay: Duration,
    sink: UnboundedSender<T>,
    pending: Mutex<Option<AbortHandle>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration, sink: UnboundedSender<T>) -> Self {
        Self {
            delay,
            sink,
            pending: Mutex::new(None),
        }
    }

    /// Restarts the quiet window with `value` as the candidate.
    /// Must be called from within a Tokio runtime.
    pub fn on_change(&self, value: T) {
        let deadline = Instant::now() + self.delay;
        let sink = self.sink.clone();

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            previous.abort();
        }

        let handle = tokio::spawn(async move {
            sleep_until(deadline).await;
            if sink.send(value).is_err() {
                warn!("Debounced value dropped: receiver closed");
            }
        });
        debug!("Debounce timer armed for {:?}", self.delay);
        *pending = Some(handle.abort_handle());
    }

    /// Drops the pending value, if any, without committing it.
    pub fn cancel(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            previous.abort();
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        let pending = self.pending.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }
}
