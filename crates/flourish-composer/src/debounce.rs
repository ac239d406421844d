//! Cancel-and-reschedule debounce primitive.

use std::time::Duration;

use tokio::task::JoinHandle;

/// Delays a notification until a burst of rapid signals has quieted.
///
/// Each [`poke`](Debouncer::poke) cancels any pending timer and starts a
/// fresh one, so only the final state after a burst is observed. Dropping
/// the debouncer cancels the pending timer.
pub struct Debouncer {
    window: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self { window, pending: None }
    }

    /// Schedule `callback` to run after the window, resetting any pending timer.
    pub fn poke<F>(&mut self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        let window = self.window;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            callback();
        }));
    }

    /// Cancel any pending timer without firing it.
    pub fn cancel(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
