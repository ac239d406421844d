//! Draft access: normalized reads and debounced change subscription.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::debounce::Debouncer;
use crate::dom::ComposerHandle;
use crate::page::ComposerPage;

/// Debounce window for draft-change notification (clamped range 100-200 ms).
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(150);

/// Normalize user-visible text: non-breaking spaces become regular spaces.
pub fn normalize(text: &str) -> String {
    text.replace('\u{a0}', " ")
}

/// Read a handle's normalized draft text. Never fails: an absent handle or a
/// vanished region reads as empty.
pub async fn read_text(page: &dyn ComposerPage, handle: Option<ComposerHandle>) -> String {
    let Some(handle) = handle else {
        return String::new();
    };
    match page.read_text(handle.id).await {
        Ok(text) => normalize(&text),
        Err(e) => {
            debug!(handle = %handle.id, error = %e, "draft read failed; treating as empty");
            String::new()
        }
    }
}

/// Guard for an active draft-change subscription.
///
/// Dropping it cancels any pending debounce timer and detaches from the
/// signal stream.
pub struct DraftSubscription {
    task: Option<JoinHandle<()>>,
}

impl DraftSubscription {
    /// Inert guard for the absent-handle case.
    pub fn noop() -> Self {
        Self { task: None }
    }
}

impl Drop for DraftSubscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Subscribe to draft changes on `handle`.
///
/// Listens for input, key-release and paste signals and sends one `()` on
/// `notify` per quieted burst, debounced by [`DEBOUNCE_WINDOW`] from the
/// last signal. An absent handle yields a no-op guard.
pub fn subscribe(
    page: Arc<dyn ComposerPage>,
    handle: Option<ComposerHandle>,
    notify: mpsc::UnboundedSender<()>,
) -> DraftSubscription {
    let Some(handle) = handle else {
        return DraftSubscription::noop();
    };
    let mut signals = page.draft_signals();
    let task = tokio::spawn(async move {
        let mut debouncer = Debouncer::new(DEBOUNCE_WINDOW);
        loop {
            match signals.recv().await {
                Ok(signal) if signal.region == handle.id => {
                    let notify = notify.clone();
                    debouncer.poke(move || {
                        let _ = notify.send(());
                    });
                }
                Ok(_) => {}
                // A lagged burst still ends with a fresh signal or a quiet
                // period; reschedule so the final state gets reported.
                Err(RecvError::Lagged(_)) => {
                    let notify = notify.clone();
                    debouncer.poke(move || {
                        let _ = notify.send(());
                    });
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
    DraftSubscription { task: Some(task) }
}

#[cfg(test)]
#[path = "draft_tests.rs"]
mod tests;
