//! Region write-back.
//!
//! A managed composer cannot be overwritten in place: the host framework
//! intercepts structured edit operations and reconciles its own state from
//! them, so a raw content assignment produces visible/input desync. The
//! mutator therefore simulates what a user would do (clear via editing
//! commands, paste the replacement) and only falls back to a direct
//! overwrite when that whole path errors.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use flourish_protocols::error::PageError;

use crate::dom::{ComposerHandle, RegionId};
use crate::page::ComposerPage;

/// Pause letting the host reconcile the cleared state before injection;
/// immediate injection can be silently dropped by state-managed hosts.
pub const SETTLE_DELAY: Duration = Duration::from_millis(30);

/// One way of making a region's content become exactly `text`.
#[async_trait]
pub trait ReplaceStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn apply(
        &self,
        page: &dyn ComposerPage,
        region: RegionId,
        text: &str,
    ) -> Result<(), PageError>;
}

/// Clear through editing commands, then inject via a synthetic paste.
///
/// Steps: focus, select-all + delete, settle, paste; if the paste was
/// swallowed (region still blank) fall back to an insert-text command;
/// finish with one generic input notification so host-side bindings
/// recompute from the new state.
pub struct SimulatedPaste;

#[async_trait]
impl ReplaceStrategy for SimulatedPaste {
    fn name(&self) -> &'static str {
        "simulated-paste"
    }

    async fn apply(
        &self,
        page: &dyn ComposerPage,
        region: RegionId,
        text: &str,
    ) -> Result<(), PageError> {
        page.focus(region).await?;
        page.exec_select_all(region).await?;
        page.exec_delete(region).await?;
        tokio::time::sleep(SETTLE_DELAY).await;
        page.dispatch_paste(region, text).await?;

        let current = page.read_text(region).await?;
        if current.trim().is_empty() {
            debug!(region = %region, "paste swallowed by host; using insert-text command");
            page.exec_insert_text(region, text).await?;
        }

        page.dispatch_input(region).await?;
        Ok(())
    }
}

/// Last-resort direct overwrite. Guarantees visible correctness but may not
/// satisfy host-internal consistency.
pub struct DirectOverwrite;

#[async_trait]
impl ReplaceStrategy for DirectOverwrite {
    fn name(&self) -> &'static str {
        "direct-overwrite"
    }

    async fn apply(
        &self,
        page: &dyn ComposerPage,
        region: RegionId,
        text: &str,
    ) -> Result<(), PageError> {
        page.set_text_direct(region, text).await?;
        page.dispatch_input(region).await?;
        Ok(())
    }
}

/// Ordered strategy chain; the first strategy to succeed wins.
pub struct RegionMutator {
    strategies: Vec<Box<dyn ReplaceStrategy>>,
}

impl Default for RegionMutator {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionMutator {
    pub fn new() -> Self {
        Self::with_strategies(vec![Box::new(SimulatedPaste), Box::new(DirectOverwrite)])
    }

    pub fn with_strategies(strategies: Vec<Box<dyn ReplaceStrategy>>) -> Self {
        Self { strategies }
    }

    /// Replace the region's content with exactly `text`.
    ///
    /// Regardless of which strategy applied, the cursor is collapsed to the
    /// end of the content afterwards; a failure there is non-fatal.
    pub async fn replace(
        &self,
        page: &dyn ComposerPage,
        handle: ComposerHandle,
        text: &str,
    ) -> Result<(), PageError> {
        let mut last_error = None;
        for strategy in &self.strategies {
            match strategy.apply(page, handle.id, text).await {
                Ok(()) => {
                    if let Err(e) = page.collapse_selection_to_end(handle.id).await {
                        debug!(handle = %handle.id, error = %e, "cursor collapse failed; ignoring");
                    }
                    return Ok(());
                }
                Err(e) => {
                    warn!(strategy = strategy.name(), error = %e, "replace strategy failed");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error
            .unwrap_or_else(|| PageError::Script("no replace strategies configured".to_string())))
    }
}

#[cfg(test)]
#[path = "mutator_tests.rs"]
mod tests;
