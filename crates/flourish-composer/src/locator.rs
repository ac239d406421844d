//! Composer location: conservative candidate selection and change watching.

use std::cmp::Ordering;
use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::dom::{ComposerHandle, EditableRegion, PageSnapshot, RegionId};
use crate::page::ComposerPage;

/// Minimum rendered width for a plausible composer.
const MIN_WIDTH: f64 = 200.0;
/// Minimum rendered height for a plausible composer.
const MIN_HEIGHT: f64 = 20.0;
/// How much lower the lowest candidate must sit than the runner-up to win
/// the positional tie-break.
const BOTTOM_CLEARANCE: f64 = 50.0;
/// Locale-specific accessible-label hint, matched case-insensitively.
const LABEL_HINT: &str = "type a message";

fn is_plausible(region: &EditableRegion, viewport_midline: f64) -> bool {
    region.visible
        && region.bounds.width > MIN_WIDTH
        && region.bounds.height > MIN_HEIGHT
        && region.bounds.bottom() > viewport_midline
}

fn is_primary(region: &EditableRegion) -> bool {
    if region.role.as_deref() == Some("textbox") {
        return true;
    }
    region
        .aria_label
        .as_deref()
        .is_some_and(|label| label.to_lowercase().contains(LABEL_HINT))
}

/// Select the message composer among ambiguous editable regions.
///
/// Layered heuristics, resolved conservatively: a region is returned only
/// when the rules converge on exactly one. Anything ambiguous yields `None`
/// (fail closed; never guess).
pub fn select_composer(snapshot: &PageSnapshot) -> Option<RegionId> {
    let midline = snapshot.viewport.height / 2.0;
    let mut plausible: Vec<&EditableRegion> = snapshot
        .regions
        .iter()
        .filter(|r| is_plausible(r, midline))
        .collect();

    match plausible.len() {
        0 => return None,
        1 => return Some(plausible[0].id),
        _ => {}
    }

    // Accessibility pass: role="textbox" or the "type a message" label hint.
    let primary: Vec<&&EditableRegion> = plausible.iter().filter(|r| is_primary(r)).collect();
    if primary.len() == 1 {
        return Some(primary[0].id);
    }

    // Positional tie-break: the lowest candidate wins only with clear margin
    // below the runner-up (e.g. a composer floating under a toolbar row).
    plausible.sort_by(|a, b| {
        b.bounds
            .bottom()
            .partial_cmp(&a.bounds.bottom())
            .unwrap_or(Ordering::Equal)
    });
    let lowest = plausible[0];
    let second = plausible[1];
    if lowest.bounds.bottom() - second.bounds.bottom() > BOTTOM_CLEARANCE {
        return Some(lowest.id);
    }

    None
}

/// Watches a page for composer changes.
///
/// Re-runs [`select_composer`] on every structural-mutation tick and reports
/// through the channel only when the resulting identity differs from the
/// previously reported one, so redundant ticks never re-notify. An initial
/// locate fires on startup before any mutation arrives.
pub struct ComposerWatch {
    task: JoinHandle<()>,
}

impl ComposerWatch {
    pub fn spawn(
        page: Arc<dyn ComposerPage>,
        tx: mpsc::UnboundedSender<Option<ComposerHandle>>,
    ) -> Self {
        let mut mutations = page.structural_mutations();
        let task = tokio::spawn(async move {
            let mut last: Option<Option<ComposerHandle>> = None;
            if !Self::tick(&page, &mut last, &tx).await {
                return;
            }
            loop {
                match mutations.recv().await {
                    // Lagged ticks coalesce; relocating once covers them all.
                    Ok(()) | Err(RecvError::Lagged(_)) => {
                        if !Self::tick(&page, &mut last, &tx).await {
                            break;
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!("composer watch stopped");
        });
        Self { task }
    }

    /// Returns false once the receiving side is gone.
    async fn tick(
        page: &Arc<dyn ComposerPage>,
        last: &mut Option<Option<ComposerHandle>>,
        tx: &mpsc::UnboundedSender<Option<ComposerHandle>>,
    ) -> bool {
        let current = match page.snapshot().await {
            Ok(snapshot) => select_composer(&snapshot).map(ComposerHandle::new),
            Err(e) => {
                debug!(error = %e, "composer snapshot failed; treating as no composer");
                None
            }
        };
        if last.as_ref() == Some(&current) {
            trace!("composer unchanged");
            return true;
        }
        *last = Some(current);
        debug!(handle = ?current, "composer changed");
        tx.send(current).is_ok()
    }
}

impl Drop for ComposerWatch {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
#[path = "locator_tests.rs"]
mod tests;
