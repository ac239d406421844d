//! The floating trigger control's command surface.
//!
//! The control has no independent logic: visibility, position and busy
//! visuals are driven entirely by orchestrator-issued commands.

use async_trait::async_trait;
use tokio::sync::mpsc;

use flourish_composer::dom::BoundingBox;
use flourish_protocols::error::PageError;

/// Gap between the trigger and the composer's top edge.
pub const ANCHOR_GAP: f64 = 8.0;
/// Minimum distance kept from the viewport's top/left edges.
pub const VIEWPORT_MARGIN: f64 = 8.0;

/// Compute the trigger's `(top, left)` for a composer anchor rect:
/// above the composer, right-aligned, clamped to stay within the viewport.
pub fn placement(anchor: &BoundingBox, trigger_width: f64, trigger_height: f64) -> (f64, f64) {
    let top = anchor.y - trigger_height - ANCHOR_GAP;
    let left = anchor.right() - trigger_width;
    (top.max(VIEWPORT_MARGIN), left.max(VIEWPORT_MARGIN))
}

/// Commands accepted by a trigger control implementation.
#[async_trait]
pub trait TriggerControl: Send + Sync {
    /// Create the control if absent. Idempotent; the control starts hidden.
    async fn mount(&self) -> Result<(), PageError>;

    async fn show(&self) -> Result<(), PageError>;

    async fn hide(&self) -> Result<(), PageError>;

    /// Toggle the disabled/loading visual.
    async fn set_busy(&self, busy: bool) -> Result<(), PageError>;

    /// Anchor the control to the given rect, or hide it when `None`.
    async fn position(&self, anchor: Option<BoundingBox>) -> Result<(), PageError>;

    /// Register the single click sink. Later registrations replace it.
    async fn on_click(&self, clicks: mpsc::UnboundedSender<()>) -> Result<(), PageError>;
}
