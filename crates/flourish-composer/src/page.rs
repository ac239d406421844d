//! The composer page seam.

use async_trait::async_trait;
use tokio::sync::broadcast;

use flourish_protocols::error::PageError;

use crate::dom::{BoundingBox, PageSnapshot, RegionId};

/// Physical signal classes observed on an editable region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Input,
    KeyUp,
    Paste,
}

/// One draft-edit signal, tagged with the region it fired on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DraftSignal {
    pub region: RegionId,
    pub kind: SignalKind,
}

/// A live page holding editable regions.
///
/// The production implementation drives a real browser tab over CDP; tests
/// use [`crate::testing::FakePage`]. Editing commands go through the same
/// event surface a user would trigger, so that framework-managed composers
/// observe them as real edits.
#[async_trait]
pub trait ComposerPage: Send + Sync {
    /// Enumerate all directly-editable regions and the current viewport.
    async fn snapshot(&self) -> Result<PageSnapshot, PageError>;

    /// User-visible text of a region, un-normalized.
    async fn read_text(&self, region: RegionId) -> Result<String, PageError>;

    /// Acquire input focus.
    async fn focus(&self, region: RegionId) -> Result<(), PageError>;

    /// Issue a "select all" editing command.
    async fn exec_select_all(&self, region: RegionId) -> Result<(), PageError>;

    /// Issue a "delete" editing command against the current selection.
    async fn exec_delete(&self, region: RegionId) -> Result<(), PageError>;

    /// Issue an "insert text" editing command at the cursor.
    async fn exec_insert_text(&self, region: RegionId, text: &str) -> Result<(), PageError>;

    /// Synthesize a paste carrying `text` as a plain-text clipboard payload.
    async fn dispatch_paste(&self, region: RegionId, text: &str) -> Result<(), PageError>;

    /// Dispatch one generic "input changed" notification.
    async fn dispatch_input(&self, region: RegionId) -> Result<(), PageError>;

    /// Last-resort direct overwrite of the region's content.
    async fn set_text_direct(&self, region: RegionId, text: &str) -> Result<(), PageError>;

    /// Collapse the text cursor/selection to the end of the region.
    async fn collapse_selection_to_end(&self, region: RegionId) -> Result<(), PageError>;

    /// Bounding rect for anchoring UI, `None` when degenerate or gone.
    async fn anchor_rect(&self, region: RegionId) -> Result<Option<BoundingBox>, PageError>;

    /// Structural-mutation ticks (subtree + child-list granularity).
    ///
    /// May fire at unbounded frequency; consumers must be idempotent.
    fn structural_mutations(&self) -> broadcast::Receiver<()>;

    /// Draft-edit signals for all regions; consumers filter by region id.
    fn draft_signals(&self) -> broadcast::Receiver<DraftSignal>;
}
