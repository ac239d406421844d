//! # Flourish Composer
//!
//! Everything that touches the editable chat composer:
//! - [`dom`]: region snapshot model (geometry, visibility, accessibility hints)
//! - [`locator`]: conservative composer selection plus change watching
//! - [`draft`]: normalized draft reads and debounced change subscription
//! - [`mutator`]: the multi-stage write-back strategy chain
//! - [`page`]: the `ComposerPage` trait all of the above is written against
//!
//! The page trait is the single seam to a concrete browser backend; the
//! heuristics themselves are pure over snapshots so they can be exercised
//! against the scripted [`testing::FakePage`].

pub mod debounce;
pub mod dom;
pub mod draft;
pub mod locator;
pub mod mutator;
pub mod page;
pub mod testing;

pub use dom::{BoundingBox, ComposerHandle, EditableRegion, PageSnapshot, RegionId, Viewport};
pub use draft::{DraftSubscription, read_text, subscribe};
pub use locator::{ComposerWatch, select_composer};
pub use mutator::{RegionMutator, ReplaceStrategy};
pub use page::{ComposerPage, DraftSignal, SignalKind};
