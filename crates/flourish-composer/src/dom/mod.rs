//! Editable-region snapshot model.

mod geometry;
mod region;

pub use geometry::{BoundingBox, Viewport};
pub use region::{ComposerHandle, EditableRegion, PageSnapshot, RegionId};
