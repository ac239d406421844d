//! Error types for the Flourish protocol layer.

mod page;
mod rewrite;

pub use page::*;
pub use rewrite::*;
