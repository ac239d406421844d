//! Chrome DevTools Protocol backend.
//!
//! Connects to a Chrome tab over the DevTools WebSocket and implements the
//! [`ComposerPage`] and [`TriggerControl`] seams on top of an injected page
//! helper: region tracking, editing commands, the floating trigger button,
//! and mutation/draft signals surfaced through `Runtime.bindingCalled`.
//!
//! [`ComposerPage`]: flourish_composer::page::ComposerPage
//! [`TriggerControl`]: flourish_controller::trigger::TriggerControl

mod client;
mod inject;
mod page;
mod protocol;
mod trigger;

pub use client::{CdpClient, CdpEvent};
pub use page::CdpPage;
pub use trigger::CdpTrigger;
