//! # Flourish Controller
//!
//! Owns all mutable application state and sequences the
//! capture → transform → verify → replace flow:
//! - [`state`]: the four-state application state machine
//! - [`snapshot`]: draft fingerprinting for race detection
//! - [`trigger`]: the command surface of the floating trigger control
//! - [`orchestrator`]: composes locator, draft accessor, mutator and the
//!   rewrite service into one single-threaded event loop

pub mod orchestrator;
pub mod snapshot;
pub mod state;
pub mod testing;
pub mod trigger;

pub use orchestrator::{Event, Orchestrator, OrchestratorConfig};
pub use snapshot::{DraftSnapshot, Fingerprint};
pub use state::AppState;
pub use trigger::TriggerControl;
