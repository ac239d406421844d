//! Application states.

/// The orchestrator's state. Exactly one instance per orchestrator.
///
/// Allowed transitions: `NoComposer → {Idle, Ready}`, `Idle ↔ Ready`,
/// `Ready → Busy`, `Busy → {Idle, Ready, NoComposer}`. There is no terminal
/// state; the process is long-running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// No composer could be confidently located.
    NoComposer,
    /// Composer present, draft empty.
    Idle,
    /// Composer present, draft non-empty; the trigger is offered.
    Ready,
    /// A rewrite is in flight.
    Busy,
}

impl std::fmt::Display for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AppState::NoComposer => "no-composer",
            AppState::Idle => "idle",
            AppState::Ready => "ready",
            AppState::Busy => "busy",
        };
        f.write_str(name)
    }
}

impl AppState {
    /// The trigger control is visible iff the state is `Ready` or `Busy`.
    pub fn trigger_visible(&self) -> bool {
        matches!(self, AppState::Ready | AppState::Busy)
    }
}
