//! Scripted trigger and rewrite-service doubles for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{Notify, mpsc};

use flourish_composer::dom::BoundingBox;
use flourish_protocols::error::{PageError, RewriteError};
use flourish_protocols::rewrite::{RewriteRequest, RewriteResponse, RewriteService};

use crate::trigger::TriggerControl;

#[derive(Default)]
struct TriggerState {
    mounted: bool,
    visible: bool,
    busy: bool,
    last_anchor: Option<BoundingBox>,
    clicks: Option<mpsc::UnboundedSender<()>>,
}

/// Recording [`TriggerControl`] double.
#[derive(Default)]
pub struct FakeTrigger {
    state: Mutex<TriggerState>,
}

impl FakeTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a user click on the control.
    pub fn click(&self) {
        let state = self.state.lock();
        if let Some(clicks) = &state.clicks {
            let _ = clicks.send(());
        }
    }

    pub fn visible(&self) -> bool {
        self.state.lock().visible
    }

    pub fn busy(&self) -> bool {
        self.state.lock().busy
    }

    pub fn mounted(&self) -> bool {
        self.state.lock().mounted
    }

    pub fn last_anchor(&self) -> Option<BoundingBox> {
        self.state.lock().last_anchor
    }
}

#[async_trait]
impl TriggerControl for FakeTrigger {
    async fn mount(&self) -> Result<(), PageError> {
        let mut state = self.state.lock();
        state.mounted = true;
        state.visible = false;
        Ok(())
    }

    async fn show(&self) -> Result<(), PageError> {
        self.state.lock().visible = true;
        Ok(())
    }

    async fn hide(&self) -> Result<(), PageError> {
        self.state.lock().visible = false;
        Ok(())
    }

    async fn set_busy(&self, busy: bool) -> Result<(), PageError> {
        self.state.lock().busy = busy;
        Ok(())
    }

    async fn position(&self, anchor: Option<BoundingBox>) -> Result<(), PageError> {
        let mut state = self.state.lock();
        state.last_anchor = anchor;
        if anchor.is_none() {
            state.visible = false;
        }
        Ok(())
    }

    async fn on_click(&self, clicks: mpsc::UnboundedSender<()>) -> Result<(), PageError> {
        self.state.lock().clicks = Some(clicks);
        Ok(())
    }
}

#[derive(Default)]
struct ServiceState {
    script: VecDeque<Result<String, RewriteError>>,
    requests: Vec<RewriteRequest>,
}

/// Scripted [`RewriteService`].
///
/// Unscripted calls echo back `"Hark! {text}"`. With [`gate`](Self::gate)
/// set, each call blocks until [`release`](Self::release), letting tests
/// interleave events with an in-flight rewrite.
#[derive(Default)]
pub struct FakeRewriteService {
    state: Mutex<ServiceState>,
    gated: AtomicBool,
    gate: Notify,
}

impl FakeRewriteService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue_ok(&self, text: impl Into<String>) {
        self.state.lock().script.push_back(Ok(text.into()));
    }

    pub fn enqueue_err(&self, error: RewriteError) {
        self.state.lock().script.push_back(Err(error));
    }

    /// Block subsequent calls until released.
    pub fn gate(&self) {
        self.gated.store(true, Ordering::SeqCst);
    }

    /// Let one gated call proceed.
    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn requests(&self) -> Vec<RewriteRequest> {
        self.state.lock().requests.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().requests.len()
    }
}

#[async_trait]
impl RewriteService for FakeRewriteService {
    async fn rewrite(&self, request: RewriteRequest) -> Result<RewriteResponse, RewriteError> {
        let echo = format!("Hark! {}", request.text);
        self.state.lock().requests.push(request);
        if self.gated.load(Ordering::SeqCst) {
            self.gate.notified().await;
        }
        match self.state.lock().script.pop_front() {
            Some(Ok(text)) => Ok(RewriteResponse { text }),
            Some(Err(error)) => Err(error),
            None => Ok(RewriteResponse { text: echo }),
        }
    }
}
