//! The orchestration event loop.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use flourish_composer::dom::ComposerHandle;
use flourish_composer::draft::{self, DraftSubscription};
use flourish_composer::locator::ComposerWatch;
use flourish_composer::mutator::RegionMutator;
use flourish_composer::page::ComposerPage;
use flourish_protocols::error::PageError;
use flourish_protocols::rewrite::{DEFAULT_MODE, RewriteRequest, RewriteService};

use crate::snapshot::{DraftSnapshot, Fingerprint};
use crate::state::AppState;
use crate::trigger::TriggerControl;

/// Inputs to the orchestrator's single logical thread of control.
#[derive(Debug, Clone)]
pub enum Event {
    /// The locator reported a different composer identity (or absence).
    ComposerChanged(Option<ComposerHandle>),
    /// The active composer's draft quieted after an edit burst.
    DraftChanged,
    /// The user activated the trigger control.
    TriggerClicked,
}

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Rewrite mode sent with every request.
    pub mode: String,
    /// Extra passthrough options (e.g. intensity).
    pub options: serde_json::Map<String, serde_json::Value>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            mode: DEFAULT_MODE.to_string(),
            options: serde_json::Map::new(),
        }
    }
}

/// Owns all mutable state and sequences capture → transform → verify →
/// replace.
///
/// State, active handle and the draft subscription are mutated only from
/// the event loop; no locks are involved. Failures never surface to the
/// user: every error path leaves the draft unchanged and re-evaluates
/// `Idle`/`Ready`.
pub struct Orchestrator {
    page: Arc<dyn ComposerPage>,
    trigger: Arc<dyn TriggerControl>,
    service: Arc<dyn RewriteService>,
    mutator: RegionMutator,
    config: OrchestratorConfig,

    state: AppState,
    handle: Option<ComposerHandle>,
    draft_sub: Option<DraftSubscription>,

    state_tx: watch::Sender<AppState>,
    draft_tx: mpsc::UnboundedSender<()>,
    draft_rx: Option<mpsc::UnboundedReceiver<()>>,
    events_tx: mpsc::UnboundedSender<Event>,
    events_rx: mpsc::UnboundedReceiver<Event>,
}

impl Orchestrator {
    pub fn new(
        page: Arc<dyn ComposerPage>,
        trigger: Arc<dyn TriggerControl>,
        service: Arc<dyn RewriteService>,
        config: OrchestratorConfig,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (draft_tx, draft_rx) = mpsc::unbounded_channel();
        let (state_tx, _) = watch::channel(AppState::NoComposer);
        Self {
            page,
            trigger,
            service,
            mutator: RegionMutator::new(),
            config,
            state: AppState::NoComposer,
            handle: None,
            draft_sub: None,
            state_tx,
            draft_tx,
            draft_rx: Some(draft_rx),
            events_tx,
            events_rx,
        }
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    /// Sender for feeding events from outside (watch tasks, embedding code).
    pub fn event_sender(&self) -> mpsc::UnboundedSender<Event> {
        self.events_tx.clone()
    }

    /// Observe state transitions; each actual change is reported once.
    pub fn state_watch(&self) -> watch::Receiver<AppState> {
        self.state_tx.subscribe()
    }

    /// Mount the trigger, wire up the composer watch and click stream, and
    /// process events until every external sender is gone.
    pub async fn run(mut self) -> Result<(), PageError> {
        self.trigger.mount().await?;

        let (click_tx, mut click_rx) = mpsc::unbounded_channel();
        self.trigger.on_click(click_tx).await?;
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            while click_rx.recv().await.is_some() {
                if events.send(Event::TriggerClicked).is_err() {
                    break;
                }
            }
        });

        let (composer_tx, mut composer_rx) = mpsc::unbounded_channel();
        let _watch = ComposerWatch::spawn(Arc::clone(&self.page), composer_tx);
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            while let Some(handle) = composer_rx.recv().await {
                if events.send(Event::ComposerChanged(handle)).is_err() {
                    break;
                }
            }
        });

        if let Some(mut draft_rx) = self.draft_rx.take() {
            let events = self.events_tx.clone();
            tokio::spawn(async move {
                while draft_rx.recv().await.is_some() {
                    if events.send(Event::DraftChanged).is_err() {
                        break;
                    }
                }
            });
        }

        info!("orchestrator running");
        while let Some(event) = self.events_rx.recv().await {
            self.handle_event(event).await;
        }
        Ok(())
    }

    /// Process one event. The only entry point that mutates state.
    pub async fn handle_event(&mut self, event: Event) {
        match event {
            Event::ComposerChanged(handle) => self.on_composer_changed(handle).await,
            Event::DraftChanged => self.evaluate_idle_ready().await,
            Event::TriggerClicked => self.on_trigger_clicked().await,
        }
    }

    async fn on_composer_changed(&mut self, handle: Option<ComposerHandle>) {
        // Release the previous subscription before attaching a new one so
        // handle churn never leaks listeners.
        self.draft_sub.take();
        self.handle = handle;

        if handle.is_none() {
            self.set_state(AppState::NoComposer).await;
            return;
        }

        self.draft_sub = Some(draft::subscribe(
            Arc::clone(&self.page),
            handle,
            self.draft_tx.clone(),
        ));
        self.evaluate_idle_ready().await;
    }

    async fn evaluate_idle_ready(&mut self) {
        if self.handle.is_none() {
            self.set_state(AppState::NoComposer).await;
            return;
        }
        let text = draft::read_text(&*self.page, self.handle).await;
        if text.trim().is_empty() {
            self.set_state(AppState::Idle).await;
        } else {
            self.set_state(AppState::Ready).await;
        }
    }

    async fn on_trigger_clicked(&mut self) {
        if self.state != AppState::Ready {
            debug!(state = %self.state, "trigger activated outside ready; ignoring");
            return;
        }
        let Some(captured) = self.handle else {
            return;
        };

        let original = draft::read_text(&*self.page, Some(captured)).await;
        let snapshot = DraftSnapshot::capture(original);
        debug!(len = snapshot.fingerprint.len, "rewrite requested");
        self.set_state(AppState::Busy).await;

        let service = Arc::clone(&self.service);
        let request = RewriteRequest {
            text: snapshot.text.clone(),
            mode: self.config.mode.clone(),
            options: self.config.options.clone(),
        };
        let mut call = Box::pin(async move { service.rewrite(request).await });

        // Keep absorbing composer/draft events while the call is in flight;
        // the handle-identity and fingerprint checks below depend on them
        // having been applied. Further clicks are ignored until this cycle
        // resolves.
        let result = loop {
            tokio::select! {
                result = &mut call => break result,
                event = self.events_rx.recv() => match event {
                    Some(Event::ComposerChanged(handle)) => self.on_composer_changed(handle).await,
                    Some(Event::DraftChanged) => self.evaluate_idle_ready().await,
                    Some(Event::TriggerClicked) => {
                        debug!("trigger activated during rewrite; ignoring");
                    }
                    None => {}
                },
            }
        };

        match result {
            Ok(response) => {
                if self.handle != Some(captured) {
                    warn!("composer changed during rewrite; dropping result");
                } else {
                    let current = draft::read_text(&*self.page, Some(captured)).await;
                    if Fingerprint::of(&current) != snapshot.fingerprint {
                        // User intent beats the stale rewrite.
                        warn!("draft edited during rewrite; dropping result");
                    } else if let Err(e) =
                        self.mutator.replace(&*self.page, captured, &response.text).await
                    {
                        warn!(error = %e, "write-back failed; draft left unchanged");
                    } else {
                        info!(len = response.text.len(), "rewrite applied");
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "rewrite failed; draft left unchanged");
            }
        }

        // Never stay stuck in Busy.
        self.evaluate_idle_ready().await;
    }

    async fn set_state(&mut self, next: AppState) {
        if next == self.state {
            return;
        }
        debug!(from = %self.state, to = %next, "state transition");
        self.state = next;
        let _ = self.state_tx.send(next);
        self.sync_trigger().await;
    }

    async fn sync_trigger(&self) {
        let outcome: Result<(), PageError> = match self.state {
            AppState::NoComposer | AppState::Idle => self.trigger.hide().await,
            AppState::Ready => {
                let anchor = match self.handle {
                    Some(handle) => self.page.anchor_rect(handle.id).await.ok().flatten(),
                    None => None,
                };
                let shown = self.trigger.show().await;
                let unbusied = self.trigger.set_busy(false).await;
                let positioned = self.trigger.position(anchor).await;
                shown.and(unbusied).and(positioned)
            }
            AppState::Busy => {
                let shown = self.trigger.show().await;
                let busied = self.trigger.set_busy(true).await;
                shown.and(busied)
            }
        };
        if let Err(e) = outcome {
            debug!(error = %e, "trigger sync failed");
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
