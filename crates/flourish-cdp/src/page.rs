//! [`ComposerPage`] over a CDP-attached tab.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use flourish_composer::dom::{BoundingBox, PageSnapshot, RegionId};
use flourish_composer::page::{ComposerPage, DraftSignal, SignalKind};
use flourish_protocols::error::PageError;

use crate::client::{CdpClient, CdpEvent};
use crate::inject::{BINDING_NAME, PAGE_HELPER_JS, js_string};

const MUTATION_CHANNEL_CAPACITY: usize = 64;
const SIGNAL_CHANNEL_CAPACITY: usize = 64;

/// Payloads arriving through the page binding.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum EmitPayload {
    Mutation,
    Signal { region: u64, signal: String },
    Click,
}

/// A Chrome tab exposed as a composer page.
pub struct CdpPage {
    client: Arc<CdpClient>,
    mutations_tx: broadcast::Sender<()>,
    signals_tx: broadcast::Sender<DraftSignal>,
    forward_task: tokio::task::JoinHandle<()>,
}

impl CdpPage {
    /// Set up the page helper in the attached tab and start forwarding its
    /// mutation/signal reports.
    pub async fn attach(client: Arc<CdpClient>) -> Result<Self, PageError> {
        client.call("Runtime.enable", None).await?;
        client.call("Page.enable", None).await?;
        client
            .call("Runtime.addBinding", Some(json!({"name": BINDING_NAME})))
            .await?;
        // Survive in-tab navigations; also install into the live document.
        client
            .call(
                "Page.addScriptToEvaluateOnNewDocument",
                Some(json!({"source": PAGE_HELPER_JS})),
            )
            .await?;

        let (mutations_tx, _) = broadcast::channel(MUTATION_CHANNEL_CAPACITY);
        let (signals_tx, _) = broadcast::channel(SIGNAL_CHANNEL_CAPACITY);

        let forward_task = {
            let events = client.events();
            let mutations_tx = mutations_tx.clone();
            let signals_tx = signals_tx.clone();
            tokio::spawn(async move {
                Self::forward_loop(events, mutations_tx, signals_tx).await;
            })
        };

        client.evaluate(PAGE_HELPER_JS).await?;
        debug!(url = client.page_url(), "page helper installed");

        Ok(Self {
            client,
            mutations_tx,
            signals_tx,
            forward_task,
        })
    }

    async fn forward_loop(
        mut events: broadcast::Receiver<CdpEvent>,
        mutations_tx: broadcast::Sender<()>,
        signals_tx: broadcast::Sender<DraftSignal>,
    ) {
        loop {
            let event = match events.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "lagging behind CDP events");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };

            let Some(payload) = binding_payload(&event) else {
                continue;
            };
            match payload {
                EmitPayload::Mutation => {
                    let _ = mutations_tx.send(());
                }
                EmitPayload::Signal { region, signal } => {
                    let Some(kind) = signal_kind(&signal) else {
                        warn!(signal, "unknown draft signal");
                        continue;
                    };
                    let _ = signals_tx.send(DraftSignal {
                        region: RegionId(region),
                        kind,
                    });
                }
                EmitPayload::Click => {}
            }
        }
    }

    /// Evaluate a helper call that returns `null` when the region is gone.
    async fn eval_region(&self, region: RegionId, expression: String) -> Result<Value, PageError> {
        let value = self.client.evaluate(&expression).await?;
        if value.is_null() {
            return Err(PageError::RegionGone(region.0));
        }
        Ok(value)
    }
}

fn binding_payload(event: &CdpEvent) -> Option<EmitPayload> {
    if event.method != "Runtime.bindingCalled" {
        return None;
    }
    if event.params["name"].as_str() != Some(BINDING_NAME) {
        return None;
    }
    let payload = event.params["payload"].as_str()?;
    serde_json::from_str(payload).ok()
}

fn signal_kind(signal: &str) -> Option<SignalKind> {
    match signal {
        "input" => Some(SignalKind::Input),
        "keyup" => Some(SignalKind::KeyUp),
        "paste" => Some(SignalKind::Paste),
        _ => None,
    }
}

#[async_trait]
impl ComposerPage for CdpPage {
    async fn snapshot(&self) -> Result<PageSnapshot, PageError> {
        let value = self.client.evaluate("window.__flourish.snapshot()").await?;
        let snapshot: PageSnapshot = serde_json::from_value(value)?;
        Ok(snapshot)
    }

    async fn read_text(&self, region: RegionId) -> Result<String, PageError> {
        let value = self
            .eval_region(region, format!("window.__flourish.readText({})", region.0))
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn focus(&self, region: RegionId) -> Result<(), PageError> {
        self.eval_region(region, format!("window.__flourish.focus({})", region.0))
            .await?;
        Ok(())
    }

    async fn exec_select_all(&self, region: RegionId) -> Result<(), PageError> {
        self.eval_region(
            region,
            format!("window.__flourish.execCommand({}, 'selectAll')", region.0),
        )
        .await?;
        Ok(())
    }

    async fn exec_delete(&self, region: RegionId) -> Result<(), PageError> {
        self.eval_region(
            region,
            format!("window.__flourish.execCommand({}, 'delete')", region.0),
        )
        .await?;
        Ok(())
    }

    async fn exec_insert_text(&self, region: RegionId, text: &str) -> Result<(), PageError> {
        self.eval_region(
            region,
            format!(
                "window.__flourish.execCommand({}, 'insertText', {})",
                region.0,
                js_string(text)
            ),
        )
        .await?;
        Ok(())
    }

    async fn dispatch_paste(&self, region: RegionId, text: &str) -> Result<(), PageError> {
        self.eval_region(
            region,
            format!("window.__flourish.paste({}, {})", region.0, js_string(text)),
        )
        .await?;
        Ok(())
    }

    async fn dispatch_input(&self, region: RegionId) -> Result<(), PageError> {
        self.eval_region(region, format!("window.__flourish.input({})", region.0))
            .await?;
        Ok(())
    }

    async fn set_text_direct(&self, region: RegionId, text: &str) -> Result<(), PageError> {
        self.eval_region(
            region,
            format!("window.__flourish.setText({}, {})", region.0, js_string(text)),
        )
        .await?;
        Ok(())
    }

    async fn collapse_selection_to_end(&self, region: RegionId) -> Result<(), PageError> {
        self.eval_region(region, format!("window.__flourish.collapseEnd({})", region.0))
            .await?;
        Ok(())
    }

    async fn anchor_rect(&self, region: RegionId) -> Result<Option<BoundingBox>, PageError> {
        // Null covers both a gone region and a degenerate rect.
        let value = self
            .client
            .evaluate(&format!("window.__flourish.anchorRect({})", region.0))
            .await?;
        if value.is_null() {
            return Ok(None);
        }
        let rect: BoundingBox = serde_json::from_value(value)?;
        Ok(Some(rect))
    }

    fn structural_mutations(&self) -> broadcast::Receiver<()> {
        self.mutations_tx.subscribe()
    }

    fn draft_signals(&self) -> broadcast::Receiver<DraftSignal> {
        self.signals_tx.subscribe()
    }
}

impl Drop for CdpPage {
    fn drop(&mut self) {
        self.forward_task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding_event(payload: &str) -> CdpEvent {
        CdpEvent {
            method: "Runtime.bindingCalled".to_string(),
            params: json!({"name": BINDING_NAME, "payload": payload}),
        }
    }

    #[test]
    fn test_mutation_payload_parse() {
        let payload = binding_payload(&binding_event(r#"{"kind":"mutation"}"#));
        assert!(matches!(payload, Some(EmitPayload::Mutation)));
    }

    #[test]
    fn test_signal_payload_parse() {
        let payload =
            binding_payload(&binding_event(r#"{"kind":"signal","region":3,"signal":"keyup"}"#));
        match payload {
            Some(EmitPayload::Signal { region, signal }) => {
                assert_eq!(region, 3);
                assert_eq!(signal_kind(&signal), Some(SignalKind::KeyUp));
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn test_foreign_binding_ignored() {
        let event = CdpEvent {
            method: "Runtime.bindingCalled".to_string(),
            params: json!({"name": "somethingElse", "payload": r#"{"kind":"mutation"}"#}),
        };
        assert!(binding_payload(&event).is_none());
    }

    #[test]
    fn test_non_binding_event_ignored() {
        let event = CdpEvent {
            method: "Page.loadEventFired".to_string(),
            params: json!({"timestamp": 1.0}),
        };
        assert!(binding_payload(&event).is_none());
    }

    #[test]
    fn test_unknown_signal_kind() {
        assert_eq!(signal_kind("wheel"), None);
        assert_eq!(signal_kind("input"), Some(SignalKind::Input));
    }
}
