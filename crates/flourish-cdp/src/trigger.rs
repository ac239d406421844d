//! [`TriggerControl`] over the injected floating button.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::{broadcast, mpsc};
use tracing::debug;

use flourish_composer::dom::BoundingBox;
use flourish_controller::trigger::TriggerControl;
use flourish_protocols::error::PageError;

use crate::client::CdpClient;
use crate::inject::{BINDING_NAME, TRIGGER_HELPER_JS};

/// The floating rewrite button, rendered in-page.
pub struct CdpTrigger {
    client: Arc<CdpClient>,
    click_task: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl CdpTrigger {
    pub fn new(client: Arc<CdpClient>) -> Self {
        Self {
            client,
            click_task: Mutex::new(None),
        }
    }

    fn set_click_task(&self, task: tokio::task::JoinHandle<()>) {
        let mut slot = self.click_task.lock();
        if let Some(previous) = slot.replace(task) {
            previous.abort();
        }
    }
}

fn is_click(event: &crate::client::CdpEvent) -> bool {
    event.method == "Runtime.bindingCalled"
        && event.params["name"].as_str() == Some(BINDING_NAME)
        && event.params["payload"]
            .as_str()
            .and_then(|p| serde_json::from_str::<serde_json::Value>(p).ok())
            .is_some_and(|v| v["kind"] == "click")
}

#[async_trait]
impl TriggerControl for CdpTrigger {
    async fn mount(&self) -> Result<(), PageError> {
        self.client.evaluate(TRIGGER_HELPER_JS).await?;
        self.client.evaluate("window.__flourishUi.mount()").await?;
        debug!("trigger button mounted");
        Ok(())
    }

    async fn show(&self) -> Result<(), PageError> {
        self.client.evaluate("window.__flourishUi.show()").await?;
        Ok(())
    }

    async fn hide(&self) -> Result<(), PageError> {
        self.client.evaluate("window.__flourishUi.hide()").await?;
        Ok(())
    }

    async fn set_busy(&self, busy: bool) -> Result<(), PageError> {
        self.client
            .evaluate(&format!("window.__flourishUi.setBusy({busy})"))
            .await?;
        Ok(())
    }

    async fn position(&self, anchor: Option<BoundingBox>) -> Result<(), PageError> {
        let rect = match anchor {
            Some(rect) => json!({
                "x": rect.x,
                "y": rect.y,
                "width": rect.width,
                "height": rect.height,
            }),
            None => serde_json::Value::Null,
        };
        self.client
            .evaluate(&format!("window.__flourishUi.position({rect})"))
            .await?;
        Ok(())
    }

    async fn on_click(&self, clicks: mpsc::UnboundedSender<()>) -> Result<(), PageError> {
        let mut events = self.client.events();
        let task = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) if is_click(&event) => {
                        if clicks.send(()).is_err() {
                            break;
                        }
                    }
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        self.set_click_task(task);
        Ok(())
    }
}

impl Drop for CdpTrigger {
    fn drop(&mut self) {
        if let Some(task) = self.click_task.lock().take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::CdpEvent;

    #[test]
    fn test_click_event_detection() {
        let event = CdpEvent {
            method: "Runtime.bindingCalled".to_string(),
            params: json!({"name": BINDING_NAME, "payload": r#"{"kind":"click"}"#}),
        };
        assert!(is_click(&event));
    }

    #[test]
    fn test_signal_payload_is_not_a_click() {
        let event = CdpEvent {
            method: "Runtime.bindingCalled".to_string(),
            params: json!({
                "name": BINDING_NAME,
                "payload": r#"{"kind":"signal","region":1,"signal":"input"}"#,
            }),
        };
        assert!(!is_click(&event));
    }

    #[test]
    fn test_other_events_are_not_clicks() {
        let event = CdpEvent {
            method: "Page.frameNavigated".to_string(),
            params: json!({}),
        };
        assert!(!is_click(&event));
    }
}
