//! CDP WebSocket client for a single page target.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, trace, warn};

use flourish_protocols::error::PageError;

use crate::protocol::{CdpRequest, CdpResponse, PageTarget};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

const CALL_TIMEOUT: Duration = Duration::from_secs(30);
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Pending request waiting for its response.
#[derive(Debug)]
struct PendingRequest {
    tx: oneshot::Sender<Result<Value, PageError>>,
}

/// A CDP event pushed by the browser.
#[derive(Debug, Clone)]
pub struct CdpEvent {
    pub method: String,
    pub params: Value,
}

/// CDP client bound to one page target.
///
/// Commands go out over one WebSocket; responses are matched back to callers
/// by request id, and unsolicited events fan out on a broadcast channel.
#[derive(Debug)]
pub struct CdpClient {
    target: PageTarget,
    ws_tx: Arc<tokio::sync::Mutex<WsSink>>,
    request_id: AtomicU64,
    pending: Arc<Mutex<HashMap<u64, PendingRequest>>>,
    events_tx: broadcast::Sender<CdpEvent>,
    recv_task: tokio::task::JoinHandle<()>,
}

impl CdpClient {
    /// Connect to a page tab of a Chrome instance with remote debugging open.
    ///
    /// `endpoint` is the debugging HTTP endpoint (e.g. "http://localhost:9222");
    /// `url_filter`, when given, selects the first page tab whose URL contains
    /// it. Otherwise the first page tab wins.
    pub async fn connect(endpoint: &str, url_filter: Option<&str>) -> Result<Self, PageError> {
        let endpoint = endpoint.trim_end_matches('/');
        let list_url = format!("{endpoint}/json");
        debug!("discovering page targets at {list_url}");

        let targets: Vec<PageTarget> = reqwest::get(&list_url)
            .await
            .map_err(|_| PageError::BrowserNotAvailable(endpoint.to_string()))?
            .json()
            .await
            .map_err(|e| PageError::ConnectionFailed(format!("target discovery: {e}")))?;

        let target = targets
            .into_iter()
            .find(|t| {
                t.target_type == "page"
                    && t.web_socket_debugger_url.is_some()
                    && url_filter.is_none_or(|f| t.url.contains(f))
            })
            .ok_or_else(|| {
                PageError::ConnectionFailed(match url_filter {
                    Some(f) => format!("no open page tab matching {f:?}"),
                    None => "no open page tab".to_string(),
                })
            })?;

        // Checked in the find above.
        let Some(ws_url) = target.web_socket_debugger_url.clone() else {
            return Err(PageError::ConnectionFailed("missing debugger URL".to_string()));
        };
        debug!(url = %target.url, "attaching to page target");

        let (ws_stream, _) = tokio_tungstenite::connect_async(&ws_url)
            .await
            .map_err(|e| PageError::ConnectionFailed(format!("WebSocket: {e}")))?;

        let (ws_sink, ws_source) = ws_stream.split();
        let pending: Arc<Mutex<HashMap<u64, PendingRequest>>> = Arc::new(Mutex::new(HashMap::new()));
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let recv_task = {
            let pending = pending.clone();
            let events_tx = events_tx.clone();
            tokio::spawn(async move {
                Self::receive_loop(ws_source, pending, events_tx).await;
            })
        };

        Ok(Self {
            target,
            ws_tx: Arc::new(tokio::sync::Mutex::new(ws_sink)),
            request_id: AtomicU64::new(1),
            pending,
            events_tx,
            recv_task,
        })
    }

    async fn receive_loop(
        mut ws_source: WsSource,
        pending: Arc<Mutex<HashMap<u64, PendingRequest>>>,
        events_tx: broadcast::Sender<CdpEvent>,
    ) {
        while let Some(msg) = ws_source.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    trace!("CDP recv: {text}");
                    match serde_json::from_str::<CdpResponse>(&text) {
                        Ok(response) => {
                            if let Some(id) = response.id {
                                if let Some(request) = pending.lock().remove(&id) {
                                    let result = match response.error {
                                        Some(error) => Err(PageError::Protocol {
                                            code: error.code,
                                            message: error.message,
                                        }),
                                        None => Ok(response.result.unwrap_or(Value::Null)),
                                    };
                                    let _ = request.tx.send(result);
                                }
                            } else if let Some(method) = response.method {
                                let _ = events_tx.send(CdpEvent {
                                    method,
                                    params: response.params.unwrap_or(Value::Null),
                                });
                            }
                        }
                        Err(e) => warn!("unparseable CDP message: {e}"),
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("CDP WebSocket closed");
                    break;
                }
                Err(e) => {
                    error!("CDP WebSocket error: {e}");
                    break;
                }
                _ => {}
            }
        }
    }

    /// URL of the attached page.
    pub fn page_url(&self) -> &str {
        &self.target.url
    }

    /// Subscribe to unsolicited CDP events.
    pub fn events(&self) -> broadcast::Receiver<CdpEvent> {
        self.events_tx.subscribe()
    }

    /// Send a CDP command and wait for its response.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, PageError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = CdpRequest {
            id,
            method: method.to_string(),
            params,
        };

        let json = serde_json::to_string(&request)?;
        trace!("CDP send: {json}");

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, PendingRequest { tx });

        {
            let mut ws = self.ws_tx.lock().await;
            ws.send(Message::Text(json.into()))
                .await
                .map_err(|e| PageError::ConnectionFailed(e.to_string()))?;
        }

        match tokio::time::timeout(CALL_TIMEOUT, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(PageError::Closed),
            Err(_) => {
                self.pending.lock().remove(&id);
                Err(PageError::ConnectionFailed(format!("{method} timed out")))
            }
        }
    }

    /// Evaluate a JavaScript expression in the page and return its value.
    pub async fn evaluate(&self, expression: &str) -> Result<Value, PageError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(serde_json::json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;

        if let Some(exception) = result.get("exceptionDetails") {
            let text = exception["text"].as_str().unwrap_or("unknown error");
            return Err(PageError::Script(text.to_string()));
        }

        Ok(result["result"]["value"].clone())
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self.recv_task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_increment() {
        let id = AtomicU64::new(1);
        assert_eq!(id.fetch_add(1, Ordering::SeqCst), 1);
        assert_eq!(id.fetch_add(1, Ordering::SeqCst), 2);
        assert_eq!(id.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_connect_refused_maps_to_browser_not_available() {
        // Nothing listens on port 1 on loopback.
        let result = CdpClient::connect("http://127.0.0.1:1", None).await;
        assert!(matches!(result.unwrap_err(), PageError::BrowserNotAvailable(_)));
    }
}
