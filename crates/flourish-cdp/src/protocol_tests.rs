use super::*;
use serde_json::json;

#[test]
fn test_request_serialization() {
    let request = CdpRequest {
        id: 7,
        method: "Runtime.evaluate".to_string(),
        params: Some(json!({"expression": "1 + 1"})),
    };
    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(value["id"], 7);
    assert_eq!(value["method"], "Runtime.evaluate");
    assert_eq!(value["params"]["expression"], "1 + 1");
}

#[test]
fn test_request_omits_absent_params() {
    let request = CdpRequest {
        id: 1,
        method: "Page.enable".to_string(),
        params: None,
    };
    let text = serde_json::to_string(&request).unwrap();
    assert!(!text.contains("params"));
}

#[test]
fn test_response_with_result() {
    let text = r#"{"id": 3, "result": {"result": {"type": "number", "value": 2}}}"#;
    let response: CdpResponse = serde_json::from_str(text).unwrap();
    assert_eq!(response.id, Some(3));
    assert!(response.error.is_none());
    assert!(response.method.is_none());
}

#[test]
fn test_response_with_error() {
    let text = r#"{"id": 4, "error": {"code": -32000, "message": "Cannot find context"}}"#;
    let response: CdpResponse = serde_json::from_str(text).unwrap();
    let error = response.error.unwrap();
    assert_eq!(error.code, -32000);
    assert!(error.message.contains("context"));
}

#[test]
fn test_event_message() {
    let text = r#"{"method": "Runtime.bindingCalled", "params": {"name": "x", "payload": "{}"}}"#;
    let response: CdpResponse = serde_json::from_str(text).unwrap();
    assert!(response.id.is_none());
    assert_eq!(response.method.as_deref(), Some("Runtime.bindingCalled"));
}

#[test]
fn test_page_target_parse() {
    let text = r#"[{
        "id": "ABC123",
        "type": "page",
        "title": "WhatsApp",
        "url": "https://web.whatsapp.com/",
        "webSocketDebuggerUrl": "ws://localhost:9222/devtools/page/ABC123"
    }, {
        "id": "DEF456",
        "type": "service_worker",
        "title": "",
        "url": "https://web.whatsapp.com/sw.js"
    }]"#;
    let targets: Vec<PageTarget> = serde_json::from_str(text).unwrap();
    assert_eq!(targets.len(), 2);
    assert_eq!(targets[0].target_type, "page");
    assert!(targets[0].web_socket_debugger_url.as_deref().unwrap().starts_with("ws://"));
    assert!(targets[1].web_socket_debugger_url.is_none());
}
