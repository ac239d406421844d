//! CDP message types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// CDP request message.
#[derive(Debug, Serialize)]
pub struct CdpRequest {
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// CDP response or event message.
#[derive(Debug, Deserialize)]
pub struct CdpResponse {
    pub id: Option<u64>,
    pub result: Option<Value>,
    pub error: Option<CdpErrorDetail>,
    pub method: Option<String>,
    pub params: Option<Value>,
}

/// CDP error in a response.
#[derive(Debug, Deserialize)]
pub struct CdpErrorDetail {
    pub code: i64,
    pub message: String,
    pub data: Option<String>,
}

/// Page target from the `/json` discovery endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageTarget {
    pub id: String,
    #[serde(rename = "type")]
    pub target_type: String,
    pub title: String,
    pub url: String,
    pub web_socket_debugger_url: Option<String>,
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
