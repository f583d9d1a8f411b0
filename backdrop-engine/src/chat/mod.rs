// chat/ - Remote chat endpoint client
//
// One POST per user action: no retry, no client-side timeout. Every failure
// is folded into a ChatOutcome so the page only ever sees a value.

mod format;
mod key;

pub use format::format_reply;
pub use key::{ApiKeyContext, KeyStore, MemoryKeyStore, StorageError};

use std::future::Future;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::ChatConfig;

const PROBE_MESSAGE: &str = "Hello, this is a test message.";

/// String fields checked, in order, for the assistant's reply text
const REPLY_FIELDS: [&str; 5] = ["response", "reply", "message", "content", "text"];

/// Failure below HTTP: DNS, TLS, offline, CORS.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("{0}")]
    Network(String),
}

pub struct ChatRequest<'a> {
    pub url: &'a str,
    pub headers: Vec<(&'a str, &'a str)>,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

pub trait Transport {
    fn post(&self, request: ChatRequest<'_>) -> impl Future<Output = Result<RawResponse, TransportError>>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Json(Value),
    /// Non-JSON or empty bodies, verbatim
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatOutcome {
    fn from_response(resp: RawResponse) -> Self {
        if (200..300).contains(&resp.status) {
            return Self {
                success: true,
                status: Some(resp.status),
                data: Some(parse_body(resp.content_type.as_deref(), resp.body)),
                error: None,
            };
        }
        log::warn!("chat endpoint answered {}", resp.status);
        Self {
            success: false,
            status: Some(resp.status),
            data: None,
            error: Some(format!("HTTP error {}: {}", resp.status, resp.body)),
        }
    }

    fn network(message: String) -> Self {
        Self { success: false, status: None, data: None, error: Some(message) }
    }

    /// Text to show in the conversation, if the call succeeded.
    pub fn reply_text(&self) -> Option<String> {
        match self.data.as_ref()? {
            ResponseBody::Text(text) => Some(text.clone()),
            ResponseBody::Json(value) => Some(
                REPLY_FIELDS
                    .iter()
                    .find_map(|field| value.get(field).and_then(Value::as_str))
                    .map_or_else(|| value.to_string(), str::to_owned),
            ),
        }
    }
}

fn parse_body(content_type: Option<&str>, body: String) -> ResponseBody {
    let is_json = content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"));
    if is_json && !body.trim().is_empty() {
        match serde_json::from_str(&body) {
            Ok(value) => return ResponseBody::Json(value),
            Err(err) => log::warn!("response claimed json but did not parse ({err}), using raw text"),
        }
    }
    ResponseBody::Text(body)
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    message: &'a str,
}

/// The message to send for the current input, if any. Nothing goes out while
/// an earlier reply is still pending or the trimmed input is empty.
pub fn outgoing(input: &str, pending: bool) -> Option<&str> {
    let message = input.trim();
    (!pending && !message.is_empty()).then_some(message)
}

pub struct ChatClient<T> {
    transport: T,
    config: ChatConfig,
}

impl<T: Transport> ChatClient<T> {
    pub fn new(transport: T, config: ChatConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ChatConfig { &self.config }

    /// Send `message`, attaching `key` in the configured header when present.
    pub async fn send(&self, message: &str, key: Option<&str>) -> ChatOutcome {
        let body = match serde_json::to_string(&ChatMessage { message }) {
            Ok(body) => body,
            Err(err) => return ChatOutcome::network(err.to_string()),
        };

        let mut headers = vec![("Content-Type", "application/json")];
        if let Some(key) = key.map(str::trim).filter(|k| !k.is_empty()) {
            headers.push((self.config.key_header.as_str(), key));
        }

        let request = ChatRequest { url: &self.config.endpoint, headers, body };
        match self.transport.post(request).await {
            Ok(resp) => ChatOutcome::from_response(resp),
            Err(err) => {
                log::error!("chat request failed: {err}");
                ChatOutcome::network(err.to_string())
            }
        }
    }

    /// Connectivity check with a fixed greeting and no key.
    pub async fn probe(&self) -> ChatOutcome {
        let outcome = self.send(PROBE_MESSAGE, None).await;
        log::info!("chat probe: success={} status={:?}", outcome.success, outcome.status);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct Scripted {
        reply: Result<RawResponse, TransportError>,
        seen: RefCell<Vec<(Vec<(String, String)>, String)>>,
    }

    impl Scripted {
        fn new(reply: Result<RawResponse, TransportError>) -> Self {
            Self { reply, seen: RefCell::new(Vec::new()) }
        }
    }

    impl Transport for &Scripted {
        async fn post(&self, request: ChatRequest<'_>) -> Result<RawResponse, TransportError> {
            let headers = request.headers.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
            self.seen.borrow_mut().push((headers, request.body));
            self.reply.clone()
        }
    }

    fn ok(content_type: Option<&str>, body: &str) -> Result<RawResponse, TransportError> {
        Ok(RawResponse { status: 200, content_type: content_type.map(str::to_owned), body: body.into() })
    }

    #[test]
    fn nothing_goes_out_while_a_reply_is_pending() {
        assert_eq!(outgoing("  hi there \n", false), Some("hi there"));
        assert_eq!(outgoing("hi there", true), None);
        assert_eq!(outgoing("   ", false), None);
    }

    #[test]
    fn json_success() {
        let t = Scripted::new(ok(Some("application/json; charset=utf-8"), r#"{"ok":true}"#));
        let client = ChatClient::new(&t, ChatConfig::default());
        let outcome = pollster::block_on(client.send("hi", None));
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            serde_json::json!({"success": true, "status": 200, "data": {"ok": true}})
        );
    }

    #[test]
    fn http_failure() {
        let t = Scripted::new(Ok(RawResponse { status: 500, content_type: None, body: "server error".into() }));
        let client = ChatClient::new(&t, ChatConfig::default());
        let outcome = pollster::block_on(client.send("hi", None));
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            serde_json::json!({"success": false, "status": 500, "error": "HTTP error 500: server error"})
        );
    }

    #[test]
    fn offline() {
        let t = Scripted::new(Err(TransportError::Network("Failed to fetch".into())));
        let client = ChatClient::new(&t, ChatConfig::default());
        let outcome = pollster::block_on(client.send("hi", None));
        assert!(!outcome.success);
        assert_eq!(outcome.status, None);
        assert_eq!(outcome.error.as_deref(), Some("Failed to fetch"));
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            serde_json::json!({"success": false, "error": "Failed to fetch"})
        );
    }

    #[test]
    fn non_json_and_empty_bodies_fall_back_to_text() {
        for (ct, body) in [(Some("text/plain"), "plain words"), (Some("application/json"), ""), (Some("application/json"), "{broken"), (None, "")] {
            let t = Scripted::new(ok(ct, body));
            let client = ChatClient::new(&t, ChatConfig::default());
            let outcome = pollster::block_on(client.send("hi", None));
            assert!(outcome.success);
            assert_eq!(outcome.data, Some(ResponseBody::Text(body.into())));
        }
    }

    #[test]
    fn key_goes_in_configured_header() {
        let t = Scripted::new(ok(None, "x"));
        let client = ChatClient::new(&t, ChatConfig::default());
        pollster::block_on(client.send("hello", Some("  secret ")));
        pollster::block_on(client.send("hello", Some("   ")));

        let seen = t.seen.borrow();
        assert!(seen[0].0.contains(&("x-functions-key".to_string(), "secret".to_string())));
        assert_eq!(seen[0].1, r#"{"message":"hello"}"#);
        assert!(!seen[1].0.iter().any(|(k, _)| k == "x-functions-key"));
    }

    #[test]
    fn reply_text_prefers_known_fields() {
        let outcome = ChatOutcome {
            success: true,
            status: Some(200),
            data: Some(ResponseBody::Json(serde_json::json!({"id": 1, "response": "hello there"}))),
            error: None,
        };
        assert_eq!(outcome.reply_text().as_deref(), Some("hello there"));

        let odd = ChatOutcome { data: Some(ResponseBody::Json(serde_json::json!({"n": 2}))), ..outcome.clone() };
        assert_eq!(odd.reply_text().as_deref(), Some(r#"{"n":2}"#));
    }

    #[test]
    fn probe_sends_fixed_message() {
        let t = Scripted::new(ok(Some("application/json"), r#"{"ok":true}"#));
        let client = ChatClient::new(&t, ChatConfig::default());
        assert!(pollster::block_on(client.probe()).success);
        assert!(t.seen.borrow()[0].1.contains("test message"));
    }
}
