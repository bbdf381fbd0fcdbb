//! The per-request log record.

use serde::Serialize;
use serde_json::Value;

use crate::headers::HeaderMap;

/// Value of the `result` field. Marks a request that was observed to
/// completion, whatever its status.
pub const RESULT_SUCCESS: &str = "success";

/// Captured response body, classified once at the parse boundary.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Json(Value),
    Raw { raw_response: String },
}

impl ResponseBody {
    /// Well-formed JSON is kept structurally; anything else (including an
    /// empty body) is logged verbatim under `raw_response`.
    pub fn parse(bytes: &[u8]) -> Self {
        match serde_json::from_slice(bytes) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Raw { raw_response: String::from_utf8_lossy(bytes).into_owned() },
        }
    }
}

/// One completed request. Serialises with fields in declaration order.
#[derive(Clone, Debug, Serialize)]
pub struct LogEvent {
    pub result: &'static str,
    pub client_ip: String,
    pub method: String,
    pub path: String,
    pub status: u16,
    pub latency_ms: u64,
    pub client_request_headers: HeaderMap,
    pub response_body: ResponseBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_request_headers: Option<HeaderMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LogEvent {
    /// The record's fields as ordered `(name, value)` pairs.
    pub fn into_fields(self) -> Vec<(String, Value)> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map.into_iter().collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn event() -> LogEvent {
        LogEvent {
            result: RESULT_SUCCESS,
            client_ip: "10.0.0.1".to_owned(),
            method: "GET".to_owned(),
            path: "/films?page=2".to_owned(),
            status: 200,
            latency_ms: 3,
            client_request_headers: HeaderMap::new(),
            response_body: ResponseBody::parse(br#"{"message":"UP"}"#),
            external_request_headers: None,
            error: None,
        }
    }

    #[test]
    fn json_body_is_kept_structurally() {
        assert_eq!(
            ResponseBody::parse(br#"{"message":"UP"}"#),
            ResponseBody::Json(json!({"message": "UP"})),
        );
    }

    #[test]
    fn non_json_body_falls_back_to_raw() {
        let body = ResponseBody::parse(b"ok");
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({"raw_response": "ok"}));

        let empty = ResponseBody::parse(b"");
        assert_eq!(serde_json::to_value(&empty).unwrap(), json!({"raw_response": ""}));
    }

    #[test]
    fn fields_follow_declaration_order_and_skip_absent_ones() {
        let names: Vec<String> = event().into_fields().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            names,
            [
                "result",
                "client_ip",
                "method",
                "path",
                "status",
                "latency_ms",
                "client_request_headers",
                "response_body",
            ],
        );
    }

    #[test]
    fn optional_fields_appear_when_set() {
        let mut event = event();
        event.external_request_headers = Some(HeaderMap::from([("X-Random-Header".to_owned(), "random-7".to_owned())]));
        event.error = Some("upstream timeout".to_owned());

        let fields: serde_json::Map<String, Value> = event.into_fields().into_iter().collect();
        assert_eq!(fields["external_request_headers"], json!({"X-Random-Header": "random-7"}));
        assert_eq!(fields["error"], "upstream timeout");
        assert_eq!(fields["response_body"], json!({"message": "UP"}));
    }
}
