//! Structured request/response logging.
//!
//! For every request [`RequestLogger`] writes one record to a [`LogSink`]:
//!
//! ```text
//! {"level":"info","time":"…","message":"Request","result":"success",
//!  "client_ip":"10.0.0.1","method":"GET","path":"/films?page=2","status":200,
//!  "latency_ms":3,"client_request_headers":{"Authorization":"***MASKED***"},
//!  "response_body":{"message":"sups"}}
//! ```
//!
//! Latency covers the handler (and inner layers) only. The record itself is
//! written once the response body has been handed to the client, because
//! that is when the captured body is complete.
//!
//! # Severity
//!
//! | Outcome | Level |
//! |---|---|
//! | status ≥ 500, or an error recorded on the context | `error` |
//! | status ≥ 400 | `warn` |
//! | anything else | `info` |

use std::sync::Arc;
use std::time::Instant;

use http::StatusCode;

use super::{Capture, Middleware, Next};
use crate::config::Level;
use crate::event::{LogEvent, RESULT_SUCCESS, ResponseBody};
use crate::handler::BoxFuture;
use crate::headers::HeaderMap;
use crate::mask::Masker;
use crate::request::Request;
use crate::sink::LogSink;

/// Message attached to every request record.
pub const REQUEST_MESSAGE: &str = "Request";

/// Emits one structured record per request.
#[derive(Clone)]
pub struct RequestLogger {
    sink: Arc<LogSink>,
    masker: Masker,
}

impl RequestLogger {
    /// Uses [`Masker::default`]: key-based masking of the default words.
    pub fn new(sink: Arc<LogSink>) -> Self {
        Self { sink, masker: Masker::default() }
    }

    pub fn with_masker(mut self, masker: Masker) -> Self {
        self.masker = masker;
        self
    }
}

impl Middleware for RequestLogger {
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        let sink = Arc::clone(&self.sink);
        let masker = self.masker.clone();

        Box::pin(async move {
            let start = Instant::now();
            let method = req.method().to_string();
            let mut path = req.path().to_owned();
            let query = req.query().unwrap_or_default().to_owned();
            let client_ip = req.client_ip();
            let client_request_headers = masker.mask(&req.header_map());
            let context = req.context().clone();

            let res = next.run(req).await;

            let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
            let status = res.status_code();
            let error = context.error_message();
            let external_request_headers = context.outbound_headers().map(|h| masker.mask(&h));
            if !query.is_empty() {
                path.push('?');
                path.push_str(&query);
            }

            let level = severity(status, error.is_some());
            let pending = PendingEvent {
                client_ip,
                method,
                path,
                status: status.as_u16(),
                latency_ms,
                client_request_headers,
                external_request_headers,
                error,
            };

            res.map_body(move |body| {
                Capture::new(body, move |captured| {
                    let event = pending.finish(&captured);
                    sink.emit(level, REQUEST_MESSAGE, event.into_fields());
                })
            })
        })
    }
}

/// Everything known once the handler returns; the body comes later.
struct PendingEvent {
    client_ip: String,
    method: String,
    path: String,
    status: u16,
    latency_ms: u64,
    client_request_headers: HeaderMap,
    external_request_headers: Option<HeaderMap>,
    error: Option<String>,
}

impl PendingEvent {
    fn finish(self, body: &[u8]) -> LogEvent {
        LogEvent {
            result: RESULT_SUCCESS,
            client_ip: self.client_ip,
            method: self.method,
            path: self.path,
            status: self.status,
            latency_ms: self.latency_ms,
            client_request_headers: self.client_request_headers,
            response_body: ResponseBody::parse(body),
            external_request_headers: self.external_request_headers,
            error: self.error,
        }
    }
}

fn severity(status: StatusCode, has_error: bool) -> Level {
    if has_error || status.is_server_error() {
        Level::Error
    } else if status.is_client_error() {
        Level::Warn
    } else {
        Level::Info
    }
}
