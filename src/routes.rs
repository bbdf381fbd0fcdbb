//! Demo endpoints.

use std::sync::Arc;

use http::StatusCode;
use rand::Rng;
use serde_json::json;

use reqtrail::middleware::{Recover, RequestLogger};
use reqtrail::{IntoResponse, Json, LogSink, Request, Response, Router, health};

use crate::client::{ExternalApi, outbound_header_map};

/// The full application: logging outermost, panic recovery inside it so a
/// recovered panic is still logged as a `500`.
pub fn app(sink: Arc<LogSink>, api: Arc<ExternalApi>) -> Router {
    Router::new()
        .layer(RequestLogger::new(sink))
        .layer(Recover)
        .get("/v1/health", health::up)
        .get("/health",    health::up)
        .get("/test",      health::up)
        .get("/films",     films)
        .get("/todos",     move |req: Request| todos(Arc::clone(&api), req))
        .fallback(not_found)
}

async fn films(_req: Request) -> Response {
    Json(json!({"message": "sups"})).into_response()
}

// GET /todos
//
// Calls the upstream with two extra headers and echoes its answer. The
// headers are handed to the request logger whether or not the call works.
async fn todos(api: Arc<ExternalApi>, req: Request) -> Response {
    let random_header = format!("random-{}", rand::rng().random_range(0..1000));
    let extra = [
        ("X-Random-Header", random_header.as_str()),
        ("X-Intermediario", "intermediario"),
    ];
    req.context().set_outbound_headers(outbound_header_map(&extra));

    match api.get_json(&extra).await {
        Ok(external) => Json(json!({
            "message": "sups",
            "external_api": external,
            "random_header": random_header,
            "intermediario": "intermediario",
        }))
        .into_response(),
        Err(e) => {
            req.context().record_error(e.to_string());
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": e.public_message()}))).into_response()
        }
    }
}

async fn not_found(_req: Request) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"code": "PATH_NOT_FOUND", "message": "Path not Found"})),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};
    use std::net::SocketAddr;
    use std::sync::Mutex;

    use bytes::Bytes;
    use http_body_util::{BodyExt, Empty};
    use reqtrail::Level;
    use serde_json::Value;

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn records(&self) -> Vec<Value> {
            let text = String::from_utf8(self.0.lock().unwrap().clone()).unwrap();
            text.lines().map(|l| serde_json::from_str(l).unwrap()).collect()
        }
    }

    fn test_app(upstream: &str) -> (Router, Captured) {
        let out = Captured::default();
        let sink = Arc::new(LogSink::new(Level::Debug, Box::new(out.clone())));
        let api = Arc::new(ExternalApi::new(upstream).unwrap());
        (app(sink, api), out)
    }

    async fn get(router: &Router, uri: &str, headers: &[(&str, &str)]) -> (StatusCode, Value) {
        let mut builder = http::Request::get(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let req = builder.body(Empty::<Bytes>::new()).unwrap();
        let peer: SocketAddr = "127.0.0.1:50000".parse().unwrap();

        let res = router.handle(req, peer).await;
        let status = res.status_code();
        let body = res.into_inner().into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn health_endpoints_report_up() {
        let (router, out) = test_app("http://127.0.0.1:1/");
        for path in ["/health", "/v1/health", "/test"] {
            let (status, body) = get(&router, path, &[]).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, json!({"message": "UP"}));
        }
        assert_eq!(out.records().len(), 3);
    }

    #[tokio::test]
    async fn films_request_is_logged_with_masked_authorization() {
        let (router, out) = test_app("http://127.0.0.1:1/");
        let (status, body) = get(&router, "/films", &[("Authorization", "Bearer xyz")]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "sups"}));

        let records = out.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["status"], 200);
        assert_eq!(records[0]["client_request_headers"]["Authorization"], "***MASKED***");
        assert_eq!(records[0]["response_body"], json!({"message": "sups"}));
    }

    #[tokio::test]
    async fn unknown_path_gets_json_404() {
        let (router, out) = test_app("http://127.0.0.1:1/");
        let (status, body) = get(&router, "/nope", &[]).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "PATH_NOT_FOUND");
        assert_eq!(out.records()[0]["level"], "warn");
    }

    #[tokio::test]
    async fn failed_upstream_call_is_logged_with_outbound_headers() {
        let (router, out) = test_app("http://127.0.0.1:1/");
        let (status, body) = get(&router, "/todos", &[]).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Failed to call external API"}));

        let records = out.records();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record["level"], "error");
        assert!(record["error"].as_str().unwrap().starts_with("request failed"));
        assert_eq!(record["external_request_headers"]["X-Intermediario"], "intermediario");
        assert!(
            record["external_request_headers"]["X-Random-Header"]
                .as_str()
                .unwrap()
                .starts_with("random-")
        );
    }
}
