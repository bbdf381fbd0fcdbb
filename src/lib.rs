//! # reqtrail
//!
//! A minimal HTTP service framework with structured request/response
//! logging built in.
//!
//! The interesting part is [`middleware::RequestLogger`]: for every request
//! it records method, path, status, latency, masked request headers and the
//! response body exactly as the client received it, and writes one JSON line
//! to a [`LogSink`].
//!
//! - Radix-tree routing via [`matchit`]
//! - hyper for HTTP/1.1 and HTTP/2, tokio for I/O
//! - Graceful shutdown on SIGTERM / Ctrl-C
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use reqtrail::middleware::{Recover, RequestLogger};
//! use reqtrail::{LogSink, Router, Server, SinkConfig, health};
//!
//! #[tokio::main]
//! async fn main() {
//!     let sink = Arc::new(LogSink::from_config(&SinkConfig::from_env()));
//!
//!     let app = Router::new()
//!         .layer(RequestLogger::new(sink))
//!         .layer(Recover)
//!         .get("/health", health::up);
//!
//!     Server::bind("0.0.0.0:8080").unwrap().serve(app).await.unwrap();
//! }
//! ```
//!
//! ## Passing facts to the logger
//!
//! Handlers reach the logger through [`Request::context`]:
//!
//! ```rust
//! use reqtrail::{Request, Response};
//! use reqtrail::headers::HeaderMap;
//!
//! async fn proxy(req: Request) -> Response {
//!     let sent = HeaderMap::from([("X-Trace".to_owned(), "abc".to_owned())]);
//!     req.context().set_outbound_headers(sent);
//!     req.context().record_error("upstream was slow");
//!     Response::text("done")
//! }
//! ```

mod context;
mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod config;
pub mod event;
pub mod headers;
pub mod health;
pub mod mask;
pub mod middleware;
pub mod sink;

pub use config::{Level, Output, SinkConfig};
pub use context::RequestContext;
pub use error::Error;
pub use handler::{BoxFuture, Handler};
pub use mask::{MaskPolicy, Masker};
pub use request::Request;
pub use response::{Body, IntoResponse, Json, Response, ResponseBuilder};
pub use router::{DEFAULT_BODY_LIMIT, Router};
pub use server::Server;
pub use sink::LogSink;
