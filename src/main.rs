//! Demo server: health checks, a couple of JSON endpoints and one outbound
//! call, all logged through the request logger.
//!
//! Run with:
//!   LOG_LEVEL=debug RUST_LOG=info cargo run
//!
//! Try:
//!   curl http://localhost:8080/health
//!   curl -H 'Authorization: Bearer xyz' 'http://localhost:8080/films?page=2'
//!   curl http://localhost:8080/todos

mod client;
mod routes;

use std::process::ExitCode;
use std::sync::Arc;

use reqtrail::{LogSink, Server, SinkConfig};
use tracing::error;
use tracing_subscriber::EnvFilter;

const ADDR: &str = "0.0.0.0:8080";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let sink = Arc::new(LogSink::from_config(&SinkConfig::from_env()));

    let api = match client::ExternalApi::new(client::TODO_URL) {
        Ok(api) => Arc::new(api),
        Err(e) => {
            error!("failed to build HTTP client: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match Server::bind(ADDR) {
        Ok(server) => server.serve(routes::app(sink, api)).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("server error: {e}");
            ExitCode::FAILURE
        }
    }
}
