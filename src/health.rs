//! Built-in health-check handler.
//!
//! Answers `200 OK` with `{"message":"UP"}`. If the process can respond to
//! HTTP at all it is up; the handler has no dependencies.
//!
//! ```rust,no_run
//! use reqtrail::{Router, health};
//!
//! let app = Router::new()
//!     .get("/health",    health::up)
//!     .get("/v1/health", health::up);
//! ```

use crate::{IntoResponse, Json, Request, Response};

pub async fn up(_req: Request) -> Response {
    Json(serde_json::json!({"message": "UP"})).into_response()
}
