//! Panic recovery.

use std::any::Any;

use http::StatusCode;
use tracing::error;

use super::{Middleware, Next};
use crate::handler::BoxFuture;
use crate::request::Request;
use crate::response::Response;

/// Runs the rest of the pipeline on its own task and answers
/// `500 Internal Server Error` if it panics.
///
/// The panic message is recorded on the request context. Register this
/// *after* [`RequestLogger`](super::RequestLogger) so the logger sees the
/// `500` and the error.
#[derive(Clone, Copy, Debug, Default)]
pub struct Recover;

impl Middleware for Recover {
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        let context = req.context().clone();
        let path = req.path().to_owned();

        Box::pin(async move {
            match tokio::spawn(next.run(req)).await {
                Ok(res) => res,
                Err(e) => {
                    let reason = if e.is_panic() {
                        panic_message(e.into_panic())
                    } else {
                        "handler task cancelled".to_owned()
                    };
                    error!(%path, "recovered from handler panic: {reason}");
                    context.record_error(format!("panic: {reason}"));
                    Response::status(StatusCode::INTERNAL_SERVER_ERROR)
                }
            }
        })
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => match payload.downcast_ref::<&'static str>() {
            Some(message) => (*message).to_owned(),
            None => "unknown panic payload".to_owned(),
        },
    }
}
