//! Middleware layer.
//!
//! Middleware wraps request handling and is the place for cross-cutting
//! concerns. Layers registered with [`Router::layer`](crate::Router::layer)
//! run in registration order: the first layer is the outermost.
//!
//! Built-in middleware:
//! - [`RequestLogger`] — one structured record per request
//! - [`Recover`] — turns handler panics into `500 Internal Server Error`
//!
//! # Writing middleware
//!
//! ```rust
//! use reqtrail::middleware::{Middleware, Next};
//! use reqtrail::{BoxFuture, Request};
//!
//! struct Noop;
//!
//! impl Middleware for Noop {
//!     fn call(&self, req: Request, next: Next) -> BoxFuture {
//!         Box::pin(async move { next.run(req).await })
//!     }
//! }
//! ```

mod capture;
mod recover;
mod request_log;

use std::sync::Arc;

use crate::handler::{BoxFuture, BoxedHandler};
use crate::request::Request;

pub use capture::Capture;
pub use recover::Recover;
pub use request_log::RequestLogger;

/// A layer around the rest of the request pipeline.
pub trait Middleware: Send + Sync + 'static {
    fn call(&self, req: Request, next: Next) -> BoxFuture;
}

/// Shared, type-erased middleware stack.
pub(crate) type Stack = Arc<[Arc<dyn Middleware>]>;

/// The remainder of the pipeline: inner layers, then the endpoint.
pub struct Next {
    stack: Stack,
    index: usize,
    endpoint: BoxedHandler,
}

impl Next {
    pub(crate) fn new(stack: Stack, endpoint: BoxedHandler) -> Self {
        Self { stack, index: 0, endpoint }
    }

    /// Passes `req` to the next layer, or to the endpoint if none remain.
    pub fn run(self, req: Request) -> BoxFuture {
        match self.stack.get(self.index).cloned() {
            Some(layer) => {
                let next = Self { stack: self.stack, index: self.index + 1, endpoint: self.endpoint };
                layer.call(req, next)
            }
            None => self.endpoint.call(req),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use http::{Method, StatusCode};

    use super::*;
    use crate::handler::Handler;
    use crate::request::testing::request;
    use crate::response::Response;

    struct Tag(&'static str, Arc<Mutex<Vec<&'static str>>>);

    impl Middleware for Tag {
        fn call(&self, req: Request, next: Next) -> BoxFuture {
            let (name, seen) = (self.0, Arc::clone(&self.1));
            Box::pin(async move {
                seen.lock().unwrap().push(name);
                let res = next.run(req).await;
                seen.lock().unwrap().push(name);
                res
            })
        }
    }

    #[tokio::test]
    async fn layers_run_outermost_first() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let stack: Stack = vec![
            Arc::new(Tag("outer", Arc::clone(&seen))) as Arc<dyn Middleware>,
            Arc::new(Tag("inner", Arc::clone(&seen))),
        ]
        .into();

        let endpoint = (|_req: Request| async { Response::status(StatusCode::NO_CONTENT) }).into_boxed_handler();
        let res = Next::new(stack, endpoint).run(request(Method::GET, "/", &[])).await;

        assert_eq!(res.status_code(), StatusCode::NO_CONTENT);
        assert_eq!(*seen.lock().unwrap(), ["outer", "inner", "inner", "outer"]);
    }
}
