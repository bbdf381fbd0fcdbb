//! Radix-tree request router.
//!
//! One tree per HTTP method, O(path-length) lookup. A router also owns the
//! middleware stack and the fallback used when no route matches; every
//! request, matched or not, runs through the full stack.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::{Method, StatusCode};
use http_body_util::{BodyExt, Limited};
use hyper::body::Body as HttpBody;
use matchit::Router as MatchitRouter;

use crate::context::RequestContext;
use crate::handler::{BoxedHandler, Handler};
use crate::middleware::{Middleware, Next, Stack};
use crate::request::Request;
use crate::response::Response;

/// Largest request body [`Router::handle`] reads by default: 2 MiB.
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Each builder method returns `self` so registrations chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    middleware: Stack,
    fallback: BoxedHandler,
    method_not_allowed: BoxedHandler,
    body_limit: usize,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            middleware: Arc::new([]),
            fallback: not_found.into_boxed_handler(),
            method_not_allowed: method_not_allowed.into_boxed_handler(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax — `req.param("name")` retrieves them:
    ///
    /// ```rust,no_run
    /// # use http::Method;
    /// # use reqtrail::{Request, Response, Router};
    /// # async fn get_user(_: Request) -> Response { Response::text("") }
    /// # async fn create_user(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::GET,  "/users/{id}", get_user)
    ///     .on(Method::POST, "/users",      create_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Shorthand for `on(Method::GET, path, handler)`.
    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, path, handler)
    }

    /// Handler for requests that match no route. Defaults to an empty `404`.
    pub fn fallback(mut self, handler: impl Handler) -> Self {
        self.fallback = handler.into_boxed_handler();
        self
    }

    /// Maximum number of request body bytes read per request.
    pub fn body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }

    /// Appends a middleware layer. The first layer added is the outermost.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        let mut layers = self.middleware.to_vec();
        layers.push(Arc::new(middleware));
        self.middleware = layers.into();
        self
    }

    /// Routes one request through the middleware stack and produces one
    /// response. This is what the server calls for every request; tests can
    /// call it directly.
    ///
    /// All failures become responses. A request body that cannot be read,
    /// or that is longer than the body limit, is treated as empty and the
    /// failure recorded on the request context, so middleware still observes
    /// the request.
    pub async fn handle<B>(&self, req: http::Request<B>, remote_addr: SocketAddr) -> Response
    where
        B: HttpBody<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let (parts, body) = req.into_parts();
        let context = RequestContext::default();

        let body = match Limited::new(body, self.body_limit).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                context.record_error(format!("failed to read request body: {e}"));
                Bytes::new()
            }
        };

        let (endpoint, params) = self.route(&parts.method, parts.uri.path());
        let request = Request::new(parts, body, params, remote_addr, context);
        self.pipeline(endpoint).run(request).await
    }

    /// Resolves the endpoint for a request.
    ///
    /// A path registered only under other methods yields `405`; an unknown
    /// path yields the fallback.
    pub(crate) fn route(&self, method: &Method, path: &str) -> (BoxedHandler, HashMap<String, String>) {
        if let Some(matched) = self.routes.get(method).and_then(|tree| tree.at(path).ok()) {
            let params = matched.params.iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect();
            return (Arc::clone(matched.value), params);
        }

        let other_method = self.routes.iter()
            .any(|(m, tree)| m != method && tree.at(path).is_ok());
        let handler = if other_method { &self.method_not_allowed } else { &self.fallback };
        (Arc::clone(handler), HashMap::new())
    }

    /// The middleware stack wrapped around `endpoint`.
    pub(crate) fn pipeline(&self, endpoint: BoxedHandler) -> Next {
        Next::new(Arc::clone(&self.middleware), endpoint)
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

async fn not_found(_req: Request) -> Response {
    Response::status(StatusCode::NOT_FOUND)
}

async fn method_not_allowed(_req: Request) -> Response {
    Response::status(StatusCode::METHOD_NOT_ALLOWED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::testing::request;

    async fn user(req: Request) -> Response {
        Response::text(req.param("id").unwrap_or("none").to_owned())
    }

    async fn teapot(_req: Request) -> StatusCode {
        StatusCode::IM_A_TEAPOT
    }

    async fn status_of(router: &Router, method: Method, path: &str) -> StatusCode {
        let (handler, params) = router.route(&method, path);
        let mut req = request(method, path, &[]);
        req.params = params;
        router.pipeline(handler).run(req).await.status_code()
    }

    #[tokio::test]
    async fn matches_routes_and_extracts_params() {
        let router = Router::new().get("/users/{id}", user);
        let (handler, params) = router.route(&Method::GET, "/users/42");
        assert_eq!(params["id"], "42");

        let mut req = request(Method::GET, "/users/42", &[]);
        req.params = params;
        let res = handler.call(req).await;
        assert_eq!(res.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_path_uses_fallback() {
        let router = Router::new().get("/health", teapot);
        assert_eq!(status_of(&router, Method::GET, "/missing").await, StatusCode::NOT_FOUND);

        let router = router.fallback(teapot);
        assert_eq!(status_of(&router, Method::GET, "/missing").await, StatusCode::IM_A_TEAPOT);
    }

    #[tokio::test]
    async fn known_path_with_wrong_method_is_405() {
        let router = Router::new().get("/health", teapot);
        assert_eq!(status_of(&router, Method::POST, "/health").await, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn conflicting_routes_panic() {
        let _ = Router::new().get("/a", teapot).get("/a", teapot);
    }
}
