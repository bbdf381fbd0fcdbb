//! Per-request context shared by the dispatcher, middleware and handler.
//!
//! Handlers use it to hand extra facts to the request logger: the headers
//! they sent on an outbound call, and errors that did not abort the
//! response. A context lives exactly as long as its request.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::headers::HeaderMap;

#[derive(Default)]
struct State {
    outbound_headers: Option<HeaderMap>,
    errors: Vec<String>,
}

/// Cheap to clone; all clones share the same state.
#[derive(Clone, Default)]
pub struct RequestContext {
    state: Arc<Mutex<State>>,
}

impl RequestContext {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records the headers sent on an outbound call. The last call wins.
    pub fn set_outbound_headers(&self, headers: HeaderMap) {
        self.state().outbound_headers = Some(headers);
    }

    pub fn outbound_headers(&self) -> Option<HeaderMap> {
        self.state().outbound_headers.clone()
    }

    /// Records a non-fatal error against this request. Blank messages are
    /// ignored.
    pub fn record_error(&self, message: impl Into<String>) {
        let message = message.into();
        if !message.trim().is_empty() {
            self.state().errors.push(message);
        }
    }

    /// All recorded errors joined with `"; "`, or `None` if there are none.
    pub fn error_message(&self) -> Option<String> {
        let state = self.state();
        (!state.errors.is_empty()).then(|| state.errors.join("; "))
    }
}
