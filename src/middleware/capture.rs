//! Response body capture.
//!
//! [`Capture`] decorates a response body. hyper pulls frames from it to
//! write them to the client; every data frame is copied into a buffer in the
//! same poll that hands it over, then passed on unchanged. Status and
//! headers live outside the body and are never seen here.
//!
//! When the body is finished (end of stream, error, or dropped before it was
//! drained) the completion callback receives everything captured so far.
//! The callback runs exactly once.

use std::pin::Pin;
use std::task::{Context, Poll, ready};

use bytes::{Bytes, BytesMut};
use hyper::body::{Body, Frame, SizeHint};

type OnComplete = Box<dyn FnOnce(Bytes) + Send>;

/// A body that tees its data frames into a buffer.
pub struct Capture<B> {
    inner: B,
    buf: BytesMut,
    on_complete: Option<OnComplete>,
}

impl<B> Capture<B> {
    pub fn new(inner: B, on_complete: impl FnOnce(Bytes) + Send + 'static) -> Self {
        Self { inner, buf: BytesMut::new(), on_complete: Some(Box::new(on_complete)) }
    }

    /// Bytes passed through so far.
    #[cfg(test)]
    fn captured(&self) -> &[u8] {
        &self.buf
    }

    // The buffer is kept after completion; only a copy goes to the callback.
    fn complete(&mut self) {
        if let Some(on_complete) = self.on_complete.take() {
            on_complete(self.buf.clone().freeze());
        }
    }
}

impl<B> Body for Capture<B>
where
    B: Body<Data = Bytes> + Unpin,
{
    type Data = Bytes;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        let frame = ready!(Pin::new(&mut this.inner).poll_frame(cx));

        match &frame {
            Some(Ok(frame)) => {
                if let Some(data) = frame.data_ref() {
                    this.buf.extend_from_slice(data);
                }
                // hyper stops polling once the size hint is exhausted, so a
                // trailing `None` may never arrive.
                if this.inner.is_end_stream() {
                    this.complete();
                }
            }
            Some(Err(_)) | None => this.complete(),
        }

        Poll::Ready(frame)
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl<B> Drop for Capture<B> {
    fn drop(&mut self) {
        self.complete();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::convert::Infallible;
    use std::sync::{Arc, Mutex};

    use http_body_util::{BodyExt, Empty, Full};

    use super::*;

    /// A body that yields the given chunks one frame at a time.
    struct Chunks(VecDeque<Bytes>);

    impl Body for Chunks {
        type Data = Bytes;
        type Error = Infallible;

        fn poll_frame(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Option<Result<Frame<Bytes>, Infallible>>> {
            Poll::Ready(self.0.pop_front().map(|chunk| Ok(Frame::data(chunk))))
        }
    }

    fn sink() -> (Arc<Mutex<Vec<Bytes>>>, impl FnOnce(Bytes) + Send + 'static) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&calls);
        (calls, move |bytes| recorder.lock().unwrap().push(bytes))
    }

    #[tokio::test]
    async fn client_and_buffer_both_see_every_write_once() {
        let writes = ["{\"mess", "age\":", "\"UP\"}"];
        let (calls, on_complete) = sink();
        let body = Capture::new(Chunks(writes.iter().map(|w| Bytes::from_static(w.as_bytes())).collect()), on_complete);

        let delivered = body.collect().await.unwrap().to_bytes();

        assert_eq!(delivered, writes.concat());
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], writes.concat());
    }

    #[tokio::test]
    async fn full_body_completes_without_trailing_poll() {
        let (calls, on_complete) = sink();
        let mut body = Capture::new(Full::new(Bytes::from_static(b"ok")), on_complete);

        let frame = body.frame().await.unwrap().unwrap();
        assert_eq!(frame.into_data().unwrap(), "ok");
        assert_eq!(body.captured(), b"ok");
        assert_eq!(calls.lock().unwrap().as_slice(), [Bytes::from_static(b"ok")]);

        drop(body);
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn dropped_body_reports_partial_capture() {
        let (calls, on_complete) = sink();
        let mut body = Capture::new(
            Chunks(VecDeque::from([Bytes::from_static(b"par"), Bytes::from_static(b"tial")])),
            on_complete,
        );

        body.frame().await.unwrap().unwrap();
        drop(body);

        assert_eq!(calls.lock().unwrap().as_slice(), [Bytes::from_static(b"par")]);
    }

    #[tokio::test]
    async fn empty_body_completes_with_nothing() {
        let (calls, on_complete) = sink();
        let body = Capture::new(Empty::<Bytes>::new(), on_complete);
        assert!(body.is_end_stream());

        assert!(body.collect().await.unwrap().to_bytes().is_empty());
        assert_eq!(calls.lock().unwrap().as_slice(), [Bytes::new()]);
    }

    #[tokio::test]
    async fn buffer_survives_completion() {
        let (calls, on_complete) = sink();
        let mut body = Capture::new(
            Chunks(VecDeque::from([Bytes::from_static(b"a"), Bytes::from_static(b"b")])),
            on_complete,
        );

        while let Some(frame) = body.frame().await {
            frame.unwrap();
        }
        assert_eq!(calls.lock().unwrap().as_slice(), [Bytes::from_static(b"ab")]);
        assert_eq!(body.captured(), b"ab");
    }
}
