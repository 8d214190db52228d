//! HTTP request and response types used by the dispatcher.
//!
//! The serving layer collects the request body before dispatch, so handlers
//! see a plain `http::Request<Bytes>`. The response side is a mutable
//! [`ResponseWriter`] that handlers write into; it is converted into a hyper
//! response exactly once per request.

use bytes::{Bytes, BytesMut};
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::StatusCode;
use http_body_util::Full;

/// The HTTP request type seen by handlers.
///
/// A standard `http::Request` with its body already collected into `Bytes`.
pub type Request = http::Request<Bytes>;

/// The HTTP response body type.
pub type ResponseBody = Full<Bytes>;

/// The HTTP response type produced for each request.
pub type Response = http::Response<ResponseBody>;

/// The mutable response object handlers write into.
///
/// Starts out as an empty 200 OK. Handlers set the status, append body bytes,
/// and mark the response finished with [`end`](Self::end) or
/// [`send`](Self::send). Completion is first-wins: `end` is idempotent and
/// writes after `end` are ignored, so a handler that both completes the
/// response and continues dispatch cannot corrupt what was already sent.
///
/// # Example
///
/// ```
/// use cascade_core::ResponseWriter;
/// use http::StatusCode;
///
/// let mut res = ResponseWriter::new();
/// res.set_status(StatusCode::OK);
/// res.send("hello");
///
/// assert!(res.is_finished());
/// assert_eq!(res.body(), b"hello");
/// ```
#[derive(Debug, Default)]
pub struct ResponseWriter {
    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
    finished: bool,
}

impl ResponseWriter {
    /// Creates a new, empty response writer with status 200 OK.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Sets the status code.
    ///
    /// Ignored once the response is finished.
    pub fn set_status(&mut self, status: StatusCode) -> &mut Self {
        if !self.finished {
            self.status = status;
        }
        self
    }

    /// Sets a response header.
    ///
    /// Ignored once the response is finished.
    pub fn header(&mut self, name: HeaderName, value: HeaderValue) -> &mut Self {
        if !self.finished {
            self.headers.insert(name, value);
        }
        self
    }

    /// Appends bytes to the response body.
    ///
    /// Ignored once the response is finished.
    pub fn write(&mut self, chunk: impl AsRef<[u8]>) -> &mut Self {
        if !self.finished {
            self.body.extend_from_slice(chunk.as_ref());
        }
        self
    }

    /// Appends bytes to the response body and finishes the response.
    pub fn send(&mut self, body: impl AsRef<[u8]>) {
        self.write(body);
        self.end();
    }

    /// Marks the response finished.
    ///
    /// Idempotent. Once finished, the dispatcher stops invoking handlers and
    /// further writes are ignored.
    pub fn end(&mut self) {
        self.finished = true;
    }

    /// Returns `true` once the response has been finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Returns the body accumulated so far.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Converts the writer into the response sent on the wire.
    #[must_use]
    pub fn into_response(self) -> Response {
        let mut response = http::Response::new(Full::new(self.body.freeze()));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::CONTENT_TYPE;

    #[test]
    fn test_writer_defaults_to_empty_200() {
        let res = ResponseWriter::new();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.body().is_empty());
        assert!(!res.is_finished());
    }

    #[test]
    fn test_writer_accumulates_body() {
        let mut res = ResponseWriter::new();
        res.write("hello, ").write("world");
        assert_eq!(res.body(), b"hello, world");
        assert!(!res.is_finished());
    }

    #[test]
    fn test_send_finishes_response() {
        let mut res = ResponseWriter::new();
        res.send("done");
        assert!(res.is_finished());
        assert_eq!(res.body(), b"done");
    }

    #[test]
    fn test_writes_after_end_are_ignored() {
        let mut res = ResponseWriter::new();
        res.send("first");
        res.write("second");
        res.set_status(StatusCode::IM_A_TEAPOT);
        assert_eq!(res.body(), b"first");
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[test]
    fn test_end_is_idempotent() {
        let mut res = ResponseWriter::new();
        res.end();
        res.end();
        assert!(res.is_finished());
    }

    #[test]
    fn test_into_response_carries_status_and_headers() {
        let mut res = ResponseWriter::new();
        res.set_status(StatusCode::NOT_FOUND)
            .header(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        res.end();

        let response = res.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "text/plain");
    }
}
