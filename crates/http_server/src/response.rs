use bytes::{Bytes, BytesMut};
use courier_wire::{HttpVersion, StatusCode};

/// Builds the head of a response. Every response closes the connection, so
/// `Connection: close` is always emitted last.
#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    version: HttpVersion,
    status: StatusCode,
    headers: Vec<(&'static str, String)>,
    body: Option<Bytes>,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            version: HttpVersion::HTTP_1_1,
            status,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn content_length(self, len: u64) -> Self {
        self.header("Content-Length", len.to_string())
    }

    /// Attaches a body held in memory and sets its `Content-Length`
    pub fn body(mut self, bytes: Bytes) -> Self {
        let len = bytes.len() as u64;
        self.body = Some(bytes);
        self.content_length(len)
    }

    /// Serializes the status line, headers, blank line and any body
    pub fn build(self) -> Bytes {
        let reason = self.status.canonical_reason().unwrap_or("Unknown Reason");
        let body_len = self.body.as_ref().map_or(0, Bytes::len);
        let mut buf = BytesMut::with_capacity(128 + body_len);

        buf.extend_from_slice(format!("{} {} {}\r\n", self.version, self.status, reason).as_bytes());
        for (name, value) in &self.headers {
            buf.extend_from_slice(name.as_bytes());
            buf.extend_from_slice(b": ");
            buf.extend_from_slice(value.as_bytes());
            buf.extend_from_slice(b"\r\n");
        }
        buf.extend_from_slice(b"Connection: close\r\n\r\n");
        if let Some(body) = self.body {
            buf.extend_from_slice(&body);
        }
        buf.freeze()
    }
}
