//! Incremental framing of an HTTP message head.
//!
//! Bytes arrive in arbitrary slices from the socket. [`HeadBuffer`] keeps
//! everything received so far and remembers how far it has already searched
//! for the blank line, so every byte is scanned a bounded number of times no
//! matter how the stream is split. A terminator straddling two reads is found
//! because the next scan resumes three bytes before the previous end.

use bytes::{Bytes, BytesMut};
use memchr::memmem;

/// The blank line ending the head
pub const HEAD_TERMINATOR: &[u8; 4] = b"\r\n\r\n";

#[derive(Debug, Default)]
pub struct HeadBuffer {
    buf: BytesMut,
    /// Everything before this offset is known not to start a terminator,
    /// except for its last three bytes
    scanned: usize,
    /// Length of the head including the terminator, once found
    head_len: Option<usize>,
}

impl HeadBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            scanned: 0,
            head_len: None,
        }
    }

    /// Appends freshly read bytes and returns the head length once the
    /// terminator has been seen. Bytes pushed after that are body bytes.
    pub fn push(&mut self, bytes: &[u8]) -> Option<usize> {
        self.buf.extend_from_slice(bytes);
        self.scan()
    }

    fn scan(&mut self) -> Option<usize> {
        if self.head_len.is_some() {
            return self.head_len;
        }
        let start = self.scanned.saturating_sub(HEAD_TERMINATOR.len() - 1);
        match memmem::find(&self.buf[start..], HEAD_TERMINATOR) {
            Some(pos) => self.head_len = Some(start + pos + HEAD_TERMINATOR.len()),
            None => self.scanned = self.buf.len(),
        }
        self.head_len
    }

    pub fn is_complete(&self) -> bool {
        self.head_len.is_some()
    }

    /// Total bytes accumulated, head and any body bytes
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Splits into the head (terminator included) and the body bytes that
    /// were read along with it. Returns `self` back if the head is not
    /// complete yet.
    pub fn split(mut self) -> Result<(Bytes, BytesMut), Self> {
        match self.head_len {
            Some(len) => {
                let head = self.buf.split_to(len).freeze();
                Ok((head, self.buf))
            }
            None => Err(self),
        }
    }
}
