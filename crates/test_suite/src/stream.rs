use std::{
    collections::VecDeque,
    io,
    pin::Pin,
    sync::{Arc, Mutex},
    task::{Context, Poll},
};

use bytes::{Buf, Bytes};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// An in-memory connection. Every `poll_read` hands out at most one scripted
/// segment, so a test controls where the peer's bytes are split. Once the
/// segments run out reads return EOF. Writes are recorded.
#[derive(Debug, Default)]
pub struct ScriptedStream {
    segments: VecDeque<Bytes>,
    written: Written,
    reads: usize,
}

/// Handle to everything written to a [`ScriptedStream`], usable after the
/// stream itself was moved into the code under test
#[derive(Debug, Clone, Default)]
pub struct Written(Arc<Mutex<Vec<u8>>>);

impl Written {
    pub fn bytes(&self) -> Vec<u8> {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes()).into_owned()
    }
}

impl ScriptedStream {
    pub fn new<I, B>(segments: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        Self {
            segments: segments
                .into_iter()
                .map(Into::into)
                .filter(|b: &Bytes| !b.is_empty())
                .collect(),
            written: Written::default(),
            reads: 0,
        }
    }

    /// Splits `data` into segments of `size` bytes
    pub fn chunked(data: &[u8], size: usize) -> Self {
        Self::new(data.chunks(size.max(1)).map(Bytes::copy_from_slice))
    }

    pub fn written(&self) -> Written {
        self.written.clone()
    }

    /// Number of `poll_read` calls that returned data
    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl AsyncRead for ScriptedStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let Some(mut segment) = self.segments.pop_front() else {
            return Poll::Ready(Ok(()));
        };
        let n = segment.len().min(buf.remaining());
        buf.put_slice(&segment[..n]);
        segment.advance(n);
        if !segment.is_empty() {
            self.segments.push_front(segment);
        }
        self.reads += 1;
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for ScriptedStream {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.written
            .0
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
