use std::{num::ParseIntError, ops::Range, str::Utf8Error};

use memchr::memchr;
use unicase::UniCase;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeaderParseError {
    #[error(transparent)]
    InvalidInt(#[from] ParseIntError),
    #[error(transparent)]
    InvalidUtf8(#[from] Utf8Error),
}

/// A header with a known name and a typed value
pub trait HeaderField {
    const NAME: &'static str;
    type Output: HeaderValue;

    fn parse(value: &[u8]) -> Result<Self::Output, HeaderParseError> {
        Self::Output::from_header_value(value)
    }
}

pub trait HeaderValue: Sized {
    fn from_header_value(value: &[u8]) -> Result<Self, HeaderParseError>;
}

impl HeaderValue for u64 {
    fn from_header_value(value: &[u8]) -> Result<Self, HeaderParseError> {
        Ok(std::str::from_utf8(value)?.parse()?)
    }
}

impl HeaderValue for String {
    fn from_header_value(value: &[u8]) -> Result<Self, HeaderParseError> {
        Ok(std::str::from_utf8(value)?.to_string())
    }
}

macro_rules! header_struct {
    ($name: ident, $matcher: expr, $ty: ty) => {
        pub struct $name;

        impl HeaderField for $name {
            const NAME: &'static str = $matcher;
            type Output = $ty;
        }
    };
}

header_struct!(ContentLength, "Content-Length", u64);
header_struct!(ContentType, "Content-Type", String);
header_struct!(Location, "Location", String);

/// Byte ranges of one `name: value` line inside a head
#[derive(Debug, Clone)]
pub(crate) struct HeaderIx {
    pub name: Range<usize>,
    pub value: Range<usize>,
}

impl HeaderIx {
    /// Splits a header line at the first colon, trimming optional whitespace
    /// around the value. `line` is the range of the line without its CRLF.
    pub(crate) fn parse(buf: &[u8], line: Range<usize>) -> Option<Self> {
        let colon = memchr(b':', &buf[line.clone()])? + line.start;
        let name = trim(buf, line.start..colon);
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name,
            value: trim(buf, colon + 1..line.end),
        })
    }

    pub(crate) fn name_matches(&self, buf: &[u8], name: &str) -> bool {
        std::str::from_utf8(&buf[self.name.clone()])
            .is_ok_and(|own| UniCase::ascii(own) == UniCase::ascii(name))
    }
}

fn trim(buf: &[u8], mut range: Range<usize>) -> Range<usize> {
    const WHITESPACE: &[u8] = b" \t";
    while range.start < range.end && WHITESPACE.contains(&buf[range.start]) {
        range.start += 1;
    }
    while range.end > range.start && WHITESPACE.contains(&buf[range.end - 1]) {
        range.end -= 1;
    }
    range
}

/// Iterates the lines of a head as ranges, CRLF or bare LF stripped.
/// Stops at the first empty line.
pub(crate) struct Lines<'a> {
    buf: &'a [u8],
    cursor: usize,
}

impl<'a> Lines<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, cursor: 0 }
    }
}

impl Iterator for Lines<'_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.buf.len() {
            return None;
        }
        let start = self.cursor;
        let end = match memchr(b'\n', &self.buf[start..]) {
            Some(nl) => {
                self.cursor = start + nl + 1;
                start + nl
            }
            None => {
                self.cursor = self.buf.len();
                self.buf.len()
            }
        };
        let end = if end > start && self.buf[end - 1] == b'\r' {
            end - 1
        } else {
            end
        };
        if start == end {
            // Blank line, nothing after it belongs to the head
            self.cursor = self.buf.len();
            return None;
        }
        Some(start..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_strip_crlf_and_stop_at_blank() {
        let buf = b"one\r\ntwo\nthree\r\n\r\nbody\r\n";
        let lines: Vec<_> = Lines::new(buf).map(|r| &buf[r]).collect();
        assert_eq!(lines, [&b"one"[..], b"two", b"three"]);
    }

    #[test]
    fn header_line_trims_value() {
        let buf = b"Content-Length: \t 42 \t";
        let ix = HeaderIx::parse(buf, 0..buf.len()).unwrap();
        assert_eq!(&buf[ix.name.clone()], b"Content-Length");
        assert_eq!(&buf[ix.value.clone()], b"42");
        assert!(ix.name_matches(buf, "content-length"));
        assert!(!ix.name_matches(buf, "content-type"));
    }

    #[test]
    fn header_line_needs_name_and_colon() {
        assert!(HeaderIx::parse(b"no colon here", 0..13).is_none());
        assert!(HeaderIx::parse(b": value", 0..7).is_none());
        let buf = b"Location:";
        let ix = HeaderIx::parse(buf, 0..buf.len()).unwrap();
        assert!(ix.value.is_empty());
    }

    #[test]
    fn typed_values() {
        assert_eq!(ContentLength::parse(b"1024"), Ok(1024));
        assert!(ContentLength::parse(b"-1").is_err());
        assert!(ContentLength::parse(b"12abc").is_err());
        assert_eq!(Location::parse(b"http://a/b").unwrap(), "http://a/b");
    }
}
