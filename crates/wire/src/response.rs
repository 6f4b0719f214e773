use bytes::Bytes;
use smallvec::SmallVec;

use crate::{
    HttpVersion, StatusCode,
    header::{HeaderField, HeaderIx, HeaderParseError, Lines},
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeadParseError {
    #[error("head is empty")]
    Empty,
    #[error("status line is not `HTTP/1.x <code>`: {0:?}")]
    BadStatusLine(String),
}

/// The parsed head of a response: status line plus header field positions
/// inside the raw head bytes
#[derive(Debug, Clone)]
pub struct ResponseHead {
    raw: Bytes,
    pub version: HttpVersion,
    pub status: StatusCode,
    headers: SmallVec<[HeaderIx; 16]>,
}

impl ResponseHead {
    /// Parses a framed head, the blank line terminator may be included.
    /// Header lines without a name and colon, such as obs-fold
    /// continuations, are skipped.
    pub fn parse(raw: Bytes) -> Result<Self, HeadParseError> {
        let mut lines = Lines::new(&raw);
        let status_line = lines.next().ok_or(HeadParseError::Empty)?;
        let (version, status) = parse_status_line(&raw[status_line.clone()]).ok_or_else(|| {
            HeadParseError::BadStatusLine(String::from_utf8_lossy(&raw[status_line]).into_owned())
        })?;

        let headers = lines
            .filter_map(|line| HeaderIx::parse(&raw, line))
            .collect();

        Ok(Self {
            raw,
            version,
            status,
            headers,
        })
    }

    /// Raw value of the first header called `name`, compared case-insensitively
    pub fn header(&self, name: &str) -> Option<&[u8]> {
        self.headers
            .iter()
            .find(|ix| ix.name_matches(&self.raw, name))
            .map(|ix| &self.raw[ix.value.clone()])
    }

    pub fn get<F: HeaderField>(&self) -> Result<Option<F::Output>, HeaderParseError> {
        self.header(F::NAME).map(F::parse).transpose()
    }

    pub fn header_count(&self) -> usize {
        self.headers.len()
    }
}

/// Accepts `HTTP/1.0 <code>` and `HTTP/1.1 <code>`, the reason phrase is
/// ignored. The code must be exactly three digits.
fn parse_status_line(line: &[u8]) -> Option<(HttpVersion, StatusCode)> {
    let line = std::str::from_utf8(line).ok()?;
    let (version, rest) = line.split_once(' ')?;
    let version: HttpVersion = version.parse().ok()?;
    if !version.is_http1() {
        return None;
    }
    let code = rest.split(' ').next()?;
    Some((version, code.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{ContentLength, Location};

    fn head(raw: &'static [u8]) -> Result<ResponseHead, HeadParseError> {
        ResponseHead::parse(Bytes::from_static(raw))
    }

    #[test]
    fn parses_status_and_headers() {
        let head = head(
            b"HTTP/1.1 302 Found\r\nlocation: http://b.test/\r\nContent-Length:  0\r\n\r\n",
        )
        .unwrap();
        assert_eq!(head.version, HttpVersion::HTTP_1_1);
        assert_eq!(head.status, StatusCode::FOUND);
        assert_eq!(head.header_count(), 2);
        assert_eq!(head.get::<Location>().unwrap().as_deref(), Some("http://b.test/"));
        assert_eq!(head.get::<ContentLength>().unwrap(), Some(0));
    }

    #[test]
    fn accepts_http_1_0_without_reason() {
        let head = head(b"HTTP/1.0 404\r\n\r\n").unwrap();
        assert_eq!(head.version, HttpVersion::HTTP_1_0);
        assert_eq!(head.status, StatusCode::NOT_FOUND);
        assert_eq!(head.get::<ContentLength>().unwrap(), None);
    }

    #[test]
    fn rejects_bad_status_lines() {
        for raw in [
            &b"HTTP/1.1 2020 OK\r\n\r\n"[..],
            b"HTTP/2.0 200 OK\r\n\r\n",
            b"HTTP/1.1 OK\r\n\r\n",
            b"ICY 200 OK\r\n\r\n",
            b"HTTP/1.1\r\n\r\n",
        ] {
            let err = ResponseHead::parse(Bytes::copy_from_slice(raw)).unwrap_err();
            assert!(matches!(err, HeadParseError::BadStatusLine(_)), "{err}");
        }
        assert_eq!(head(b"\r\n\r\n").unwrap_err(), HeadParseError::Empty);
    }

    #[test]
    fn skips_lines_without_colon() {
        let head = head(
            b"HTTP/1.1 200 OK\r\nX-Folded: a\r\n b\r\nbroken\r\nContent-Length: 3\r\n\r\n",
        )
        .unwrap();
        assert_eq!(head.header_count(), 2);
        assert_eq!(head.header("x-folded"), Some(&b"a"[..]));
        assert_eq!(head.get::<ContentLength>().unwrap(), Some(3));
    }

    #[test]
    fn invalid_content_length_is_an_error() {
        let head = head(b"HTTP/1.1 200 OK\r\nContent-Length: ten\r\n\r\n").unwrap();
        assert!(head.get::<ContentLength>().is_err());
    }
}
