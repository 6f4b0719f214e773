use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};
use memchr::memchr;

use crate::url::ParsedUrl;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    GET,
    HEAD,
    POST,
    PUT,
    DELETE,
    PATCH,
    OPTIONS,
    CONNECT,
    TRACE,
    Extension(String),
}

impl From<&str> for Method {
    fn from(value: &str) -> Self {
        match value {
            "GET" => Self::GET,
            "HEAD" => Self::HEAD,
            "POST" => Self::POST,
            "PUT" => Self::PUT,
            "DELETE" => Self::DELETE,
            "PATCH" => Self::PATCH,
            "OPTIONS" => Self::OPTIONS,
            "CONNECT" => Self::CONNECT,
            "TRACE" => Self::TRACE,
            other => Self::Extension(other.to_string()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::GET => "GET",
            Self::HEAD => "HEAD",
            Self::POST => "POST",
            Self::PUT => "PUT",
            Self::DELETE => "DELETE",
            Self::PATCH => "PATCH",
            Self::OPTIONS => "OPTIONS",
            Self::CONNECT => "CONNECT",
            Self::TRACE => "TRACE",
            Self::Extension(other) => other,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestLineError {
    #[error("method {0} is not allowed")]
    MethodNotAllowed(Method),
    /// No space after the target, the request line may have been cut short
    #[error("request target is not terminated")]
    UnterminatedTarget,
    #[error("request target is not valid UTF-8")]
    InvalidTarget,
}

/// The start of a request: only GET requests get this far
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: Method,
    /// The target as sent, still percent-encoded
    pub raw_target: String,
}

impl RequestLine {
    const GET_PREFIX: &'static [u8] = b"GET ";

    /// Parses the first line of `head`. Anything after the first line feed is
    /// ignored, so a missing space is never looked for in the headers.
    pub fn parse(head: &[u8]) -> Result<Self, RequestLineError> {
        let line = match memchr(b'\n', head) {
            Some(nl) => head[..nl].strip_suffix(b"\r").unwrap_or(&head[..nl]),
            None => head,
        };

        let Some(rest) = line.strip_prefix(Self::GET_PREFIX) else {
            let token = line.split(|b| *b == b' ').next().unwrap_or_default();
            return Err(RequestLineError::MethodNotAllowed(Method::from(
                String::from_utf8_lossy(token).as_ref(),
            )));
        };
        let end = memchr(b' ', rest).ok_or(RequestLineError::UnterminatedTarget)?;
        let raw_target = std::str::from_utf8(&rest[..end])
            .map_err(|_| RequestLineError::InvalidTarget)?
            .to_string();

        Ok(Self {
            method: Method::GET,
            raw_target,
        })
    }
}

/// Encodes the single request the fetcher ever sends
pub fn encode_get_request(url: &ParsedUrl, user_agent: &str) -> Bytes {
    let host = url.authority();
    let mut buf = BytesMut::with_capacity(128 + url.path.len());
    for part in [
        "GET ",
        url.path.as_str(),
        " HTTP/1.1\r\nHost: ",
        host.as_str(),
        "\r\nUser-Agent: ",
        user_agent,
        "\r\nConnection: close\r\n\r\n",
    ] {
        buf.put_slice(part.as_bytes());
    }
    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_get_target() {
        let line = RequestLine::parse(b"GET /docs/a%20b.txt HTTP/1.1\r\nHost: x\r\n\r\n").unwrap();
        assert_eq!(line.method, Method::GET);
        assert_eq!(line.raw_target, "/docs/a%20b.txt");
    }

    #[test]
    fn other_methods_are_rejected() {
        assert_eq!(
            RequestLine::parse(b"POST / HTTP/1.1\r\n\r\n"),
            Err(RequestLineError::MethodNotAllowed(Method::POST))
        );
        assert_eq!(
            RequestLine::parse(b"get / HTTP/1.1\r\n\r\n"),
            Err(RequestLineError::MethodNotAllowed(Method::Extension("get".into())))
        );
        assert!(matches!(
            RequestLine::parse(b"GET\r\n\r\n"),
            Err(RequestLineError::MethodNotAllowed(_))
        ));
    }

    #[test]
    fn target_must_be_followed_by_space() {
        assert_eq!(
            RequestLine::parse(b"GET /index.html\r\nHost: a b\r\n\r\n"),
            Err(RequestLineError::UnterminatedTarget)
        );
        assert_eq!(
            RequestLine::parse(b"GET /truncated-by-buf"),
            Err(RequestLineError::UnterminatedTarget)
        );
    }

    #[test]
    fn encodes_request_literally() {
        let url = ParsedUrl::parse("http://example.com:8080/a/b?c=d").unwrap();
        let req = encode_get_request(&url, "courier-fetch/0.0.1");
        assert_eq!(
            &req[..],
            b"GET /a/b?c=d HTTP/1.1\r\nHost: example.com:8080\r\nUser-Agent: courier-fetch/0.0.1\r\nConnection: close\r\n\r\n"
        );
    }
}
