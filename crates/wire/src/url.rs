//! Parsing of the `http://host[:port]/path` URLs the fetcher accepts.
//!
//! Only the plain `http` scheme is supported. The host is taken verbatim and
//! the path is never percent-decoded: it is sent on the wire exactly as given.

use std::{fmt, str::FromStr};

pub const DEFAULT_PORT: u16 = 80;

const HTTP_PREFIX: &str = "http://";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlError {
    #[error("URL must start with http://, got {0:?}")]
    InvalidScheme(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    /// Always begins with `/`
    pub path: String,
}

impl ParsedUrl {
    pub fn parse(url: &str) -> Result<Self, UrlError> {
        let rest = url
            .strip_prefix(HTTP_PREFIX)
            .ok_or_else(|| UrlError::InvalidScheme(url.to_string()))?;

        let (authority, path) = match rest.find('/') {
            Some(slash) => rest.split_at(slash),
            None => (rest, "/"),
        };

        // An unparsable or missing port silently falls back to 80
        let (host, port) = match authority.split_once(':') {
            Some((host, port)) => (host, port.parse().unwrap_or(DEFAULT_PORT)),
            None => (authority, DEFAULT_PORT),
        };

        Ok(Self {
            scheme: Scheme::Http,
            host: host.to_string(),
            port,
            path: path.to_string(),
        })
    }

    /// Resolves a redirect target against this URL.
    ///
    /// Absolute `http://` locations replace the URL entirely, a location
    /// starting with `/` keeps the current host and port.
    pub fn join(&self, location: &str) -> Result<Self, UrlError> {
        if location.starts_with('/') {
            return Ok(Self {
                path: location.to_string(),
                ..self.clone()
            });
        }
        Self::parse(location)
    }

    /// The value of the `Host` header: the port is omitted when it is 80
    pub fn authority(&self) -> String {
        if self.port == DEFAULT_PORT {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// The last path segment with any query dropped
    ///
    /// Returns `None` when the path ends in `/` or the segment is `.` / `..`,
    /// callers substitute their own default name.
    pub fn file_name(&self) -> Option<&str> {
        let path = self.path.split(['?', '#']).next().unwrap_or_default();
        let segment = path.rsplit('/').next().unwrap_or_default();
        match segment {
            "" | "." | ".." => None,
            name => Some(name),
        }
    }
}

impl FromStr for ParsedUrl {
    type Err = UrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ParsedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}:{}{}", HTTP_PREFIX, self.host, self.port, self.path)
    }
}
