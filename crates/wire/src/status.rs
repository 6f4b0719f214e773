use std::{fmt::Display, str::FromStr};

/// A three digit HTTP status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(u16);

impl StatusCode {
    pub const OK: Self = Self(200);
    pub const MOVED_PERMANENTLY: Self = Self(301);
    pub const FOUND: Self = Self(302);
    pub const BAD_REQUEST: Self = Self(400);
    pub const FORBIDDEN: Self = Self(403);
    pub const NOT_FOUND: Self = Self(404);
    pub const METHOD_NOT_ALLOWED: Self = Self(405);
    pub const URI_TOO_LONG: Self = Self(414);
    pub const INTERNAL_SERVER_ERROR: Self = Self(500);

    /// Returns `None` outside of 100..=999
    pub const fn from_u16(code: u16) -> Option<Self> {
        if code >= 100 && code <= 999 {
            Some(Self(code))
        } else {
            None
        }
    }

    /// Only 301 and 302 are followed by the fetcher
    pub const fn is_redirect(&self) -> bool {
        matches!(self.0, 301 | 302)
    }

    pub const fn canonical_reason(&self) -> Option<&'static str> {
        Some(match self.0 {
            200 => "OK",
            301 => "Moved Permanently",
            302 => "Found",
            400 => "Bad Request",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            414 => "URI Too Long",
            500 => "Internal Server Error",
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("status code must be exactly three digits")]
pub struct InvalidStatusCode;

impl FromStr for StatusCode {
    type Err = InvalidStatusCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_digit) {
            return Err(InvalidStatusCode);
        }
        let code = bytes
            .iter()
            .fold(0u16, |acc, d| acc * 10 + u16::from(d - b'0'));
        Self::from_u16(code).ok_or(InvalidStatusCode)
    }
}

impl Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_numeric_parse() {
        assert_eq!("200".parse(), Ok(StatusCode::OK));
        assert_eq!("302".parse(), Ok(StatusCode::FOUND));
        assert_eq!("2020".parse::<StatusCode>(), Err(InvalidStatusCode));
        assert_eq!("20".parse::<StatusCode>(), Err(InvalidStatusCode));
        assert_eq!("OK".parse::<StatusCode>(), Err(InvalidStatusCode));
        assert_eq!("099".parse::<StatusCode>(), Err(InvalidStatusCode));
        assert_eq!("+20".parse::<StatusCode>(), Err(InvalidStatusCode));
    }

    #[test]
    fn redirects_are_301_and_302_only() {
        assert!(StatusCode::MOVED_PERMANENTLY.is_redirect());
        assert!(StatusCode::FOUND.is_redirect());
        assert!(!StatusCode::from_u16(303).unwrap().is_redirect());
        assert!(!StatusCode::OK.is_redirect());
    }

    #[test]
    fn reasons_cover_served_codes() {
        assert_eq!(StatusCode::URI_TOO_LONG.canonical_reason(), Some("URI Too Long"));
        assert_eq!(StatusCode::from_u16(418).unwrap().canonical_reason(), None);
    }
}
