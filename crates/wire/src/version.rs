use std::str::FromStr;

/// HTTP Version
/// RFC 9110, section 2.5: Protocol Version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpVersion {
    pub major: u8,
    pub minor: u8,
}

impl HttpVersion {
    pub const HTTP_1_0: Self = Self { major: 1, minor: 0 };
    pub const HTTP_1_1: Self = Self { major: 1, minor: 1 };

    /// Both peers only ever speak 1.0 or 1.1
    pub fn is_http1(&self) -> bool {
        *self == Self::HTTP_1_0 || *self == Self::HTTP_1_1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid HTTP version")]
pub struct ParseHttpVersionError;

impl FromStr for HttpVersion {
    type Err = ParseHttpVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = s
            .strip_prefix("HTTP/")
            .and_then(|rest| rest.split_once('.'))
            .ok_or(ParseHttpVersionError)?;
        let digit = |part: &str| -> Result<u8, ParseHttpVersionError> {
            match part.as_bytes() {
                [d] if d.is_ascii_digit() => Ok(d - b'0'),
                _ => Err(ParseHttpVersionError),
            }
        };
        Ok(HttpVersion {
            major: digit(major)?,
            minor: digit(minor)?,
        })
    }
}

impl std::fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP/{}.{}", self.major, self.minor)
    }
}
