//! Percent coding for request paths

use std::{borrow::Cow, str::Utf8Error};

use memchr::memchr_iter;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode, utf8_percent_encode};

/// Everything but the RFC 3986 unreserved characters
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Encodes one path segment, leaving RFC 3986 unreserved bytes untouched.
/// A `/` inside the segment is encoded too.
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed percent escape at byte {0}")]
    MalformedEscape(usize),
    #[error(transparent)]
    InvalidUtf8(#[from] Utf8Error),
}

/// How a literal `+` in the input is decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlusPolicy {
    /// RFC 3986: `+` is an ordinary character in a path
    #[default]
    Literal,
    /// `application/x-www-form-urlencoded`: `+` is a space
    Space,
}

/// Decodes `%XX` escapes. Every `%` must start a complete escape and the
/// result must be valid UTF-8. An escaped `%2B` is always a `+`.
pub fn decode(input: &[u8], plus: PlusPolicy) -> Result<String, DecodeError> {
    if let Some(at) = memchr_iter(b'%', input).find(|&i| !is_escape(&input[i + 1..])) {
        return Err(DecodeError::MalformedEscape(at));
    }
    let input: Cow<'_, [u8]> = match plus {
        PlusPolicy::Space if input.contains(&b'+') => input
            .iter()
            .map(|&b| if b == b'+' { b' ' } else { b })
            .collect(),
        _ => Cow::Borrowed(input),
    };
    Ok(percent_decode(&input).decode_utf8()?.into_owned())
}

fn is_escape(rest: &[u8]) -> bool {
    matches!(rest, [hi, lo, ..] if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit())
}
