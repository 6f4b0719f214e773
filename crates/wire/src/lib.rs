//! Wire protocol shared by the courier fetcher and server.
//!
//! Both roles speak a small subset of HTTP/1.1: a single GET request per
//! connection, answered by a response whose body is delimited either by
//! `Content-Length` or by the connection closing. This crate holds the pieces
//! both sides agree on, with no I/O of its own:
//!
//! - [`url`]: the `http://host[:port]/path` URLs the fetcher accepts
//! - [`head`]: incremental framing of a message head across partial reads
//! - [`response`] and [`header`]: status line and header field parsing
//! - [`request`]: request line parsing and the fetcher's request encoding
//! - [`percent`]: percent coding of request paths

pub mod head;
pub mod header;
pub mod percent;
pub mod request;
pub mod response;
pub mod url;

mod status;
mod version;

pub use head::HeadBuffer;
pub use request::{Method, RequestLine, RequestLineError};
pub use response::{HeadParseError, ResponseHead};
pub use status::{InvalidStatusCode, StatusCode};
pub use url::{ParsedUrl, UrlError};
pub use version::{HttpVersion, ParseHttpVersionError};
