use std::{io, path::PathBuf};

use courier_wire::{StatusCode, UrlError, header::HeaderParseError};

use crate::connector::ConnectError;

/// Why a fetch failed. Every variant is terminal: nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    InvalidUrl(#[from] UrlError),
    #[error(transparent)]
    Connect(#[from] ConnectError),
    #[error("failed to send request")]
    Send(#[source] io::Error),
    #[error("failed to receive response")]
    Recv(#[source] io::Error),
    #[error("connection closed before the response head was complete")]
    IncompleteResponse,
    #[error("response head exceeds {limit} bytes")]
    HeadTooLarge { limit: usize },
    #[error("could not parse response head: {0}")]
    BadStatusLine(#[from] courier_wire::HeadParseError),
    #[error("redirect ({0}) without a Location header")]
    MissingRedirectLocation(StatusCode),
    #[error("too many redirects (limit {limit})")]
    TooManyRedirects { limit: usize },
    #[error("server answered {status}")]
    NonSuccessStatus { status: StatusCode },
    #[error("invalid header value")]
    InvalidHeader(#[from] HeaderParseError),
    #[error("connection closed after {received} of {expected} body bytes")]
    TruncatedBody { expected: u64, received: u64 },
    #[error("could not write {}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

static_assertions::assert_impl_all!(FetchError: Send, Sync, std::error::Error);

impl FetchError {
    /// The status code a non-success response carried, if that is what failed
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::NonSuccessStatus { status } => Some(*status),
            _ => None,
        }
    }
}
