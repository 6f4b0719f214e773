use std::{io, path::PathBuf};

use courier_wire::{Method, StatusCode};

/// Startup failures. Once serving, errors are scoped to a single request.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("{} is not a usable directory", path.display())]
    InvalidRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// A request that is answered with an error page
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("path escapes the root or is not accessible")]
    Forbidden,
    #[error("not found")]
    NotFound,
    #[error("method {0} is not allowed")]
    MethodNotAllowed(Method),
    #[error("malformed request")]
    MalformedRequest,
    #[error("request target of {len} bytes exceeds {limit}")]
    PathTooLong { len: usize, limit: usize },
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::MalformedRequest => StatusCode::BAD_REQUEST,
            Self::PathTooLong { .. } => StatusCode::URI_TOO_LONG,
        }
    }

    /// Text shown to the client on the error page
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::Forbidden => "Access to this resource is denied.",
            Self::NotFound => "The requested resource was not found.",
            Self::MethodNotAllowed(_) => "Only the GET method is supported.",
            Self::MalformedRequest => "The request could not be understood.",
            Self::PathTooLong { .. } => "The requested path is too long.",
        }
    }
}

static_assertions::assert_impl_all!(ServerError: Send, Sync, std::error::Error);
static_assertions::assert_impl_all!(RequestError: Send, Sync, std::error::Error);
