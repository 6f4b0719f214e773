//! Downloads one resource, following redirects.
//!
//! Each hop opens a fresh connection, sends a single `GET` and frames the
//! response with a [`HeadBuffer`]. A 301/302 ends the hop and the loop in
//! [`Fetcher::fetch`] moves on to the `Location`; a 200 streams the body into
//! the output file chunk by chunk, so the body is never held in memory.

use std::path::{Path, PathBuf};

use bytes::{Bytes, BytesMut};
use courier_wire::{
    HeadBuffer, ParsedUrl, ResponseHead, StatusCode,
    header::{ContentLength, ContentType, Location},
    request::encode_get_request,
};
use log::{debug, info};
use tokio::{
    fs::File,
    io::{AsyncRead, AsyncReadExt, AsyncWriteExt, BufWriter},
};

use crate::{
    config::FetchConfig,
    connector::{Connector, TcpConnector},
    error::FetchError,
};

/// Name used when the URL path has no usable last segment
pub const DEFAULT_FILE_NAME: &str = "index.html";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub bytes_written: u64,
    pub saved_as: PathBuf,
    /// Redirects followed before the final response
    pub redirects: usize,
    /// The URL the body was finally downloaded from
    pub url: ParsedUrl,
}

enum Hop {
    Saved { bytes_written: u64, path: PathBuf },
    Redirect(String),
}

/// Framing state of a response whose head has been received
#[derive(Debug)]
struct PendingResponse {
    head: ResponseHead,
    content_length: Option<u64>,
    body_received: u64,
}

impl PendingResponse {
    fn new(head: ResponseHead) -> Result<Self, FetchError> {
        let content_length = head.get::<ContentLength>()?;
        Ok(Self {
            head,
            content_length,
            body_received: 0,
        })
    }

    /// Takes as much of `bytes` as still belongs to the body
    fn accept<'a>(&mut self, bytes: &'a [u8]) -> &'a [u8] {
        let take = match self.content_length {
            Some(expected) => {
                let remaining = expected.saturating_sub(self.body_received);
                bytes.len().min(usize::try_from(remaining).unwrap_or(usize::MAX))
            }
            None => bytes.len(),
        };
        self.body_received += take as u64;
        &bytes[..take]
    }

    fn is_drained(&self) -> bool {
        self.content_length
            .is_some_and(|expected| self.body_received >= expected)
    }
}

pub struct Fetcher<C = TcpConnector> {
    connector: C,
    config: FetchConfig,
}

impl Fetcher<TcpConnector> {
    pub fn new(config: FetchConfig) -> Self {
        Self::with_connector(TcpConnector, config)
    }
}

impl<C: Connector> Fetcher<C> {
    pub fn with_connector(connector: C, config: FetchConfig) -> Self {
        Self { connector, config }
    }

    pub async fn fetch(&self, url: &str) -> Result<FetchOutcome, FetchError> {
        let mut url = ParsedUrl::parse(url)?;
        let mut redirects = 0;
        loop {
            match self.fetch_once(&url).await? {
                Hop::Saved {
                    bytes_written,
                    path,
                } => {
                    return Ok(FetchOutcome {
                        bytes_written,
                        saved_as: path,
                        redirects,
                        url,
                    });
                }
                Hop::Redirect(location) => {
                    redirects += 1;
                    // Checked before the next connect is attempted
                    if redirects > self.config.max_redirects {
                        return Err(FetchError::TooManyRedirects {
                            limit: self.config.max_redirects,
                        });
                    }
                    url = url.join(&location)?;
                    info!("redirect {redirects} to {url}");
                }
            }
        }
    }

    async fn fetch_once(&self, url: &ParsedUrl) -> Result<Hop, FetchError> {
        let file_name = url.file_name().unwrap_or(DEFAULT_FILE_NAME);
        info!("connecting to {}:{} for {}", url.host, url.port, url.path);
        let mut stream = self.connector.connect(&url.host, url.port).await?;

        let request = encode_get_request(url, &self.config.user_agent);
        stream.write_all(&request).await.map_err(FetchError::Send)?;
        stream.flush().await.map_err(FetchError::Send)?;

        let (raw_head, prefetched) = self.read_head(&mut stream).await?;
        let head = ResponseHead::parse(raw_head)?;
        debug!(
            "{} {} with {} header(s)",
            head.version,
            head.status,
            head.header_count()
        );

        if head.status.is_redirect() {
            let location = head
                .get::<Location>()?
                .ok_or(FetchError::MissingRedirectLocation(head.status))?;
            return Ok(Hop::Redirect(location));
        }
        if head.status != StatusCode::OK {
            return Err(FetchError::NonSuccessStatus {
                status: head.status,
            });
        }
        if let Some(content_type) = head.get::<ContentType>()? {
            debug!("content type {content_type}");
        }

        let pending = PendingResponse::new(head)?;
        let path = self.config.output_dir.join(file_name);
        let bytes_written = self
            .save_body(&mut stream, pending, prefetched, &path)
            .await?;
        info!("saved {} ({bytes_written} bytes)", path.display());
        Ok(Hop::Saved {
            bytes_written,
            path,
        })
    }

    /// Reads until the blank line ending the head. Returns the head and the
    /// body bytes that arrived in the same reads.
    async fn read_head<S>(&self, stream: &mut S) -> Result<(Bytes, BytesMut), FetchError>
    where
        S: AsyncRead + Unpin,
    {
        let mut head = HeadBuffer::with_capacity(self.config.buffer_size);
        let mut chunk = vec![0u8; self.config.buffer_size];
        loop {
            let n = stream.read(&mut chunk).await.map_err(FetchError::Recv)?;
            if n == 0 {
                return Err(FetchError::IncompleteResponse);
            }
            if head.push(&chunk[..n]).is_some() {
                break;
            }
            if head.len() > self.config.max_head_bytes {
                return Err(FetchError::HeadTooLarge {
                    limit: self.config.max_head_bytes,
                });
            }
        }
        head.split().map_err(|_| FetchError::IncompleteResponse)
    }

    async fn save_body<S>(
        &self,
        stream: &mut S,
        mut pending: PendingResponse,
        prefetched: BytesMut,
        path: &Path,
    ) -> Result<u64, FetchError>
    where
        S: AsyncRead + Unpin,
    {
        let file_err = |source| FetchError::File {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).await.map_err(file_err)?;
        let mut out = BufWriter::new(file);

        let first = pending.accept(&prefetched);
        out.write_all(first).await.map_err(file_err)?;

        let mut chunk = vec![0u8; self.config.buffer_size];
        while !pending.is_drained() {
            let n = stream.read(&mut chunk).await.map_err(FetchError::Recv)?;
            if n == 0 {
                break;
            }
            let body = pending.accept(&chunk[..n]);
            out.write_all(body).await.map_err(file_err)?;
        }
        out.flush().await.map_err(file_err)?;

        match pending.content_length {
            Some(expected) if pending.body_received < expected => Err(FetchError::TruncatedBody {
                expected,
                received: pending.body_received,
            }),
            _ => {
                debug!(
                    "body of {} complete at {} bytes",
                    pending.head.status, pending.body_received
                );
                Ok(pending.body_received)
            }
        }
    }
}
