//! One request per connection: read the head, answer, close.

use courier_wire::{HeadBuffer, RequestLine, RequestLineError};
use log::{debug, info, warn};
use memchr::memchr;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{
    config::ServerConfig,
    error::{RequestError, ServerError},
    render,
    resolve::{ResolveError, ResolvedTarget, Resolver},
};

/// State shared by every connection, read-only once serving
#[derive(Debug)]
pub struct ServerContext {
    pub config: ServerConfig,
    pub resolver: Resolver,
}

impl ServerContext {
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let resolver =
            Resolver::new(&config.root, config.plus).map_err(|source| ServerError::InvalidRoot {
                path: config.root.clone(),
                source,
            })?;
        Ok(Self { config, resolver })
    }
}

/// What was read of a request head
struct RequestHead {
    bytes: HeadBuffer,
    /// The read stopped because `buffer_size` bytes arrived before the end
    /// of the request line
    filled: bool,
}

/// Reads until the request line is complete, EOF or `buffer_size` bytes.
/// Only the request line is acted on, so the rest of the head is not waited
/// for. `None` when the peer sent nothing at all.
async fn read_request_head<S>(conn: &mut S, buffer_size: usize) -> Option<RequestHead>
where
    S: AsyncRead + Unpin,
{
    let mut head = HeadBuffer::with_capacity(buffer_size);
    let mut chunk = vec![0u8; buffer_size];
    let mut line_done = false;
    while !line_done && head.len() < buffer_size {
        let room = buffer_size - head.len();
        let n = match conn.read(&mut chunk[..room]).await {
            Ok(n) => n,
            Err(err) => {
                debug!("read failed: {err}");
                0
            }
        };
        if n == 0 {
            break;
        }
        line_done = memchr(b'\n', &chunk[..n]).is_some();
        head.push(&chunk[..n]);
    }
    if head.is_empty() {
        return None;
    }
    let filled = !line_done && head.len() >= buffer_size;
    Some(RequestHead {
        bytes: head,
        filled,
    })
}

/// Turns a request head into the file or directory to send back
async fn route(head: &RequestHead, ctx: &ServerContext) -> Result<ResolvedTarget, RequestError> {
    let limit = ctx.config.max_path_len;
    let line = RequestLine::parse(head.bytes.as_bytes()).map_err(|err| match err {
        RequestLineError::MethodNotAllowed(method) => RequestError::MethodNotAllowed(method),
        RequestLineError::UnterminatedTarget if head.filled => RequestError::PathTooLong {
            len: head.bytes.len().saturating_sub("GET ".len()),
            limit,
        },
        RequestLineError::UnterminatedTarget | RequestLineError::InvalidTarget => {
            RequestError::MalformedRequest
        }
    })?;

    if line.raw_target.len() > limit {
        return Err(RequestError::PathTooLong {
            len: line.raw_target.len(),
            limit,
        });
    }
    debug!("GET {}", line.raw_target);

    ctx.resolver
        .resolve(&line.raw_target)
        .await
        .map_err(|err| match err {
            ResolveError::Forbidden => RequestError::Forbidden,
            ResolveError::NotFound => RequestError::NotFound,
            ResolveError::Malformed(err) => {
                debug!("undecodable target {:?}: {err}", line.raw_target);
                RequestError::MalformedRequest
            }
        })
}

pub async fn handle<S>(mut conn: S, ctx: &ServerContext)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let Some(head) = read_request_head(&mut conn, ctx.config.buffer_size).await else {
        debug!("connection closed before a request arrived");
        return;
    };

    match route(&head, ctx).await {
        Ok(target) => {
            info!("200 {}", target.display_path);
            match (target.is_directory, &target.index_file) {
                (true, Some(index)) => {
                    render::render_file(&mut conn, index, ctx.config.buffer_size).await;
                }
                (true, None) => {
                    render::render_directory_listing(
                        &mut conn,
                        &target.path,
                        ctx.resolver.root(),
                        &target.display_path,
                    )
                    .await;
                }
                (false, _) => {
                    render::render_file(&mut conn, &target.path, ctx.config.buffer_size).await;
                }
            }
        }
        Err(err) => {
            warn!("{} {err}", err.status_code());
            render::render_error(&mut conn, err.status_code(), err.public_message()).await;
        }
    }

    if let Err(err) = conn.flush().await {
        debug!("flush failed: {err}");
    }
    if let Err(err) = conn.shutdown().await {
        debug!("shutdown failed: {err}");
    }
}

#[cfg(test)]
mod tests {
    use courier_test_suite::{HELLO_TXT, INDEX_HTML, ScriptedStream, site};
    use tempfile::TempDir;

    use super::*;

    fn context() -> (TempDir, ServerContext) {
        let site = site().unwrap();
        let ctx = ServerContext::new(ServerConfig::new(site.path())).unwrap();
        (site, ctx)
    }

    async fn exchange(ctx: &ServerContext, stream: ScriptedStream) -> String {
        let written = stream.written();
        handle(stream, ctx).await;
        written.text()
    }

    async fn request(ctx: &ServerContext, raw: &str) -> String {
        exchange(ctx, ScriptedStream::new([raw.to_string()])).await
    }

    #[tokio::test]
    async fn serves_file() {
        let (_site, ctx) = context();
        let resp = request(&ctx, "GET /hello.txt HTTP/1.1\r\nHost: x\r\n\r\n").await;
        assert!(resp.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(resp.contains("Content-Length: 10\r\n"));
        assert!(resp.ends_with(std::str::from_utf8(HELLO_TXT).unwrap()));
    }

    #[tokio::test]
    async fn head_split_across_reads() {
        let (_site, ctx) = context();
        let raw = b"GET /hello.txt HTTP/1.1\r\nHost: x\r\n\r\n";
        let resp = exchange(&ctx, ScriptedStream::chunked(raw, 1)).await;
        assert!(resp.starts_with("HTTP/1.1 200 OK\r\n"));
    }

    #[tokio::test]
    async fn head_without_terminator_still_answered() {
        let (_site, ctx) = context();
        let resp = request(&ctx, "GET /hello.txt HTTP/1.0\r\n").await;
        assert!(resp.starts_with("HTTP/1.1 200 OK\r\n"));
    }

    #[tokio::test]
    async fn directory_index_and_listing() {
        let (_site, ctx) = context();
        let resp = request(&ctx, "GET /site/ HTTP/1.1\r\n\r\n").await;
        assert!(resp.ends_with(std::str::from_utf8(INDEX_HTML).unwrap()));

        let resp = request(&ctx, "GET /docs HTTP/1.1\r\n\r\n").await;
        assert!(resp.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(!resp.contains("Content-Length"));
        assert!(resp.contains("href=\"/docs/report.pdf\""));
    }

    #[tokio::test]
    async fn error_statuses() {
        let (_site, ctx) = context();
        for (raw, status) in [
            ("POST /hello.txt HTTP/1.1\r\n\r\n", "405 Method Not Allowed"),
            ("HEAD / HTTP/1.1\r\n\r\n", "405 Method Not Allowed"),
            ("GET /missing.txt HTTP/1.1\r\n\r\n", "404 Not Found"),
            ("GET /../../etc/passwd HTTP/1.1\r\n\r\n", "403 Forbidden"),
            ("GET /bad%zz HTTP/1.1\r\n\r\n", "400 Bad Request"),
            ("GET /hello.txt\r\n\r\n", "400 Bad Request"),
        ] {
            let resp = request(&ctx, raw).await;
            assert!(resp.starts_with(&format!("HTTP/1.1 {status}\r\n")), "{raw:?}: {resp}");
        }
    }

    #[tokio::test]
    async fn long_target_is_414() {
        let (_site, ctx) = context();
        let target = format!("/{}", "a".repeat(ctx.config.max_path_len));
        let resp = request(&ctx, &format!("GET {target} HTTP/1.1\r\n\r\n")).await;
        assert!(resp.starts_with("HTTP/1.1 414 URI Too Long\r\n"), "{resp}");
    }

    #[tokio::test]
    async fn target_filling_the_buffer_is_414() {
        let site = site().unwrap();
        let mut config = ServerConfig::new(site.path());
        config.buffer_size = 64;
        config.max_path_len = 32;
        let ctx = ServerContext::new(config).unwrap();

        let raw = format!("GET /{}", "b".repeat(100));
        let resp = request(&ctx, &raw).await;
        assert!(resp.starts_with("HTTP/1.1 414 URI Too Long\r\n"), "{resp}");
    }

    #[tokio::test]
    async fn answers_once_request_line_arrives() {
        let (_site, ctx) = context();
        let (mut client, server) = tokio::io::duplex(4096);
        client
            .write_all(b"GET /hello.txt HTTP/1.1\r\n")
            .await
            .unwrap();

        // The client never finishes its head and keeps its end open
        let mut resp = Vec::new();
        let (_, read) = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            async { tokio::join!(handle(server, &ctx), client.read_to_end(&mut resp)) },
        )
        .await
        .unwrap();
        read.unwrap();
        assert!(resp.starts_with(b"HTTP/1.1 200 OK\r\n"));
        assert!(resp.ends_with(HELLO_TXT));
    }

    #[tokio::test]
    async fn silent_peer_gets_nothing() {
        let (_site, ctx) = context();
        let resp = exchange(&ctx, ScriptedStream::new(Vec::<Vec<u8>>::new())).await;
        assert!(resp.is_empty());
    }

    #[test]
    fn invalid_root() {
        let err = ServerContext::new(ServerConfig::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, ServerError::InvalidRoot { .. }));
    }
}
