//! Writes complete responses to a connection.
//!
//! None of these return errors: once a response has started there is nothing
//! useful left to tell the client, so send failures are logged at debug level
//! and the handler goes on to close the connection.

mod listing;
mod mime;

use std::{io::SeekFrom, path::Path};

use bytes::Bytes;
use courier_wire::StatusCode;
use log::debug;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncSeekExt, AsyncWrite, AsyncWriteExt},
};

pub use listing::{DirectoryEntry, EntryKind, entry_href, escape_html, listing_html, read_entries};
pub use mime::{OCTET_STREAM, content_type};

use crate::response::ResponseBuilder;

/// Writes `bytes`, returning whether the peer took all of them
async fn send<W>(conn: &mut W, bytes: &[u8]) -> bool
where
    W: AsyncWrite + Unpin,
{
    match conn.write_all(bytes).await {
        Ok(()) => true,
        Err(err) => {
            debug!("send failed: {err}");
            false
        }
    }
}

pub fn error_page(status: StatusCode, message: &str) -> Bytes {
    let reason = status.canonical_reason().unwrap_or("Unknown Reason");
    let body = format!(
        "<html><body><h1>{status} {reason}</h1><p>{}</p></body></html>",
        escape_html(message)
    );
    ResponseBuilder::new(status)
        .header("Content-Type", "text/html")
        .body(Bytes::from(body))
        .build()
}

pub async fn render_error<W>(conn: &mut W, status: StatusCode, message: &str)
where
    W: AsyncWrite + Unpin,
{
    send(conn, &error_page(status, message)).await;
}

/// Streams the file at `path` in chunks of `buffer_size` bytes
pub async fn render_file<W>(conn: &mut W, path: &Path, buffer_size: usize)
where
    W: AsyncWrite + Unpin,
{
    let mut file = match File::open(path).await {
        Ok(file) => file,
        Err(err) => {
            debug!("cannot open {}: {err}", path.display());
            return render_error(
                conn,
                StatusCode::NOT_FOUND,
                "The requested resource was not found.",
            )
            .await;
        }
    };
    let len = match measure(&mut file).await {
        Ok(len) => len,
        Err(err) => {
            debug!("cannot size {}: {err}", path.display());
            return render_error(
                conn,
                StatusCode::INTERNAL_SERVER_ERROR,
                "The file could not be read.",
            )
            .await;
        }
    };

    let head = ResponseBuilder::new(StatusCode::OK)
        .header("Content-Type", content_type(path))
        .content_length(len)
        .build();
    if !send(conn, &head).await {
        return;
    }

    let mut chunk = vec![0u8; buffer_size.max(1)];
    loop {
        let n = match file.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) => {
                debug!("read of {} failed mid-body: {err}", path.display());
                break;
            }
        };
        if !send(conn, &chunk[..n]).await {
            break;
        }
    }
}

/// Seeks to the end for the size, then back to the start
async fn measure(file: &mut File) -> std::io::Result<u64> {
    let len = file.seek(SeekFrom::End(0)).await?;
    file.seek(SeekFrom::Start(0)).await?;
    Ok(len)
}

/// Lists `dir`, leaving out entries that resolve outside the canonical
/// `root`. The page is streamed without a `Content-Length` and ends when the
/// connection closes.
pub async fn render_directory_listing<W>(conn: &mut W, dir: &Path, root: &Path, display_path: &str)
where
    W: AsyncWrite + Unpin,
{
    let entries = match read_entries(dir, root).await {
        Ok(entries) => entries,
        Err(err) => {
            debug!("cannot list {}: {err}", dir.display());
            return render_error(
                conn,
                StatusCode::FORBIDDEN,
                "Access to this resource is denied.",
            )
            .await;
        }
    };

    let head = ResponseBuilder::new(StatusCode::OK)
        .header("Content-Type", "text/html")
        .build();
    if send(conn, &head).await {
        send(conn, listing_html(display_path, &entries).as_bytes()).await;
    }
}

#[cfg(test)]
mod tests {
    use courier_test_suite::{HELLO_TXT, INDEX_HTML, site};

    use super::*;

    fn split(resp: &[u8]) -> (String, &[u8]) {
        let end = resp
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .expect("no head terminator")
            + 4;
        (String::from_utf8_lossy(&resp[..end]).into_owned(), &resp[end..])
    }

    #[tokio::test]
    async fn error_length_matches_body() {
        let mut out = Vec::new();
        render_error(&mut out, StatusCode::NOT_FOUND, "no <such> file").await;
        let (head, body) = split(&out);
        assert!(head.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(head.contains("Content-Type: text/html\r\n"));
        assert!(head.contains(&format!("Content-Length: {}\r\n", body.len())));
        assert!(head.ends_with("Connection: close\r\n\r\n"));
        let body = String::from_utf8_lossy(body);
        assert!(body.contains("404 Not Found"));
        assert!(body.contains("no &lt;such&gt; file"));
    }

    #[tokio::test]
    async fn file_streams_in_small_chunks() {
        let site = site().unwrap();
        let mut out = Vec::new();
        render_file(&mut out, &site.path().join("hello.txt"), 3).await;
        let (head, body) = split(&out);
        assert_eq!(
            head,
            concat!(
                "HTTP/1.1 200 OK\r\n",
                "Content-Type: text/plain\r\n",
                "Content-Length: 10\r\n",
                "Connection: close\r\n\r\n",
            )
        );
        assert_eq!(body, HELLO_TXT);
    }

    #[tokio::test]
    async fn html_file() {
        let site = site().unwrap();
        let mut out = Vec::new();
        render_file(&mut out, &site.path().join("site/index.html"), 4096).await;
        let (head, body) = split(&out);
        assert!(head.contains("Content-Type: text/html\r\n"));
        assert_eq!(body, INDEX_HTML);
    }

    #[tokio::test]
    async fn missing_file_is_404() {
        let site = site().unwrap();
        let mut out = Vec::new();
        render_file(&mut out, &site.path().join("gone.txt"), 4096).await;
        assert!(out.starts_with(b"HTTP/1.1 404 Not Found\r\n"));
    }

    #[tokio::test]
    async fn listing_has_no_length() {
        let site = site().unwrap();
        let mut out = Vec::new();
        let root = site.path().canonicalize().unwrap();
        render_directory_listing(&mut out, &root.join("docs"), &root, "/docs").await;
        let (head, body) = split(&out);
        assert_eq!(
            head,
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n"
        );
        let body = String::from_utf8_lossy(body);
        assert!(body.contains("href=\"/docs/a%20b.txt\""));
        assert!(body.contains("href=\"/docs/notes/\""));
        assert!(body.find("a b.txt") < body.find("notes"));
        assert!(body.find("notes") < body.find("report.pdf"));
    }

    #[tokio::test]
    async fn unreadable_directory_is_403() {
        let site = site().unwrap();
        let mut out = Vec::new();
        let root = site.path().canonicalize().unwrap();
        render_directory_listing(&mut out, &root.join("missing"), &root, "/missing").await;
        assert!(out.starts_with(b"HTTP/1.1 403 Forbidden\r\n"));
    }
}
