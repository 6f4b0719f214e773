use std::{future::Future, io};

use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::{TcpStream, lookup_host},
};

#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("could not resolve {host}")]
    Dns {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("could not connect to {host}:{port}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },
}

/// Opens the byte stream for one fetch hop
pub trait Connector: Send + Sync + 'static {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    fn connect(
        &self,
        host: &str,
        port: u16,
    ) -> impl Future<Output = Result<Self::Stream, ConnectError>> + Send;
}

/// Resolves the host and connects over TCP, trying each address in turn
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self, host: &str, port: u16) -> Result<TcpStream, ConnectError> {
        let dns = |source| ConnectError::Dns {
            host: host.to_string(),
            source,
        };
        let addrs: Vec<_> = lookup_host((host, port)).await.map_err(dns)?.collect();
        if addrs.is_empty() {
            return Err(dns(io::Error::new(
                io::ErrorKind::NotFound,
                "no addresses returned",
            )));
        }

        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect(addr).await {
                Ok(stream) => return Ok(stream),
                Err(err) => {
                    log::debug!("connect to {addr} failed: {err}");
                    last_err = Some(err);
                }
            }
        }
        Err(ConnectError::Connect {
            host: host.to_string(),
            port,
            source: last_err
                .unwrap_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "no address tried")),
        })
    }
}
