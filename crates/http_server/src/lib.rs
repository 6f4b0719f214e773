//! A static file server over HTTP/1.1.
//!
//! Every connection carries exactly one `GET`: the target is resolved below
//! the served root, answered with the file, the directory's `index.html` or a
//! generated listing, and the connection is closed.
//!
//! ```no_run
//! use courier_server::{HttpServer, ServerConfig};
//!
//! # async fn run() -> Result<(), courier_server::ServerError> {
//! let server = HttpServer::bind(ServerConfig::new("./public")).await?;
//! server.serve().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod render;
pub mod resolve;
pub mod response;

use std::{net::SocketAddr, sync::Arc};

use log::{debug, info, warn};
use tokio::{
    net::{TcpListener, TcpSocket},
    sync::Semaphore,
};

pub use config::ServerConfig;
pub use error::{RequestError, ServerError};
pub use handler::ServerContext;
pub use resolve::{ResolveError, ResolvedTarget, Resolver};

pub struct HttpServer {
    listener: TcpListener,
    ctx: Arc<ServerContext>,
    limiter: Arc<Semaphore>,
}

impl HttpServer {
    /// Validates the root and starts listening
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let ctx = ServerContext::new(config)?;
        let addr = ctx.config.addr;
        let sock = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4()?,
            SocketAddr::V6(_) => TcpSocket::new_v6()?,
        };
        sock.set_reuseaddr(true)?;
        sock.bind(addr)?;
        let listener = sock.listen(ctx.config.backlog)?;

        let limiter = Arc::new(Semaphore::new(ctx.config.max_connections.max(1)));
        info!(
            "serving {} on {}",
            ctx.resolver.root().display(),
            listener.local_addr()?
        );
        Ok(Self {
            listener,
            ctx: Arc::new(ctx),
            limiter,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts forever. A connection slot is claimed before `accept`, so
    /// clients beyond `max_connections` wait in the listen backlog.
    pub async fn serve(&self) {
        loop {
            let Ok(permit) = self.limiter.clone().acquire_owned().await else {
                // The semaphore is never closed
                return;
            };
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(err) => {
                    warn!("accept failed: {err}");
                    continue;
                }
            };
            debug!("connection from {peer}");

            let ctx = self.ctx.clone();
            tokio::spawn(async move {
                handler::handle(stream, &ctx).await;
                debug!("closed connection from {peer}");
                drop(permit);
            });
        }
    }
}
