use std::{
    net::{Ipv4Addr, SocketAddr},
    path::PathBuf,
};

use courier_wire::percent::PlusPolicy;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BUFFER_SIZE: usize = 4096;
pub const DEFAULT_MAX_PATH_LEN: usize = 1024;
pub const DEFAULT_MAX_CONNECTIONS: usize = 32;
pub const DEFAULT_BACKLOG: u32 = 128;

static_assertions::const_assert!(DEFAULT_MAX_PATH_LEN < DEFAULT_BUFFER_SIZE);

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Directory served, never written to
    pub root: PathBuf,
    /// Bytes read for a request head and per chunk of a streamed file
    pub buffer_size: usize,
    /// Longest request target accepted before answering 414
    pub max_path_len: usize,
    /// Connections handled at once, further clients wait in the backlog
    pub max_connections: usize,
    pub backlog: u32,
    pub plus: PlusPolicy,
}

impl ServerConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            root: root.into(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_path_len: DEFAULT_MAX_PATH_LEN,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            backlog: DEFAULT_BACKLOG,
            plus: PlusPolicy::default(),
        }
    }
}
