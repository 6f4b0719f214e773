use std::path::PathBuf;

/// Size of the scratch buffer every socket read goes through
pub const DEFAULT_BUFFER_SIZE: usize = 4096;
pub const DEFAULT_MAX_REDIRECTS: usize = 5;
/// A head larger than this is rejected instead of buffered without bound
pub const DEFAULT_MAX_HEAD_BYTES: usize = 64 * 1024;
pub const DEFAULT_USER_AGENT: &str = concat!("courier-fetch/", env!("CARGO_PKG_VERSION"));

static_assertions::const_assert!(DEFAULT_BUFFER_SIZE >= 4);
static_assertions::const_assert!(DEFAULT_MAX_HEAD_BYTES >= DEFAULT_BUFFER_SIZE);

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub buffer_size: usize,
    /// Redirects followed across the whole chain before giving up
    pub max_redirects: usize,
    pub max_head_bytes: usize,
    pub user_agent: String,
    /// Directory the downloaded file is written into
    pub output_dir: PathBuf,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            max_head_bytes: DEFAULT_MAX_HEAD_BYTES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            output_dir: PathBuf::from("."),
        }
    }
}
