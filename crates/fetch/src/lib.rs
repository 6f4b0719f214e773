//! The courier fetcher: downloads a single `http://` resource to disk,
//! following up to five redirects.
//!
//! ```no_run
//! # async fn run() -> Result<(), courier_fetch::FetchError> {
//! use courier_fetch::{FetchConfig, Fetcher};
//!
//! let fetcher = Fetcher::new(FetchConfig::default());
//! let outcome = fetcher.fetch("http://example.com/index.html").await?;
//! println!("{} bytes in {}", outcome.bytes_written, outcome.saved_as.display());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connector;
pub mod engine;
pub mod error;

pub use config::FetchConfig;
pub use connector::{ConnectError, Connector, TcpConnector};
pub use engine::{DEFAULT_FILE_NAME, FetchOutcome, Fetcher};
pub use error::FetchError;
