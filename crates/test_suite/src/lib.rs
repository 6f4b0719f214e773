//! Test support shared by the courier crates.
//!
//! - [`ScriptedStream`] stands in for a TCP connection whose reads are split
//!   at exactly the points a test chooses.
//! - [`site`] builds a small document root on disk.

mod fixture;
mod stream;

pub use fixture::{HELLO_TXT, INDEX_HTML, site};
pub use stream::{ScriptedStream, Written};
