//! Maps untrusted request targets onto files below the served root.
//!
//! The one invariant that matters: a [`ResolvedTarget`] only ever points at
//! the canonical root or something inside it. `..` segments are applied
//! lexically first and may not climb above the root; the surviving path is
//! then canonicalized so symlinks pointing outside are caught as well.

use std::{
    io,
    path::{Path, PathBuf},
};

use courier_wire::percent::{self, DecodeError, PlusPolicy};
use log::debug;

pub const INDEX_FILE: &str = "index.html";

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("target escapes the root")]
    Forbidden,
    #[error("target does not exist")]
    NotFound,
    #[error("target is not a valid encoded path")]
    Malformed(#[from] DecodeError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub is_directory: bool,
    /// Canonical path, inside the root
    pub path: PathBuf,
    /// Decoded, normalized path relative to the root: `/` or `/a/b`
    pub display_path: String,
    /// `index.html` directly inside a directory target
    pub index_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Resolver {
    root: PathBuf,
    plus: PlusPolicy,
}

impl Resolver {
    /// Canonicalizes `root`, which must be a directory
    pub fn new(root: impl AsRef<Path>, plus: PlusPolicy) -> io::Result<Self> {
        let root = std::fs::canonicalize(root)?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                "root is not a directory",
            ));
        }
        Ok(Self { root, plus })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn resolve(&self, raw_target: &str) -> Result<ResolvedTarget, ResolveError> {
        let raw_path = raw_target.split(['?', '#']).next().unwrap_or_default();
        let decoded = percent::decode(raw_path.as_bytes(), self.plus)?;
        let segments = normalize(decoded.strip_prefix('/').unwrap_or(&decoded))?;

        let candidate = segments
            .iter()
            .fold(self.root.clone(), |path, segment| path.join(segment));
        let path = self.contain(&candidate).await?;

        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|_| ResolveError::NotFound)?;
        let display_path = format!("/{}", segments.join("/"));

        if metadata.is_dir() {
            let index_file = self.index_in(&path).await;
            Ok(ResolvedTarget {
                is_directory: true,
                path,
                display_path,
                index_file,
            })
        } else if metadata.is_file() {
            Ok(ResolvedTarget {
                is_directory: false,
                path,
                display_path,
                index_file: None,
            })
        } else {
            debug!("refusing special file {}", path.display());
            Err(ResolveError::Forbidden)
        }
    }

    /// Canonicalizes `candidate` and checks it did not leave the root
    async fn contain(&self, candidate: &Path) -> Result<PathBuf, ResolveError> {
        let canonical = match tokio::fs::canonicalize(candidate).await {
            Ok(path) => path,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(ResolveError::NotFound);
            }
            Err(err) => {
                debug!("cannot canonicalize {}: {err}", candidate.display());
                return Err(ResolveError::Forbidden);
            }
        };
        if canonical.starts_with(&self.root) {
            Ok(canonical)
        } else {
            debug!(
                "{} resolves outside the root to {}",
                candidate.display(),
                canonical.display()
            );
            Err(ResolveError::Forbidden)
        }
    }

    async fn index_in(&self, dir: &Path) -> Option<PathBuf> {
        let index = self.contain(&dir.join(INDEX_FILE)).await.ok()?;
        tokio::fs::metadata(&index)
            .await
            .is_ok_and(|m| m.is_file())
            .then_some(index)
    }
}

/// Splits a decoded path into segments, dropping empty and `.` segments and
/// applying `..`. Climbing above the root is forbidden.
fn normalize(path: &str) -> Result<Vec<&str>, ResolveError> {
    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop().ok_or(ResolveError::Forbidden)?;
            }
            segment => segments.push(segment),
        }
    }
    Ok(segments)
}
