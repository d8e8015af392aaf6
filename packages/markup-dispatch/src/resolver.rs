//! Resource resolution for handlers that follow external references.
//!
//! The parser only stores the resolver and hands it out through
//! `Parser::resolver`; it never calls it.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{DispatchError, Result};

/// Resolves a location found in markup to the text it refers to.
pub trait ResourceResolver {
    /// Fetch the resource at `location`.
    fn fetch(&self, location: &str) -> Result<String>;
}

/// Resolver reading UTF-8 files below a root directory.
///
/// Locations are relative paths. Absolute paths and `..` components are
/// rejected, and so is any location that resolves outside the root once
/// symlinks are followed.
#[derive(Debug, Clone)]
pub struct FsResolver {
    root: PathBuf,
}

impl FsResolver {
    /// Create a resolver rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a location to a path below the root.
    pub fn path_for(&self, location: &str) -> Result<PathBuf> {
        let relative = Path::new(location.trim());
        let escapes = relative.as_os_str().is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(DispatchError::ResourceOutsideRoot(location.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl ResourceResolver for FsResolver {
    fn fetch(&self, location: &str) -> Result<String> {
        let path = self.path_for(location)?;

        let canonical_root = self.root.canonicalize()?;
        let canonical_path = path.canonicalize()?;
        if !canonical_path.starts_with(&canonical_root) {
            tracing::warn!(
                location,
                resolved = %canonical_path.display(),
                "Resource resolves outside resolver root"
            );
            return Err(DispatchError::ResourceOutsideRoot(location.to_string()));
        }

        tracing::debug!(path = %canonical_path.display(), "Fetching resource");
        Ok(fs::read_to_string(&canonical_path)?)
    }
}
