//! Files on disk that strategies read from and write to.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Inputs strictly below this many bytes are small.
pub const SMALL_LIMIT: u64 = 50 * 1024;

/// Inputs strictly above this many bytes are large.
pub const LARGE_LIMIT: u64 = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

impl SizeClass {
    pub fn of(bytes: u64) -> Self {
        if bytes < SMALL_LIMIT {
            SizeClass::Small
        } else if bytes > LARGE_LIMIT {
            SizeClass::Large
        } else {
            SizeClass::Medium
        }
    }
}

/// A named file with a lazily measured size.
///
/// The size is cached after [`Artifact::load_size`]; until then the artifact
/// classifies as [`SizeClass::Medium`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    path: PathBuf,
    size: Option<u64>,
}

impl Artifact {
    /// An artifact whose size has not been measured yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            size: None,
        }
    }

    /// An artifact with a size already known to the caller.
    pub fn with_size(path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            path: path.into(),
            size: Some(size),
        }
    }

    /// Opens an existing file and measures it.
    pub async fn measured(path: impl Into<PathBuf>) -> io::Result<Self> {
        let mut artifact = Self::new(path);
        artifact.load_size().await?;
        Ok(artifact)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> Cow<'_, str> {
        self.path.to_string_lossy()
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub async fn load_size(&mut self) -> io::Result<u64> {
        let size = fs::metadata(&self.path).await?.len();
        self.size = Some(size);
        Ok(size)
    }

    pub fn size_class(&self) -> SizeClass {
        self.size.map(SizeClass::of).unwrap_or(SizeClass::Medium)
    }

    pub fn is_small(&self) -> bool {
        self.size_class() == SizeClass::Small
    }

    pub fn is_large(&self) -> bool {
        self.size_class() == SizeClass::Large
    }

    pub async fn exists(&self) -> io::Result<bool> {
        fs::try_exists(&self.path).await
    }

    /// Deletes the file. A file that is already gone is not an error.
    pub async fn remove(&self) -> io::Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!("Removed {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Copies this artifact's bytes over `destination`, returning the byte count.
    pub async fn copy_to(&self, destination: &Artifact) -> io::Result<u64> {
        fs::copy(&self.path, &destination.path).await
    }
}
