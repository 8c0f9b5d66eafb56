//! Document location identity.
//!
//! # Responsibility
//! - Identify one document by the local path its bytes live at.
//! - Derive display name and extension used by lifecycle orchestration.
//!
//! # Invariants
//! - The local-path component alone determines on-disk location.
//! - Extensions compare case-insensitively (normalized to lowercase).

use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// File identity for one openable document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUri {
    path: PathBuf,
}

impl DocumentUri {
    /// Creates a uri from a local filesystem path.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the on-disk location this uri resolves to.
    pub fn local_path(&self) -> &Path {
        &self.path
    }

    /// Returns the final path component, used as the control display title.
    pub fn file_name(&self) -> Option<String> {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }

    /// Returns the lowercase file extension without the leading dot.
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
    }
}

impl Display for DocumentUri {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}
