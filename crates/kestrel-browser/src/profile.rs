use crate::Result;
use std::path::{Path, PathBuf};

/// User-data directory handed to the Chrome process.
///
/// Ephemeral profiles are removed when dropped; reusable ones outlive the run.
pub struct Profile {
    path: PathBuf,
    ephemeral: bool,
}

impl Profile {
    /// Fresh scratch directory, deleted when the profile is dropped
    pub fn ephemeral() -> Result<Self> {
        let dir = tempfile::tempdir()?;

        Ok(Self {
            path: dir.keep(),
            ephemeral: true,
        })
    }

    /// Reuse (or create) a directory that outlives the run
    pub fn at(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            std::fs::create_dir_all(&path)?;
        }

        Ok(Self {
            path,
            ephemeral: false,
        })
    }

    /// The user-data directory path
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }
}

impl Drop for Profile {
    fn drop(&mut self) {
        if self.ephemeral && self.path.exists() {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }
}
