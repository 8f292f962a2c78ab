use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Removes the wrapped local file when dropped, unless [`keep`](Self::keep) was called
pub struct LocalFile {
    path: PathBuf,
    armed: bool,
}

impl LocalFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Leave the file on disk and hand back its path
    pub fn keep(mut self) -> PathBuf {
        self.armed = false;
        std::mem::take(&mut self.path)
    }
}

impl Drop for LocalFile {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed local copy"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove local copy"),
        }
    }
}
