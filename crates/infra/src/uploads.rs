//! Local photo storage.

use std::io;
use std::path::PathBuf;

use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct PhotoStore {
    dir: PathBuf,
}

impl PhotoStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create the upload directory (and parents) if missing.
    pub async fn ensure_dir(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        info!(path = %self.dir.display(), "upload directory ready");
        Ok(())
    }

    /// Write `bytes` as `file_name`, replacing any previous file of that name.
    /// `file_name` must be a bare name without path separators.
    pub async fn save(&self, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        if file_name.is_empty() || file_name.contains(['/', '\\']) || file_name.starts_with('.') {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("refusing to store `{file_name}`"),
            ));
        }
        let path = self.dir.join(file_name);
        tokio::fs::write(&path, bytes).await?;
        debug!(path = %path.display(), size = bytes.len(), "photo stored");
        Ok(path)
    }
}
