use crate::{
    error::CheckpointError,
    state::{StateStore, models::Checkpoint},
};
use async_trait::async_trait;
use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tokio::task::spawn_blocking;
use tracing::debug;

/// Checkpoint kept as a JSON file, `<dir>/<file_name>`.
#[derive(Debug, Clone)]
pub struct StatusFileStore {
    dir: PathBuf,
    file_name: String,
}

impl StatusFileStore {
    pub fn new(dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file_name: file_name.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    /// Creates the status directory and its parents if absent.
    pub fn ensure_directory(&self) -> Result<(), CheckpointError> {
        fs::create_dir_all(&self.dir).map_err(|source| CheckpointError::CreateDirectory {
            path: self.dir.clone(),
            source,
        })?;

        if !self.dir.is_dir() {
            return Err(CheckpointError::MissingDirectory(self.dir.clone()));
        }
        Ok(())
    }

    pub fn read(&self) -> Result<Option<Checkpoint>, CheckpointError> {
        let path = self.path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(CheckpointError::Read { path, source }),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| CheckpointError::Corrupt { path, source })
    }

    /// Temp file in the same directory, fsync, then rename over the target.
    pub fn write(&self, cp: &Checkpoint) -> Result<(), CheckpointError> {
        let path = self.path();
        let body = serde_json::to_vec_pretty(cp)?;
        let write_err = |source| CheckpointError::Write {
            path: path.clone(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(write_err)?;
        tmp.write_all(&body).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&path).map_err(|e| write_err(e.error))?;

        #[cfg(unix)]
        fs::File::open(&self.dir)
            .and_then(|dir| dir.sync_all())
            .map_err(write_err)?;

        debug!(path = %path.display(), cursor = %cp.last_value, "Checkpoint written");
        Ok(())
    }
}

// file I/O and fsync stay off the async workers
#[async_trait]
impl StateStore for StatusFileStore {
    async fn prepare(&self) -> Result<(), CheckpointError> {
        let store = self.clone();
        spawn_blocking(move || store.ensure_directory()).await?
    }

    async fn load_checkpoint(&self) -> Result<Option<Checkpoint>, CheckpointError> {
        let store = self.clone();
        spawn_blocking(move || store.read()).await?
    }

    async fn save_checkpoint(&self, cp: &Checkpoint) -> Result<(), CheckpointError> {
        let (store, cp) = (self.clone(), cp.clone());
        spawn_blocking(move || store.write(&cp)).await?
    }

    fn location(&self) -> String {
        self.path().display().to_string()
    }
}
