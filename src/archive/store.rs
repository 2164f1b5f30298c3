//! On-disk persistence of the archive file.
//!
//! The archive is a single pretty-printed JSON file that the front end reads
//! directly. Each save replaces it wholesale:
//!
//! ```text
//! public/data/
//! └── archive.json   # { "date": "2013-01-02", "sections": { "front-page": [...] } }
//! ```

use crate::error::{ArchiveReadError, ArchiveWriteError};
use crate::models::DayArchive;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Default location of the archive file.
pub const DEFAULT_ARCHIVE_FILE: &str = "./public/data/archive.json";

/// Reads and writes the archive file at a fixed path.
#[derive(Debug, Clone)]
pub struct ArchiveStore {
    path: PathBuf,
}

impl ArchiveStore {
    /// A store for the archive file at `path`.
    ///
    /// Nothing is touched on disk until [`save`](Self::save) or
    /// [`load`](Self::load).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the archive file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `archive` as pretty JSON, creating parent directories as needed.
    ///
    /// The JSON goes to a sibling temp file first and is renamed into place,
    /// so the previous archive stays intact if the write fails.
    ///
    /// # Errors
    ///
    /// * [`ArchiveWriteError::Serialize`] if the archive cannot be encoded
    /// * [`ArchiveWriteError::Io`] if a directory, the temp file or the rename fails
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    pub async fn save(&self, archive: &DayArchive) -> Result<(), ArchiveWriteError> {
        let json = serde_json::to_string_pretty(archive)?;

        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await.map_err(|source| ArchiveWriteError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let tmp = self.tmp_path();
        fs::write(&tmp, json).await.map_err(|source| ArchiveWriteError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| ArchiveWriteError::Io {
                path: self.path.clone(),
                source,
            })?;

        info!(
            date = %archive.date,
            total = archive.total_articles(),
            "Archive saved"
        );
        Ok(())
    }

    /// Read and parse the archive file.
    ///
    /// # Errors
    ///
    /// * [`ArchiveReadError::Missing`] if nothing has been saved yet
    /// * [`ArchiveReadError::Io`] for any other read failure
    /// * [`ArchiveReadError::Corrupt`] if the file is not a valid archive
    #[instrument(level = "debug", skip_all, fields(path = %self.path.display()))]
    pub async fn load(&self) -> Result<DayArchive, ArchiveReadError> {
        let raw = fs::read_to_string(&self.path).await.map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                ArchiveReadError::Missing {
                    path: self.path.clone(),
                }
            } else {
                ArchiveReadError::Io {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;

        serde_json::from_str(&raw).map_err(|source| ArchiveReadError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "archive.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
