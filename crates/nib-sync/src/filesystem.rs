//! Local filesystem adapter (secondary/driven adapter)
//!
//! All writes below the sync root go through [`LocalFileSystem`].
//!
//! - **Atomic writes**: content is streamed into `<final>.tmp` in the same
//!   directory and renamed onto the final path only once complete. On any
//!   failure the temporary file is removed and the final path is untouched.
//! - **Deletes** remove single files only.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument, warn};

use nib_core::domain::newtypes::RelativePath;
use nib_core::ports::remote_inventory::IDownloadBody;

use crate::TransferError;

/// Suffix of in-progress downloads
pub const TMP_SUFFIX: &str = ".tmp";

/// `<target>.tmp`, next to `target`
pub fn tmp_path_for(target: &Path) -> PathBuf {
    let mut p = target.as_os_str().to_owned();
    p.push(TMP_SUFFIX);
    PathBuf::from(p)
}

/// Filesystem operations scoped to one sync root
#[derive(Debug, Clone)]
pub struct LocalFileSystem {
    root: PathBuf,
}

impl LocalFileSystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the sync root if it does not exist
    pub async fn ensure_root(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Remove one local file
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn delete_file(&self, path: &Path) -> Result<(), TransferError> {
        debug!("removing file");
        tokio::fs::remove_file(path)
            .await
            .map_err(|source| TransferError::Delete {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Stream `body` into `root/relative` atomically
    ///
    /// With `expected_size` set, a body of any other length fails the write.
    /// Returns the number of bytes written.
    #[instrument(skip(self, body), fields(path = %relative))]
    pub async fn write_atomic(
        &self,
        relative: &RelativePath,
        body: &mut dyn IDownloadBody,
        expected_size: Option<u64>,
    ) -> Result<u64, TransferError> {
        let target = relative.to_path(&self.root);

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| TransferError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let tmp_path = tmp_path_for(&target);
        debug!(tmp = %tmp_path.display(), "writing to temporary file");

        let result = match stream_to_file(&tmp_path, body).await {
            Ok(written) => match expected_size {
                Some(expected) if expected != written => Err(TransferError::SizeMismatch {
                    expected,
                    actual: written,
                }),
                _ => Ok(written),
            },
            Err(err) => Err(err),
        };

        let result = match result {
            Ok(written) => tokio::fs::rename(&tmp_path, &target)
                .await
                .map(|()| written)
                .map_err(|source| TransferError::Rename {
                    from: tmp_path.clone(),
                    to: target.clone(),
                    source,
                }),
            Err(err) => Err(err),
        };

        if result.is_err() {
            remove_tmp(&tmp_path).await;
        } else {
            debug!("write complete");
        }

        result
    }
}

async fn stream_to_file(
    tmp_path: &Path,
    body: &mut dyn IDownloadBody,
) -> Result<u64, TransferError> {
    let write_err = |source: std::io::Error| TransferError::Write {
        path: tmp_path.to_path_buf(),
        source,
    };

    let mut file = tokio::fs::File::create(tmp_path).await.map_err(write_err)?;
    let mut written = 0u64;

    while let Some(chunk) = body.next_chunk().await.map_err(TransferError::Body)? {
        file.write_all(&chunk).await.map_err(write_err)?;
        written += chunk.len() as u64;
    }

    file.flush().await.map_err(write_err)?;
    file.sync_all().await.map_err(write_err)?;
    Ok(written)
}

async fn remove_tmp(tmp_path: &Path) {
    match tokio::fs::remove_file(tmp_path).await {
        Ok(()) => debug!(tmp = %tmp_path.display(), "removed temporary file"),
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => warn!(tmp = %tmp_path.display(), %err, "failed to remove temporary file"),
    }
}
