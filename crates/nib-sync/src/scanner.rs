//! Local inventory scanner
//!
//! Walks the sync root recursively and records every image file as a
//! [`LocalItem`]. Entries of each directory are visited in lexical order so
//! the walk order is stable across runs. Directories are never entries.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use tracing::{debug, instrument, warn};

use nib_core::domain::inventory::{is_image_path, LocalIndex, LocalItem};
use nib_core::domain::newtypes::RelativePath;

use crate::SyncError;

/// Scan `root` and build its [`LocalIndex`]
///
/// # Errors
/// Returns [`SyncError::Scan`] if the root or any subdirectory cannot be read
#[instrument(skip(root), fields(root = %root.display()))]
pub async fn scan_local(root: &Path) -> Result<LocalIndex, SyncError> {
    let mut index = LocalIndex::new();
    walk_directory(root, root, &mut index).await?;
    debug!(files = index.len(), "Local scan complete");
    Ok(index)
}

fn scan_error(path: &Path, source: std::io::Error) -> SyncError {
    SyncError::Scan {
        path: path.to_path_buf(),
        source,
    }
}

/// Recursive directory walk
///
/// Boxed because async recursion needs an indirection.
fn walk_directory<'a>(
    dir: &'a Path,
    root: &'a Path,
    index: &'a mut LocalIndex,
) -> Pin<Box<dyn Future<Output = Result<(), SyncError>> + Send + 'a>> {
    Box::pin(async move {
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|err| scan_error(dir, err))?;

        let mut children = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|err| scan_error(dir, err))?
        {
            children.push(entry);
        }
        children.sort_by_key(|entry| entry.file_name());

        for entry in children {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|err| scan_error(&path, err))?;

            if file_type.is_dir() {
                walk_directory(&path, root, index).await?;
                continue;
            }

            let is_file = if file_type.is_symlink() {
                // Links to files count, links to directories are not followed.
                tokio::fs::metadata(&path)
                    .await
                    .map(|meta| meta.is_file())
                    .unwrap_or(false)
            } else {
                file_type.is_file()
            };
            if !is_file {
                continue;
            }

            let relative = match RelativePath::from_root(root, &path) {
                Ok(relative) => relative,
                Err(err) => {
                    warn!(path = %path.display(), %err, "Skipping file with unusable name");
                    continue;
                }
            };

            if is_image_path(&relative) {
                index.insert(LocalItem {
                    relative,
                    absolute: path,
                });
            }
        }

        Ok(())
    })
}
