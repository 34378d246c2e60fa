//! Remote and local inventories
//!
//! Turns the raw remote listing and the results of a local directory walk
//! into two indexes keyed by [`RelativePath`], so the diff can compare them.
//! Both indexes remember insertion order: the remote one follows the listing,
//! the local one follows the walk.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;

use super::errors::DomainError;
use super::newtypes::{RelativePath, RemoteId};
use crate::ports::remote_inventory::RemoteEntry;

/// File extensions (lower-case, without dot) treated as images.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp", "avif", "svg"];

/// Whether `path` has a recognised image extension (case-insensitive).
pub fn is_image_path(path: &RelativePath) -> bool {
    path.extension()
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

// ============================================================================
// RemoteItem
// ============================================================================

/// An image the remote service currently holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteItem {
    /// Filename, unique within the remote set and used as the local path
    pub filename: RelativePath,
    /// Size in bytes as declared by the listing
    pub size: u64,
    /// Direct download URL
    pub url: String,
    /// Opaque remote identifier, absent when the listing sent a blank one
    pub remote_id: Option<RemoteId>,
}

impl RemoteItem {
    /// Validate a raw listing entry
    ///
    /// Identity is the filename; a blank id is kept as `None`.
    ///
    /// # Errors
    /// Returns error if the filename is not a safe relative path or does not
    /// name an image, since the local scan would never see such a file
    pub fn from_entry(entry: RemoteEntry) -> Result<Self, DomainError> {
        let filename = RelativePath::new(entry.filename)?;
        if !is_image_path(&filename) {
            return Err(DomainError::NotAnImage(filename.to_string()));
        }
        Ok(Self {
            filename,
            size: entry.size,
            url: entry.url,
            remote_id: RemoteId::new(entry.id).ok(),
        })
    }
}

// ============================================================================
// LocalItem
// ============================================================================

/// An image file found under the sync root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalItem {
    /// Path relative to the sync root
    pub relative: RelativePath,
    /// Absolute filesystem path
    pub absolute: PathBuf,
}

// ============================================================================
// RemoteIndex
// ============================================================================

/// Filename -> RemoteItem mapping, in listing order
#[derive(Debug, Clone, Default)]
pub struct RemoteIndex {
    items: Vec<RemoteItem>,
    positions: HashMap<RelativePath, usize>,
}

/// Result of building a [`RemoteIndex`] from a raw listing
#[derive(Debug, Default)]
pub struct RemoteIndexBuild {
    /// The index itself
    pub index: RemoteIndex,
    /// Filenames that appeared more than once; the later entry won
    pub duplicates: Vec<RelativePath>,
    /// Entries that could not be turned into a [`RemoteItem`], with the
    /// raw filename and the reason
    pub rejected: Vec<(String, DomainError)>,
}

impl RemoteIndex {
    /// Build the index from raw listing entries.
    ///
    /// A later entry with an already-seen filename replaces the earlier one
    /// but keeps the earlier position, so the index holds each filename once.
    pub fn from_entries(entries: Vec<RemoteEntry>) -> RemoteIndexBuild {
        let mut build = RemoteIndexBuild::default();

        for entry in entries {
            let raw_name = entry.filename.clone();
            match RemoteItem::from_entry(entry) {
                Ok(item) => {
                    let filename = item.filename.clone();
                    if build.index.insert(item) {
                        build.duplicates.push(filename);
                    }
                }
                Err(err) => build.rejected.push((raw_name, err)),
            }
        }

        build
    }

    /// Insert an item; returns `true` if it replaced an existing filename.
    pub fn insert(&mut self, item: RemoteItem) -> bool {
        match self.positions.get(&item.filename) {
            Some(&pos) => {
                self.items[pos] = item;
                true
            }
            None => {
                self.positions.insert(item.filename.clone(), self.items.len());
                self.items.push(item);
                false
            }
        }
    }

    pub fn get(&self, filename: &RelativePath) -> Option<&RemoteItem> {
        self.positions.get(filename).map(|&pos| &self.items[pos])
    }

    pub fn contains(&self, filename: &RelativePath) -> bool {
        self.positions.contains_key(filename)
    }

    /// Items in listing order
    pub fn iter(&self) -> impl Iterator<Item = &RemoteItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of the declared sizes
    pub fn total_size(&self) -> u64 {
        self.items.iter().map(|item| item.size).sum()
    }
}

impl FromIterator<RemoteItem> for RemoteIndex {
    fn from_iter<I: IntoIterator<Item = RemoteItem>>(iter: I) -> Self {
        let mut index = Self::default();
        for item in iter {
            index.insert(item);
        }
        index
    }
}

// ============================================================================
// LocalIndex
// ============================================================================

/// Relative path -> LocalItem mapping, in directory-walk order
#[derive(Debug, Clone, Default)]
pub struct LocalIndex {
    items: Vec<LocalItem>,
    positions: HashMap<RelativePath, usize>,
}

impl LocalIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a scanned file. A path seen twice keeps its first position.
    pub fn insert(&mut self, item: LocalItem) {
        match self.positions.get(&item.relative) {
            Some(&pos) => self.items[pos] = item,
            None => {
                self.positions.insert(item.relative.clone(), self.items.len());
                self.items.push(item);
            }
        }
    }

    pub fn get(&self, relative: &RelativePath) -> Option<&LocalItem> {
        self.positions.get(relative).map(|&pos| &self.items[pos])
    }

    pub fn contains(&self, relative: &RelativePath) -> bool {
        self.positions.contains_key(relative)
    }

    /// Items in walk order
    pub fn iter(&self) -> impl Iterator<Item = &LocalItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<LocalItem> for LocalIndex {
    fn from_iter<I: IntoIterator<Item = LocalItem>>(iter: I) -> Self {
        let mut index = Self::new();
        for item in iter {
            index.insert(item);
        }
        index
    }
}
