//! Domain newtypes with validation
//!
//! Strongly-typed wrappers for remote identifiers and root-relative paths.
//! Each newtype ensures data validity at construction time.

use std::fmt::{self, Display, Formatter};
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

// ============================================================================
// RemoteId
// ============================================================================

/// Opaque identifier the remote service assigns to an image
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemoteId(String);

impl RemoteId {
    /// Create a new RemoteId
    ///
    /// # Errors
    /// Returns error if the ID is empty or whitespace only
    pub fn new(id: String) -> Result<Self, DomainError> {
        if id.trim().is_empty() {
            return Err(DomainError::InvalidRemoteId(
                "Remote ID cannot be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RemoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RemoteId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for RemoteId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RemoteId> for String {
    fn from(id: RemoteId) -> Self {
        id.0
    }
}

// ============================================================================
// RelativePath
// ============================================================================

/// A path relative to the sync root, using `/` as separator
///
/// RelativePath ensures the path is:
/// - Non-empty
/// - Not absolute
/// - Free of `.` and `..` components, so joining it to the root can never
///   escape the root
///
/// It is the identity both sides of the diff are keyed by: a remote filename
/// and a scanned local file compare equal when their relative paths match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RelativePath(String);

impl RelativePath {
    /// Create a new RelativePath from a `/` or `\` separated string
    ///
    /// # Errors
    /// Returns `DomainError::InvalidRelativePath` if the path is empty,
    /// absolute, or contains `.`/`..` components
    pub fn new(path: impl Into<String>) -> Result<Self, DomainError> {
        let raw: String = path.into();
        let unified = raw.replace('\\', "/");

        if unified.trim().is_empty() {
            return Err(DomainError::InvalidRelativePath(
                "Path cannot be empty".to_string(),
            ));
        }
        if unified.starts_with('/') || Path::new(&unified).is_absolute() {
            return Err(DomainError::InvalidRelativePath(format!(
                "Path must be relative: {raw}"
            )));
        }

        let mut segments = Vec::new();
        for segment in unified.split('/') {
            match segment {
                "" => continue,
                "." | ".." => {
                    return Err(DomainError::InvalidRelativePath(format!(
                        "Path must not contain '.' or '..': {raw}"
                    )));
                }
                s if s.contains(':') && cfg!(windows) => {
                    return Err(DomainError::InvalidRelativePath(format!(
                        "Path must not contain drive prefixes: {raw}"
                    )));
                }
                s => segments.push(s),
            }
        }

        if segments.is_empty() {
            return Err(DomainError::InvalidRelativePath(format!(
                "Path has no components: {raw}"
            )));
        }

        Ok(Self(segments.join("/")))
    }

    /// Build the relative path of `path` with respect to `root`
    ///
    /// # Errors
    /// Returns error if `path` is not inside `root` or is not valid UTF-8
    pub fn from_root(root: &Path, path: &Path) -> Result<Self, DomainError> {
        let relative = path.strip_prefix(root).map_err(|_| {
            DomainError::PathNotInSyncRoot(format!(
                "{} is not within {}",
                path.display(),
                root.display()
            ))
        })?;

        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(c) => match c.to_str() {
                    Some(s) => segments.push(s),
                    None => {
                        return Err(DomainError::InvalidRelativePath(format!(
                            "Path is not valid UTF-8: {}",
                            relative.display()
                        )))
                    }
                },
                Component::CurDir => {}
                _ => {
                    return Err(DomainError::InvalidRelativePath(format!(
                        "Unexpected component in {}",
                        relative.display()
                    )))
                }
            }
        }

        Self::new(segments.join("/"))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve this path below `root`
    #[must_use]
    pub fn to_path(&self, root: &Path) -> PathBuf {
        self.0
            .split('/')
            .fold(root.to_path_buf(), |acc, segment| acc.join(segment))
    }

    /// The final component
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Lower-cased extension of the final component, without the dot
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        Path::new(self.file_name())
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
    }
}

impl Display for RelativePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RelativePath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for RelativePath {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RelativePath> for String {
    fn from(path: RelativePath) -> Self {
        path.0
    }
}
