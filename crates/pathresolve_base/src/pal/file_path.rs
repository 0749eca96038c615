use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/* 📖 # Why wrap PathBuf in a FilePath type?

Patterns and resolved paths are supplied by the user exactly as typed, absolute
or relative. FilePath keeps that text untouched (no canonicalisation) so every
resolved entry is printed rooted at the same parent directory as the pattern,
and gives the resolver one place that defines "parent directory" and "leaf".
*/

/// A filesystem path as supplied by the caller, split into parent directory and leaf.
///
/// # Examples
///
/// ```
/// use pathresolve_base::FilePath;
///
/// let pattern = FilePath::from("data/*.txt");
/// assert_eq!(pattern.parent_directory(), FilePath::from("data"));
/// assert_eq!(pattern.leaf_name().unwrap(), "*.txt");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilePath(PathBuf);

impl FilePath {
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.as_os_str().is_empty()
    }

    /// The directory part of the path, empty when the path is a bare name.
    pub fn parent_directory(&self) -> FilePath {
        self.0.parent().map(FilePath::from).unwrap_or_default()
    }

    /// The final component, `None` for roots and paths ending in `..`.
    pub fn leaf_name(&self) -> Option<&OsStr> {
        self.0.file_name()
    }

    /// Attach a raw directory entry name below this path.
    pub fn join_entry(&self, name: impl AsRef<OsStr>) -> FilePath {
        if self.is_empty() {
            return FilePath(PathBuf::from(name.as_ref()));
        }
        FilePath(self.0.join(name.as_ref()))
    }
}

impl From<&str> for FilePath {
    fn from(s: &str) -> Self {
        Self(PathBuf::from(s))
    }
}

impl From<String> for FilePath {
    fn from(s: String) -> Self {
        Self(PathBuf::from(s))
    }
}

impl From<OsString> for FilePath {
    fn from(s: OsString) -> Self {
        Self(PathBuf::from(s))
    }
}

impl From<PathBuf> for FilePath {
    fn from(p: PathBuf) -> Self {
        Self(p)
    }
}

impl From<&Path> for FilePath {
    fn from(p: &Path) -> Self {
        Self(p.to_path_buf())
    }
}

impl std::fmt::Display for FilePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl AsRef<Path> for FilePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}
