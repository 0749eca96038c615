/* 📖 # How does pattern enumeration work?

A pattern such as `data/log?.txt` is split into its parent directory (`data`)
and its leaf (`log?.txt`). The PAL scans the parent, keeping entries whose names
match the leaf, and every match is reattached to the parent exactly as the
caller wrote it: `data/log1.txt`, `data/log2.txt`. Nothing is recursed into,
sorted or deduplicated; the order is whatever the platform scan produces.

The scan is a lazy iterator (DirectoryScan) that owns the PAL cursor. The
cursor is dropped as soon as the scan is exhausted or fails, and when the
iterator itself is dropped, so abandoning a scan half way never leaks it.
*/

use std::iter::FusedIterator;

use tracing::{debug, instrument, warn};

use pathresolve_base::{
    EntryMatcher, EntryNames, FilePath, PalHandle, PathResolveError, PathResolveResult,
};

use crate::diagnostics::{Diagnostic, DiagnosticSink, emit};

/// Options controlling how a pattern leaf is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    pub case_insensitive: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            case_insensitive: cfg!(windows),
        }
    }
}

/// How an enumeration ended.
#[derive(Debug)]
pub enum ScanTermination {
    /// No more matching entries. Also used when nothing matched or the
    /// directory does not exist.
    Exhausted,
    /// The scan stopped because of an error.
    Failed(Box<PathResolveError>),
}

impl ScanTermination {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, ScanTermination::Exhausted)
    }

    pub fn error(&self) -> Option<&PathResolveError> {
        match self {
            ScanTermination::Exhausted => None,
            ScanTermination::Failed(error) => Some(error.as_ref()),
        }
    }
}

/// Result of expanding a pattern: matched paths in scan order and how the scan ended.
#[derive(Debug)]
pub struct Enumeration {
    pub paths: Vec<FilePath>,
    pub termination: ScanTermination,
}

impl Enumeration {
    fn exhausted(paths: Vec<FilePath>) -> Self {
        Self {
            paths,
            termination: ScanTermination::Exhausted,
        }
    }

    fn failed(paths: Vec<FilePath>, error: Box<PathResolveError>) -> Self {
        Self {
            paths,
            termination: ScanTermination::Failed(error),
        }
    }
}

/// Lazy, non-restartable scan over the entries matching a pattern.
///
/// Yields each match joined to the pattern's parent directory. After the first
/// error or the end of the scan the cursor is released and the iterator only
/// returns `None`.
pub struct DirectoryScan<'a> {
    parent: FilePath,
    cursor: Option<EntryNames<'a>>,
}

impl<'a> DirectoryScan<'a> {
    /// Open a scan for `pattern`.
    ///
    /// Empty patterns and patterns without a leaf (such as `/` or `dir/..`)
    /// produce a scan that yields nothing without asking the PAL.
    pub fn open(
        pal: &'a PalHandle,
        pattern: &FilePath,
        options: ScanOptions,
    ) -> PathResolveResult<Self> {
        let parent = pattern.parent_directory();
        let Some(leaf) = pattern.leaf_name() else {
            debug!(%pattern, "pattern has no leaf, nothing to scan");
            return Ok(Self {
                parent,
                cursor: None,
            });
        };
        let matcher = EntryMatcher::new(leaf, options.case_insensitive)?;
        debug!(
            %parent,
            leaf = matcher.leaf(),
            wildcards = matcher.has_wildcards(),
            "opening directory scan"
        );
        let cursor = pal.scan_directory(&parent, &matcher)?;
        Ok(Self {
            parent,
            cursor: Some(cursor),
        })
    }

    /// The directory every yielded path is rooted at.
    pub fn parent(&self) -> &FilePath {
        &self.parent
    }

    /// True while the underlying cursor is still held.
    pub fn is_open(&self) -> bool {
        self.cursor.is_some()
    }
}

impl Iterator for DirectoryScan<'_> {
    type Item = PathResolveResult<FilePath>;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.cursor.as_mut()?;
        match cursor.next() {
            Some(Ok(name)) => Some(Ok(self.parent.join_entry(name))),
            Some(Err(error)) => {
                self.cursor = None;
                Some(Err(error))
            }
            None => {
                self.cursor = None;
                None
            }
        }
    }
}

impl FusedIterator for DirectoryScan<'_> {}

impl std::fmt::Debug for DirectoryScan<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryScan")
            .field("parent", &self.parent)
            .field("open", &self.is_open())
            .finish()
    }
}

/// Expand `pattern` into the list of matching sibling paths.
///
/// Never fails: a missing directory or an empty pattern gives an empty list
/// tagged [`ScanTermination::Exhausted`]; any other scan failure keeps the
/// paths found so far and is tagged [`ScanTermination::Failed`]. The outcome
/// is also reported to `sink`.
///
/// # Examples
/// ```
/// use pathresolve_base::{FilePath, MockPal, PalHandle};
/// use pathresolve_engine::{ScanOptions, SilentSink, enumerate_paths};
///
/// let mock = MockPal::new();
/// mock.add_file(FilePath::from("data/a.txt"), vec![]);
/// mock.add_file(FilePath::from("data/b.txt"), vec![]);
/// let pal = PalHandle::new(mock);
///
/// let result = enumerate_paths(&pal, &FilePath::from("data/*.txt"), ScanOptions::default(), &SilentSink);
/// assert_eq!(result.paths, vec![FilePath::from("data/a.txt"), FilePath::from("data/b.txt")]);
/// assert!(result.termination.is_exhausted());
/// ```
#[instrument(skip(pal, sink), fields(pattern = %pattern))]
pub fn enumerate_paths(
    pal: &PalHandle,
    pattern: &FilePath,
    options: ScanOptions,
    sink: &dyn DiagnosticSink,
) -> Enumeration {
    if pattern.is_empty() {
        debug!("empty pattern, nothing to enumerate");
        emit(sink, Diagnostic::EnumerationExhausted);
        return Enumeration::exhausted(Vec::new());
    }

    let scan = match DirectoryScan::open(pal, pattern, options) {
        Ok(scan) => scan,
        Err(error) if error.is_missing_directory() => {
            debug!(%error, "scan target does not exist");
            emit(sink, Diagnostic::EnumerationExhausted);
            return Enumeration::exhausted(Vec::new());
        }
        Err(error) => {
            warn!(%error, "failed to open directory scan");
            emit(
                sink,
                Diagnostic::EnumerationFailed {
                    message: error.to_string(),
                },
            );
            return Enumeration::failed(Vec::new(), error);
        }
    };

    debug!(parent = %scan.parent(), "collecting matches");
    let mut paths = Vec::new();
    for entry in scan {
        match entry {
            Ok(path) => paths.push(path),
            Err(error) => {
                warn!(%error, found = paths.len(), "directory scan failed");
                emit(
                    sink,
                    Diagnostic::EnumerationFailed {
                        message: error.to_string(),
                    },
                );
                return Enumeration::failed(paths, error);
            }
        }
    }

    debug!(found = paths.len(), "enumeration complete");
    emit(sink, Diagnostic::EnumerationExhausted);
    Enumeration::exhausted(paths)
}
