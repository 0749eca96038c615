use std::ffi::OsString;
use std::io::{Read, Seek};
use std::sync::Arc;

use crate::error::{PathResolveError, PathResolveResult};

use super::file_path::FilePath;
use super::kinds::{ExecutableFormat, FileKind};
use super::pattern::EntryMatcher;

/// An open, read-only file handed out by the PAL.
///
/// Dropping the value closes the underlying file.
pub trait PalFile: Read + Seek + Send + std::fmt::Debug {
    /// Query the type of the opened file.
    fn kind(&self) -> PathResolveResult<FileKind>;
}

/// Lazy stream of entry names produced by a directory scan.
///
/// The scan cursor is released when the iterator is dropped.
pub type EntryNames<'a> = Box<dyn Iterator<Item = PathResolveResult<OsString>> + Send + 'a>;

/* 📖 # Why is Pal a trait instead of a struct?

The resolver rules (parent reattachment, termination tagging, the validator
state machine) are the interesting part, and they are easiest to pin down
against an in-memory filesystem where pipes, scan failures and executables can
be set up in one line. MockPal implements Pal for that; RealPal talks to the
operating system.
*/

/// Platform Abstraction Layer (PAL) trait providing the filesystem primitives
/// the resolver needs.
///
/// Two implementations are provided:
/// - `RealPal`: Uses the real filesystem via `std::fs`
/// - `MockPal`: In-memory implementation for testing
pub trait Pal: std::fmt::Debug + Send + Sync + 'static {
    /// Open a scan of `directory` yielding the names of entries accepted by `matcher`.
    ///
    /// An empty `directory` means the current directory. Names are yielded in
    /// the order the platform produces them. Failing to open the scan is an
    /// `Err`; a failure part way through is yielded as an `Err` item.
    fn scan_directory(
        &self,
        directory: &FilePath,
        matcher: &EntryMatcher,
    ) -> PathResolveResult<EntryNames<'_>>;

    /// Classify the binary format of a file.
    ///
    /// `Ok` means the file IS a recognised executable. Any `Err` means it is
    /// not, or that it could not be classified.
    fn executable_format(&self, path: &FilePath) -> PathResolveResult<ExecutableFormat>;

    /// Open an existing file for shared, read-only access.
    fn open_read_only(&self, path: &FilePath) -> PathResolveResult<Box<dyn PalFile>>;

    /// Read entire file contents as a UTF-8 string.
    fn read_file_to_string(&self, path: &FilePath) -> PathResolveResult<String> {
        let mut file = self.open_read_only(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| Box::new(PathResolveError::file(path.as_path(), e)))?;
        Ok(contents)
    }
}

/* 📖 # Why use Arc<dyn Pal> with PalHandle?

Arc enables cheap cloning of the PAL implementation so the CLI, the
configuration loader and the resolver can share one instance without lifetime
parameters.
*/

/// Handle to a PAL implementation, enabling shared ownership.
///
/// # Examples
///
/// ```no_run
/// use pathresolve_base::{RealPal, PalHandle};
///
/// let pal = PalHandle::new(RealPal::new(".".into()));
/// let pal_clone = pal.clone(); // Cheap clone, shares the same implementation
/// ```
#[derive(Debug, Clone)]
pub struct PalHandle(Arc<dyn Pal>);

impl PalHandle {
    /// Create a new PalHandle from a Pal implementation.
    pub fn new(pal: impl Pal + 'static) -> Self {
        Self(Arc::new(pal))
    }
}

impl std::ops::Deref for PalHandle {
    type Target = dyn Pal;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}
