/* 📖 # What does the file validator guarantee?

open_validated_file only ever hands out a handle to an ordinary, existing,
non-executable disk file. It walks a fixed sequence of states and never goes
back:

    Start -> ExecCheck -> {Reject | OpenAttempt} -> {Reject | TypeCheck}
          -> {Reject (handle released) | Accept}

The executable check reads the polarity the other way round from what one
might expect: a SUCCESSFUL classification means the file IS an executable and
is the rejection case. A failed classification (plain data, unreadable,
missing, special file) lets the validator move on to opening the file.

The handle is an owned value. Rejection paths after a successful open drop it
before returning, and an accepted handle is released when the caller drops it
or calls `close`, which consumes it.
*/

use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};

use tracing::{debug, instrument};

use pathresolve_base::{ExecutableFormat, FileKind, FilePath, PalFile, PalHandle, PathResolveError};

use crate::diagnostics::{Diagnostic, DiagnosticSink, emit};

/// An open, read-only handle to a validated disk file.
///
/// Move-only; the file is closed when the handle is dropped or closed.
#[derive(Debug)]
pub struct FileHandle {
    path: FilePath,
    file: Box<dyn PalFile>,
}

impl FileHandle {
    pub fn path(&self) -> &FilePath {
        &self.path
    }

    /// Release the handle. Consuming `self` makes a second release impossible.
    pub fn close(self) {
        debug!(path = %self.path, "closing file handle");
        drop(self.file);
    }
}

impl Read for FileHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Seek for FileHandle {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}

/// Why a path was refused by [`open_validated_file`].
#[derive(Debug)]
pub enum Rejection {
    EmptyPath,
    Executable(ExecutableFormat),
    NotFound,
    InvalidFile(Box<PathResolveError>),
    InvalidType(FileKind),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::EmptyPath => write!(f, "empty file name"),
            Rejection::Executable(format) => {
                write!(f, "file is in executable format ({})", format)
            }
            Rejection::NotFound => write!(f, "file not found"),
            Rejection::InvalidFile(error) => write!(f, "invalid file ({})", error),
            Rejection::InvalidType(kind) => write!(f, "invalid type of file ({})", kind),
        }
    }
}

/// Open `path` read-only if and only if it is an ordinary disk file.
///
/// # Examples
/// ```
/// use std::io::Read;
/// use pathresolve_base::{FilePath, MockPal, PalHandle};
/// use pathresolve_engine::{SilentSink, open_validated_file};
///
/// let mock = MockPal::new();
/// mock.add_file(FilePath::from("notes.txt"), b"hello".to_vec());
/// let pal = PalHandle::new(mock);
///
/// let mut handle = open_validated_file(&pal, &FilePath::from("notes.txt"), &SilentSink).unwrap();
/// let mut text = String::new();
/// handle.read_to_string(&mut text).unwrap();
/// assert_eq!(text, "hello");
/// handle.close();
/// ```
#[instrument(skip(pal, sink), fields(path = %path))]
pub fn open_validated_file(
    pal: &PalHandle,
    path: &FilePath,
    sink: &dyn DiagnosticSink,
) -> Result<FileHandle, Rejection> {
    if path.is_empty() {
        emit(sink, Diagnostic::EmptyPath);
        return Err(Rejection::EmptyPath);
    }

    match pal.executable_format(path) {
        Ok(format) => {
            emit(
                sink,
                Diagnostic::ExecutableFormat {
                    path: path.clone(),
                    format,
                },
            );
            return Err(Rejection::Executable(format));
        }
        Err(reason) => debug!(%reason, "not classified as executable, opening"),
    }

    let file = match pal.open_read_only(path) {
        Ok(file) => file,
        Err(error) if error.is_not_found() => {
            emit(sink, Diagnostic::FileNotFound { path: path.clone() });
            return Err(Rejection::NotFound);
        }
        Err(error) => {
            emit(
                sink,
                Diagnostic::InvalidFile {
                    path: path.clone(),
                    message: error.to_string(),
                },
            );
            return Err(Rejection::InvalidFile(error));
        }
    };

    let kind = file.kind().unwrap_or_else(|error| {
        debug!(%error, "failed to query file type");
        FileKind::Unknown
    });
    if !kind.is_disk() {
        drop(file);
        emit(
            sink,
            Diagnostic::InvalidFileType {
                path: path.clone(),
                kind,
            },
        );
        return Err(Rejection::InvalidType(kind));
    }

    debug!("file accepted");
    Ok(FileHandle {
        path: path.clone(),
        file,
    })
}
