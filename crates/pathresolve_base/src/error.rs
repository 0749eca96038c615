use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

use tracing_error::{SpanTrace, SpanTraceStatus};

/* 📖 # Why a custom error type and not use anyhow/eyre/thiserror etc?

- Better control over error handling
- No dependencies to compile and integrate
- Errors carry a span trace, so a failure deep inside a directory scan still
  shows which pattern and path were being resolved
 */

/// Error variants that can occur while resolving paths.
/// Each variant represents a specific error category with its associated context.
#[derive(Debug)]
pub enum ErrorKind {
    /// File system operation failed
    FileError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A path pattern could not be turned into an entry matcher
    Pattern { pattern: String, message: String },

    /// Configuration file could not be parsed
    Config { path: PathBuf, message: String },

    /// Catch-all for other errors with a message
    Message { message: String },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::FileError { path, source } => {
                write!(f, "File error at {}: {}", path.display(), source)
            }
            ErrorKind::Pattern { pattern, message } => {
                write!(f, "Invalid pattern '{}': {}", pattern, message)
            }
            ErrorKind::Config { path, message } => {
                write!(f, "Invalid configuration in {}: {}", path.display(), message)
            }
            ErrorKind::Message { message } => write!(f, "{}", message),
        }
    }
}

/* 📖 # Why separate ErrorKind and PathResolveError?
- ErrorKind: structural variants with specific contexts (file paths, patterns)
- PathResolveError: wraps ErrorKind with context strings, an optional cause and
  the span trace captured at construction time

Users can pattern match on ErrorKind, while propagation only ever deals with
the wrapper.
*/

/// Error type wrapping [`ErrorKind`] with context, cause and span trace.
pub struct PathResolveError {
    kind: ErrorKind,
    context: Vec<String>,
    cause: Option<Box<PathResolveError>>,
    span_trace: SpanTrace,
}

impl PathResolveError {
    /// Creates a new error from an ErrorKind, capturing the current span trace.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: vec![],
            cause: None,
            span_trace: SpanTrace::capture(),
        }
    }

    /// Creates a plain message error.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Message {
            message: message.into(),
        })
    }

    /// Creates a file error for the given path.
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::new(ErrorKind::FileError {
            path: path.into(),
            source,
        })
    }

    /// Attaches context to an error.
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Attaches context using lazy evaluation.
    pub fn with_context<F>(mut self, f: F) -> Self
    where
        F: FnOnce() -> String,
    {
        self.context.push(f());
        self
    }

    /// Records the error that caused this one.
    pub fn caused_by(mut self, cause: PathResolveError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Returns a reference to the underlying ErrorKind.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn cause(&self) -> Option<&PathResolveError> {
        self.cause.as_deref()
    }

    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// True if this error is a file error whose io source is `NotFound`.
    pub fn is_not_found(&self) -> bool {
        self.io_error_kind() == Some(std::io::ErrorKind::NotFound)
    }

    /// True if a directory could not be opened because it, or a component on
    /// the way to it, does not exist as a directory.
    pub fn is_missing_directory(&self) -> bool {
        matches!(
            self.io_error_kind(),
            Some(std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory)
        )
    }

    /// The io error kind of a `FileError`, if this is one.
    pub fn io_error_kind(&self) -> Option<std::io::ErrorKind> {
        match &self.kind {
            ErrorKind::FileError { source, .. } => Some(source.kind()),
            _ => None,
        }
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: &str) -> fmt::Result {
        let item_count = self.context.len() + usize::from(self.cause.is_some());
        for (index, context) in self.context.iter().enumerate() {
            let branch = if index + 1 == item_count { "└─" } else { "├─" };
            writeln!(f, "{}{} {}", indent, branch, context)?;
        }
        if let Some(cause) = &self.cause {
            writeln!(f, "{}└─ cause: {}", indent, cause.kind)?;
            cause.fmt_tree(f, &format!("{}   ", indent))?;
        }
        Ok(())
    }
}

impl From<ErrorKind> for PathResolveError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl StdError for PathResolveError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.kind {
            ErrorKind::FileError { source, .. } => Some(source),
            _ => self.cause.as_deref().map(|cause| cause as &(dyn StdError + 'static)),
        }
    }
}

impl fmt::Display for PathResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ctx in &self.context {
            write!(f, "{}: ", ctx)?;
        }
        write!(f, "{}", self.kind)
    }
}

impl fmt::Debug for PathResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.kind)?;
        self.fmt_tree(f, "")?;
        if self.span_trace.status() == SpanTraceStatus::CAPTURED {
            writeln!(f, "Trace: {}", self.span_trace)?;
        }
        Ok(())
    }
}

/* 📖 # Why use Box<PathResolveError> in the result type?

Boxing the error reduces the size of the result type, making it more efficient
to return in the common case. The span trace makes the unboxed error large.
*/

/// Standard result type for pathresolve operations.
pub type PathResolveResult<T> = std::result::Result<T, Box<PathResolveError>>;

/// Extension trait for attaching context to Results.
pub trait ResultExt<T> {
    /// Attaches context to an error, consuming and re-wrapping it.
    fn context(self, context: impl Into<String>) -> PathResolveResult<T>;

    /// Attaches context using lazy evaluation.
    fn with_context<F>(self, f: F) -> PathResolveResult<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for PathResolveResult<T> {
    fn context(self, context: impl Into<String>) -> PathResolveResult<T> {
        self.map_err(|err| Box::new(err.context(context)))
    }

    fn with_context<F>(self, f: F) -> PathResolveResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|err| Box::new(err.with_context(f)))
    }
}

/// Build a boxed message error from format arguments.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        Box::new($crate::PathResolveError::message(format!($($arg)*)))
    };
}

/// Return early with a boxed message error.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::err!($($arg)*))
    };
}
