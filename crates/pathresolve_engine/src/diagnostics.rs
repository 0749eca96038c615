/* 📖 # Why route status messages through a DiagnosticSink?

The enumerator and validator decide WHAT is worth reporting (a scan error, a
rejected file); the caller decides HOW it is shown. The CLI writes lines to
stdout, tests collect diagnostics and assert on them, library callers can stay
silent. Every diagnostic is also emitted as a tracing event.
*/

use std::fmt;
use std::io::Write;
use std::sync::Mutex;

use tracing::{debug, warn};

use pathresolve_base::{ExecutableFormat, FileKind, FilePath};

/// How noteworthy a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
}

/// A status message produced by the enumerator or the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The scan ran out of matching entries.
    EnumerationExhausted,
    /// The scan stopped because of an error.
    EnumerationFailed { message: String },
    /// The validator was handed an empty path.
    EmptyPath,
    ExecutableFormat {
        path: FilePath,
        format: ExecutableFormat,
    },
    FileNotFound { path: FilePath },
    InvalidFile { path: FilePath, message: String },
    InvalidFileType { path: FilePath, kind: FileKind },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::EnumerationExhausted => Severity::Info,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::EnumerationExhausted => write!(f, "no more matching entries"),
            Diagnostic::EnumerationFailed { message } => {
                write!(f, "enumeration error: {}", message)
            }
            Diagnostic::EmptyPath => write!(f, "empty file name"),
            Diagnostic::ExecutableFormat { path, format } => {
                write!(f, "{}: file is in executable format ({})", path, format)
            }
            Diagnostic::FileNotFound { path } => write!(f, "{}: file not found", path),
            Diagnostic::InvalidFile { path, message } => {
                write!(f, "{}: invalid file ({})", path, message)
            }
            Diagnostic::InvalidFileType { path, kind } => {
                write!(f, "{}: invalid type of file ({})", path, kind)
            }
        }
    }
}

/// Receives diagnostics from the resolver.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: &Diagnostic);
}

impl<F> DiagnosticSink for F
where
    F: Fn(&Diagnostic) + Send + Sync,
{
    fn report(&self, diagnostic: &Diagnostic) {
        self(diagnostic)
    }
}

/// Discards every diagnostic.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl DiagnosticSink for SilentSink {
    fn report(&self, _diagnostic: &Diagnostic) {}
}

/// Records diagnostics in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().unwrap().clone()
    }

    /// Display text of everything reported so far.
    pub fn messages(&self) -> Vec<String> {
        self.diagnostics()
            .iter()
            .map(ToString::to_string)
            .collect()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        self.diagnostics.lock().unwrap().push(diagnostic.clone());
    }
}

/// Writes one line per diagnostic at or above a minimum severity.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: Mutex<W>,
    min_severity: Severity,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W, min_severity: Severity) -> Self {
        Self {
            writer: Mutex::new(writer),
            min_severity,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> DiagnosticSink for WriterSink<W> {
    fn report(&self, diagnostic: &Diagnostic) {
        if diagnostic.severity() < self.min_severity {
            return;
        }
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(e) = writeln!(writer, "{}", diagnostic) {
            warn!(error = %e, "failed to write diagnostic");
        }
    }
}

/// Log a diagnostic and hand it to the sink.
pub(crate) fn emit(sink: &dyn DiagnosticSink, diagnostic: Diagnostic) {
    debug!(severity = ?diagnostic.severity(), "{}", diagnostic);
    sink.report(&diagnostic);
}
