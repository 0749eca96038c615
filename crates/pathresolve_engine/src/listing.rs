/* 📖 # What does a listing run print?

The listing is the whole command-line contract in one function, so it can be
exercised against MockPal and an in-memory writer:

    $ pathresolve 'C:/data/?.txt'
    C:/data/?.txt:
    C:/data/a.txt
    C:/data/b.txt

Only the first positional argument is used. Without one the run prints
`Error, Need a file name.` and reports exit status 1. A scan that stops with an
error still prints whatever it found and exits 0; the failure itself reaches the
user through the diagnostic sink. Diagnostics raised while scanning are held
back until the matched paths are written, so a warning never splits the list
when both share stdout.
*/

use std::ffi::OsString;
use std::io::{self, Write};

use tracing::{debug, instrument};

use pathresolve_base::{FilePath, PalHandle, PathResolveError, PathResolveResult};

use crate::config::Config;
use crate::diagnostics::{CollectingSink, DiagnosticSink, SilentSink};
use crate::enumerator::enumerate_paths;
use crate::validator::open_validated_file;

pub const MISSING_ARGUMENT_MESSAGE: &str = "Error, Need a file name.";

/// Outcome of a listing run, mapped onto a process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    MissingArgument,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::MissingArgument => 1,
        }
    }
}

/// Expand the first argument and write the header and matched paths to `out`.
///
/// `args` excludes the program name. Only failures to write to `out` are
/// returned as errors.
#[instrument(skip_all)]
pub fn run_listing(
    pal: &PalHandle,
    args: impl IntoIterator<Item = OsString>,
    config: &Config,
    out: &mut dyn Write,
    sink: &dyn DiagnosticSink,
) -> PathResolveResult<ExitStatus> {
    let Some(input) = args.into_iter().next() else {
        writeln!(out, "{}", MISSING_ARGUMENT_MESSAGE).map_err(output_error)?;
        return Ok(ExitStatus::MissingArgument);
    };

    let pattern = FilePath::from(input);
    writeln!(out, "{}:", pattern).map_err(output_error)?;

    let deferred = CollectingSink::new();
    let enumeration = enumerate_paths(pal, &pattern, config.scan_options(), &deferred);
    for path in &enumeration.paths {
        if config.validate_matches {
            writeln!(out, "{}  {}", path, validation_note(pal, path)).map_err(output_error)?;
        } else {
            writeln!(out, "{}", path).map_err(output_error)?;
        }
    }
    out.flush().map_err(output_error)?;
    for diagnostic in deferred.diagnostics() {
        sink.report(&diagnostic);
    }

    debug!(
        listed = enumeration.paths.len(),
        exhausted = enumeration.termination.is_exhausted(),
        "listing finished"
    );
    Ok(ExitStatus::Success)
}

fn validation_note(pal: &PalHandle, path: &FilePath) -> String {
    match open_validated_file(pal, path, &SilentSink) {
        Ok(handle) => {
            handle.close();
            "[ok]".to_string()
        }
        Err(rejection) => format!("[rejected: {}]", rejection),
    }
}

fn output_error(error: io::Error) -> Box<PathResolveError> {
    Box::new(
        PathResolveError::message("Failed to write listing")
            .caused_by(PathResolveError::file("<stdout>", error)),
    )
}
