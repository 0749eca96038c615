/* 📖 # What lives in pathresolve_engine?

The two resolver operations and everything the command line needs around them:
- enumerator: expand a pattern into sibling paths
- validator: open a path only if it is an ordinary, non-executable disk file
- diagnostics: where status messages go
- config / listing: the `pathresolve.toml` settings and the CLI contract
*/

pub mod config;
pub mod diagnostics;
pub mod enumerator;
pub mod listing;
pub mod validator;

pub use config::{CONFIG_FILE_NAME, Config, load_config, load_config_or_default};
pub use diagnostics::{
    CollectingSink, Diagnostic, DiagnosticSink, Severity, SilentSink, WriterSink,
};
pub use enumerator::{DirectoryScan, Enumeration, ScanOptions, ScanTermination, enumerate_paths};
pub use listing::{ExitStatus, MISSING_ARGUMENT_MESSAGE, run_listing};
pub use validator::{FileHandle, Rejection, open_validated_file};
