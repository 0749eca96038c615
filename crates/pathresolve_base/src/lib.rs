/* 📖 # Why have pathresolve_base as a core library?
pathresolve_base provides the error type, logging setup and the Platform
Abstraction Layer. The engine only talks to the filesystem through the PAL, so
every resolver rule can be tested against the in-memory MockPal.
*/

pub mod error;
pub mod pal;
pub mod tracing;

// Re-export commonly used types for convenience
pub use error::{ErrorKind, PathResolveError, PathResolveResult, ResultExt};
pub use pal::{
    EntryMatcher, EntryNames, ExecutableFormat, FileKind, FilePath, MockPal, Pal, PalFile,
    PalHandle, RealPal,
};
