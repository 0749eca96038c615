/* 📖 # What is the Platform Abstraction Layer?

The PAL is the only place that touches the operating system: directory scans,
executable classification and read-only opens. The resolver engine is written
against the Pal trait, so the same rules run on RealPal and on the in-memory
MockPal used by the tests.
*/

mod file_path;
mod kinds;
pub mod mock;
mod pattern;
pub mod real_pal;
mod traits;

pub use file_path::FilePath;
pub use kinds::{EXECUTABLE_MAGIC_LEN, ExecutableFormat, FileKind};
pub use mock::MockPal;
pub use pattern::EntryMatcher;
pub use real_pal::RealPal;
pub use traits::{EntryNames, Pal, PalFile, PalHandle};
