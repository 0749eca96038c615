use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;

use tracing::{debug, instrument};

use crate::error::{PathResolveError, PathResolveResult};

use super::FilePath;
use super::kinds::{EXECUTABLE_MAGIC_LEN, ExecutableFormat, FileKind};
use super::pattern::EntryMatcher;
use super::traits::{EntryNames, Pal, PalFile};

/* 📖 # Why use std::fs instead of async or other crates?

Every resolver operation is a short, blocking call: one directory read, one
header sniff, one open. std::fs covers all of them; the only platform-specific
bits are the open flags (non-blocking on Unix so a FIFO cannot hang the open,
shared access on Windows).
*/

/// Concrete PAL implementation using the real filesystem via std::fs.
///
/// Relative paths are resolved against a configured base directory; absolute
/// paths are used as given.
#[derive(Debug)]
pub struct RealPal {
    base_dir: PathBuf,
}

impl RealPal {
    /// Create a new RealPal with the given base directory.
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Resolve a FilePath against the base directory.
    fn resolve_path(&self, path: &FilePath) -> PathBuf {
        self.base_dir.join(path.as_path())
    }

    fn open_options() -> fs::OpenOptions {
        let mut options = fs::OpenOptions::new();
        options.read(true);
        #[cfg(unix)]
        {
            use nix::fcntl::OFlag;
            use std::os::unix::fs::OpenOptionsExt;
            options.custom_flags(OFlag::O_NONBLOCK.bits());
        }
        #[cfg(windows)]
        {
            use std::os::windows::fs::OpenOptionsExt;
            const FILE_SHARE_READ: u32 = 0x0000_0001;
            const FILE_SHARE_WRITE: u32 = 0x0000_0002;
            const FILE_ATTRIBUTE_READONLY: u32 = 0x0000_0001;
            options
                .share_mode(FILE_SHARE_READ | FILE_SHARE_WRITE)
                .attributes(FILE_ATTRIBUTE_READONLY);
        }
        options
    }
}

impl Pal for RealPal {
    #[instrument(skip(self, matcher), fields(directory = %directory, leaf = matcher.leaf()))]
    fn scan_directory(
        &self,
        directory: &FilePath,
        matcher: &EntryMatcher,
    ) -> PathResolveResult<EntryNames<'_>> {
        let resolved = self.resolve_path(directory);
        debug!(resolved = %resolved.display(), "opening directory scan");
        let read_dir = fs::read_dir(&resolved).map_err(|e| {
            debug!(error = %e, "failed to open directory scan");
            Box::new(PathResolveError::file(resolved.clone(), e))
        })?;

        let matcher = matcher.clone();
        let iter = read_dir.filter_map(move |entry| match entry {
            Ok(entry) => {
                let name = entry.file_name();
                matcher.is_match(&name).then_some(Ok(name))
            }
            Err(e) => {
                debug!(error = %e, "error reading directory entry");
                Some(Err(Box::new(PathResolveError::file(resolved.clone(), e))))
            }
        });
        Ok(Box::new(iter))
    }

    #[instrument(skip(self), fields(path = %path))]
    fn executable_format(&self, path: &FilePath) -> PathResolveResult<ExecutableFormat> {
        let resolved = self.resolve_path(path);
        let metadata = fs::metadata(&resolved)
            .map_err(|e| Box::new(PathResolveError::file(resolved.clone(), e)))?;
        // only regular files are sniffed; reading a FIFO here would block
        if !metadata.is_file() {
            return Err(crate::err!("{} is not a regular file", resolved.display()));
        }

        let file = fs::File::open(&resolved)
            .map_err(|e| Box::new(PathResolveError::file(resolved.clone(), e)))?;
        let mut header = Vec::with_capacity(EXECUTABLE_MAGIC_LEN);
        file.take(EXECUTABLE_MAGIC_LEN as u64)
            .read_to_end(&mut header)
            .map_err(|e| Box::new(PathResolveError::file(resolved.clone(), e)))?;

        let format = ExecutableFormat::detect(&header).ok_or_else(|| {
            crate::err!("{} is not in a recognised executable format", resolved.display())
        })?;
        debug!(%format, "recognised executable format");
        Ok(format)
    }

    #[instrument(skip(self), fields(path = %path))]
    fn open_read_only(&self, path: &FilePath) -> PathResolveResult<Box<dyn PalFile>> {
        let resolved = self.resolve_path(path);
        debug!(resolved = %resolved.display(), "opening file read-only");
        let file = Self::open_options().open(&resolved).map_err(|e| {
            debug!(error = %e, "failed to open file");
            Box::new(PathResolveError::file(resolved.clone(), e))
        })?;
        debug!("file opened successfully");
        Ok(Box::new(RealFile {
            path: resolved,
            file,
        }))
    }
}

/// A file opened by [`RealPal`].
#[derive(Debug)]
struct RealFile {
    path: PathBuf,
    file: fs::File,
}

impl PalFile for RealFile {
    fn kind(&self) -> PathResolveResult<FileKind> {
        let metadata = self
            .file
            .metadata()
            .map_err(|e| Box::new(PathResolveError::file(self.path.clone(), e)))?;
        Ok(FileKind::from(metadata.file_type()))
    }
}

impl Read for RealFile {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.file.read(buf)
    }
}

impl Seek for RealFile {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.file.seek(pos)
    }
}
