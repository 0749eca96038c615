use std::collections::HashMap;
use std::ffi::OsString;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{PathResolveError, PathResolveResult};

use super::FilePath;
use super::kinds::{ExecutableFormat, FileKind};
use super::pattern::EntryMatcher;
use super::traits::{EntryNames, Pal, PalFile};

/* 📖 # Why does MockPal count open scans and files?

Both resolver operations promise never to leak a cursor or a handle, even on
rejection and early-termination paths. MockPal hands out scan iterators and
files that decrement a shared counter when dropped, so a test can assert that
everything it caused to be opened has been released again.
*/

/// In-memory PAL implementation for testing.
///
/// Entries are kept in insertion order, which is also the order a scan yields
/// them in. Parent directories are implied by the entries below them.
///
/// # Examples
///
/// ```
/// use pathresolve_base::{MockPal, Pal, FilePath};
///
/// let mock = MockPal::new();
/// mock.add_file(FilePath::from("test.txt"), b"content".to_vec());
/// let content = mock.read_file_to_string(&FilePath::from("test.txt")).unwrap();
/// assert_eq!(content, "content");
/// assert_eq!(mock.open_file_count(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockPal {
    state: Arc<Mutex<MockState>>,
    counters: Arc<MockCounters>,
}

#[derive(Debug, Default)]
struct MockState {
    entries: Vec<MockEntry>,
    scan_faults: HashMap<FilePath, ScanFault>,
    open_faults: HashMap<FilePath, io::ErrorKind>,
}

#[derive(Debug, Clone)]
struct MockEntry {
    path: FilePath,
    kind: FileKind,
    content: Vec<u8>,
}

#[derive(Debug, Clone, Copy)]
enum ScanFault {
    /// Opening the scan fails.
    Open(io::ErrorKind),
    /// The scan yields this many entries, then fails.
    After(usize, io::ErrorKind),
}

#[derive(Debug, Default)]
struct MockCounters {
    open_scans: AtomicUsize,
    open_files: AtomicUsize,
    scans_started: AtomicUsize,
    files_opened: AtomicUsize,
    classifications: AtomicUsize,
}

impl MockPal {
    /// Create a new empty MockPal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a disk file, replacing the content of an existing entry in place.
    pub fn add_file(&self, path: FilePath, content: Vec<u8>) {
        self.insert(MockEntry {
            path,
            kind: FileKind::Disk,
            content,
        });
    }

    /// Add an explicit directory entry.
    pub fn add_directory(&self, path: FilePath) {
        self.add_special(path, FileKind::Directory);
    }

    /// Add an entry of any kind, e.g. a pipe or a character device.
    pub fn add_special(&self, path: FilePath, kind: FileKind) {
        self.insert(MockEntry {
            path,
            kind,
            content: Vec::new(),
        });
    }

    /// Make opening a scan of `directory` fail with the given error kind.
    pub fn fail_scan_open(&self, directory: FilePath, kind: io::ErrorKind) {
        self.lock()
            .scan_faults
            .insert(directory, ScanFault::Open(kind));
    }

    /// Make a scan of `directory` fail after yielding `yielded` entries.
    pub fn fail_scan_after(&self, directory: FilePath, yielded: usize, kind: io::ErrorKind) {
        self.lock()
            .scan_faults
            .insert(directory, ScanFault::After(yielded, kind));
    }

    /// Make opening `path` fail with the given error kind.
    pub fn fail_open(&self, path: FilePath, kind: io::ErrorKind) {
        self.lock().open_faults.insert(path, kind);
    }

    /// Scans currently open (not yet dropped).
    pub fn open_scan_count(&self) -> usize {
        self.counters.open_scans.load(Ordering::SeqCst)
    }

    /// Files currently open (not yet dropped).
    pub fn open_file_count(&self) -> usize {
        self.counters.open_files.load(Ordering::SeqCst)
    }

    /// Total number of scans successfully started.
    pub fn scans_started(&self) -> usize {
        self.counters.scans_started.load(Ordering::SeqCst)
    }

    /// Total number of successful opens.
    pub fn files_opened(&self) -> usize {
        self.counters.files_opened.load(Ordering::SeqCst)
    }

    /// Total number of executable classification requests.
    pub fn classifications(&self) -> usize {
        self.counters.classifications.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    fn insert(&self, entry: MockEntry) {
        let mut state = self.lock();
        match state.entries.iter_mut().find(|e| e.path == entry.path) {
            Some(existing) => *existing = entry,
            None => state.entries.push(entry),
        }
    }

    fn not_found(path: &FilePath) -> Box<PathResolveError> {
        Box::new(PathResolveError::file(
            path.as_path(),
            io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path)),
        ))
    }
}

impl MockState {
    fn entry(&self, path: &FilePath) -> Option<&MockEntry> {
        self.entries.iter().find(|e| &e.path == path)
    }

    /// True if `directory` or one of its ancestors is a non-directory entry.
    fn blocks_directory(&self, directory: &FilePath) -> bool {
        self.entries.iter().any(|e| {
            e.kind != FileKind::Directory && directory.as_path().starts_with(e.path.as_path())
        })
    }

    fn directory_exists(&self, directory: &FilePath) -> bool {
        directory.is_empty()
            || self.entries.iter().any(|e| {
                if &e.path == directory {
                    e.kind == FileKind::Directory
                } else {
                    e.path.as_path().starts_with(directory.as_path())
                }
            })
    }
}

impl Pal for MockPal {
    fn scan_directory(
        &self,
        directory: &FilePath,
        matcher: &EntryMatcher,
    ) -> PathResolveResult<EntryNames<'_>> {
        let state = self.lock();
        let fault = state.scan_faults.get(directory).copied();
        if let Some(ScanFault::Open(kind)) = fault {
            return Err(Box::new(PathResolveError::file(
                directory.as_path(),
                io::Error::new(kind, "injected scan open failure"),
            )));
        }
        if !state.directory_exists(directory) {
            // a file on the way to the directory fails like ENOTDIR does
            if state.blocks_directory(directory) {
                return Err(Box::new(PathResolveError::file(
                    directory.as_path(),
                    io::Error::new(io::ErrorKind::NotADirectory, "Not a directory"),
                )));
            }
            return Err(Self::not_found(directory));
        }

        let names: Vec<OsString> = state
            .entries
            .iter()
            .filter(|e| &e.path.parent_directory() == directory)
            .filter_map(|e| e.path.leaf_name())
            .filter(|name| matcher.is_match(name))
            .map(|name| name.to_os_string())
            .collect();

        self.counters.scans_started.fetch_add(1, Ordering::SeqCst);
        self.counters.open_scans.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockScan {
            directory: directory.clone(),
            names: names.into_iter(),
            yielded: 0,
            fail_after: match fault {
                Some(ScanFault::After(count, kind)) => Some((count, kind)),
                _ => None,
            },
            finished: false,
            counters: Arc::clone(&self.counters),
        }))
    }

    fn executable_format(&self, path: &FilePath) -> PathResolveResult<ExecutableFormat> {
        self.counters.classifications.fetch_add(1, Ordering::SeqCst);
        let state = self.lock();
        let entry = state.entry(path).ok_or_else(|| Self::not_found(path))?;
        if entry.kind != FileKind::Disk {
            crate::bail!("{} is not a regular file", path);
        }
        ExecutableFormat::detect(&entry.content)
            .ok_or_else(|| crate::err!("{} is not in a recognised executable format", path))
    }

    fn open_read_only(&self, path: &FilePath) -> PathResolveResult<Box<dyn PalFile>> {
        let state = self.lock();
        if let Some(kind) = state.open_faults.get(path) {
            return Err(Box::new(PathResolveError::file(
                path.as_path(),
                io::Error::new(*kind, "injected open failure"),
            )));
        }
        let entry = state.entry(path).ok_or_else(|| Self::not_found(path))?;

        self.counters.files_opened.fetch_add(1, Ordering::SeqCst);
        self.counters.open_files.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockFile {
            kind: entry.kind,
            cursor: Cursor::new(entry.content.clone()),
            counters: Arc::clone(&self.counters),
        }))
    }
}

/// Scan iterator handed out by MockPal.
#[derive(Debug)]
struct MockScan {
    directory: FilePath,
    names: std::vec::IntoIter<OsString>,
    yielded: usize,
    fail_after: Option<(usize, io::ErrorKind)>,
    finished: bool,
    counters: Arc<MockCounters>,
}

impl Iterator for MockScan {
    type Item = PathResolveResult<OsString>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if let Some((count, kind)) = self.fail_after {
            if self.yielded == count {
                self.finished = true;
                return Some(Err(Box::new(PathResolveError::file(
                    self.directory.as_path(),
                    io::Error::new(kind, "injected scan failure"),
                ))));
            }
        }
        match self.names.next() {
            Some(name) => {
                self.yielded += 1;
                Some(Ok(name))
            }
            None => {
                self.finished = true;
                None
            }
        }
    }
}

impl Drop for MockScan {
    fn drop(&mut self) {
        self.counters.open_scans.fetch_sub(1, Ordering::SeqCst);
    }
}

/// File handed out by MockPal.
#[derive(Debug)]
struct MockFile {
    kind: FileKind,
    cursor: Cursor<Vec<u8>>,
    counters: Arc<MockCounters>,
}

impl PalFile for MockFile {
    fn kind(&self) -> PathResolveResult<FileKind> {
        Ok(self.kind)
    }
}

impl Read for MockFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl Seek for MockFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.cursor.seek(pos)
    }
}

impl Drop for MockFile {
    fn drop(&mut self) {
        self.counters.open_files.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    fn scan(pal: &MockPal, directory: &str, leaf: &str) -> Vec<PathResolveResult<OsString>> {
        let matcher = EntryMatcher::new(OsStr::new(leaf), false).unwrap();
        pal.scan_directory(&FilePath::from(directory), &matcher)
            .unwrap()
            .collect()
    }

    #[test]
    fn test_scan_preserves_insertion_order() {
        let pal = MockPal::new();
        pal.add_file(FilePath::from("data/b.txt"), vec![]);
        pal.add_file(FilePath::from("data/a.txt"), vec![]);
        pal.add_file(FilePath::from("data/c.rs"), vec![]);

        let names: Vec<_> = scan(&pal, "data", "*.txt")
            .into_iter()
            .map(Result::unwrap)
            .collect();
        assert_eq!(names, vec!["b.txt", "a.txt"]);
        assert_eq!(pal.open_scan_count(), 0);
        assert_eq!(pal.scans_started(), 1);
    }

    #[test]
    fn test_scan_lists_only_direct_children() {
        let pal = MockPal::new();
        pal.add_file(FilePath::from("data/a.txt"), vec![]);
        pal.add_file(FilePath::from("data/sub/b.txt"), vec![]);
        pal.add_directory(FilePath::from("data/sub"));

        let names: Vec<_> = scan(&pal, "data", "*")
            .into_iter()
            .map(Result::unwrap)
            .collect();
        assert_eq!(names, vec!["a.txt", "sub"]);
    }

    #[test]
    fn test_scan_missing_directory_is_not_found() {
        let pal = MockPal::new();
        let matcher = EntryMatcher::new(OsStr::new("*"), false).unwrap();

        let error = pal
            .scan_directory(&FilePath::from("nowhere"), &matcher)
            .err()
            .unwrap();
        assert!(error.is_not_found());
        assert_eq!(pal.scans_started(), 0);
    }

    #[test]
    fn test_scan_through_a_file_is_not_a_directory() {
        let pal = MockPal::new();
        pal.add_file(FilePath::from("notes.txt"), b"notes".to_vec());
        let matcher = EntryMatcher::new(OsStr::new("*"), false).unwrap();

        for directory in ["notes.txt", "notes.txt/deeper"] {
            let error = pal
                .scan_directory(&FilePath::from(directory), &matcher)
                .err()
                .unwrap();
            assert_eq!(error.io_error_kind(), Some(io::ErrorKind::NotADirectory));
        }
        assert_eq!(pal.scans_started(), 0);
    }

    #[test]
    fn test_empty_directory_path_always_exists() {
        let pal = MockPal::new();
        assert!(scan(&pal, "", "*").is_empty());
    }

    #[test]
    fn test_scan_fault_after_entries() {
        let pal = MockPal::new();
        pal.add_file(FilePath::from("d/1"), vec![]);
        pal.add_file(FilePath::from("d/2"), vec![]);
        pal.add_file(FilePath::from("d/3"), vec![]);
        pal.fail_scan_after(FilePath::from("d"), 2, io::ErrorKind::PermissionDenied);

        let results = scan(&pal, "d", "*");
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        assert!(results[2].is_err());
    }

    #[test]
    fn test_dropping_scan_early_releases_it() {
        let pal = MockPal::new();
        pal.add_file(FilePath::from("a"), vec![]);
        pal.add_file(FilePath::from("b"), vec![]);
        let matcher = EntryMatcher::new(OsStr::new("*"), false).unwrap();

        let mut names = pal.scan_directory(&FilePath::default(), &matcher).unwrap();
        assert!(names.next().is_some());
        assert_eq!(pal.open_scan_count(), 1);
        drop(names);
        assert_eq!(pal.open_scan_count(), 0);
    }

    #[test]
    fn test_open_file_counts_handles() {
        let pal = MockPal::new();
        pal.add_file(FilePath::from("a.txt"), b"abc".to_vec());

        let mut file = pal.open_read_only(&FilePath::from("a.txt")).unwrap();
        assert_eq!(pal.open_file_count(), 1);
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        assert_eq!(content, "abc");
        drop(file);
        assert_eq!(pal.open_file_count(), 0);
        assert_eq!(pal.files_opened(), 1);
    }

    #[test]
    fn test_open_missing_file() {
        let pal = MockPal::new();
        let error = pal.open_read_only(&FilePath::from("missing")).unwrap_err();
        assert!(error.is_not_found());
        assert_eq!(pal.open_file_count(), 0);
    }

    #[test]
    fn test_open_fault() {
        let pal = MockPal::new();
        pal.add_file(FilePath::from("locked"), vec![]);
        pal.fail_open(FilePath::from("locked"), io::ErrorKind::PermissionDenied);

        let error = pal.open_read_only(&FilePath::from("locked")).unwrap_err();
        assert_eq!(error.io_error_kind(), Some(io::ErrorKind::PermissionDenied));
    }

    #[test]
    fn test_special_entries_report_their_kind() {
        let pal = MockPal::new();
        pal.add_special(FilePath::from("pipe"), FileKind::Pipe);

        let file = pal.open_read_only(&FilePath::from("pipe")).unwrap();
        assert_eq!(file.kind().unwrap(), FileKind::Pipe);
        assert!(pal.executable_format(&FilePath::from("pipe")).is_err());
    }

    #[test]
    fn test_executable_format_from_content() {
        let pal = MockPal::new();
        pal.add_file(FilePath::from("app.exe"), b"MZ\x90\x00".to_vec());
        pal.add_file(FilePath::from("notes.txt"), b"notes".to_vec());

        assert_eq!(
            pal.executable_format(&FilePath::from("app.exe")).unwrap(),
            ExecutableFormat::Pe
        );
        assert!(pal.executable_format(&FilePath::from("notes.txt")).is_err());
        assert_eq!(pal.classifications(), 2);
    }

    #[test]
    fn test_add_file_replaces_in_place() {
        let pal = MockPal::new();
        pal.add_file(FilePath::from("a"), b"old".to_vec());
        pal.add_file(FilePath::from("b"), vec![]);
        pal.add_file(FilePath::from("a"), b"new".to_vec());

        assert_eq!(pal.read_file_to_string(&FilePath::from("a")).unwrap(), "new");
        let names: Vec<_> = scan(&pal, "", "*")
            .into_iter()
            .map(Result::unwrap)
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
