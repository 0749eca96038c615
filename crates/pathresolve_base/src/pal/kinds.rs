use std::fmt;

/// Type of an opened file, as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Ordinary on-disk storage.
    Disk,
    Directory,
    Pipe,
    CharacterDevice,
    BlockDevice,
    Socket,
    Unknown,
}

impl FileKind {
    pub fn is_disk(self) -> bool {
        self == FileKind::Disk
    }
}

impl From<std::fs::FileType> for FileKind {
    fn from(file_type: std::fs::FileType) -> Self {
        if file_type.is_file() {
            return FileKind::Disk;
        }
        if file_type.is_dir() {
            return FileKind::Directory;
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileTypeExt;
            if file_type.is_fifo() {
                return FileKind::Pipe;
            }
            if file_type.is_char_device() {
                return FileKind::CharacterDevice;
            }
            if file_type.is_block_device() {
                return FileKind::BlockDevice;
            }
            if file_type.is_socket() {
                return FileKind::Socket;
            }
        }
        FileKind::Unknown
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileKind::Disk => "disk file",
            FileKind::Directory => "directory",
            FileKind::Pipe => "pipe",
            FileKind::CharacterDevice => "character device",
            FileKind::BlockDevice => "block device",
            FileKind::Socket => "socket",
            FileKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Recognised executable binary formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutableFormat {
    /// DOS `MZ` header, which also starts every PE image.
    Pe,
    Elf,
    MachO,
    /// Mach-O universal ("fat") binary.
    MachOUniversal,
}

/// Number of leading bytes needed by [`ExecutableFormat::detect`].
pub const EXECUTABLE_MAGIC_LEN: usize = 8;

/// Java class files share the fat Mach-O magic; their version word (major
/// version 45 or later) always reads as at least this many architectures.
const MAX_FAT_ARCHES: u32 = 45;

impl ExecutableFormat {
    /// Classify a file by its leading bytes.
    pub fn detect(header: &[u8]) -> Option<Self> {
        if header.starts_with(b"MZ") {
            return Some(ExecutableFormat::Pe);
        }
        let magic: [u8; 4] = header.get(..4)?.try_into().ok()?;
        match magic {
            [0x7f, b'E', b'L', b'F'] => Some(ExecutableFormat::Elf),
            [0xfe, 0xed, 0xfa, 0xce | 0xcf] | [0xce | 0xcf, 0xfa, 0xed, 0xfe] => {
                Some(ExecutableFormat::MachO)
            }
            [0xca, 0xfe, 0xba, 0xbe] => {
                let count: [u8; 4] = header.get(4..8)?.try_into().ok()?;
                let fat_arches = u32::from_be_bytes(count);
                (1..MAX_FAT_ARCHES)
                    .contains(&fat_arches)
                    .then_some(ExecutableFormat::MachOUniversal)
            }
            _ => None,
        }
    }
}

impl fmt::Display for ExecutableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExecutableFormat::Pe => "PE/DOS",
            ExecutableFormat::Elf => "ELF",
            ExecutableFormat::MachO => "Mach-O",
            ExecutableFormat::MachOUniversal => "Mach-O universal",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_pe() {
        assert_eq!(
            ExecutableFormat::detect(b"MZ\x90\x00rest"),
            Some(ExecutableFormat::Pe)
        );
        // a two byte file is enough for the MZ signature
        assert_eq!(ExecutableFormat::detect(b"MZ"), Some(ExecutableFormat::Pe));
    }

    #[test]
    fn test_detect_elf() {
        assert_eq!(
            ExecutableFormat::detect(b"\x7fELF\x02\x01\x01"),
            Some(ExecutableFormat::Elf)
        );
    }

    #[test]
    fn test_detect_macho_both_byte_orders() {
        assert_eq!(
            ExecutableFormat::detect(&[0xcf, 0xfa, 0xed, 0xfe, 0x07]),
            Some(ExecutableFormat::MachO)
        );
        assert_eq!(
            ExecutableFormat::detect(&[0xfe, 0xed, 0xfa, 0xce]),
            Some(ExecutableFormat::MachO)
        );
    }

    #[test]
    fn test_detect_universal_needs_arch_count() {
        assert_eq!(
            ExecutableFormat::detect(&[0xca, 0xfe, 0xba, 0xbe, 0x00, 0x00, 0x00, 0x02]),
            Some(ExecutableFormat::MachOUniversal)
        );
        // magic alone is not enough
        assert_eq!(ExecutableFormat::detect(&[0xca, 0xfe, 0xba, 0xbe]), None);
        assert_eq!(
            ExecutableFormat::detect(&[0xca, 0xfe, 0xba, 0xbe, 0x00, 0x00, 0x00, 0x00]),
            None
        );
    }

    #[test]
    fn test_java_class_file_is_not_executable() {
        // minor 0, major 52 (Java 8)
        assert_eq!(
            ExecutableFormat::detect(b"\xca\xfe\xba\xbe\x00\x00\x00\x34\x00\x1d"),
            None
        );
        // minor 3, major 45 (Java 1.1)
        assert_eq!(
            ExecutableFormat::detect(b"\xca\xfe\xba\xbe\x00\x03\x00\x2d"),
            None
        );
    }

    #[test]
    fn test_text_is_not_executable() {
        assert_eq!(ExecutableFormat::detect(b"hello world"), None);
        assert_eq!(ExecutableFormat::detect(b"#!/bin/sh\n"), None);
        assert_eq!(ExecutableFormat::detect(b""), None);
        assert_eq!(ExecutableFormat::detect(b"\x7fEL"), None);
    }

    #[test]
    fn test_file_kind_display() {
        assert_eq!(FileKind::Pipe.to_string(), "pipe");
        assert_eq!(FileKind::CharacterDevice.to_string(), "character device");
        assert!(FileKind::Disk.is_disk());
        assert!(!FileKind::Directory.is_disk());
    }
}
