//! Storage backend interface
//!
//! Byte-oriented access to named persistent objects. The engine only needs
//! to prove the database object can be opened or created; the remaining
//! operations are part of the contract for hosts that persist more.

use std::io::SeekFrom;
use std::path::PathBuf;

use crate::error::Result;

/// Reference to an open object, issued by a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileRef(pub u32);

/// How an object is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpenFlags {
    pub read: bool,
    pub write: bool,
    pub create: bool,
}

impl OpenFlags {
    pub const READ_ONLY: OpenFlags = OpenFlags {
        read: true,
        write: false,
        create: false,
    };

    pub const READ_WRITE: OpenFlags = OpenFlags {
        read: true,
        write: true,
        create: false,
    };

    /// Same flags, also creating the object when missing
    pub fn with_create(mut self) -> Self {
        self.create = true;
        self
    }
}

/// Storage backend collaborator
pub trait StorageBackend {
    /// Open `path` (slash-separated, host-neutral)
    fn open(&mut self, path: &str, flags: OpenFlags) -> Result<FileRef>;

    fn close(&mut self, file: FileRef) -> Result<()>;

    /// Read at the current position, returning bytes transferred
    fn read(&mut self, file: FileRef, buf: &mut [u8]) -> Result<usize>;

    /// Write at the current position, returning bytes transferred
    fn write(&mut self, file: FileRef, buf: &[u8]) -> Result<usize>;

    /// Move the position, returning the new absolute offset
    fn seek(&mut self, file: FileRef, pos: SeekFrom) -> Result<u64>;

    /// Size of the object in bytes
    fn size(&mut self, file: FileRef) -> Result<u64>;

    fn delete(&mut self, path: &str) -> Result<()>;
}

/// Translate a slash-separated path into a native path
///
/// Empty components and `.` are dropped; a leading `/` keeps the path absolute.
pub fn native_path(path: &str) -> PathBuf {
    let mut native = PathBuf::new();
    if path.starts_with('/') {
        native.push(std::path::MAIN_SEPARATOR_STR);
    }
    for component in path.split('/').filter(|c| !c.is_empty() && *c != ".") {
        native.push(component);
    }
    native
}

/// Resolve a seek request against a current position and size
pub(crate) fn resolve_seek(current: u64, size: u64, pos: SeekFrom) -> Option<u64> {
    match pos {
        SeekFrom::Start(offset) => Some(offset),
        SeekFrom::Current(delta) => current.checked_add_signed(delta),
        SeekFrom::End(delta) => size.checked_add_signed(delta),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_native_path() {
        assert_eq!(native_path("test.db"), Path::new("test.db"));
        assert_eq!(
            native_path("data//db/./app.db"),
            Path::new("data").join("db").join("app.db")
        );
        assert!(native_path("/var/db/app.db").is_absolute());
    }

    #[test]
    fn test_resolve_seek() {
        assert_eq!(resolve_seek(5, 10, SeekFrom::Start(2)), Some(2));
        assert_eq!(resolve_seek(5, 10, SeekFrom::Current(-3)), Some(2));
        assert_eq!(resolve_seek(5, 10, SeekFrom::End(-1)), Some(9));
        assert_eq!(resolve_seek(5, 10, SeekFrom::Current(-6)), None);
    }
}
