//! File backend for PicoDB
//!
//! This module handles direct file I/O through `std::fs`.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

use tracing::debug;

use super::backend::{native_path, FileRef, OpenFlags, StorageBackend};
use crate::error::{Error, Result};

/// Storage backend over the host filesystem
#[derive(Debug, Default)]
pub struct FileBackend {
    /// Directory relative paths are resolved against
    root: Option<PathBuf>,
    /// File handles for open objects
    open_files: HashMap<u32, File>,
    next_handle: u32,
}

impl FileBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths under `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            ..Self::default()
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let native = native_path(path);
        match &self.root {
            Some(root) if native.is_relative() => root.join(native),
            _ => native,
        }
    }

    fn get_file_mut(&mut self, file: FileRef) -> Result<&mut File> {
        self.open_files
            .get_mut(&file.0)
            .ok_or(Error::BadFileRef(file.0))
    }
}

impl StorageBackend for FileBackend {
    fn open(&mut self, path: &str, flags: OpenFlags) -> Result<FileRef> {
        let native = self.resolve(path);
        let file = OpenOptions::new()
            .read(flags.read)
            .write(flags.write)
            .create(flags.create && flags.write)
            .open(&native)?;

        self.next_handle += 1;
        let handle = self.next_handle;
        self.open_files.insert(handle, file);
        debug!(path = %native.display(), handle, "opened file");
        Ok(FileRef(handle))
    }

    fn close(&mut self, file: FileRef) -> Result<()> {
        let mut handle = self
            .open_files
            .remove(&file.0)
            .ok_or(Error::BadFileRef(file.0))?;
        handle.flush()?;
        Ok(())
    }

    fn read(&mut self, file: FileRef, buf: &mut [u8]) -> Result<usize> {
        Ok(self.get_file_mut(file)?.read(buf)?)
    }

    fn write(&mut self, file: FileRef, buf: &[u8]) -> Result<usize> {
        Ok(self.get_file_mut(file)?.write(buf)?)
    }

    fn seek(&mut self, file: FileRef, pos: SeekFrom) -> Result<u64> {
        Ok(self.get_file_mut(file)?.seek(pos)?)
    }

    fn size(&mut self, file: FileRef) -> Result<u64> {
        Ok(self.get_file_mut(file)?.metadata()?.len())
    }

    fn delete(&mut self, path: &str) -> Result<()> {
        std::fs::remove_file(self.resolve(path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_without_create_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = FileBackend::with_root(dir.path());

        assert!(backend.open("missing.db", OpenFlags::READ_WRITE).is_err());
        let file = backend
            .open("missing.db", OpenFlags::READ_WRITE.with_create())
            .unwrap();
        backend.close(file).unwrap();
        assert!(dir.path().join("missing.db").exists());
    }

    #[test]
    fn test_read_write_seek_size() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = FileBackend::with_root(dir.path());
        let file = backend
            .open("t.db", OpenFlags::READ_WRITE.with_create())
            .unwrap();

        assert_eq!(backend.write(file, b"hello world").unwrap(), 11);
        assert_eq!(backend.size(file).unwrap(), 11);

        assert_eq!(backend.seek(file, SeekFrom::Start(6)).unwrap(), 6);
        let mut buf = [0u8; 5];
        assert_eq!(backend.read(file, &mut buf).unwrap(), 5);
        assert_eq!(&buf, b"world");

        backend.close(file).unwrap();
        assert!(matches!(backend.size(file), Err(Error::BadFileRef(_))));
    }

    #[test]
    fn test_delete() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = FileBackend::with_root(dir.path());
        let file = backend
            .open("gone.db", OpenFlags::READ_WRITE.with_create())
            .unwrap();
        backend.close(file).unwrap();

        backend.delete("gone.db").unwrap();
        assert!(!dir.path().join("gone.db").exists());
        assert!(backend.delete("gone.db").is_err());
    }
}
