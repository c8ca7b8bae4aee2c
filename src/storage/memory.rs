//! Volatile storage backend
//!
//! Objects live in process memory and vanish with the backend. Used for the
//! `:memory:` database and in tests.

use std::collections::HashMap;
use std::io::SeekFrom;

use super::backend::{resolve_seek, FileRef, OpenFlags, StorageBackend};
use crate::error::{Error, Result};

#[derive(Debug)]
struct OpenObject {
    path: String,
    position: u64,
    writable: bool,
}

/// In-memory storage backend
#[derive(Debug, Default)]
pub struct MemoryBackend {
    objects: HashMap<String, Vec<u8>>,
    open: HashMap<u32, OpenObject>,
    next_handle: u32,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an object exists at `path`
    pub fn exists(&self, path: &str) -> bool {
        self.objects.contains_key(path)
    }

    fn handle(&self, file: FileRef) -> Result<&OpenObject> {
        self.open.get(&file.0).ok_or(Error::BadFileRef(file.0))
    }
}

impl StorageBackend for MemoryBackend {
    fn open(&mut self, path: &str, flags: OpenFlags) -> Result<FileRef> {
        if !self.objects.contains_key(path) {
            if !(flags.create && flags.write) {
                return Err(Error::FileNotFound(path.to_string()));
            }
            self.objects.insert(path.to_string(), Vec::new());
        }

        self.next_handle += 1;
        self.open.insert(
            self.next_handle,
            OpenObject {
                path: path.to_string(),
                position: 0,
                writable: flags.write,
            },
        );
        Ok(FileRef(self.next_handle))
    }

    fn close(&mut self, file: FileRef) -> Result<()> {
        self.open
            .remove(&file.0)
            .map(|_| ())
            .ok_or(Error::BadFileRef(file.0))
    }

    fn read(&mut self, file: FileRef, buf: &mut [u8]) -> Result<usize> {
        let object = self.open.get_mut(&file.0).ok_or(Error::BadFileRef(file.0))?;
        let data = self
            .objects
            .get(&object.path)
            .ok_or_else(|| Error::FileNotFound(object.path.clone()))?;

        let start = (object.position as usize).min(data.len());
        let count = buf.len().min(data.len() - start);
        buf[..count].copy_from_slice(&data[start..start + count]);
        object.position += count as u64;
        Ok(count)
    }

    fn write(&mut self, file: FileRef, buf: &[u8]) -> Result<usize> {
        let object = self.open.get_mut(&file.0).ok_or(Error::BadFileRef(file.0))?;
        if !object.writable {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "object opened read-only",
            )));
        }
        let data = self
            .objects
            .get_mut(&object.path)
            .ok_or_else(|| Error::FileNotFound(object.path.clone()))?;

        let start = object.position as usize;
        let end = start + buf.len();
        if data.len() < end {
            data.resize(end, 0);
        }
        data[start..end].copy_from_slice(buf);
        object.position = end as u64;
        Ok(buf.len())
    }

    fn seek(&mut self, file: FileRef, pos: SeekFrom) -> Result<u64> {
        let size = self.size(file)?;
        let object = self.open.get_mut(&file.0).ok_or(Error::BadFileRef(file.0))?;
        let position = resolve_seek(object.position, size, pos).ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "seek before start of object",
            ))
        })?;
        object.position = position;
        Ok(position)
    }

    fn size(&mut self, file: FileRef) -> Result<u64> {
        let object = self.handle(file)?;
        Ok(self
            .objects
            .get(&object.path)
            .map_or(0, |data| data.len() as u64))
    }

    fn delete(&mut self, path: &str) -> Result<()> {
        self.objects
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| Error::FileNotFound(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_requires_create() {
        let mut backend = MemoryBackend::new();
        assert!(matches!(
            backend.open("a.db", OpenFlags::READ_WRITE),
            Err(Error::FileNotFound(_))
        ));
        let file = backend
            .open("a.db", OpenFlags::READ_WRITE.with_create())
            .unwrap();
        assert!(backend.exists("a.db"));
        backend.close(file).unwrap();

        // Exists now, so a plain open succeeds.
        let file = backend.open("a.db", OpenFlags::READ_WRITE).unwrap();
        backend.close(file).unwrap();
    }

    #[test]
    fn test_read_write_seek() {
        let mut backend = MemoryBackend::new();
        let file = backend
            .open("a.db", OpenFlags::READ_WRITE.with_create())
            .unwrap();

        backend.write(file, b"abcdef").unwrap();
        assert_eq!(backend.size(file).unwrap(), 6);

        backend.seek(file, SeekFrom::End(-2)).unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(backend.read(file, &mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"ef");

        // Writing past the end zero-fills the gap.
        backend.seek(file, SeekFrom::Start(8)).unwrap();
        backend.write(file, b"z").unwrap();
        assert_eq!(backend.size(file).unwrap(), 9);

        assert!(backend.seek(file, SeekFrom::Current(-100)).is_err());
    }

    #[test]
    fn test_read_only_rejects_write() {
        let mut backend = MemoryBackend::new();
        let file = backend
            .open("a.db", OpenFlags::READ_WRITE.with_create())
            .unwrap();
        backend.close(file).unwrap();

        let file = backend.open("a.db", OpenFlags::READ_ONLY).unwrap();
        assert!(backend.write(file, b"x").is_err());
    }

    #[test]
    fn test_delete() {
        let mut backend = MemoryBackend::new();
        let file = backend
            .open("a.db", OpenFlags::READ_WRITE.with_create())
            .unwrap();
        backend.close(file).unwrap();
        backend.delete("a.db").unwrap();
        assert!(!backend.exists("a.db"));
        assert!(backend.delete("a.db").is_err());
    }
}
