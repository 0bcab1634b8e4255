//! Abstract byte-level access to the backing store
//!
//! The store never touches the filesystem directly; it goes through a
//! [`StorageHandle`], which keeps the persistence code testable against an
//! in-memory buffer and lets the filesystem implementation provide atomic
//! replacement.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::NamedTempFile;

/// Byte-oriented access to one backing store.
///
/// One handle is exclusively owned by one `TaskStore`; concurrent external
/// writers to the same backing store are outside the contract.
pub trait StorageHandle: Send + Sync {
    /// Opens the current contents for reading. A backing store that has
    /// never been written yields an empty reader, not an error.
    fn open_read(&self) -> io::Result<Box<dyn Read + Send>>;

    /// Opens a writer for a full replacement of the contents. The new bytes
    /// become visible only when [`WriteHandle::commit`] succeeds; dropping
    /// the writer without committing leaves the previous contents intact.
    fn open_write(&self) -> io::Result<Box<dyn WriteHandle>>;
}

/// A pending full-overwrite of a backing store
pub trait WriteHandle: Write + Send {
    /// Makes the written bytes the new contents, atomically
    fn commit(self: Box<Self>) -> io::Result<()>;
}

/// Filesystem-backed storage: one file per store.
pub struct FsHandle {
    path: PathBuf,
}

impl FsHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageHandle for FsHandle {
    fn open_read(&self) -> io::Result<Box<dyn Read + Send>> {
        match File::open(&self.path) {
            Ok(file) => Ok(Box::new(file)),
            // First run: no file yet decodes as an empty store
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Box::new(io::empty())),
            Err(err) => Err(err),
        }
    }

    fn open_write(&self) -> io::Result<Box<dyn WriteHandle>> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Stage in the destination directory so the final rename does not
        // cross a filesystem boundary.
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let staged = NamedTempFile::new_in(dir)?;

        Ok(Box::new(FsWrite {
            staged,
            target: self.path.clone(),
        }))
    }
}

struct FsWrite {
    staged: NamedTempFile,
    target: PathBuf,
}

impl Write for FsWrite {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.staged.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.staged.flush()
    }
}

impl WriteHandle for FsWrite {
    fn commit(self: Box<Self>) -> io::Result<()> {
        let FsWrite { mut staged, target } = *self;
        staged.flush()?;
        staged.persist(target).map_err(|err| err.error)?;
        Ok(())
    }
}

/// In-memory storage, for tests and ephemeral stores.
///
/// Clones share the same buffer, so a test can hand one clone to a store and
/// inspect the bytes through another.
#[derive(Clone, Default)]
pub struct MemoryHandle {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl MemoryHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current committed contents
    pub fn contents(&self) -> Vec<u8> {
        self.buffer.lock().expect("memory handle lock poisoned").clone()
    }
}

impl StorageHandle for MemoryHandle {
    fn open_read(&self) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(io::Cursor::new(self.contents())))
    }

    fn open_write(&self) -> io::Result<Box<dyn WriteHandle>> {
        Ok(Box::new(MemoryWrite {
            pending: Vec::new(),
            buffer: Arc::clone(&self.buffer),
        }))
    }
}

struct MemoryWrite {
    pending: Vec<u8>,
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl Write for MemoryWrite {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl WriteHandle for MemoryWrite {
    fn commit(self: Box<Self>) -> io::Result<()> {
        let MemoryWrite { pending, buffer } = *self;
        *buffer.lock().expect("memory handle lock poisoned") = pending;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fs_handle_missing_file_reads_empty() {
        let dir = TempDir::new().expect("Should create temp dir");
        let handle = FsHandle::new(dir.path().join("tasks.json"));

        let mut bytes = Vec::new();
        handle
            .open_read()
            .expect("Should open missing file")
            .read_to_end(&mut bytes)
            .expect("Should read");

        assert!(bytes.is_empty());
    }

    #[test]
    fn test_fs_handle_commit_replaces_contents() {
        let dir = TempDir::new().expect("Should create temp dir");
        let handle = FsHandle::new(dir.path().join("tasks.json"));

        let mut writer = handle.open_write().expect("Should open writer");
        writer.write_all(b"first").expect("Should write");
        writer.commit().expect("Should commit");

        let mut writer = handle.open_write().expect("Should open writer");
        writer.write_all(b"second").expect("Should write");
        writer.commit().expect("Should commit");

        let mut bytes = Vec::new();
        handle
            .open_read()
            .expect("Should open")
            .read_to_end(&mut bytes)
            .expect("Should read");
        assert_eq!(bytes, b"second");
    }

    #[test]
    fn test_uncommitted_write_leaves_previous_contents() {
        let dir = TempDir::new().expect("Should create temp dir");
        let handle = FsHandle::new(dir.path().join("tasks.json"));

        let mut writer = handle.open_write().expect("Should open writer");
        writer.write_all(b"kept").expect("Should write");
        writer.commit().expect("Should commit");

        let mut writer = handle.open_write().expect("Should open writer");
        writer.write_all(b"discarded").expect("Should write");
        drop(writer);

        let mut bytes = Vec::new();
        handle
            .open_read()
            .expect("Should open")
            .read_to_end(&mut bytes)
            .expect("Should read");
        assert_eq!(bytes, b"kept");
    }

    #[test]
    fn test_memory_handle_shares_buffer_across_clones() {
        let handle = MemoryHandle::new();
        let observer = handle.clone();

        let mut writer = handle.open_write().expect("Should open writer");
        writer.write_all(b"shared").expect("Should write");
        writer.commit().expect("Should commit");

        assert_eq!(observer.contents(), b"shared");
    }
}
