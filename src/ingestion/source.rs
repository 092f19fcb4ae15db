//! Byte sources and sinks addressed by name.
//!
//! Loaders depend only on [`Storage`]: "open a byte source" and "create a byte sink".
//!
//! - [`FsStorage`]: files under a base directory.
//! - [`MemoryStorage`]: a thread-safe in-memory map, handy for tests and staging.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::FrameResult;

/// Storage backend supplying readable sources and writable sinks.
pub trait Storage: Send + Sync {
    /// Open the named source for reading.
    fn open(&self, name: &str) -> FrameResult<Box<dyn Read + Send>>;

    /// Create (or truncate) the named sink.
    fn create(&self, name: &str) -> FrameResult<Box<dyn Write + Send>>;
}

/// Local filesystem storage rooted at a base directory.
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of a source name.
    pub fn resolve(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl Storage for FsStorage {
    fn open(&self, name: &str) -> FrameResult<Box<dyn Read + Send>> {
        let f = File::open(self.resolve(name))?;
        Ok(Box::new(f))
    }

    fn create(&self, name: &str) -> FrameResult<Box<dyn Write + Send>> {
        let p = self.resolve(name);
        if let Some(parent) = p.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Box::new(File::create(p)?))
    }
}

/// Thread-safe in-memory storage using a HashMap.
///
/// Sinks buffer their bytes and publish them on `flush`; a sink dropped without a flush leaves
/// storage untouched.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    data: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate an object.
    pub fn insert(&self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.lock().insert(name.into(), bytes.into());
    }

    /// Current bytes of an object, if present.
    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.lock().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Storage for MemoryStorage {
    fn open(&self, name: &str) -> FrameResult<Box<dyn Read + Send>> {
        let bytes = self.get(name).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("object not found: {name}"))
        })?;
        Ok(Box::new(Cursor::new(bytes)))
    }

    fn create(&self, name: &str) -> FrameResult<Box<dyn Write + Send>> {
        Ok(Box::new(MemorySink {
            name: name.to_owned(),
            buf: Vec::new(),
            data: Arc::clone(&self.data),
        }))
    }
}

struct MemorySink {
    name: String,
    buf: Vec<u8>,
    data: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemorySink {
    fn publish(&self) -> io::Result<()> {
        let mut data = self
            .data
            .lock()
            .map_err(|_| io::Error::other("memory storage mutex poisoned"))?;
        data.insert(self.name.clone(), self.buf.clone());
        Ok(())
    }
}

impl Write for MemorySink {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.publish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_round_trips_bytes() {
        let storage = MemoryStorage::new();
        {
            let mut sink = storage.create("a.csv").unwrap();
            sink.write_all(b"x,y\n1,2\n").unwrap();
            sink.flush().unwrap();
        }
        let mut out = String::new();
        storage
            .open("a.csv")
            .unwrap()
            .read_to_string(&mut out)
            .unwrap();
        assert_eq!(out, "x,y\n1,2\n");
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn unflushed_memory_sink_publishes_nothing() {
        let storage = MemoryStorage::new();
        {
            let mut sink = storage.create("partial.csv").unwrap();
            sink.write_all(b"x,y\n1,").unwrap();
        }
        assert!(!storage.contains("partial.csv"));
        assert!(storage.open("partial.csv").is_err());
    }

    #[test]
    fn memory_storage_missing_object_is_not_found_io_error() {
        let storage = MemoryStorage::new();
        match storage.open("nope.csv") {
            Err(crate::FrameError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected an error"),
        }
    }

    #[test]
    fn fs_storage_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(dir.path());
        {
            let mut sink = storage.create("nested/out.csv").unwrap();
            sink.write_all(b"a\n1\n").unwrap();
        }
        assert!(storage.resolve("nested/out.csv").is_file());
        let mut out = String::new();
        storage
            .open("nested/out.csv")
            .unwrap()
            .read_to_string(&mut out)
            .unwrap();
        assert_eq!(out, "a\n1\n");
    }
}
