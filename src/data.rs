//! Byte sources for font files.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Resolves a resource path to its raw bytes.
pub trait DataSource {
    fn open(&self, path: &str) -> io::Result<Vec<u8>>;
}

/// Reads files relative to a root directory.
#[derive(Debug, Clone)]
pub struct FileSystemSource {
    root: PathBuf,
}

impl FileSystemSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DataSource for FileSystemSource {
    fn open(&self, path: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.root.join(path))
    }
}

/// Named in-memory blobs. Useful for embedded fonts.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    blobs: HashMap<String, Arc<[u8]>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) {
        self.blobs.insert(name.into(), bytes.into());
    }
}

impl DataSource for MemorySource {
    fn open(&self, path: &str) -> io::Result<Vec<u8>> {
        self.blobs.get(path).map(|b| b.to_vec()).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no blob named '{path}'"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_returns_copy() {
        let mut src = MemorySource::new();
        src.insert("a.ttf", vec![1u8, 2, 3]);
        assert_eq!(src.open("a.ttf").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn memory_source_missing_is_not_found() {
        let src = MemorySource::new();
        let err = src.open("missing.ttf").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn file_system_source_joins_root() {
        let dir = std::env::temp_dir().join(format!("ttatlas_data_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("font.bin"), b"abc").unwrap();

        let src = FileSystemSource::new(&dir);
        assert_eq!(src.root(), dir.as_path());
        assert_eq!(src.open("font.bin").unwrap(), b"abc");
        assert_eq!(
            src.open("nope.bin").unwrap_err().kind(),
            io::ErrorKind::NotFound
        );

        let _ = std::fs::remove_dir_all(&dir);
    }
}
