//! Shared registry of loaded font faces.
//!
//! Decoding a font file is expensive and faces are large, so every
//! [`FontResource`](crate::resource::FontResource) built from the same source
//! shares one face. Entries are reference counted by hand: each resource
//! acquires its face once and releases it on drop, and the entry (face and
//! backing bytes) goes away with the last release.
//!
//! The registry is an explicit value passed to each resource. Clones share
//! the same entries.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use parking_lot::{Mutex, MutexGuard};

use crate::backend::{RasterBackend, RasterFace};
use crate::data::DataSource;
use crate::error::FontError;

/// Shared handle to a cached face.
///
/// The face is not reentrant. Hold the guard from [`FaceHandle::lock`] for
/// the whole of any size-dependent operation.
#[derive(Clone)]
pub struct FaceHandle {
    source_id: Arc<str>,
    face: Arc<Mutex<Box<dyn RasterFace>>>,
}

impl FaceHandle {
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn lock(&self) -> MutexGuard<'_, Box<dyn RasterFace>> {
        self.face.lock()
    }

    fn same_face(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.face, &other.face)
    }
}

impl std::fmt::Debug for FaceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaceHandle")
            .field("source_id", &self.source_id)
            .finish_non_exhaustive()
    }
}

struct Entry {
    handle: FaceHandle,
    /// Bytes backing the face, kept for as long as the entry lives.
    _data: Arc<[u8]>,
    ref_count: usize,
}

/// Process-wide face registry keyed by source path.
#[derive(Clone, Default)]
pub struct FaceCache {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl FaceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached face for `source_id`, without touching its reference count.
    pub fn find(&self, source_id: &str) -> Option<FaceHandle> {
        self.entries.lock().get(source_id).map(|e| e.handle.clone())
    }

    /// Register a freshly loaded face with a reference count of 1.
    ///
    /// If another caller registered the same source in the meantime, that
    /// face is acquired instead and `face` is dropped.
    pub fn build(&self, face: Box<dyn RasterFace>, data: Arc<[u8]>, source_id: &str) -> FaceHandle {
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get_mut(source_id) {
            entry.ref_count += 1;
            return entry.handle.clone();
        }

        let handle = FaceHandle {
            source_id: Arc::from(source_id),
            face: Arc::new(Mutex::new(face)),
        };
        entries.insert(
            source_id.to_owned(),
            Entry {
                handle: handle.clone(),
                _data: data,
                ref_count: 1,
            },
        );
        handle
    }

    /// Add a reference to a cached face. Returns `false` if the handle's
    /// entry is gone.
    pub fn acquire(&self, handle: &FaceHandle) -> bool {
        let mut entries = self.entries.lock();
        match entries.get_mut(handle.source_id()) {
            Some(entry) if entry.handle.same_face(handle) => {
                entry.ref_count += 1;
                true
            }
            _ => false,
        }
    }

    /// Drop a reference. The last release frees the face and its bytes.
    pub fn release(&self, handle: &FaceHandle) {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.get_mut(handle.source_id()) else {
            return;
        };
        if !entry.handle.same_face(handle) {
            return;
        }
        entry.ref_count -= 1;
        if entry.ref_count == 0 {
            debug!("face cache: freeing '{}'", handle.source_id());
            entries.remove(handle.source_id());
        }
    }

    /// Acquire the face for `source_id`, loading it on first use.
    ///
    /// A source that cannot be read or decoded leaves no entry behind.
    pub fn load_or_acquire(
        &self,
        source_id: &str,
        data: &dyn DataSource,
        backend: &dyn RasterBackend,
    ) -> Result<FaceHandle, FontError> {
        if let Some(handle) = self.find(source_id) {
            if self.acquire(&handle) {
                return Ok(handle);
            }
        }

        let bytes: Arc<[u8]> = data
            .open(source_id)
            .map_err(|io| FontError::ResourceLoad {
                source_id: source_id.to_owned(),
                io,
            })?
            .into();
        let face = backend.load_face(Arc::clone(&bytes))?;
        debug!("face cache: loaded '{source_id}' ({} bytes)", bytes.len());
        Ok(self.build(face, bytes, source_id))
    }

    /// References held on `source_id`, if cached.
    pub fn ref_count(&self, source_id: &str) -> Option<usize> {
        self.entries.lock().get(source_id).map(|e| e.ref_count)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl std::fmt::Debug for FaceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.lock();
        let mut sources: Vec<&str> = entries.keys().map(String::as_str).collect();
        sources.sort_unstable();
        f.debug_struct("FaceCache").field("sources", &sources).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockBackend;
    use crate::data::MemorySource;

    fn source() -> MemorySource {
        let mut src = MemorySource::new();
        src.insert("a.ttf", vec![1u8; 8]);
        src.insert("b.ttf", vec![2u8; 8]);
        src.insert("empty.ttf", Vec::<u8>::new());
        src
    }

    #[test]
    fn same_source_is_loaded_once() {
        let cache = FaceCache::new();
        let backend = MockBackend::new();
        let data = source();

        let a1 = cache.load_or_acquire("a.ttf", &data, &backend).unwrap();
        let a2 = cache.load_or_acquire("a.ttf", &data, &backend).unwrap();
        assert_eq!(backend.loads(), 1);
        assert!(a1.same_face(&a2));
        assert_eq!(cache.ref_count("a.ttf"), Some(2));

        let _b = cache.load_or_acquire("b.ttf", &data, &backend).unwrap();
        assert_eq!(backend.loads(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn last_release_removes_entry() {
        let cache = FaceCache::new();
        let backend = MockBackend::new();
        let data = source();

        let a1 = cache.load_or_acquire("a.ttf", &data, &backend).unwrap();
        let a2 = cache.load_or_acquire("a.ttf", &data, &backend).unwrap();
        cache.release(&a1);
        assert_eq!(cache.ref_count("a.ttf"), Some(1));
        cache.release(&a2);
        assert!(cache.find("a.ttf").is_none());
        assert!(cache.is_empty());

        // Reloading after eviction decodes again.
        let _a3 = cache.load_or_acquire("a.ttf", &data, &backend).unwrap();
        assert_eq!(backend.loads(), 2);
    }

    #[test]
    fn missing_source_leaves_no_entry() {
        let cache = FaceCache::new();
        let err = cache
            .load_or_acquire("missing.ttf", &source(), &MockBackend::new())
            .unwrap_err();
        assert!(matches!(err, FontError::ResourceLoad { ref source_id, .. } if source_id == "missing.ttf"));
        assert!(cache.is_empty());
    }

    #[test]
    fn undecodable_source_leaves_no_entry() {
        let cache = FaceCache::new();
        let err = cache
            .load_or_acquire("empty.ttf", &source(), &MockBackend::new())
            .unwrap_err();
        assert!(matches!(err, FontError::BackendInit(_)));
        assert!(cache.is_empty());
    }

    #[test]
    fn stale_handle_is_ignored() {
        let cache = FaceCache::new();
        let backend = MockBackend::new();
        let data = source();

        let old = cache.load_or_acquire("a.ttf", &data, &backend).unwrap();
        cache.release(&old);
        let fresh = cache.load_or_acquire("a.ttf", &data, &backend).unwrap();

        assert!(!cache.acquire(&old));
        cache.release(&old);
        assert_eq!(cache.ref_count("a.ttf"), Some(1));
        cache.release(&fresh);
        assert!(cache.is_empty());
    }

    #[test]
    fn clones_share_entries() {
        let cache = FaceCache::new();
        let other = cache.clone();
        let h = cache
            .load_or_acquire("a.ttf", &source(), &MockBackend::new())
            .unwrap();
        assert_eq!(other.find("a.ttf").map(|f| f.source_id().to_owned()), Some("a.ttf".into()));
        other.release(&h);
        assert!(cache.is_empty());
        assert_eq!(format!("{cache:?}"), "FaceCache { sources: [] }");
    }
}
