use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::depth::provider::ContentDigest;
use crate::foundation::error::{DrapeError, DrapeResult};
use crate::raster::buffer::GrayBuffer;

/// Content-addressed store for computed depth buffers.
///
/// The cache is a performance optimization, not a correctness mechanism:
/// concurrent misses on the same key may compute the depth twice, and
/// last-writer-wins on a colliding insert is fine because content-identical
/// inputs produce content-identical depth. Entries are immutable once written.
pub trait DepthCache: Send + Sync {
    /// Look up a previously stored depth buffer.
    fn lookup(&self, key: ContentDigest) -> DrapeResult<Option<GrayBuffer>>;

    /// Store a computed depth buffer under its content digest.
    fn store(&self, key: ContentDigest, depth: &GrayBuffer) -> DrapeResult<()>;
}

/// In-memory depth cache with an explicit retention knob.
///
/// The reference implementation grew without bound; here retention is
/// configuration: `max_entries` caps the cache and evicts the oldest entry
/// first. [`MemoryDepthCache::unbounded`] opts into unbounded growth
/// explicitly.
pub struct MemoryDepthCache {
    inner: Mutex<Inner>,
    max_entries: Option<usize>,
}

struct Inner {
    entries: HashMap<ContentDigest, GrayBuffer>,
    order: VecDeque<ContentDigest>,
}

impl MemoryDepthCache {
    /// Cache holding at most `max_entries` depth buffers, FIFO eviction.
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
            max_entries: Some(max_entries.max(1)),
        }
    }

    /// Cache with no eviction.
    pub fn unbounded() -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
            max_entries: None,
        }
    }

    /// Number of cached depth buffers.
    pub fn len(&self) -> usize {
        self.inner.lock().map(|g| g.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryDepthCache {
    fn default() -> Self {
        Self::with_max_entries(64)
    }
}

impl DepthCache for MemoryDepthCache {
    fn lookup(&self, key: ContentDigest) -> DrapeResult<Option<GrayBuffer>> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| DrapeError::cache("depth cache lock poisoned"))?;
        Ok(guard.entries.get(&key).cloned())
    }

    fn store(&self, key: ContentDigest, depth: &GrayBuffer) -> DrapeResult<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| DrapeError::cache("depth cache lock poisoned"))?;
        if guard.entries.insert(key, depth.clone()).is_none() {
            guard.order.push_back(key);
        }
        if let Some(max) = self.max_entries {
            while guard.entries.len() > max {
                match guard.order.pop_front() {
                    Some(oldest) => {
                        guard.entries.remove(&oldest);
                    }
                    None => break,
                }
            }
        }
        Ok(())
    }
}
