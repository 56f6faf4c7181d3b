//! Resource tracking pool.
//!
//! Every GPU-backed resource registers itself here at construction and
//! deregisters on drop, so shutdown can verify (and force) bulk release and
//! context-loss recovery can enumerate what must be rebuilt. The pool is an
//! explicit object owned by whoever creates the device - not a process-wide
//! singleton - and holds tracking entries only, never the resources
//! themselves.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

/// Kind tag for a tracked resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    VertexBuffer,
    IndexBuffer,
    Renderable,
    Texture,
    Program,
}

#[derive(Debug, Clone, Copy)]
struct PoolEntry {
    kind: ResourceKind,
    id: u64,
}

/// Registry of live GPU-backed resources.
pub struct ResourcePool {
    entries: Mutex<Vec<PoolEntry>>,
    next_id: Mutex<u64>,
}

impl ResourcePool {
    /// Create an empty pool.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            entries: Mutex::new(Vec::new()),
            next_id: Mutex::new(0),
        })
    }

    /// Register a new resource of `kind`.
    ///
    /// The returned token deregisters the resource when dropped, so
    /// registration is scoped to the resource's lifetime.
    pub fn register(self: &Arc<Self>, kind: ResourceKind) -> PoolToken {
        let mut next = self.next_id.lock();
        let id = *next;
        *next += 1;

        self.entries.lock().push(PoolEntry { kind, id });
        tracing::trace!("Registered {:?} #{}", kind, id);

        PoolToken {
            pool: Arc::downgrade(self),
            kind,
            id,
        }
    }

    fn remove(&self, id: u64) {
        self.entries.lock().retain(|entry| entry.id != id);
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the pool tracks no resources.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Number of live entries of `kind`.
    pub fn count(&self, kind: ResourceKind) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|entry| entry.kind == kind)
            .count()
    }

    /// Release all tracked entries.
    ///
    /// Called at device shutdown. Entries whose owners are still alive will
    /// not be re-added; their tokens become inert.
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        if !entries.is_empty() {
            tracing::debug!("Releasing {} tracked resources", entries.len());
        }
        entries.clear();
    }

    /// Enumerate live entries for context-loss recovery.
    ///
    /// The callback receives every `(kind, id)` still tracked; rebuilding the
    /// underlying device objects is up to the caller.
    pub fn refresh(&self, mut callback: impl FnMut(ResourceKind, u64)) {
        for entry in self.entries.lock().iter() {
            callback(entry.kind, entry.id);
        }
    }
}

/// RAII registration token held by a tracked resource.
///
/// Holds only a weak reference to the pool, so pool and resources can be
/// dropped in either order.
#[derive(Debug)]
pub struct PoolToken {
    pool: Weak<ResourcePool>,
    kind: ResourceKind,
    id: u64,
}

impl PoolToken {
    /// The tracked resource's kind.
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// The tracked resource's pool id.
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for PoolToken {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.upgrade() {
            pool.remove(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_drop() {
        let pool = ResourcePool::new();
        let token = pool.register(ResourceKind::VertexBuffer);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.count(ResourceKind::VertexBuffer), 1);
        assert_eq!(pool.count(ResourceKind::Texture), 0);

        drop(token);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_clear_releases_everything() {
        let pool = ResourcePool::new();
        let _a = pool.register(ResourceKind::VertexBuffer);
        let _b = pool.register(ResourceKind::IndexBuffer);
        let _c = pool.register(ResourceKind::Texture);
        assert_eq!(pool.len(), 3);

        pool.clear();
        assert!(pool.is_empty());

        // Tokens from before the clear stay inert.
        drop(_a);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_refresh_enumerates_entries() {
        let pool = ResourcePool::new();
        let _a = pool.register(ResourceKind::Renderable);
        let _b = pool.register(ResourceKind::Program);

        let mut seen = Vec::new();
        pool.refresh(|kind, id| seen.push((kind, id)));
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, ResourceKind::Renderable);
        assert_eq!(seen[1].0, ResourceKind::Program);
    }

    #[test]
    fn test_token_outliving_pool() {
        let pool = ResourcePool::new();
        let token = pool.register(ResourceKind::Texture);
        drop(pool);
        // Dropping the token after the pool must not panic.
        drop(token);
    }
}
