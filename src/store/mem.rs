//! In-memory key-value backend backed by DashMap.
//!
//! Used for memory-only sessions and as the storage fake in tests. Writes can
//! be made to fail on demand to exercise the engine's fire-and-forget
//! persistence path. All data is lost on process exit.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use dashmap::DashMap;

use crate::error::StoreError;
use crate::store::{KvStore, StoreResult};

/// Concurrent in-memory store using a sharded hashmap.
#[derive(Debug, Default)]
pub struct MemStore {
    data: DashMap<String, Vec<u8>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `put`/`remove` fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes since creation.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                message: "quota exceeded".into(),
            });
        }
        Ok(())
    }
}

impl KvStore for MemStore {
    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        self.check_writable()?;
        self.data.insert(key.to_string(), value.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.data.get(key).map(|v| v.value().clone()))
    }

    fn remove(&self, key: &str) -> StoreResult<bool> {
        self.check_writable()?;
        Ok(self.data.remove(key).is_some())
    }
}
