//! Reader/writer-guarded dictionary shared across build workers and readers.
//!
//! [`SharedDict`] wraps a [`ValueDict`] in a `parking_lot::RwLock`. The hot
//! path during ingestion is the read-locked probe ([`SharedDict::lookup`]);
//! workers that accumulate novel values flush them in batches under a single
//! write guard, re-probing each entry before insert because a peer may have
//! inserted it since the read probe.
//!
//! Query code holds the read guard for the duration of a scan so the
//! dictionary cannot change structurally underneath an in-flight search.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::dict::ValueDict;

/// Thread-safe wrapper around [`ValueDict`].
///
/// Multiple readers may hold the lock simultaneously; writers are
/// exclusive. The forward/reverse consistency invariant of the inner
/// dictionary holds on every release of the write guard.
pub struct SharedDict {
    inner: RwLock<ValueDict>,
}

impl SharedDict {
    /// Wrap a dictionary for shared access.
    pub fn new(dict: ValueDict) -> Self {
        Self {
            inner: RwLock::new(dict),
        }
    }

    /// Read-locked probe: find the id bound to `value`, if any.
    ///
    /// Hot path for repeated values — a brief shared hold and one hash
    /// lookup.
    pub fn lookup(&self, value: &str) -> Option<u32> {
        self.inner.read().find(value)
    }

    /// Acquire the shared read guard.
    ///
    /// Scans that observe the forward sequence by id hold this guard for
    /// their full duration.
    pub fn read(&self) -> RwLockReadGuard<'_, ValueDict> {
        self.inner.read()
    }

    /// Acquire the exclusive write guard.
    ///
    /// Build workers take this once per pending batch and re-probe each
    /// entry before inserting.
    pub fn write(&self) -> RwLockWriteGuard<'_, ValueDict> {
        self.inner.write()
    }

    /// Number of distinct entries.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// True if empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Consume the wrapper and return the inner dictionary.
    pub fn into_inner(self) -> ValueDict {
        self.inner.into_inner()
    }
}

impl From<ValueDict> for SharedDict {
    fn from(dict: ValueDict) -> Self {
        Self::new(dict)
    }
}

impl std::fmt::Debug for SharedDict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedDict")
            .field("len", &self.len())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_lookup_fast_path() {
        let shared = SharedDict::new(ValueDict::new());
        assert_eq!(shared.lookup("a"), None);
        shared.write().assign_or_lookup("a").unwrap();
        assert_eq!(shared.lookup("a"), Some(0));
    }

    #[test]
    fn test_concurrent_assign_unique_ids() {
        let shared = Arc::new(SharedDict::new(ValueDict::new()));

        let handles: Vec<_> = (0..4)
            .map(|thread_id: u32| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || {
                    let mut ids = Vec::new();
                    for i in 0..50 {
                        let value = format!("t{thread_id}_v{i}");
                        // Mirror the worker discipline: read probe, then
                        // write with re-probe.
                        let id = match shared.lookup(&value) {
                            Some(id) => id,
                            None => shared.write().assign_or_lookup(&value).unwrap(),
                        };
                        ids.push(id);
                    }
                    ids
                })
            })
            .collect();

        let all_ids: Vec<u32> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();

        // 200 distinct values -> 200 distinct dense ids.
        let unique: std::collections::HashSet<u32> = all_ids.iter().copied().collect();
        assert_eq!(unique.len(), 200);
        assert_eq!(shared.len(), 200);
        assert_eq!(*unique.iter().max().unwrap(), 199);
    }

    #[test]
    fn test_concurrent_same_value_single_id() {
        let shared = Arc::new(SharedDict::new(ValueDict::new()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || match shared.lookup("contended") {
                    Some(id) => id,
                    None => shared.write().assign_or_lookup("contended").unwrap(),
                })
            })
            .collect();

        let ids: Vec<u32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(ids.iter().all(|&id| id == ids[0]));
        assert_eq!(shared.len(), 1);
    }
}
