//! Mutation concurrency guard
//!
//! Serializes recomputation steps that target the same ancestor id. Without
//! it, two leaf mutations under one parent can both read children, then both
//! write, and the first write's contribution is lost. Chains over disjoint
//! ancestor ids share nothing and proceed in parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

/// Prune the registry once it grows past this many entries
const PRUNE_THRESHOLD: usize = 1024;

/// Per-ancestor-id exclusive section registry.
///
/// The outer std Mutex protects only the map lookup and is never held across
/// an await; the per-id tokio Mutex is held for the duration of one
/// read-compute-write recomputation step.
pub struct AncestorGuard {
    locks: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl AncestorGuard {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Acquire the exclusive section for one ancestor id.
    ///
    /// The returned guard must be held across the whole read-compute-write
    /// sequence for that ancestor and dropped before moving to the next
    /// level up.
    pub async fn acquire(&self, id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.locks.lock().expect("ancestor guard poisoned");

            if map.len() > PRUNE_THRESHOLD {
                // Entries nobody holds can be dropped; a fresh mutex is
                // equivalent to an uncontended old one
                map.retain(|_, lock| Arc::strong_count(lock) > 1);
            }

            map.entry(id)
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };

        lock.lock_owned().await
    }
}

impl Default for AncestorGuard {
    fn default() -> Self {
        Self::new()
    }
}
