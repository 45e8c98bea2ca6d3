//! Bounded cache
//!
//! In-memory identifier → blob map capped by total value bytes, evicting the
//! least recently used entry first.

use std::collections::{BTreeMap, HashMap};

use bytes::Bytes;

/// A cached blob plus its position in the recency order
struct Slot {
    value: Bytes,
    tick: u64,
}

/// Byte-budgeted LRU cache
///
/// ## Recency Tracking
/// Every access stamps the entry with a monotonically increasing tick.
/// `order` maps tick → identifier, so its first key is always the LRU entry.
///
/// Not internally synchronized; `RecordStore` wraps it in a mutex.
pub struct BoundedCache {
    entries: HashMap<String, Slot>,
    order: BTreeMap<u64, String>,
    size: usize,
    max_size: usize,
    next_tick: u64,
}

impl BoundedCache {
    /// Create an empty cache holding at most `max_size` value bytes
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: BTreeMap::new(),
            size: 0,
            max_size,
            next_tick: 0,
        }
    }

    /// Look up a blob, promoting it to most recently used
    pub fn get(&mut self, id: &str) -> Option<Bytes> {
        let tick = self.bump();
        let slot = self.entries.get_mut(id)?;
        self.order.remove(&slot.tick);
        slot.tick = tick;
        self.order.insert(tick, id.to_string());
        Some(slot.value.clone())
    }

    /// Insert or replace a blob
    ///
    /// Returns `false` when the blob alone exceeds the budget. It is not
    /// cached then, and any older copy under `id` is dropped so the cache
    /// never serves stale bytes.
    pub fn insert(&mut self, id: String, value: Bytes) -> bool {
        self.remove(&id);

        if value.len() > self.max_size {
            tracing::debug!(id = %id, len = value.len(), "blob exceeds cache budget, bypassing");
            return false;
        }

        while self.size + value.len() > self.max_size {
            if !self.evict_lru() {
                break;
            }
        }

        let tick = self.bump();
        self.size += value.len();
        self.order.insert(tick, id.clone());
        self.entries.insert(id, Slot { value, tick });
        true
    }

    /// Drop a blob, returning it if it was cached
    pub fn remove(&mut self, id: &str) -> Option<Bytes> {
        let slot = self.entries.remove(id)?;
        self.order.remove(&slot.tick);
        self.size -= slot.value.len();
        Some(slot.value)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of cached blobs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total cached value bytes
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    fn evict_lru(&mut self) -> bool {
        let Some((_, id)) = self.order.pop_first() else {
            return false;
        };
        if let Some(slot) = self.entries.remove(&id) {
            self.size -= slot.value.len();
            tracing::debug!(id = %id, len = slot.value.len(), "evicted from cache");
        }
        true
    }

    fn bump(&mut self) -> u64 {
        let tick = self.next_tick;
        self.next_tick += 1;
        tick
    }
}
