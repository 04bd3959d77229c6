use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, PoisonError};

use super::Handle;

/// Append-only resource table. Handles index into it for the lifetime of the table.
pub struct AssetCache<T> {
    items: Vec<T>,
}

impl<T> AssetCache<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn insert(&mut self, item: T) -> Handle<T> {
        let index = self.items.len() as u32;
        self.items.push(item);
        Handle::new(index)
    }

    /// Returns None if the handle was issued by a different table.
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.items.get(handle.index())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Default for AssetCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Value-keyed cache whose entries are produced once and never evicted.
///
/// Lookup and insertion happen under one lock, so a producer runs at most once per
/// distinct key even when the cache is shared.
pub struct GeometryCache<K, V> {
    entries: Mutex<HashMap<K, V>>,
}

impl<K, V> GeometryCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the entry for `key`, running `produce` to create it on a miss.
    pub fn get_or_insert_with<F>(&self, key: K, produce: F) -> V
    where
        F: FnOnce(&K) -> V,
    {
        // Entries are immutable once inserted, so a poisoned map is still consistent.
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = entries.get(&key) {
            return existing.clone();
        }
        let value = produce(&key);
        entries.insert(key, value.clone());
        value
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> Default for GeometryCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn get_invalid_handle_returns_none() {
        let cache: AssetCache<u32> = AssetCache::new();
        assert!(cache.get(Handle::new(999)).is_none());
    }

    #[test]
    fn get_valid_handle_returns_some() {
        let mut cache = AssetCache::new();
        let handle = cache.insert(42u32);
        assert_eq!(cache.get(handle), Some(&42));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn producer_runs_once_per_key() {
        let cache: GeometryCache<&str, u32> = GeometryCache::new();
        let calls = Cell::new(0);
        let produce = |_: &&str| {
            calls.set(calls.get() + 1);
            calls.get()
        };

        assert_eq!(cache.get_or_insert_with("a", produce), 1);
        assert_eq!(cache.get_or_insert_with("a", produce), 1);
        assert_eq!(cache.get_or_insert_with("b", produce), 2);
        assert_eq!(calls.get(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn existing_entry_is_never_replaced() {
        let cache: GeometryCache<u8, &str> = GeometryCache::new();
        cache.get_or_insert_with(1, |_| "first");
        let again = cache.get_or_insert_with(1, |_| "second");
        assert_eq!(again, "first");
        assert_eq!(cache.get(&1), Some("first"));
    }

    #[test]
    fn shared_across_threads_produces_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let cache: Arc<GeometryCache<u8, usize>> = Arc::new(GeometryCache::new());
        let produced = Arc::new(AtomicUsize::new(0));

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let produced = Arc::clone(&produced);
                std::thread::spawn(move || {
                    cache.get_or_insert_with(7, |_| produced.fetch_add(1, Ordering::SeqCst))
                })
            })
            .collect();

        for worker in workers {
            assert_eq!(worker.join().unwrap(), 0);
        }
        assert_eq!(produced.load(Ordering::SeqCst), 1);
    }
}
