// ── Keyed reactive collection ──
//
// Concurrent storage with O(1) lookups and push-based change
// notification via `watch` channels. Unlike a map, it remembers the order
// the backend returned rows in, and the snapshot follows that order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;
use tokio::sync::watch;

/// Ordered, keyed collection for one entity type.
///
/// Every mutation rebuilds the snapshot that subscribers receive. Writers
/// serialize on the `order` lock so a full replace and a single-entity
/// update never interleave.
pub(crate) struct KeyedCollection<T: Clone + Send + Sync + 'static> {
    by_key: DashMap<String, Arc<T>>,

    /// Keys in backend order. Also the writer lock.
    order: Mutex<Vec<String>>,

    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Clone + Send + Sync + 'static> KeyedCollection<T> {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            by_key: DashMap::new(),
            order: Mutex::new(Vec::new()),
            snapshot,
        }
    }

    /// Replace the whole contents. Duplicate keys keep the last row at the
    /// position of the first.
    pub(crate) fn replace_all(&self, rows: Vec<(String, T)>) {
        self.replace_all_merged(rows, |_, _| {});
    }

    /// Replace the whole contents, letting `merge(old, new)` carry state
    /// over from an entity that was already present under the same key.
    pub(crate) fn replace_all_merged(&self, rows: Vec<(String, T)>, merge: impl Fn(&T, &mut T)) {
        let mut order = self.order.lock().unwrap_or_else(PoisonError::into_inner);
        let previous: HashMap<String, Arc<T>> = self
            .by_key
            .iter()
            .map(|r| (r.key().clone(), Arc::clone(r.value())))
            .collect();
        self.by_key.clear();
        order.clear();
        for (key, mut value) in rows {
            if let Some(old) = previous.get(&key) {
                merge(old, &mut value);
            }
            if self.by_key.insert(key.clone(), Arc::new(value)).is_none() {
                order.push(key);
            }
        }
        self.publish(&order);
    }

    /// Mutate one entity in place. Returns `None` when the key is absent.
    pub(crate) fn update<R>(&self, key: &str, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let order = self.order.lock().unwrap_or_else(PoisonError::into_inner);
        let result = {
            let mut entry = self.by_key.get_mut(key)?;
            let mut value = T::clone(entry.value());
            let result = f(&mut value);
            *entry.value_mut() = Arc::new(value);
            result
        };
        self.publish(&order);
        Some(result)
    }

    pub(crate) fn get(&self, key: &str) -> Option<Arc<T>> {
        self.by_key.get(key).map(|r| Arc::clone(r.value()))
    }

    /// Current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.len()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn publish(&self, order: &[String]) {
        let values: Vec<Arc<T>> = order.iter().filter_map(|k| self.get(k)).collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rows(items: &[(&str, i32)]) -> Vec<(String, i32)> {
        items.iter().map(|(k, v)| ((*k).to_owned(), *v)).collect()
    }

    #[test]
    fn replace_keeps_backend_order() {
        let col = KeyedCollection::new();
        col.replace_all(rows(&[("b", 2), ("a", 1), ("c", 3)]));
        let snap: Vec<i32> = col.snapshot().iter().map(|v| **v).collect();
        assert_eq!(snap, vec![2, 1, 3]);
        assert_eq!(col.len(), 3);
    }

    #[test]
    fn replace_drops_missing_rows() {
        let col = KeyedCollection::new();
        let mut rx = col.subscribe();
        col.replace_all(rows(&[("a", 1), ("b", 2)]));
        rx.mark_unchanged();
        col.replace_all(rows(&[("b", 5)]));
        assert!(col.get("a").is_none());
        assert_eq!(*col.get("b").unwrap(), 5);
        assert!(rx.has_changed().unwrap());
        assert_eq!(col.len(), 1);
    }

    #[test]
    fn update_mutates_and_publishes() {
        let col = KeyedCollection::new();
        let mut rx = col.subscribe();
        col.replace_all(rows(&[("a", 1)]));
        rx.mark_unchanged();
        let out = col.update("a", |v| {
            *v += 10;
            *v
        });
        assert_eq!(out, Some(11));
        assert!(rx.has_changed().unwrap());
        assert_eq!(*col.snapshot()[0], 11);
        assert_eq!(col.update("zz", |v| *v), None);
    }
}
