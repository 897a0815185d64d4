//! A fixed-capacity least-recently-used cache.
//!
//! Entries live in a [`SlotMap`] arena and are threaded into a doubly linked
//! recency list through arena keys, so promotion and eviction are a handful
//! of index updates. A [`HashMap`] maps cache keys to arena keys.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use slotmap::SlotMap;

slotmap::new_key_type! {
    struct EntryKey;
}

struct Entry<K, V> {
    key: K,
    value: V,
    newer: Option<EntryKey>,
    older: Option<EntryKey>,
}

/// A cache holding at most `capacity` entries, evicting the least recently
/// used one when a new key doesn't fit.
///
/// Both [`get`](LruCache::get) and [`store`](LruCache::store) are `O(1)`.
pub struct LruCache<K, V> {
    entries: SlotMap<EntryKey, Entry<K, V>>,
    index: HashMap<K, EntryKey>,
    oldest: Option<EntryKey>,
    newest: Option<EntryKey>,
    capacity: usize,
}

impl<K: Clone + Eq + Hash, V> LruCache<K, V> {
    pub fn new(capacity: usize) -> LruCache<K, V> {
        LruCache {
            entries: SlotMap::with_capacity_and_key(capacity),
            index: HashMap::with_capacity(capacity),
            oldest: None,
            newest: None,
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the value for `key` without touching its recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let &entry = self.index.get(key)?;
        Some(&self.entries[entry].value)
    }

    /// Returns the value for `key` and marks it as the most recently used
    /// entry. `None` is a plain miss.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        self.get_mut(key).map(|value| &*value)
    }

    /// Like [`get`](LruCache::get), but the value can be updated in place.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let &entry = self.index.get(key)?;

        if self.newest != Some(entry) {
            self.unlink(entry);
            self.push_newest(entry);
        }

        Some(&mut self.entries[entry].value)
    }

    /// Inserts or replaces the value for `key` and marks it as the most
    /// recently used entry.
    ///
    /// Returns the entry that had to go to respect the capacity: the evicted
    /// least recently used entry, or, for a zero-capacity cache, the rejected
    /// entry itself.
    pub fn store(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&entry) = self.index.get(&key) {
            self.entries[entry].value = value;

            if self.newest != Some(entry) {
                self.unlink(entry);
                self.push_newest(entry);
            }

            return None;
        }

        if self.capacity == 0 {
            return Some((key, value));
        }

        let evicted = if self.is_full() {
            self.pop_oldest()
        } else {
            None
        };

        let entry = self.entries.insert(Entry {
            key: key.clone(),
            value,
            newer: None,
            older: None,
        });

        self.push_newest(entry);
        self.index.insert(key, entry);

        evicted
    }

    /// Returns the entry that the next eviction would remove.
    pub fn peek_oldest(&self) -> Option<(&K, &V)> {
        let entry = &self.entries[self.oldest?];
        Some((&entry.key, &entry.value))
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_oldest(&mut self) -> Option<(K, V)> {
        let entry = self.oldest?;
        self.unlink(entry);

        let Entry { key, value, .. } = self.entries.remove(entry)?;
        self.index.remove(&key);

        Some((key, value))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.oldest = None;
        self.newest = None;
    }

    /// Iterates over the entries from the most to the least recently used.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            entries: &self.entries,
            next: self.newest,
        }
    }

    /// Splices `entry` out of the recency list, reconnecting its neighbours.
    fn unlink(&mut self, entry: EntryKey) {
        let (older, newer) = {
            let e = &self.entries[entry];
            (e.older, e.newer)
        };

        match older {
            Some(older_key) => self.entries[older_key].newer = newer,
            None => self.oldest = newer,
        }

        match newer {
            Some(newer_key) => self.entries[newer_key].older = older,
            None => self.newest = older,
        }

        let e = &mut self.entries[entry];
        e.older = None;
        e.newer = None;
    }

    /// Links a detached `entry` in as the newest one.
    fn push_newest(&mut self, entry: EntryKey) {
        let prev = self.newest;

        {
            let e = &mut self.entries[entry];
            e.older = prev;
            e.newer = None;
        }

        match prev {
            Some(prev_key) => self.entries[prev_key].newer = Some(entry),
            None => self.oldest = Some(entry),
        }

        self.newest = Some(entry);
    }
}

impl<K: fmt::Debug + Clone + Eq + Hash, V: fmt::Debug> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator returned by [`LruCache::iter`].
pub struct Iter<'a, K, V> {
    entries: &'a SlotMap<EntryKey, Entry<K, V>>,
    next: Option<EntryKey>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.get(self.next?)?;
        self.next = entry.older;
        Some((&entry.key, &entry.value))
    }
}
