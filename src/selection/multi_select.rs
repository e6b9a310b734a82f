//! Ordered multi-select over arbitrary keys (e.g. source article ids)

use std::collections::HashSet;
use std::hash::Hash;

#[derive(Debug, Clone)]
pub struct MultiSelect<K> {
    order: Vec<K>,
    members: HashSet<K>,
}

impl<K> Default for MultiSelect<K> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            members: HashSet::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> MultiSelect<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the key is selected afterwards
    pub fn toggle(&mut self, key: K) -> bool {
        if self.members.contains(&key) {
            self.deselect(&key);
            false
        } else {
            self.select(key);
            true
        }
    }

    pub fn select(&mut self, key: K) {
        if self.members.insert(key.clone()) {
            self.order.push(key);
        }
    }

    pub fn deselect(&mut self, key: &K) {
        if self.members.remove(key) {
            self.order.retain(|k| k != key);
        }
    }

    /// Add every key, keeping existing picks in place
    pub fn select_all<I: IntoIterator<Item = K>>(&mut self, keys: I) {
        for key in keys {
            self.select(key);
        }
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }

    pub fn is_selected(&self, key: &K) -> bool {
        self.members.contains(key)
    }

    /// Whether every key in `universe` is selected. False for an empty universe.
    pub fn is_all_selected<'a, I>(&self, universe: I) -> bool
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        let mut any = false;
        for key in universe {
            if !self.members.contains(key) {
                return false;
            }
            any = true;
        }
        any
    }

    /// Selected keys in the order they were picked
    pub fn selected(&self) -> &[K] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
