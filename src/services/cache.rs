// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Keyed in-memory caches for catalogs, boundaries and indicators.

use dashmap::DashMap;
use std::collections::VecDeque;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

/// Cache interface the services memoize through.
pub trait KeyedCache<K, V>: Send + Sync {
    fn get(&self, key: &K) -> Option<V>;
    fn insert(&self, key: K, value: V);
    fn invalidate(&self, key: &K);
    fn clear(&self);
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shared handle to any cache implementation.
pub type SharedCache<K, V> = Arc<dyn KeyedCache<K, V>>;

/// Bounded cache that evicts the oldest inserted key once full.
pub struct MemoryCache<K, V> {
    entries: DashMap<K, V>,
    /// Insertion order, oldest first. Guards all structural changes.
    order: Mutex<VecDeque<K>>,
    capacity: usize,
}

impl<K, V> MemoryCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    /// Convenience constructor returning a [`SharedCache`].
    pub fn shared(capacity: usize) -> SharedCache<K, V> {
        Arc::new(Self::new(capacity))
    }
}

impl<K, V> KeyedCache<K, V> for MemoryCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, key: &K) -> Option<V> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    fn insert(&self, key: K, value: V) {
        let mut order = self.order.lock().unwrap_or_else(|e| e.into_inner());
        if self.entries.insert(key.clone(), value).is_none() {
            order.push_back(key);
        }
        while self.entries.len() > self.capacity {
            match order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    fn invalidate(&self, key: &K) {
        let mut order = self.order.lock().unwrap_or_else(|e| e.into_inner());
        if self.entries.remove(key).is_some() {
            order.retain(|k| k != key);
        }
    }

    fn clear(&self) {
        let mut order = self.order.lock().unwrap_or_else(|e| e.into_inner());
        self.entries.clear();
        order.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
