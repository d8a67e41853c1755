/*
 *
 *  *
 *  *      Copyright (c) 2018-2025, SnackCloud All rights reserved.
 *  *
 *  *   Redistribution and use in source and binary forms, with or without
 *  *   modification, are permitted provided that the following conditions are met:
 *  *
 *  *   Redistributions of source code must retain the above copyright notice,
 *  *   this list of conditions and the following disclaimer.
 *  *   Redistributions in binary form must reproduce the above copyright
 *  *   notice, this list of conditions and the following disclaimer in the
 *  *   documentation and/or other materials provided with the distribution.
 *  *   Neither the name of the www.snackcloud.cn developer nor the names of its
 *  *   contributors may be used to endorse or promote products derived from
 *  *   this software without specific prior written permission.
 *  *   Author: SnackCloud
 *  *
 *
 */

//!
//! Low inter-reference recency set replacement for a single cache segment.
//!
//! Entries are LIR (hot, always resident) or HIR (cold). The recency stack `S` holds
//! every LIR entry plus recently seen HIR entries, resident or not; the queue `Q`
//! holds resident HIR entries in eviction order. A HIR entry referenced again while
//! it is still in `S` has a shorter reuse distance than the oldest LIR entry and is
//! promoted in its place.
//!
use std::collections::HashMap;
use std::hash::Hash;

use lru::LruCache;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Status {
    Lir,
    HirResident,
    HirNonResident,
}

#[derive(Debug)]
struct Entry<V> {
    status: Status,
    value: Option<V>,
}

#[derive(Debug)]
pub(crate) struct LirsSegment<K: Hash + Eq, V> {
    entries: HashMap<K, Entry<V>>,
    /// Recency stack `S`, most recent first.
    stack: LruCache<K, ()>,
    /// Resident HIR entries `Q`, next victim last.
    queue: LruCache<K, ()>,
    /// Non resident HIR entries still tracked in `S`, oldest last.
    non_resident: LruCache<K, ()>,
    lir_capacity: usize,
    hir_capacity: usize,
    lir_count: usize,
}

impl<K: Hash + Eq + Clone, V: Clone> LirsSegment<K, V> {
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut lir_capacity = (capacity as f64 * 0.95) as usize;
        if lir_capacity == capacity {
            lir_capacity -= 1;
        }
        Self {
            entries: HashMap::new(),
            stack: LruCache::unbounded(),
            queue: LruCache::unbounded(),
            non_resident: LruCache::unbounded(),
            lir_capacity,
            hir_capacity: capacity - lir_capacity,
            lir_count: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.lir_count + self.queue.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.lir_capacity + self.hir_capacity
    }

    pub(crate) fn get(&mut self, key: &K) -> Option<V> {
        let status = self.entries.get(key)?.status;
        match status {
            Status::HirNonResident => return None,
            Status::Lir => {
                let was_bottom = self.stack.peek_lru().map_or(false, |(bottom, _)| bottom == key);
                self.stack.promote(key);
                if was_bottom {
                    self.prune_stack();
                }
            }
            Status::HirResident => {
                if self.stack.contains(key) {
                    self.stack.promote(key);
                    self.queue.pop(key);
                    self.set_status(key, Status::Lir);
                    self.lir_count += 1;
                    self.balance_lir();
                } else {
                    self.stack.put(key.clone(), ());
                    self.queue.promote(key);
                }
            }
        }
        self.entries.get(key).and_then(|entry| entry.value.clone())
    }

    /// Insert `value` unless `key` is resident, in which case the resident value is
    /// returned and counts as an access.
    pub(crate) fn put_if_absent(&mut self, key: K, value: V) -> Option<V> {
        if let Some(existing) = self.get(&key) {
            return Some(existing);
        }

        if self.lir_count < self.lir_capacity && !self.entries.contains_key(&key) {
            self.stack.put(key.clone(), ());
            self.entries.insert(key, Entry { status: Status::Lir, value: Some(value) });
            self.lir_count += 1;
            return None;
        }

        if self.queue.len() >= self.hir_capacity {
            self.evict_hir();
        }

        // A non resident entry found in `S` was referenced again within the LIR window.
        let promote = self.stack.contains(&key);
        self.non_resident.pop(&key);
        self.stack.put(key.clone(), ());
        if promote {
            self.entries.insert(key.clone(), Entry { status: Status::Lir, value: Some(value) });
            self.lir_count += 1;
            self.balance_lir();
        } else {
            self.entries.insert(key.clone(), Entry { status: Status::HirResident, value: Some(value) });
            self.queue.put(key, ());
        }
        None
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.stack.clear();
        self.queue.clear();
        self.non_resident.clear();
        self.lir_count = 0;
    }

    fn set_status(&mut self, key: &K, status: Status) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.status = status;
        }
    }

    /// Evict the oldest resident HIR entry, keeping its history while it is in `S`.
    fn evict_hir(&mut self) {
        let Some((victim, _)) = self.queue.pop_lru() else {
            return;
        };
        if self.stack.contains(&victim) {
            if let Some(entry) = self.entries.get_mut(&victim) {
                entry.status = Status::HirNonResident;
                entry.value = None;
            }
            self.non_resident.put(victim, ());
            self.limit_non_resident();
        } else {
            self.entries.remove(&victim);
        }
    }

    /// Demote LIR entries from the bottom of `S` until the LIR set fits.
    fn balance_lir(&mut self) {
        while self.lir_count > self.lir_capacity {
            self.prune_stack();
            let Some((bottom, _)) = self.stack.pop_lru() else {
                break;
            };
            self.set_status(&bottom, Status::HirResident);
            self.queue.put(bottom, ());
            self.lir_count -= 1;
        }
        self.prune_stack();
    }

    /// Remove HIR entries from the bottom of `S` so that it ends with an LIR entry.
    fn prune_stack(&mut self) {
        while let Some((bottom, _)) = self.stack.peek_lru() {
            let status = self.entries.get(bottom).map(|entry| entry.status);
            if status == Some(Status::Lir) {
                break;
            }
            let Some((bottom, _)) = self.stack.pop_lru() else {
                break;
            };
            if status != Some(Status::HirResident) {
                self.non_resident.pop(&bottom);
                self.entries.remove(&bottom);
            }
        }
    }

    /// Non resident history is bounded by the segment capacity.
    fn limit_non_resident(&mut self) {
        let max = self.capacity();
        while self.non_resident.len() > max {
            let Some((oldest, _)) = self.non_resident.pop_lru() else {
                break;
            };
            self.stack.pop(&oldest);
            self.entries.remove(&oldest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_split() {
        let segment: LirsSegment<u32, u32> = LirsSegment::new(100);
        assert_eq!(segment.lir_capacity, 95);
        assert_eq!(segment.hir_capacity, 5);
        let tiny: LirsSegment<u32, u32> = LirsSegment::new(1);
        assert_eq!(tiny.lir_capacity + tiny.hir_capacity, 1);
    }

    #[test]
    fn test_bounded() {
        let mut segment = LirsSegment::new(10);
        for i in 0..1_000u32 {
            assert_eq!(segment.put_if_absent(i, i * 2), None);
            assert!(segment.len() <= 10);
            if i % 3 == 0 {
                segment.get(&(i / 2));
            }
        }
        assert_eq!(segment.len(), 10);
        assert!(segment.non_resident.len() <= segment.capacity());
    }

    #[test]
    fn test_put_if_absent_keeps_resident_value() {
        let mut segment = LirsSegment::new(4);
        assert_eq!(segment.put_if_absent("a", 1), None);
        assert_eq!(segment.put_if_absent("a", 2), Some(1));
        assert_eq!(segment.get(&"a"), Some(1));
    }

    #[test]
    fn test_hot_entries_survive_scan() {
        let mut segment = LirsSegment::new(20);
        for i in 0..19u32 {
            segment.put_if_absent(i, i);
        }
        for round in 0..5u32 {
            for i in 0..19u32 {
                assert_eq!(segment.get(&i), Some(i));
            }
            for i in 0..50u32 {
                segment.put_if_absent(1_000 + round * 50 + i, i);
            }
        }
        for i in 0..19u32 {
            assert_eq!(segment.get(&i), Some(i));
        }
    }
}
