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
//! Bounded map split into independently locked segments.
//!
mod lirs;

use std::hash::{BuildHasher, BuildHasherDefault, Hash};
use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;
use twox_hash::XxHash64;

use crate::config::EvictionPolicy;
use lirs::LirsSegment;

pub type XxBuildHasher = BuildHasherDefault<XxHash64>;

enum Segment<K: Hash + Eq, V> {
    Lru(LruCache<K, V>),
    Lirs(LirsSegment<K, V>),
}

impl<K: Hash + Eq + Clone, V: Clone> Segment<K, V> {
    fn new(capacity: usize, policy: EvictionPolicy) -> Self {
        match policy {
            EvictionPolicy::Lru => {
                let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
                Segment::Lru(LruCache::new(capacity))
            }
            EvictionPolicy::Lirs => Segment::Lirs(LirsSegment::new(capacity)),
        }
    }

    fn get(&mut self, key: &K) -> Option<V> {
        match self {
            Segment::Lru(cache) => cache.get(key).cloned(),
            Segment::Lirs(cache) => cache.get(key),
        }
    }

    fn put_if_absent(&mut self, key: K, value: V) -> Option<V> {
        match self {
            Segment::Lru(cache) => {
                if let Some(existing) = cache.get(&key) {
                    return Some(existing.clone());
                }
                cache.put(key, value);
                None
            }
            Segment::Lirs(cache) => cache.put_if_absent(key, value),
        }
    }

    fn len(&self) -> usize {
        match self {
            Segment::Lru(cache) => cache.len(),
            Segment::Lirs(cache) => cache.len(),
        }
    }

    fn clear(&mut self) {
        match self {
            Segment::Lru(cache) => cache.clear(),
            Segment::Lirs(cache) => cache.clear(),
        }
    }
}

/// A concurrent map holding at most `capacity` entries.
///
/// Keys are spread over segments by their hash and every segment runs its own
/// eviction, so no operation takes a map wide lock. Evicted values are dropped
/// as soon as they leave their segment.
pub struct BoundedConcurrentMap<K: Hash + Eq, V> {
    segments: Vec<Mutex<Segment<K, V>>>,
    hasher: XxBuildHasher,
    capacity: usize,
}

impl<K: Hash + Eq + Clone, V: Clone> BoundedConcurrentMap<K, V> {
    pub fn new(capacity: usize, concurrency_level: usize, policy: EvictionPolicy) -> Self {
        let capacity = capacity.max(1);
        let segment_count = concurrency_level.clamp(1, capacity);
        let base = capacity / segment_count;
        let remainder = capacity % segment_count;
        let segments = (0..segment_count)
            .map(|i| {
                let segment_capacity = if i < remainder { base + 1 } else { base };
                Mutex::new(Segment::new(segment_capacity, policy))
            })
            .collect();
        Self {
            segments,
            hasher: XxBuildHasher::default(),
            capacity,
        }
    }

    fn segment_for(&self, key: &K) -> &Mutex<Segment<K, V>> {
        let hash = self.hasher.hash_one(key);
        // Upper bits, the lower ones already pick the bucket inside the segment.
        let index = ((hash >> 32) as usize) % self.segments.len();
        &self.segments[index]
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.segment_for(key).lock().get(key)
    }

    /// Insert `value` unless `key` is already present. Returns the value already
    /// present, which callers adopt in place of their own.
    pub fn put_if_absent(&self, key: K, value: V) -> Option<V> {
        self.segment_for(&key).lock().put_if_absent(key, value)
    }

    pub fn len(&self) -> usize {
        self.segments.iter().map(|segment| segment.lock().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn clear(&self) {
        for segment in &self.segments {
            segment.lock().clear();
        }
    }
}
