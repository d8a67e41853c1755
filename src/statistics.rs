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
//! Query compilation and plan cache statistics.
//!
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Local};
use dashmap::DashMap;
use serde::Serialize;

/// Receiver of plan cache events. Callers check `is_statistics_enabled` before
/// reporting.
pub trait StatisticsImplementor: Send + Sync {
    fn is_statistics_enabled(&self) -> bool;

    fn query_compiled(&self, hql: &str, micros: u64);

    fn query_plan_cache_hit(&self, hql: &str);

    fn query_plan_cache_miss(&self, hql: &str);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopStatistics;

impl StatisticsImplementor for NoopStatistics {
    fn is_statistics_enabled(&self) -> bool {
        false
    }

    fn query_compiled(&self, _hql: &str, _micros: u64) {}

    fn query_plan_cache_hit(&self, _hql: &str) {}

    fn query_plan_cache_miss(&self, _hql: &str) {}
}

#[derive(Debug, Default)]
struct QueryStatistics {
    compile_count: AtomicU64,
    compile_time_total: AtomicU64,
    compile_time_max: AtomicU64,
    plan_cache_hits: AtomicU64,
    plan_cache_misses: AtomicU64,
}

impl QueryStatistics {
    fn snapshot(&self) -> QueryStatisticsSnapshot {
        QueryStatisticsSnapshot {
            compile_count: self.compile_count.load(Ordering::Relaxed),
            compile_time_total_micros: self.compile_time_total.load(Ordering::Relaxed),
            compile_time_max_micros: self.compile_time_max.load(Ordering::Relaxed),
            plan_cache_hits: self.plan_cache_hits.load(Ordering::Relaxed),
            plan_cache_misses: self.plan_cache_misses.load(Ordering::Relaxed),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct QueryStatisticsSnapshot {
    pub compile_count: u64,
    pub compile_time_total_micros: u64,
    pub compile_time_max_micros: u64,
    pub plan_cache_hits: u64,
    pub plan_cache_misses: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct StatisticsSnapshot {
    pub start_time: DateTime<Local>,
    pub query_plan_cache_hit_count: u64,
    pub query_plan_cache_miss_count: u64,
    pub query_compile_count: u64,
    pub queries: Vec<(String, QueryStatisticsSnapshot)>,
}

/// Thread safe statistics, global counters plus per query counters.
#[derive(Debug)]
pub struct ConcurrentStatistics {
    enabled: AtomicBool,
    start_time: DateTime<Local>,
    query_plan_cache_hit_count: AtomicU64,
    query_plan_cache_miss_count: AtomicU64,
    query_compile_count: AtomicU64,
    queries: DashMap<String, QueryStatistics>,
}

impl Default for ConcurrentStatistics {
    fn default() -> Self {
        Self::new(false)
    }
}

impl ConcurrentStatistics {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            start_time: Local::now(),
            query_plan_cache_hit_count: AtomicU64::new(0),
            query_plan_cache_miss_count: AtomicU64::new(0),
            query_compile_count: AtomicU64::new(0),
            queries: DashMap::new(),
        }
    }

    pub fn set_statistics_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn clear(&self) {
        self.query_plan_cache_hit_count.store(0, Ordering::Relaxed);
        self.query_plan_cache_miss_count.store(0, Ordering::Relaxed);
        self.query_compile_count.store(0, Ordering::Relaxed);
        self.queries.clear();
    }

    pub fn query_plan_cache_hit_count(&self) -> u64 {
        self.query_plan_cache_hit_count.load(Ordering::Relaxed)
    }

    pub fn query_plan_cache_miss_count(&self) -> u64 {
        self.query_plan_cache_miss_count.load(Ordering::Relaxed)
    }

    pub fn query_compile_count(&self) -> u64 {
        self.query_compile_count.load(Ordering::Relaxed)
    }

    pub fn query_statistics(&self, hql: &str) -> Option<QueryStatisticsSnapshot> {
        self.queries.get(hql).map(|stats| stats.snapshot())
    }

    pub fn snapshot(&self) -> StatisticsSnapshot {
        let mut queries: Vec<_> = self
            .queries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().snapshot()))
            .collect();
        queries.sort_by(|a, b| a.0.cmp(&b.0));
        StatisticsSnapshot {
            start_time: self.start_time,
            query_plan_cache_hit_count: self.query_plan_cache_hit_count(),
            query_plan_cache_miss_count: self.query_plan_cache_miss_count(),
            query_compile_count: self.query_compile_count(),
            queries,
        }
    }

    fn with_query<F: FnOnce(&QueryStatistics)>(&self, hql: &str, f: F) {
        if let Some(stats) = self.queries.get(hql) {
            f(&stats);
            return;
        }
        let stats = self.queries.entry(hql.to_string()).or_default();
        f(&stats);
    }
}

impl StatisticsImplementor for ConcurrentStatistics {
    fn is_statistics_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    fn query_compiled(&self, hql: &str, micros: u64) {
        self.query_compile_count.fetch_add(1, Ordering::Relaxed);
        self.with_query(hql, |stats| {
            stats.compile_count.fetch_add(1, Ordering::Relaxed);
            stats.compile_time_total.fetch_add(micros, Ordering::Relaxed);
            stats.compile_time_max.fetch_max(micros, Ordering::Relaxed);
        });
    }

    fn query_plan_cache_hit(&self, hql: &str) {
        self.query_plan_cache_hit_count.fetch_add(1, Ordering::Relaxed);
        self.with_query(hql, |stats| {
            stats.plan_cache_hits.fetch_add(1, Ordering::Relaxed);
        });
    }

    fn query_plan_cache_miss(&self, hql: &str) {
        self.query_plan_cache_miss_count.fetch_add(1, Ordering::Relaxed);
        self.with_query(hql, |stats| {
            stats.plan_cache_misses.fetch_add(1, Ordering::Relaxed);
        });
    }
}
