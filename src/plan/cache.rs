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
//! Cache of compiled query plans.
//!
//! A miss compiles outside of any lock and then offers the plan with
//! `put_if_absent`. When two sessions miss on the same key concurrently both
//! compile, the first insert wins and the other plan is dropped.
//!
use std::collections::BTreeMap;
use std::hash::{BuildHasher, Hash, Hasher};
use std::sync::Arc;
use std::time::Instant;

use hqlplan_core::ParameterMetadata;
use tracing::trace;

use crate::bounded::{BoundedConcurrentMap, XxBuildHasher};
use crate::errors::Result;
use crate::factory::SessionFactory;
use crate::filter::EnabledFilters;
use crate::plan::hql::{FilterQueryPlan, HqlQueryPlan};
use crate::plan::native::{NativeSqlQueryPlan, NativeSqlQuerySpecification};

/// Builds the plan for an HQL query on a cache miss.
pub trait QueryPlanCreator: Send + Sync {
    fn create_query_plan(
        &self,
        hql: &str,
        shallow: bool,
        enabled_filters: &EnabledFilters,
        factory: &SessionFactory,
    ) -> Result<HqlQueryPlan>;
}

impl<F> QueryPlanCreator for F
where
    F: Fn(&str, bool, &EnabledFilters, &SessionFactory) -> Result<HqlQueryPlan> + Send + Sync,
{
    fn create_query_plan(
        &self,
        hql: &str,
        shallow: bool,
        enabled_filters: &EnabledFilters,
        factory: &SessionFactory,
    ) -> Result<HqlQueryPlan> {
        self(hql, shallow, enabled_filters, factory)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StandardQueryPlanCreator;

impl QueryPlanCreator for StandardQueryPlanCreator {
    fn create_query_plan(
        &self,
        hql: &str,
        shallow: bool,
        enabled_filters: &EnabledFilters,
        factory: &SessionFactory,
    ) -> Result<HqlQueryPlan> {
        HqlQueryPlan::new(hql, shallow, enabled_filters, factory)
    }
}

/// Shape of the enabled filters: filter name to parameter name to the number of
/// values bound. Plans do not embed filter values, so filters of the same shape
/// share a plan.
pub type FilterFingerprint = BTreeMap<String, BTreeMap<String, usize>>;

pub fn filter_fingerprint(enabled_filters: &EnabledFilters) -> FilterFingerprint {
    enabled_filters
        .iter()
        .map(|(name, filter)| {
            let parameters = filter
                .parameters()
                .iter()
                .map(|(parameter, value)| (parameter.clone(), value.cardinality()))
                .collect();
            (name.clone(), parameters)
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HqlQueryPlanKey {
    query: String,
    shallow: bool,
    filter_keys: FilterFingerprint,
    hash_code: u64,
}

impl HqlQueryPlanKey {
    pub fn new(query: &str, shallow: bool, enabled_filters: &EnabledFilters) -> Self {
        let filter_keys = filter_fingerprint(enabled_filters);
        let hash_code = XxBuildHasher::default().hash_one((query, shallow, &filter_keys));
        Self {
            query: query.to_string(),
            shallow,
            filter_keys,
            hash_code,
        }
    }
}

impl Hash for HqlQueryPlanKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterQueryPlanKey {
    query: String,
    collection_role: String,
    shallow: bool,
    filter_keys: FilterFingerprint,
    hash_code: u64,
}

impl FilterQueryPlanKey {
    pub fn new(query: &str, collection_role: &str, shallow: bool, enabled_filters: &EnabledFilters) -> Self {
        let filter_keys = filter_fingerprint(enabled_filters);
        let hash_code = XxBuildHasher::default().hash_one((query, collection_role, shallow, &filter_keys));
        Self {
            query: query.to_string(),
            collection_role: collection_role.to_string(),
            shallow,
            filter_keys,
            hash_code,
        }
    }
}

impl Hash for FilterQueryPlanKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ParameterMetadataKey {
    query: String,
    ordinal_zero_based: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum QueryPlanKey {
    Hql(HqlQueryPlanKey),
    Filter(FilterQueryPlanKey),
    Native(NativeSqlQuerySpecification),
}

#[derive(Clone)]
enum CachedPlan {
    Hql(Arc<HqlQueryPlan>),
    Filter(Arc<FilterQueryPlan>),
    Native(Arc<NativeSqlQueryPlan>),
}

pub struct QueryPlanCache {
    factory: Arc<SessionFactory>,
    plan_creator: Box<dyn QueryPlanCreator>,
    query_plan_cache: BoundedConcurrentMap<QueryPlanKey, CachedPlan>,
    parameter_metadata_cache: BoundedConcurrentMap<ParameterMetadataKey, Arc<ParameterMetadata>>,
}

impl QueryPlanCache {
    pub fn new(factory: Arc<SessionFactory>) -> Self {
        Self::with_plan_creator(factory, StandardQueryPlanCreator)
    }

    pub fn with_plan_creator<C: QueryPlanCreator + 'static>(factory: Arc<SessionFactory>, plan_creator: C) -> Self {
        let config = factory.config();
        let query_plan_cache = BoundedConcurrentMap::new(
            config.query_plan_cache_max_size(),
            config.concurrency_level(),
            config.eviction(),
        );
        let parameter_metadata_cache = BoundedConcurrentMap::new(
            config.parameter_metadata_max_size(),
            config.concurrency_level(),
            config.eviction(),
        );
        Self {
            factory,
            plan_creator: Box::new(plan_creator),
            query_plan_cache,
            parameter_metadata_cache,
        }
    }

    pub fn factory(&self) -> &Arc<SessionFactory> {
        &self.factory
    }

    /// Parameter metadata of a native statement, available before any plan for it
    /// can be built.
    pub fn get_sql_parameter_metadata(&self, query: &str, ordinal_zero_based: bool) -> Result<Arc<ParameterMetadata>> {
        let key = ParameterMetadataKey {
            query: query.to_string(),
            ordinal_zero_based,
        };
        if let Some(metadata) = self.parameter_metadata_cache.get(&key) {
            return Ok(metadata);
        }
        let metadata = Arc::new(
            self.factory
                .native_query_interpreter()
                .parameter_metadata(query, ordinal_zero_based)?,
        );
        Ok(self
            .parameter_metadata_cache
            .put_if_absent(key, metadata.clone())
            .unwrap_or(metadata))
    }

    pub fn get_hql_query_plan(
        &self,
        query: &str,
        shallow: bool,
        enabled_filters: &EnabledFilters,
    ) -> Result<Arc<HqlQueryPlan>> {
        let key = QueryPlanKey::Hql(HqlQueryPlanKey::new(query, shallow, enabled_filters));
        let statistics = self.factory.statistics();
        let statistics_enabled = statistics.is_statistics_enabled();

        if let Some(CachedPlan::Hql(plan)) = self.query_plan_cache.get(&key) {
            trace!("Located HQL query plan in cache ({})", query);
            if statistics_enabled {
                statistics.query_plan_cache_hit(query);
            }
            return Ok(plan);
        }

        trace!("Unable to locate HQL query plan in cache; generating ({})", query);
        let start = Instant::now();
        let plan = Arc::new(
            self.plan_creator
                .create_query_plan(query, shallow, enabled_filters, &self.factory)?,
        );
        if statistics_enabled {
            let micros = start.elapsed().as_micros() as u64;
            statistics.query_plan_cache_miss(query);
            statistics.query_compiled(query, micros);
        }
        match self.query_plan_cache.put_if_absent(key, CachedPlan::Hql(plan.clone())) {
            Some(CachedPlan::Hql(existing)) => Ok(existing),
            _ => Ok(plan),
        }
    }

    pub fn get_filter_query_plan(
        &self,
        filter_string: &str,
        collection_role: &str,
        shallow: bool,
        enabled_filters: &EnabledFilters,
    ) -> Result<Arc<FilterQueryPlan>> {
        let key = QueryPlanKey::Filter(FilterQueryPlanKey::new(
            filter_string,
            collection_role,
            shallow,
            enabled_filters,
        ));
        if let Some(CachedPlan::Filter(plan)) = self.query_plan_cache.get(&key) {
            trace!("Located collection-filter query plan in cache ({} : {})", collection_role, filter_string);
            return Ok(plan);
        }

        trace!(
            "Unable to locate collection-filter query plan in cache; generating ({} : {})",
            collection_role,
            filter_string
        );
        let plan = Arc::new(FilterQueryPlan::new(
            filter_string,
            collection_role,
            shallow,
            enabled_filters,
            &self.factory,
        )?);
        match self.query_plan_cache.put_if_absent(key, CachedPlan::Filter(plan.clone())) {
            Some(CachedPlan::Filter(existing)) => Ok(existing),
            _ => Ok(plan),
        }
    }

    pub fn get_native_sql_query_plan(
        &self,
        specification: &NativeSqlQuerySpecification,
    ) -> Result<Arc<NativeSqlQueryPlan>> {
        let key = QueryPlanKey::Native(specification.clone());
        if let Some(CachedPlan::Native(plan)) = self.query_plan_cache.get(&key) {
            trace!("Located native-sql query plan in cache ({})", specification.query_string());
            return Ok(plan);
        }

        trace!(
            "Unable to locate native-sql query plan in cache; generating ({})",
            specification.query_string()
        );
        let plan = Arc::new(
            self.factory
                .native_query_interpreter()
                .create_query_plan(specification, &self.factory)?,
        );
        match self.query_plan_cache.put_if_absent(key, CachedPlan::Native(plan.clone())) {
            Some(CachedPlan::Native(existing)) => Ok(existing),
            _ => Ok(plan),
        }
    }

    pub fn plan_count(&self) -> usize {
        self.query_plan_cache.len()
    }

    pub fn parameter_metadata_count(&self) -> usize {
        self.parameter_metadata_cache.len()
    }

    /// Drop every cached plan and parameter metadata, e.g. after the mapping changed.
    pub fn cleanup(&self) {
        trace!("Cleaning QueryPlan Cache");
        self.query_plan_cache.clear();
        self.parameter_metadata_cache.clear();
    }
}
