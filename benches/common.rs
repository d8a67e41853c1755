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
#![allow(dead_code)]
use std::collections::BTreeSet;
use std::sync::Arc;

use hqlplan::prelude::*;
use hqlplan::{FilterTranslator, ParameterTranslations, PolymorphicQuerySplitter, RowIter, ScrollableResults};
use indexmap::IndexMap;
use uuid::Uuid;

/// Returns the same fixed rows for every query.
pub struct StaticTranslator {
    query_string: String,
    rows: Vec<Row>,
    query_spaces: BTreeSet<String>,
    translations: ParameterTranslations,
    return_aliases: Vec<String>,
    return_types: Vec<SqlType>,
}

impl QueryTranslator for StaticTranslator {
    fn compile(&mut self, _substitutions: &IndexMap<String, String>, _shallow: bool) -> Result<()> {
        Ok(())
    }

    fn list(&self, _session: &dyn SessionContext, _params: &QueryParameters) -> Result<Vec<Row>> {
        Ok(self.rows.clone())
    }

    fn iterate(&self, _session: &dyn SessionContext, _params: &QueryParameters) -> Result<RowIter> {
        Ok(Box::new(self.rows.clone().into_iter().map(Ok)))
    }

    fn scroll(&self, _session: &dyn SessionContext, _params: &QueryParameters) -> Result<Box<dyn ScrollableResults>> {
        Err(HqlError::Unsupported("scroll".to_string()))
    }

    fn execute_update(&self, _session: &dyn SessionContext, _params: &QueryParameters) -> Result<u64> {
        Ok(self.rows.len() as u64)
    }

    fn query_spaces(&self) -> &BTreeSet<String> {
        &self.query_spaces
    }

    fn collect_sql_strings(&self) -> Vec<String> {
        vec![self.query_string.clone()]
    }

    fn parameter_translations(&self) -> &ParameterTranslations {
        &self.translations
    }

    fn is_manipulation_statement(&self) -> bool {
        false
    }

    fn return_aliases(&self) -> &[String] {
        &self.return_aliases
    }

    fn return_types(&self) -> &[SqlType] {
        &self.return_types
    }

    fn contains_collection_fetches(&self) -> bool {
        false
    }

    fn query_string(&self) -> &str {
        &self.query_string
    }

    fn query_identifier(&self) -> &str {
        &self.query_string
    }
}

impl FilterTranslator for StaticTranslator {
    fn compile_filter(
        &mut self,
        _collection_role: &str,
        substitutions: &IndexMap<String, String>,
        shallow: bool,
    ) -> Result<()> {
        self.compile(substitutions, shallow)
    }
}

pub struct StaticTranslatorFactory {
    rows: Vec<Row>,
}

impl StaticTranslatorFactory {
    fn translator(&self, query_string: &str) -> StaticTranslator {
        StaticTranslator {
            query_string: query_string.to_string(),
            rows: self.rows.clone(),
            query_spaces: BTreeSet::from(["animal".to_string()]),
            translations: ParameterTranslations::without_ordinal_metadata(),
            return_aliases: vec!["a".to_string()],
            return_types: vec![SqlType::Entity("Animal".to_string())],
        }
    }
}

impl QueryTranslatorFactory for StaticTranslatorFactory {
    fn create_query_translator(
        &self,
        _query_identifier: &str,
        query_string: &str,
        _filters: &EnabledFilters,
        _factory: &SessionFactory,
    ) -> Result<Box<dyn QueryTranslator>> {
        Ok(Box::new(self.translator(query_string)))
    }

    fn create_filter_translator(
        &self,
        _query_identifier: &str,
        query_string: &str,
        _filters: &EnabledFilters,
        _factory: &SessionFactory,
    ) -> Result<Box<dyn FilterTranslator>> {
        Ok(Box::new(self.translator(query_string)))
    }
}

pub struct NoopSession;

impl SessionContext for NoopSession {
    fn session_id(&self) -> Uuid {
        Uuid::nil()
    }

    fn cleanup_shared_caches(&self, _query_spaces: &BTreeSet<String>) -> Result<()> {
        Ok(())
    }

    fn execute_native_update(&self, _sql: &str, values: &[HqlValue], _selection: Option<&RowSelection>) -> Result<u64> {
        Ok(values.len() as u64)
    }
}

pub fn create_bench_cache(rows_per_translator: usize) -> QueryPlanCache {
    let rows = (0..rows_per_translator)
        .map(|i| Arc::new(HqlValue::Bigint(i as i64)))
        .collect();
    let factory = SessionFactory::builder(Arc::new(StaticTranslatorFactory { rows }))
        .splitter(Arc::new(
            PolymorphicQuerySplitter::new().register("Animal", ["Cat", "Dog", "Bird"]),
        ))
        .build()
        .expect("bench factory");
    QueryPlanCache::new(Arc::new(factory))
}
