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
//! Translator, factory and session doubles shared by the integration tests.
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use hqlplan::prelude::*;
use hqlplan::{
    FilterTranslator, ParamLocationRecognizer, ParameterTranslations, PolymorphicQuerySplitter, RowIter,
    ScrollableResults,
};
use indexmap::IndexMap;
use parking_lot::Mutex;
use uuid::Uuid;

/// One entity row; every call returns the same allocation.
pub fn entity(name: &str) -> Row {
    Arc::new(HqlValue::Text(name.to_string()))
}

pub fn names(rows: &[Row]) -> Vec<String> {
    rows.iter().map(|row| row.as_str().unwrap_or_default().to_string()).collect()
}

#[derive(Default)]
pub struct Journal {
    pub calls: Mutex<Vec<String>>,
    pub selections: Mutex<Vec<Option<RowSelection>>>,
}

impl Journal {
    fn record(&self, call: String, params: &QueryParameters) {
        self.calls.lock().push(call);
        self.selections.lock().push(params.row_selection().cloned());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

/// Canned results per concrete query.
#[derive(Default)]
pub struct MockTranslatorFactory {
    rows: IndexMap<String, Vec<Row>>,
    update_counts: IndexMap<String, u64>,
    ordinal_count_override: Option<usize>,
    pub created: AtomicUsize,
    pub journal: Arc<Journal>,
}

impl MockTranslatorFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(mut self, concrete_query: &str, rows: Vec<Row>) -> Self {
        self.rows.insert(concrete_query.to_string(), rows);
        self
    }

    pub fn update_count(mut self, concrete_query: &str, count: u64) -> Self {
        self.update_counts.insert(concrete_query.to_string(), count);
        self
    }

    /// Make every translator report this many ordinal parameters.
    pub fn ordinal_count_override(mut self, count: usize) -> Self {
        self.ordinal_count_override = Some(count);
        self
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    fn translator(&self, query_identifier: &str, query_string: &str) -> Result<MockTranslator> {
        self.created.fetch_add(1, Ordering::SeqCst);
        let locations = ParamLocationRecognizer::parse_locations(query_string)?;
        let ordinal_count = self
            .ordinal_count_override
            .unwrap_or(locations.ordinal_parameter_locations().len());
        let mut translations = ParameterTranslations::new();
        for _ in 0..ordinal_count {
            translations = translations.ordinal(Some(SqlType::Int));
        }
        for name in locations.named_parameter_descriptions().keys() {
            translations = translations.named(name.as_str(), Some(SqlType::Varchar));
        }
        let lower = query_string.to_lowercase();
        let entity = query_string
            .split_whitespace()
            .skip_while(|token| !matches!(token.to_lowercase().as_str(), "from" | "update" | "delete"))
            .nth(1)
            .unwrap_or("unknown")
            .to_string();
        Ok(MockTranslator {
            query_identifier: query_identifier.to_string(),
            query_string: query_string.to_string(),
            rows: self.rows.get(query_string).cloned().unwrap_or_default(),
            update_count: self.update_counts.get(query_string).copied().unwrap_or(0),
            query_spaces: BTreeSet::from([entity.to_lowercase()]),
            translations,
            manipulation: lower.starts_with("update") || lower.starts_with("delete") || lower.starts_with("insert"),
            collection_fetches: lower.contains("join fetch"),
            return_aliases: vec!["this".to_string()],
            return_types: vec![SqlType::Entity(entity)],
            compiled: false,
            journal: self.journal.clone(),
        })
    }
}

impl QueryTranslatorFactory for MockTranslatorFactory {
    fn create_query_translator(
        &self,
        query_identifier: &str,
        query_string: &str,
        _filters: &EnabledFilters,
        _factory: &SessionFactory,
    ) -> Result<Box<dyn QueryTranslator>> {
        Ok(Box::new(self.translator(query_identifier, query_string)?))
    }

    fn create_filter_translator(
        &self,
        query_identifier: &str,
        query_string: &str,
        _filters: &EnabledFilters,
        _factory: &SessionFactory,
    ) -> Result<Box<dyn FilterTranslator>> {
        Ok(Box::new(self.translator(query_identifier, query_string)?))
    }
}

pub struct MockTranslator {
    query_identifier: String,
    query_string: String,
    rows: Vec<Row>,
    update_count: u64,
    query_spaces: BTreeSet<String>,
    translations: ParameterTranslations,
    manipulation: bool,
    collection_fetches: bool,
    return_aliases: Vec<String>,
    return_types: Vec<SqlType>,
    compiled: bool,
    journal: Arc<Journal>,
}

impl QueryTranslator for MockTranslator {
    fn compile(&mut self, _substitutions: &IndexMap<String, String>, _shallow: bool) -> Result<()> {
        if self.query_string.contains("broken") {
            return Err(HqlError::mapping_error(format!("unexpected token in [{}]", self.query_string)));
        }
        self.compiled = true;
        Ok(())
    }

    fn list(&self, _session: &dyn SessionContext, params: &QueryParameters) -> Result<Vec<Row>> {
        self.journal.record(format!("list:{}", self.query_string), params);
        Ok(self.rows.clone())
    }

    fn iterate(&self, _session: &dyn SessionContext, params: &QueryParameters) -> Result<RowIter> {
        self.journal.record(format!("iterate:{}", self.query_string), params);
        Ok(Box::new(self.rows.clone().into_iter().map(Ok)))
    }

    fn scroll(&self, _session: &dyn SessionContext, params: &QueryParameters) -> Result<Box<dyn ScrollableResults>> {
        self.journal.record(format!("scroll:{}", self.query_string), params);
        Ok(Box::new(MockScroll {
            rows: self.rows.clone(),
            position: None,
        }))
    }

    fn execute_update(&self, _session: &dyn SessionContext, params: &QueryParameters) -> Result<u64> {
        self.journal.record(format!("update:{}", self.query_string), params);
        Ok(self.update_count)
    }

    fn query_spaces(&self) -> &BTreeSet<String> {
        &self.query_spaces
    }

    fn collect_sql_strings(&self) -> Vec<String> {
        vec![format!("/* {} */ select * from {}", self.query_string, self.query_spaces.iter().next().map(String::as_str).unwrap_or("dual"))]
    }

    fn parameter_translations(&self) -> &ParameterTranslations {
        &self.translations
    }

    fn is_manipulation_statement(&self) -> bool {
        self.manipulation
    }

    fn return_aliases(&self) -> &[String] {
        &self.return_aliases
    }

    fn return_types(&self) -> &[SqlType] {
        &self.return_types
    }

    fn contains_collection_fetches(&self) -> bool {
        self.collection_fetches
    }

    fn query_string(&self) -> &str {
        &self.query_string
    }

    fn query_identifier(&self) -> &str {
        &self.query_identifier
    }
}

impl FilterTranslator for MockTranslator {
    fn compile_filter(
        &mut self,
        collection_role: &str,
        substitutions: &IndexMap<String, String>,
        shallow: bool,
    ) -> Result<()> {
        self.journal.calls.lock().push(format!("compile_filter:{}", collection_role));
        self.compile(substitutions, shallow)
    }
}

pub struct MockScroll {
    rows: Vec<Row>,
    position: Option<usize>,
}

impl ScrollableResults for MockScroll {
    fn next(&mut self) -> Result<Option<Row>> {
        let next = self.position.map_or(0, |p| p + 1);
        self.position = Some(next);
        Ok(self.rows.get(next).cloned())
    }

    fn current(&self) -> Option<&Row> {
        self.position.and_then(|p| self.rows.get(p))
    }

    fn close(&mut self) -> Result<()> {
        self.rows.clear();
        Ok(())
    }
}

#[derive(Default)]
pub struct MockSession {
    pub cleaned: Mutex<Vec<BTreeSet<String>>>,
    pub executed: Mutex<Vec<(String, Vec<HqlValue>)>>,
}

impl SessionContext for MockSession {
    fn session_id(&self) -> Uuid {
        Uuid::nil()
    }

    fn cleanup_shared_caches(&self, query_spaces: &BTreeSet<String>) -> Result<()> {
        self.cleaned.lock().push(query_spaces.clone());
        Ok(())
    }

    fn execute_native_update(
        &self,
        sql: &str,
        values: &[HqlValue],
        _selection: Option<&RowSelection>,
    ) -> Result<u64> {
        self.executed.lock().push((sql.to_string(), values.to_vec()));
        Ok(values.len() as u64)
    }
}

/// `Animal` is implemented by `Cat` and `Dog`; `Ghost` has no implementors.
pub fn animal_splitter() -> Arc<PolymorphicQuerySplitter> {
    Arc::new(
        PolymorphicQuerySplitter::new()
            .register("Animal", ["Cat", "Dog"])
            .register("Ghost", Vec::<String>::new()),
    )
}

pub fn session_factory(translators: Arc<MockTranslatorFactory>, config: HqlConfig) -> Arc<SessionFactory> {
    let factory = SessionFactory::builder(translators)
        .config(config)
        .splitter(animal_splitter())
        .filter_definition(
            FilterDefinition::new("tenant")
                .condition("tenant_id in (:ids)")
                .parameter("ids", SqlType::Bigint),
        )
        .filter_definition(
            FilterDefinition::new("active")
                .condition("active = :flag")
                .parameter("flag", SqlType::Bool),
        )
        .build()
        .unwrap();
    Arc::new(factory)
}
