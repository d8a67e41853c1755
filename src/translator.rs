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
//! Collaborators that compile and execute one concrete query.
//!
//! A plan owns one translator per concrete query produced by the splitter. Whether a
//! translator compiles a top level query or a collection filter is decided once, when
//! the plan is built, and recorded in the [`Translator`] variant.
//!
use std::collections::BTreeSet;
use std::sync::Arc;

use hqlplan_core::{HqlValue, ParameterTranslations, SqlType};
use indexmap::IndexMap;
use uuid::Uuid;

use crate::errors::{HqlError, Result};
use crate::factory::SessionFactory;
use crate::filter::EnabledFilters;
use crate::parameters::{QueryParameters, RowSelection};

/// One result: an entity, a scalar or a projection tuple. Two rows are the same
/// object when they share an allocation.
pub type Row = Arc<HqlValue>;

pub type RowIter = Box<dyn Iterator<Item = Result<Row>> + Send>;

/// Server side cursor over the results of a single statement.
pub trait ScrollableResults: Send {
    /// Advance to the next row, returning it, or `None` past the last row.
    fn next(&mut self) -> Result<Option<Row>>;

    fn current(&self) -> Option<&Row>;

    fn close(&mut self) -> Result<()>;
}

/// The session a plan executes against.
pub trait SessionContext: Send + Sync {
    fn session_id(&self) -> Uuid;

    /// Evict shared cache regions affected by a bulk statement over `query_spaces`.
    fn cleanup_shared_caches(&self, query_spaces: &BTreeSet<String>) -> Result<()>;

    /// Run an already rewritten native statement with values bound in JDBC order.
    fn execute_native_update(
        &self,
        sql: &str,
        values: &[HqlValue],
        selection: Option<&RowSelection>,
    ) -> Result<u64>;
}

pub trait QueryTranslator: Send + Sync {
    /// Compile the concrete query. `substitutions` are the configured HQL token replacements.
    fn compile(&mut self, substitutions: &IndexMap<String, String>, shallow: bool) -> Result<()>;

    fn list(&self, session: &dyn SessionContext, params: &QueryParameters) -> Result<Vec<Row>>;

    fn iterate(&self, session: &dyn SessionContext, params: &QueryParameters) -> Result<RowIter>;

    fn scroll(&self, session: &dyn SessionContext, params: &QueryParameters) -> Result<Box<dyn ScrollableResults>>;

    fn execute_update(&self, session: &dyn SessionContext, params: &QueryParameters) -> Result<u64>;

    fn query_spaces(&self) -> &BTreeSet<String>;

    fn collect_sql_strings(&self) -> Vec<String>;

    fn parameter_translations(&self) -> &ParameterTranslations;

    fn is_manipulation_statement(&self) -> bool;

    fn return_aliases(&self) -> &[String];

    fn return_types(&self) -> &[SqlType];

    fn contains_collection_fetches(&self) -> bool;

    fn query_string(&self) -> &str;

    fn query_identifier(&self) -> &str;
}

/// Translator of a query applied to the elements of a collection.
pub trait FilterTranslator: QueryTranslator {
    fn compile_filter(
        &mut self,
        collection_role: &str,
        substitutions: &IndexMap<String, String>,
        shallow: bool,
    ) -> Result<()>;
}

pub trait QueryTranslatorFactory: Send + Sync {
    fn create_query_translator(
        &self,
        query_identifier: &str,
        query_string: &str,
        filters: &EnabledFilters,
        factory: &SessionFactory,
    ) -> Result<Box<dyn QueryTranslator>>;

    fn create_filter_translator(
        &self,
        query_identifier: &str,
        query_string: &str,
        filters: &EnabledFilters,
        factory: &SessionFactory,
    ) -> Result<Box<dyn FilterTranslator>>;
}

pub enum Translator {
    Query(Box<dyn QueryTranslator>),
    Filter(Box<dyn FilterTranslator>),
}

macro_rules! dispatch {
    ($self:ident, $t:ident => $body:expr) => {
        match $self {
            Translator::Query($t) => $body,
            Translator::Filter($t) => $body,
        }
    };
}

impl Translator {
    pub fn compile(
        &mut self,
        collection_role: Option<&str>,
        substitutions: &IndexMap<String, String>,
        shallow: bool,
    ) -> Result<()> {
        match (self, collection_role) {
            (Translator::Query(t), _) => t.compile(substitutions, shallow),
            (Translator::Filter(t), Some(role)) => t.compile_filter(role, substitutions, shallow),
            (Translator::Filter(t), None) => Err(HqlError::mapping_error(format!(
                "filter translator for [{}] compiled without a collection role",
                t.query_string()
            ))),
        }
    }

    pub fn is_filter(&self) -> bool {
        matches!(self, Translator::Filter(_))
    }

    pub fn list(&self, session: &dyn SessionContext, params: &QueryParameters) -> Result<Vec<Row>> {
        dispatch!(self, t => t.list(session, params))
    }

    pub fn iterate(&self, session: &dyn SessionContext, params: &QueryParameters) -> Result<RowIter> {
        dispatch!(self, t => t.iterate(session, params))
    }

    pub fn scroll(&self, session: &dyn SessionContext, params: &QueryParameters) -> Result<Box<dyn ScrollableResults>> {
        dispatch!(self, t => t.scroll(session, params))
    }

    pub fn execute_update(&self, session: &dyn SessionContext, params: &QueryParameters) -> Result<u64> {
        dispatch!(self, t => t.execute_update(session, params))
    }

    pub fn query_spaces(&self) -> &BTreeSet<String> {
        dispatch!(self, t => t.query_spaces())
    }

    pub fn collect_sql_strings(&self) -> Vec<String> {
        dispatch!(self, t => t.collect_sql_strings())
    }

    pub fn parameter_translations(&self) -> &ParameterTranslations {
        dispatch!(self, t => t.parameter_translations())
    }

    pub fn is_manipulation_statement(&self) -> bool {
        dispatch!(self, t => t.is_manipulation_statement())
    }

    pub fn return_aliases(&self) -> &[String] {
        dispatch!(self, t => t.return_aliases())
    }

    pub fn return_types(&self) -> &[SqlType] {
        dispatch!(self, t => t.return_types())
    }

    pub fn contains_collection_fetches(&self) -> bool {
        dispatch!(self, t => t.contains_collection_fetches())
    }

    pub fn query_string(&self) -> &str {
        dispatch!(self, t => t.query_string())
    }

    pub fn query_identifier(&self) -> &str {
        dispatch!(self, t => t.query_identifier())
    }
}

impl std::fmt::Debug for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = if self.is_filter() { "Filter" } else { "Query" };
        f.debug_struct("Translator")
            .field("kind", &kind)
            .field("query", &self.query_string())
            .finish()
    }
}
