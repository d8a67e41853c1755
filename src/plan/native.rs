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
//! Plans for native SQL statements.
//!
use std::collections::BTreeSet;
use std::hash::{BuildHasher, Hash, Hasher};

use hqlplan_core::{
    HqlDataError, HqlValue, ParamLocationRecognizer, ParameterMetadata, ParameterParser, ParameterRecognizer,
    SqlType,
};
use indexmap::IndexMap;
use tracing::trace;

use crate::bounded::XxBuildHasher;
use crate::errors::{HqlError, Result};
use crate::factory::SessionFactory;
use crate::parameters::QueryParameters;
use crate::translator::SessionContext;

/// How one column group of a native result maps back to the domain model.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NativeSqlQueryReturn {
    Scalar {
        column_alias: String,
        sql_type: Option<SqlType>,
    },
    Root {
        alias: String,
        entity_name: String,
    },
    Join {
        alias: String,
        owner_alias: String,
        owner_property: String,
    },
}

/// A native statement with its declared result mappings and query spaces.
/// Two equal specifications share one cached plan.
#[derive(Clone, Debug)]
pub struct NativeSqlQuerySpecification {
    query_string: String,
    query_returns: Vec<NativeSqlQueryReturn>,
    query_spaces: BTreeSet<String>,
    hash_code: u64,
}

impl NativeSqlQuerySpecification {
    pub fn new<S: Into<String>>(
        query_string: S,
        query_returns: Vec<NativeSqlQueryReturn>,
        query_spaces: BTreeSet<String>,
    ) -> Self {
        let query_string = query_string.into();
        let hash_code = XxBuildHasher::default().hash_one((&query_string, &query_returns, &query_spaces));
        Self {
            query_string,
            query_returns,
            query_spaces,
            hash_code,
        }
    }

    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    pub fn query_returns(&self) -> &[NativeSqlQueryReturn] {
        &self.query_returns
    }

    pub fn query_spaces(&self) -> &BTreeSet<String> {
        &self.query_spaces
    }
}

impl PartialEq for NativeSqlQuerySpecification {
    fn eq(&self, other: &Self) -> bool {
        self.hash_code == other.hash_code
            && self.query_string == other.query_string
            && self.query_returns == other.query_returns
            && self.query_spaces == other.query_spaces
    }
}

impl Eq for NativeSqlQuerySpecification {}

impl Hash for NativeSqlQuerySpecification {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code);
    }
}

/// Rewrites every parameter marker to a JDBC `?`, remembering which JDBC
/// positions (1-based) each marker took.
#[derive(Debug, Default)]
struct JdbcParameterRewriter {
    sql: String,
    parameter_count: usize,
    ordinal_bind_points: Vec<usize>,
    named_bind_points: IndexMap<String, Vec<usize>>,
}

impl JdbcParameterRewriter {
    fn next_position(&mut self) -> usize {
        self.sql.push('?');
        self.parameter_count += 1;
        self.parameter_count
    }
}

impl ParameterRecognizer for JdbcParameterRewriter {
    fn out_parameter(&mut self, _position: usize) {
        self.next_position();
    }

    fn ordinal_parameter(&mut self, _position: usize) {
        let position = self.next_position();
        self.ordinal_bind_points.push(position);
    }

    fn named_parameter(&mut self, name: &str, _position: usize) {
        let position = self.next_position();
        self.named_bind_points.entry(name.to_string()).or_default().push(position);
    }

    fn jpa_positional_parameter(&mut self, name: &str, position: usize) {
        self.named_parameter(name, position);
    }

    fn other(&mut self, character: char) {
        self.sql.push(character);
    }
}

/// A native statement rewritten for execution.
#[derive(Debug)]
pub struct NativeSqlQueryPlan {
    source_query: String,
    sql: String,
    parameter_count: usize,
    ordinal_bind_points: Vec<usize>,
    named_bind_points: IndexMap<String, Vec<usize>>,
    query_returns: Vec<NativeSqlQueryReturn>,
    query_spaces: BTreeSet<String>,
}

impl NativeSqlQueryPlan {
    pub fn new(specification: &NativeSqlQuerySpecification) -> Result<Self> {
        let mut rewriter = JdbcParameterRewriter::default();
        ParameterParser::parse(specification.query_string(), &mut rewriter)?;
        Ok(Self {
            source_query: specification.query_string().to_string(),
            sql: rewriter.sql,
            parameter_count: rewriter.parameter_count,
            ordinal_bind_points: rewriter.ordinal_bind_points,
            named_bind_points: rewriter.named_bind_points,
            query_returns: specification.query_returns().to_vec(),
            query_spaces: specification.query_spaces().clone(),
        })
    }

    pub fn source_query(&self) -> &str {
        &self.source_query
    }

    /// The statement with every parameter marker replaced by `?`.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn named_parameter_locations(&self, name: &str) -> Result<&[usize]> {
        self.named_bind_points
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| HqlDataError::named_parameter_not_found(name).into())
    }

    pub fn query_returns(&self) -> &[NativeSqlQueryReturn] {
        &self.query_returns
    }

    pub fn query_spaces(&self) -> &BTreeSet<String> {
        &self.query_spaces
    }

    pub fn perform_execute_update(&self, params: &QueryParameters, session: &dyn SessionContext) -> Result<u64> {
        if params.is_callable() {
            return Err(HqlError::Unsupported(
                "callable not yet supported for native queries".to_string(),
            ));
        }
        trace!("executeUpdate: {}", self.source_query);
        trace!("{}", params);

        session.cleanup_shared_caches(&self.query_spaces)?;
        let values = self.bind_values(params)?;
        session.execute_native_update(&self.sql, &values, params.row_selection())
    }

    /// Values in JDBC order: positional values first, then named values at their
    /// recorded positions.
    fn bind_values(&self, params: &QueryParameters) -> Result<Vec<HqlValue>> {
        let positional = params.positional_values();
        if positional.len() != self.ordinal_bind_points.len() {
            return Err(HqlError::ParameterMismatch {
                expected: self.ordinal_bind_points.len(),
                found: positional.len(),
            });
        }
        let mut slots: Vec<Option<HqlValue>> = vec![None; self.parameter_count];
        for (position, value) in self.ordinal_bind_points.iter().zip(positional) {
            slots[position - 1] = Some(value.clone());
        }
        for (name, positions) in &self.named_bind_points {
            let value = params
                .named_value(name)
                .ok_or_else(|| HqlDataError::named_parameter_not_found(name.as_str()))?;
            for position in positions {
                slots[position - 1] = Some(value.clone());
            }
        }
        Ok(slots.into_iter().map(Option::unwrap_or_default).collect())
    }
}

/// Parameter recognition and plan building for native SQL.
pub trait NativeQueryInterpreter: Send + Sync {
    fn recognize_parameters(&self, sql: &str, recognizer: &mut dyn ParameterRecognizer) -> Result<()>;

    fn parameter_metadata(&self, sql: &str, ordinal_zero_based: bool) -> Result<ParameterMetadata>;

    fn create_query_plan(
        &self,
        specification: &NativeSqlQuerySpecification,
        factory: &SessionFactory,
    ) -> Result<NativeSqlQueryPlan>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StandardNativeQueryInterpreter;

impl NativeQueryInterpreter for StandardNativeQueryInterpreter {
    fn recognize_parameters(&self, sql: &str, recognizer: &mut dyn ParameterRecognizer) -> Result<()> {
        ParameterParser::parse(sql, recognizer)?;
        Ok(())
    }

    fn parameter_metadata(&self, sql: &str, ordinal_zero_based: bool) -> Result<ParameterMetadata> {
        let recognizer = ParamLocationRecognizer::parse_locations(sql)?;
        Ok(ParameterMetadata::from_locations(&recognizer, None, ordinal_zero_based))
    }

    fn create_query_plan(
        &self,
        specification: &NativeSqlQuerySpecification,
        _factory: &SessionFactory,
    ) -> Result<NativeSqlQueryPlan> {
        NativeSqlQueryPlan::new(specification)
    }
}
