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
//! Session filters.
//!
use std::sync::Arc;

use hqlplan_core::{HqlValue, IntoHqlValue, SqlType};
use indexmap::IndexMap;

use crate::errors::{HqlError, Result};

/// Enabled filters of a session, filter name to filter.
pub type EnabledFilters = IndexMap<String, Filter>;

/// A named predicate fragment with typed bind parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterDefinition {
    name: String,
    default_condition: Option<String>,
    parameter_types: IndexMap<String, SqlType>,
}

impl FilterDefinition {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            default_condition: None,
            parameter_types: IndexMap::new(),
        }
    }

    pub fn condition<C: Into<String>>(mut self, condition: C) -> Self {
        self.default_condition = Some(condition.into());
        self
    }

    pub fn parameter<N: Into<String>>(mut self, name: N, sql_type: SqlType) -> Self {
        self.parameter_types.insert(name.into(), sql_type);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_condition(&self) -> Option<&str> {
        self.default_condition.as_deref()
    }

    pub fn parameter_type(&self, name: &str) -> Option<&SqlType> {
        self.parameter_types.get(name)
    }

    pub fn parameter_names(&self) -> impl Iterator<Item = &String> {
        self.parameter_types.keys()
    }
}

/// An enabled instance of a [`FilterDefinition`] holding its bound values.
#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    definition: Arc<FilterDefinition>,
    parameters: IndexMap<String, HqlValue>,
}

impl Filter {
    pub fn new(definition: Arc<FilterDefinition>) -> Self {
        Self {
            definition,
            parameters: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.definition.name()
    }

    pub fn definition(&self) -> &FilterDefinition {
        &self.definition
    }

    pub fn set_parameter<V: IntoHqlValue>(&mut self, name: &str, value: V) -> Result<&mut Self> {
        self.check_declared(name)?;
        self.parameters.insert(name.to_string(), value.into_value());
        Ok(self)
    }

    pub fn set_parameter_list<V: IntoHqlValue>(&mut self, name: &str, values: &[V]) -> Result<&mut Self> {
        self.check_declared(name)?;
        let values = values.iter().map(|v| v.into_value()).collect();
        self.parameters.insert(name.to_string(), HqlValue::List(values));
        Ok(self)
    }

    pub fn parameter(&self, name: &str) -> Option<&HqlValue> {
        self.parameters.get(name)
    }

    pub fn parameters(&self) -> &IndexMap<String, HqlValue> {
        &self.parameters
    }

    /// How many values the parameter binds: 1 for a scalar, the list size for a list.
    pub fn parameter_cardinality(&self, name: &str) -> Option<usize> {
        self.parameters.get(name).map(HqlValue::cardinality)
    }

    /// Every declared parameter must be bound before the filter takes part in a query.
    pub fn validate(&self) -> Result<()> {
        for name in self.definition.parameter_names() {
            if !self.parameters.contains_key(name) {
                return Err(HqlError::filter_error(format!(
                    "Filter [{}] parameter [{}] value not set",
                    self.name(),
                    name
                )));
            }
        }
        Ok(())
    }

    fn check_declared(&self, name: &str) -> Result<()> {
        if self.definition.parameter_type(name).is_none() {
            return Err(HqlError::filter_error(format!(
                "Undefined filter parameter [{}] for filter [{}]",
                name,
                self.name()
            )));
        }
        Ok(())
    }
}
