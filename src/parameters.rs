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
//! Bind values and row selection handed to a plan at execution time.
//!
use std::fmt;
use std::time::Duration;

use hqlplan_core::{HqlValue, IntoHqlValue};
use indexmap::IndexMap;

/// Offset, limit and driver hints of one execution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RowSelection {
    first_row: Option<usize>,
    max_rows: Option<usize>,
    timeout: Option<Duration>,
    fetch_size: Option<usize>,
}

impl RowSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_first_row(mut self, first_row: usize) -> Self {
        self.first_row = Some(first_row);
        self
    }

    pub fn set_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    pub fn set_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn set_fetch_size(mut self, fetch_size: usize) -> Self {
        self.fetch_size = Some(fetch_size);
        self
    }

    pub fn first_row(&self) -> Option<usize> {
        self.first_row
    }

    pub fn max_rows(&self) -> Option<usize> {
        self.max_rows
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn fetch_size(&self) -> Option<usize> {
        self.fetch_size
    }

    pub fn defines_limits(&self) -> bool {
        self.max_rows.is_some() || self.first_row.map_or(false, |first| first > 0)
    }

    /// The same hints without offset and limit.
    pub fn without_limits(&self) -> Self {
        Self {
            first_row: None,
            max_rows: None,
            timeout: self.timeout,
            fetch_size: self.fetch_size,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryParameters {
    positional_values: Vec<HqlValue>,
    named_values: IndexMap<String, HqlValue>,
    row_selection: Option<RowSelection>,
    callable: bool,
}

impl QueryParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_positional<V: IntoHqlValue>(mut self, value: V) -> Self {
        self.positional_values.push(value.into_value());
        self
    }

    pub fn set_named<N: Into<String>, V: IntoHqlValue>(mut self, name: N, value: V) -> Self {
        self.named_values.insert(name.into(), value.into_value());
        self
    }

    pub fn set_row_selection(mut self, selection: RowSelection) -> Self {
        self.row_selection = Some(selection);
        self
    }

    pub fn set_callable(mut self, callable: bool) -> Self {
        self.callable = callable;
        self
    }

    pub fn positional_values(&self) -> &[HqlValue] {
        &self.positional_values
    }

    pub fn named_values(&self) -> &IndexMap<String, HqlValue> {
        &self.named_values
    }

    pub fn named_value(&self, name: &str) -> Option<&HqlValue> {
        self.named_values.get(name)
    }

    pub fn row_selection(&self) -> Option<&RowSelection> {
        self.row_selection.as_ref()
    }

    pub fn has_row_selection(&self) -> bool {
        self.row_selection.is_some()
    }

    pub fn is_callable(&self) -> bool {
        self.callable
    }

    /// Copy of these parameters executed under a different row selection.
    pub fn create_copy_using(&self, selection: Option<RowSelection>) -> Self {
        Self {
            positional_values: self.positional_values.clone(),
            named_values: self.named_values.clone(),
            row_selection: selection,
            callable: self.callable,
        }
    }
}

impl fmt::Display for QueryParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.positional_values.is_empty() && self.named_values.is_empty() {
            return write!(f, "==> [Hql]  Parameters: None");
        }
        let positional = self
            .positional_values
            .iter()
            .map(|v| format!("{}({})", v, v.type_name()));
        let named = self
            .named_values
            .iter()
            .map(|(name, v)| format!(":{}={}({})", name, v, v.type_name()));
        let params_str = positional.chain(named).collect::<Vec<_>>().join(", ");
        write!(f, "==> [Hql]  Parameters: {}", params_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defines_limits() {
        assert!(!RowSelection::new().defines_limits());
        assert!(!RowSelection::new().set_first_row(0).set_fetch_size(50).defines_limits());
        assert!(RowSelection::new().set_first_row(3).defines_limits());
        assert!(RowSelection::new().set_max_rows(10).defines_limits());
    }

    #[test]
    fn test_copy_strips_limits() {
        let params = QueryParameters::new()
            .add_positional(7)
            .set_named("name", "O'Brien")
            .set_row_selection(RowSelection::new().set_first_row(1).set_max_rows(2).set_fetch_size(25));
        let stripped = params.create_copy_using(params.row_selection().map(RowSelection::without_limits));
        let selection = stripped.row_selection().unwrap();
        assert!(!selection.defines_limits());
        assert_eq!(selection.fetch_size(), Some(25));
        assert_eq!(stripped.positional_values(), params.positional_values());
        assert_eq!(
            params.to_string(),
            "==> [Hql]  Parameters: 7(int), :name='O''Brien'(text)"
        );
    }
}
