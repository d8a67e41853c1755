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
use indexmap::IndexMap;

use crate::{HqlDataError, ParameterParser, ParameterRecognizer};

/// Journal of where one named (or JPA-positional) parameter occurs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedParameterDescription {
    jpa_style: bool,
    positions: Vec<usize>,
}

impl NamedParameterDescription {
    fn new(jpa_style: bool) -> Self {
        Self {
            jpa_style,
            positions: Vec::new(),
        }
    }

    pub fn is_jpa_style(&self) -> bool {
        self.jpa_style
    }

    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn build_positions_array(&self) -> Vec<usize> {
        self.positions.clone()
    }
}

/// Tracks ordinal and named parameter locations while [`ParameterParser`] scans a query.
#[derive(Debug, Clone, Default)]
pub struct ParamLocationRecognizer {
    named_parameter_descriptions: IndexMap<String, NamedParameterDescription>,
    ordinal_parameter_locations: Vec<usize>,
}

impl ParamLocationRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `query` and return the finished journal.
    pub fn parse_locations(query: &str) -> Result<Self, HqlDataError> {
        let mut recognizer = Self::new();
        ParameterParser::parse(query, &mut recognizer)?;
        Ok(recognizer)
    }

    /// Named parameters in order of first appearance.
    pub fn named_parameter_descriptions(&self) -> &IndexMap<String, NamedParameterDescription> {
        &self.named_parameter_descriptions
    }

    /// Ordinal parameter offsets; list order is parameter index order.
    pub fn ordinal_parameter_locations(&self) -> &[usize] {
        &self.ordinal_parameter_locations
    }

    pub fn is_empty(&self) -> bool {
        self.named_parameter_descriptions.is_empty() && self.ordinal_parameter_locations.is_empty()
    }

    fn record_named(&mut self, name: &str, position: usize, jpa_style: bool) {
        self.named_parameter_descriptions
            .entry(name.to_string())
            .or_insert_with(|| NamedParameterDescription::new(jpa_style))
            .positions
            .push(position);
    }
}

impl ParameterRecognizer for ParamLocationRecognizer {
    fn out_parameter(&mut self, _position: usize) {
        // don't care...
    }

    fn ordinal_parameter(&mut self, position: usize) {
        self.ordinal_parameter_locations.push(position);
    }

    fn named_parameter(&mut self, name: &str, position: usize) {
        self.record_named(name, position, false);
    }

    fn jpa_positional_parameter(&mut self, name: &str, position: usize) {
        self.record_named(name, position, true);
    }

    fn other(&mut self, _character: char) {
        // don't care...
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinal_locations_in_order() {
        let recognizer = ParamLocationRecognizer::parse_locations("where a = ? and b = ? or c in (?)").unwrap();
        assert_eq!(recognizer.ordinal_parameter_locations(), &[10, 20, 31]);
        assert!(recognizer.named_parameter_descriptions().is_empty());
    }

    #[test]
    fn test_repeated_named_parameter_collects_positions() {
        let recognizer = ParamLocationRecognizer::parse_locations("where x = :a or y = :b or z = :a").unwrap();
        let named = recognizer.named_parameter_descriptions();
        assert_eq!(named.len(), 2);
        assert_eq!(named["a"].positions(), &[10, 30]);
        assert_eq!(named["b"].positions(), &[20]);
        assert!(!named["a"].is_jpa_style());
        assert_eq!(named.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_jpa_positional_is_recorded_by_label() {
        let recognizer = ParamLocationRecognizer::parse_locations("where x = ?1 and y = ?1").unwrap();
        let description = &recognizer.named_parameter_descriptions()["1"];
        assert!(description.is_jpa_style());
        assert_eq!(description.build_positions_array(), vec![10, 21]);
    }

    #[test]
    fn test_output_parameter_is_not_ordinal() {
        let recognizer = ParamLocationRecognizer::parse_locations("{?=call proc(?)}").unwrap();
        assert_eq!(recognizer.ordinal_parameter_locations(), &[13]);
    }
}
