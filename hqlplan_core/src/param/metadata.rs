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

use crate::{HqlDataError, ParamLocationRecognizer, SqlType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrdinalParameterDescriptor {
    ordinal_position: usize,
    expected_type: Option<SqlType>,
    source_location: usize,
}

impl OrdinalParameterDescriptor {
    pub fn new(ordinal_position: usize, expected_type: Option<SqlType>, source_location: usize) -> Self {
        Self {
            ordinal_position,
            expected_type,
            source_location,
        }
    }

    pub fn ordinal_position(&self) -> usize {
        self.ordinal_position
    }

    pub fn expected_type(&self) -> Option<&SqlType> {
        self.expected_type.as_ref()
    }

    pub fn source_location(&self) -> usize {
        self.source_location
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedParameterDescriptor {
    name: String,
    expected_type: Option<SqlType>,
    source_locations: Vec<usize>,
    jpa_style: bool,
}

impl NamedParameterDescriptor {
    pub fn new<T: Into<String>>(
        name: T,
        expected_type: Option<SqlType>,
        source_locations: Vec<usize>,
        jpa_style: bool,
    ) -> Self {
        Self {
            name: name.into(),
            expected_type,
            source_locations,
            jpa_style,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expected_type(&self) -> Option<&SqlType> {
        self.expected_type.as_ref()
    }

    pub fn source_locations(&self) -> &[usize] {
        &self.source_locations
    }

    pub fn is_jpa_style(&self) -> bool {
        self.jpa_style
    }
}

/// What a compiled translator knows about the parameters of its query.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterTranslations {
    supports_ordinal_parameter_metadata: bool,
    ordinal_expected_types: Vec<Option<SqlType>>,
    named_expected_types: IndexMap<String, Option<SqlType>>,
}

impl Default for ParameterTranslations {
    fn default() -> Self {
        Self {
            supports_ordinal_parameter_metadata: true,
            ordinal_expected_types: Vec::new(),
            named_expected_types: IndexMap::new(),
        }
    }
}

impl ParameterTranslations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translations that cannot vouch for the ordinal parameter count.
    pub fn without_ordinal_metadata() -> Self {
        Self {
            supports_ordinal_parameter_metadata: false,
            ..Self::default()
        }
    }

    pub fn ordinal(mut self, expected_type: Option<SqlType>) -> Self {
        self.ordinal_expected_types.push(expected_type);
        self
    }

    pub fn named<T: Into<String>>(mut self, name: T, expected_type: Option<SqlType>) -> Self {
        self.named_expected_types.insert(name.into(), expected_type);
        self
    }

    pub fn supports_ordinal_parameter_metadata(&self) -> bool {
        self.supports_ordinal_parameter_metadata
    }

    pub fn ordinal_parameter_count(&self) -> usize {
        self.ordinal_expected_types.len()
    }

    /// Zero-based index.
    pub fn ordinal_parameter_expected_type(&self, index: usize) -> Option<SqlType> {
        self.ordinal_expected_types.get(index).cloned().flatten()
    }

    pub fn named_parameter_names(&self) -> impl Iterator<Item = &String> {
        self.named_expected_types.keys()
    }

    pub fn named_parameter_expected_type(&self, name: &str) -> Option<SqlType> {
        self.named_expected_types.get(name).cloned().flatten()
    }
}

/// Immutable view of the ordinal and named parameters of one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterMetadata {
    ordinal_descriptors: Vec<OrdinalParameterDescriptor>,
    named_descriptors: IndexMap<String, NamedParameterDescriptor>,
    ordinal_base: usize,
}

impl Default for ParameterMetadata {
    fn default() -> Self {
        Self::empty()
    }
}

impl ParameterMetadata {
    pub fn new(
        ordinal_descriptors: &[OrdinalParameterDescriptor],
        named_descriptors: &IndexMap<String, NamedParameterDescriptor>,
    ) -> Self {
        Self {
            ordinal_descriptors: ordinal_descriptors.to_vec(),
            named_descriptors: named_descriptors.clone(),
            ordinal_base: 1,
        }
    }

    pub fn empty() -> Self {
        Self {
            ordinal_descriptors: Vec::new(),
            named_descriptors: IndexMap::new(),
            ordinal_base: 1,
        }
    }

    /// Build descriptors from a location journal, taking expected types from the
    /// translator when one is available. Ordinal positions are labelled from 0
    /// instead of 1 when `ordinal_zero_based` is set.
    pub fn from_locations(
        recognizer: &ParamLocationRecognizer,
        translations: Option<&ParameterTranslations>,
        ordinal_zero_based: bool,
    ) -> Self {
        let ordinal_base = if ordinal_zero_based { 0 } else { 1 };
        let ordinal_descriptors = recognizer
            .ordinal_parameter_locations()
            .iter()
            .enumerate()
            .map(|(index, &location)| {
                let expected_type = translations.and_then(|t| t.ordinal_parameter_expected_type(index));
                OrdinalParameterDescriptor::new(index + ordinal_base, expected_type, location)
            })
            .collect();
        let named_descriptors = recognizer
            .named_parameter_descriptions()
            .iter()
            .map(|(name, description)| {
                let expected_type = translations.and_then(|t| t.named_parameter_expected_type(name));
                let descriptor = NamedParameterDescriptor::new(
                    name.as_str(),
                    expected_type,
                    description.build_positions_array(),
                    description.is_jpa_style(),
                );
                (name.clone(), descriptor)
            })
            .collect();
        Self {
            ordinal_descriptors,
            named_descriptors,
            ordinal_base,
        }
    }

    pub fn ordinal_parameter_count(&self) -> usize {
        self.ordinal_descriptors.len()
    }

    pub fn ordinal_base(&self) -> usize {
        self.ordinal_base
    }

    pub fn has_parameters(&self) -> bool {
        !self.ordinal_descriptors.is_empty() || !self.named_descriptors.is_empty()
    }

    pub fn ordinal_parameter_descriptor(&self, position: usize) -> Result<&OrdinalParameterDescriptor, HqlDataError> {
        position
            .checked_sub(self.ordinal_base)
            .and_then(|index| self.ordinal_descriptors.get(index))
            .ok_or_else(|| HqlDataError::ordinal_out_of_range(position, self.ordinal_descriptors.len()))
    }

    pub fn ordinal_parameter_expected_type(&self, position: usize) -> Result<Option<&SqlType>, HqlDataError> {
        Ok(self.ordinal_parameter_descriptor(position)?.expected_type())
    }

    pub fn ordinal_parameter_source_location(&self, position: usize) -> Result<usize, HqlDataError> {
        Ok(self.ordinal_parameter_descriptor(position)?.source_location())
    }

    pub fn named_parameter_names(&self) -> impl Iterator<Item = &str> {
        self.named_descriptors.keys().map(String::as_str)
    }

    pub fn named_parameter_descriptor(&self, name: &str) -> Result<&NamedParameterDescriptor, HqlDataError> {
        self.named_descriptors
            .get(name)
            .ok_or_else(|| HqlDataError::named_parameter_not_found(name))
    }

    pub fn named_parameter_expected_type(&self, name: &str) -> Result<Option<&SqlType>, HqlDataError> {
        Ok(self.named_parameter_descriptor(name)?.expected_type())
    }

    pub fn named_parameter_source_locations(&self, name: &str) -> Result<&[usize], HqlDataError> {
        Ok(self.named_parameter_descriptor(name)?.source_locations())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(sql: &str) -> ParameterMetadata {
        let recognizer = ParamLocationRecognizer::parse_locations(sql).unwrap();
        let translations = ParameterTranslations::new()
            .ordinal(Some(SqlType::Bigint))
            .named("name", Some(SqlType::Varchar));
        ParameterMetadata::from_locations(&recognizer, Some(&translations), false)
    }

    #[test]
    fn test_ordinal_lookup_is_one_based() {
        let metadata = metadata("where id = ? and name = :name");
        assert_eq!(metadata.ordinal_parameter_count(), 1);
        let descriptor = metadata.ordinal_parameter_descriptor(1).unwrap();
        assert_eq!(descriptor.ordinal_position(), 1);
        assert_eq!(descriptor.source_location(), 11);
        assert_eq!(descriptor.expected_type(), Some(&SqlType::Bigint));
        assert_eq!(
            metadata.ordinal_parameter_descriptor(0).unwrap_err(),
            HqlDataError::ordinal_out_of_range(0, 1)
        );
        assert!(metadata.ordinal_parameter_descriptor(2).is_err());
    }

    #[test]
    fn test_named_lookup() {
        let metadata = metadata("where id = ? and name = :name");
        assert_eq!(metadata.named_parameter_expected_type("name").unwrap(), Some(&SqlType::Varchar));
        assert_eq!(metadata.named_parameter_source_locations("name").unwrap(), &[24]);
        assert_eq!(
            metadata.named_parameter_descriptor("missing").unwrap_err(),
            HqlDataError::named_parameter_not_found("missing")
        );
    }

    #[test]
    fn test_zero_based_ordinals() {
        let recognizer = ParamLocationRecognizer::parse_locations("values (?, ?)").unwrap();
        let metadata = ParameterMetadata::from_locations(&recognizer, None, true);
        assert_eq!(metadata.ordinal_parameter_descriptor(0).unwrap().source_location(), 8);
        assert_eq!(metadata.ordinal_parameter_descriptor(1).unwrap().source_location(), 11);
        assert!(metadata.ordinal_parameter_descriptor(2).is_err());
        assert_eq!(metadata.ordinal_parameter_expected_type(0).unwrap(), None);
    }

    #[test]
    fn test_construction_copies_inputs() {
        let mut named = IndexMap::new();
        named.insert("a".to_string(), NamedParameterDescriptor::new("a", None, vec![3], false));
        let ordinals = vec![OrdinalParameterDescriptor::new(1, None, 7)];
        let metadata = ParameterMetadata::new(&ordinals, &named);
        named.clear();
        assert!(metadata.named_parameter_descriptor("a").is_ok());
        assert!(metadata.has_parameters());
        assert!(!ParameterMetadata::empty().has_parameters());
    }
}
