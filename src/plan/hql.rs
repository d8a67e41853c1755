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
//! Plans for HQL queries and collection filters.
//!
use std::borrow::Cow;
use std::collections::{BTreeSet, HashSet};
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use hqlplan_core::{ParamLocationRecognizer, ParameterMetadata, ParameterTranslations};
use tracing::{debug, trace, warn};

use crate::errors::{HqlError, Result};
use crate::factory::SessionFactory;
use crate::filter::EnabledFilters;
use crate::parameters::{QueryParameters, RowSelection};
use crate::plan::iter::JoinedIterator;
use crate::plan::ReturnMetadata;
use crate::translator::{Row, RowIter, ScrollableResults, SessionContext, Translator};

/// Initial capacity of a result list when the row selection gives no better hint.
const DEFAULT_RESULT_SIZE: usize = 7;

/// Largest capacity reserved up front for a bounded result.
const MAX_REASONABLE_ALLOCATION: usize = 100;

/// A query compiled into one translator per concrete query.
///
/// Immutable once built and shared between sessions through the plan cache.
#[derive(Debug)]
pub struct HqlQueryPlan {
    source_query: String,
    translators: Vec<Translator>,
    sql_strings: Vec<String>,
    query_spaces: BTreeSet<String>,
    parameter_metadata: ParameterMetadata,
    return_metadata: Option<ReturnMetadata>,
    shallow: bool,
    enabled_filter_names: BTreeSet<String>,
}

impl HqlQueryPlan {
    pub fn new(hql: &str, shallow: bool, enabled_filters: &EnabledFilters, factory: &SessionFactory) -> Result<Self> {
        Self::build(hql, None, shallow, enabled_filters, factory)
    }

    fn build(
        hql: &str,
        collection_role: Option<&str>,
        shallow: bool,
        enabled_filters: &EnabledFilters,
        factory: &SessionFactory,
    ) -> Result<Self> {
        let concrete_queries = factory.query_splitter().concrete_queries(hql)?;
        let substitutions = factory.config().query_substitutions();
        let translator_factory = factory.translator_factory();

        let mut translators = Vec::with_capacity(concrete_queries.len());
        let mut query_spaces = BTreeSet::new();
        let mut sql_strings = Vec::new();
        for concrete_query in &concrete_queries {
            let mut translator = match collection_role {
                None => Translator::Query(translator_factory.create_query_translator(
                    hql,
                    concrete_query,
                    enabled_filters,
                    factory,
                )?),
                Some(_) => Translator::Filter(translator_factory.create_filter_translator(
                    hql,
                    concrete_query,
                    enabled_filters,
                    factory,
                )?),
            };
            translator.compile(collection_role, substitutions, shallow)?;
            query_spaces.extend(translator.query_spaces().iter().cloned());
            sql_strings.extend(translator.collect_sql_strings());
            translators.push(translator);
        }

        let (parameter_metadata, return_metadata) = match translators.first() {
            None => (ParameterMetadata::empty(), None),
            Some(first) => {
                let parameter_metadata = build_parameter_metadata(first.parameter_translations(), hql)?;
                let return_metadata = if first.is_manipulation_statement() {
                    None
                } else {
                    // Every plan gets its own copy of the return types.
                    Some(ReturnMetadata::new(
                        first.return_aliases().to_vec(),
                        first.return_types().to_vec(),
                    ))
                };
                (parameter_metadata, return_metadata)
            }
        };

        debug!(
            "compiled query plan for [{}] into {} translator(s), query spaces {:?}",
            hql,
            translators.len(),
            query_spaces
        );

        Ok(Self {
            source_query: hql.to_string(),
            translators,
            sql_strings,
            query_spaces,
            parameter_metadata,
            return_metadata,
            shallow,
            enabled_filter_names: enabled_filters.keys().cloned().collect(),
        })
    }

    pub fn source_query(&self) -> &str {
        &self.source_query
    }

    pub fn query_spaces(&self) -> &BTreeSet<String> {
        &self.query_spaces
    }

    pub fn translators(&self) -> &[Translator] {
        &self.translators
    }

    pub fn sql_strings(&self) -> &[String] {
        &self.sql_strings
    }

    pub fn parameter_metadata(&self) -> &ParameterMetadata {
        &self.parameter_metadata
    }

    /// `None` for insert, update and delete statements.
    pub fn return_metadata(&self) -> Option<&ReturnMetadata> {
        self.return_metadata.as_ref()
    }

    pub fn is_shallow(&self) -> bool {
        self.shallow
    }

    pub fn enabled_filter_names(&self) -> &BTreeSet<String> {
        &self.enabled_filter_names
    }

    /// Run every translator and combine their results.
    ///
    /// With more than one translator an offset or limit cannot be pushed down to each
    /// statement, so the translators run unbounded and the window is applied here over
    /// distinct rows. Processing stops as soon as the window is full.
    pub fn perform_list(&self, params: &QueryParameters, session: &dyn SessionContext) -> Result<Vec<Row>> {
        trace!("find: {}", self.source_query);
        trace!("{}", params);

        let selection = params.row_selection();
        let needs_limit = selection.map_or(false, RowSelection::defines_limits) && self.translators.len() > 1;
        let params_to_use = if needs_limit {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
            warn!(
                "{} ==> [Hql] firstResult/maxResults specified on polymorphic query; applying in memory: {}",
                timestamp, self.source_query
            );
            Cow::Owned(params.create_copy_using(selection.map(RowSelection::without_limits)))
        } else {
            Cow::Borrowed(params)
        };

        let first_row = selection.and_then(RowSelection::first_row).unwrap_or(0);
        let max_rows = selection.and_then(RowSelection::max_rows);
        let window_full = |len: usize| max_rows.map_or(false, |max| len >= max);

        let guessed_result_size = guess_result_size(selection);
        let mut combined = Vec::with_capacity(guessed_result_size);
        let mut distinction = HashSet::with_capacity(guessed_result_size);
        let mut included_count = 0;

        for translator in &self.translators {
            if needs_limit && window_full(combined.len()) {
                break;
            }
            let rows = translator.list(session, &params_to_use)?;
            if !needs_limit {
                combined.extend(rows);
                continue;
            }
            for row in rows {
                if !distinction.insert(IdentityKey(row.clone())) {
                    continue;
                }
                included_count += 1;
                if included_count <= first_row {
                    continue;
                }
                combined.push(row);
                if window_full(combined.len()) {
                    break;
                }
            }
        }
        Ok(combined)
    }

    /// Iterate the results of every translator in order without collecting them.
    pub fn perform_iterate(&self, params: &QueryParameters, session: &dyn SessionContext) -> Result<RowIter> {
        trace!("iterate: {}", self.source_query);
        trace!("{}", params);

        match self.translators.as_slice() {
            [] => Ok(Box::new(std::iter::empty())),
            [translator] => translator.iterate(session, params),
            translators => {
                let iterators = translators
                    .iter()
                    .map(|translator| translator.iterate(session, params))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Box::new(JoinedIterator::new(iterators)))
            }
        }
    }

    pub fn perform_scroll(
        &self,
        params: &QueryParameters,
        session: &dyn SessionContext,
    ) -> Result<Box<dyn ScrollableResults>> {
        trace!("scroll: {}", self.source_query);
        trace!("{}", params);

        let [translator] = self.translators.as_slice() else {
            return Err(HqlError::query_error("implicit polymorphism not supported for scroll() queries"));
        };
        let defines_limits = params.row_selection().map_or(false, RowSelection::defines_limits);
        if defines_limits && translator.contains_collection_fetches() {
            return Err(HqlError::query_error(
                "firstResult/maxResults not supported in conjunction with scroll() of a query containing collection fetches",
            ));
        }
        translator.scroll(session, params)
    }

    /// Execute a bulk statement, returning the rows affected over all translators.
    pub fn perform_execute_update(&self, params: &QueryParameters, session: &dyn SessionContext) -> Result<u64> {
        trace!("executeUpdate: {}", self.source_query);
        trace!("{}", params);

        if self.translators.len() > 1 {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
            warn!(
                "{} ==> [Hql] Manipulation query [{}] resulted in [{}] split queries",
                timestamp,
                self.source_query,
                self.translators.len()
            );
        }
        let mut result = 0;
        for translator in &self.translators {
            result += translator.execute_update(session, params)?;
        }
        Ok(result)
    }
}

/// A plan for a query over the elements of one collection role.
#[derive(Debug)]
pub struct FilterQueryPlan {
    plan: HqlQueryPlan,
    collection_role: String,
}

impl FilterQueryPlan {
    pub fn new(
        hql: &str,
        collection_role: &str,
        shallow: bool,
        enabled_filters: &EnabledFilters,
        factory: &SessionFactory,
    ) -> Result<Self> {
        let plan = HqlQueryPlan::build(hql, Some(collection_role), shallow, enabled_filters, factory)?;
        Ok(Self {
            plan,
            collection_role: collection_role.to_string(),
        })
    }

    pub fn collection_role(&self) -> &str {
        &self.collection_role
    }
}

impl Deref for FilterQueryPlan {
    type Target = HqlQueryPlan;

    fn deref(&self) -> &Self::Target {
        &self.plan
    }
}

/// Capacity to reserve for a result list bounded by `selection`.
pub fn guess_result_size(selection: Option<&RowSelection>) -> usize {
    if let Some(selection) = selection {
        let max_reasonable_allocation = selection.fetch_size().unwrap_or(MAX_REASONABLE_ALLOCATION);
        match (selection.max_rows(), selection.fetch_size()) {
            (Some(max_rows), _) if max_rows > 0 => return max_reasonable_allocation.min(max_rows),
            (_, Some(fetch_size)) if fetch_size > 0 => return fetch_size,
            _ => {}
        }
    }
    DEFAULT_RESULT_SIZE
}

/// Ordinal and named parameter descriptors of `hql`, typed by the first translator.
fn build_parameter_metadata(translations: &ParameterTranslations, hql: &str) -> Result<ParameterMetadata> {
    let recognizer = ParamLocationRecognizer::parse_locations(hql)?;
    let found = recognizer.ordinal_parameter_locations().len();
    if translations.supports_ordinal_parameter_metadata() && translations.ordinal_parameter_count() != found {
        return Err(HqlError::ParameterMismatch {
            expected: translations.ordinal_parameter_count(),
            found,
        });
    }
    Ok(ParameterMetadata::from_locations(&recognizer, Some(translations), false))
}

/// Compares rows by allocation, not by value.
struct IdentityKey(Row);

impl PartialEq for IdentityKey {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for IdentityKey {}

impl Hash for IdentityKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.0).hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_result_size() {
        assert_eq!(guess_result_size(None), 7);
        assert_eq!(guess_result_size(Some(&RowSelection::new())), 7);
        assert_eq!(guess_result_size(Some(&RowSelection::new().set_max_rows(20))), 20);
        assert_eq!(guess_result_size(Some(&RowSelection::new().set_max_rows(5_000))), 100);
        assert_eq!(
            guess_result_size(Some(&RowSelection::new().set_max_rows(5_000).set_fetch_size(250))),
            250
        );
        assert_eq!(guess_result_size(Some(&RowSelection::new().set_fetch_size(30))), 30);
        assert_eq!(guess_result_size(Some(&RowSelection::new().set_max_rows(0))), 7);
    }

    #[test]
    fn test_parameter_metadata_mismatch() {
        let translations = ParameterTranslations::new().ordinal(None);
        let err = build_parameter_metadata(&translations, "from Cat c where c.age > ? and c.weight < ?").unwrap_err();
        assert_eq!(err, HqlError::ParameterMismatch { expected: 1, found: 2 });

        let unchecked = ParameterTranslations::without_ordinal_metadata();
        let metadata = build_parameter_metadata(&unchecked, "from Cat c where c.age > ? and c.name = :name").unwrap();
        assert_eq!(metadata.ordinal_parameter_count(), 1);
        assert!(metadata.named_parameter_descriptor("name").is_ok());
    }

    #[test]
    fn test_identity_key() {
        let row: Row = Arc::new(hqlplan_core::HqlValue::Int(1));
        let same_value: Row = Arc::new(hqlplan_core::HqlValue::Int(1));
        let mut seen = HashSet::new();
        assert!(seen.insert(IdentityKey(row.clone())));
        assert!(!seen.insert(IdentityKey(row)));
        assert!(seen.insert(IdentityKey(same_value)));
    }
}
