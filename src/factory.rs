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
//! Shared, immutable services a plan is built against.
//!
use std::sync::Arc;

use indexmap::IndexMap;

use crate::config::HqlConfig;
use crate::errors::{HqlError, Result};
use crate::filter::{Filter, FilterDefinition};
use crate::plan::native::{NativeQueryInterpreter, StandardNativeQueryInterpreter};
use crate::splitter::{PolymorphicQuerySplitter, QuerySplitter};
use crate::statistics::{ConcurrentStatistics, StatisticsImplementor};
use crate::translator::QueryTranslatorFactory;

pub struct SessionFactory {
    config: HqlConfig,
    translator_factory: Arc<dyn QueryTranslatorFactory>,
    splitter: Arc<dyn QuerySplitter>,
    native_interpreter: Arc<dyn NativeQueryInterpreter>,
    statistics: Arc<dyn StatisticsImplementor>,
    filter_definitions: IndexMap<String, Arc<FilterDefinition>>,
}

impl SessionFactory {
    pub fn builder(translator_factory: Arc<dyn QueryTranslatorFactory>) -> SessionFactoryBuilder {
        SessionFactoryBuilder {
            config: HqlConfig::default(),
            translator_factory,
            splitter: None,
            native_interpreter: None,
            statistics: None,
            filter_definitions: IndexMap::new(),
        }
    }

    pub fn config(&self) -> &HqlConfig {
        &self.config
    }

    pub fn translator_factory(&self) -> &dyn QueryTranslatorFactory {
        self.translator_factory.as_ref()
    }

    pub fn query_splitter(&self) -> &dyn QuerySplitter {
        self.splitter.as_ref()
    }

    pub fn native_query_interpreter(&self) -> &dyn NativeQueryInterpreter {
        self.native_interpreter.as_ref()
    }

    pub fn statistics(&self) -> &dyn StatisticsImplementor {
        self.statistics.as_ref()
    }

    pub fn filter_definition(&self, name: &str) -> Option<&Arc<FilterDefinition>> {
        self.filter_definitions.get(name)
    }

    /// A fresh, unbound instance of the named filter.
    pub fn enable_filter(&self, name: &str) -> Result<Filter> {
        self.filter_definition(name)
            .map(|definition| Filter::new(definition.clone()))
            .ok_or_else(|| HqlError::filter_error(format!("No such filter configured [{}]", name)))
    }
}

pub struct SessionFactoryBuilder {
    config: HqlConfig,
    translator_factory: Arc<dyn QueryTranslatorFactory>,
    splitter: Option<Arc<dyn QuerySplitter>>,
    native_interpreter: Option<Arc<dyn NativeQueryInterpreter>>,
    statistics: Option<Arc<dyn StatisticsImplementor>>,
    filter_definitions: IndexMap<String, Arc<FilterDefinition>>,
}

impl SessionFactoryBuilder {
    pub fn config(mut self, config: HqlConfig) -> Self {
        self.config = config;
        self
    }

    pub fn splitter(mut self, splitter: Arc<dyn QuerySplitter>) -> Self {
        self.splitter = Some(splitter);
        self
    }

    pub fn native_interpreter(mut self, interpreter: Arc<dyn NativeQueryInterpreter>) -> Self {
        self.native_interpreter = Some(interpreter);
        self
    }

    pub fn statistics(mut self, statistics: Arc<dyn StatisticsImplementor>) -> Self {
        self.statistics = Some(statistics);
        self
    }

    pub fn filter_definition(mut self, definition: FilterDefinition) -> Self {
        self.filter_definitions
            .insert(definition.name().to_string(), Arc::new(definition));
        self
    }

    pub fn build(self) -> Result<SessionFactory> {
        self.config.validate()?;
        let statistics_enabled = self.config.statistics_enabled();
        Ok(SessionFactory {
            config: self.config,
            translator_factory: self.translator_factory,
            splitter: self
                .splitter
                .unwrap_or_else(|| Arc::new(PolymorphicQuerySplitter::new())),
            native_interpreter: self
                .native_interpreter
                .unwrap_or_else(|| Arc::new(StandardNativeQueryInterpreter)),
            statistics: self
                .statistics
                .unwrap_or_else(|| Arc::new(ConcurrentStatistics::new(statistics_enabled))),
            filter_definitions: self.filter_definitions,
        })
    }
}
