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
use serde::{Deserialize, Serialize};

use crate::errors::{HqlError, Result};

/// Eviction policy of each bounded cache segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    Lru,
    #[default]
    Lirs,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HqlConfig {
    query_plan_cache_max_size: usize,
    parameter_metadata_max_size: usize,
    concurrency_level: usize,
    eviction: EvictionPolicy,
    statistics_enabled: bool,
    query_substitutions: IndexMap<String, String>,
}

impl Default for HqlConfig {
    fn default() -> Self {
        HqlConfig {
            query_plan_cache_max_size: 2048,
            parameter_metadata_max_size: 128,
            concurrency_level: 20,
            eviction: EvictionPolicy::Lirs,
            statistics_enabled: false,
            query_substitutions: IndexMap::new(),
        }
    }
}

impl HqlConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from JSON; absent keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: HqlConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.query_plan_cache_max_size == 0 {
            return Err(HqlError::config_error("query_plan_cache_max_size must be greater than 0"));
        }
        if self.parameter_metadata_max_size == 0 {
            return Err(HqlError::config_error("parameter_metadata_max_size must be greater than 0"));
        }
        if self.concurrency_level == 0 {
            return Err(HqlError::config_error("concurrency_level must be greater than 0"));
        }
        Ok(())
    }

    pub fn set_query_plan_cache_max_size(mut self, max_size: usize) -> Self {
        self.query_plan_cache_max_size = max_size;
        self
    }

    pub fn query_plan_cache_max_size(&self) -> usize {
        self.query_plan_cache_max_size
    }

    pub fn set_parameter_metadata_max_size(mut self, max_size: usize) -> Self {
        self.parameter_metadata_max_size = max_size;
        self
    }

    pub fn parameter_metadata_max_size(&self) -> usize {
        self.parameter_metadata_max_size
    }

    pub fn set_concurrency_level(mut self, concurrency_level: usize) -> Self {
        self.concurrency_level = concurrency_level;
        self
    }

    pub fn concurrency_level(&self) -> usize {
        self.concurrency_level
    }

    pub fn set_eviction(mut self, eviction: EvictionPolicy) -> Self {
        self.eviction = eviction;
        self
    }

    pub fn eviction(&self) -> EvictionPolicy {
        self.eviction
    }

    pub fn set_statistics_enabled(mut self, enabled: bool) -> Self {
        self.statistics_enabled = enabled;
        self
    }

    pub fn statistics_enabled(&self) -> bool {
        self.statistics_enabled
    }

    pub fn set_query_substitution<K: Into<String>, V: Into<String>>(mut self, token: K, replacement: V) -> Self {
        self.query_substitutions.insert(token.into(), replacement.into());
        self
    }

    /// Replace the substitutions with the ones described by `spec`, e.g. `"true 1, false 0"`
    /// or `"yes=1, no=0"`.
    pub fn set_query_substitutions(mut self, spec: &str) -> Self {
        self.query_substitutions = parse_query_substitutions(spec);
        self
    }

    pub fn query_substitutions(&self) -> &IndexMap<String, String> {
        &self.query_substitutions
    }
}

/// Comma separated `token replacement` pairs; `=` may stand in for the space.
/// A token without a replacement maps to the empty string.
pub fn parse_query_substitutions(spec: &str) -> IndexMap<String, String> {
    spec.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let mut parts = pair.splitn(2, |c: char| c == '=' || c.is_whitespace());
            let token = parts.next().unwrap_or_default().trim().to_string();
            let replacement = parts.next().unwrap_or_default().trim().to_string();
            (token, replacement)
        })
        .collect()
}
