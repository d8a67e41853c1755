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
//! Common Errors.
//!
use std::fmt;

use hqlplan_core::HqlDataError;

pub type Result<T> = std::result::Result<T, HqlError>;

#[derive(Debug, Clone, PartialEq)]
pub enum HqlError {
    /// Parameter syntax and parameter lookup failures.
    Data(HqlDataError),
    /// Operations the plan refuses to attempt, e.g. scrolling a polymorphic query.
    QueryError(String),
    /// Translator and recognizer disagree on the ordinal parameter count.
    ParameterMismatch { expected: usize, found: usize },
    /// Compilation failures reported by a translator, passed through unchanged.
    MappingError(String),
    Unsupported(String),
    FilterError(String),
    ConfigError(String),
    ExecutionError(String),
}

impl HqlError {
    pub fn query_error<T: Into<String>>(err: T) -> Self {
        Self::QueryError(err.into())
    }

    pub fn mapping_error<T: Into<String>>(err: T) -> Self {
        Self::MappingError(err.into())
    }

    pub fn filter_error<T: Into<String>>(err: T) -> Self {
        Self::FilterError(err.into())
    }

    pub fn execution_error<T: Into<String>>(err: T) -> Self {
        Self::ExecutionError(err.into())
    }

    pub fn config_error<T: Into<String>>(err: T) -> Self {
        Self::ConfigError(err.into())
    }
}

impl fmt::Display for HqlError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HqlError::Data(err) => err.fmt(f),
            HqlError::QueryError(err) => write!(f, "Query Error: {}", err),
            HqlError::ParameterMismatch { expected, found } => write!(
                f,
                "ordinal parameter mismatch: translator expects {} but query declares {}",
                expected, found
            ),
            HqlError::MappingError(err) => write!(f, "Mapping Error: {}", err),
            HqlError::Unsupported(err) => write!(f, "Unsupported: {}", err),
            HqlError::FilterError(err) => write!(f, "Filter Error: {}", err),
            HqlError::ConfigError(err) => write!(f, "Config Error: {}", err),
            HqlError::ExecutionError(err) => write!(f, "Execution Error: {}", err),
        }
    }
}

impl std::error::Error for HqlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HqlError::Data(err) => Some(err),
            _ => None,
        }
    }
}

impl From<HqlDataError> for HqlError {
    fn from(err: HqlDataError) -> Self {
        HqlError::Data(err)
    }
}

impl From<serde_json::Error> for HqlError {
    fn from(err: serde_json::Error) -> Self {
        HqlError::ConfigError(err.to_string())
    }
}
