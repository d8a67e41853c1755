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
//! Compiled query plans and the cache that shares them.
//!
pub mod cache;
pub mod hql;
pub mod iter;
pub mod native;

use hqlplan_core::SqlType;

pub use cache::*;
pub use hql::*;
pub use iter::*;
pub use native::*;

/// Aliases and types of the values a select query returns.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReturnMetadata {
    return_aliases: Vec<String>,
    return_types: Vec<SqlType>,
}

impl ReturnMetadata {
    pub fn new(return_aliases: Vec<String>, return_types: Vec<SqlType>) -> Self {
        Self {
            return_aliases,
            return_types,
        }
    }

    pub fn return_aliases(&self) -> &[String] {
        &self.return_aliases
    }

    pub fn return_types(&self) -> &[SqlType] {
        &self.return_types
    }
}
