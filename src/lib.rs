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

//! Query plan cache and execution pipeline for HQL.
//!
//! Put the desired version of the crate into the `dependencies` section of your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! hqlplan = "0.1.0"
//! ```
//!
//! ## Pieces.
//!
//! * ```ParameterParser``` - finds `?`, `?1` and `:name` markers outside of literals and comments.
//! * ```ParameterMetadata``` - immutable ordinal and named parameter descriptors.
//! * ```HqlQueryPlan``` - one translator per concrete query, with list/iterate/scroll/update.
//! * ```QueryPlanCache``` - bounded cache keyed by query text, shallow flag and filter shape.
//! * ```NativeSqlQueryPlan``` - native statements rewritten to JDBC markers.
//!
//! Compiling a query into SQL is left to a [`QueryTranslatorFactory`] supplied by the caller.
//!
//! ## Example
//!
//! ```rust
//! use hqlplan::*;
//!
//! let recognizer = ParamLocationRecognizer::parse_locations(
//!     "from Cat c where c.name = :name and c.age > ? -- :ignored",
//! ).unwrap();
//! assert_eq!(recognizer.ordinal_parameter_locations().len(), 1);
//! assert!(recognizer.named_parameter_descriptions().contains_key("name"));
//! assert!(!recognizer.named_parameter_descriptions().contains_key("ignored"));
//!
//! let cfg = HqlConfig::new()
//!     .set_query_plan_cache_max_size(512)
//!     .set_eviction(EvictionPolicy::Lru)
//!     .set_query_substitutions("true 1, false 0");
//! assert!(cfg.validate().is_ok());
//! ```
//!
//! ```ignore
//! let factory = Arc::new(SessionFactory::builder(Arc::new(MyTranslatorFactory)).config(cfg).build()?);
//! let cache = QueryPlanCache::new(factory.clone());
//! let plan = cache.get_hql_query_plan("from Animal a where a.age > ?", false, &EnabledFilters::new())?;
//! let rows = plan.perform_list(&QueryParameters::new().add_positional(3), &session)?;
//! ```

mod bounded;
mod config;
mod errors;
mod factory;
mod filter;
mod parameters;
mod plan;
mod splitter;
mod statistics;
mod translator;

pub mod prelude;

#[doc(inline)]
pub use bounded::{BoundedConcurrentMap, XxBuildHasher};
#[doc(inline)]
pub use config::*;
#[doc(inline)]
pub use errors::*;
#[doc(inline)]
pub use factory::*;
#[doc(inline)]
pub use filter::*;
#[doc(inline)]
pub use parameters::*;
#[doc(inline)]
pub use plan::*;
#[doc(inline)]
pub use splitter::*;
#[doc(inline)]
pub use statistics::*;
#[doc(inline)]
pub use translator::*;

pub use hqlplan_core as core;
pub use hqlplan_core::*;
