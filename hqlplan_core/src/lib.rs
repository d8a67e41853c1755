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

//! Core building blocks of `hqlplan`.
//!
//! *   the parameter recognizer that scans HQL / native SQL for `?`, `?1` and `:name` markers;
//! *   the location tracker and immutable parameter metadata built on top of it;
//! *   the value model used for bind values, filter values and result tuples.

#![deny(clippy::all)]

mod error;
mod value;
mod types;
mod param;

#[doc(inline)]
pub use error::*;
#[doc(inline)]
pub use value::*;
#[doc(inline)]
pub use types::*;
#[doc(inline)]
pub use param::*;
pub use indexmap;
