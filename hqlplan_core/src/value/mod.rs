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

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use uuid::Uuid;

mod to_value;

pub use to_value::*;

/// Bind values, filter parameter values and result tuples.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum HqlValue {
    #[default]
    Null,
    Bool(bool),
    Int(i32),
    Bigint(i64),
    Double(f64),
    Blob(Vec<u8>),
    Char(char),
    Text(String),
    Json(JsonValue),
    Uuid(Uuid),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    /// A materialized entity or component, attribute name to value.
    Object(IndexMap<String, HqlValue>),
    /// Multi-valued bind parameter, or a projection tuple.
    List(Vec<HqlValue>),
}

impl HqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, HqlValue::Null)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, HqlValue::List(_))
    }

    /// Number of values this binds: the list size for multi-valued parameters, otherwise 1.
    pub fn cardinality(&self) -> usize {
        match self {
            HqlValue::List(list) => list.len(),
            _ => 1,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HqlValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            HqlValue::Int(v) => Some(*v as i64),
            HqlValue::Bigint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            HqlValue::Null => "null",
            HqlValue::Bool(_) => "bool",
            HqlValue::Int(_) => "int",
            HqlValue::Bigint(_) => "bigint",
            HqlValue::Double(_) => "double",
            HqlValue::Blob(_) => "blob",
            HqlValue::Char(_) => "char",
            HqlValue::Text(_) => "text",
            HqlValue::Json(_) => "json",
            HqlValue::Uuid(_) => "uuid",
            HqlValue::Date(_) => "date",
            HqlValue::Time(_) => "time",
            HqlValue::DateTime(_) => "datetime",
            HqlValue::Object(_) => "object",
            HqlValue::List(_) => "list",
        }
    }
}

impl fmt::Display for HqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HqlValue::Null => write!(f, "null"),
            HqlValue::Bool(b) => write!(f, "{}", b),
            HqlValue::Int(n) => write!(f, "{}", n),
            HqlValue::Bigint(n) => write!(f, "{}", n),
            HqlValue::Double(n) => write!(f, "{:.6}", n),
            HqlValue::Char(c) => write!(f, "'{}'", c),
            HqlValue::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            HqlValue::Json(json) => {
                let json_str = serde_json::to_string(json).unwrap_or_else(|_| "{}".to_string());
                if json_str.len() > 50 {
                    let cut = json_str.char_indices().nth(47).map_or(json_str.len(), |(i, _)| i);
                    write!(f, "JSON '{}...'", &json_str[..cut])
                } else {
                    write!(f, "JSON '{}'", json_str)
                }
            }
            HqlValue::Uuid(uuid) => write!(f, "UUID '{}'", uuid),
            HqlValue::Date(date) => write!(f, "DATE '{}'", date.format("%Y-%m-%d")),
            HqlValue::Time(time) => write!(f, "TIME '{}'", time.format("%H:%M:%S%.3f")),
            HqlValue::DateTime(datetime) => {
                write!(f, "DATETIME '{}'", datetime.format("%Y-%m-%d %H:%M:%S"))
            }
            HqlValue::Blob(blob) => write!(f, "BLOB({} bytes)", blob.len()),
            HqlValue::Object(obj) => write!(f, "OBJECT({} fields)", obj.len()),
            HqlValue::List(list) => {
                if list.len() <= 3 {
                    let items = list.iter().map(ToString::to_string).collect::<Vec<_>>();
                    write!(f, "[{}]", items.join(", "))
                } else {
                    write!(f, "[{} items]", list.len())
                }
            }
        }
    }
}
