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
use serde::{Deserialize, Serialize};

/// Expected type of a bind parameter or a select-clause return.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Serialize, Deserialize)]
pub enum SqlType {
    Bool,
    Tinyint,
    Smallint,
    Int,
    Bigint,
    Float,
    Double,
    Numeric,
    Blob,
    Char,
    Varchar,
    Text,
    Json,
    Uuid,
    Date,
    Time,
    Timestamp,
    /// An entity-valued return or parameter, by entity name.
    Entity(String),
    Array(Box<SqlType>),
}

impl SqlType {
    pub fn is_array_type(&self) -> bool {
        matches!(self, SqlType::Array(_))
    }

    pub fn is_entity_type(&self) -> bool {
        matches!(self, SqlType::Entity(_))
    }

    pub fn is_integer_type(&self) -> bool {
        matches!(self, SqlType::Tinyint | SqlType::Smallint | SqlType::Int | SqlType::Bigint)
    }

    pub fn is_decimal_type(&self) -> bool {
        matches!(self, SqlType::Float | SqlType::Double | SqlType::Numeric)
    }

    pub fn name(&self) -> String {
        match self {
            SqlType::Bool => "bool".into(),
            SqlType::Tinyint => "tinyint".into(),
            SqlType::Smallint => "smallint".into(),
            SqlType::Int => "int".into(),
            SqlType::Bigint => "bigint".into(),
            SqlType::Float => "float".into(),
            SqlType::Double => "double".into(),
            SqlType::Numeric => "numeric".into(),
            SqlType::Blob => "blob".into(),
            SqlType::Char => "char".into(),
            SqlType::Varchar => "varchar".into(),
            SqlType::Text => "text".into(),
            SqlType::Json => "json".into(),
            SqlType::Uuid => "uuid".into(),
            SqlType::Date => "date".into(),
            SqlType::Time => "time".into(),
            SqlType::Timestamp => "timestamp".into(),
            SqlType::Entity(name) => name.clone(),
            SqlType::Array(ty) => format!("{}[]", ty.name()),
        }
    }
}

impl std::fmt::Display for SqlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}
