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

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum HqlDataError {
    /// Malformed parameter syntax, carrying the offending query.
    ParseError {
        message: String,
        query: String,
    },
    OrdinalOutOfRange {
        position: usize,
        count: usize,
    },
    NamedParameterNotFound(String),
    ConversionError(String),
}

impl HqlDataError {
    pub fn parse_error<T: Into<String>, Q: Into<String>>(message: T, query: Q) -> Self {
        let message = message.into();
        let query = query.into();
        Self::ParseError { message, query }
    }

    pub fn conversion_error<T: Into<String>>(err: T) -> Self {
        Self::ConversionError(err.into())
    }

    pub fn ordinal_out_of_range(position: usize, count: usize) -> Self {
        Self::OrdinalOutOfRange { position, count }
    }

    pub fn named_parameter_not_found<T: Into<String>>(name: T) -> Self {
        Self::NamedParameterNotFound(name.into())
    }

    /// Parse failures and lookup failures are both reported as parameter problems,
    /// conversions are not.
    pub fn is_parameter_error(&self) -> bool {
        !matches!(self, HqlDataError::ConversionError(_))
    }
}

impl fmt::Display for HqlDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HqlDataError::ParseError { message, query } => write!(f, "{message} [{query}]"),
            HqlDataError::OrdinalOutOfRange { position, count } => write!(
                f,
                "Position beyond number of declared ordinal parameters. Position: {position}, declared: {count}"
            ),
            HqlDataError::NamedParameterNotFound(name) => {
                write!(f, "could not locate named parameter [{name}]")
            }
            HqlDataError::ConversionError(e) => write!(f, "Conversion Data Error: {e}"),
        }
    }
}

impl std::error::Error for HqlDataError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_offender() {
        let err = HqlDataError::ordinal_out_of_range(3, 2);
        assert!(err.to_string().contains("Position: 3"));
        let err = HqlDataError::named_parameter_not_found("userId");
        assert!(err.to_string().contains("[userId]"));
        assert!(err.is_parameter_error());
        assert!(!HqlDataError::conversion_error("x").is_parameter_error());
    }
}
