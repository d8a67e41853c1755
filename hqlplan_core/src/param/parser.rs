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

//! Single forward scan over HQL / SQL text that classifies every character as
//! quoted text, comment text, a parameter marker or plain "other" text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::HqlDataError;

static ESCAPE_CALL_TEMPLATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\{\s*\?\s*=\s*call").expect("escape call template regex"));

/// Characters that terminate a parameter name.
pub fn is_hql_separator(c: char) -> bool {
    matches!(
        c,
        ' ' | '\n' | '\r' | '\u{000C}' | '\t' | ',' | '(' | ')' | '=' | '<' | '>' | '&' | '|'
            | '+' | '-' | '/' | '*' | '\'' | '^' | '!' | '[' | ']' | '#' | '~' | '\\' | ';'
    )
}

/// Callbacks fired by [`ParameterParser::parse`]. Positions are byte offsets into the scanned text.
pub trait ParameterRecognizer {
    /// The leading `?` of a `{?=call ...}` escape.
    fn out_parameter(&mut self, position: usize);

    fn ordinal_parameter(&mut self, position: usize);

    fn named_parameter(&mut self, name: &str, position: usize);

    /// `?1` style parameter; `name` is the digit run without the `?`.
    fn jpa_positional_parameter(&mut self, name: &str, position: usize);

    fn other(&mut self, character: char);

    fn complete(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexMode {
    Normal,
    SingleQuote,
    DoubleQuote,
    DelimitedComment,
    LineComment,
}

pub struct ParameterParser;

impl ParameterParser {
    /// Scan `sql` once, left to right, invoking exactly one callback per character
    /// or per complete parameter token.
    pub fn parse<R>(sql: &str, recognizer: &mut R) -> Result<(), HqlDataError>
    where
        R: ParameterRecognizer + ?Sized,
    {
        let has_main_output_parameter = Self::starts_with_escape_call_template(sql);
        let mut found_main_output_parameter = false;

        let chars: Vec<(usize, char)> = sql.char_indices().collect();
        let peek = |index: usize| chars.get(index).map(|&(_, c)| c);
        let mut mode = LexMode::Normal;
        let mut index = 0;

        while index < chars.len() {
            let (offset, c) = chars[index];
            match mode {
                LexMode::SingleQuote => {
                    if c == '\'' {
                        mode = LexMode::Normal;
                    }
                    recognizer.other(c);
                }
                LexMode::DoubleQuote => {
                    if c == '"' {
                        mode = LexMode::Normal;
                    }
                    recognizer.other(c);
                }
                LexMode::DelimitedComment => {
                    recognizer.other(c);
                    if c == '*' && peek(index + 1) == Some('/') {
                        recognizer.other('/');
                        index += 1;
                        mode = LexMode::Normal;
                    }
                }
                LexMode::LineComment => {
                    recognizer.other(c);
                    if c == '\n' {
                        mode = LexMode::Normal;
                    } else if c == '\r' {
                        // \r\n is a single terminator
                        mode = LexMode::Normal;
                        if peek(index + 1) == Some('\n') {
                            recognizer.other('\n');
                            index += 1;
                        }
                    }
                }
                LexMode::Normal => match c {
                    '\'' => {
                        mode = LexMode::SingleQuote;
                        recognizer.other(c);
                    }
                    '"' => {
                        mode = LexMode::DoubleQuote;
                        recognizer.other(c);
                    }
                    '/' if peek(index + 1) == Some('*') => {
                        mode = LexMode::DelimitedComment;
                        recognizer.other('/');
                        recognizer.other('*');
                        index += 1;
                    }
                    '-' if peek(index + 1) == Some('-') => {
                        mode = LexMode::LineComment;
                        recognizer.other('-');
                        recognizer.other('-');
                        index += 1;
                    }
                    '\\' => {
                        // the escaped character is never re-interpreted
                        recognizer.other(c);
                        if let Some(next) = peek(index + 1) {
                            recognizer.other(next);
                            index += 1;
                        }
                    }
                    ':' if peek(index + 1) == Some(':') => {
                        recognizer.other(':');
                        recognizer.other(':');
                        index += 1;
                    }
                    ':' => {
                        let end = Self::next_separator(&chars, index + 1);
                        let name = Self::token(sql, &chars, offset + 1, end);
                        if name.is_empty() {
                            return Err(HqlDataError::parse_error(
                                "Space is not allowed after parameter prefix ':'",
                                sql,
                            ));
                        }
                        recognizer.named_parameter(name, offset);
                        index = end;
                        continue;
                    }
                    '?' if peek(index + 1).is_some_and(|next| next.is_ascii_digit()) => {
                        let end = Self::next_separator(&chars, index + 1);
                        let label = Self::token(sql, &chars, offset + 1, end);
                        if label.parse::<i32>().is_err() {
                            return Err(HqlDataError::parse_error(
                                format!("JPA-style positional param was not an integral ordinal: ?{}", label),
                                sql,
                            ));
                        }
                        recognizer.jpa_positional_parameter(label, offset);
                        index = end;
                        continue;
                    }
                    '?' => {
                        if has_main_output_parameter && !found_main_output_parameter {
                            found_main_output_parameter = true;
                            recognizer.out_parameter(offset);
                        } else {
                            recognizer.ordinal_parameter(offset);
                        }
                    }
                    _ => recognizer.other(c),
                },
            }
            index += 1;
        }

        recognizer.complete();
        Ok(())
    }

    /// Whether `sql` is a JDBC escaped call with a leading output parameter, e.g. `{? = call proc(?)}`.
    pub fn starts_with_escape_call_template(sql: &str) -> bool {
        if !(sql.starts_with('{') && sql.ends_with('}')) {
            return false;
        }
        ESCAPE_CALL_TEMPLATE.is_match(sql)
    }

    fn next_separator(chars: &[(usize, char)], from: usize) -> usize {
        chars[from.min(chars.len())..]
            .iter()
            .position(|&(_, c)| is_hql_separator(c))
            .map_or(chars.len(), |relative| from + relative)
    }

    fn token<'a>(sql: &'a str, chars: &[(usize, char)], start: usize, end: usize) -> &'a str {
        let end_offset = chars.get(end).map_or(sql.len(), |&(o, _)| o);
        &sql[start..end_offset]
    }
}
