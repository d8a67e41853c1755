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
//! Expansion of queries over polymorphic entities into concrete queries.
//!
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::errors::Result;

/// Splits one HQL query into the concrete queries that must run to answer it.
pub trait QuerySplitter: Send + Sync {
    fn concrete_queries(&self, hql: &str) -> Result<Vec<String>>;
}

const BEFORE_CLASS_TOKENS: [&str; 4] = ["from", "delete", "update", ","];
const NOT_AFTER_CLASS_TOKENS: [&str; 3] = ["in", "from", ")"];

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}_$][\p{L}\p{N}_$.]*$").expect("identifier regex"));

/// Replaces every entity reference in a `from`, `update` or `delete` position with each
/// of its registered concrete implementors.
///
/// ```rust
/// use hqlplan::{PolymorphicQuerySplitter, QuerySplitter};
///
/// let splitter = PolymorphicQuerySplitter::new()
///     .register("Animal", ["Cat", "Dog"]);
/// let queries = splitter.concrete_queries("from Animal a where a.age > ?").unwrap();
/// assert_eq!(queries, vec!["from Cat a where a.age > ?", "from Dog a where a.age > ?"]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct PolymorphicQuerySplitter {
    implementors: IndexMap<String, Vec<String>>,
}

impl PolymorphicQuerySplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `entity` as resolving to `implementors`. An empty list makes every
    /// query over the entity resolve to no concrete query at all.
    pub fn register<E, I, S>(mut self, entity: E, implementors: I) -> Self
    where
        E: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.implementors
            .insert(entity.into(), implementors.into_iter().map(Into::into).collect());
        self
    }

    pub fn implementors(&self, entity: &str) -> Option<&[String]> {
        self.implementors.get(entity).map(Vec::as_slice)
    }
}

impl QuerySplitter for PolymorphicQuerySplitter {
    fn concrete_queries(&self, hql: &str) -> Result<Vec<String>> {
        let tokens = tokenize(hql);
        let mut template = String::with_capacity(hql.len());
        let mut placeholders: Vec<(String, &[String])> = Vec::new();
        let mut last: Option<String> = None;
        let mut in_select = false;

        for (i, token) in tokens.iter().enumerate() {
            if i > 0 && !is_whitespace(tokens[i - 1]) {
                last = Some(tokens[i - 1].to_lowercase());
            }
            let lower = token.to_lowercase();
            if lower == "select" {
                in_select = true;
            } else if lower == "from" {
                in_select = false;
            }

            let mut replacement = None;
            if !in_select && !is_whitespace(token) && is_identifier(token) {
                let next = tokens[i + 1..]
                    .iter()
                    .find(|t| !is_whitespace(t))
                    .map(|t| t.to_lowercase());
                if is_possibly_class_name(last.as_deref(), next.as_deref()) {
                    if let Some(implementors) = self.implementors.get(*token) {
                        let placeholder = format!("$clazz{}$", placeholders.len());
                        placeholders.push((placeholder.clone(), implementors.as_slice()));
                        replacement = Some(placeholder);
                    }
                }
            }
            match replacement {
                Some(placeholder) => template.push_str(&placeholder),
                None => template.push_str(token),
            }
        }

        let queries = multiply(template, &placeholders);
        if queries.is_empty() {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
            warn!("{} ==> [Hql] no persistent classes found for query class: {}", timestamp, hql);
        }
        Ok(queries)
    }
}

fn is_possibly_class_name(last: Option<&str>, next: Option<&str>) -> bool {
    match last {
        Some("class") => true,
        Some(last) if BEFORE_CLASS_TOKENS.contains(&last) => {
            !next.map_or(false, |next| NOT_AFTER_CLASS_TOKENS.contains(&next))
        }
        _ => false,
    }
}

fn is_whitespace(token: &str) -> bool {
    token.chars().all(char::is_whitespace)
}

fn is_identifier(token: &str) -> bool {
    IDENTIFIER.is_match(token)
}

/// Split on whitespace and `(),`, keeping the delimiters as tokens of their own.
fn tokenize(hql: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    for (i, c) in hql.char_indices() {
        if c.is_whitespace() || c == '(' || c == ')' || c == ',' {
            if start < i {
                tokens.push(&hql[start..i]);
            }
            let end = i + c.len_utf8();
            tokens.push(&hql[i..end]);
            start = end;
        }
    }
    if start < hql.len() {
        tokens.push(&hql[start..]);
    }
    tokens
}

/// Every combination of placeholder replacements, first placeholder varying slowest.
fn multiply(template: String, placeholders: &[(String, &[String])]) -> Vec<String> {
    let mut results = vec![template];
    for (placeholder, implementors) in placeholders {
        results = results
            .iter()
            .flat_map(|query| {
                implementors
                    .iter()
                    .map(move |implementor| query.replacen(placeholder.as_str(), implementor, 1))
            })
            .collect();
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn splitter() -> PolymorphicQuerySplitter {
        PolymorphicQuerySplitter::new()
            .register("Animal", ["Cat", "Dog"])
            .register("Owner", ["Person", "Company"])
            .register("Ghost", Vec::<String>::new())
    }

    #[test]
    fn test_unknown_entity_untouched() {
        let hql = "select p.name from Person p where p.id = :id";
        assert_eq!(splitter().concrete_queries(hql).unwrap(), vec![hql.to_string()]);
    }

    #[test]
    fn test_cartesian_product() {
        let queries = splitter()
            .concrete_queries("from Animal a, Owner o where a.owner = o")
            .unwrap();
        assert_eq!(
            queries,
            vec![
                "from Cat a, Person o where a.owner = o",
                "from Cat a, Company o where a.owner = o",
                "from Dog a, Person o where a.owner = o",
                "from Dog a, Company o where a.owner = o",
            ]
        );
    }

    #[test]
    fn test_select_clause_and_in_are_skipped() {
        // `Animal` in the select list is a path, not an entity reference.
        let queries = splitter()
            .concrete_queries("select Animal from Animal where x in (select o from Owner o)")
            .unwrap();
        assert_eq!(queries.len(), 4);
        assert!(queries[0].starts_with("select Animal from Cat where"));
        let bulk = splitter().concrete_queries("delete Animal where age > 3").unwrap();
        assert_eq!(bulk, vec!["delete Cat where age > 3", "delete Dog where age > 3"]);
    }

    #[test]
    fn test_no_implementors() {
        assert!(splitter().concrete_queries("from Ghost g").unwrap().is_empty());
    }
}
