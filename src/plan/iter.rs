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

use std::collections::VecDeque;

use crate::errors::Result;
use crate::translator::{Row, RowIter};

/// Drains several row iterators one after another.
pub struct JoinedIterator {
    iterators: VecDeque<RowIter>,
}

impl JoinedIterator {
    pub fn new(iterators: Vec<RowIter>) -> Self {
        Self {
            iterators: iterators.into(),
        }
    }
}

impl Iterator for JoinedIterator {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.iterators.front_mut() {
            if let Some(row) = current.next() {
                return Some(row);
            }
            self.iterators.pop_front();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hqlplan_core::HqlValue;
    use std::sync::Arc;

    fn rows(values: &[i32]) -> RowIter {
        let rows: Vec<Result<Row>> = values.iter().map(|v| Ok(Arc::new(HqlValue::Int(*v)))).collect();
        Box::new(rows.into_iter())
    }

    #[test]
    fn test_joined_in_order() {
        let joined = JoinedIterator::new(vec![rows(&[1, 2]), rows(&[]), rows(&[3])]);
        let values: Vec<i64> = joined.map(|r| r.unwrap().as_i64().unwrap()).collect();
        assert_eq!(values, vec![1, 2, 3]);
        assert!(JoinedIterator::new(Vec::new()).next().is_none());
    }
}
