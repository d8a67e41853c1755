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
use crate::HqlValue;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::collections::{BTreeSet, HashSet};
use uuid::Uuid;

pub trait IntoHqlValue {
    fn into_value(&self) -> HqlValue;
}

// Implement conversion for base types
macro_rules! impl_into_hql_value {
    ($($ty:ty => $variant:ident),*) => {
        $(
            impl IntoHqlValue for $ty {
                fn into_value(&self) -> HqlValue {
                    HqlValue::$variant(self.to_owned())
                }
            }
        )*
    };
}

macro_rules! impl_widened_to_value {
    ($ty:ty, $variant:ident, $target:ident) => {
        impl IntoHqlValue for $ty {
            fn into_value(&self) -> HqlValue {
                HqlValue::$variant(*self as $target)
            }
        }
    };
}

impl_widened_to_value!(i8, Int, i32);
impl_widened_to_value!(i16, Int, i32);
impl_widened_to_value!(u8, Int, i32);
impl_widened_to_value!(u16, Int, i32);
impl_widened_to_value!(u32, Bigint, i64);
impl_widened_to_value!(u64, Bigint, i64);
impl_widened_to_value!(usize, Bigint, i64);
impl_widened_to_value!(isize, Bigint, i64);
impl_widened_to_value!(f32, Double, f64);

impl_into_hql_value! {
    bool => Bool,
    i32 => Int,
    i64 => Bigint,
    f64 => Double,
    Vec<u8> => Blob,
    char => Char,
    String => Text,
    JsonValue => Json,
    Uuid => Uuid,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => DateTime
}

impl IntoHqlValue for &str {
    fn into_value(&self) -> HqlValue {
        HqlValue::Text(self.to_string())
    }
}

impl IntoHqlValue for HqlValue {
    fn into_value(&self) -> HqlValue {
        self.clone()
    }
}

impl IntoHqlValue for () {
    fn into_value(&self) -> HqlValue {
        HqlValue::Null
    }
}

impl<T: IntoHqlValue> IntoHqlValue for Option<T> {
    fn into_value(&self) -> HqlValue {
        match self {
            Some(val) => val.into_value(),
            None => HqlValue::Null,
        }
    }
}

impl<T: IntoHqlValue> IntoHqlValue for &T {
    fn into_value(&self) -> HqlValue {
        (*self).into_value()
    }
}

impl<T: IntoHqlValue> IntoHqlValue for [T] {
    fn into_value(&self) -> HqlValue {
        HqlValue::List(self.iter().map(IntoHqlValue::into_value).collect())
    }
}

macro_rules! impl_collection_to_value {
    ($($coll:ident),*) => {
        $(
            impl<T: IntoHqlValue> IntoHqlValue for $coll<T> {
                fn into_value(&self) -> HqlValue {
                    HqlValue::List(self.iter().map(IntoHqlValue::into_value).collect())
                }
            }
        )*
    };
}

impl_collection_to_value!(HashSet, BTreeSet);

// Vec<u8> is a blob, so other vectors are listed one by one.
macro_rules! impl_vec_to_value {
    ($($ty:ty),*) => {
        $(
            impl IntoHqlValue for Vec<$ty> {
                fn into_value(&self) -> HqlValue {
                    HqlValue::List(self.iter().map(IntoHqlValue::into_value).collect())
                }
            }
        )*
    };
}

impl_vec_to_value!(bool, i32, i64, u32, u64, f64, String, &str, Uuid, NaiveDate, NaiveDateTime, HqlValue);

impl<V: IntoHqlValue> IntoHqlValue for IndexMap<String, V> {
    fn into_value(&self) -> HqlValue {
        HqlValue::Object(self.iter().map(|(k, v)| (k.clone(), v.into_value())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_value_widening() {
        assert_eq!(7u8.into_value(), HqlValue::Int(7));
        assert_eq!(7u64.into_value(), HqlValue::Bigint(7));
        assert_eq!("a".into_value(), HqlValue::Text("a".to_string()));
        assert_eq!(None::<i32>.into_value(), HqlValue::Null);
    }

    #[test]
    fn test_vectors_become_lists() {
        let value = vec![1i64, 2, 3].into_value();
        assert_eq!(value.cardinality(), 3);
        assert_eq!(vec![1u8, 2].into_value(), HqlValue::Blob(vec![1, 2]));
    }
}
