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
use hqlplan::{
    HqlDataError, NativeQueryInterpreter, ParamLocationRecognizer, ParameterMetadata, ParameterParser,
    ParameterRecognizer, StandardNativeQueryInterpreter,
};

#[derive(Default)]
struct Counter {
    ordinals: usize,
    named: Vec<String>,
    text: String,
}

impl ParameterRecognizer for Counter {
    fn out_parameter(&mut self, _position: usize) {}

    fn ordinal_parameter(&mut self, _position: usize) {
        self.ordinals += 1;
    }

    fn named_parameter(&mut self, name: &str, _position: usize) {
        self.named.push(name.to_string());
    }

    fn jpa_positional_parameter(&mut self, name: &str, _position: usize) {
        self.named.push(format!("?{}", name));
    }

    fn other(&mut self, character: char) {
        self.text.push(character);
    }
}

#[test]
fn plain_text_round_trips_through_other() {
    let samples = [
        "select * from cat",
        "update dog set age = age + 1 where id > 10",
        "from Animal a order by a.name desc",
        "",
    ];
    for sql in samples {
        let mut counter = Counter::default();
        ParameterParser::parse(sql, &mut counter).unwrap();
        assert_eq!(counter.text, sql);
        assert_eq!(counter.ordinals, 0);
        assert!(counter.named.is_empty());
    }
}

#[test]
fn quoted_and_commented_markers_are_text() {
    for wrapped in ["'{}'", "\"{}\"", "/* {} */", "-- {}\n"] {
        for marker in [":name", "?", "?1", "::cast"] {
            let sql = format!("select 1 {} from dual", wrapped.replace("{}", marker));
            let mut counter = Counter::default();
            ParameterParser::parse(&sql, &mut counter).unwrap();
            assert_eq!(counter.ordinals, 0, "{}", sql);
            assert!(counter.named.is_empty(), "{}", sql);
            assert_eq!(counter.text, sql);
        }
    }
}

#[test]
fn ordinal_locations_follow_the_text() {
    for n in 0..12 {
        let sql = (0..n).map(|i| format!("c{} = ?", i)).collect::<Vec<_>>().join(" and ");
        let recognizer = ParamLocationRecognizer::parse_locations(&sql).unwrap();
        let locations = recognizer.ordinal_parameter_locations();
        assert_eq!(locations.len(), n);
        assert!(locations.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(locations.iter().all(|&location| &sql[location..location + 1] == "?"));
    }
}

#[test]
fn repeated_named_parameters_share_a_descriptor() {
    let sql = "from Cat c where c.a = :a or c.b = :b or c.a2 = :a and c.id = ?1";
    let recognizer = ParamLocationRecognizer::parse_locations(sql).unwrap();
    let named = recognizer.named_parameter_descriptions();
    assert_eq!(named.len(), 3);
    assert_eq!(named["a"].positions().len(), 2);
    assert!(named["1"].is_jpa_style());

    let metadata = ParameterMetadata::from_locations(&recognizer, None, false);
    assert_eq!(metadata.named_parameter_source_locations("a").unwrap(), named["a"].positions());
    assert!(!metadata.named_parameter_descriptor("b").unwrap().is_jpa_style());
    assert_eq!(
        metadata.named_parameter_descriptor("zzz").unwrap_err(),
        HqlDataError::named_parameter_not_found("zzz")
    );
}

#[test]
fn ordinal_lookups_are_range_checked() {
    let metadata = StandardNativeQueryInterpreter
        .parameter_metadata("insert into cat (id, name) values (?, ?)", false)
        .unwrap();
    assert!(metadata.ordinal_parameter_descriptor(1).is_ok());
    assert_eq!(metadata.ordinal_parameter_source_location(2).unwrap(), 38);
    assert_eq!(
        metadata.ordinal_parameter_descriptor(0).unwrap_err(),
        HqlDataError::ordinal_out_of_range(0, 2)
    );
    assert!(metadata.ordinal_parameter_descriptor(3).is_err());
}

#[test]
fn interpreter_feeds_any_recognizer() {
    let mut counter = Counter::default();
    StandardNativeQueryInterpreter
        .recognize_parameters("{? = call sync_cats(?, :mode)}", &mut counter)
        .unwrap();
    assert_eq!(counter.ordinals, 1);
    assert_eq!(counter.named, vec!["mode"]);
    assert!(StandardNativeQueryInterpreter
        .recognize_parameters("select :", &mut Counter::default())
        .is_err());
}
