//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::cache::*;
use crate::error::BaasErrorCode;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::error::Error;
use std::result::Result;
use std::time::Duration;

#[test]
fn test_duration_precision_switch() {
    // whole seconds go as seconds
    assert!(!use_precise(&Duration::from_secs(10)));
    // sub-second precision switches to milliseconds
    assert!(use_precise(&Duration::from_millis(1500)));
    assert!(use_precise(&Duration::from_millis(200)));
}

#[test]
fn test_format_seconds() {
    assert_eq!(format_secs(&Duration::from_secs(10)), 10);
    // a tiny nonzero duration still requests one second
    assert_eq!(format_secs(&Duration::from_millis(200)), 1);
    assert_eq!(format_secs(&Duration::ZERO), 0);
}

#[test]
fn test_format_millis() {
    assert_eq!(format_millis(&Duration::from_millis(1500)), 1500);
    // a tiny nonzero duration still requests one millisecond
    assert_eq!(format_millis(&Duration::from_micros(10)), 1);
    assert_eq!(format_millis(&Duration::ZERO), 0);
}

#[test]
fn test_pairs_from_flat_list() {
    let pairs: KvPairs = vec![
        Value::from("k1"),
        Value::from("v1"),
        Value::from("k2"),
        Value::from("v2"),
    ]
    .into();
    let mut args: Vec<Value> = Vec::new();
    match pairs {
        KvPairs::Flat(v) => args.extend(v),
        _ => panic!("flat list should stay flat"),
    }
    assert_eq!(args.len(), 4);
    assert_eq!(args[0], Value::from("k1"));
    assert_eq!(args[3], Value::from("v2"));
}

#[test]
fn test_pairs_from_mapping_normalize_to_flat() {
    // a single mapping normalizes to a flat alternating list
    let mut m: BTreeMap<String, Value> = BTreeMap::new();
    m.insert("k1".to_string(), Value::from("v1"));
    m.insert("k2".to_string(), Value::from("v2"));
    let pairs: KvPairs = m.into();
    let mut args: Vec<Value> = Vec::new();
    match pairs {
        KvPairs::Map(m) => {
            for (k, v) in m {
                args.push(Value::from(k));
                args.push(v);
            }
        }
        _ => panic!("mapping expected"),
    }
    assert_eq!(args.len(), 4);
    assert_eq!(args[0], Value::from("k1"));
    assert_eq!(args[1], Value::from("v1"));
    assert_eq!(args[2], Value::from("k2"));
    assert_eq!(args[3], Value::from("v2"));
}

#[test]
fn test_pairs_from_tuple_list() {
    let pairs: KvPairs = vec![("k1", "v1"), ("k2", "v2")].into();
    match pairs {
        KvPairs::Map(m) => {
            assert_eq!(m.len(), 2);
            assert_eq!(m.get("k1"), Some(&Value::from("v1")));
        }
        _ => panic!("mapping expected"),
    }
}

#[test]
fn test_value_decoding_string() -> Result<(), Box<dyn Error>> {
    assert_eq!(value_as_string("get", &Value::from("hello"))?, "hello");
    // numeric replies stringify
    assert_eq!(value_as_string("get", &json!(42))?, "42");
    let err = value_as_string("get", &json!([1, 2])).unwrap_err();
    assert_eq!(err.code, BaasErrorCode::BadProtocolMessage);
    Ok(())
}

#[test]
fn test_value_decoding_int() -> Result<(), Box<dyn Error>> {
    assert_eq!(value_as_i64("incr", &json!(7))?, 7);
    // integer replies sometimes travel as strings
    assert_eq!(value_as_i64("incr", &Value::from("12"))?, 12);
    assert!(value_as_i64("incr", &Value::from("abc")).is_err());
    Ok(())
}

#[test]
fn test_value_decoding_float() -> Result<(), Box<dyn Error>> {
    assert_eq!(value_as_f64("zscore", &json!(1.5))?, 1.5);
    // float replies travel as strings
    assert_eq!(value_as_f64("zscore", &Value::from("3.25"))?, 3.25);
    Ok(())
}

#[test]
fn test_value_decoding_str_vec() -> Result<(), Box<dyn Error>> {
    let v = json!(["a", "b", "c"]);
    assert_eq!(value_as_str_vec("smembers", &v)?, vec!["a", "b", "c"]);
    let err = value_as_str_vec("smembers", &json!("not an array")).unwrap_err();
    assert_eq!(err.code, BaasErrorCode::BadProtocolMessage);
    Ok(())
}

#[test]
fn test_scored_member_decoding() -> Result<(), Box<dyn Error>> {
    let v = json!([
        {"score": 1.0, "member": "one"},
        {"score": 2.5, "member": "two"},
    ]);
    let zs: Vec<Z> = serde_json::from_value(v)?;
    assert_eq!(zs.len(), 2);
    assert_eq!(zs[0].score, 1.0);
    assert_eq!(zs[0].member, Value::from("one"));
    assert_eq!(zs[1].score, 2.5);
    Ok(())
}

#[test]
fn test_z_new() {
    let z = Z::new(3.5, "member1");
    assert_eq!(z.score, 3.5);
    assert_eq!(z.member, Value::from("member1"));
}
