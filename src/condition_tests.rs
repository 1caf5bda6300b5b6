//
// Copyright (c) 2024 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::condition::*;
use crate::types::{FieldValue, MapValue};
use std::error::Error;
use std::result::Result;

#[test]
fn test_empty_condition_matches_all() {
    let c = Condition::all();
    assert!(c.is_all());
    // compiles to "no filter", not an error
    assert_eq!(c.compile().len(), 0);
    assert!(Condition::default().is_all());
}

#[test]
fn test_equality_shorthand() -> Result<(), Box<dyn Error>> {
    // a bare value compiles to a bare literal
    let c = Condition::field("item", value("pencil"));
    let m = c.compile();
    assert_eq!(
        m.get_field_value("item").ok_or("item missing")?,
        &FieldValue::String("pencil".to_string())
    );

    // an explicit eq compiles to an operator expression
    let c = Condition::field("item", eq("pencil"));
    let m = c.compile();
    let expr = m.get_map("item").ok_or("item missing")?;
    assert_eq!(expr.get_string("$eq").ok_or("$eq missing")?, "pencil");
    Ok(())
}

#[test]
fn test_comparison_operators() -> Result<(), Box<dyn Error>> {
    let m = Condition::field("qty", gte(100)).compile();
    let expr = m.get_map("qty").ok_or("qty missing")?;
    assert_eq!(expr.get_i32("$gte").ok_or("$gte missing")?, 100);

    let m = Condition::field("qty", lt(50)).compile();
    let expr = m.get_map("qty").ok_or("qty missing")?;
    assert_eq!(expr.get_i32("$lt").ok_or("$lt missing")?, 50);

    let m = Condition::field("name", regex("^pen")).compile();
    let expr = m.get_map("name").ok_or("name missing")?;
    assert_eq!(expr.get_string("$regex").ok_or("$regex missing")?, "^pen");
    Ok(())
}

#[test]
fn test_membership_operators() -> Result<(), Box<dyn Error>> {
    let m = Condition::field("info.city", is_in(vec!["beijing", "shanghai"])).compile();
    let expr = m.get_map("info.city").ok_or("city missing")?;
    let arr = expr.get_array("$in").ok_or("$in missing")?;
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0], FieldValue::String("beijing".to_string()));

    let m = Condition::field("qty", not_in(vec![1i64, 2, 3])).compile();
    let expr = m.get_map("qty").ok_or("qty missing")?;
    assert_eq!(expr.get_array("$nin").ok_or("$nin missing")?.len(), 3);
    Ok(())
}

#[test]
fn test_multi_key_implicit_and() -> Result<(), Box<dyn Error>> {
    // multiple keys on one condition are an implicit AND across fields
    let c = Condition::field("item", eq("pencil")).and_field("qty", gte(100));
    let m = c.compile();
    assert_eq!(m.len(), 2);
    assert!(m.get_map("item").is_some());
    assert!(m.get_map("qty").is_some());
    Ok(())
}

#[test]
fn test_logical_combinators() -> Result<(), Box<dyn Error>> {
    let c = Condition::or(vec![
        Condition::field("item", eq("iphone 7")),
        Condition::field("item", eq("iphone 6")),
    ]);
    let m = c.compile();
    let arr = m.get_array("$or").ok_or("$or missing")?;
    assert_eq!(arr.len(), 2);

    let c = Condition::nor(vec![Condition::field("a", value(1))]);
    assert!(c.compile().get_array("$nor").is_some());

    let c = Condition::negate(Condition::field("a", value(1)));
    let inner = c.compile();
    let inner = inner.get_map("$not").ok_or("$not missing")?;
    assert_eq!(
        inner.get_field_value("a").ok_or("a missing")?,
        &FieldValue::Integer(1)
    );
    Ok(())
}

#[test]
fn test_and_merge_equivalence() {
    // narrowing twice compiles to the same filter as one explicit AND
    let merged = Condition::field("item", eq("pencil"))
        .and_with(Condition::field("qty", gte(100)));
    let explicit = Condition::and(vec![
        Condition::field("item", eq("pencil")),
        Condition::field("qty", gte(100)),
    ]);
    assert_eq!(merged.compile(), explicit.compile());
}

#[test]
fn test_and_merge_with_empty_is_identity() {
    let c = Condition::field("qty", gte(100));
    let merged = c.clone_internal().and_with(Condition::all());
    assert_eq!(merged.compile(), Condition::field("qty", gte(100)).compile());

    let merged = Condition::all().and_with(Condition::field("qty", gte(100)));
    assert_eq!(merged.compile(), Condition::field("qty", gte(100)).compile());
}

#[test]
fn test_raw_operator_token_validation() {
    // known token is accepted
    let expr = FieldExpr::raw("$gte", 100).expect("$gte should be accepted");
    let m = Condition::field("qty", expr).compile();
    assert!(m.get_map("qty").is_some());

    // unknown token fails before any request is issued
    let err = FieldExpr::raw("$frobnicate", 100).unwrap_err();
    assert_eq!(err.code, crate::error::BaasErrorCode::InvalidParam);
}

#[test]
fn test_nested_condition_compile() -> Result<(), Box<dyn Error>> {
    let c = Condition::or(vec![
        Condition::field("qty", lt(10)).and_field("item", eq("pen")),
        Condition::negate(Condition::field("info.city", is_in(vec!["beijing"]))),
    ]);
    let m = c.compile();
    let arr = m.get_array("$or").ok_or("$or missing")?;
    assert_eq!(arr.len(), 2);
    if let FieldValue::Map(first) = &arr[0] {
        assert_eq!(first.len(), 2);
    } else {
        return Err("first $or child is not a map".into());
    }
    if let FieldValue::Map(second) = &arr[1] {
        assert!(second.get_map("$not").is_some());
    } else {
        return Err("second $or child is not a map".into());
    }
    Ok(())
}

#[test]
fn test_condition_compiles_to_plain_document() {
    // the compiled filter is an ordinary document that can be re-serialized
    let c = Condition::field("qty", gte(100));
    let compiled: MapValue = c.compile();
    let mut w = crate::writer::Writer::new();
    w.write_map(&compiled);
    let mut r = crate::reader::Reader::new().from_bytes(w.bytes());
    let back = r.read_map().expect("compiled filter should round-trip");
    assert_eq!(back, compiled);
}
