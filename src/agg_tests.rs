//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::condition::*;
use crate::envelope::*;
use crate::error::BaasErrorCode;
use crate::reader::Reader;
use crate::table::Table;
use crate::types::{FieldValue, MapValue, OpKind};
use std::collections::BTreeMap;
use std::error::Error;
use std::result::Result;
use std::time::Duration;

fn stage_group(stage: &FieldValue) -> &MapValue {
    if let FieldValue::Map(m) = stage {
        return m.get_map("$group").expect("stage is not a $group");
    }
    panic!("stage is not a map");
}

#[test]
fn test_single_group_stage() -> Result<(), Box<dyn Error>> {
    let agg = Table::new("goods").group_by_as("info.city", "city");
    let pipeline = agg.compile_pipeline();
    assert_eq!(pipeline.len(), 1);
    let group = stage_group(&pipeline[0]);
    let id = group.get_map("_id").ok_or("_id missing")?;
    assert_eq!(id.get_string("city").ok_or("city missing")?, "$info.city");
    Ok(())
}

#[test]
fn test_default_alias_is_last_path_segment() -> Result<(), Box<dyn Error>> {
    let agg = Table::new("goods").group_by("info.city");
    let pipeline = agg.compile_pipeline();
    let group = stage_group(&pipeline[0]);
    let id = group.get_map("_id").ok_or("_id missing")?;
    assert_eq!(id.get_string("city").ok_or("city missing")?, "$info.city");
    Ok(())
}

#[test]
fn test_composite_group_key() -> Result<(), Box<dyn Error>> {
    let agg = Table::new("goods").group_by_as(vec!["item", "qty"], "item-qty");
    let pipeline = agg.compile_pipeline();
    let group = stage_group(&pipeline[0]);
    let id = group.get_map("_id").ok_or("_id missing")?;
    let refs = id.get_array("item-qty").ok_or("item-qty missing")?;
    assert_eq!(refs.len(), 2);
    assert_eq!(refs[0], FieldValue::String("$item".to_string()));
    assert_eq!(refs[1], FieldValue::String("$qty".to_string()));
    Ok(())
}

#[test]
fn test_accumulators_attach_to_stage() -> Result<(), Box<dyn Error>> {
    let agg = Table::new("goods")
        .group_by_as("info.city", "city")
        .sum("qty", "total")
        .avg("qty", "avg");
    let pipeline = agg.compile_pipeline();
    let group = stage_group(&pipeline[0]);
    let total = group.get_map("total").ok_or("total missing")?;
    assert_eq!(total.get_string("$sum").ok_or("$sum missing")?, "$qty");
    let avg = group.get_map("avg").ok_or("avg missing")?;
    assert_eq!(avg.get_string("$avg").ok_or("$avg missing")?, "$qty");
    Ok(())
}

#[test]
fn test_accumulator_call_order_is_irrelevant_within_stage() {
    // for one stage, any accumulator call order compiles identically
    let a = Table::new("goods")
        .group_by_as("info.city", "city")
        .sum("qty", "total")
        .push(vec!["item", "qty"], "list");
    let b = Table::new("goods")
        .group_by_as("info.city", "city")
        .push(vec!["item", "qty"], "list")
        .sum("qty", "total");
    let pa = a.compile_pipeline();
    let pb = b.compile_pipeline();
    assert_eq!(pa.len(), pb.len());
    for (x, y) in pa.iter().zip(pb.iter()) {
        assert_eq!(x, y);
    }
}

#[test]
fn test_each_group_by_opens_a_new_stage() -> Result<(), Box<dyn Error>> {
    // accumulators attach to the most recent stage, never retroactively
    let agg = Table::new("goods")
        .group_by_as("info.city", "city")
        .sum("qty", "city_total")
        .group_by_as("item", "item")
        .sum("qty", "item_total");
    let pipeline = agg.compile_pipeline();
    assert_eq!(pipeline.len(), 2);
    let first = stage_group(&pipeline[0]);
    assert!(first.get_map("city_total").is_some());
    assert!(first.get_map("item_total").is_none());
    let second = stage_group(&pipeline[1]);
    assert!(second.get_map("item_total").is_some());
    assert!(second.get_map("city_total").is_none());
    Ok(())
}

#[test]
fn test_having_compiles_to_post_group_filter() -> Result<(), Box<dyn Error>> {
    // the having filter references accumulator output aliases and always
    // follows the group stages, regardless of call order
    let agg = Table::new("goods")
        .group_by_as("info.city", "city")
        .having(Condition::field("total", gt(100)))
        .sum("qty", "total");
    let pipeline = agg.compile_pipeline();
    assert_eq!(pipeline.len(), 2);
    assert!(matches!(&pipeline[0], FieldValue::Map(m) if m.get_map("$group").is_some()));
    if let FieldValue::Map(m) = &pipeline[1] {
        let filter = m.get_map("$match").ok_or("$match missing")?;
        let expr = filter.get_map("total").ok_or("total missing")?;
        assert_eq!(expr.get_i32("$gt").ok_or("$gt missing")?, 100);
    } else {
        return Err("second stage is not a map".into());
    }
    Ok(())
}

#[test]
fn test_push_with_rename_mapping() -> Result<(), Box<dyn Error>> {
    let mut renames: BTreeMap<String, String> = BTreeMap::new();
    renames.insert("product".to_string(), "item".to_string());
    renames.insert("amount".to_string(), "qty".to_string());
    let agg = Table::new("goods")
        .group_by_as("info.city", "city")
        .push(renames, "list");
    let pipeline = agg.compile_pipeline();
    let group = stage_group(&pipeline[0]);
    let push = group.get_map("list").ok_or("list missing")?;
    let spec = push.get_map("$push").ok_or("$push missing")?;
    assert_eq!(spec.get_string("product").ok_or("product missing")?, "$item");
    assert_eq!(spec.get_string("amount").ok_or("amount missing")?, "$qty");
    Ok(())
}

#[test]
fn test_first_with_multiple_fields() -> Result<(), Box<dyn Error>> {
    let agg = Table::new("goods")
        .group_by_as("info.city", "city")
        .first(vec!["item", "qty"], "first-item");
    let pipeline = agg.compile_pipeline();
    let group = stage_group(&pipeline[0]);
    let first = group.get_map("first-item").ok_or("first-item missing")?;
    let refs = first.get_array("$first").ok_or("$first missing")?;
    assert_eq!(refs.len(), 2);
    Ok(())
}

#[test]
fn test_compiled_envelope_is_aggregate_op() -> Result<(), Box<dyn Error>> {
    let agg = Table::new("goods")
        .group_by_as("info.city", "city")
        .add_to_set("item", "items");
    let w = agg.compile(&Duration::from_secs(30))?;
    let mut r = Reader::new().from_bytes(w.bytes());
    let req = r.read_field_value()?.get_map_value()?;
    let header = req.get_map(HEADER).ok_or("header missing")?;
    assert_eq!(
        header.get_i32(OP_KIND).ok_or("op missing")?,
        OpKind::Aggregate as i32
    );
    let payload = req.get_map(PAYLOAD).ok_or("payload missing")?;
    let pipeline = payload.get_array(PIPELINE).ok_or("pipeline missing")?;
    assert_eq!(pipeline.len(), 1);
    Ok(())
}

#[test]
fn test_empty_table_name_fails() {
    let agg = Table::new("").group_by("info.city");
    let err = agg.compile(&Duration::from_secs(30)).unwrap_err();
    assert_eq!(err.code, BaasErrorCode::InvalidParam);
}

#[test]
fn test_std_dev_accumulators() -> Result<(), Box<dyn Error>> {
    let agg = Table::new("goods")
        .group_by_as("info.city", "city")
        .std_dev_pop("qty", "sd_pop")
        .std_dev_samp("qty", "sd_samp")
        .merge_objects("info", "merged")
        .last("qty", "last_qty");
    let pipeline = agg.compile_pipeline();
    let group = stage_group(&pipeline[0]);
    assert!(group.get_map("sd_pop").ok_or("sd_pop missing")?.get_string("$stdDevPop").is_some());
    assert!(group.get_map("sd_samp").ok_or("sd_samp missing")?.get_string("$stdDevSamp").is_some());
    assert!(group.get_map("merged").ok_or("merged missing")?.get_string("$mergeObjects").is_some());
    assert!(group.get_map("last_qty").ok_or("last_qty missing")?.get_string("$last").is_some());
    Ok(())
}
