//
// Copyright (c) 2024 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::reader::Reader;
use crate::types;
use crate::types::FieldValue;
use crate::types::ToFieldValue;
use crate::writer::Writer;
use std::error::Error;
use std::result::Result;

fn get_string(fv: &FieldValue) -> Option<&String> {
    if let FieldValue::String(s) = fv {
        Some(s)
    } else {
        None
    }
}
fn get_i64(fv: &FieldValue) -> Option<i64> {
    if let FieldValue::Long(i) = fv {
        Some(*i)
    } else {
        None
    }
}

#[test]
fn test_basic_mapvalue() -> Result<(), Box<dyn Error>> {
    let mut m = types::MapValue::new();
    m.put_i32("i32val", 5);
    m.put_bool("boolval", true);
    m.put_i64("i64val", 123456789);
    m.put_float64("floatval", 2345.0023456);
    m.put_str("strval", "This is a string value");
    let mut arr = Vec::<FieldValue>::new();
    arr.push("array element 1".to_field_value());
    arr.push("array element 2".to_field_value());
    arr.push("array element 3".to_field_value());
    arr.push(FieldValue::Long(12121212));
    m.put_array("arrval", arr);
    let vec: Vec<u8> = vec![0, 1, 2, 3, 4, 5];
    m.put_binary("binval", vec);
    assert_eq!(m.get_i32("i32val").ok_or("i32val doesn't exist")?, 5);
    assert_eq!(m.get_bool("boolval").ok_or("boolval doesn't exist")?, true);
    assert_eq!(
        m.get_float64("floatval").ok_or("floatval doesn't exist")?,
        2345.0023456
    );
    assert_eq!(
        m.get_i64("i64val").ok_or("i64val doesn't exist")?,
        123456789
    );
    assert_eq!(
        m.get_string("strval").ok_or("strval doesn't exist")?,
        "This is a string value"
    );
    let arr_result = m.get_array("arrval").ok_or("arrval doesn't exist")?;
    assert_eq!(arr_result.len(), 4);
    assert_eq!(
        get_string(&arr_result[0]).ok_or("arr[0] doesn't contain a string")?,
        "array element 1"
    );
    assert_eq!(
        get_i64(&arr_result[3]).ok_or("arr[3] doesn't contain a int64")?,
        12121212
    );
    let bin_result = m.get_binary("binval").ok_or("binval doesn't exist")?;
    assert_eq!(bin_result.len(), 6);

    let mut writer = Writer::new();
    writer.write_map(&m);
    let mut reader = Reader::new().from_bytes(writer.bytes());
    let val = reader.read_map()?;
    assert_eq!(val.get_i32("i32val").ok_or("i32val doesn't exist")?, 5);
    assert_eq!(
        val.get_i64("i64val").ok_or("i64val doesn't exist")?,
        123456789
    );
    assert_eq!(
        val.get_string("strval").ok_or("strval doesn't exist")?,
        "This is a string value"
    );
    let arr_result = val.get_array("arrval").ok_or("arrval doesn't exist")?;
    assert_eq!(arr_result.len(), 4);
    assert_eq!(
        get_string(&arr_result[0]).ok_or("arr[0] doesn't contain a string")?,
        "array element 1"
    );
    assert_eq!(
        get_string(&arr_result[1]).ok_or("arr[1] doesn't contain a string")?,
        "array element 2"
    );
    assert_eq!(
        get_string(&arr_result[2]).ok_or("arr[2] doesn't contain a string")?,
        "array element 3"
    );
    assert_eq!(
        get_i64(&arr_result[3]).ok_or("arr[3] doesn't contain a int64")?,
        12121212
    );

    Ok(())
}

#[test]
fn test_nested_map_roundtrip() -> Result<(), Box<dyn Error>> {
    let inner = types::MapValue::new().str("city", "shanghai").i64("zip", 200000);
    let m = types::MapValue::new()
        .str("item", "pencil")
        .column("info", inner);

    let mut writer = Writer::new();
    writer.write_map(&m);
    let mut reader = Reader::new().from_bytes(writer.bytes());
    let val = reader.read_map()?;
    let info = val.get_map("info").ok_or("info doesn't exist")?;
    assert_eq!(info.get_string("city").ok_or("city doesn't exist")?, "shanghai");
    assert_eq!(info.get_i64("zip").ok_or("zip doesn't exist")?, 200000);
    Ok(())
}

#[test]
fn test_null_values_roundtrip() -> Result<(), Box<dyn Error>> {
    let mut m = types::MapValue::new();
    m.put_field_value("nullval", FieldValue::Null);
    m.put_field_value("jsonnull", FieldValue::JsonNull);
    let mut writer = Writer::new();
    writer.write_map(&m);
    let mut reader = Reader::new().from_bytes(writer.bytes());
    let val = reader.read_map()?;
    assert_eq!(
        val.get_field_value("nullval").ok_or("nullval missing")?,
        &FieldValue::Null
    );
    assert_eq!(
        val.get_field_value("jsonnull").ok_or("jsonnull missing")?,
        &FieldValue::JsonNull
    );
    Ok(())
}

#[test]
fn test_from_json_object() -> Result<(), Box<dyn Error>> {
    let json: serde_json::Value = serde_json::from_str(
        r#"{"item": "pencil", "qty": 120, "price": 1.5, "tags": ["a", "b"], "gone": null}"#,
    )?;
    let mv = types::MapValue::from_json_object(&json)?;
    assert_eq!(mv.get_string("item").ok_or("item missing")?, "pencil");
    assert_eq!(mv.get_i32("qty").ok_or("qty missing")?, 120);
    assert_eq!(mv.get_float64("price").ok_or("price missing")?, 1.5);
    assert_eq!(mv.get_array("tags").ok_or("tags missing")?.len(), 2);
    assert_eq!(
        mv.get_field_value("gone").ok_or("gone missing")?,
        &FieldValue::JsonNull
    );
    Ok(())
}
