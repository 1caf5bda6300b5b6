//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use base64::prelude::{Engine as _, BASE64_STANDARD};
use std::error::Error;
use std::result::Result;

use crate::envelope::*;
use crate::error::*;
use crate::query::{decode_count_reply, decode_ids_reply, decode_records_reply};
use crate::reader::Reader;
use crate::types::{FieldValue, MapValue};
use crate::writer::Writer;

// Build the JSON reply envelope the service sends on the document-store
// path: code/msg plus a base64-framed binary document payload.
fn reply_with_doc(code: &str, doc: &MapValue) -> Vec<u8> {
    let mut w = Writer::new();
    w.write_map_value(doc);
    let framed = BASE64_STANDARD.encode(w.bytes());
    serde_json::to_vec(&serde_json::json!({
        "code": code,
        "msg": "",
        "data": framed,
    }))
    .unwrap()
}

#[test]
fn test_classifier_success() {
    assert_eq!(classify_reply_code("0"), ReplyStatus::Success);
}

#[test]
fn test_classifier_system_failure_set() {
    // classification depends on the code alone
    for code in [
        "k_ec_000001",
        "k_ident_013000",
        "k_ident_013001",
        "k_fs_ec_100001",
        "k_fs_ec_000004",
    ] {
        assert_eq!(
            classify_reply_code(code),
            ReplyStatus::SystemFailure,
            "code {} should be a system failure",
            code
        );
    }
}

#[test]
fn test_classifier_parameter_failure() {
    for code in ["k_op_001", "1", "unknown_code", "k_ec_999999"] {
        assert_eq!(
            classify_reply_code(code),
            ReplyStatus::ParameterFailure,
            "code {} should be a parameter failure",
            code
        );
    }
}

#[test]
fn test_reply_error_kinds() {
    let e = reply_error("find goods", "k_ec_000001", "boom", "logid-1");
    assert_eq!(e.code, BaasErrorCode::InternalError);
    assert!(e.message.contains("find goods"));
    assert!(e.message.contains("logid-1"));

    let e = reply_error("find goods", "k_op_000123", "bad filter", "logid-2");
    assert_eq!(e.code, BaasErrorCode::InvalidParam);
    assert!(e.message.contains("bad filter"));
    assert!(e.message.contains("k_op_000123"));
}

#[test]
fn test_reply_envelope_success_payload() -> Result<(), Box<dyn Error>> {
    let mut doc = MapValue::new();
    doc.put_i64(COUNT, 42);
    let body = reply_with_doc("0", &doc);

    let env = ReplyEnvelope::parse(&body)?.check("count goods", "")?;
    let payload = env.doc_payload()?;
    let mut r = Reader::new().from_bytes(&payload);
    assert_eq!(decode_count_reply(&mut r)?, 42);
    Ok(())
}

#[test]
fn test_reply_envelope_failure_classification() {
    let body = serde_json::to_vec(&serde_json::json!({
        "code": "k_ident_013000",
        "msg": "token expired",
    }))
    .unwrap();
    let env = ReplyEnvelope::parse(&body).unwrap();
    let err = env.check("find goods", "log-3").unwrap_err();
    assert_eq!(err.code, BaasErrorCode::InternalError);
    assert!(err.message.contains("token expired"));
}

#[test]
fn test_reply_envelope_malformed_json_is_protocol_error() {
    let err = ReplyEnvelope::parse(b"this is not json").unwrap_err();
    assert_eq!(err.code, BaasErrorCode::BadProtocolMessage);
}

#[test]
fn test_reply_envelope_bad_base64_is_protocol_error() {
    let body = serde_json::to_vec(&serde_json::json!({
        "code": "0",
        "msg": "",
        "data": "!!! not base64 !!!",
    }))
    .unwrap();
    let env = ReplyEnvelope::parse(&body).unwrap();
    let err = env.doc_payload().unwrap_err();
    assert_eq!(err.code, BaasErrorCode::BadProtocolMessage);
}

#[test]
fn test_decode_records_reply() -> Result<(), Box<dyn Error>> {
    let mut doc = MapValue::new();
    let recs = vec![
        FieldValue::Map(MapValue::new().str("item", "pencil").i64("qty", 120)),
        FieldValue::Map(MapValue::new().str("item", "pen").i64("qty", 30)),
    ];
    doc.put_array(RECORDS, recs);
    let body = reply_with_doc("0", &doc);

    let env = ReplyEnvelope::parse(&body)?.check("find goods", "")?;
    let mut r = Reader::new().from_bytes(&env.doc_payload()?);
    let records = decode_records_reply(&mut r)?;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].get_string("item").ok_or("item missing")?, "pencil");
    assert_eq!(records[1].get_i64("qty").ok_or("qty missing")?, 30);
    Ok(())
}

#[test]
fn test_decode_empty_records_reply() -> Result<(), Box<dyn Error>> {
    // a successful-but-empty result binds to a zero-length sequence
    let mut doc = MapValue::new();
    doc.put_array(RECORDS, Vec::new());
    let body = reply_with_doc("0", &doc);
    let env = ReplyEnvelope::parse(&body)?.check("find goods", "")?;
    let mut r = Reader::new().from_bytes(&env.doc_payload()?);
    assert_eq!(decode_records_reply(&mut r)?.len(), 0);
    Ok(())
}

#[test]
fn test_single_record_binds_first_of_list() -> Result<(), Box<dyn Error>> {
    // a single-record find is a Find with limit one; the target binds the
    // first (only) element of the record list
    let mut doc = MapValue::new();
    doc.put_array(
        RECORDS,
        vec![FieldValue::Map(MapValue::new().str("item", "pencil"))],
    );
    let mut w = Writer::new();
    w.write_map_value(&doc);
    let mut r = Reader::new().from_bytes(w.bytes());
    let records = decode_records_reply(&mut r)?;
    let rec = records.into_iter().next().ok_or("record missing")?;
    assert_eq!(rec.get_string("item").ok_or("item missing")?, "pencil");
    Ok(())
}

#[test]
fn test_absent_record_reply_is_not_an_error() -> Result<(), Box<dyn Error>> {
    // no records field at all: binds to nothing, not an error
    let doc = MapValue::new();
    let mut w = Writer::new();
    w.write_map_value(&doc);
    let mut r = Reader::new().from_bytes(w.bytes());
    assert!(decode_records_reply(&mut r)?.into_iter().next().is_none());
    Ok(())
}

#[test]
fn test_decode_ids_reply_in_order() -> Result<(), Box<dyn Error>> {
    let mut doc = MapValue::new();
    doc.put_array(
        IDS,
        vec![
            FieldValue::String("61d3f7b088e069bd971f5552".to_string()),
            FieldValue::String("61d3f7b5ccc793268ce1da72".to_string()),
            FieldValue::String("61d3f7b5ccc793268ce1da73".to_string()),
        ],
    );
    let mut w = Writer::new();
    w.write_map_value(&doc);
    let mut r = Reader::new().from_bytes(w.bytes());
    let ids = decode_ids_reply(&mut r)?;
    assert_eq!(ids.len(), 3);
    assert_eq!(ids[0], "61d3f7b088e069bd971f5552");
    assert_eq!(ids[2], "61d3f7b5ccc793268ce1da73");
    Ok(())
}

#[test]
fn test_reply_decode_skips_unknown_fields() -> Result<(), Box<dyn Error>> {
    // a newer service may add reply fields; decoding skips what it does
    // not know
    let mut doc = MapValue::new();
    doc.put_str("future_field", "whatever");
    doc.put_i64(COUNT, 7);
    doc.put_bool("another_flag", true);
    let mut w = Writer::new();
    w.write_map_value(&doc);
    let mut r = Reader::new().from_bytes(w.bytes());
    assert_eq!(decode_count_reply(&mut r)?, 7);
    Ok(())
}

#[test]
fn test_doc_serializer_walker_roundtrip() -> Result<(), Box<dyn Error>> {
    use crate::types::OpKind;
    use std::time::Duration;

    let mut w = Writer::new();
    let mut ds = DocSerializer::start_request(&mut w);
    ds.start_header();
    ds.write_header(OpKind::Count, &Duration::from_secs(30), "goods");
    ds.end_header();
    ds.start_payload();
    ds.write_map_field(FILTER, &MapValue::new().str("item", "pencil"));
    ds.end_payload();
    ds.end_request();

    let mut r = Reader::new().from_bytes(w.bytes());
    let req = r.read_field_value()?.get_map_value()?;
    let header = req.get_map(HEADER).ok_or("header missing")?;
    assert_eq!(header.get_i32(VERSION).ok_or("version missing")?, PROTOCOL_VERSION);
    assert_eq!(header.get_string(TABLE_NAME).ok_or("table missing")?, "goods");
    assert_eq!(
        header.get_i32(OP_KIND).ok_or("op missing")?,
        OpKind::Count as i32
    );
    assert_eq!(header.get_i32(TIMEOUT).ok_or("timeout missing")?, 30000);
    let payload = req.get_map(PAYLOAD).ok_or("payload missing")?;
    let filter = payload.get_map(FILTER).ok_or("filter missing")?;
    assert_eq!(filter.get_string("item").ok_or("item missing")?, "pencil");
    Ok(())
}

#[test]
fn test_frame_command_is_base64() {
    let mut w = Writer::new();
    w.write_map(&MapValue::new().str("k", "v"));
    let framed = frame_command(&w);
    let back = BASE64_STANDARD.decode(&framed).expect("frame should be base64");
    assert_eq!(back, w.buf);
}

#[test]
fn test_transport_error_mapping() {
    // decode failures indicate a protocol mismatch, classified as a
    // system-failure-class error
    let e: BaasError = serde_json::from_slice::<serde_json::Value>(b"{{{")
        .unwrap_err()
        .into();
    assert_eq!(e.code, BaasErrorCode::BadProtocolMessage);
}
