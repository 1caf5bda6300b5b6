//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
#![allow(dead_code)]

use base64::prelude::{Engine as _, BASE64_STANDARD};
use serde_derive::Deserialize;
use std::result::Result;
use std::time::Duration;

use crate::error::{reply_error, BaasError, BaasErrorCode, ReplyStatus};
use crate::reader::Reader;
use crate::types::FieldType;
use crate::types::FieldValue;
use crate::types::MapValue;
use crate::types::OpKind;
use crate::writer::Writer;

pub const PROTOCOL_VERSION: i32 = 3;

// static field names, request side
pub const HEADER: &str = "h";
pub const PAYLOAD: &str = "p";
pub const VERSION: &str = "v";
pub const TABLE_NAME: &str = "n";
pub const OP_KIND: &str = "o";
pub const TIMEOUT: &str = "t";
pub const FILTER: &str = "q";
pub const DOCS: &str = "d";
pub const PATCH: &str = "u";
pub const PROJECTION: &str = "pj";
pub const SORT: &str = "s";
pub const SORT_FIELD: &str = "f";
pub const SORT_DIR: &str = "dr";
pub const OFFSET: &str = "of";
pub const LIMIT: &str = "l";
pub const PIPELINE: &str = "pl";
pub const DISTINCT_FIELD: &str = "df";

// static field names, reply side
pub const RECORDS: &str = "rs";
pub const COUNT: &str = "ct";
pub const IDS: &str = "id";
pub const VALUES: &str = "vl";

/// The JSON reply envelope common to the document-store and cache paths:
/// a status code, a message, and a polymorphic data payload.
///
/// On the document-store path `data` is a base64 string framing the binary
/// reply document; on the cache path it is arbitrary JSON.
#[derive(Debug, Deserialize)]
pub(crate) struct ReplyEnvelope {
    pub(crate) code: String,
    #[serde(default)]
    pub(crate) msg: String,
    #[serde(default)]
    pub(crate) data: serde_json::Value,
}

impl ReplyEnvelope {
    pub(crate) fn parse(body: &[u8]) -> Result<ReplyEnvelope, BaasError> {
        let env: ReplyEnvelope = serde_json::from_slice(body)?;
        Ok(env)
    }

    // Classify the reply code; on any failure class, produce the wrapping
    // error. A successful envelope passes through for payload binding.
    pub(crate) fn check(self, op: &str, log_id: &str) -> Result<ReplyEnvelope, BaasError> {
        match crate::error::classify_reply_code(&self.code) {
            ReplyStatus::Success => Ok(self),
            _ => Err(reply_error(op, &self.code, &self.msg, log_id)),
        }
    }

    // Unframe the base64-encoded binary reply document carried by the
    // document-store path.
    pub(crate) fn doc_payload(&self) -> Result<Vec<u8>, BaasError> {
        match &self.data {
            serde_json::Value::String(s) => Ok(BASE64_STANDARD.decode(s)?),
            _ => Err(BaasError::new(
                BaasErrorCode::BadProtocolMessage,
                "reply data is not a framed document",
            )),
        }
    }
}

// Frame an encoded command document for transport.
pub(crate) fn frame_command(w: &Writer) -> String {
    BASE64_STANDARD.encode(w.bytes())
}

/// The serializer used for all command documents.
pub struct DocSerializer<'a> {
    // writer does the actual writing (to an internal byte array).
    writer: &'a mut Writer,
    // the number of bytes used for maps or arrays
    offset_stack: Vec<usize>,
    // the number of elements in maps or arrays
    size_stack: Vec<i32>,
}

// Maps and Arrays. These objects start with their total length,
// allowing them to be optionally skipped on deserialization.
//  1. start:
//    make a 4-byte space for the ultimate length of the serialized
//    object.
//  2. save the offset on a stack
//  3. start counting elements on a stack
//  4. ... entries are written
//  5. end:
//    a. pop the offset stack to get the original length offset
//    write the real length into the spot that was held
//    b. pop the size stack to get the number of elements
//    write the real number of elements into the spot that was held
// NOTE: a full 4-byte integer is used to avoid the variable-length
// encoding used by varint integers.

impl<'a> DocSerializer<'a> {
    pub fn new(writer: &'a mut Writer) -> DocSerializer {
        DocSerializer {
            writer: writer,
            offset_stack: Vec::new(),
            size_stack: Vec::new(),
        }
    }

    pub(crate) fn incr_size(&mut self, delta: i32) {
        if self.size_stack.len() > 0 {
            let mut i = self.size_stack.pop().unwrap();
            i += delta;
            self.size_stack.push(i);
        }
    }

    pub fn start_field(&mut self, key: &str) {
        self.writer.write_string(&key);
    }

    pub fn end_field(&mut self, _key: &str) {
        self.incr_size(1);
    }

    fn start_map_or_array(&mut self, field: &str, ftype: FieldType) {
        if field != "" {
            self.start_field(field);
        }
        self.writer.write_field_type(ftype);
        let off = self.writer.size();
        self.writer.write_i32(0); // size in bytes
        self.writer.write_i32(0); // number of elements
        self.offset_stack.push(off);
        self.size_stack.push(0);
    }

    pub fn start_map(&mut self, field: &str) {
        self.start_map_or_array(field, FieldType::Map);
    }

    pub fn start_array(&mut self, field: &str) {
        self.start_map_or_array(field, FieldType::Array);
    }

    pub fn end_map(&mut self, field: &str) {
        let length_offset = self.offset_stack.pop().unwrap();
        let num_elems = self.size_stack.pop().unwrap();
        let start = length_offset + 4;
        // write size in bytes, then number of elements into the space reserved
        self.writer
            .write_i32_at_offset((self.writer.size() - start) as i32, length_offset)
            .unwrap();
        self.writer
            .write_i32_at_offset(num_elems, length_offset + 4)
            .unwrap();
        if field != "" {
            self.end_field(field)
        }
    }

    pub fn end_array(&mut self, field: &str) {
        self.end_map(field);
    }

    pub fn start_array_field(&mut self, _idx: i32) {
        // nothing to do
    }

    pub fn end_array_field(&mut self, _idx: i32) {
        self.incr_size(1);
    }

    pub fn write_field(&mut self, key: &str, val: &FieldValue) {
        self.start_field(key);
        self.writer.write_field_value(val);
        self.end_field(key);
    }

    pub fn write_i32_field(&mut self, key: &str, val: i32) {
        self.start_field(key);
        self.writer.write_field_type(FieldType::Integer);
        self.writer.write_varint_i32(val);
        self.end_field(key);
    }

    pub fn write_i64_field(&mut self, key: &str, val: i64) {
        self.start_field(key);
        self.writer.write_field_type(FieldType::Long);
        self.writer.write_varint_i64(val);
        self.end_field(key);
    }

    pub fn write_bool_field(&mut self, key: &str, val: bool) {
        self.start_field(key);
        self.writer.write_field_type(FieldType::Boolean);
        self.writer.write_bool(val);
        self.end_field(key);
    }

    pub fn write_binary_field(&mut self, key: &str, val: &[u8]) {
        self.start_field(key);
        self.writer.write_field_type(FieldType::Binary);
        self.writer.write_bytes(val);
        self.end_field(key);
    }

    pub fn write_map_field(&mut self, key: &str, val: &MapValue) {
        self.start_field(key);
        self.writer.write_map_value(val);
        self.end_field(key);
    }

    // Absent optional fields are omitted from the envelope, not
    // null-filled.
    pub fn write_nonempty_map_field(&mut self, key: &str, val: &MapValue) {
        if val.len() > 0 {
            self.write_map_field(key, val);
        }
    }

    pub fn write_array_field(&mut self, key: &str, val: &Vec<FieldValue>) {
        self.start_field(key);
        self.writer.write_field_type(FieldType::Array);
        self.writer.write_array(val);
        self.end_field(key);
    }

    pub fn write_string_field(&mut self, key: &str, val: &str) {
        self.start_field(key);
        self.writer.write_field_type(FieldType::String);
        self.writer.write_string(val);
        self.end_field(key);
    }

    pub fn write_nonempty_string_field(&mut self, key: &str, val: &str) {
        if val != "" {
            self.write_string_field(key, val);
        }
    }

    pub fn write_optional_i64_field(&mut self, key: &str, val: &Option<i64>) {
        if let Some(v) = val {
            self.write_i64_field(key, *v);
        }
    }

    pub(crate) fn write_header(&mut self, op_kind: OpKind, timeout: &Duration, table_name: &str) {
        self.write_i32_field(VERSION, PROTOCOL_VERSION);
        if table_name != "" {
            self.write_string_field(TABLE_NAME, table_name);
        }
        self.write_i32_field(OP_KIND, op_kind as i32);
        self.write_i32_field(TIMEOUT, timeout.as_millis() as i32);
    }

    pub fn start_header(&mut self) {
        self.start_map(HEADER);
    }

    pub fn end_header(&mut self) {
        self.end_map(HEADER);
    }

    pub fn start_payload(&mut self) {
        self.start_map(PAYLOAD);
    }

    pub fn end_payload(&mut self) {
        self.end_map(PAYLOAD);
    }

    pub fn start_request(writer: &'a mut Writer) -> DocSerializer {
        let mut ds = DocSerializer::new(writer);
        ds.start_map("");
        ds
    }

    pub fn end_request(&mut self) {
        self.end_map("");
    }
}

/// Walks the fields of a binary reply document map one at a time.
pub struct MapWalker<'a> {
    pub(crate) r: &'a mut Reader,
    num_elements: i32,
    current_name: String,
    current_index: i32,
}

// To prevent infinite loops
const MAX_ELEMENTS: i32 = 100000000;

impl<'a> MapWalker<'a> {
    pub fn new(r: &'a mut Reader) -> Result<MapWalker, BaasError> {
        Self::expect_type(r, FieldType::Map)?;
        let _ = r.read_i32()?; // skip map size in bytes
        let num_elements = r.read_i32()?;
        if num_elements < 0 || num_elements > MAX_ELEMENTS {
            return Err(BaasError::new(
                BaasErrorCode::BadProtocolMessage,
                "invalid num_elements in message",
            ));
        }
        Ok(MapWalker {
            r,
            num_elements,
            current_name: "".to_string(),
            current_index: 0,
        })
    }

    pub(crate) fn expect_type(r: &mut Reader, ft: FieldType) -> Result<(), BaasError> {
        let b = r.read_byte()?;
        let fb: u8 = ft as u8;
        if b != fb {
            return Err(BaasError::new(
                BaasErrorCode::BadProtocolMessage,
                format!("expected type {}, found {}", fb, b).as_str(),
            ));
        }
        Ok(())
    }

    pub fn has_next(&self) -> bool {
        self.num_elements > self.current_index
    }

    pub fn next(&mut self) -> Result<(), BaasError> {
        if self.has_next() == false {
            return Err(BaasError::new(
                BaasErrorCode::BadProtocolMessage,
                "cannot call next with no elements remaining",
            ));
        }
        self.current_name = self.r.read_string()?;
        self.current_index += 1;
        Ok(())
    }

    pub fn current_name(&self) -> &String {
        &self.current_name
    }

    pub fn read_doc_map(&mut self) -> Result<MapValue, BaasError> {
        Self::expect_type(self.r, FieldType::Map)?;
        Ok(self.r.read_map()?)
    }

    pub fn read_doc_i64(&mut self) -> Result<i64, BaasError> {
        Self::expect_type(self.r, FieldType::Long)?;
        let i = self.r.read_varint_i64()?;
        Ok(i)
    }

    pub fn read_doc_i32(&mut self) -> Result<i32, BaasError> {
        Self::expect_type(self.r, FieldType::Integer)?;
        let i = self.r.read_varint_i32()?;
        Ok(i)
    }

    pub fn read_doc_string(&mut self) -> Result<String, BaasError> {
        Self::expect_type(self.r, FieldType::String)?;
        let s = self.r.read_string()?;
        Ok(s)
    }

    pub fn read_doc_string_array(&mut self) -> Result<Vec<String>, BaasError> {
        Self::expect_type(self.r, FieldType::Array)?;
        let _ = self.r.read_i32()?; // skip array size in bytes
        let num_elements = self.r.read_i32()?;
        let mut v: Vec<String> = Vec::with_capacity(num_elements as usize);
        for _n in 1..=num_elements {
            v.push(self.read_doc_string()?);
        }
        Ok(v)
    }

    pub fn read_doc_array(&mut self) -> Result<Vec<FieldValue>, BaasError> {
        Self::expect_type(self.r, FieldType::Array)?;
        Ok(self.r.read_array()?)
    }

    pub fn read_doc_binary(&mut self) -> Result<Vec<u8>, BaasError> {
        Self::expect_type(self.r, FieldType::Binary)?;
        let v = self.r.read_binary()?;
        Ok(v)
    }

    pub fn read_doc_boolean(&mut self) -> Result<bool, BaasError> {
        Self::expect_type(self.r, FieldType::Boolean)?;
        let b = self.r.read_bool()?;
        Ok(b)
    }

    pub fn read_doc_field_value(&mut self) -> Result<FieldValue, BaasError> {
        let fv = self.r.read_field_value()?;
        Ok(fv)
    }

    pub fn skip_doc_field(&mut self) -> Result<(), BaasError> {
        let _ = self.r.read_field_value()?;
        Ok(())
    }
}
