//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use bigdecimal::BigDecimal;
use bigdecimal::Num;
use chrono::{DateTime, FixedOffset};
use std::result;
use std::str;

use crate::error::BaasError;
use crate::error::BaasErrorCode::BadProtocolMessage;
use crate::error::BaasErrorCode::InvalidParam;
use crate::types::string_to_rfc3339;
use crate::types::FieldType;
use crate::types::FieldValue;
use crate::types::MapValue;
use crate::varint;

// Reader reads byte sequences from the underlying buffer and decodes the
// bytes to construct in-memory representations according to the binary
// document protocol which defines the data exchange format between the
// resource service and its drivers.
pub struct Reader {
    // The underlying byte buffer.
    pub buf: Vec<u8>,
    pub offset: usize,
}

impl Reader {
    pub fn new() -> Reader {
        Reader {
            buf: Vec::with_capacity(256),
            offset: 0,
        }
    }

    pub fn from_bytes(mut self, val: &[u8]) -> Self {
        self.buf.clear();
        self.buf.extend_from_slice(val);
        self
    }

    pub fn read_byte(&mut self) -> result::Result<u8, BaasError> {
        if self.offset >= self.buf.len() {
            return Err(BaasError::new(
                BadProtocolMessage,
                "read_byte reached end of byte buffer",
            ));
        }
        let val: u8 = self.buf[self.offset];
        self.offset += 1;
        Ok(val)
    }

    pub fn read_bool(&mut self) -> result::Result<bool, BaasError> {
        let v = self.read_byte()?;
        Ok(v != 0)
    }

    pub fn read_i16(&mut self) -> result::Result<i16, BaasError> {
        if (self.offset + 2) > self.buf.len() {
            return Err(BaasError::new(
                BadProtocolMessage,
                "read_i16 reached end of byte buffer",
            ));
        }
        let val: [u8; 2] = [self.buf[self.offset], self.buf[self.offset + 1]];
        self.offset += 2;
        Ok(i16::from_be_bytes(val))
    }

    pub fn read_i32(&mut self) -> result::Result<i32, BaasError> {
        if (self.offset + 4) > self.buf.len() {
            return Err(BaasError::new(
                BadProtocolMessage,
                "read_i32 reached end of byte buffer",
            ));
        }
        let val: [u8; 4] = [
            self.buf[self.offset],
            self.buf[self.offset + 1],
            self.buf[self.offset + 2],
            self.buf[self.offset + 3],
        ];
        self.offset += 4;
        Ok(i32::from_be_bytes(val))
    }

    pub fn read_float64(&mut self) -> result::Result<f64, BaasError> {
        if (self.offset + 8) > self.buf.len() {
            return Err(BaasError::new(
                BadProtocolMessage,
                "read_float64 reached end of byte buffer",
            ));
        }
        let val: [u8; 8] = [
            self.buf[self.offset],
            self.buf[self.offset + 1],
            self.buf[self.offset + 2],
            self.buf[self.offset + 3],
            self.buf[self.offset + 4],
            self.buf[self.offset + 5],
            self.buf[self.offset + 6],
            self.buf[self.offset + 7],
        ];
        self.offset += 8;
        Ok(f64::from_be_bytes(val))
    }

    pub fn read_varint_i32(&mut self) -> Result<i32, BaasError> {
        let (val, used) = varint::read_varint_i32(&self.buf, self.offset)?;
        self.offset += used;
        Ok(val)
    }

    pub fn read_varint_i64(&mut self) -> Result<i64, BaasError> {
        let (val, used) = varint::read_varint_i64(&self.buf, self.offset)?;
        self.offset += used;
        Ok(val)
    }

    pub fn read_string(&mut self) -> Result<String, BaasError> {
        let slen = self.read_varint_i32()?;
        if slen <= 0 {
            return Ok("".to_string());
        }
        let ulen = slen as usize;
        if (self.offset + ulen) > self.buf.len() {
            return Err(BaasError::new(
                BadProtocolMessage,
                "read_string reached end of byte buffer",
            ));
        }
        match str::from_utf8(&self.buf[self.offset..(self.offset + ulen)]) {
            Ok(s) => {
                self.offset += ulen;
                return Ok(std::string::String::from(s));
            }
            Err(_) => {
                return Err(BaasError::new(
                    BadProtocolMessage,
                    "invalid utf8 in read_string",
                ));
            }
        }
    }

    pub fn read_timestamp(&mut self) -> Result<DateTime<FixedOffset>, BaasError> {
        let s = self.read_string()?;
        if s.is_empty() {
            return Err(BaasError::new(
                BadProtocolMessage,
                "empty read on timestamp value",
            ));
        }
        string_to_rfc3339(&s)
    }

    pub fn read_binary(&mut self) -> Result<Vec<u8>, BaasError> {
        let slen = self.read_varint_i32()?;
        if slen <= 0 {
            return Ok(Vec::new());
        }
        let ulen = slen as usize;
        if (self.offset + ulen) > self.buf.len() {
            return Err(BaasError::new(
                BadProtocolMessage,
                "read_binary reached end of byte buffer",
            ));
        }
        self.offset += ulen;
        Ok(Vec::from(&self.buf[(self.offset - ulen)..self.offset]))
    }

    pub(crate) fn read_field_value(&mut self) -> Result<FieldValue, BaasError> {
        // read field type
        let u = self.read_byte()?;
        let ftype: FieldType = FieldType::try_from_u8(u)?;
        match ftype {
            FieldType::Integer => {
                let i = self.read_varint_i32()?;
                return Ok(FieldValue::Integer(i));
            }
            FieldType::Long => {
                let l = self.read_varint_i64()?;
                return Ok(FieldValue::Long(l));
            }
            FieldType::Double => {
                let d = self.read_float64()?;
                return Ok(FieldValue::Double(d));
            }
            FieldType::String => {
                let s = self.read_string()?;
                return Ok(FieldValue::String(s));
            }
            FieldType::Array => {
                let arr = self.read_array()?;
                return Ok(FieldValue::Array(arr));
            }
            FieldType::Map => {
                let map = self.read_map()?;
                return Ok(FieldValue::Map(map));
            }
            FieldType::Boolean => {
                let b = self.read_bool()?;
                return Ok(FieldValue::Boolean(b));
            }
            FieldType::Binary => {
                let bin = self.read_binary()?;
                return Ok(FieldValue::Binary(bin));
            }
            FieldType::Timestamp => {
                let dt = self.read_timestamp()?;
                return Ok(FieldValue::Timestamp(dt));
            }
            FieldType::Number => {
                let num = self.read_string()?;
                return Ok(FieldValue::Number(
                    BigDecimal::from_str_radix(&num, 10).map_err(|_| {
                        BaasError::new(
                            InvalidParam,
                            format!("can't convert string '{}' to valid BigDecimal", &num).as_str(),
                        )
                    })?,
                ));
            }
            FieldType::Null => {
                return Ok(FieldValue::Null);
            }
            FieldType::JsonNull => {
                return Ok(FieldValue::JsonNull);
            }
        }
    }

    pub fn read_array(&mut self) -> Result<Vec<FieldValue>, BaasError> {
        // number of bytes consumed by the array.
        let _num_bytes = self.read_i32()?;
        // number of items in the array
        let num_items = self.read_i32()?;
        if num_items < 0 {
            return Err(BaasError::new(
                BadProtocolMessage,
                "invalid item count in read_array",
            ));
        }
        let mut arr = Vec::<FieldValue>::with_capacity(num_items as usize);
        for _i in 0..num_items {
            arr.push(self.read_field_value()?);
        }
        Ok(arr)
    }

    pub fn read_map(&mut self) -> Result<MapValue, BaasError> {
        // number of bytes consumed by the map.
        let _num_bytes = self.read_i32()?;
        // number of items in the map
        let num_items = self.read_i32()?;
        if num_items < 0 {
            return Err(BaasError::new(
                BadProtocolMessage,
                "invalid item count in read_map",
            ));
        }
        let mut mv = MapValue::new();
        for _i in 0..num_items {
            let key = self.read_string()?;
            let val = self.read_field_value()?;
            mv.put_field_value(&key, val);
        }
        Ok(mv)
    }

    pub(crate) fn reset(&mut self) {
        self.offset = 0;
    }
}
