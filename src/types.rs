//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use bigdecimal::BigDecimal;
use bigdecimal::Num;
use chrono::{DateTime, FixedOffset};
use std::collections::btree_map::Iter;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::result::Result;
use std::string::String;
use std::vec::Vec;

pub use baas_rust_sdk_derive::*;

use num_enum::TryFromPrimitive;

use crate::error::param_err;
use crate::error::BaasError;
use crate::error::BaasErrorCode::BadProtocolMessage;

type BaasDateTime = DateTime<FixedOffset>;

// Internal document field types used for wire encoding.
#[derive(Debug, Eq, PartialEq, TryFromPrimitive)]
#[repr(u8)]
pub(crate) enum FieldType {
    // Array represents the Array data type.
    // An array is an ordered collection of zero or more elements.
    Array = 0,

    // Binary represents the Binary data type.
    // A binary is an uninterpreted sequence of zero or more u8 bytes.
    Binary, // 1

    // Boolean data type has only two possible values: true and false.
    Boolean, // 2

    // Double data type represents the set of all IEEE-754 64-bit floating-point numbers.
    Double, // 3

    // Integer data type represents the set of all signed 32-bit integers.
    Integer, // 4

    // Long data type represents the set of all signed 64-bit integers.
    Long, // 5

    // Map represents the Map data type.
    // A map is a collection of string keys to values of any field type.
    Map, // 6

    // String represents the set of string values.
    String, // 7

    // Timestamp represents a point in time as a datetime with fixed offset timezone.
    Timestamp, // 8

    // Number represents arbitrary precision numbers.
    Number, // 9

    // JsonNull represents a special value that indicates the absence of
    // an actual value within a JSON data type.
    JsonNull, // 10

    // Null represents a special value that indicates the absence of
    // an actual value, or the fact that a value is unknown or inapplicable.
    Null, // 11
}

impl FieldType {
    pub(crate) fn try_from_u8(val: u8) -> Result<Self, BaasError> {
        match FieldType::try_from(val) {
            Ok(ft) => {
                return Ok(ft);
            }
            Err(_) => {
                return Err(BaasError::new(
                    BadProtocolMessage,
                    &format!("unrecognized field type {}", val),
                ));
            }
        }
    }
}

/// A specific struct to distinguish between a contiguous array of bytes (Binary)
/// versus a document ARRAY of bytes (Array).
///
/// This is a simple wrapper struct around `Vec<u8>` so the [`ToFieldValue`] and
/// [`FromFieldValue`] traits can correctly identify when a record field should
/// have binary data versus an array of bytes.
/// It is left as a pure public struct to allow direct setting and taking of the
/// underlying vector.
#[derive(Debug, Clone)]
pub struct BaasBinary {
    pub data: Vec<u8>,
}

/// The base struct for all data items exchanged with the document store.
///
/// Each data item is an instance of `FieldValue` allowing access to its type and
/// its value. The type system is similar to that of JSON with extensions
/// (timestamps, binary, arbitrary-precision numbers).
///
/// `FieldValue` instances used for create/update operations are not validated
/// against any schema in the driver; the resource service validates them.
///
/// `FieldValue` instances are created in several ways:
///
///  - From native Rust primitives or structs, using implementations of the
///    [`ToFieldValue`] trait.
///  - Inherently from [`MapValue::column()`] calls. This is the typical path
///    when creating records to be inserted into collections.
///  - Returned by operations on a collection. These instances will typically be
///    [`MapValue`]s mapping string field names to `FieldValue` values.
///
/// `FieldValue` instances are not thread-safe. On input, they should not be
/// reused until the operation that uses them has returned.
// Note: do not derive Clone. Use clone_internal() when needed.
#[derive(Debug, Default)]
pub enum FieldValue {
    Array(Vec<FieldValue>),
    Binary(Vec<u8>),
    Boolean(bool),
    Double(f64),
    Integer(i32),
    Long(i64),
    Map(MapValue),
    String(String),
    Timestamp(DateTime<FixedOffset>),
    Number(BigDecimal),
    JsonNull,
    Null,
    #[default]
    Uninitialized,
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::Array(a), FieldValue::Array(b)) => a == b,
            (FieldValue::Binary(a), FieldValue::Binary(b)) => a == b,
            (FieldValue::Boolean(a), FieldValue::Boolean(b)) => a == b,
            (FieldValue::Double(a), FieldValue::Double(b)) => a == b,
            (FieldValue::Integer(a), FieldValue::Integer(b)) => a == b,
            (FieldValue::Long(a), FieldValue::Long(b)) => a == b,
            (FieldValue::Map(a), FieldValue::Map(b)) => a == b,
            (FieldValue::String(a), FieldValue::String(b)) => a == b,
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => a == b,
            (FieldValue::Number(a), FieldValue::Number(b)) => a == b,
            (FieldValue::JsonNull, FieldValue::JsonNull) => true,
            (FieldValue::Null, FieldValue::Null) => true,
            (FieldValue::Uninitialized, FieldValue::Uninitialized) => true,
            _ => false,
        }
    }
}

impl FieldValue {
    pub fn new() -> Self {
        FieldValue::Uninitialized
    }
    pub fn get_map_value(self) -> Result<MapValue, BaasError> {
        if let FieldValue::Map(mv) = self {
            return Ok(mv);
        }
        param_err!("get_map_value: not a Map: {:?}", self)
    }
    pub fn get_map_value_ref(&self) -> Result<&MapValue, BaasError> {
        if let FieldValue::Map(mv) = self {
            return Ok(mv);
        }
        param_err!("get_map_value_ref: not a Map: {:?}", self)
    }
    pub fn get_array_value(self) -> Result<Vec<FieldValue>, BaasError> {
        if let FieldValue::Array(av) = self {
            return Ok(av);
        }
        param_err!("get_array_value: not an Array: {:?}", self)
    }
    pub fn get_array_value_ref(&self) -> Result<&Vec<FieldValue>, BaasError> {
        if let FieldValue::Array(av) = self {
            return Ok(av);
        }
        param_err!("get_array_value_ref: not an Array: {:?}", self)
    }
    pub fn is_atomic(&self) -> bool {
        match self {
            FieldValue::Array(_) => false,
            FieldValue::Map(_) => false,
            _ => true,
        }
    }
    pub fn is_null(&self) -> bool {
        match self {
            FieldValue::JsonNull => true,
            FieldValue::Null => true,
            FieldValue::Uninitialized => true,
            _ => false,
        }
    }
    pub fn is_numeric(&self) -> bool {
        match self {
            FieldValue::Integer(_) => true,
            FieldValue::Long(_) => true,
            FieldValue::Number(_) => true,
            FieldValue::Double(_) => true,
            _ => false,
        }
    }
    // This exists because we want to be sure that FieldValues
    // never get cloned without us doing it specifically.
    pub(crate) fn clone_internal(&self) -> FieldValue {
        match self {
            FieldValue::Array(a) => {
                let mut v: Vec<FieldValue> = Vec::with_capacity(a.len());
                for i in a {
                    v.push(i.clone_internal());
                }
                return FieldValue::Array(v);
            }
            FieldValue::Map(m) => FieldValue::Map(m.clone_internal()),
            FieldValue::Integer(i) => FieldValue::Integer(i.clone()),
            FieldValue::Long(l) => FieldValue::Long(l.clone()),
            FieldValue::Number(n) => FieldValue::Number(n.clone()),
            FieldValue::Double(d) => FieldValue::Double(d.clone()),
            FieldValue::String(s) => FieldValue::String(s.clone()),
            FieldValue::Boolean(b) => FieldValue::Boolean(b.clone()),
            FieldValue::Binary(b) => FieldValue::Binary(b.clone()),
            FieldValue::Timestamp(t) => FieldValue::Timestamp(t.clone()),
            FieldValue::JsonNull => FieldValue::JsonNull,
            FieldValue::Null => FieldValue::Null,
            FieldValue::Uninitialized => FieldValue::Uninitialized,
        }
    }
    pub fn as_i32(&self) -> Result<i32, BaasError> {
        if let FieldValue::Integer(i) = self {
            return Ok(*i);
        }
        param_err!("as_i32 called for {:?}", self)
    }
    pub fn as_i64(&self) -> Result<i64, BaasError> {
        match self {
            FieldValue::Integer(i) => {
                return Ok(*i as i64);
            }
            FieldValue::Long(l) => {
                return Ok(*l);
            }
            _ => {
                return param_err!("as_i64 called for {:?}", self);
            }
        }
    }
    pub fn as_f64(&self) -> Result<f64, BaasError> {
        match self {
            FieldValue::Integer(i) => {
                return Ok(*i as f64);
            }
            FieldValue::Long(l) => {
                return Ok(*l as f64);
            }
            FieldValue::Double(d) => {
                return Ok(*d);
            }
            _ => {
                return param_err!("as_f64 called for {:?}", self);
            }
        }
    }
    pub fn as_string(&self) -> Result<String, BaasError> {
        if let FieldValue::String(s) = self {
            return Ok(s.clone());
        }
        param_err!("as_string called for {:?}", self)
    }
    pub fn as_big_decimal(&self) -> Result<BigDecimal, BaasError> {
        match self {
            FieldValue::Integer(i) => {
                return Ok(bd_try_from_i64(*i as i64)?);
            }
            FieldValue::Long(l) => {
                return Ok(bd_try_from_i64(*l)?);
            }
            FieldValue::Double(d) => {
                return Ok(bd_try_from_f64(*d)?);
            }
            FieldValue::Number(n) => {
                return Ok(n.clone());
            }
            FieldValue::String(s) => {
                return Ok(bd_try_from_str(s)?);
            }
            _ => {
                return param_err!("as_big_decimal called for {:?}", self);
            }
        }
    }
}

pub(crate) fn bd_try_from_f64(val: f64) -> Result<BigDecimal, BaasError> {
    match BigDecimal::try_from(val) {
        Ok(bd) => {
            return Ok(bd);
        }
        Err(e) => {
            return param_err!(
                "error converting f64({}) to BigDecimal: {}",
                val,
                e.to_string()
            );
        }
    }
}

pub(crate) fn bd_try_from_i64(val: i64) -> Result<BigDecimal, BaasError> {
    match BigDecimal::try_from(val) {
        Ok(bd) => {
            return Ok(bd);
        }
        Err(e) => {
            return param_err!(
                "error converting i64({}) to BigDecimal: {}",
                val,
                e.to_string()
            );
        }
    }
}

pub(crate) fn bd_try_from_str(val: &str) -> Result<BigDecimal, BaasError> {
    match BigDecimal::from_str_radix(val, 10) {
        Ok(bd) => {
            return Ok(bd);
        }
        Err(e) => {
            return param_err!(
                "error converting str({}) to BigDecimal: {}",
                val,
                e.to_string()
            );
        }
    }
}

/// Trait for converting native Rust values into [`FieldValue`]s.
pub trait ToFieldValue {
    fn to_field_value(&self) -> FieldValue;
}

impl ToFieldValue for FieldValue {
    fn to_field_value(&self) -> FieldValue {
        self.clone_internal()
    }
}
impl ToFieldValue for f64 {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Double(*self)
    }
}
impl ToFieldValue for i64 {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Long(*self)
    }
}
impl ToFieldValue for i32 {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Integer(*self)
    }
}
impl ToFieldValue for i8 {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Integer(*self as i32)
    }
}
impl ToFieldValue for i16 {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Integer(*self as i32)
    }
}
impl ToFieldValue for String {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::String(self.to_string())
    }
}
impl ToFieldValue for &str {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::String(self.to_string())
    }
}
impl ToFieldValue for bool {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Boolean(*self)
    }
}
impl ToFieldValue for BigDecimal {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Number(self.clone())
    }
}
impl ToFieldValue for BaasBinary {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Binary(self.data.to_vec())
    }
}
impl ToFieldValue for MapValue {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Map(self.clone_internal())
    }
}
impl ToFieldValue for DateTime<FixedOffset> {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Timestamp(self.clone())
    }
}

impl ToFieldValue for serde_json::value::Value {
    fn to_field_value(&self) -> FieldValue {
        match self {
            serde_json::Value::Bool(b) => {
                return FieldValue::Boolean(*b);
            }
            serde_json::Value::String(s) => {
                return FieldValue::String(s.clone());
            }
            serde_json::Value::Null => {
                return FieldValue::JsonNull;
            }
            serde_json::Value::Number(n) => {
                if n.is_f64() {
                    return FieldValue::Double(n.as_f64().unwrap());
                } else if n.is_i64() {
                    let nv64 = n.as_i64().unwrap();
                    if let Ok(nv32) = i32::try_from(nv64) {
                        return FieldValue::Integer(nv32);
                    } else {
                        return FieldValue::Long(nv64);
                    }
                } else {
                    // try converting the string representation to a BigDecimal number
                    if let Ok(bd) = BigDecimal::from_str_radix(&n.to_string(), 10) {
                        return FieldValue::Number(bd);
                    }
                    // For now, just set a String
                    return FieldValue::String(n.to_string());
                }
            }
            serde_json::Value::Array(a) => {
                let mut arr: Vec<FieldValue> = Vec::new();
                for v in a {
                    arr.push(v.to_field_value());
                }
                return FieldValue::Array(arr);
            }
            serde_json::Value::Object(_) => {
                return FieldValue::Map(MapValue::from_json_object(self).unwrap());
            }
        }
    }
}

impl<T: ToFieldValue> ToFieldValue for Option<T> {
    fn to_field_value(&self) -> FieldValue {
        if let Some(v) = self {
            v.to_field_value()
        } else {
            FieldValue::Null
        }
    }
}

impl<T: ToFieldValue> ToFieldValue for &T {
    fn to_field_value(&self) -> FieldValue {
        let v = *self;
        v.to_field_value()
    }
}

impl<T: ToFieldValue> ToFieldValue for Vec<T> {
    fn to_field_value(&self) -> FieldValue {
        let v: Vec<FieldValue> = self.iter().map(|i| i.to_field_value()).collect();
        FieldValue::Array(v)
    }
}

impl<T: ToFieldValue> ToFieldValue for HashMap<String, T> {
    fn to_field_value(&self) -> FieldValue {
        let mut m = MapValue::new();
        for (k, v) in self {
            m.put(k, v);
        }
        FieldValue::Map(m)
    }
}
impl<T: ToFieldValue> ToFieldValue for BTreeMap<String, T> {
    fn to_field_value(&self) -> FieldValue {
        let mut m = MapValue::new();
        for (k, v) in self {
            m.put(k, v);
        }
        FieldValue::Map(m)
    }
}

/// Trait for converting [`FieldValue`]s back into native Rust values.
pub trait FromFieldValue {
    fn from_field(fv: &FieldValue) -> Result<Self, BaasError>
    where
        Self: Sized;
}

// a simple macro to make the following impls easier to read
macro_rules! ffv {
    ($f:expr, $a:path, $b:literal) => {{
        if let $a(v) = $f {
            return Ok(v.clone());
        }
        param_err!(
            "wrong type for field: expected {}, actual: {:?}",
            $b,
            $f
        )
    }};
}

impl FromFieldValue for i32 {
    fn from_field(fv: &FieldValue) -> Result<Self, BaasError> {
        ffv! {fv, FieldValue::Integer, "Integer"}
    }
}
impl FromFieldValue for i64 {
    fn from_field(fv: &FieldValue) -> Result<Self, BaasError> {
        match fv {
            FieldValue::Long(v) => Ok(*v),
            FieldValue::Integer(v) => Ok(*v as i64),
            _ => param_err!("wrong type for field: expected Long, actual: {:?}", fv),
        }
    }
}
impl FromFieldValue for f64 {
    fn from_field(fv: &FieldValue) -> Result<Self, BaasError> {
        ffv! {fv, FieldValue::Double, "Double"}
    }
}
impl FromFieldValue for String {
    fn from_field(fv: &FieldValue) -> Result<Self, BaasError> {
        ffv! {fv, FieldValue::String, "String"}
    }
}
impl FromFieldValue for BigDecimal {
    fn from_field(fv: &FieldValue) -> Result<Self, BaasError> {
        ffv! {fv, FieldValue::Number, "Number"}
    }
}
impl FromFieldValue for BaasDateTime {
    fn from_field(fv: &FieldValue) -> Result<Self, BaasError> {
        if let FieldValue::Timestamp(v) = fv {
            return Ok(v.clone());
        }
        // allow string-->Timestamp if it fits with RFC3339
        if let FieldValue::String(s) = fv {
            return Ok(string_to_rfc3339(s)?);
        }
        param_err!(
            "wrong type for field: expected FieldValue::Timestamp, actual: {:?}",
            fv
        )
    }
}
impl FromFieldValue for bool {
    fn from_field(fv: &FieldValue) -> Result<Self, BaasError> {
        ffv! {fv, FieldValue::Boolean, "Boolean"}
    }
}
impl FromFieldValue for BaasBinary {
    fn from_field(fv: &FieldValue) -> Result<Self, BaasError> {
        if let FieldValue::Binary(v) = fv {
            return Ok(BaasBinary { data: v.clone() });
        }
        param_err!(
            "wrong type for field: expected Binary, actual: {:?}",
            fv
        )
    }
}
impl FromFieldValue for MapValue {
    fn from_field(fv: &FieldValue) -> Result<Self, BaasError> {
        if let FieldValue::Map(v) = fv {
            return Ok(v.clone_internal());
        }
        param_err!("wrong type for field: expected Map, actual: {:?}", fv)
    }
}
impl<T: FromFieldValue> FromFieldValue for Option<T> {
    fn from_field(fv: &FieldValue) -> Result<Self, BaasError> {
        match fv {
            FieldValue::Null => return Ok(None),
            FieldValue::JsonNull => return Ok(None),
            FieldValue::Uninitialized => return Ok(None),
            _ => (),
        }
        Ok(Some(T::from_field(fv)?))
    }
}
impl<T: FromFieldValue> FromFieldValue for Vec<T> {
    fn from_field(fv: &FieldValue) -> Result<Self, BaasError> {
        if let FieldValue::Array(v) = fv {
            let mut v1: Vec<T> = Vec::new();
            for i in v {
                v1.push(T::from_field(i)?);
            }
            return Ok(v1);
        }
        return param_err!(
            "wrong type for field: expected Array, actual: {:?}",
            fv
        );
    }
}
impl<T: FromFieldValue> FromFieldValue for HashMap<String, T> {
    fn from_field(fv: &FieldValue) -> Result<Self, BaasError> {
        if let FieldValue::Map(v) = fv {
            let mut m1: HashMap<String, T> = HashMap::new();
            for (s, v) in v.iter() {
                m1.insert(s.to_string(), T::from_field(v)?);
            }
            return Ok(m1);
        }
        return param_err!(
            "wrong type for field: expected Map, actual: {:?}",
            fv
        );
    }
}
impl<T: FromFieldValue> FromFieldValue for BTreeMap<String, T> {
    fn from_field(fv: &FieldValue) -> Result<Self, BaasError> {
        if let FieldValue::Map(v) = fv {
            let mut m1: BTreeMap<String, T> = BTreeMap::new();
            for (s, v) in v.iter() {
                m1.insert(s.to_string(), T::from_field(v)?);
            }
            return Ok(m1);
        }
        return param_err!(
            "wrong type for field: expected Map, actual: {:?}",
            fv
        );
    }
}

/// Trait for reading one named column of a [`MapValue`] into a native value.
pub trait FromMapColumn {
    fn from_map(&self, key: &str, mv: &MapValue) -> Result<Self, BaasError>
    where
        Self: Sized;
}

const UNINITIALIZED_FIELD_VALUE: FieldValue = FieldValue::Uninitialized;

impl<T: FromFieldValue> FromMapColumn for T {
    fn from_map(&self, key: &str, mv: &MapValue) -> Result<Self, BaasError> {
        if let Some(fv) = mv.get_field_value(key) {
            return T::from_field(fv);
        }
        T::from_field(&UNINITIALIZED_FIELD_VALUE)
    }
}

/// Struct representing a single record (document) in a collection.
///
/// This struct is basically a Map of `String` to [`FieldValue`]. It is the
/// primary struct for specifying the data in a single record, and the raw
/// result shape when no native struct binding is wanted.
///
// Note: do not derive Clone. Use clone_internal() when needed.
#[derive(Default, Debug, PartialEq)]
pub struct MapValue {
    pub(crate) m: BTreeMap<String, FieldValue>,
}

impl MapValue {
    pub fn new() -> Self {
        Default::default()
    }

    pub(crate) fn clone_internal(&self) -> MapValue {
        let mut m = BTreeMap::new();
        for i in &self.m {
            m.insert(i.0.to_string(), i.1.clone_internal());
        }
        MapValue { m: m }
    }

    pub fn from_json_map(
        json: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self, BaasError> {
        let mut mv = MapValue::new();
        for (key, val) in json {
            if val.is_null() {
                mv.put_field_value(key, FieldValue::JsonNull);
            } else {
                mv.put(key, val);
            }
        }
        return Ok(mv);
    }

    pub fn from_json_object(json: &serde_json::value::Value) -> Result<Self, BaasError> {
        if let serde_json::Value::Object(o) = json {
            return Self::from_json_map(o);
        }
        param_err!("from_json_object: json value is not an Object: {:#?}", json)
    }

    pub fn len(&self) -> usize {
        self.m.len()
    }

    pub fn is_empty(&self) -> bool {
        self.m.is_empty()
    }

    pub fn iter(&self) -> Iter<String, FieldValue> {
        self.m.iter()
    }

    pub fn put(&mut self, key: &str, val: impl ToFieldValue) {
        self.m.insert(key.to_string(), val.to_field_value());
    }

    pub fn column(mut self, key: &str, val: impl ToFieldValue) -> MapValue {
        self.m.insert(key.to_string(), val.to_field_value());
        self
    }

    pub fn put_i32(&mut self, key: &str, val: i32) {
        self.m.insert(key.to_string(), FieldValue::Integer(val));
    }
    pub fn i32(mut self, key: &str, val: i32) -> MapValue {
        self.put_i32(key, val);
        self
    }
    pub fn get_i32(&self, key: &str) -> Option<i32> {
        if let FieldValue::Integer(i) = self.m.get(key)? {
            Some(*i)
        } else {
            None
        }
    }

    pub fn put_i64(&mut self, key: &str, val: i64) {
        self.m.insert(key.to_string(), FieldValue::Long(val));
    }
    pub fn i64(mut self, key: &str, val: i64) -> MapValue {
        self.put_i64(key, val);
        self
    }
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        if let FieldValue::Long(i) = self.m.get(key)? {
            Some(*i)
        } else {
            None
        }
    }

    pub fn put_float64(&mut self, key: &str, val: f64) {
        self.m.insert(key.to_string(), FieldValue::Double(val));
    }
    pub fn get_float64(&self, key: &str) -> Option<f64> {
        if let FieldValue::Double(i) = self.m.get(key)? {
            Some(*i)
        } else {
            None
        }
    }

    pub fn put_str(&mut self, key: &str, val: &str) {
        self.put_string(key, val.to_string())
    }
    pub fn str(mut self, key: &str, val: &str) -> MapValue {
        self.put_str(key, val);
        self
    }
    pub fn put_string(&mut self, key: &str, val: String) {
        self.m.insert(key.to_string(), FieldValue::String(val));
    }
    pub fn string(mut self, key: &str, val: String) -> MapValue {
        self.put_string(key, val);
        self
    }
    pub fn get_string(&self, key: &str) -> Option<String> {
        if let FieldValue::String(s) = self.m.get(key)? {
            Some(s.clone())
        } else {
            None
        }
    }

    pub fn put_timestamp(&mut self, key: &str, val: &DateTime<FixedOffset>) {
        self.m
            .insert(key.to_string(), FieldValue::Timestamp(val.clone()));
    }
    pub fn timestamp(mut self, key: &str, val: &DateTime<FixedOffset>) -> MapValue {
        self.put_timestamp(key, val);
        self
    }
    pub fn get_timestamp(&self, key: &str) -> Option<DateTime<FixedOffset>> {
        if let FieldValue::Timestamp(t) = self.m.get(key)? {
            Some(t.clone())
        } else {
            None
        }
    }

    pub fn put_bool(&mut self, key: &str, val: bool) {
        self.m.insert(key.to_string(), FieldValue::Boolean(val));
    }
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        if let FieldValue::Boolean(b) = self.m.get(key)? {
            Some(*b)
        } else {
            None
        }
    }

    pub fn put_binary(&mut self, key: &str, val: Vec<u8>) {
        self.m.insert(key.to_string(), FieldValue::Binary(val));
    }
    pub fn get_binary(&self, key: &str) -> Option<&Vec<u8>> {
        if let FieldValue::Binary(b) = self.m.get(key)? {
            Some(b)
        } else {
            None
        }
    }

    pub fn put_array(&mut self, key: &str, val: Vec<FieldValue>) {
        self.m.insert(key.to_string(), FieldValue::Array(val));
    }
    pub fn get_array(&self, key: &str) -> Option<&Vec<FieldValue>> {
        if let FieldValue::Array(a) = self.m.get(key)? {
            Some(a)
        } else {
            None
        }
    }

    pub fn put_field_value(&mut self, key: &str, val: FieldValue) {
        self.m.insert(key.to_string(), val);
    }
    pub fn get_field_value(&self, key: &str) -> Option<&FieldValue> {
        Some(self.m.get(key)?)
    }
    pub fn get_field_value_clone(&self, key: &str) -> Option<FieldValue> {
        Some(self.m.get(key)?.clone_internal())
    }
    pub fn take_field_value(&mut self, key: &str) -> Result<FieldValue, BaasError> {
        if let Some(v) = self.m.remove(key) {
            return Ok(v);
        }
        param_err!("field '{}' does not exist in map", key)
    }

    pub fn get_map(&self, key: &str) -> Option<&MapValue> {
        if let FieldValue::Map(a) = self.m.get(key)? {
            Some(a)
        } else {
            None
        }
    }

    pub fn put_json_map_value(&mut self, key: &str, json: &str) -> Result<(), BaasError> {
        let vr: Result<serde_json::Value, serde_json::Error> = serde_json::from_str(json);
        match vr {
            Ok(v) => {
                let mv = MapValue::from_json_object(&v)?;
                self.put_field_value(key, FieldValue::Map(mv));
                return Ok(());
            }
            Err(e) => {
                return param_err!("error parsing json into MapValue: {}", e.to_string());
            }
        }
    }
}

impl std::fmt::Display for MapValue {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:#?}", self)
    }
}

/// Trait that defines methods to convert to and from a [`MapValue`] record.
///
/// It is typically not necessary to implement this trait for structs. Instead,
/// use the [`derive@BaasRow`] derive macro to automatically have a struct
/// implement this trait. [`MapValue`] itself implements it, so raw untyped
/// documents can be bound wherever a `BaasRow` target is accepted.
pub trait BaasRow {
    /// Create a new [`MapValue`] based on the contents of `Self`.
    fn to_map_value(&self) -> Result<MapValue, BaasError>;
    /// Populate `Self` from the given [`MapValue`].
    fn from_map_value(&mut self, value: &MapValue) -> Result<(), BaasError>;
}

impl BaasRow for MapValue {
    fn to_map_value(&self) -> Result<MapValue, BaasError> {
        Ok(self.clone_internal())
    }
    fn from_map_value(&mut self, value: &MapValue) -> Result<(), BaasError> {
        self.m = value.clone_internal().m;
        Ok(())
    }
}

pub(crate) fn string_to_rfc3339(s: &str) -> Result<DateTime<FixedOffset>, BaasError> {
    // try as-is
    let ret = DateTime::parse_from_rfc3339(s);
    match ret {
        Ok(dt) => return Ok(dt),
        _ => {}
    }
    // if that didn't work, try adding a "Z" to the end
    let mut ds = std::string::String::from(s);
    ds.push('Z');
    let ret1 = DateTime::parse_from_rfc3339(&ds);
    match ret1 {
        Ok(dt) => return Ok(dt),
        Err(_) => {
            return param_err!("error parsing string '{}' into RFC3339 timestamp", s);
        }
    }
}

/// The kind of a compiled document-store command.
///
/// Exactly one kind is assigned per compiled command; it determines which
/// optional fields of the command envelope are populated.
#[derive(Clone, Copy, Debug, Eq, PartialEq, TryFromPrimitive)]
#[repr(i32)]
pub(crate) enum OpKind {
    // Insert is used for the operation that creates one record.
    Insert = 0,

    // Find is used for the operation that retrieves all records matching
    // the compiled filter. A single-record find is the same operation with
    // an implicit limit of one record.
    Find, // 1

    // Update applies a patch to all matching records.
    Update, // 2

    // Upsert applies a patch to all matching records, creating one if
    // none match.
    Upsert, // 3

    // Delete removes all matching records.
    Delete, // 4

    // Count returns the number of matching records.
    Count, // 5

    // BatchInsert creates multiple records in one round trip.
    BatchInsert, // 6

    // BatchUpdate applies a patch to all matching records in one round trip.
    BatchUpdate, // 7

    // BatchDelete removes all matching records in one round trip.
    BatchDelete, // 8

    // Distinct returns the distinct values of one field across all
    // matching records.
    Distinct, // 9

    // Aggregate runs a grouping pipeline.
    Aggregate, // 10
}
