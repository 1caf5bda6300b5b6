//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use chrono::{DateTime, FixedOffset};
use serde_derive::Deserialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::result::Result;
use std::time::Duration;

use crate::error::{BaasError, BaasErrorCode};
use crate::handle::{Handle, SendOptions};

/// A sorted-set member with its score.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Z {
    pub score: f64,
    pub member: Value,
}

impl Z {
    pub fn new(score: f64, member: impl Into<Value>) -> Z {
        Z {
            score,
            member: member.into(),
        }
    }
}

/// Range bounds for the score-based sorted-set range commands.
///
/// `min`/`max` use the service's score syntax (`"-inf"`, `"+inf"`,
/// `"(5"` for exclusive bounds, plain numbers for inclusive bounds).
#[derive(Debug, Clone, Default)]
pub struct ZRangeBy {
    pub min: String,
    pub max: String,
    pub offset: i64,
    pub count: i64,
}

/// Options for the sorted-set store commands (inter/union).
#[derive(Debug, Clone, Default)]
pub struct ZStore {
    pub keys: Vec<String>,
    pub weights: Vec<f64>,
    pub aggregate: String,
}

/// Optional byte range for [`Cache::bitcount()`].
#[derive(Debug, Clone, Default)]
pub struct BitCountArgs {
    pub start: i64,
    pub end: i64,
}

/// Pair arguments for the multi-set commands: either a flat alternating
/// key/value list or a single mapping. Both normalize to a flat list
/// before transmission.
#[derive(Debug)]
pub enum KvPairs {
    Flat(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl From<Vec<Value>> for KvPairs {
    fn from(v: Vec<Value>) -> KvPairs {
        KvPairs::Flat(v)
    }
}
impl From<Vec<(&str, &str)>> for KvPairs {
    fn from(v: Vec<(&str, &str)>) -> KvPairs {
        KvPairs::Map(
            v.into_iter()
                .map(|(k, val)| (k.to_string(), Value::from(val)))
                .collect(),
        )
    }
}
impl From<Vec<(String, Value)>> for KvPairs {
    fn from(v: Vec<(String, Value)>) -> KvPairs {
        KvPairs::Map(v.into_iter().collect())
    }
}
impl From<BTreeMap<String, Value>> for KvPairs {
    fn from(m: BTreeMap<String, Value>) -> KvPairs {
        KvPairs::Map(m)
    }
}
impl From<HashMap<String, Value>> for KvPairs {
    fn from(m: HashMap<String, Value>) -> KvPairs {
        KvPairs::Map(m.into_iter().collect())
    }
}

impl KvPairs {
    fn append_to(self, args: &mut Vec<Value>) {
        match self {
            KvPairs::Flat(v) => args.extend(v),
            KvPairs::Map(m) => {
                for (k, v) in m {
                    args.push(Value::from(k));
                    args.push(v);
                }
            }
        }
    }
}

// Sub-second durations cannot be expressed in whole seconds; such values
// switch the expiry arguments to milliseconds.
pub(crate) fn use_precise(d: &Duration) -> bool {
    *d < Duration::from_secs(1) || d.subsec_nanos() != 0
}

pub(crate) fn format_millis(d: &Duration) -> i64 {
    if !d.is_zero() && *d < Duration::from_millis(1) {
        return 1;
    }
    d.as_millis() as i64
}

pub(crate) fn format_secs(d: &Duration) -> i64 {
    if !d.is_zero() && *d < Duration::from_secs(1) {
        return 1;
    }
    d.as_secs() as i64
}

fn key_args(keys: &[&str]) -> Vec<Value> {
    keys.iter().map(|k| Value::from(*k)).collect()
}

/// Client for the key-value (cache) path of the resource service.
///
/// Every command is a single synchronous round trip carrying a lowercase
/// command verb and a positional argument list; the reply payload is
/// decoded into the command's result type. A read of an absent key fails
/// with the distinguished not-found error value, which callers test for
/// explicitly:
///
/// ```no_run
/// use baas_rust_sdk::{Cache, Handle};
/// use std::time::Duration;
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let handle = Handle::builder().endpoint("http://localhost:8080")?.namespace("ns")?.build()?;
/// let cache = Cache::new(&handle);
/// cache.set("key", "value", Some(Duration::from_secs(10))).await?;
/// match cache.get("key").await {
///     Ok(v) => println!("value: {}", v),
///     Err(e) if e.is_not_found() => println!("key expired"),
///     Err(e) => return Err(e.into()),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Cache {
    handle: Handle,
    timeout: Option<Duration>,
}

impl Cache {
    /// Create a new cache client sharing the given handle's transport.
    pub fn new(h: &Handle) -> Cache {
        Cache {
            handle: h.clone(),
            timeout: None,
        }
    }

    /// Specify the timeout value for all commands issued through this
    /// client. If not set, the handle default is used.
    pub fn timeout(mut self, t: &Duration) -> Cache {
        self.timeout = Some(t.clone());
        self
    }

    // One command round trip: envelope, classification, then the null-payload
    // check that distinguishes an absent key from a failure.
    async fn command(&self, name: &str, args: Vec<Value>) -> Result<Value, BaasError> {
        let opts = SendOptions {
            timeout: self.handle.get_timeout(&self.timeout),
            op: format!("cache {}", name),
        };
        let body = json!({ "cmd": name, "args": args });
        let (env, log_id) = self.handle.send_json_command(body, &opts).await?;
        let env = env.check(&opts.op, &log_id)?;
        if env.data.is_null() {
            return Err(BaasError::new(BaasErrorCode::NotFound, "cache: nil"));
        }
        Ok(env.data)
    }

    async fn string_command(&self, name: &str, args: Vec<Value>) -> Result<String, BaasError> {
        let v = self.command(name, args).await?;
        value_as_string(name, &v)
    }

    async fn int_command(&self, name: &str, args: Vec<Value>) -> Result<i64, BaasError> {
        let v = self.command(name, args).await?;
        value_as_i64(name, &v)
    }

    async fn float_command(&self, name: &str, args: Vec<Value>) -> Result<f64, BaasError> {
        let v = self.command(name, args).await?;
        value_as_f64(name, &v)
    }

    // Commands whose integer reply is a true/false outcome.
    async fn bool_command(&self, name: &str, args: Vec<Value>) -> Result<bool, BaasError> {
        let i = self.int_command(name, args).await?;
        Ok(i != 0)
    }

    async fn str_vec_command(&self, name: &str, args: Vec<Value>) -> Result<Vec<String>, BaasError> {
        let v = self.command(name, args).await?;
        value_as_str_vec(name, &v)
    }

    async fn value_vec_command(&self, name: &str, args: Vec<Value>) -> Result<Vec<Value>, BaasError> {
        let v = self.command(name, args).await?;
        match v {
            Value::Array(a) => Ok(a),
            _ => decode_err(name, "array", &v),
        }
    }

    async fn str_map_command(
        &self,
        name: &str,
        args: Vec<Value>,
    ) -> Result<HashMap<String, String>, BaasError> {
        let v = self.command(name, args).await?;
        match &v {
            Value::Object(o) => {
                let mut m: HashMap<String, String> = HashMap::with_capacity(o.len());
                for (k, val) in o {
                    m.insert(k.clone(), value_as_string(name, val)?);
                }
                Ok(m)
            }
            _ => decode_err(name, "object", &v),
        }
    }

    async fn zslice_command(&self, name: &str, args: Vec<Value>) -> Result<Vec<Z>, BaasError> {
        let v = self.command(name, args).await?;
        let zs: Vec<Z> = serde_json::from_value(v)?;
        Ok(zs)
    }

    //------------------------------------------------------------------------------
    // Keys / strings

    /// Remaining time to live of a key, in whole seconds.
    pub async fn ttl(&self, key: &str) -> Result<Duration, BaasError> {
        let secs = self.int_command("ttl", vec![key.into()]).await?;
        Ok(Duration::from_secs(secs.max(0) as u64))
    }

    /// Remaining time to live of a key, in milliseconds.
    pub async fn pttl(&self, key: &str) -> Result<Duration, BaasError> {
        let millis = self.int_command("pttl", vec![key.into()]).await?;
        Ok(Duration::from_millis(millis.max(0) as u64))
    }

    /// The storage type of the value at `key`.
    pub async fn type_of(&self, key: &str) -> Result<String, BaasError> {
        self.string_command("type", vec![key.into()]).await
    }

    pub async fn append(&self, key: &str, value: &str) -> Result<i64, BaasError> {
        self.int_command("append", vec![key.into(), value.into()])
            .await
    }

    pub async fn get_range(&self, key: &str, start: i64, end: i64) -> Result<String, BaasError> {
        self.string_command("getrange", vec![key.into(), start.into(), end.into()])
            .await
    }

    pub async fn get_set(
        &self,
        key: &str,
        value: impl Into<Value>,
    ) -> Result<String, BaasError> {
        self.string_command("getset", vec![key.into(), value.into()])
            .await
    }

    /// Read the string value of `key`. An absent key fails with the
    /// not-found error value; see [`BaasError::is_not_found()`].
    pub async fn get(&self, key: &str) -> Result<String, BaasError> {
        self.string_command("get", vec![key.into()]).await
    }

    /// Store `value` at `key`, optionally expiring after `expiration`.
    ///
    /// Durations with sub-second precision are transmitted in milliseconds;
    /// all others in whole seconds.
    pub async fn set(
        &self,
        key: &str,
        value: impl Into<Value>,
        expiration: Option<Duration>,
    ) -> Result<String, BaasError> {
        let mut args: Vec<Value> = vec![key.into(), value.into()];
        if let Some(d) = expiration {
            if !d.is_zero() {
                if use_precise(&d) {
                    args.push("px".into());
                    args.push(format_millis(&d).into());
                } else {
                    args.push("ex".into());
                    args.push(format_secs(&d).into());
                }
            }
        }
        self.string_command("set", args).await
    }

    /// Store `value` at `key`, keeping the key's existing time to live.
    pub async fn set_keep_ttl(
        &self,
        key: &str,
        value: impl Into<Value>,
    ) -> Result<String, BaasError> {
        self.string_command("set", vec![key.into(), value.into(), "keepttl".into()])
            .await
    }

    /// Remove the given keys, returning how many existed.
    pub async fn del(&self, keys: &[&str]) -> Result<i64, BaasError> {
        self.int_command("del", key_args(keys)).await
    }

    /// How many of the given keys exist.
    pub async fn exists(&self, keys: &[&str]) -> Result<i64, BaasError> {
        self.int_command("exists", key_args(keys)).await
    }

    pub async fn expire(&self, key: &str, expiration: Duration) -> Result<bool, BaasError> {
        self.bool_command("expire", vec![key.into(), format_secs(&expiration).into()])
            .await
    }

    pub async fn expire_at(
        &self,
        key: &str,
        at: &DateTime<FixedOffset>,
    ) -> Result<bool, BaasError> {
        self.bool_command("expireat", vec![key.into(), at.timestamp().into()])
            .await
    }

    /// Remove the time to live of `key`, making it persistent.
    pub async fn persist(&self, key: &str) -> Result<bool, BaasError> {
        self.bool_command("persist", vec![key.into()]).await
    }

    pub async fn pexpire(&self, key: &str, expiration: Duration) -> Result<bool, BaasError> {
        self.bool_command("pexpire", vec![key.into(), format_millis(&expiration).into()])
            .await
    }

    pub async fn pexpire_at(
        &self,
        key: &str,
        at: &DateTime<FixedOffset>,
    ) -> Result<bool, BaasError> {
        self.bool_command("pexpireat", vec![key.into(), at.timestamp_millis().into()])
            .await
    }

    pub async fn incr(&self, key: &str) -> Result<i64, BaasError> {
        self.int_command("incr", vec![key.into()]).await
    }

    pub async fn decr(&self, key: &str) -> Result<i64, BaasError> {
        self.int_command("decr", vec![key.into()]).await
    }

    pub async fn incr_by(&self, key: &str, value: i64) -> Result<i64, BaasError> {
        self.int_command("incrby", vec![key.into(), value.into()])
            .await
    }

    pub async fn decr_by(&self, key: &str, value: i64) -> Result<i64, BaasError> {
        self.int_command("decrby", vec![key.into(), value.into()])
            .await
    }

    pub async fn incr_by_float(&self, key: &str, value: f64) -> Result<f64, BaasError> {
        self.float_command("incrbyfloat", vec![key.into(), value.into()])
            .await
    }

    /// Read multiple keys in one round trip. Absent keys yield null
    /// entries, in key order.
    pub async fn mget(&self, keys: &[&str]) -> Result<Vec<Value>, BaasError> {
        self.value_vec_command("mget", key_args(keys)).await
    }

    /// Store multiple key/value pairs in one round trip.
    ///
    /// `pairs` is either a flat alternating list or a single mapping:
    ///
    /// ```no_run
    /// # use baas_rust_sdk::{Cache, Handle};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// # let handle = Handle::builder().endpoint("http://localhost:8080")?.namespace("ns")?.build()?;
    /// # let cache = Cache::new(&handle);
    /// cache.mset(vec![("k1", "v1"), ("k2", "v2")]).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn mset(&self, pairs: impl Into<KvPairs>) -> Result<String, BaasError> {
        let mut args: Vec<Value> = Vec::new();
        pairs.into().append_to(&mut args);
        self.string_command("mset", args).await
    }

    /// Store `value` at `key` only if the key does not exist. Returns
    /// `false` when the key was already present.
    pub async fn set_nx(
        &self,
        key: &str,
        value: impl Into<Value>,
        expiration: Option<Duration>,
    ) -> Result<bool, BaasError> {
        let d = match expiration {
            Some(d) if !d.is_zero() => d,
            _ => {
                return self
                    .bool_command("setnx", vec![key.into(), value.into()])
                    .await;
            }
        };
        let mut args: Vec<Value> = vec![key.into(), value.into()];
        if use_precise(&d) {
            args.push("px".into());
            args.push(format_millis(&d).into());
        } else {
            args.push("ex".into());
            args.push(format_secs(&d).into());
        }
        args.push("nx".into());
        match self.string_command("set", args).await {
            Ok(s) => Ok(!s.is_empty()),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Store `value` at `key` only if the key already exists. Returns
    /// `false` when the key was absent.
    pub async fn set_xx(&self, key: &str, value: impl Into<Value>) -> Result<bool, BaasError> {
        match self
            .string_command("set", vec![key.into(), value.into(), "xx".into()])
            .await
        {
            Ok(s) => Ok(!s.is_empty()),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn set_range(&self, key: &str, offset: i64, value: &str) -> Result<i64, BaasError> {
        self.int_command("setrange", vec![key.into(), offset.into(), value.into()])
            .await
    }

    pub async fn strlen(&self, key: &str) -> Result<i64, BaasError> {
        self.int_command("strlen", vec![key.into()]).await
    }

    //------------------------------------------------------------------------------
    // Bit

    pub async fn getbit(&self, key: &str, offset: i64) -> Result<i64, BaasError> {
        self.int_command("getbit", vec![key.into(), offset.into()])
            .await
    }

    pub async fn setbit(&self, key: &str, offset: i64, value: i32) -> Result<i64, BaasError> {
        self.int_command("setbit", vec![key.into(), offset.into(), value.into()])
            .await
    }

    pub async fn bitcount(
        &self,
        key: &str,
        range: Option<&BitCountArgs>,
    ) -> Result<i64, BaasError> {
        let mut args: Vec<Value> = vec![key.into()];
        if let Some(r) = range {
            args.push(r.start.into());
            args.push(r.end.into());
        }
        self.int_command("bitcount", args).await
    }

    //------------------------------------------------------------------------------
    // Hash

    pub async fn hdel(&self, key: &str, fields: &[&str]) -> Result<i64, BaasError> {
        let mut args: Vec<Value> = vec![key.into()];
        args.extend(fields.iter().map(|f| Value::from(*f)));
        self.int_command("hdel", args).await
    }

    pub async fn hexists(&self, key: &str, field: &str) -> Result<bool, BaasError> {
        self.bool_command("hexists", vec![key.into(), field.into()])
            .await
    }

    pub async fn hget(&self, key: &str, field: &str) -> Result<String, BaasError> {
        self.string_command("hget", vec![key.into(), field.into()])
            .await
    }

    pub async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, BaasError> {
        self.str_map_command("hgetall", vec![key.into()]).await
    }

    pub async fn hincr_by(&self, key: &str, field: &str, incr: i64) -> Result<i64, BaasError> {
        self.int_command("hincrby", vec![key.into(), field.into(), incr.into()])
            .await
    }

    pub async fn hincr_by_float(
        &self,
        key: &str,
        field: &str,
        incr: f64,
    ) -> Result<f64, BaasError> {
        self.float_command("hincrbyfloat", vec![key.into(), field.into(), incr.into()])
            .await
    }

    pub async fn hkeys(&self, key: &str) -> Result<Vec<String>, BaasError> {
        self.str_vec_command("hkeys", vec![key.into()]).await
    }

    pub async fn hlen(&self, key: &str) -> Result<i64, BaasError> {
        self.int_command("hlen", vec![key.into()]).await
    }

    /// Store multiple field/value pairs in the hash at `key`. `pairs` is
    /// either a flat alternating list or a single mapping; see
    /// [`Cache::mset()`].
    pub async fn hmset(&self, key: &str, pairs: impl Into<KvPairs>) -> Result<String, BaasError> {
        let mut args: Vec<Value> = vec![key.into()];
        pairs.into().append_to(&mut args);
        self.string_command("hmset", args).await
    }

    pub async fn hmget(&self, key: &str, fields: &[&str]) -> Result<Vec<Value>, BaasError> {
        let mut args: Vec<Value> = vec![key.into()];
        args.extend(fields.iter().map(|f| Value::from(*f)));
        self.value_vec_command("hmget", args).await
    }

    /// Store one field of the hash at `key`. Returns `true` if the field
    /// was newly created.
    pub async fn hset(
        &self,
        key: &str,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<bool, BaasError> {
        self.bool_command("hset", vec![key.into(), field.into(), value.into()])
            .await
    }

    pub async fn hset_nx(
        &self,
        key: &str,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<bool, BaasError> {
        self.bool_command("hsetnx", vec![key.into(), field.into(), value.into()])
            .await
    }

    pub async fn hvals(&self, key: &str) -> Result<Vec<String>, BaasError> {
        self.str_vec_command("hvals", vec![key.into()]).await
    }

    //------------------------------------------------------------------------------
    // List

    pub async fn lindex(&self, key: &str, index: i64) -> Result<String, BaasError> {
        self.string_command("lindex", vec![key.into(), index.into()])
            .await
    }

    /// Insert `value` before or after `pivot`; `position` is `"before"` or
    /// `"after"`.
    pub async fn linsert(
        &self,
        key: &str,
        position: &str,
        pivot: impl Into<Value>,
        value: impl Into<Value>,
    ) -> Result<i64, BaasError> {
        self.int_command(
            "linsert",
            vec![key.into(), position.into(), pivot.into(), value.into()],
        )
        .await
    }

    pub async fn llen(&self, key: &str) -> Result<i64, BaasError> {
        self.int_command("llen", vec![key.into()]).await
    }

    pub async fn lpop(&self, key: &str) -> Result<String, BaasError> {
        self.string_command("lpop", vec![key.into()]).await
    }

    pub async fn lpush(&self, key: &str, values: Vec<Value>) -> Result<i64, BaasError> {
        let mut args: Vec<Value> = vec![key.into()];
        args.extend(values);
        self.int_command("lpush", args).await
    }

    pub async fn lpushx(&self, key: &str, values: Vec<Value>) -> Result<i64, BaasError> {
        let mut args: Vec<Value> = vec![key.into()];
        args.extend(values);
        self.int_command("lpushx", args).await
    }

    pub async fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, BaasError> {
        self.str_vec_command("lrange", vec![key.into(), start.into(), stop.into()])
            .await
    }

    pub async fn lrem(
        &self,
        key: &str,
        count: i64,
        value: impl Into<Value>,
    ) -> Result<i64, BaasError> {
        self.int_command("lrem", vec![key.into(), count.into(), value.into()])
            .await
    }

    pub async fn lset(
        &self,
        key: &str,
        index: i64,
        value: impl Into<Value>,
    ) -> Result<String, BaasError> {
        self.string_command("lset", vec![key.into(), index.into(), value.into()])
            .await
    }

    pub async fn ltrim(&self, key: &str, start: i64, stop: i64) -> Result<String, BaasError> {
        self.string_command("ltrim", vec![key.into(), start.into(), stop.into()])
            .await
    }

    pub async fn rpop(&self, key: &str) -> Result<String, BaasError> {
        self.string_command("rpop", vec![key.into()]).await
    }

    pub async fn rpush(&self, key: &str, values: Vec<Value>) -> Result<i64, BaasError> {
        let mut args: Vec<Value> = vec![key.into()];
        args.extend(values);
        self.int_command("rpush", args).await
    }

    pub async fn rpushx(&self, key: &str, values: Vec<Value>) -> Result<i64, BaasError> {
        let mut args: Vec<Value> = vec![key.into()];
        args.extend(values);
        self.int_command("rpushx", args).await
    }

    //------------------------------------------------------------------------------
    // Set

    pub async fn sadd(&self, key: &str, members: Vec<Value>) -> Result<i64, BaasError> {
        let mut args: Vec<Value> = vec![key.into()];
        args.extend(members);
        self.int_command("sadd", args).await
    }

    pub async fn scard(&self, key: &str) -> Result<i64, BaasError> {
        self.int_command("scard", vec![key.into()]).await
    }

    pub async fn sdiff(&self, keys: &[&str]) -> Result<Vec<String>, BaasError> {
        self.str_vec_command("sdiff", key_args(keys)).await
    }

    pub async fn sdiffstore(&self, destination: &str, keys: &[&str]) -> Result<i64, BaasError> {
        let mut args: Vec<Value> = vec![destination.into()];
        args.extend(key_args(keys));
        self.int_command("sdiffstore", args).await
    }

    pub async fn sinter(&self, keys: &[&str]) -> Result<Vec<String>, BaasError> {
        self.str_vec_command("sinter", key_args(keys)).await
    }

    pub async fn sinterstore(&self, destination: &str, keys: &[&str]) -> Result<i64, BaasError> {
        let mut args: Vec<Value> = vec![destination.into()];
        args.extend(key_args(keys));
        self.int_command("sinterstore", args).await
    }

    pub async fn sismember(
        &self,
        key: &str,
        member: impl Into<Value>,
    ) -> Result<bool, BaasError> {
        self.bool_command("sismember", vec![key.into(), member.into()])
            .await
    }

    pub async fn smembers(&self, key: &str) -> Result<Vec<String>, BaasError> {
        self.str_vec_command("smembers", vec![key.into()]).await
    }

    pub async fn smove(
        &self,
        source: &str,
        destination: &str,
        member: impl Into<Value>,
    ) -> Result<bool, BaasError> {
        self.bool_command(
            "smove",
            vec![source.into(), destination.into(), member.into()],
        )
        .await
    }

    pub async fn spop(&self, key: &str) -> Result<String, BaasError> {
        self.string_command("spop", vec![key.into()]).await
    }

    pub async fn spop_n(&self, key: &str, count: i64) -> Result<Vec<String>, BaasError> {
        self.str_vec_command("spop", vec![key.into(), count.into()])
            .await
    }

    pub async fn srandmember(&self, key: &str) -> Result<String, BaasError> {
        self.string_command("srandmember", vec![key.into()]).await
    }

    pub async fn srandmember_n(&self, key: &str, count: i64) -> Result<Vec<String>, BaasError> {
        self.str_vec_command("srandmember", vec![key.into(), count.into()])
            .await
    }

    pub async fn srem(&self, key: &str, members: Vec<Value>) -> Result<i64, BaasError> {
        let mut args: Vec<Value> = vec![key.into()];
        args.extend(members);
        self.int_command("srem", args).await
    }

    pub async fn sunion(&self, keys: &[&str]) -> Result<Vec<String>, BaasError> {
        self.str_vec_command("sunion", key_args(keys)).await
    }

    pub async fn sunionstore(&self, destination: &str, keys: &[&str]) -> Result<i64, BaasError> {
        let mut args: Vec<Value> = vec![destination.into()];
        args.extend(key_args(keys));
        self.int_command("sunionstore", args).await
    }

    //------------------------------------------------------------------------------
    // Sorted set

    // Scores and members interleave after the key, in member order.
    fn zset_args(key: &str, members: &[Z]) -> Vec<Value> {
        let mut args: Vec<Value> = Vec::with_capacity(1 + 2 * members.len());
        args.push(key.into());
        for m in members {
            args.push(m.score.into());
            args.push(m.member.clone());
        }
        args
    }

    /// Add members with scores, returning how many were newly added.
    pub async fn zadd(&self, key: &str, members: &[Z]) -> Result<i64, BaasError> {
        self.int_command("zadd", Self::zset_args(key, members)).await
    }

    /// [`Cache::zadd()`] that only adds new members, never updates.
    pub async fn zadd_nx(&self, key: &str, members: &[Z]) -> Result<i64, BaasError> {
        self.int_command("zaddnx", Self::zset_args(key, members))
            .await
    }

    /// [`Cache::zadd()`] that only updates existing members, never adds.
    pub async fn zadd_xx(&self, key: &str, members: &[Z]) -> Result<i64, BaasError> {
        self.int_command("zaddxx", Self::zset_args(key, members))
            .await
    }

    /// [`Cache::zadd()`] returning the count of changed members (added or
    /// updated).
    pub async fn zadd_ch(&self, key: &str, members: &[Z]) -> Result<i64, BaasError> {
        self.int_command("zaddch", Self::zset_args(key, members))
            .await
    }

    pub async fn zadd_nx_ch(&self, key: &str, members: &[Z]) -> Result<i64, BaasError> {
        self.int_command("zaddnxch", Self::zset_args(key, members))
            .await
    }

    pub async fn zadd_xx_ch(&self, key: &str, members: &[Z]) -> Result<i64, BaasError> {
        self.int_command("zaddxxch", Self::zset_args(key, members))
            .await
    }

    /// Increment the member's score by the given amount, returning the new
    /// score.
    pub async fn zincr(&self, key: &str, member: &Z) -> Result<f64, BaasError> {
        self.float_command("zincr", Self::zset_args(key, std::slice::from_ref(member)))
            .await
    }

    pub async fn zincr_nx(&self, key: &str, member: &Z) -> Result<f64, BaasError> {
        self.float_command("zincrnx", Self::zset_args(key, std::slice::from_ref(member)))
            .await
    }

    pub async fn zincr_xx(&self, key: &str, member: &Z) -> Result<f64, BaasError> {
        self.float_command("zincrxx", Self::zset_args(key, std::slice::from_ref(member)))
            .await
    }

    pub async fn zcard(&self, key: &str) -> Result<i64, BaasError> {
        self.int_command("zcard", vec![key.into()]).await
    }

    pub async fn zcount(&self, key: &str, min: &str, max: &str) -> Result<i64, BaasError> {
        self.int_command("zcount", vec![key.into(), min.into(), max.into()])
            .await
    }

    pub async fn zincr_by(
        &self,
        key: &str,
        increment: f64,
        member: &str,
    ) -> Result<f64, BaasError> {
        self.float_command("zincrby", vec![key.into(), increment.into(), member.into()])
            .await
    }

    fn zstore_args(destination: &str, store: &ZStore) -> Vec<Value> {
        let mut args: Vec<Value> = Vec::with_capacity(2 + store.keys.len());
        args.push(destination.into());
        args.push((store.keys.len() as i64).into());
        for k in &store.keys {
            args.push(k.as_str().into());
        }
        if !store.weights.is_empty() {
            args.push("weights".into());
            for w in &store.weights {
                args.push((*w).into());
            }
        }
        if !store.aggregate.is_empty() {
            args.push("aggregate".into());
            args.push(store.aggregate.as_str().into());
        }
        args
    }

    pub async fn zinterstore(
        &self,
        destination: &str,
        store: &ZStore,
    ) -> Result<i64, BaasError> {
        self.int_command("zinterstore", Self::zstore_args(destination, store))
            .await
    }

    pub async fn zunionstore(
        &self,
        destination: &str,
        store: &ZStore,
    ) -> Result<i64, BaasError> {
        self.int_command("zunionstore", Self::zstore_args(destination, store))
            .await
    }

    pub async fn zrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, BaasError> {
        self.str_vec_command("zrange", vec![key.into(), start.into(), stop.into()])
            .await
    }

    pub async fn zrange_with_scores(
        &self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<Vec<Z>, BaasError> {
        self.zslice_command(
            "zrange",
            vec![key.into(), start.into(), stop.into(), "withscores".into()],
        )
        .await
    }

    fn zrange_by_args(key: &str, opt: &ZRangeBy, with_scores: bool, rev: bool) -> Vec<Value> {
        let mut args: Vec<Value> = Vec::new();
        args.push(key.into());
        if rev {
            args.push(opt.max.as_str().into());
            args.push(opt.min.as_str().into());
        } else {
            args.push(opt.min.as_str().into());
            args.push(opt.max.as_str().into());
        }
        if with_scores {
            args.push("withscores".into());
        }
        if opt.offset != 0 || opt.count != 0 {
            args.push("limit".into());
            args.push(opt.offset.into());
            args.push(opt.count.into());
        }
        args
    }

    pub async fn zrange_by_score(
        &self,
        key: &str,
        opt: &ZRangeBy,
    ) -> Result<Vec<String>, BaasError> {
        self.str_vec_command("zrangebyscore", Self::zrange_by_args(key, opt, false, false))
            .await
    }

    pub async fn zrange_by_score_with_scores(
        &self,
        key: &str,
        opt: &ZRangeBy,
    ) -> Result<Vec<Z>, BaasError> {
        self.zslice_command("zrangebyscore", Self::zrange_by_args(key, opt, true, false))
            .await
    }

    pub async fn zrank(&self, key: &str, member: &str) -> Result<i64, BaasError> {
        self.int_command("zrank", vec![key.into(), member.into()])
            .await
    }

    pub async fn zrem(&self, key: &str, members: Vec<Value>) -> Result<i64, BaasError> {
        let mut args: Vec<Value> = vec![key.into()];
        args.extend(members);
        self.int_command("zrem", args).await
    }

    pub async fn zrem_range_by_rank(
        &self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<i64, BaasError> {
        self.int_command(
            "zremrangebyrank",
            vec![key.into(), start.into(), stop.into()],
        )
        .await
    }

    pub async fn zrem_range_by_score(
        &self,
        key: &str,
        min: &str,
        max: &str,
    ) -> Result<i64, BaasError> {
        self.int_command("zremrangebyscore", vec![key.into(), min.into(), max.into()])
            .await
    }

    pub async fn zrevrange(
        &self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<Vec<String>, BaasError> {
        self.str_vec_command("zrevrange", vec![key.into(), start.into(), stop.into()])
            .await
    }

    pub async fn zrevrange_with_scores(
        &self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<Vec<Z>, BaasError> {
        self.zslice_command(
            "zrevrange",
            vec![key.into(), start.into(), stop.into(), "withscores".into()],
        )
        .await
    }

    pub async fn zrev_range_by_score(
        &self,
        key: &str,
        opt: &ZRangeBy,
    ) -> Result<Vec<String>, BaasError> {
        self.str_vec_command(
            "zrevrangebyscore",
            Self::zrange_by_args(key, opt, false, true),
        )
        .await
    }

    pub async fn zrev_range_by_score_with_scores(
        &self,
        key: &str,
        opt: &ZRangeBy,
    ) -> Result<Vec<Z>, BaasError> {
        self.zslice_command(
            "zrevrangebyscore",
            Self::zrange_by_args(key, opt, true, true),
        )
        .await
    }

    pub async fn zrevrank(&self, key: &str, member: &str) -> Result<i64, BaasError> {
        self.int_command("zrevrank", vec![key.into(), member.into()])
            .await
    }

    pub async fn zscore(&self, key: &str, member: &str) -> Result<f64, BaasError> {
        self.float_command("zscore", vec![key.into(), member.into()])
            .await
    }

    //------------------------------------------------------------------------------
    // HyperLogLog

    pub async fn pfadd(&self, key: &str, elements: Vec<Value>) -> Result<i64, BaasError> {
        let mut args: Vec<Value> = vec![key.into()];
        args.extend(elements);
        self.int_command("pfadd", args).await
    }

    pub async fn pfcount(&self, keys: &[&str]) -> Result<i64, BaasError> {
        self.int_command("pfcount", key_args(keys)).await
    }

    pub async fn pfmerge(&self, destination: &str, keys: &[&str]) -> Result<String, BaasError> {
        let mut args: Vec<Value> = vec![destination.into()];
        args.extend(key_args(keys));
        self.string_command("pfmerge", args).await
    }
}

// Reply payload decoding. The cache path carries JSON payloads; a payload
// that does not fit the command's result type is a protocol mismatch.

fn decode_err<T>(name: &str, expected: &str, actual: &Value) -> Result<T, BaasError> {
    Err(BaasError::new(
        BaasErrorCode::BadProtocolMessage,
        &format!(
            "cache {}: expected {} reply, got: {}",
            name, expected, actual
        ),
    ))
}

pub(crate) fn value_as_string(name: &str, v: &Value) -> Result<String, BaasError> {
    match v {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => decode_err(name, "string", v),
    }
}

pub(crate) fn value_as_i64(name: &str, v: &Value) -> Result<i64, BaasError> {
    match v {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(i),
            None => decode_err(name, "integer", v),
        },
        Value::String(s) => match s.parse::<i64>() {
            Ok(i) => Ok(i),
            Err(_) => decode_err(name, "integer", v),
        },
        _ => decode_err(name, "integer", v),
    }
}

pub(crate) fn value_as_f64(name: &str, v: &Value) -> Result<f64, BaasError> {
    match v {
        Value::Number(n) => match n.as_f64() {
            Some(f) => Ok(f),
            None => decode_err(name, "float", v),
        },
        Value::String(s) => match s.parse::<f64>() {
            Ok(f) => Ok(f),
            Err(_) => decode_err(name, "float", v),
        },
        _ => decode_err(name, "float", v),
    }
}

pub(crate) fn value_as_str_vec(name: &str, v: &Value) -> Result<Vec<String>, BaasError> {
    match v {
        Value::Array(a) => {
            let mut out: Vec<String> = Vec::with_capacity(a.len());
            for item in a {
                out.push(value_as_string(name, item)?);
            }
            Ok(out)
        }
        _ => decode_err(name, "array", v),
    }
}
