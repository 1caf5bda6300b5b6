//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::condition::Condition;
use crate::envelope::*;
use crate::error::{param_err, BaasError};
use crate::handle::{Handle, SendOptions};
use crate::reader::Reader;
use crate::types::{BaasRow, FieldValue, FromFieldValue, MapValue, OpKind};
use crate::writer::Writer;
use std::result::Result;
use std::time::Duration;

// One sort key with direction. The wire protocol orders sort keys by input
// position only: there is no way to express an independent per-field
// tie-break priority distinct from call order.
#[derive(Debug)]
pub(crate) struct SortKey {
    pub(crate) field: String,
    pub(crate) descending: bool,
}

/// A fluent query over one collection: filter condition, projection, sort,
/// pagination, and the terminal operations that compile and execute one
/// command envelope.
///
/// A `Query` is a plain value: each step consumes and returns it, and all
/// validation happens in the terminal operation's compile step, before any
/// request is issued. One `Query` describes exactly one round trip and is
/// consumed by its terminal operation.
///
/// ```no_run
/// use baas_rust_sdk::{Handle, Table};
/// use baas_rust_sdk::types::MapValue;
/// use baas_rust_sdk::condition::{Condition, eq};
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let handle = Handle::builder().endpoint("http://localhost:8080")?.namespace("ns")?.build()?;
/// let rows: Vec<MapValue> = Table::new("goods")
///     .filter(Condition::field("info.city", eq("shanghai")))
///     .order_by_desc("qty")
///     .limit(10)
///     .find(&handle)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Query {
    pub(crate) table_name: String,
    pub(crate) condition: Condition,
    pub(crate) projection: Option<MapValue>,
    pub(crate) sort: Vec<SortKey>,
    pub(crate) offset: Option<i64>,
    pub(crate) limit: Option<i64>,
    pub(crate) timeout: Option<Duration>,
}

impl Query {
    pub(crate) fn new(table_name: &str, timeout: Option<Duration>) -> Query {
        Query {
            table_name: table_name.to_string(),
            condition: Condition::all(),
            projection: None,
            sort: Vec::new(),
            offset: None,
            limit: None,
            timeout,
        }
    }

    /// Narrow the query with another condition.
    ///
    /// Callable repeatedly: conditions accumulate with an implicit AND, so a
    /// second call narrows the match set, never replaces it.
    pub fn filter(mut self, condition: Condition) -> Query {
        let prev = std::mem::take(&mut self.condition);
        self.condition = prev.and_with(condition);
        self
    }

    /// Set the field inclusion/exclusion specification: a document mapping
    /// field paths to `1` (include) or `0` (exclude).
    ///
    /// The last call wins; projections replace, they do not merge.
    pub fn project(mut self, spec: MapValue) -> Query {
        self.projection = Some(spec);
        self
    }

    /// Append an ascending sort key.
    ///
    /// Multiple calls append additional keys. The wire protocol cannot
    /// express per-field tie-break priority beyond input order, so keys
    /// apply in exactly the order the calls were made.
    pub fn order_by(mut self, field: &str) -> Query {
        self.sort.push(SortKey {
            field: field.to_string(),
            descending: false,
        });
        self
    }

    /// Append a descending sort key. See [`Query::order_by()`] for ordering
    /// semantics.
    pub fn order_by_desc(mut self, field: &str) -> Query {
        self.sort.push(SortKey {
            field: field.to_string(),
            descending: true,
        });
        self
    }

    /// Set the number of matching records to skip. The last call wins.
    pub fn offset(mut self, n: i64) -> Query {
        self.offset = Some(n);
        self
    }

    /// Set the maximum number of records to return. The last call wins.
    pub fn limit(mut self, n: i64) -> Query {
        self.limit = Some(n);
        self
    }

    /// Specify the timeout value for the request.
    ///
    /// This is optional. If not set, the default timeout value configured for
    /// the [`Handle`](crate::HandleBuilder::timeout()) is used.
    pub fn timeout(mut self, t: &Duration) -> Query {
        self.timeout = Some(t.clone());
        self
    }

    /// Execute a Find command and bind the reply's record list into a vector
    /// of `T`.
    ///
    /// `T` may be a caller-defined struct deriving
    /// [`BaasRow`](crate::types::BaasRow), or [`MapValue`] for raw untyped
    /// documents. An empty result binds to an empty vector, not an error.
    pub async fn find<T: BaasRow + Default>(&self, h: &Handle) -> Result<Vec<T>, BaasError> {
        let mut r = self.execute(h, OpKind::Find, None, None, "find").await?;
        let records = decode_records_reply(&mut r)?;
        let mut out: Vec<T> = Vec::with_capacity(records.len());
        for mv in records {
            let mut t = T::default();
            t.from_map_value(&mv)?;
            out.push(t);
        }
        Ok(out)
    }

    /// Execute a Find command with an implicit limit of one record, binding
    /// a single record (not a vector) into `T`.
    ///
    /// The compiled command is a Find; only the record limit differs. With
    /// no matching record the target is `T::default()` and no error is
    /// returned.
    pub async fn find_one<T: BaasRow + Default>(&self, h: &Handle) -> Result<T, BaasError> {
        let mut r = self
            .execute(h, OpKind::Find, None, Some(1), "find_one")
            .await?;
        let mut t = T::default();
        if let Some(mv) = decode_records_reply(&mut r)?.into_iter().next() {
            t.from_map_value(&mv)?;
        }
        Ok(t)
    }

    /// Execute a Count command, returning the number of matching records.
    pub async fn count(&self, h: &Handle) -> Result<i64, BaasError> {
        let mut r = self.execute(h, OpKind::Count, None, None, "count").await?;
        decode_count_reply(&mut r)
    }

    /// Apply `patch` to all records matching the accumulated condition.
    ///
    /// Zero matches is not an error; the service applies the patch to
    /// whatever matches at execution time.
    pub async fn update(&self, h: &Handle, patch: &MapValue) -> Result<(), BaasError> {
        self.execute(h, OpKind::Update, Some(patch), None, "update")
            .await?;
        Ok(())
    }

    /// Apply `patch` to all records matching the accumulated condition,
    /// creating a record from the patch if none match.
    pub async fn upsert(&self, h: &Handle, patch: &MapValue) -> Result<(), BaasError> {
        self.execute(h, OpKind::Upsert, Some(patch), None, "upsert")
            .await?;
        Ok(())
    }

    /// Apply `patch` to all records matching the accumulated condition in
    /// one batched round trip.
    pub async fn batch_update(&self, h: &Handle, patch: &MapValue) -> Result<(), BaasError> {
        self.execute(h, OpKind::BatchUpdate, Some(patch), None, "batch_update")
            .await?;
        Ok(())
    }

    /// Remove all records matching the accumulated condition.
    pub async fn delete(&self, h: &Handle) -> Result<(), BaasError> {
        self.execute(h, OpKind::Delete, None, None, "delete").await?;
        Ok(())
    }

    /// Remove all records matching the accumulated condition in one batched
    /// round trip.
    pub async fn batch_delete(&self, h: &Handle) -> Result<(), BaasError> {
        self.execute(h, OpKind::BatchDelete, None, None, "batch_delete")
            .await?;
        Ok(())
    }

    /// Execute a Distinct command, returning the distinct values of `field`
    /// across all matching records.
    pub async fn distinct<T: FromFieldValue>(
        &self,
        h: &Handle,
        field: &str,
    ) -> Result<Vec<T>, BaasError> {
        if field.is_empty() {
            return param_err!("distinct on table {}: field is empty", self.table_name);
        }
        let timeout = h.get_timeout(&self.timeout);
        let w = self.compile(OpKind::Distinct, None, Some(field), None, &timeout)?;
        let opts = SendOptions {
            timeout,
            op: format!("distinct {}", self.table_name),
        };
        let mut r = h.send_doc_command(w, &opts).await?;
        let values = decode_values_reply(&mut r)?;
        let mut out: Vec<T> = Vec::with_capacity(values.len());
        for v in &values {
            out.push(T::from_field(v)?);
        }
        Ok(out)
    }

    async fn execute(
        &self,
        h: &Handle,
        op: OpKind,
        patch: Option<&MapValue>,
        limit_override: Option<i64>,
        op_name: &str,
    ) -> Result<Reader, BaasError> {
        let timeout = h.get_timeout(&self.timeout);
        let w = self.compile(op, patch, None, limit_override, &timeout)?;
        let opts = SendOptions {
            timeout,
            op: format!("{} {}", op_name, self.table_name),
        };
        h.send_doc_command(w, &opts).await
    }

    // Compile this query plus an operation kind into one command envelope.
    // Exactly the fields relevant to the operation are populated; all
    // validation happens here, before any request is issued.
    pub(crate) fn compile(
        &self,
        op: OpKind,
        patch: Option<&MapValue>,
        distinct_field: Option<&str>,
        limit_override: Option<i64>,
        timeout: &Duration,
    ) -> Result<Writer, BaasError> {
        if self.table_name.is_empty() {
            return param_err!("table name is empty");
        }
        match op {
            OpKind::Update | OpKind::Upsert | OpKind::BatchUpdate => {
                let p = patch.ok_or_else(|| crate::error::param_error!("update patch is empty"))?;
                if p.is_empty() {
                    return param_err!("update patch is empty");
                }
            }
            _ => {}
        }

        let mut w = Writer::new();
        let mut ds = DocSerializer::start_request(&mut w);
        ds.start_header();
        ds.write_header(op, timeout, &self.table_name);
        ds.end_header();

        ds.start_payload();
        ds.write_nonempty_map_field(FILTER, &self.condition.compile());
        match op {
            OpKind::Find => {
                self.write_find_fields(&mut ds, limit_override.or(self.limit));
            }
            OpKind::Update | OpKind::Upsert | OpKind::BatchUpdate => {
                if let Some(p) = patch {
                    ds.write_map_field(PATCH, p);
                }
            }
            OpKind::Distinct => {
                if let Some(f) = distinct_field {
                    ds.write_string_field(DISTINCT_FIELD, f);
                }
            }
            // count and deletes carry only the filter
            _ => {}
        }
        ds.end_payload();
        ds.end_request();
        Ok(w)
    }

    fn write_find_fields(&self, ds: &mut DocSerializer, limit: Option<i64>) {
        if let Some(p) = &self.projection {
            ds.write_nonempty_map_field(PROJECTION, p);
        }
        if !self.sort.is_empty() {
            let mut keys: Vec<FieldValue> = Vec::with_capacity(self.sort.len());
            for k in &self.sort {
                let mut m = MapValue::new();
                m.put_str(SORT_FIELD, &k.field);
                m.put_i32(SORT_DIR, if k.descending { -1 } else { 1 });
                keys.push(FieldValue::Map(m));
            }
            ds.write_array_field(SORT, &keys);
        }
        ds.write_optional_i64_field(OFFSET, &self.offset);
        ds.write_optional_i64_field(LIMIT, &limit);
    }
}

// Reply decoding. The reply's binary document carries exactly one result
// field for the operation kind; unknown fields are skipped so the service
// can extend replies without breaking older drivers.

pub(crate) fn decode_records_reply(r: &mut Reader) -> Result<Vec<MapValue>, BaasError> {
    let mut walker = MapWalker::new(r)?;
    let mut records: Vec<MapValue> = Vec::new();
    while walker.has_next() {
        walker.next()?;
        let name = walker.current_name();
        match name.as_str() {
            RECORDS => {
                let arr = walker.read_doc_array()?;
                records.reserve(arr.len());
                for fv in arr {
                    records.push(fv.get_map_value()?);
                }
            }
            _ => {
                walker.skip_doc_field()?;
            }
        }
    }
    Ok(records)
}

pub(crate) fn decode_count_reply(r: &mut Reader) -> Result<i64, BaasError> {
    let mut walker = MapWalker::new(r)?;
    let mut count: i64 = 0;
    while walker.has_next() {
        walker.next()?;
        let name = walker.current_name();
        match name.as_str() {
            COUNT => {
                count = walker.read_doc_i64()?;
            }
            _ => {
                walker.skip_doc_field()?;
            }
        }
    }
    Ok(count)
}

pub(crate) fn decode_ids_reply(r: &mut Reader) -> Result<Vec<String>, BaasError> {
    let mut walker = MapWalker::new(r)?;
    let mut ids: Vec<String> = Vec::new();
    while walker.has_next() {
        walker.next()?;
        let name = walker.current_name();
        match name.as_str() {
            IDS => {
                ids = walker.read_doc_string_array()?;
            }
            _ => {
                walker.skip_doc_field()?;
            }
        }
    }
    Ok(ids)
}

pub(crate) fn decode_values_reply(r: &mut Reader) -> Result<Vec<FieldValue>, BaasError> {
    let mut walker = MapWalker::new(r)?;
    let mut values: Vec<FieldValue> = Vec::new();
    while walker.has_next() {
        walker.next()?;
        let name = walker.current_name();
        match name.as_str() {
            VALUES => {
                values = walker.read_doc_array()?;
            }
            _ => {
                walker.skip_doc_field()?;
            }
        }
    }
    Ok(values)
}
