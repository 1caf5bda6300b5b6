//
// Copyright (c) 2024 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::agg_query::{AggQuery, GroupKey};
use crate::condition::Condition;
use crate::envelope::*;
use crate::error::{param_err, BaasError};
use crate::handle::{Handle, SendOptions};
use crate::query::{decode_ids_reply, Query};
use crate::types::{BaasRow, FieldValue, OpKind};
use crate::writer::Writer;
use std::result::Result;
use std::time::Duration;

/// Entry point for all operations on one collection of the document store.
///
/// A `Table` creates records directly ([`create()`](Table::create()),
/// [`batch_create()`](Table::batch_create())) and opens query chains
/// ([`filter()`](Table::filter())) and aggregation chains
/// ([`group_by()`](Table::group_by())).
///
/// ```no_run
/// use baas_rust_sdk::{Handle, Table};
/// use baas_rust_sdk::types::*;
/// use baas_rust_sdk::condition::{Condition, gte};
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let handle = Handle::builder().endpoint("http://localhost:8080")?.namespace("ns")?.build()?;
/// let id = Table::new("goods")
///     .create(&handle, &MapValue::new().str("item", "pencil").i64("qty", 120))
///     .await?;
///
/// let heavy = Table::new("goods")
///     .filter(Condition::field("qty", gte(100)))
///     .count(&handle)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Table {
    pub(crate) table_name: String,
    pub(crate) timeout: Option<Duration>,
}

impl Table {
    /// Create a new `Table` for the named collection.
    ///
    /// `table_name` is required and must be non-empty; an empty name fails
    /// validation when the first operation compiles, before any request is
    /// issued.
    pub fn new(table_name: &str) -> Table {
        Table {
            table_name: table_name.to_string(),
            timeout: None,
        }
    }

    /// Specify the timeout value for requests made through this table.
    ///
    /// This is optional. If not set, the default timeout value configured for
    /// the [`Handle`](crate::HandleBuilder::timeout()) is used.
    pub fn timeout(mut self, t: &Duration) -> Table {
        self.timeout = Some(t.clone());
        self
    }

    /// Open a query chain over this collection, narrowed by the given
    /// condition. Pass [`Condition::all()`] to match every record.
    pub fn filter(self, condition: Condition) -> Query {
        Query::new(&self.table_name, self.timeout).filter(condition)
    }

    /// Open an aggregation chain over this collection, grouping by the given
    /// field path(s). The grouping-key output field is named after the last
    /// dot segment of the (last) field path; use
    /// [`Table::group_by_as()`] to name it explicitly.
    pub fn group_by(self, key: impl Into<GroupKey>) -> AggQuery {
        AggQuery::new(&self.table_name, self.timeout).group_by(key)
    }

    /// Open an aggregation chain over this collection, grouping by the given
    /// field path(s) with an explicit output alias.
    pub fn group_by_as(self, key: impl Into<GroupKey>, alias: &str) -> AggQuery {
        AggQuery::new(&self.table_name, self.timeout).group_by_as(key, alias)
    }

    /// Create one record, returning the service-generated identifier.
    pub async fn create(&self, h: &Handle, record: &dyn BaasRow) -> Result<String, BaasError> {
        let docs = vec![FieldValue::Map(record.to_map_value()?)];
        let ids = self.insert_docs(h, OpKind::Insert, docs, "create").await?;
        match ids.into_iter().next() {
            Some(id) => Ok(id),
            None => Err(crate::error::internal_error!(
                "create on table {}: reply carried no generated id",
                self.table_name
            )),
        }
    }

    /// Create multiple records in one round trip, returning the
    /// service-generated identifiers in input order.
    pub async fn batch_create<T: BaasRow>(
        &self,
        h: &Handle,
        records: &[T],
    ) -> Result<Vec<String>, BaasError> {
        let mut docs: Vec<FieldValue> = Vec::with_capacity(records.len());
        for r in records {
            docs.push(FieldValue::Map(r.to_map_value()?));
        }
        self.insert_docs(h, OpKind::BatchInsert, docs, "batch_create")
            .await
    }

    async fn insert_docs(
        &self,
        h: &Handle,
        op: OpKind,
        docs: Vec<FieldValue>,
        op_name: &str,
    ) -> Result<Vec<String>, BaasError> {
        if self.table_name.is_empty() {
            return param_err!("{}: table name is empty", op_name);
        }
        let timeout = h.get_timeout(&self.timeout);
        let mut w = Writer::new();
        let mut ds = DocSerializer::start_request(&mut w);
        ds.start_header();
        ds.write_header(op, &timeout, &self.table_name);
        ds.end_header();
        ds.start_payload();
        ds.write_array_field(DOCS, &docs);
        ds.end_payload();
        ds.end_request();

        let opts = SendOptions {
            timeout,
            op: format!("{} {}", op_name, self.table_name),
        };
        let mut r = h.send_doc_command(w, &opts).await?;
        decode_ids_reply(&mut r)
    }
}
