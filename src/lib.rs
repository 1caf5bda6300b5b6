//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
//! BaaS Resource Service Rust SDK
//!
//! This is the Rust SDK for the BaaS resource service. The SDK lets serverless
//! application code describe document-store and key-value (cache) operations
//! through a fluent, strongly typed API, compiles each description into a
//! single wire-level command envelope, sends it to the resource service over
//! HTTP, and decodes the service's typed reply back into caller-supplied
//! result shapes.
//!
//! This SDK supplies and uses Rust `async` methods throughout, using the
//! [tokio](https://crates.io/crates/tokio) runtime. There is currently no
//! blocking support.
//!
//! The general flow for an application using the resource service is:
//! - Create a [`HandleBuilder`] with all needed parameters
//! - Create a [`Handle`] from the [`HandleBuilder`] that will be used
//!   throughout the application, across all threads
//! - Interact with the document store through [`Table`] query chains, and
//!   with the cache through [`Cache`] commands
//!
//! ## Simple Example
//! The following code creates a [`Handle`] from values in the current
//! environment and then reads records from a collection.
//! ```no_run
//! use baas_rust_sdk::{Handle, Table};
//! use baas_rust_sdk::condition::{Condition, eq};
//! use baas_rust_sdk::types::MapValue;
//! use std::error::Error;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn Error>> {
//!     let handle = Handle::builder()
//! #       .endpoint("http://localhost:8080")?
//! #       .namespace("testns")?
//!         .from_environment()?
//!         .build()?;
//!     let rows: Vec<MapValue> = Table::new("goods")
//!         .filter(Condition::field("item", eq("pencil")))
//!         .find(&handle)
//!         .await?;
//!     println!("rows={:?}", rows);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuring the SDK
//!
//! The handle carries the service endpoint, the namespace segment substituted
//! into the resource paths, and the opaque service credentials. All of them
//! can be given in code or collected from the environment
//! ([`HandleBuilder::from_environment()`]):
//!
//! ```no_run
//! # use baas_rust_sdk::Handle;
//! # fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use std::time::Duration;
//! let handle = Handle::builder()
//!     .endpoint("https://baas.mycompany.com")?
//!     .namespace("myapp")?
//!     .service_id("svc_0001")?
//!     .access_token("...")?
//!     .timeout(Duration::from_secs(15))?
//!     .build()?;
//! // use handle for all resource service operations
//! # Ok(())
//! # }
//! ```
//!
//! Credential acquisition and tenant/namespace resolution are performed by
//! the calling layer; the SDK only carries the resolved opaque values.
//!
//! ## Document store
//!
//! A [`Table`] names one collection. Query chains accumulate a filter
//! [`Condition`](condition::Condition), projection, sort and pagination, and
//! end in one terminal operation (`find`, `find_one`, `count`, `update`,
//! `upsert`, `delete`, their batch variants, or `distinct`). Aggregation
//! chains ([`Table::group_by()`]) accumulate grouping stages, per-group
//! accumulators and a post-group filter. Each chain compiles into exactly one
//! command envelope and one round trip.
//!
//! Results bind into caller-supplied shapes: a struct deriving
//! [`BaasRow`](types::BaasRow), or [`MapValue`](types::MapValue) for raw
//! untyped documents.
//!
//! ```no_run
//! use baas_rust_sdk::{Handle, Table};
//! use baas_rust_sdk::types::*;
//! use baas_rust_sdk::condition::{Condition, gte};
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let handle = Handle::builder().endpoint("http://localhost:8080")?.namespace("ns")?.build()?;
//! #[derive(Default, Debug, BaasRow)]
//! struct Goods {
//!     pub item: String,
//!     pub qty: i64,
//! }
//!
//! let id = Table::new("goods")
//!     .create(&handle, &Goods { item: "pencil".to_string(), qty: 120 })
//!     .await?;
//!
//! let heavy: Vec<Goods> = Table::new("goods")
//!     .filter(Condition::field("qty", gte(100)))
//!     .order_by_desc("qty")
//!     .find(&handle)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Cache
//!
//! [`Cache`] issues single key-value commands (strings, numbers, bitmaps,
//! hashes, lists, sets, sorted sets, HyperLogLog) through the same transport
//! and error classification as the document store. A read of an absent key
//! fails with a distinguished not-found error value
//! ([`BaasError::is_not_found()`]):
//!
//! ```no_run
//! use baas_rust_sdk::{Cache, Handle};
//! use std::time::Duration;
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let handle = Handle::builder().endpoint("http://localhost:8080")?.namespace("ns")?.build()?;
//! let cache = Cache::new(&handle);
//! cache.set("greeting", "hello", Some(Duration::from_secs(10))).await?;
//! let val = cache.get("greeting").await?;
//! assert_eq!(val, "hello");
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors
//!
//! Every operation returns [`BaasError`]. Malformed call-time input fails
//! before any request is issued; service failures are classified from the
//! reply status code into system failures (opaque, with the diagnostic
//! identifier) and parameter failures (caller-actionable, with the service
//! message). The SDK never retries: retry policy belongs to the caller.

pub(crate) mod handle_builder;
pub use crate::handle_builder::HandleBuilder;

pub(crate) mod handle;
pub use crate::handle::Handle;

pub(crate) mod error;
pub use crate::error::{classify_reply_code, BaasError, BaasErrorCode, ReplyStatus};

pub mod condition;

pub(crate) mod operator;
pub use crate::operator::Operator;

pub(crate) mod table;
pub use crate::table::Table;

pub(crate) mod query;
pub use crate::query::Query;

pub(crate) mod agg_query;
pub use crate::agg_query::{AggQuery, GroupKey, PushSpec};

pub(crate) mod cache;
pub use crate::cache::{BitCountArgs, Cache, KvPairs, ZRangeBy, ZStore, Z};

pub(crate) mod envelope;
pub(crate) mod reader;
pub(crate) mod varint;
pub(crate) mod writer;

pub mod types;
pub use crate::types::{BaasRow, FromFieldValue, ToFieldValue};

#[cfg(test)]
pub(crate) mod agg_tests;
#[cfg(test)]
pub(crate) mod cache_tests;
#[cfg(test)]
pub(crate) mod codec_tests;
#[cfg(test)]
pub(crate) mod condition_tests;
#[cfg(test)]
pub(crate) mod mapvalue_tests;
