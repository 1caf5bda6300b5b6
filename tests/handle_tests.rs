//
// Copyright (c) 2024 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use baas_rust_sdk::condition::{gte, Condition};
use baas_rust_sdk::types::{BaasRow, FieldValue, FromFieldValue, FromMapColumn, MapValue, ToFieldValue};
use baas_rust_sdk::BaasErrorCode;
use baas_rust_sdk::Cache;
use baas_rust_sdk::Handle;
use baas_rust_sdk::HandleBuilder;
use baas_rust_sdk::Table;

use std::error::Error;
use std::time::Duration;

fn get_builder() -> Result<HandleBuilder, baas_rust_sdk::BaasError> {
    Handle::builder()
        // default: try localhost:8080
        .endpoint("http://localhost:8080")?
        .namespace("testns")?
        .timeout(Duration::from_secs(30))?
        // this will override any defaults above
        .from_environment()
}

#[test]
fn builder_requires_endpoint() {
    let err = HandleBuilder::new().build().unwrap_err();
    assert_eq!(err.code, BaasErrorCode::InvalidParam);
    assert!(err.message.contains("endpoint"));
}

#[test]
fn builder_requires_namespace() {
    let err = Handle::builder()
        .endpoint("http://localhost:8080")
        .unwrap()
        .build()
        .unwrap_err();
    assert_eq!(err.code, BaasErrorCode::InvalidParam);
    assert!(err.message.contains("namespace"));
}

#[test]
fn builder_rejects_bad_endpoint() {
    assert!(Handle::builder().endpoint("ftp://example.com").is_err());
    assert!(Handle::builder().endpoint("not a url").is_err());
    assert!(Handle::builder().namespace("").is_err());
    assert!(Handle::builder().timeout(Duration::from_nanos(10)).is_err());
}

#[test]
fn builder_builds_handle() -> Result<(), Box<dyn Error>> {
    let handle = Handle::builder()
        .endpoint("http://localhost:8080/")?
        .namespace("testns")?
        .service_id("svc_0001")?
        .access_token("token")?
        .build()?;
    // cloning returns the same underlying handle
    let _h2 = handle.clone();
    Ok(())
}

#[derive(Default, Debug, PartialEq, BaasRow)]
struct Goods {
    pub item: String,
    pub qty: i64,
    #[baas(column = city)]
    pub town: Option<String>,
}

#[test]
fn derive_row_roundtrip() -> Result<(), Box<dyn Error>> {
    let g = Goods {
        item: "pencil".to_string(),
        qty: 120,
        town: Some("shanghai".to_string()),
    };
    let mv = g.to_map_value()?;
    assert_eq!(mv.get_string("item").ok_or("item missing")?, "pencil");
    assert_eq!(mv.get_i64("qty").ok_or("qty missing")?, 120);
    // renamed column
    assert_eq!(mv.get_string("city").ok_or("city missing")?, "shanghai");

    let mut back = Goods::default();
    back.from_map_value(&mv)?;
    assert_eq!(back, g);
    Ok(())
}

#[test]
fn derive_row_absent_optional_field() -> Result<(), Box<dyn Error>> {
    // a missing column binds an Option field to None, not an error
    let mv = MapValue::new().str("item", "pen").i64("qty", 3);
    let mut g = Goods::default();
    g.from_map_value(&mv)?;
    assert_eq!(g.town, None);
    assert_eq!(g.item, "pen");
    Ok(())
}

// The smoke test requires a running resource service; configure it with the
// BAAS_* environment variables and run with `cargo test -- --ignored`.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore]
async fn smoke_test() -> Result<(), Box<dyn Error>> {
    // Set up a tracing subscriber to see output based on RUST_LOG environment setting
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .with_ansi(false)
        .compact()
        .init();

    let handle = get_builder()?.build()?;

    // document store: create, find, count, delete
    let created = Table::new("goods")
        .batch_create(
            &handle,
            &[
                MapValue::new().str("item", "pencil").i64("qty", 50),
                MapValue::new().str("item", "pen").i64("qty", 150),
                MapValue::new().str("item", "eraser").i64("qty", 200),
            ],
        )
        .await?;
    assert_eq!(created.len(), 3);

    let heavy = Table::new("goods")
        .filter(Condition::field("qty", gte(100)))
        .count(&handle)
        .await?;
    assert_eq!(heavy, 2);

    let all: Vec<Goods> = Table::new("goods").filter(Condition::all()).find(&handle).await?;
    assert_eq!(all.len(), 3);

    let cities: Vec<String> = Table::new("goods")
        .filter(Condition::all())
        .distinct(&handle, "city")
        .await?;
    println!("cities={:?}", cities);

    Table::new("goods")
        .filter(Condition::all())
        .batch_delete(&handle)
        .await?;

    // cache: set with ttl, get, expire
    let cache = Cache::new(&handle);
    cache.set("k", "v", Some(Duration::from_secs(10))).await?;
    let v = cache.get("k").await?;
    assert_eq!(v, "v");
    cache.del(&["k"]).await?;
    match cache.get("k").await {
        Err(e) if e.is_not_found() => {}
        other => panic!("expected not-found, got {:?}", other),
    }

    Ok(())
}

// keep the conversion traits exercised from an external crate's viewpoint
#[test]
fn conversion_traits_roundtrip() -> Result<(), Box<dyn Error>> {
    let fv = 42i64.to_field_value();
    assert_eq!(i64::from_field(&fv)?, 42);
    let fv = vec!["a".to_string(), "b".to_string()].to_field_value();
    let back: Vec<String> = Vec::from_field(&fv)?;
    assert_eq!(back, vec!["a", "b"]);
    Ok(())
}
