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
use crate::operator::Operator;
use crate::query::decode_records_reply;
use crate::types::{BaasRow, FieldValue, MapValue, OpKind};
use crate::writer::Writer;
use std::collections::BTreeMap;
use std::result::Result;
use std::time::Duration;

/// One or more grouping field paths: a single path forms a simple grouping
/// key, an ordered list forms a composite key.
#[derive(Debug)]
pub struct GroupKey(pub(crate) Vec<String>);

impl From<&str> for GroupKey {
    fn from(s: &str) -> GroupKey {
        GroupKey(vec![s.to_string()])
    }
}
impl From<String> for GroupKey {
    fn from(s: String) -> GroupKey {
        GroupKey(vec![s])
    }
}
impl From<Vec<String>> for GroupKey {
    fn from(v: Vec<String>) -> GroupKey {
        GroupKey(v)
    }
}
impl From<Vec<&str>> for GroupKey {
    fn from(v: Vec<&str>) -> GroupKey {
        GroupKey(v.iter().map(|s| s.to_string()).collect())
    }
}
impl From<&[&str]> for GroupKey {
    fn from(v: &[&str]) -> GroupKey {
        GroupKey(v.iter().map(|s| s.to_string()).collect())
    }
}

// Source specification of one accumulator expression: plain field paths, or
// an output-name to source-field mapping (push with renamed fields).
#[derive(Debug)]
pub(crate) enum AccSource {
    Fields(Vec<String>),
    Renamed(Vec<(String, String)>),
}

/// The source of a Push accumulator: field path(s), or a mapping from
/// output names to source field paths.
#[derive(Debug)]
pub struct PushSpec(pub(crate) AccSource);

impl From<&str> for PushSpec {
    fn from(s: &str) -> PushSpec {
        PushSpec(AccSource::Fields(vec![s.to_string()]))
    }
}
impl From<Vec<&str>> for PushSpec {
    fn from(v: Vec<&str>) -> PushSpec {
        PushSpec(AccSource::Fields(v.iter().map(|s| s.to_string()).collect()))
    }
}
impl From<Vec<String>> for PushSpec {
    fn from(v: Vec<String>) -> PushSpec {
        PushSpec(AccSource::Fields(v))
    }
}
impl From<Vec<(&str, &str)>> for PushSpec {
    fn from(v: Vec<(&str, &str)>) -> PushSpec {
        PushSpec(AccSource::Renamed(
            v.iter()
                .map(|(out, src)| (out.to_string(), src.to_string()))
                .collect(),
        ))
    }
}
impl From<BTreeMap<String, String>> for PushSpec {
    fn from(m: BTreeMap<String, String>) -> PushSpec {
        PushSpec(AccSource::Renamed(m.into_iter().collect()))
    }
}

#[derive(Debug)]
pub(crate) struct AccExpr {
    pub(crate) op: Operator,
    pub(crate) source: AccSource,
    pub(crate) alias: String,
}

// One grouping stage: the grouping key(s), the output alias for the key,
// and the accumulator expressions evaluated per group.
#[derive(Debug)]
pub(crate) struct GroupStage {
    pub(crate) keys: Vec<String>,
    pub(crate) alias: Option<String>,
    pub(crate) accumulators: Vec<AccExpr>,
}

impl GroupStage {
    // The grouping-key output field name: the explicit alias, or the last
    // dot segment of the last field path.
    fn key_alias(&self) -> String {
        if let Some(a) = &self.alias {
            return a.clone();
        }
        match self.keys.last() {
            Some(k) => match k.rsplit('.').next() {
                Some(seg) => seg.to_string(),
                None => k.clone(),
            },
            None => "".to_string(),
        }
    }
}

/// A fluent aggregation over one collection: one or more grouping stages,
/// each carrying accumulator expressions, plus an optional post-group
/// filter.
///
/// Grouping and accumulation are two independently chainable method
/// families on the same mutable stage, so the call order between
/// [`group_by()`](AggQuery::group_by()) and its accumulators is flexible. A
/// new `group_by` call always opens a new stage; accumulators always
/// attach to the most recent stage, never retroactively to an earlier one.
///
/// ```no_run
/// use baas_rust_sdk::{Handle, Table};
/// use baas_rust_sdk::types::MapValue;
/// use baas_rust_sdk::condition::{Condition, gt};
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let handle = Handle::builder().endpoint("http://localhost:8080")?.namespace("ns")?.build()?;
/// let rows: Vec<MapValue> = Table::new("goods")
///     .group_by_as("info.city", "city")
///     .sum("qty", "total")
///     .having(Condition::field("total", gt(100)))
///     .find(&handle)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AggQuery {
    pub(crate) table_name: String,
    pub(crate) stages: Vec<GroupStage>,
    pub(crate) having: Condition,
    pub(crate) timeout: Option<Duration>,
}

impl AggQuery {
    pub(crate) fn new(table_name: &str, timeout: Option<Duration>) -> AggQuery {
        AggQuery {
            table_name: table_name.to_string(),
            stages: Vec::new(),
            having: Condition::all(),
            timeout,
        }
    }

    /// Append a new grouping stage keyed by the given field path(s). The
    /// grouping-key output field is named after the last dot segment of the
    /// (last) field path.
    pub fn group_by(self, key: impl Into<GroupKey>) -> AggQuery {
        self.push_stage(key.into(), None)
    }

    /// Append a new grouping stage keyed by the given field path(s), naming
    /// the grouping-key output field `alias`.
    pub fn group_by_as(self, key: impl Into<GroupKey>, alias: &str) -> AggQuery {
        self.push_stage(key.into(), Some(alias.to_string()))
    }

    fn push_stage(mut self, key: GroupKey, alias: Option<String>) -> AggQuery {
        self.stages.push(GroupStage {
            keys: key.0,
            alias,
            accumulators: Vec::new(),
        });
        self
    }

    /// Per-group sum of `field`, output as `alias`.
    pub fn sum(self, field: &str, alias: &str) -> AggQuery {
        self.accumulate(Operator::Sum, GroupKey::from(field).0, alias)
    }

    /// Per-group average of `field`, output as `alias`.
    pub fn avg(self, field: &str, alias: &str) -> AggQuery {
        self.accumulate(Operator::Avg, GroupKey::from(field).0, alias)
    }

    /// Per-group population standard deviation of `field`, output as `alias`.
    pub fn std_dev_pop(self, field: &str, alias: &str) -> AggQuery {
        self.accumulate(Operator::StdDevPop, GroupKey::from(field).0, alias)
    }

    /// Per-group sample standard deviation of `field`, output as `alias`.
    pub fn std_dev_samp(self, field: &str, alias: &str) -> AggQuery {
        self.accumulate(Operator::StdDevSamp, GroupKey::from(field).0, alias)
    }

    /// Value of the given field(s) from the first record of each group,
    /// output as `alias`.
    pub fn first(self, fields: impl Into<GroupKey>, alias: &str) -> AggQuery {
        self.accumulate(Operator::First, fields.into().0, alias)
    }

    /// Value of the given field(s) from the last record of each group,
    /// output as `alias`.
    pub fn last(self, fields: impl Into<GroupKey>, alias: &str) -> AggQuery {
        self.accumulate(Operator::Last, fields.into().0, alias)
    }

    /// Collect the given field(s) of every record in the group into a list,
    /// output as `alias`. Accepts a rename mapping (output name to source
    /// field) as well as plain field paths.
    pub fn push(mut self, spec: impl Into<PushSpec>, alias: &str) -> AggQuery {
        let spec: PushSpec = spec.into();
        if let Some(stage) = self.stages.last_mut() {
            stage.accumulators.push(AccExpr {
                op: Operator::Push,
                source: spec.0,
                alias: alias.to_string(),
            });
        }
        self
    }

    /// Collect the distinct values of `field` across the group into a list,
    /// output as `alias`.
    pub fn add_to_set(self, field: &str, alias: &str) -> AggQuery {
        self.accumulate(Operator::AddToSet, GroupKey::from(field).0, alias)
    }

    /// Merge the document values of the given field(s) across the group into
    /// one document, output as `alias`.
    pub fn merge_objects(self, fields: impl Into<GroupKey>, alias: &str) -> AggQuery {
        self.accumulate(Operator::MergeObjects, fields.into().0, alias)
    }

    fn accumulate(mut self, op: Operator, fields: Vec<String>, alias: &str) -> AggQuery {
        if let Some(stage) = self.stages.last_mut() {
            stage.accumulators.push(AccExpr {
                op,
                source: AccSource::Fields(fields),
                alias: alias.to_string(),
            });
        }
        self
    }

    /// Attach a post-group filter, evaluated against the grouped output.
    ///
    /// Field names in the condition refer to grouping-key and accumulator
    /// output aliases, not to source record fields. Repeated calls narrow
    /// with an implicit AND.
    pub fn having(mut self, condition: Condition) -> AggQuery {
        let prev = std::mem::take(&mut self.having);
        self.having = prev.and_with(condition);
        self
    }

    /// Specify the timeout value for the request.
    ///
    /// This is optional. If not set, the default timeout value configured for
    /// the [`Handle`](crate::HandleBuilder::timeout()) is used.
    pub fn timeout(mut self, t: &Duration) -> AggQuery {
        self.timeout = Some(t.clone());
        self
    }

    /// Compile the full pipeline and execute it, binding the reply's record
    /// list into a vector of `T` exactly as [`Query::find()`] does.
    ///
    /// [`Query::find()`]: crate::Query::find()
    pub async fn find<T: BaasRow + Default>(&self, h: &Handle) -> Result<Vec<T>, BaasError> {
        let timeout = h.get_timeout(&self.timeout);
        let w = self.compile(&timeout)?;
        let opts = SendOptions {
            timeout,
            op: format!("aggregate {}", self.table_name),
        };
        let mut r = h.send_doc_command(w, &opts).await?;
        let records = decode_records_reply(&mut r)?;
        let mut out: Vec<T> = Vec::with_capacity(records.len());
        for mv in records {
            let mut t = T::default();
            t.from_map_value(&mv)?;
            out.push(t);
        }
        Ok(out)
    }

    // Compile into one Aggregate command envelope carrying the ordered
    // pipeline.
    pub(crate) fn compile(&self, timeout: &Duration) -> Result<Writer, BaasError> {
        if self.table_name.is_empty() {
            return param_err!("table name is empty");
        }
        if self.stages.is_empty() {
            return param_err!("aggregation on table {} has no grouping stage", self.table_name);
        }
        let pipeline = self.compile_pipeline();

        let mut w = Writer::new();
        let mut ds = DocSerializer::start_request(&mut w);
        ds.start_header();
        ds.write_header(OpKind::Aggregate, timeout, &self.table_name);
        ds.end_header();
        ds.start_payload();
        ds.write_array_field(PIPELINE, &pipeline);
        ds.end_payload();
        ds.end_request();
        Ok(w)
    }

    // Stage order in the compiled pipeline is fixed: group stages in
    // creation order, then the post-group filter. The grouped output is the
    // implicit projection. Call order of the fluent methods does not affect
    // this ordering.
    pub(crate) fn compile_pipeline(&self) -> Vec<FieldValue> {
        let mut pipeline: Vec<FieldValue> = Vec::with_capacity(self.stages.len() + 1);
        for stage in &self.stages {
            let mut group = MapValue::new();
            group.put_field_value("_id", compile_group_key(stage));
            for acc in &stage.accumulators {
                let mut expr = MapValue::new();
                expr.put_field_value(acc.op.wire_token(), compile_acc_source(&acc.source));
                group.put_field_value(&acc.alias, FieldValue::Map(expr));
            }
            let mut m = MapValue::new();
            m.put_field_value(Operator::Group.wire_token(), FieldValue::Map(group));
            pipeline.push(FieldValue::Map(m));
        }
        if !self.having.is_all() {
            let mut m = MapValue::new();
            m.put_field_value(
                Operator::Match.wire_token(),
                FieldValue::Map(self.having.compile()),
            );
            pipeline.push(FieldValue::Map(m));
        }
        pipeline
    }
}

// A field path becomes a "$path" reference in the compiled stage.
fn field_ref(path: &str) -> FieldValue {
    FieldValue::String(format!("${}", path))
}

fn compile_group_key(stage: &GroupStage) -> FieldValue {
    let alias = stage.key_alias();
    let mut m = MapValue::new();
    if stage.keys.len() == 1 {
        m.put_field_value(&alias, field_ref(&stage.keys[0]));
    } else {
        let refs: Vec<FieldValue> = stage.keys.iter().map(|k| field_ref(k)).collect();
        m.put_field_value(&alias, FieldValue::Array(refs));
    }
    FieldValue::Map(m)
}

fn compile_acc_source(source: &AccSource) -> FieldValue {
    match source {
        AccSource::Fields(f) => {
            if f.len() == 1 {
                field_ref(&f[0])
            } else {
                FieldValue::Array(f.iter().map(|k| field_ref(k)).collect())
            }
        }
        AccSource::Renamed(pairs) => {
            let mut m = MapValue::new();
            for (out, src) in pairs {
                m.put_field_value(out, field_ref(src));
            }
            FieldValue::Map(m)
        }
    }
}
