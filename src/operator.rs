//
// Copyright (c) 2024 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::error::{param_err, BaasError};

/// The closed set of operators understood by the resource service's query
/// protocol: logical combinators, comparison/membership predicates,
/// aggregation accumulators and update modifiers.
///
/// Every operator has exactly one wire token (see [`Operator::wire_token()`]);
/// tokens outside this set are rejected before any request is issued.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Operator {
    // logical combinators
    Or,
    And,
    Nor,
    Not,

    // comparison and membership
    In,
    NotIn,
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
    Ne,
    Regex,

    // pipeline stages
    Match,
    Group,

    // aggregation accumulators
    Sum,
    Avg,
    StdDevPop,
    StdDevSamp,
    First,
    Last,
    Push,
    AddToSet,
    MergeObjects,

    // update modifiers
    Set,
    Unset,
    Inc,
    SetOnInsert,
    Multiply,
}

impl Operator {
    /// The wire token for this operator. The mapping is total: every
    /// operator has a token.
    pub fn wire_token(&self) -> &'static str {
        match self {
            Operator::Or => "$or",
            Operator::And => "$and",
            Operator::Nor => "$nor",
            Operator::Not => "$not",
            Operator::In => "$in",
            Operator::NotIn => "$nin",
            Operator::Gt => "$gt",
            Operator::Gte => "$gte",
            Operator::Lt => "$lt",
            Operator::Lte => "$lte",
            Operator::Eq => "$eq",
            Operator::Ne => "$ne",
            Operator::Regex => "$regex",
            Operator::Match => "$match",
            Operator::Group => "$group",
            Operator::Sum => "$sum",
            Operator::Avg => "$avg",
            Operator::StdDevPop => "$stdDevPop",
            Operator::StdDevSamp => "$stdDevSamp",
            Operator::First => "$first",
            Operator::Last => "$last",
            Operator::Push => "$push",
            Operator::AddToSet => "$addToSet",
            Operator::MergeObjects => "$mergeObjects",
            Operator::Set => "$set",
            Operator::Unset => "$unset",
            Operator::Inc => "$inc",
            Operator::SetOnInsert => "$setOnInsert",
            Operator::Multiply => "$multiply",
        }
    }

    /// Parse a wire token back into an operator.
    ///
    /// An unknown or unsupported token is a validation failure detected
    /// before any request is issued, never a runtime server error.
    pub fn from_token(token: &str) -> Result<Operator, BaasError> {
        match token {
            "$or" => Ok(Operator::Or),
            "$and" => Ok(Operator::And),
            "$nor" => Ok(Operator::Nor),
            "$not" => Ok(Operator::Not),
            "$in" => Ok(Operator::In),
            "$nin" => Ok(Operator::NotIn),
            "$gt" => Ok(Operator::Gt),
            "$gte" => Ok(Operator::Gte),
            "$lt" => Ok(Operator::Lt),
            "$lte" => Ok(Operator::Lte),
            "$eq" => Ok(Operator::Eq),
            "$ne" => Ok(Operator::Ne),
            "$regex" => Ok(Operator::Regex),
            "$match" => Ok(Operator::Match),
            "$group" => Ok(Operator::Group),
            "$sum" => Ok(Operator::Sum),
            "$avg" => Ok(Operator::Avg),
            "$stdDevPop" => Ok(Operator::StdDevPop),
            "$stdDevSamp" => Ok(Operator::StdDevSamp),
            "$first" => Ok(Operator::First),
            "$last" => Ok(Operator::Last),
            "$push" => Ok(Operator::Push),
            "$addToSet" => Ok(Operator::AddToSet),
            "$mergeObjects" => Ok(Operator::MergeObjects),
            "$set" => Ok(Operator::Set),
            "$unset" => Ok(Operator::Unset),
            "$inc" => Ok(Operator::Inc),
            "$setOnInsert" => Ok(Operator::SetOnInsert),
            "$multiply" => Ok(Operator::Multiply),
            _ => param_err!("unsupported operator token '{}'", token),
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.wire_token())
    }
}
