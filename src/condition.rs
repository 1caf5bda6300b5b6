//
// Copyright (c) 2024 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::error::BaasError;
use crate::operator::Operator;
use crate::types::{FieldValue, MapValue, ToFieldValue};

/// A single field predicate: either a bare literal (equality) or an
/// operator expression (operator plus operand).
///
/// Instances are built with the helper functions in this module
/// ([`eq()`], [`gte()`], [`is_in()`], ...) or with [`value()`] for the
/// bare-literal equality shorthand.
#[derive(Debug)]
pub struct FieldExpr {
    pub(crate) op: Option<Operator>,
    pub(crate) operand: FieldValue,
}

impl FieldExpr {
    pub(crate) fn new(op: Operator, operand: FieldValue) -> FieldExpr {
        FieldExpr {
            op: Some(op),
            operand,
        }
    }

    /// Build a field expression from a wire operator token.
    ///
    /// Unknown or unsupported tokens fail here, before any request is
    /// issued.
    pub fn raw(token: &str, operand: impl ToFieldValue) -> Result<FieldExpr, BaasError> {
        let op = Operator::from_token(token)?;
        Ok(FieldExpr::new(op, operand.to_field_value()))
    }

    pub(crate) fn clone_internal(&self) -> FieldExpr {
        FieldExpr {
            op: self.op,
            operand: self.operand.clone_internal(),
        }
    }

    // The wire form: a bare literal for equality shorthand, otherwise a
    // single-entry map of operator token to operand.
    pub(crate) fn compile(&self) -> FieldValue {
        match self.op {
            None => self.operand.clone_internal(),
            Some(op) => {
                let mut m = MapValue::new();
                m.put_field_value(op.wire_token(), self.operand.clone_internal());
                FieldValue::Map(m)
            }
        }
    }
}

/// Equality shorthand: a bare literal operand. Equivalent to an explicit
/// equality operator on the field.
pub fn value(v: impl ToFieldValue) -> FieldExpr {
    FieldExpr {
        op: None,
        operand: v.to_field_value(),
    }
}

/// Equal.
pub fn eq(v: impl ToFieldValue) -> FieldExpr {
    FieldExpr::new(Operator::Eq, v.to_field_value())
}

/// Not equal.
pub fn ne(v: impl ToFieldValue) -> FieldExpr {
    FieldExpr::new(Operator::Ne, v.to_field_value())
}

/// Greater than.
pub fn gt(v: impl ToFieldValue) -> FieldExpr {
    FieldExpr::new(Operator::Gt, v.to_field_value())
}

/// Greater than or equal.
pub fn gte(v: impl ToFieldValue) -> FieldExpr {
    FieldExpr::new(Operator::Gte, v.to_field_value())
}

/// Less than.
pub fn lt(v: impl ToFieldValue) -> FieldExpr {
    FieldExpr::new(Operator::Lt, v.to_field_value())
}

/// Less than or equal.
pub fn lte(v: impl ToFieldValue) -> FieldExpr {
    FieldExpr::new(Operator::Lte, v.to_field_value())
}

/// Membership in the given set of values.
pub fn is_in<T: ToFieldValue>(vals: Vec<T>) -> FieldExpr {
    FieldExpr::new(Operator::In, vals.to_field_value())
}

/// Non-membership in the given set of values.
pub fn not_in<T: ToFieldValue>(vals: Vec<T>) -> FieldExpr {
    FieldExpr::new(Operator::NotIn, vals.to_field_value())
}

/// Regular expression match.
pub fn regex(pattern: &str) -> FieldExpr {
    FieldExpr::new(Operator::Regex, pattern.to_field_value())
}

#[derive(Debug, Default)]
enum Node {
    // matches every record
    #[default]
    All,
    // field path -> predicate; multiple entries are an implicit AND
    Fields(Vec<(String, FieldExpr)>),
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Nor(Vec<Condition>),
    Not(Box<Condition>),
}

/// A boolean predicate tree over record fields.
///
/// Leaves map a dot-separated field path to a [`FieldExpr`]; composites
/// combine child conditions with AND/OR/NOR/NOT. An empty condition
/// ([`Condition::all()`]) matches every record.
///
/// ```
/// use baas_rust_sdk::condition::{Condition, eq, gte};
///
/// // item == "pencil" AND qty >= 100
/// let c = Condition::field("item", eq("pencil")).and_field("qty", gte(100));
/// ```
#[derive(Debug, Default)]
pub struct Condition {
    node: Node,
}

impl Condition {
    /// The empty condition: compiles to "no filter" and matches every
    /// record.
    pub fn all() -> Condition {
        Condition { node: Node::All }
    }

    /// A single-field predicate.
    pub fn field(path: &str, expr: FieldExpr) -> Condition {
        Condition {
            node: Node::Fields(vec![(path.to_string(), expr)]),
        }
    }

    /// Add another field predicate to this condition. Multiple field
    /// entries in one condition are an implicit AND across fields.
    pub fn and_field(self, path: &str, expr: FieldExpr) -> Condition {
        match self.node {
            Node::All => Condition::field(path, expr),
            Node::Fields(mut f) => {
                f.push((path.to_string(), expr));
                Condition {
                    node: Node::Fields(f),
                }
            }
            _ => self.and_with(Condition::field(path, expr)),
        }
    }

    /// AND across the given child conditions.
    pub fn and(children: Vec<Condition>) -> Condition {
        Condition {
            node: Node::And(children),
        }
    }

    /// OR across the given child conditions.
    pub fn or(children: Vec<Condition>) -> Condition {
        Condition {
            node: Node::Or(children),
        }
    }

    /// NOR across the given child conditions.
    pub fn nor(children: Vec<Condition>) -> Condition {
        Condition {
            node: Node::Nor(children),
        }
    }

    /// Negation of the given child condition.
    pub fn negate(child: Condition) -> Condition {
        Condition {
            node: Node::Not(Box::new(child)),
        }
    }

    /// `true` if this condition matches every record.
    pub fn is_all(&self) -> bool {
        match &self.node {
            Node::All => true,
            Node::Fields(f) => f.is_empty(),
            _ => false,
        }
    }

    // Narrowing merge: the result matches records satisfying both
    // conditions. Merging with the empty condition is the identity, so
    // repeated narrowing never widens a filter.
    pub(crate) fn and_with(self, other: Condition) -> Condition {
        if self.is_all() {
            return other;
        }
        if other.is_all() {
            return self;
        }
        Condition::and(vec![self, other])
    }

    pub(crate) fn clone_internal(&self) -> Condition {
        let node = match &self.node {
            Node::All => Node::All,
            Node::Fields(f) => Node::Fields(
                f.iter()
                    .map(|(p, e)| (p.clone(), e.clone_internal()))
                    .collect(),
            ),
            Node::And(c) => Node::And(c.iter().map(|x| x.clone_internal()).collect()),
            Node::Or(c) => Node::Or(c.iter().map(|x| x.clone_internal()).collect()),
            Node::Nor(c) => Node::Nor(c.iter().map(|x| x.clone_internal()).collect()),
            Node::Not(c) => Node::Not(Box::new(c.clone_internal())),
        };
        Condition { node }
    }

    /// Compile this condition into its wire filter document. The empty
    /// condition compiles to an empty document, never an error.
    pub fn compile(&self) -> MapValue {
        let mut m = MapValue::new();
        match &self.node {
            Node::All => {}
            Node::Fields(f) => {
                for (path, expr) in f {
                    m.put_field_value(path, expr.compile());
                }
            }
            Node::And(c) => {
                m.put_field_value(Operator::And.wire_token(), compile_children(c));
            }
            Node::Or(c) => {
                m.put_field_value(Operator::Or.wire_token(), compile_children(c));
            }
            Node::Nor(c) => {
                m.put_field_value(Operator::Nor.wire_token(), compile_children(c));
            }
            Node::Not(c) => {
                m.put_field_value(Operator::Not.wire_token(), FieldValue::Map(c.compile()));
            }
        }
        m
    }
}

fn compile_children(children: &Vec<Condition>) -> FieldValue {
    let v: Vec<FieldValue> = children
        .iter()
        .map(|c| FieldValue::Map(c.compile()))
        .collect();
    FieldValue::Array(v)
}
