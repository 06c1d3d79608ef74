//! Backend-neutral filter expressions.
//!
//! This module defines the criteria expression tree used to describe filters
//! without committing to any storage backend's query language. Adapters
//! translate the tree into their own representation; tests and the in-memory
//! mock adapter evaluate it directly via [`Expression::matches`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// A reference to a field by name.
///
/// This is a distinct type, rather than a bare `String`, so that a field
/// named `"id"` can never be confused with the literal string value `"id"`
/// when expressions are compared or serialized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldRef(String);

impl FieldRef {
    /// Creates a new field reference.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the referenced field name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FieldRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for FieldRef {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Comparison operators usable in a [`FieldExpression`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonOperator {
    /// Equal.
    Eq,
    /// Not equal.
    Neq,
    /// Member of a set of values.
    In,
    /// Not a member of a set of values.
    Nin,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonOperator::Eq => write!(f, "eq"),
            ComparisonOperator::Neq => write!(f, "neq"),
            ComparisonOperator::In => write!(f, "in"),
            ComparisonOperator::Nin => write!(f, "nin"),
            ComparisonOperator::Lt => write!(f, "lt"),
            ComparisonOperator::Lte => write!(f, "lte"),
            ComparisonOperator::Gt => write!(f, "gt"),
            ComparisonOperator::Gte => write!(f, "gte"),
        }
    }
}

impl FromStr for ComparisonOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "eq" => Ok(ComparisonOperator::Eq),
            "neq" => Ok(ComparisonOperator::Neq),
            "in" => Ok(ComparisonOperator::In),
            "nin" => Ok(ComparisonOperator::Nin),
            "lt" => Ok(ComparisonOperator::Lt),
            "lte" => Ok(ComparisonOperator::Lte),
            "gt" => Ok(ComparisonOperator::Gt),
            "gte" => Ok(ComparisonOperator::Gte),
            _ => Err(format!("unknown filter operator: {}", s)),
        }
    }
}

impl ComparisonOperator {
    /// Validates the argument list against this operator's arity.
    ///
    /// Unary comparison operators take exactly one argument; `in`/`nin`
    /// take exactly one argument which must be a JSON array.
    fn validate_args(&self, args: &[Value]) -> Result<(), Error> {
        match self {
            ComparisonOperator::In | ComparisonOperator::Nin => {
                if args.len() != 1 || !args[0].is_array() {
                    return Err(Error::invalid_filter(format!(
                        "Operator '{}' takes exactly one list argument",
                        self
                    )));
                }
            }
            _ => {
                if args.len() != 1 {
                    return Err(Error::invalid_filter(format!(
                        "Operator '{}' takes exactly one argument",
                        self
                    )));
                }
            }
        }
        Ok(())
    }
}

/// A single field comparison, e.g. `name eq "Smith"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldExpression {
    /// The field being compared.
    pub field: FieldRef,
    /// The comparison operator.
    pub operator: ComparisonOperator,
    /// Operator arguments. Arity is operator-specific and validated at
    /// construction; see [`FieldExpression::new`].
    pub args: Vec<Value>,
}

impl FieldExpression {
    /// Creates a field expression, validating the operator's arity.
    pub fn new(
        field: impl Into<FieldRef>,
        operator: ComparisonOperator,
        args: Vec<Value>,
    ) -> Result<Self, Error> {
        operator.validate_args(&args)?;
        Ok(Self {
            field: field.into(),
            operator,
            args,
        })
    }

    /// Creates an equality expression.
    pub fn eq(field: impl Into<FieldRef>, value: Value) -> Self {
        Self {
            field: field.into(),
            operator: ComparisonOperator::Eq,
            args: vec![value],
        }
    }

    /// Creates a set-membership (`in`) expression over the given values.
    pub fn one_of(field: impl Into<FieldRef>, values: Vec<Value>) -> Self {
        Self {
            field: field.into(),
            operator: ComparisonOperator::In,
            args: vec![Value::Array(values)],
        }
    }
}

/// A conjunction of clauses. An empty clause list is the identity and is
/// always true.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AndExpression {
    /// The conjoined clauses.
    pub clauses: Vec<Expression>,
}

impl AndExpression {
    /// Creates a conjunction over the given clauses.
    pub fn new(clauses: Vec<Expression>) -> Self {
        Self { clauses }
    }

    /// Creates the empty (always-true) conjunction.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns a new conjunction with `clause` appended.
    ///
    /// Existing clauses are never replaced or deduplicated; filters only
    /// ever narrow each other.
    pub fn with_clause(&self, clause: Expression) -> Self {
        let mut clauses = self.clauses.clone();
        clauses.push(clause);
        Self { clauses }
    }
}

/// A disjunction of clauses. An empty clause list is always false.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrExpression {
    /// The disjoined clauses.
    pub clauses: Vec<Expression>,
}

impl OrExpression {
    /// Creates a disjunction over the given clauses.
    pub fn new(clauses: Vec<Expression>) -> Self {
        Self { clauses }
    }
}

/// A criteria expression: a field comparison or a boolean combinator.
///
/// The tree is immutable and side-effect free. Identical inputs always
/// produce structurally equal trees, so deep-equality comparison is
/// meaningful and used throughout the test suites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// A single field comparison.
    Field(FieldExpression),
    /// A conjunction; empty means always true.
    And(AndExpression),
    /// A disjunction; empty means always false.
    Or(OrExpression),
}

impl Expression {
    /// Evaluates this expression against a JSON object.
    ///
    /// Field references resolve by key lookup on `record`, with `.`
    /// traversing into nested objects. A missing field evaluates as JSON
    /// `null`. Combinator identities hold: an empty `and` matches every
    /// record, an empty `or` matches none.
    pub fn matches(&self, record: &Value) -> bool {
        match self {
            Expression::Field(field_expr) => field_expr_matches(field_expr, record),
            Expression::And(and) => and.clauses.iter().all(|c| c.matches(record)),
            Expression::Or(or) => or.clauses.iter().any(|c| c.matches(record)),
        }
    }
}

impl From<FieldExpression> for Expression {
    fn from(expr: FieldExpression) -> Self {
        Expression::Field(expr)
    }
}

fn field_expr_matches(expr: &FieldExpression, record: &Value) -> bool {
    let actual = resolve_field(record, expr.field.as_str());
    let arg = expr.args.first().unwrap_or(&Value::Null);

    match expr.operator {
        ComparisonOperator::Eq => actual == *arg,
        ComparisonOperator::Neq => actual != *arg,
        ComparisonOperator::In => arg
            .as_array()
            .is_some_and(|set| set.iter().any(|v| *v == actual)),
        ComparisonOperator::Nin => arg
            .as_array()
            .is_none_or(|set| !set.iter().any(|v| *v == actual)),
        ComparisonOperator::Lt => compare(&actual, arg).is_some_and(std::cmp::Ordering::is_lt),
        ComparisonOperator::Lte => compare(&actual, arg).is_some_and(std::cmp::Ordering::is_le),
        ComparisonOperator::Gt => compare(&actual, arg).is_some_and(std::cmp::Ordering::is_gt),
        ComparisonOperator::Gte => compare(&actual, arg).is_some_and(std::cmp::Ordering::is_ge),
    }
}

fn resolve_field(record: &Value, path: &str) -> Value {
    let mut current = record;
    for segment in path.split('.') {
        match current.get(segment) {
            Some(next) => current = next,
            None => return Value::Null,
        }
    }
    current.clone()
}

/// Orders two JSON values when they are comparable: numbers numerically,
/// strings lexicographically. Mixed or non-scalar values do not compare.
fn compare(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64().partial_cmp(&y.as_f64()),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
