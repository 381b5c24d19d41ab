//! Filter operators and their evaluation against field values.
//!
//! # Design Decisions
//! - Text comparisons ignore case
//! - Numbers compare numerically; numeric strings are accepted as operands
//! - List fields match when any item matches
//! - Only `$ne`, `$nin` and `$exists: false` can match an absent field

use std::cmp::Ordering;
use std::fmt;

use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};

use crate::model::FieldValue;
use crate::query::error::QueryError;

const REGEX_SIZE_LIMIT: usize = 1 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    In,
    Nin,
    Gt,
    Gte,
    Lt,
    Lte,
    Regex,
    Exists,
    Contains,
}

impl Operator {
    pub const ALL: [Operator; 11] = [
        Operator::Eq,
        Operator::Ne,
        Operator::In,
        Operator::Nin,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
        Operator::Regex,
        Operator::Exists,
        Operator::Contains,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Eq => "$eq",
            Operator::Ne => "$ne",
            Operator::In => "$in",
            Operator::Nin => "$nin",
            Operator::Gt => "$gt",
            Operator::Gte => "$gte",
            Operator::Lt => "$lt",
            Operator::Lte => "$lte",
            Operator::Regex => "$regex",
            Operator::Exists => "$exists",
            Operator::Contains => "$contains",
        }
    }

    pub fn parse(symbol: &str) -> Result<Self, QueryError> {
        Operator::ALL
            .into_iter()
            .find(|op| op.symbol() == symbol)
            .ok_or_else(|| QueryError::InvalidOperator {
                operator: symbol.to_string(),
                supported: Operator::ALL.map(Operator::symbol).join(", "),
            })
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A scalar operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Scalar {
    fn from_json(operator: Operator, value: &Value) -> Result<Self, QueryError> {
        match value {
            Value::Null => Ok(Scalar::Null),
            Value::Bool(b) => Ok(Scalar::Bool(*b)),
            Value::Number(n) => n
                .as_f64()
                .map(Scalar::Number)
                .ok_or_else(|| invalid_operand(operator, "number out of range")),
            Value::String(s) => Ok(Scalar::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => {
                Err(invalid_operand(operator, "expected a string, number, boolean or null"))
            }
        }
    }

    /// Equality against a single (non-list) field value.
    fn equals(&self, value: &FieldValue<'_>) -> bool {
        match self {
            Scalar::Null => false,
            Scalar::Number(m) => value.as_number().is_some_and(|n| n == *m),
            Scalar::Text(t) => match (value, parse_operand_number(t)) {
                (FieldValue::Number(n), Some(m)) => *n == m,
                (FieldValue::Number(_), None) => false,
                _ => fold(&value.as_text()) == fold(t),
            },
            Scalar::Bool(b) => fold(&value.as_text()) == b.to_string(),
        }
    }

    fn compare(&self, value: &FieldValue<'_>) -> Option<Ordering> {
        match self {
            Scalar::Number(m) => value.as_number().and_then(|n| n.partial_cmp(m)),
            Scalar::Text(t) => match (value.as_number(), parse_operand_number(t)) {
                (Some(n), Some(m)) => n.partial_cmp(&m),
                _ => match value {
                    FieldValue::Text(text) => Some(fold(text).cmp(&fold(t))),
                    _ => None,
                },
            },
            Scalar::Null | Scalar::Bool(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
enum Operand {
    Scalar(Scalar),
    Set(Vec<Scalar>),
    Pattern(Regex),
    Flag(bool),
    Needle(String),
}

/// One operator applied to one field.
#[derive(Debug, Clone)]
pub struct Condition {
    operator: Operator,
    operand: Operand,
    raw: Value,
}

impl Condition {
    /// Validate an operand for `operator`.
    pub fn new(operator: Operator, raw: &Value) -> Result<Self, QueryError> {
        let operand = match operator {
            Operator::Eq | Operator::Ne => Operand::Scalar(Scalar::from_json(operator, raw)?),
            Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte => match raw {
                Value::Number(_) | Value::String(_) => {
                    Operand::Scalar(Scalar::from_json(operator, raw)?)
                }
                _ => return Err(invalid_operand(operator, "expected a number or string")),
            },
            Operator::In | Operator::Nin => match raw {
                Value::Array(items) => Operand::Set(
                    items
                        .iter()
                        .map(|item| Scalar::from_json(operator, item))
                        .collect::<Result<_, _>>()?,
                ),
                _ => return Err(invalid_operand(operator, "expected an array")),
            },
            Operator::Regex => match raw {
                Value::String(pattern) => Operand::Pattern(
                    RegexBuilder::new(pattern)
                        .case_insensitive(true)
                        .size_limit(REGEX_SIZE_LIMIT)
                        .build()
                        .map_err(|e| QueryError::InvalidRegex {
                            pattern: pattern.clone(),
                            reason: e.to_string(),
                        })?,
                ),
                _ => return Err(invalid_operand(operator, "expected a pattern string")),
            },
            Operator::Exists => match raw {
                Value::Bool(flag) => Operand::Flag(*flag),
                _ => return Err(invalid_operand(operator, "expected true or false")),
            },
            Operator::Contains => match raw {
                Value::String(s) => Operand::Needle(fold(s)),
                Value::Number(n) => Operand::Needle(n.to_string()),
                _ => return Err(invalid_operand(operator, "expected a string or number")),
            },
        };
        Ok(Self {
            operator,
            operand,
            raw: raw.clone(),
        })
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// Evaluate against a field; `None` is an absent or blank field.
    pub fn matches(&self, value: Option<&FieldValue<'_>>) -> bool {
        match (&self.operand, self.operator) {
            (Operand::Flag(want), _) => value.is_some() == *want,
            (Operand::Scalar(s), Operator::Eq) => eq(s, value),
            (Operand::Scalar(s), Operator::Ne) => !eq(s, value),
            (Operand::Set(items), Operator::In) => items.iter().any(|s| eq(s, value)),
            (Operand::Set(items), Operator::Nin) => !items.iter().any(|s| eq(s, value)),
            (Operand::Scalar(s), op) => value.is_some_and(|v| {
                any_item(v, |item| {
                    s.compare(item).is_some_and(|ord| match op {
                        Operator::Gt => ord == Ordering::Greater,
                        Operator::Gte => ord != Ordering::Less,
                        Operator::Lt => ord == Ordering::Less,
                        Operator::Lte => ord != Ordering::Greater,
                        _ => false,
                    })
                })
            }),
            (Operand::Pattern(re), _) => {
                value.is_some_and(|v| any_item(v, |item| re.is_match(&item.as_text())))
            }
            (Operand::Needle(needle), _) => {
                value.is_some_and(|v| any_item(v, |item| fold(&item.as_text()).contains(needle.as_str())))
            }
            (Operand::Set(_), _) => false,
        }
    }

    /// `{"$op": operand}` as supplied.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert(self.operator.symbol().to_string(), self.raw.clone());
        Value::Object(map)
    }
}

fn eq(scalar: &Scalar, value: Option<&FieldValue<'_>>) -> bool {
    match value {
        None => *scalar == Scalar::Null,
        Some(v) => any_item(v, |item| scalar.equals(item)),
    }
}

fn any_item(value: &FieldValue<'_>, pred: impl Fn(&FieldValue<'_>) -> bool) -> bool {
    value.items().iter().any(pred)
}

fn fold(text: &str) -> String {
    text.trim().to_lowercase()
}

fn parse_operand_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn invalid_operand(operator: Operator, reason: &str) -> QueryError {
    QueryError::InvalidOperand {
        operator: operator.symbol().to_string(),
        reason: reason.to_string(),
    }
}
