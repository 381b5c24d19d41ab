//! Per-table field filters.
//!
//! A table filter is a JSON object mapping field names to either an
//! operator object (`{"$gte": 6, "$lt": 9}`, all must hold) or a bare
//! value. A bare scalar means `$eq`; a bare array means `$in`.

use serde_json::{Map, Value};

use crate::model::{Record, Table};
use crate::query::error::QueryError;
use crate::query::operator::{Condition, Operator};

/// Conditions on one field.
#[derive(Debug, Clone)]
pub struct FieldFilter {
    pub field: &'static str,
    pub conditions: Vec<Condition>,
}

/// All field conditions for one table, AND-ed together.
#[derive(Debug, Clone)]
pub struct TableFilter {
    table: Table,
    fields: Vec<FieldFilter>,
}

impl TableFilter {
    /// A filter that accepts every record.
    pub fn empty(table: Table) -> Self {
        Self {
            table,
            fields: Vec::new(),
        }
    }

    /// Parse and validate a filter object for `table`.
    pub fn parse(table: Table, value: &Value) -> Result<Self, QueryError> {
        let object = match value {
            Value::Null => return Ok(Self::empty(table)),
            Value::Object(object) => object,
            _ => {
                return Err(QueryError::Malformed(format!(
                    "filter for {} must be an object of field conditions",
                    table
                )))
            }
        };

        let mut filter = Self::empty(table);
        for (name, rule) in object {
            let def = table.field(name).ok_or_else(|| QueryError::InvalidField {
                scope: table.name().to_string(),
                field: name.clone(),
                valid: table.field_names(),
            })?;
            filter.fields.push(FieldFilter {
                field: def.name,
                conditions: parse_conditions(rule)?,
            });
        }
        Ok(filter)
    }

    /// Add a condition, building the filter programmatically.
    pub fn push(&mut self, field: &'static str, condition: Condition) {
        match self.fields.iter_mut().find(|f| f.field == field) {
            Some(existing) => existing.conditions.push(condition),
            None => self.fields.push(FieldFilter {
                field,
                conditions: vec![condition],
            }),
        }
    }

    pub fn table(&self) -> Table {
        self.table
    }

    pub fn is_empty(&self) -> bool {
        self.fields.iter().all(|f| f.conditions.is_empty())
    }

    pub fn fields(&self) -> &[FieldFilter] {
        &self.fields
    }

    pub fn matches<R: Record>(&self, record: &R) -> bool {
        self.fields.iter().all(|f| {
            let value = record.field(f.field);
            f.conditions.iter().all(|c| c.matches(value.as_ref()))
        })
    }

    /// Normalized form: every field as an operator object.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        for f in &self.fields {
            let mut ops = Map::new();
            for c in &f.conditions {
                if let Value::Object(op) = c.to_json() {
                    ops.extend(op);
                }
            }
            object.insert(f.field.to_string(), Value::Object(ops));
        }
        Value::Object(object)
    }
}

fn parse_conditions(rule: &Value) -> Result<Vec<Condition>, QueryError> {
    match rule {
        Value::Object(ops) => ops
            .iter()
            .map(|(symbol, operand)| Condition::new(Operator::parse(symbol)?, operand))
            .collect(),
        Value::Array(_) => Ok(vec![Condition::new(Operator::In, rule)?]),
        _ => Ok(vec![Condition::new(Operator::Eq, rule)?]),
    }
}
