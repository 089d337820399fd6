//! In-memory evaluation of filter expressions.
//!
//! Stores that hold their rows in memory (like [`crate::Dataset`]) use the
//! [`FilterEvaluator`] to execute a composed [`Expression`] directly.
//! Anything that exposes its attributes through [`Record`] can be filtered.

use uuid::Uuid;

use super::ast::{Expression, Field, Literal};
use super::error::{FilterError, FilterResult};

/// The value of one record attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeValue<'a> {
    /// The attribute is known but has no value.
    Null,
    /// Free text.
    Text(&'a str),
    /// A UUID.
    Uuid(Uuid),
    /// An integer.
    Number(i64),
    /// A boolean.
    Bool(bool),
    /// A multi-valued text attribute.
    TextList(&'a [String]),
    /// A multi-valued UUID attribute.
    UuidList(&'a [Uuid]),
}

/// A record whose attributes can be filtered.
pub trait Record {
    /// Returns the value of the named attribute, or `None` if the record has
    /// no such attribute.
    fn attribute(&self, name: &str) -> Option<AttributeValue<'_>>;
}

/// Evaluates a parsed expression against records.
#[derive(Debug, Clone, Copy)]
pub struct FilterEvaluator<'a> {
    expression: &'a Expression,
}

impl<'a> FilterEvaluator<'a> {
    /// Creates a new evaluator for the given expression.
    pub fn new(expression: &'a Expression) -> Self {
        Self { expression }
    }

    /// Returns true if the record matches the expression.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::UnknownAttribute` when the expression references
    /// an attribute the record does not have, `FilterError::EmptyGroup` for an
    /// `And`/`Or` without children and `FilterError::NotBoolean` for a bare
    /// literal or field that is not boolean.
    pub fn matches<R: Record>(&self, record: &R) -> FilterResult<bool> {
        evaluate(self.expression, record)
    }

    /// Filters a slice of records, returning only those that match.
    pub fn filter_records<'b, R: Record>(&self, records: &'b [R]) -> FilterResult<Vec<&'b R>> {
        let mut matched = Vec::new();
        for record in records {
            if self.matches(record)? {
                matched.push(record);
            }
        }
        Ok(matched)
    }
}

fn evaluate<R: Record>(expression: &Expression, record: &R) -> FilterResult<bool> {
    match expression {
        Expression::Literal(Literal::Bool(b)) => Ok(*b),
        Expression::Literal(_) => Err(FilterError::NotBoolean {
            expression: expression.to_string(),
        }),
        Expression::Field(field) => match lookup(record, field)? {
            AttributeValue::Bool(b) => Ok(b),
            AttributeValue::Null => Ok(false),
            _ => Err(FilterError::NotBoolean {
                expression: expression.to_string(),
            }),
        },
        Expression::Equals(field, literal) => Ok(equals(lookup(record, field)?, literal)),
        Expression::IsNull(field) => Ok(is_null(lookup(record, field)?)),
        Expression::Not(inner) => evaluate(inner, record).map(|b| !b),
        Expression::And(children) => {
            if children.is_empty() {
                return Err(FilterError::EmptyGroup { operator: "AND" });
            }
            for child in children {
                if !evaluate(child, record)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Expression::Or(children) => {
            if children.is_empty() {
                return Err(FilterError::EmptyGroup { operator: "OR" });
            }
            for child in children {
                if evaluate(child, record)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }
}

fn lookup<'r, R: Record>(record: &'r R, field: &Field) -> FilterResult<AttributeValue<'r>> {
    record
        .attribute(field.name())
        .ok_or_else(|| FilterError::UnknownAttribute {
            attribute: field.name().to_string(),
        })
}

fn is_null(value: AttributeValue<'_>) -> bool {
    match value {
        AttributeValue::Null => true,
        AttributeValue::TextList(items) => items.is_empty(),
        AttributeValue::UuidList(ids) => ids.is_empty(),
        _ => false,
    }
}

fn equals(value: AttributeValue<'_>, literal: &Literal) -> bool {
    match (value, literal) {
        (AttributeValue::Null, _) => false,
        (AttributeValue::Text(s), Literal::Text(t)) => s == t,
        (AttributeValue::Text(s), Literal::Uuid(id)) => parse_uuid(s) == Some(*id),
        (AttributeValue::Uuid(id), Literal::Uuid(other)) => id == *other,
        (AttributeValue::Uuid(id), Literal::Text(t)) => parse_uuid(t) == Some(id),
        (AttributeValue::Number(n), Literal::Number(m)) => n == *m,
        (AttributeValue::Bool(b), Literal::Bool(c)) => b == *c,
        (AttributeValue::TextList(items), Literal::Text(t)) => items.iter().any(|s| s == t),
        (AttributeValue::TextList(items), Literal::TextList(wanted)) => same_set(items, wanted),
        (AttributeValue::UuidList(ids), Literal::Uuid(id)) => ids.contains(id),
        (AttributeValue::UuidList(ids), Literal::Text(t)) => {
            parse_uuid(t).is_some_and(|id| ids.contains(&id))
        }
        _ => false,
    }
}

fn parse_uuid(s: &str) -> Option<Uuid> {
    Uuid::parse_str(s).ok()
}

fn same_set(a: &[String], b: &[String]) -> bool {
    let mut a: Vec<&str> = a.iter().map(String::as_str).collect();
    let mut b: Vec<&str> = b.iter().map(String::as_str).collect();
    a.sort_unstable();
    a.dedup();
    b.sort_unstable();
    b.dedup();
    a == b
}
