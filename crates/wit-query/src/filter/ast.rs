//! Abstract Syntax Tree (AST) for filter expressions.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::error::{FilterError, FilterResult};

/// A reference to a named, flat attribute of the record being filtered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Field(String);

impl Field {
    /// Creates a field reference for the given attribute name.
    pub fn new(name: impl Into<String>) -> Self {
        Field(name.into())
    }

    /// Returns the attribute name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A typed literal value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    /// Free text.
    Text(String),
    /// A UUID, validated at parse time.
    Uuid(Uuid),
    /// An integer.
    Number(i64),
    /// A boolean.
    Bool(bool),
    /// An unordered set of strings.
    TextList(Vec<String>),
}

impl Literal {
    /// Converts the literal into its JSON filter representation.
    pub fn to_json(&self) -> Value {
        match self {
            Literal::Text(s) => Value::String(s.clone()),
            Literal::Uuid(id) => Value::String(id.to_string()),
            Literal::Number(n) => Value::from(*n),
            Literal::Bool(b) => Value::Bool(*b),
            Literal::TextList(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Text(s) => write!(f, "{s:?}"),
            Literal::Uuid(id) => write!(f, "{id}"),
            Literal::Number(n) => write!(f, "{n}"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::TextList(items) => write!(f, "{items:?}"),
        }
    }
}

/// A parsed filter expression.
///
/// Expressions are immutable once built. Combinators that grow a tree
/// ([`Expression::and_all`], [`Expression::or_all`]) always return a new
/// value and leave their inputs untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    /// A literal value. Only boolean literals can be evaluated on their own.
    Literal(Literal),

    /// A field reference. Only boolean fields can be evaluated on their own.
    Field(Field),

    /// The field equals the literal.
    Equals(Field, Literal),

    /// The field has no value.
    IsNull(Field),

    /// Logical negation.
    Not(Box<Expression>),

    /// All children hold. Must not be empty.
    And(Vec<Expression>),

    /// At least one child holds. Must not be empty.
    Or(Vec<Expression>),
}

impl Expression {
    /// Creates an equality comparison.
    ///
    /// # Example
    ///
    /// ```
    /// use wit_query::filter::{Expression, Field, Literal};
    ///
    /// let expr = Expression::equals(Field::new("system.state"), Literal::Text("open".into()));
    /// assert_eq!(expr.to_string(), r#"system.state = "open""#);
    /// ```
    pub fn equals(field: Field, literal: Literal) -> Self {
        Expression::Equals(field, literal)
    }

    /// Creates a null check.
    pub fn is_null(field: Field) -> Self {
        Expression::IsNull(field)
    }

    /// Wraps an expression in a logical NOT.
    pub fn negate(inner: Expression) -> Self {
        Expression::Not(Box::new(inner))
    }

    /// Conjoins the given expressions.
    ///
    /// Children that are themselves `And` nodes are spliced in, so repeated
    /// composition never nests `And` inside `And`. A single child is returned
    /// unchanged and no children yields `None`.
    pub fn and_all(children: impl IntoIterator<Item = Expression>) -> Option<Self> {
        let mut flat = Vec::new();
        for child in children {
            match child {
                Expression::And(grandchildren) => flat.extend(grandchildren),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => None,
            1 => flat.pop(),
            _ => Some(Expression::And(flat)),
        }
    }

    /// Disjoins the given expressions, flattening nested `Or` nodes.
    pub fn or_all(children: impl IntoIterator<Item = Expression>) -> Option<Self> {
        let mut flat = Vec::new();
        for child in children {
            match child {
                Expression::Or(grandchildren) => flat.extend(grandchildren),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => None,
            1 => flat.pop(),
            _ => Some(Expression::Or(flat)),
        }
    }

    /// Builds `field = v1 OR field = v2 OR ...` by folding left over the
    /// values in order.
    ///
    /// One value yields the bare comparison; no values yields `None`.
    ///
    /// # Example
    ///
    /// ```
    /// use wit_query::filter::{Expression, Field, Literal};
    ///
    /// let types = ["bug", "task"].map(|t| Literal::Text(t.to_string()));
    /// let expr = Expression::any_of(&Field::new("Type"), types).unwrap();
    /// assert_eq!(expr.to_string(), r#"(Type = "bug" OR Type = "task")"#);
    /// ```
    pub fn any_of(field: &Field, values: impl IntoIterator<Item = Literal>) -> Option<Self> {
        values.into_iter().fold(None, |acc, value| {
            let next = Expression::equals(field.clone(), value);
            Some(match acc {
                None => next,
                Some(Expression::Or(mut children)) => {
                    children.push(next);
                    Expression::Or(children)
                }
                Some(prev) => Expression::Or(vec![prev, next]),
            })
        })
    }

    /// Returns every field referenced by the expression, in tree order.
    pub fn fields(&self) -> Vec<&Field> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a Field>) {
        match self {
            Expression::Literal(_) => {}
            Expression::Field(field)
            | Expression::Equals(field, _)
            | Expression::IsNull(field) => out.push(field),
            Expression::Not(inner) => inner.collect_fields(out),
            Expression::And(children) | Expression::Or(children) => {
                for child in children {
                    child.collect_fields(out);
                }
            }
        }
    }

    /// Renders the expression back into the JSON filter syntax.
    ///
    /// The result parses to an expression that evaluates identically. Bare
    /// literals, bare fields and empty groups have no filter representation.
    pub fn to_filter_json(&self) -> FilterResult<Value> {
        match self {
            Expression::Equals(field, literal) => {
                Ok(single_key(field.name(), literal.to_json()))
            }
            Expression::IsNull(field) => Ok(single_key(field.name(), Value::Null)),
            Expression::Not(inner) => {
                let rendered = inner.to_filter_json()?;
                match rendered {
                    Value::Object(mut map) if !map.contains_key("negate") => {
                        map.insert("negate".to_string(), Value::Bool(true));
                        Ok(Value::Object(map))
                    }
                    other => {
                        let mut map = Map::new();
                        map.insert("$AND".to_string(), Value::Array(vec![other]));
                        map.insert("negate".to_string(), Value::Bool(true));
                        Ok(Value::Object(map))
                    }
                }
            }
            Expression::And(children) => render_group("$AND", "AND", children),
            Expression::Or(children) => render_group("$OR", "OR", children),
            Expression::Literal(_) | Expression::Field(_) => Err(FilterError::Unrenderable {
                expression: self.to_string(),
            }),
        }
    }
}

fn single_key(key: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    Value::Object(map)
}

fn render_group(key: &str, operator: &'static str, children: &[Expression]) -> FilterResult<Value> {
    if children.is_empty() {
        return Err(FilterError::EmptyGroup { operator });
    }
    let rendered = children
        .iter()
        .map(Expression::to_filter_json)
        .collect::<FilterResult<Vec<_>>>()?;
    Ok(single_key(key, Value::Array(rendered)))
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(literal) => write!(f, "{literal}"),
            Expression::Field(field) => write!(f, "{field}"),
            Expression::Equals(field, literal) => write!(f, "{field} = {literal}"),
            Expression::IsNull(field) => write!(f, "{field} IS NULL"),
            Expression::Not(inner) => write!(f, "NOT {inner}"),
            Expression::And(children) => write_group(f, " AND ", children),
            Expression::Or(children) => write_group(f, " OR ", children),
        }
    }
}

fn write_group(f: &mut fmt::Formatter<'_>, sep: &str, children: &[Expression]) -> fmt::Result {
    f.write_str("(")?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{child}")?;
    }
    f.write_str(")")
}
