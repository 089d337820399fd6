//! Recursive descent parser for JSON filter expressions.

use serde_json::{Map, Value};

use super::ast::Expression;
use super::error::{FilterError, FilterResult};
use super::fields::FieldTable;

const AND_KEY: &str = "$AND";
const OR_KEY: &str = "$OR";
const IN_KEY: &str = "$IN";
const NEGATE_KEY: &str = "negate";

/// Parser for JSON-encoded filter expressions.
///
/// The input is decoded into a JSON value tree first, then walked
/// recursively. Each object is one node of the grammar:
///
/// ```text
/// filter  ::= "{" member ("," member)* "}"
/// member  ::= "$AND" ":" "[" filter ("," filter)* "]"
///           | "$OR"  ":" "[" filter ("," filter)* "]"
///           | "negate" ":" bool
///           | field ":" value
/// value   ::= literal | null | "[" literal ("," literal)* "]"
///           | "{" "$IN" ":" "[" literal ("," literal)* "]" "}"
/// ```
///
/// Several predicate members in one object are conjoined in input order,
/// and `"negate": true` wraps the whole object in `Not`.
///
/// # Example
///
/// ```
/// use wit_query::filter::{Expression, FilterParser};
///
/// let expr = FilterParser::parse(r#"{"state": "open", "negate": true}"#)
///     .unwrap()
///     .unwrap();
/// assert!(matches!(expr, Expression::Not(_)));
///
/// // Empty input means "no filter".
/// assert_eq!(FilterParser::parse("").unwrap(), None);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FilterParser<'a> {
    fields: &'a FieldTable,
}

impl FilterParser<'static> {
    /// Parses a work item filter.
    ///
    /// Returns `Ok(None)` when the input is empty or blank.
    ///
    /// # Errors
    ///
    /// Returns a [`FilterError`] describing the first problem found. No
    /// partially built expression is ever returned.
    pub fn parse(input: &str) -> FilterResult<Option<Expression>> {
        FilterParser::new(FieldTable::work_items()).parse_filter(input)
    }
}

impl<'a> FilterParser<'a> {
    /// Creates a parser that resolves fields against `fields`.
    pub fn new(fields: &'a FieldTable) -> Self {
        Self { fields }
    }

    /// Parses a filter string against this parser's field table.
    pub fn parse_filter(&self, input: &str) -> FilterResult<Option<Expression>> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let value: Value =
            serde_json::from_str(trimmed).map_err(|e| FilterError::malformed_json(&e))?;
        self.parse_value(&value).map(Some)
    }

    /// Parses an already decoded JSON filter.
    pub fn parse_value(&self, value: &Value) -> FilterResult<Expression> {
        match value {
            Value::Object(map) => self.parse_object(map, "filter"),
            other => Err(FilterError::NotAnObject {
                found: json_type(other),
            }),
        }
    }

    /// Parses one filter object. `location` names where it appeared.
    fn parse_object(&self, map: &Map<String, Value>, location: &str) -> FilterResult<Expression> {
        if map.is_empty() {
            return Err(FilterError::EmptyObject {
                location: location.to_string(),
            });
        }

        let mut negate = false;
        let mut parts = Vec::with_capacity(map.len());
        for (key, value) in map {
            match key.as_str() {
                AND_KEY => parts.push(Expression::And(self.parse_group(AND_KEY, value)?)),
                OR_KEY => parts.push(Expression::Or(self.parse_group(OR_KEY, value)?)),
                NEGATE_KEY => {
                    negate = value.as_bool().ok_or_else(|| FilterError::InvalidNegate {
                        value: value.to_string(),
                    })?;
                }
                op if op.starts_with('$') => return Err(FilterError::unknown_operator(op)),
                field => parts.push(self.parse_field(field, value)?),
            }
        }

        let expr = match parts.len() {
            0 => {
                return Err(FilterError::NoPredicates {
                    location: location.to_string(),
                })
            }
            1 => parts.remove(0),
            _ => Expression::And(parts),
        };

        Ok(if negate { Expression::negate(expr) } else { expr })
    }

    /// Parses the operand array of `$AND` / `$OR`, preserving order.
    fn parse_group(&self, operator: &str, value: &Value) -> FilterResult<Vec<Expression>> {
        let Value::Array(items) = value else {
            return Err(FilterError::invalid_operand(
                operator,
                format!("expected an array, found {}", json_type(value)),
            ));
        };
        if items.is_empty() {
            return Err(FilterError::invalid_operand(operator, "array is empty"));
        }

        items
            .iter()
            .map(|item| match item {
                Value::Object(map) => self.parse_object(map, operator),
                other => Err(FilterError::invalid_operand(
                    operator,
                    format!("expected filter objects, found {}", json_type(other)),
                )),
            })
            .collect()
    }

    /// Parses `field: value`.
    fn parse_field(&self, key: &str, value: &Value) -> FilterResult<Expression> {
        let def = self.fields.resolve(key)?;
        match value {
            Value::Null => Ok(Expression::is_null(def.field())),
            Value::Object(operand) => {
                if operand.is_empty() {
                    return Err(FilterError::EmptyObject {
                        location: key.to_string(),
                    });
                }
                let mut result = None;
                for (op, values) in operand {
                    if op != IN_KEY {
                        return Err(FilterError::unknown_operator(op.as_str()));
                    }
                    let Value::Array(items) = values else {
                        return Err(FilterError::invalid_operand(
                            IN_KEY,
                            format!("expected an array for '{key}', found {}", json_type(values)),
                        ));
                    };
                    let literals = items
                        .iter()
                        .map(|item| def.literal(key, item))
                        .collect::<FilterResult<Vec<_>>>()?;
                    result = Expression::any_of(&def.field(), literals);
                }
                result.ok_or_else(|| {
                    FilterError::invalid_operand(IN_KEY, format!("no values given for '{key}'"))
                })
            }
            literal => Ok(Expression::equals(def.field(), def.literal(key, literal)?)),
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
