//! Error types for filter parsing and evaluation.

use thiserror::Error;

use super::fields::ValueKind;

/// A specialized Result type for filter operations.
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors that can occur while parsing, rendering or evaluating a filter.
///
/// Every variant is a client error: the filter the caller supplied is not
/// acceptable and retrying it unchanged will fail the same way. Each variant
/// names the key, field or value that caused the failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    /// The filter text is not valid JSON.
    #[error("malformed filter JSON: {message}")]
    MalformedJson {
        /// The JSON parser's description of the problem.
        message: String,
    },

    /// The filter (or a group member) is valid JSON but not an object.
    #[error("filter must be a JSON object, found {found}")]
    NotAnObject {
        /// The JSON type that was found instead.
        found: &'static str,
    },

    /// An object without any keys was supplied.
    #[error("empty filter object at '{location}'")]
    EmptyObject {
        /// Where the empty object appeared (`filter` or the key holding it).
        location: String,
    },

    /// An object carried no predicate keys (for example only `negate`).
    #[error("filter object at '{location}' has no predicate keys")]
    NoPredicates {
        /// Where the shapeless object appeared.
        location: String,
    },

    /// A `$AND`/`$OR`/`$IN` operand had the wrong shape.
    #[error("invalid operand for {operator}: {reason}")]
    InvalidOperand {
        /// The operator whose operand was rejected.
        operator: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The `negate` key carried something other than a boolean.
    #[error("'negate' must be a boolean, found {value}")]
    InvalidNegate {
        /// The rejected value, rendered as JSON.
        value: String,
    },

    /// A `$`-prefixed key that is not a supported operator.
    #[error("unknown filter operator: {operator}")]
    UnknownOperator {
        /// The unsupported operator key.
        operator: String,
    },

    /// A key that does not name a filterable field.
    #[error("unknown filter field: {field}{}", suggestion_suffix(.suggestion))]
    UnknownField {
        /// The unrecognized field key.
        field: String,
        /// The closest known field key, if one is close enough.
        suggestion: Option<String>,
    },

    /// A value that cannot be interpreted as the field's type.
    #[error("invalid value {value} for field '{field}': expected {expected}")]
    InvalidLiteral {
        /// The field key the value was given for.
        field: String,
        /// The rejected value, rendered as JSON.
        value: String,
        /// The kind of value the field accepts.
        expected: ValueKind,
    },

    /// An `And`/`Or` node without children.
    #[error("{operator} requires at least one operand")]
    EmptyGroup {
        /// `AND` or `OR`.
        operator: &'static str,
    },

    /// The evaluated record does not know the referenced attribute.
    #[error("unknown attribute: {attribute}")]
    UnknownAttribute {
        /// The attribute name the expression referenced.
        attribute: String,
    },

    /// A bare literal or field used where a boolean is required.
    #[error("expression is not boolean: {expression}")]
    NotBoolean {
        /// The offending sub-expression.
        expression: String,
    },

    /// An expression that has no JSON filter representation.
    #[error("expression cannot be rendered as a filter: {expression}")]
    Unrenderable {
        /// The offending sub-expression.
        expression: String,
    },
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(" (did you mean '{name}'?)"),
        None => String::new(),
    }
}

impl FilterError {
    /// Creates a malformed JSON error.
    pub fn malformed_json(err: &serde_json::Error) -> Self {
        FilterError::MalformedJson {
            message: err.to_string(),
        }
    }

    /// Creates an invalid operand error.
    pub fn invalid_operand(operator: impl Into<String>, reason: impl Into<String>) -> Self {
        FilterError::InvalidOperand {
            operator: operator.into(),
            reason: reason.into(),
        }
    }

    /// Creates an unknown operator error.
    pub fn unknown_operator(operator: impl Into<String>) -> Self {
        FilterError::UnknownOperator {
            operator: operator.into(),
        }
    }

    /// Creates an invalid literal error.
    pub fn invalid_literal(
        field: impl Into<String>,
        value: &serde_json::Value,
        expected: ValueKind,
    ) -> Self {
        FilterError::InvalidLiteral {
            field: field.into(),
            value: value.to_string(),
            expected,
        }
    }

    /// Returns the field or key this error is about, when there is one.
    pub fn offending_key(&self) -> Option<&str> {
        match self {
            FilterError::EmptyObject { location } | FilterError::NoPredicates { location } => {
                Some(location)
            }
            FilterError::InvalidOperand { operator, .. }
            | FilterError::UnknownOperator { operator } => Some(operator),
            FilterError::UnknownField { field, .. } | FilterError::InvalidLiteral { field, .. } => {
                Some(field)
            }
            FilterError::InvalidNegate { .. } => Some("negate"),
            FilterError::UnknownAttribute { attribute } => Some(attribute),
            FilterError::MalformedJson { .. }
            | FilterError::NotAnObject { .. }
            | FilterError::EmptyGroup { .. }
            | FilterError::NotBoolean { .. }
            | FilterError::Unrenderable { .. } => None,
        }
    }
}
