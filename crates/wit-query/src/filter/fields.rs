//! Static per-field type table.
//!
//! Filter keys are resolved against a [`FieldTable`] at parse time, so a
//! filter that names an unknown field or carries a value of the wrong type
//! is rejected before it ever reaches a store.

use std::fmt;
use std::sync::OnceLock;

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::ast::{Field, Literal};
use super::error::{FilterError, FilterResult};

/// Minimum similarity for an unknown key to be offered as a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// The kind of value a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Free text.
    Text,
    /// A UUID.
    Uuid,
    /// An integer.
    Number,
    /// A boolean.
    Bool,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Text => "a string",
            ValueKind::Uuid => "a UUID",
            ValueKind::Number => "an integer",
            ValueKind::Bool => "a boolean",
        };
        f.write_str(name)
    }
}

/// Describes one filterable field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// The keys accepted in filter JSON for this field.
    pub keys: &'static [&'static str],
    /// The record attribute the field resolves to. Also accepted as a key.
    pub attribute: &'static str,
    /// The kind of value the field holds.
    pub kind: ValueKind,
    /// Whether the attribute holds a list of values.
    pub multi: bool,
}

impl FieldDef {
    /// Returns the field reference used in expressions.
    pub fn field(&self) -> Field {
        Field::new(self.attribute)
    }

    fn accepts_key(&self, key: &str) -> bool {
        self.attribute == key || self.keys.contains(&key)
    }

    /// Coerces a JSON value into a literal of this field's kind.
    ///
    /// `key` is the key the value was given under and is used in errors.
    pub fn literal(&self, key: &str, value: &Value) -> FilterResult<Literal> {
        let invalid = || FilterError::invalid_literal(key, value, self.kind);
        match (self.kind, value) {
            (ValueKind::Text, Value::String(s)) => Ok(Literal::Text(s.clone())),
            (ValueKind::Text, Value::Array(items)) if self.multi => items
                .iter()
                .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
                .collect::<FilterResult<Vec<_>>>()
                .map(Literal::TextList),
            (ValueKind::Uuid, Value::String(s)) => {
                Uuid::parse_str(s).map(Literal::Uuid).map_err(|_| invalid())
            }
            (ValueKind::Number, Value::Number(n)) => {
                n.as_i64().map(Literal::Number).ok_or_else(invalid)
            }
            (ValueKind::Number, Value::String(s)) => {
                s.trim().parse().map(Literal::Number).map_err(|_| invalid())
            }
            (ValueKind::Bool, Value::Bool(b)) => Ok(Literal::Bool(*b)),
            (ValueKind::Bool, Value::String(s)) => match s.as_str() {
                "true" => Ok(Literal::Bool(true)),
                "false" => Ok(Literal::Bool(false)),
                _ => Err(invalid()),
            },
            _ => Err(invalid()),
        }
    }
}

const WORK_ITEM_FIELDS: &[FieldDef] = &[
    FieldDef {
        keys: &["id"],
        attribute: "id",
        kind: ValueKind::Uuid,
        multi: false,
    },
    FieldDef {
        keys: &["space"],
        attribute: "space",
        kind: ValueKind::Uuid,
        multi: false,
    },
    FieldDef {
        keys: &["number"],
        attribute: "system.number",
        kind: ValueKind::Number,
        multi: false,
    },
    FieldDef {
        keys: &["title"],
        attribute: "system.title",
        kind: ValueKind::Text,
        multi: false,
    },
    FieldDef {
        keys: &["state"],
        attribute: "system.state",
        kind: ValueKind::Text,
        multi: false,
    },
    FieldDef {
        keys: &["iteration"],
        attribute: "system.iteration",
        kind: ValueKind::Text,
        multi: false,
    },
    FieldDef {
        keys: &["area"],
        attribute: "system.area",
        kind: ValueKind::Text,
        multi: false,
    },
    FieldDef {
        keys: &["type", "workitemtype"],
        attribute: "Type",
        kind: ValueKind::Text,
        multi: false,
    },
    FieldDef {
        keys: &["assignee"],
        attribute: "system.assignees",
        kind: ValueKind::Uuid,
        multi: true,
    },
    FieldDef {
        keys: &["creator"],
        attribute: "system.creator",
        kind: ValueKind::Uuid,
        multi: false,
    },
    FieldDef {
        keys: &["label"],
        attribute: "system.labels",
        kind: ValueKind::Text,
        multi: true,
    },
    FieldDef {
        keys: &["parent.exists"],
        attribute: "parent.exists",
        kind: ValueKind::Bool,
        multi: false,
    },
];

/// A set of filterable fields.
#[derive(Debug, Clone)]
pub struct FieldTable {
    fields: Vec<FieldDef>,
}

impl FieldTable {
    /// Creates a table from the given field descriptions.
    pub fn new(fields: Vec<FieldDef>) -> Self {
        Self { fields }
    }

    /// Returns the table of work item fields.
    pub fn work_items() -> &'static FieldTable {
        static TABLE: OnceLock<FieldTable> = OnceLock::new();
        TABLE.get_or_init(|| FieldTable::new(WORK_ITEM_FIELDS.to_vec()))
    }

    /// Returns all field descriptions.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Looks up the field for a filter key, if any.
    pub fn get(&self, key: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|def| def.accepts_key(key))
    }

    /// Looks up the field for a filter key.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::UnknownField`, with the closest known key as a
    /// suggestion when one is similar enough.
    pub fn resolve(&self, key: &str) -> FilterResult<&FieldDef> {
        self.get(key).ok_or_else(|| FilterError::UnknownField {
            field: key.to_string(),
            suggestion: self.suggest(key),
        })
    }

    /// Finds the known key most similar to `key`.
    fn suggest(&self, key: &str) -> Option<String> {
        let lowered = key.to_lowercase();
        self.fields
            .iter()
            .flat_map(|def| def.keys.iter().copied().chain(Some(def.attribute)))
            .map(|candidate| {
                (
                    candidate,
                    strsim::jaro_winkler(&lowered, &candidate.to_lowercase()),
                )
            })
            .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(candidate, _)| candidate.to_string())
    }
}
