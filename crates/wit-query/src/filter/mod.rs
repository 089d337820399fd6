//! Filter expressions for work item listings.
//!
//! Listing endpoints accept a JSON-encoded filter in their query string.
//! This module turns that text into an [`Expression`] tree, conjoins it with
//! the endpoint's own scoping constraints and, for in-memory stores,
//! evaluates it against records.
//!
//! # Filter Syntax
//!
//! - `{"state": "open"}` - the field equals the value
//! - `{"iteration": null}` - the field has no value
//! - `{"assignee": {"$IN": ["<uuid>", "<uuid>"]}}` - the field equals any value
//! - `{"$AND": [{...}, {...}]}` - all sub-filters hold
//! - `{"$OR": [{...}, {...}]}` - at least one sub-filter holds
//! - `{"state": "open", "negate": true}` - the object's predicate does not hold
//!
//! Several field keys in one object are conjoined. Field keys are resolved
//! against a [`FieldTable`], which also fixes the type each value must have.
//!
//! # Example
//!
//! ```
//! use wit_query::filter::{compose, in_space, FilterEvaluator, FilterParser};
//!
//! let user = FilterParser::parse(r#"{"$OR": [{"state": "open"}, {"state": "new"}]}"#)
//!     .unwrap();
//! let space = uuid::Uuid::new_v4();
//! let query = compose(user.as_ref(), [in_space(space)]).unwrap();
//!
//! let items: Vec<wit_query::WorkItem> = vec![];
//! let matched = FilterEvaluator::new(&query).filter_records(&items).unwrap();
//! assert!(matched.is_empty());
//! ```

mod ast;
mod compose;
mod error;
mod evaluator;
mod fields;
mod parser;

pub use ast::{Expression, Field, Literal};
pub use compose::{
    backlog, compose, in_space, not_closed, of_types, Composer, Composition, ITERATION_ATTRIBUTE,
    SPACE_ATTRIBUTE, STATE_ATTRIBUTE, STATE_CLOSED, TYPE_ATTRIBUTE,
};
pub use error::{FilterError, FilterResult};
pub use evaluator::{AttributeValue, FilterEvaluator, Record};
pub use fields::{FieldDef, FieldTable, ValueKind};
pub use parser::FilterParser;
