//! Conjunction of user filters with server-side scoping constraints.
//!
//! Listing endpoints never run a user filter as-is: it is combined with the
//! constraints the endpoint itself imposes (the space being listed, the
//! exclusion of closed items, the allowed types). Composition never mutates
//! the user's expression, and a constraint that cannot be satisfied at all
//! turns the whole query into [`Composition::EmptyResult`].

use uuid::Uuid;

use super::ast::{Expression, Field, Literal};

/// Attribute holding the owning space.
pub const SPACE_ATTRIBUTE: &str = "space";
/// Attribute holding the workflow state.
pub const STATE_ATTRIBUTE: &str = "system.state";
/// Attribute holding the iteration id.
pub const ITERATION_ATTRIBUTE: &str = "system.iteration";
/// Attribute holding the work item type name.
pub const TYPE_ATTRIBUTE: &str = "Type";
/// State value of closed work items.
pub const STATE_CLOSED: &str = "closed";

/// Outcome of composing a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Composition {
    /// No constraints at all; every row qualifies.
    Unfiltered,
    /// Rows must match the expression.
    Filter(Expression),
    /// The query is well formed but can match nothing. Callers return zero
    /// rows with a count of zero instead of running it.
    EmptyResult,
}

impl Composition {
    /// Returns the expression to run, if rows have to be filtered.
    pub fn expression(&self) -> Option<&Expression> {
        match self {
            Composition::Filter(expr) => Some(expr),
            Composition::Unfiltered | Composition::EmptyResult => None,
        }
    }

    /// Returns true for the empty-result sentinel.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, Composition::EmptyResult)
    }
}

/// Conjoins `base` (if any) with `extra`, without touching `base`.
///
/// Nested `And` nodes are flattened so that composing in several steps
/// produces a single `And` level. Returns `None` when there is nothing to
/// conjoin.
///
/// # Example
///
/// ```
/// use wit_query::filter::{compose, not_closed, Expression, FilterParser};
///
/// let user = FilterParser::parse(r#"{"state": "open"}"#).unwrap();
/// let composed = compose(user.as_ref(), [not_closed()]).unwrap();
/// assert!(matches!(composed, Expression::And(ref children) if children.len() == 2));
/// ```
pub fn compose(
    base: Option<&Expression>,
    extra: impl IntoIterator<Item = Expression>,
) -> Option<Expression> {
    Expression::and_all(base.cloned().into_iter().chain(extra))
}

/// Builder that composes a query step by step.
///
/// Each step either adds a constraint or, when a required constraint has no
/// possible values, marks the query as matching nothing. Once marked, later
/// steps are ignored and [`Composer::finish`] yields
/// [`Composition::EmptyResult`].
#[derive(Debug, Clone, Default)]
pub struct Composer {
    parts: Vec<Expression>,
    empty_reason: Option<String>,
}

impl Composer {
    /// Starts a composition from the user's filter.
    pub fn new(base: Option<&Expression>) -> Self {
        Self {
            parts: base.cloned().into_iter().collect(),
            empty_reason: None,
        }
    }

    /// Adds a constraint.
    pub fn and(mut self, constraint: Expression) -> Self {
        if self.empty_reason.is_none() {
            self.parts.push(constraint);
        }
        self
    }

    /// Adds `field IN values`. An empty value set makes the query match
    /// nothing; `what` describes the constraint for the log.
    pub fn and_any_of(
        self,
        field: &Field,
        values: impl IntoIterator<Item = Literal>,
        what: &str,
    ) -> Self {
        match Expression::any_of(field, values) {
            Some(constraint) => self.and(constraint),
            None => self.nothing(format!("no candidate values for {what}")),
        }
    }

    /// Marks the query as matching nothing.
    pub fn nothing(mut self, reason: impl Into<String>) -> Self {
        if self.empty_reason.is_none() {
            self.empty_reason = Some(reason.into());
        }
        self
    }

    /// Finishes the composition.
    pub fn finish(self) -> Composition {
        if let Some(reason) = self.empty_reason {
            tracing::debug!(%reason, "query composed to an empty result");
            return Composition::EmptyResult;
        }
        match Expression::and_all(self.parts) {
            Some(expr) => Composition::Filter(expr),
            None => Composition::Unfiltered,
        }
    }
}

/// Restricts rows to one space.
pub fn in_space(space: Uuid) -> Expression {
    Expression::equals(Field::new(SPACE_ATTRIBUTE), Literal::Uuid(space))
}

/// Excludes closed work items.
pub fn not_closed() -> Expression {
    Expression::negate(Expression::equals(
        Field::new(STATE_ATTRIBUTE),
        Literal::Text(STATE_CLOSED.to_string()),
    ))
}

/// Restricts rows to the given work item types. `None` if `types` is empty.
pub fn of_types<I, S>(types: I) -> Option<Expression>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Expression::any_of(
        &Field::new(TYPE_ATTRIBUTE),
        types.into_iter().map(|t| Literal::Text(t.into())),
    )
}

/// Composes the backlog query of a space.
///
/// The backlog holds open items of planner item types that sit in one of
/// the backlog iterations. With no backlog iteration or no planner item type
/// the backlog is empty by construction.
pub fn backlog<S: AsRef<str>>(
    base: Option<&Expression>,
    space: Uuid,
    backlog_iterations: &[S],
    planner_types: &[S],
) -> Composition {
    Composer::new(base)
        .and(in_space(space))
        .and(not_closed())
        .and_any_of(
            &Field::new(ITERATION_ATTRIBUTE),
            text_literals(backlog_iterations),
            "backlog iterations",
        )
        .and_any_of(
            &Field::new(TYPE_ATTRIBUTE),
            text_literals(planner_types),
            "planner item types",
        )
        .finish()
}

fn text_literals<S: AsRef<str>>(values: &[S]) -> impl Iterator<Item = Literal> + '_ {
    values.iter().map(|v| Literal::Text(v.as_ref().to_string()))
}
