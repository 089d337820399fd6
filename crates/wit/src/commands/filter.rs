//! Filter command implementation.
//!
//! Parses a JSON filter and prints the resulting expression tree, so a
//! filter can be checked before it is used in a listing.

use wit_query::filter::{Expression, FilterParser};

use super::{CommandContext, Result};
use crate::output::{format_expression_json, format_expression_tree};

/// Parses `input`, returning `None` for an empty filter.
pub fn parse(input: &str) -> Result<Option<Expression>> {
    let expression = FilterParser::parse(input)?;
    match &expression {
        Some(expr) => tracing::debug!(%expr, "parsed filter"),
        None => tracing::debug!("empty filter"),
    }
    Ok(expression)
}

/// Executes the filter command.
///
/// # Errors
///
/// Returns `CommandError::Filter` if the filter does not parse.
pub fn execute(ctx: &CommandContext, input: &str) -> Result<()> {
    let expression = parse(input)?;

    if ctx.json_output {
        println!("{}", format_expression_json(expression.as_ref())?);
    } else if !ctx.quiet {
        print!(
            "{}",
            format_expression_tree(expression.as_ref(), ctx.use_colors)
        );
    }

    Ok(())
}
