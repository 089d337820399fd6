//! Filter expression output formatting.

use owo_colors::OwoColorize;
use serde::Serialize;
use wit_query::filter::Expression;

/// JSON output structure for the filter command.
#[derive(Serialize)]
pub struct ExpressionOutput<'a> {
    /// The parsed tree, or `null` for an empty filter.
    pub expression: Option<&'a Expression>,
    /// Infix rendering of the tree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Fields the filter references, in tree order.
    pub fields: Vec<&'a str>,
}

/// Formats a parsed filter as JSON.
pub fn format_expression_json(expression: Option<&Expression>) -> Result<String, serde_json::Error> {
    let output = ExpressionOutput {
        expression,
        text: expression.map(ToString::to_string),
        fields: expression
            .map(|e| e.fields().into_iter().map(|f| f.name()).collect())
            .unwrap_or_default(),
    };
    serde_json::to_string_pretty(&output)
}

/// Formats a parsed filter as an indented tree.
pub fn format_expression_tree(expression: Option<&Expression>, use_colors: bool) -> String {
    let Some(expression) = expression else {
        return "(no filter: every row matches)\n".to_string();
    };
    let mut output = String::new();
    write_node(expression, 0, use_colors, &mut output);
    output
}

fn write_node(expression: &Expression, depth: usize, use_colors: bool, out: &mut String) {
    let indent = "  ".repeat(depth);
    let keyword = |word: &str| {
        if use_colors {
            word.bold().to_string()
        } else {
            word.to_string()
        }
    };

    match expression {
        Expression::And(children) | Expression::Or(children) => {
            let word = if matches!(expression, Expression::And(_)) {
                "AND"
            } else {
                "OR"
            };
            out.push_str(&format!("{indent}{}\n", keyword(word)));
            for child in children {
                write_node(child, depth + 1, use_colors, out);
            }
        }
        Expression::Not(inner) => {
            out.push_str(&format!("{indent}{}\n", keyword("NOT")));
            write_node(inner, depth + 1, use_colors, out);
        }
        leaf => out.push_str(&format!("{indent}{leaf}\n")),
    }
}
