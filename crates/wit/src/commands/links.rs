//! Links command implementation.
//!
//! Computes the paging links of a page from raw `page[offset]` and
//! `page[limit]` values, the page's row count and the total count.

use wit_query::pagination::{PageLinks, PageRequest, PageSizes};

use super::{CommandContext, CommandError, Result};
use crate::output::{format_links_json, format_links_table};

/// Options for the links command.
#[derive(Debug)]
pub struct LinksOptions {
    /// Request path the links are built on.
    pub path: String,
    /// Raw `page[offset]` value.
    pub offset: Option<String>,
    /// Raw `page[limit]` value.
    pub limit: Option<i64>,
    /// Total number of matching rows.
    pub count: usize,
    /// Number of rows on the current page.
    pub result_len: usize,
    /// Query fragments appended to every link.
    pub query: Vec<String>,
}

/// Computes the links described by `opts`.
///
/// # Errors
///
/// Returns `CommandError::InvalidArgument` if the page holds more rows than
/// the request's limit allows.
pub fn compute(opts: &LinksOptions, sizes: PageSizes) -> Result<PageLinks> {
    let page = PageRequest::from_params_with(opts.offset.as_deref(), opts.limit, sizes);
    if opts.result_len > page.limit() {
        return Err(CommandError::InvalidArgument(format!(
            "--result-len {} exceeds the page limit {}",
            opts.result_len,
            page.limit()
        )));
    }
    tracing::debug!(
        offset = page.offset(),
        limit = page.limit(),
        count = opts.count,
        result_len = opts.result_len,
        "computing page links"
    );
    Ok(PageLinks::build(
        &opts.path,
        page,
        opts.result_len,
        opts.count,
        &opts.query,
    ))
}

/// Executes the links command.
pub fn execute(ctx: &CommandContext, opts: &LinksOptions, sizes: PageSizes) -> Result<()> {
    let links = compute(opts, sizes)?;

    if ctx.json_output {
        println!("{}", format_links_json(&links)?);
    } else if !ctx.quiet {
        print!("{}", format_links_table(&links, ctx.use_colors));
    }

    Ok(())
}
