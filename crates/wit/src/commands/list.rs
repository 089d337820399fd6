//! List command implementation.
//!
//! Lists work items from the dataset, optionally filtered, restricted to a
//! space or limited to a space's backlog, one page at a time.

use uuid::Uuid;
use wit_query::filter::{compose, in_space, Composition, Expression};
use wit_query::listing::{ListRequest, Lister, Page};
use wit_query::{Dataset, WorkItem};

use super::config::Config;
use super::{parse_uuid_arg, CommandContext, Result};
use crate::output::{format_page_json, format_page_table};

/// Options for the list command.
#[derive(Debug, Default)]
pub struct ListOptions {
    /// Filter JSON.
    pub filter: Option<String>,
    /// Raw `page[offset]` value.
    pub offset: Option<String>,
    /// Raw `page[limit]` value.
    pub limit: Option<i64>,
    /// Space to restrict the listing to.
    pub space: Option<String>,
    /// List the space's backlog.
    pub backlog: bool,
}

impl ListOptions {
    /// Builds the listing request. The link path mirrors the listing's scope.
    fn request(&self, space: Option<Uuid>) -> ListRequest {
        let path = match (space, self.backlog) {
            (Some(space), true) => format!("/spaces/{space}/backlog"),
            (Some(space), false) => format!("/spaces/{space}/workitems"),
            (None, _) => "/workitems".to_string(),
        };
        let additional_query = self
            .filter
            .iter()
            .map(|f| format!("filter={f}"))
            .collect();
        ListRequest {
            path,
            filter: self.filter.clone(),
            page_offset: self.offset.clone(),
            page_limit: self.limit,
            additional_query,
        }
    }
}

/// Runs the listing against `dataset`.
///
/// # Errors
///
/// Returns an error if `--space` is not a UUID or the filter is invalid.
pub fn run(dataset: &Dataset, opts: &ListOptions, config: &Config) -> Result<Page<WorkItem>> {
    let space = opts
        .space
        .as_deref()
        .map(|s| parse_uuid_arg("--space", s))
        .transpose()?;
    let request = opts.request(space);
    let lister = Lister::new(dataset).with_page_sizes(config.page_sizes());

    let page = lister.list(&request, |filter| scope(dataset, filter, space, opts.backlog))?;
    Ok(page)
}

/// Composes the user filter with the listing's scope.
fn scope(
    dataset: &Dataset,
    filter: Option<&Expression>,
    space: Option<Uuid>,
    backlog: bool,
) -> Composition {
    match space {
        Some(space) if backlog => dataset.backlog_scope(filter, space),
        Some(space) => match compose(filter, [in_space(space)]) {
            Some(expr) => Composition::Filter(expr),
            None => Composition::Unfiltered,
        },
        None => match filter {
            Some(expr) => Composition::Filter(expr.clone()),
            None => Composition::Unfiltered,
        },
    }
}

/// Executes the list command.
///
/// # Errors
///
/// Returns an error if the dataset cannot be loaded, `--space` is not a
/// UUID or the filter is invalid.
pub async fn execute(ctx: &CommandContext, opts: &ListOptions, config: &Config) -> Result<()> {
    let dataset = ctx.load_dataset(config).await?;
    let page = run(&dataset, opts, config)?;

    if ctx.json_output {
        println!("{}", format_page_json(&page)?);
    } else if !ctx.quiet {
        print!("{}", format_page_table(&page, ctx.use_colors));
    }

    Ok(())
}
