//! Search command implementation.
//!
//! Searches work items by title text, `number:N` or a pasted work item link
//! of a known host.

use wit_query::listing::{ListRequest, Lister, Page};
use wit_query::{Dataset, WorkItem};

use super::config::Config;
use super::{CommandContext, Result};
use crate::output::{format_page_json, format_page_table};

/// Options for the search command.
#[derive(Debug, Default)]
pub struct SearchOptions {
    /// Search text.
    pub text: String,
    /// Host whose work item links should be recognized.
    pub host: Option<String>,
    /// Filter JSON.
    pub filter: Option<String>,
    /// Raw `page[offset]` value.
    pub offset: Option<String>,
    /// Raw `page[limit]` value.
    pub limit: Option<i64>,
}

/// Runs the search against `dataset`.
///
/// Hosts from the config's `known_hosts` are recognized in addition to
/// `--host`.
pub fn run(dataset: &Dataset, opts: &SearchOptions, config: &Config) -> Result<Page<WorkItem>> {
    let registry = config.host_registry()?;
    let request = ListRequest {
        filter: opts.filter.clone(),
        page_offset: opts.offset.clone(),
        page_limit: opts.limit,
        additional_query: vec![format!("q={}", opts.text.trim())],
        ..ListRequest::new("/search")
    };

    let page = Lister::new(dataset)
        .with_page_sizes(config.page_sizes())
        .search(&request, &opts.text, opts.host.as_deref(), &registry)?;
    Ok(page)
}

/// Executes the search command.
pub async fn execute(ctx: &CommandContext, opts: &SearchOptions, config: &Config) -> Result<()> {
    let dataset = ctx.load_dataset(config).await?;
    let page = run(&dataset, opts, config)?;

    if ctx.json_output {
        println!("{}", format_page_json(&page)?);
    } else if !ctx.quiet {
        print!("{}", format_page_table(&page, ctx.use_colors));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CommandError;
    use uuid::Uuid;
    use wit_query::listing::ListingError;

    fn dataset() -> Dataset {
        let space = Uuid::new_v4();
        Dataset {
            work_items: vec![
                WorkItem::new(space, 1, "story", "Login page", "open"),
                WorkItem::new(space, 2, "bug", "Login crash", "open"),
                WorkItem::new(space, 3, "story", "Profile", "new"),
            ],
            ..Dataset::default()
        }
    }

    fn numbers(page: &Page<WorkItem>) -> Vec<i64> {
        page.data.iter().map(|item| item.number).collect()
    }

    #[test]
    fn test_search_text() {
        let opts = SearchOptions {
            text: "login".to_string(),
            ..SearchOptions::default()
        };
        let page = run(&dataset(), &opts, &Config::default()).unwrap();
        assert_eq!(numbers(&page), vec![1, 2]);
        assert_eq!(page.links.first, "/search?page[offset]=0&page[limit]=20&q=login");
    }

    #[test]
    fn test_search_link_from_configured_host() {
        let config = Config {
            known_hosts: vec!["tracker.example.io".to_string()],
            ..Config::default()
        };
        let opts = SearchOptions {
            text: "https://tracker.example.io/platform/plan/detail/3".to_string(),
            ..SearchOptions::default()
        };
        let page = run(&dataset(), &opts, &config).unwrap();
        assert_eq!(numbers(&page), vec![3]);
    }

    #[test]
    fn test_search_link_from_host_flag() {
        let opts = SearchOptions {
            text: "tracker.example.io/platform/plan/detail/2".to_string(),
            host: Some("tracker.example.io".to_string()),
            ..SearchOptions::default()
        };
        let page = run(&dataset(), &opts, &Config::default()).unwrap();
        assert_eq!(numbers(&page), vec![2]);
    }

    #[test]
    fn test_search_empty_text() {
        let opts = SearchOptions {
            text: " ".to_string(),
            ..SearchOptions::default()
        };
        let err = run(&dataset(), &opts, &Config::default()).unwrap_err();
        assert!(matches!(
            err,
            CommandError::Listing(ListingError::EmptyQuery)
        ));
    }
}
