//! Listing and search over a row source.
//!
//! A listing request runs through the same steps regardless of what is
//! listed: parse the user's filter, compose it with the endpoint's scoping
//! constraints, skip the fetch entirely if the composition can match
//! nothing, fetch one page of rows and build the navigation links.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::filter::{
    backlog, compose, Composition, Expression, Field, FilterError, FilterEvaluator, FilterParser,
    Literal,
};
use crate::model::WorkItem;
use crate::pagination::{PageLinks, PageRequest, PageSizes};
use crate::registry::{HostRegistry, RegistryError, NUMBER_CAPTURE};
use crate::Dataset;

/// Prefix that turns a search query into a number lookup (`number:42`).
const NUMBER_QUERY_PREFIX: &str = "number:";

/// Errors that can occur while listing or searching.
#[derive(Debug, Error)]
pub enum ListingError {
    /// The filter parameter could not be parsed or evaluated.
    #[error("bad filter syntax: {0}")]
    BadFilterSyntax(#[from] FilterError),

    /// The free-text search query is empty.
    #[error("search query must not be empty")]
    EmptyQuery,

    /// A known-URL pattern could not be registered.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// The row source failed.
    #[error("row source error: {0}")]
    Source(String),
}

/// Result type for listing operations.
pub type Result<T> = std::result::Result<T, ListingError>;

/// One fetched page: the rows plus the total number of matching rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched<T> {
    /// Rows of the requested page.
    pub rows: Vec<T>,
    /// Number of rows matching the query across all pages.
    pub total_count: usize,
}

/// Fetches rows matching an expression.
pub trait RowSource {
    /// The row type.
    type Row;

    /// Returns at most `limit` rows matching `filter`, starting at `offset`,
    /// together with the total number of matching rows. `None` means every
    /// row qualifies.
    fn fetch(
        &self,
        filter: Option<&Expression>,
        offset: usize,
        limit: usize,
    ) -> Result<Fetched<Self::Row>>;
}

/// Free-text search capability of a row source.
pub trait SearchSource: RowSource {
    /// Like [`RowSource::fetch`], restricted to rows matching `query`.
    fn search(
        &self,
        query: &SearchQuery,
        filter: Option<&Expression>,
        offset: usize,
        limit: usize,
    ) -> Result<Fetched<Self::Row>>;
}

/// A resolved free-text search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// Case-insensitive substring of the title.
    Text(String),
    /// Exact work item number, from `number:N` or a recognized deep link.
    Number(i64),
}

impl SearchQuery {
    /// Resolves raw search text.
    ///
    /// Text that matches a registered work item link, or has the form
    /// `number:N`, becomes a number lookup. Everything else is searched as
    /// text.
    ///
    /// # Errors
    ///
    /// Returns `ListingError::EmptyQuery` for empty or blank text.
    pub fn resolve(text: &str, registry: &HostRegistry) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ListingError::EmptyQuery);
        }

        if let Some(number) = registry
            .match_url(text)
            .and_then(|m| m.capture(NUMBER_CAPTURE).and_then(|n| n.parse().ok()))
        {
            return Ok(SearchQuery::Number(number));
        }

        if let Some(number) = text
            .strip_prefix(NUMBER_QUERY_PREFIX)
            .and_then(|n| n.trim().parse().ok())
        {
            return Ok(SearchQuery::Number(number));
        }

        Ok(SearchQuery::Text(text.to_string()))
    }

    /// Returns the query as a filter expression when it has one.
    pub fn to_expression(&self) -> Option<Expression> {
        match self {
            SearchQuery::Number(n) => Some(Expression::equals(
                Field::new("system.number"),
                Literal::Number(*n),
            )),
            SearchQuery::Text(_) => None,
        }
    }
}

/// Parameters of a listing request, as received from the caller.
#[derive(Debug, Clone, Default)]
pub struct ListRequest {
    /// Request path used as the base of the navigation links.
    pub path: String,
    /// The raw filter parameter.
    pub filter: Option<String>,
    /// The raw `page[offset]` parameter.
    pub page_offset: Option<String>,
    /// The raw `page[limit]` parameter.
    pub page_limit: Option<i64>,
    /// Query fragments to preserve in every navigation link.
    pub additional_query: Vec<String>,
}

impl ListRequest {
    /// Creates a request for `path` with no parameters.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Rows of the page.
    pub data: Vec<T>,
    /// Number of rows matching the query across all pages.
    pub total_count: usize,
    /// Navigation links.
    pub links: PageLinks,
    /// The normalized paging request the rows were fetched with.
    pub request: PageRequest,
}

/// Runs listing and search requests against a row source.
#[derive(Debug)]
pub struct Lister<'a, S> {
    source: &'a S,
    sizes: PageSizes,
}

impl<'a, S: RowSource> Lister<'a, S> {
    /// Creates a lister with the default page sizes.
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            sizes: PageSizes::default(),
        }
    }

    /// Uses the given page sizes when normalizing paging parameters.
    pub fn with_page_sizes(mut self, sizes: PageSizes) -> Self {
        self.sizes = sizes;
        self
    }

    fn page_request(&self, request: &ListRequest) -> PageRequest {
        PageRequest::from_params_with(
            request.page_offset.as_deref(),
            request.page_limit,
            self.sizes,
        )
    }

    /// Lists one page of rows.
    ///
    /// `scope` receives the parsed user filter (if any) and returns the
    /// composed query. An [`Composition::EmptyResult`] yields an empty page
    /// without calling the row source.
    ///
    /// # Errors
    ///
    /// Returns `ListingError::BadFilterSyntax` if the filter does not parse,
    /// or whatever the row source fails with.
    pub fn list<F>(&self, request: &ListRequest, scope: F) -> Result<Page<S::Row>>
    where
        F: FnOnce(Option<&Expression>) -> Composition,
    {
        let page = self.page_request(request);
        let user_filter = FilterParser::parse(request.filter.as_deref().unwrap_or_default())?;

        let fetched = match scope(user_filter.as_ref()) {
            Composition::EmptyResult => Fetched {
                rows: Vec::new(),
                total_count: 0,
            },
            composition => {
                self.source
                    .fetch(composition.expression(), page.offset(), page.limit())?
            }
        };

        Ok(self.finish(request, page, fetched))
    }

    fn finish(
        &self,
        request: &ListRequest,
        page: PageRequest,
        fetched: Fetched<S::Row>,
    ) -> Page<S::Row> {
        let links = PageLinks::build(
            &request.path,
            page,
            fetched.rows.len(),
            fetched.total_count,
            &request.additional_query,
        );
        tracing::debug!(
            path = %request.path,
            offset = page.offset(),
            limit = page.limit(),
            rows = fetched.rows.len(),
            total = fetched.total_count,
            "listed page"
        );
        Page {
            data: fetched.rows,
            total_count: fetched.total_count,
            links,
            request: page,
        }
    }
}

impl<'a, S: SearchSource> Lister<'a, S> {
    /// Searches rows by free text.
    ///
    /// When `host` is given, the work item link pattern of that host is
    /// registered first so that links pasted from it are recognized.
    ///
    /// # Errors
    ///
    /// Returns `ListingError::EmptyQuery` for blank text and
    /// `ListingError::BadFilterSyntax` if the filter does not parse.
    pub fn search(
        &self,
        request: &ListRequest,
        text: &str,
        host: Option<&str>,
        registry: &HostRegistry,
    ) -> Result<Page<S::Row>> {
        if let Some(host) = host {
            registry.register_work_item_host(host)?;
        }
        let query = SearchQuery::resolve(text, registry)?;
        let page = self.page_request(request);
        let filter = FilterParser::parse(request.filter.as_deref().unwrap_or_default())?;

        let fetched = self
            .source
            .search(&query, filter.as_ref(), page.offset(), page.limit())?;
        Ok(self.finish(request, page, fetched))
    }
}

impl Dataset {
    /// Composes the backlog query of `space` from this dataset's iterations
    /// and work item types.
    pub fn backlog_scope(&self, base: Option<&Expression>, space: Uuid) -> Composition {
        backlog(
            base,
            space,
            &self.backlog_iterations(space),
            &self.planner_types(),
        )
    }

    fn matching_items(&self, filter: Option<&Expression>) -> Result<Vec<&WorkItem>> {
        let mut items: Vec<&WorkItem> = match filter {
            Some(expr) => FilterEvaluator::new(expr).filter_records(&self.work_items)?,
            None => self.work_items.iter().collect(),
        };
        items.sort_by_key(|item| item.number);
        Ok(items)
    }
}

fn page_of(items: Vec<&WorkItem>, offset: usize, limit: usize) -> Fetched<WorkItem> {
    let total_count = items.len();
    let rows = items
        .into_iter()
        .skip(offset)
        .take(limit)
        .cloned()
        .collect();
    Fetched { rows, total_count }
}

impl RowSource for Dataset {
    type Row = WorkItem;

    fn fetch(
        &self,
        filter: Option<&Expression>,
        offset: usize,
        limit: usize,
    ) -> Result<Fetched<WorkItem>> {
        Ok(page_of(self.matching_items(filter)?, offset, limit))
    }
}

impl SearchSource for Dataset {
    fn search(
        &self,
        query: &SearchQuery,
        filter: Option<&Expression>,
        offset: usize,
        limit: usize,
    ) -> Result<Fetched<WorkItem>> {
        let items = match query {
            SearchQuery::Text(text) => {
                let needle = text.to_lowercase();
                let mut items = self.matching_items(filter)?;
                items.retain(|item| item.title.to_lowercase().contains(&needle));
                items
            }
            SearchQuery::Number(_) => {
                let combined = compose(filter, query.to_expression());
                self.matching_items(combined.as_ref())?
            }
        };
        Ok(page_of(items, offset, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::in_space;
    use std::cell::Cell;

    struct CountingSource {
        calls: Cell<usize>,
    }

    impl RowSource for CountingSource {
        type Row = u32;

        fn fetch(
            &self,
            _filter: Option<&Expression>,
            _offset: usize,
            _limit: usize,
        ) -> Result<Fetched<u32>> {
            self.calls.set(self.calls.get() + 1);
            Ok(Fetched {
                rows: vec![1, 2],
                total_count: 5,
            })
        }
    }

    #[test]
    fn test_empty_result_skips_fetch() {
        let source = CountingSource {
            calls: Cell::new(0),
        };
        let page = Lister::new(&source)
            .list(&ListRequest::new("/items"), |_| Composition::EmptyResult)
            .unwrap();

        assert_eq!(source.calls.get(), 0);
        assert!(page.data.is_empty());
        assert_eq!(page.total_count, 0);
        assert_eq!(page.links.next, None);
        assert_eq!(page.links.prev, None);
    }

    #[test]
    fn test_list_passes_paging_to_links() {
        let source = CountingSource {
            calls: Cell::new(0),
        };
        let request = ListRequest {
            page_offset: Some("2".to_string()),
            page_limit: Some(2),
            additional_query: vec!["q=x".to_string()],
            ..ListRequest::new("/items")
        };
        let page = Lister::new(&source)
            .list(&request, |f| match f {
                Some(expr) => Composition::Filter(expr.clone()),
                None => Composition::Unfiltered,
            })
            .unwrap();

        assert_eq!(source.calls.get(), 1);
        assert_eq!(page.total_count, 5);
        assert_eq!(
            page.links.next.as_deref(),
            Some("/items?page[offset]=4&page[limit]=2&q=x")
        );
    }

    #[test]
    fn test_bad_filter_is_reported_before_fetch() {
        let source = CountingSource {
            calls: Cell::new(0),
        };
        let request = ListRequest {
            filter: Some(r#"{"colour": "red"}"#.to_string()),
            ..ListRequest::new("/items")
        };
        let err = Lister::new(&source)
            .list(&request, |_| Composition::Unfiltered)
            .unwrap_err();

        assert!(matches!(err, ListingError::BadFilterSyntax(_)));
        assert_eq!(source.calls.get(), 0);
    }

    #[test]
    fn test_scope_receives_user_filter() {
        let source = CountingSource {
            calls: Cell::new(0),
        };
        let space = Uuid::new_v4();
        let request = ListRequest {
            filter: Some(r#"{"state": "open"}"#.to_string()),
            ..ListRequest::new("/items")
        };
        let mut seen = None;
        Lister::new(&source)
            .list(&request, |f| {
                seen = f.cloned();
                match compose(f, [in_space(space)]) {
                    Some(expr) => Composition::Filter(expr),
                    None => Composition::Unfiltered,
                }
            })
            .unwrap();

        assert_eq!(seen.unwrap().to_string(), r#"system.state = "open""#);
    }

    #[test]
    fn test_search_query_resolution() {
        let registry = HostRegistry::new();
        registry.register_work_item_host("tracker.example.io").unwrap();

        assert_eq!(
            SearchQuery::resolve("https://tracker.example.io/s/plan/detail/12", &registry)
                .unwrap(),
            SearchQuery::Number(12)
        );
        assert_eq!(
            SearchQuery::resolve("number: 7", &registry).unwrap(),
            SearchQuery::Number(7)
        );
        assert_eq!(
            SearchQuery::resolve("  login  ", &registry).unwrap(),
            SearchQuery::Text("login".to_string())
        );
        assert!(matches!(
            SearchQuery::resolve("   ", &registry),
            Err(ListingError::EmptyQuery)
        ));
    }
}
