//! Offset/limit paging and navigation links.
//!
//! Collection responses carry `first`, `prev`, `next` and `last` links built
//! from the request's `page[offset]` / `page[limit]` and the total number of
//! matching rows. The link math is asymmetric: when the offset
//! is not aligned to the limit, or points past the end of the result set,
//! the links are shifted and shortened so that each of them still addresses
//! an in-range page that never starts before zero.
//!
//! # Example
//!
//! ```
//! use wit_query::pagination::{PageLinks, PageRequest};
//!
//! let page = PageRequest::from_params(Some("3"), Some(4));
//! let links = PageLinks::build("/api/workitems", page, 1, 10, &[]);
//! assert_eq!(links.first, "/api/workitems?page[offset]=0&page[limit]=3");
//! assert_eq!(links.prev.as_deref(), Some("/api/workitems?page[offset]=0&page[limit]=3"));
//! assert_eq!(links.next.as_deref(), Some("/api/workitems?page[offset]=4&page[limit]=4"));
//! assert_eq!(links.last, "/api/workitems?page[offset]=7&page[limit]=4");
//! ```

use serde::{Deserialize, Serialize};

/// Page size used when the request gives none (or a non-positive one).
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Largest page size a request may ask for.
pub const MAX_PAGE_SIZE: usize = 100;

/// Page size limits applied while normalizing paging parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSizes {
    /// Page size used when the request gives none.
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    /// Upper bound for requested page sizes.
    #[serde(default = "max_limit")]
    pub max_limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_PAGE_SIZE
}

fn max_limit() -> usize {
    MAX_PAGE_SIZE
}

impl Default for PageSizes {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_PAGE_SIZE,
            max_limit: MAX_PAGE_SIZE,
        }
    }
}

impl PageSizes {
    /// Returns the sizes with both bounds forced to at least 1 and the
    /// default capped by the maximum.
    pub fn normalized(self) -> Self {
        let max_limit = self.max_limit.max(1);
        Self {
            default_limit: self.default_limit.clamp(1, max_limit),
            max_limit,
        }
    }
}

/// A normalized paging request: `offset >= 0`, `limit > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    offset: usize,
    limit: usize,
}

impl PageRequest {
    /// Creates a request from already numeric values, applying the default
    /// page sizes to the limit.
    pub fn new(offset: usize, limit: usize) -> Self {
        Self::normalize(to_i64(offset), Some(to_i64(limit)), PageSizes::default())
    }

    /// Normalizes raw `page[offset]` / `page[limit]` query parameters using
    /// the default page sizes.
    ///
    /// A missing, unparseable or negative offset becomes 0. A missing, zero
    /// or negative limit becomes [`DEFAULT_PAGE_SIZE`], and a limit above
    /// [`MAX_PAGE_SIZE`] is capped.
    pub fn from_params(offset: Option<&str>, limit: Option<i64>) -> Self {
        Self::from_params_with(offset, limit, PageSizes::default())
    }

    /// Like [`PageRequest::from_params`], with configurable page sizes.
    pub fn from_params_with(offset: Option<&str>, limit: Option<i64>, sizes: PageSizes) -> Self {
        let offset = offset.and_then(|raw| raw.parse::<i64>().ok()).unwrap_or(0);
        Self::normalize(offset, limit, sizes)
    }

    fn normalize(offset: i64, limit: Option<i64>, sizes: PageSizes) -> Self {
        let sizes = sizes.normalized();
        let offset = usize::try_from(offset).unwrap_or(0);
        let limit = match limit.and_then(|l| usize::try_from(l).ok()) {
            None | Some(0) => sizes.default_limit,
            Some(l) => l.min(sizes.max_limit),
        };
        Self { offset, limit }
    }

    /// Returns the offset of the first requested row.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the page size.
    pub fn limit(&self) -> usize {
        self.limit
    }
}

/// A page addressed by its first row and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRange {
    /// First row of the page.
    pub offset: usize,
    /// Number of rows in the page.
    pub limit: usize,
}

impl PageRange {
    /// Builds `path?page[offset]=<o>&page[limit]=<l>` followed by each
    /// additional query fragment.
    pub fn to_url(&self, path: &str, additional_query: &[String]) -> String {
        let mut url = format!(
            "{path}?page[offset]={}&page[limit]={}",
            self.offset, self.limit
        );
        for fragment in additional_query {
            url.push('&');
            url.push_str(fragment);
        }
        url
    }

    /// Builds a range from a start that may be negative: a negative start is
    /// moved to 0 and the size shrunk by the same amount.
    fn clamped(start: i64, limit: i64) -> Self {
        let (start, limit) = if start < 0 {
            (0, limit + start)
        } else {
            (start, limit)
        };
        Self {
            offset: to_usize(start),
            limit: to_usize(limit),
        }
    }
}

/// The four navigation targets of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRanges {
    /// Always present.
    pub first: PageRange,
    /// Present when `offset > 0` and there are rows.
    pub prev: Option<PageRange>,
    /// Present when rows remain after the current page.
    pub next: Option<PageRange>,
    /// Always present.
    pub last: PageRange,
}

/// Computes the navigation ranges for a page of `result_len` rows out of
/// `count` matching rows.
pub fn page_ranges(page: PageRequest, result_len: usize, count: usize) -> PageRanges {
    let offset = to_i64(page.offset);
    let limit = to_i64(page.limit);
    let result_len = to_i64(result_len);
    let count = to_i64(count);

    // Page 1 ends where the current offset's alignment begins.
    let first = PageRange {
        offset: 0,
        limit: if offset > 0 {
            to_usize(offset % limit)
        } else {
            to_usize(limit)
        },
    };

    let prev = (offset > 0 && count > 0).then(|| {
        let start = if offset <= count {
            offset - limit
        } else {
            retreat_past_end(offset, limit, count)
        };
        PageRange::clamped(start, limit)
    });

    let next_start = offset.saturating_add(result_len);
    let next = (next_start < count).then(|| PageRange {
        offset: to_usize(next_start),
        limit: to_usize(limit),
    });

    let last_start = if offset < count {
        offset + ((count - offset - 1) / limit) * limit
    } else {
        retreat_past_end(offset, limit, count)
    };
    let last = PageRange::clamped(last_start, limit);

    PageRanges {
        first,
        prev,
        next,
        last,
    }
}

/// Steps back from an offset at or past `count` in whole pages until the
/// page covers the end of the result set.
fn retreat_past_end(offset: i64, limit: i64, count: i64) -> i64 {
    offset - (((offset - count) / limit) + 1) * limit
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn to_usize(value: i64) -> usize {
    usize::try_from(value).unwrap_or(0)
}

/// Navigation links of a collection response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
    /// Link to the first page.
    pub first: String,
    /// Link to the previous page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    /// Link to the next page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    /// Link to the last page.
    pub last: String,
}

impl PageLinks {
    /// Builds the links for a page of `result_len` rows out of `count`.
    ///
    /// `additional_query` fragments (e.g. `filter[expression]=...`) are
    /// appended to every link in order.
    pub fn build(
        path: &str,
        page: PageRequest,
        result_len: usize,
        count: usize,
        additional_query: &[String],
    ) -> Self {
        Self::from_ranges(path, &page_ranges(page, result_len, count), additional_query)
    }

    /// Formats already computed ranges as links.
    pub fn from_ranges(path: &str, ranges: &PageRanges, additional_query: &[String]) -> Self {
        Self {
            first: ranges.first.to_url(path, additional_query),
            prev: ranges.prev.map(|r| r.to_url(path, additional_query)),
            next: ranges.next.map(|r| r.to_url(path, additional_query)),
            last: ranges.last.to_url(path, additional_query),
        }
    }
}
