//! Integration tests for listing, backlog and search over a stored dataset.
//!
//! Each test writes a dataset to a temporary directory, loads it back through
//! the `DatasetStore` and runs requests against it the way a listing endpoint
//! would.

use tempfile::tempdir;
use uuid::Uuid;
use wit_query::filter::{compose, in_space, Composition};
use wit_query::listing::{ListRequest, Lister, ListingError};
use wit_query::pagination::PageSizes;
use wit_query::registry::HostRegistry;
use wit_query::{Dataset, DatasetStore, Iteration, Space, WorkItem, WorkItemType};

struct Fixture {
    space: Uuid,
    dataset: Dataset,
}

fn iteration(id: &str, space: Uuid, parent: Option<&str>, active: bool) -> Iteration {
    Iteration {
        id: id.to_string(),
        space,
        name: id.to_string(),
        parent: parent.map(str::to_string),
        active,
    }
}

fn work_item(space: Uuid, number: i64, kind: &str, title: &str, state: &str, it: &str) -> WorkItem {
    let mut item = WorkItem::new(space, number, kind, title, state);
    item.iteration = Some(it.to_string());
    item
}

/// Builds a dataset, saves it and loads it back.
fn stored_fixture() -> Fixture {
    let space = Uuid::new_v4();
    let other = Uuid::new_v4();

    let dataset = Dataset {
        spaces: vec![
            Space {
                id: space,
                name: "Platform".to_string(),
            },
            Space {
                id: other,
                name: "Website".to_string(),
            },
        ],
        iterations: vec![
            iteration("root", space, None, false),
            iteration("sprint-0", space, Some("root"), false),
            iteration("sprint-1", space, Some("root"), true),
            iteration("web-root", other, None, false),
        ],
        work_item_types: vec![
            WorkItemType {
                name: "story".to_string(),
                planner_item: true,
            },
            WorkItemType {
                name: "bug".to_string(),
                planner_item: false,
            },
        ],
        work_items: vec![
            work_item(space, 1, "story", "Login page", "open", "root"),
            work_item(space, 2, "story", "Logout button", "closed", "root"),
            work_item(space, 3, "bug", "Login crash", "open", "sprint-1"),
            work_item(space, 4, "story", "Password reset", "new", "sprint-0"),
            work_item(space, 5, "story", "Profile page", "resolved", "sprint-1"),
            work_item(other, 6, "story", "Landing page", "open", "web-root"),
        ],
    };

    let temp_dir = tempdir().expect("failed to create temp dir");
    let store = DatasetStore::with_path(temp_dir.path().join("dataset.json"));
    store.save(&dataset).expect("failed to save dataset");
    let loaded = store.load().expect("failed to load dataset");
    assert_eq!(loaded, dataset);

    Fixture {
        space,
        dataset: loaded,
    }
}

fn numbers(items: &[WorkItem]) -> Vec<i64> {
    items.iter().map(|item| item.number).collect()
}

fn space_scope(space: Uuid) -> impl FnOnce(Option<&wit_query::filter::Expression>) -> Composition {
    move |filter| match compose(filter, [in_space(space)]) {
        Some(expr) => Composition::Filter(expr),
        None => Composition::Unfiltered,
    }
}

// ==================== Listing ====================

#[test]
fn test_list_space_with_filter_and_links() {
    let fixture = stored_fixture();
    let path = format!("/spaces/{}/workitems", fixture.space);
    let request = ListRequest {
        filter: Some(r#"{"state": "open"}"#.to_string()),
        page_limit: Some(1),
        ..ListRequest::new(path.clone())
    };

    let page = Lister::new(&fixture.dataset)
        .list(&request, space_scope(fixture.space))
        .expect("listing should succeed");

    assert_eq!(numbers(&page.data), vec![1]);
    assert_eq!(page.total_count, 2);
    assert_eq!(page.links.first, format!("{path}?page[offset]=0&page[limit]=1"));
    assert_eq!(page.links.prev, None);
    assert_eq!(
        page.links.next,
        Some(format!("{path}?page[offset]=1&page[limit]=1"))
    );
    assert_eq!(page.links.last, format!("{path}?page[offset]=1&page[limit]=1"));
}

#[test]
fn test_list_second_page() {
    let fixture = stored_fixture();
    let request = ListRequest {
        page_offset: Some("2".to_string()),
        page_limit: Some(2),
        ..ListRequest::new("/items")
    };

    let page = Lister::new(&fixture.dataset)
        .list(&request, space_scope(fixture.space))
        .unwrap();

    assert_eq!(numbers(&page.data), vec![3, 4]);
    assert_eq!(page.total_count, 5);
    assert_eq!(page.links.prev.as_deref(), Some("/items?page[offset]=0&page[limit]=2"));
    assert_eq!(page.links.next.as_deref(), Some("/items?page[offset]=4&page[limit]=2"));
    assert_eq!(page.links.last, "/items?page[offset]=4&page[limit]=2");
}

#[test]
fn test_list_or_filter_across_iterations() {
    let fixture = stored_fixture();
    let request = ListRequest {
        filter: Some(r#"{"$OR": [{"iteration": "sprint-0"}, {"iteration": "sprint-1"}]}"#.to_string()),
        ..ListRequest::new("/items")
    };

    let page = Lister::new(&fixture.dataset)
        .list(&request, space_scope(fixture.space))
        .unwrap();

    assert_eq!(numbers(&page.data), vec![3, 4, 5]);
    assert_eq!(page.links.next, None);
}

#[test]
fn test_list_page_size_is_capped() {
    let fixture = stored_fixture();
    let request = ListRequest {
        page_limit: Some(50),
        ..ListRequest::new("/items")
    };
    let sizes = PageSizes {
        default_limit: 2,
        max_limit: 3,
    };

    let page = Lister::new(&fixture.dataset)
        .with_page_sizes(sizes)
        .list(&request, |_| Composition::Unfiltered)
        .unwrap();

    assert_eq!(numbers(&page.data), vec![1, 2, 3]);
    assert_eq!(page.total_count, 6);
}

#[test]
fn test_list_rejects_bad_filter() {
    let fixture = stored_fixture();
    let request = ListRequest {
        filter: Some(r#"{"asignee": "nobody"}"#.to_string()),
        ..ListRequest::new("/items")
    };

    let err = Lister::new(&fixture.dataset)
        .list(&request, |_| Composition::Unfiltered)
        .unwrap_err();

    assert!(matches!(err, ListingError::BadFilterSyntax(_)));
    assert!(err.to_string().contains("did you mean 'assignee'"));
}

// ==================== Backlog ====================

#[test]
fn test_backlog_lists_open_planner_items() {
    let fixture = stored_fixture();
    let dataset = &fixture.dataset;

    let page = Lister::new(dataset)
        .list(&ListRequest::new("/backlog"), |filter| {
            dataset.backlog_scope(filter, fixture.space)
        })
        .unwrap();

    // Closed, active-iteration and non-planner items are excluded.
    assert_eq!(numbers(&page.data), vec![1, 4]);
    assert_eq!(page.total_count, 2);
}

#[test]
fn test_backlog_with_user_filter() {
    let fixture = stored_fixture();
    let dataset = &fixture.dataset;
    let request = ListRequest {
        filter: Some(r#"{"state": "new"}"#.to_string()),
        ..ListRequest::new("/backlog")
    };

    let page = Lister::new(dataset)
        .list(&request, |filter| dataset.backlog_scope(filter, fixture.space))
        .unwrap();

    assert_eq!(numbers(&page.data), vec![4]);
}

#[test]
fn test_backlog_ignores_iterations_of_other_spaces() {
    let mut fixture = stored_fixture();
    let other = fixture.dataset.spaces[1].id;
    // Ids are only unique within a space.
    fixture.dataset.iterations.extend([
        iteration("sprint-1", other, Some("root"), false),
        iteration("root", other, Some("root"), false),
    ]);
    let dataset = &fixture.dataset;

    assert_eq!(
        dataset.backlog_iterations(fixture.space),
        vec!["root", "sprint-0"]
    );

    let page = Lister::new(dataset)
        .list(&ListRequest::new("/backlog"), |filter| {
            dataset.backlog_scope(filter, fixture.space)
        })
        .unwrap();
    assert_eq!(numbers(&page.data), vec![1, 4]);
}

#[test]
fn test_backlog_without_planner_types_is_empty() {
    let mut fixture = stored_fixture();
    for kind in &mut fixture.dataset.work_item_types {
        kind.planner_item = false;
    }
    let dataset = &fixture.dataset;

    let page = Lister::new(dataset)
        .list(&ListRequest::new("/backlog"), |filter| {
            dataset.backlog_scope(filter, fixture.space)
        })
        .unwrap();

    assert!(page.data.is_empty());
    assert_eq!(page.total_count, 0);
    assert_eq!(page.links.prev, None);
    assert_eq!(page.links.next, None);
}

// ==================== Search ====================

#[test]
fn test_search_by_title_text() {
    let fixture = stored_fixture();
    let registry = HostRegistry::new();

    let page = Lister::new(&fixture.dataset)
        .search(&ListRequest::new("/search"), "LOGIN", None, &registry)
        .unwrap();

    assert_eq!(numbers(&page.data), vec![1, 3]);
}

#[test]
fn test_search_by_deep_link() {
    let fixture = stored_fixture();
    let registry = HostRegistry::new();

    let page = Lister::new(&fixture.dataset)
        .search(
            &ListRequest::new("/search"),
            "https://tracker.example.io/platform/plan/detail/4",
            Some("tracker.example.io"),
            &registry,
        )
        .unwrap();

    assert_eq!(numbers(&page.data), vec![4]);
    assert_eq!(registry.names(), vec!["tracker.example.io/work-item".to_string()]);
}

#[test]
fn test_search_link_of_unknown_host_is_text() {
    let fixture = stored_fixture();
    let registry = HostRegistry::new();

    let page = Lister::new(&fixture.dataset)
        .search(
            &ListRequest::new("/search"),
            "https://tracker.example.io/platform/plan/detail/4",
            None,
            &registry,
        )
        .unwrap();

    assert!(page.data.is_empty());
}

#[test]
fn test_search_with_filter() {
    let fixture = stored_fixture();
    let registry = HostRegistry::new();
    let request = ListRequest {
        filter: Some(r#"{"type": "bug"}"#.to_string()),
        ..ListRequest::new("/search")
    };

    let page = Lister::new(&fixture.dataset)
        .search(&request, "login", None, &registry)
        .unwrap();

    assert_eq!(numbers(&page.data), vec![3]);
}

#[test]
fn test_search_empty_query() {
    let fixture = stored_fixture();
    let registry = HostRegistry::new();

    let err = Lister::new(&fixture.dataset)
        .search(&ListRequest::new("/search"), "  ", None, &registry)
        .unwrap_err();

    assert!(matches!(err, ListingError::EmptyQuery));
}
