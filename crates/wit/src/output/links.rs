//! Paging link output formatting.

use owo_colors::OwoColorize;
use wit_query::pagination::PageLinks;

/// Formats paging links as JSON.
pub fn format_links_json(links: &PageLinks) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({ "links": links }))
}

/// Formats paging links as aligned `name: url` lines. Absent links are shown
/// as `-`.
pub fn format_links_table(links: &PageLinks, use_colors: bool) -> String {
    let rows = [
        ("first", Some(links.first.as_str())),
        ("prev", links.prev.as_deref()),
        ("next", links.next.as_deref()),
        ("last", Some(links.last.as_str())),
    ];

    let mut output = String::new();
    for (name, url) in rows {
        let label = format!("{name:<6}");
        let label = if use_colors {
            label.bold().to_string()
        } else {
            label
        };
        let url = match url {
            Some(url) => url.to_string(),
            None if use_colors => "-".dimmed().to_string(),
            None => "-".to_string(),
        };
        output.push_str(&format!("{label}{url}\n"));
    }
    output
}
