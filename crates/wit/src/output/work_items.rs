//! Work item page output formatting.

use serde::Serialize;
use wit_query::listing::Page;
use wit_query::pagination::PageLinks;
use wit_query::WorkItem;

use super::helpers::{format_header, format_labels, format_state, truncate_id, truncate_str};

/// JSON output structure for a page of work items.
#[derive(Serialize)]
pub struct WorkItemPageOutput<'a> {
    pub data: &'a [WorkItem],
    pub meta: PageMeta,
    pub links: &'a PageLinks,
}

/// Page metadata.
#[derive(Serialize)]
pub struct PageMeta {
    #[serde(rename = "totalCount")]
    pub total_count: usize,
}

/// Formats a page of work items as JSON.
pub fn format_page_json(page: &Page<WorkItem>) -> Result<String, serde_json::Error> {
    let output = WorkItemPageOutput {
        data: &page.data,
        meta: PageMeta {
            total_count: page.total_count,
        },
        links: &page.links,
    };
    serde_json::to_string_pretty(&output)
}

/// Formats a page of work items as a table followed by a paging summary.
pub fn format_page_table(page: &Page<WorkItem>, use_colors: bool) -> String {
    if page.data.is_empty() {
        return format!("No work items found ({} total).\n", page.total_count);
    }

    let mut output = String::new();
    output.push_str(&format_header(
        &format!(
            "{:>6} {:<10} {:<9} {:<12} {:<40} {}",
            "#", "ID", "Type", "State", "Title", "Labels"
        ),
        use_colors,
    ));

    for item in &page.data {
        // Escape codes would count towards the width, so pad by hand.
        let state = truncate_str(&item.state, 12);
        let padding = " ".repeat(12usize.saturating_sub(state.chars().count()));
        let line = format!(
            "{:>6} {:<10} {:<9} {}{padding} {:<40} {}",
            item.number,
            truncate_id(&item.id),
            truncate_str(&item.type_name, 9),
            format_state(&state, use_colors),
            truncate_str(&item.title, 40),
            format_labels(&item.labels, 30),
        );
        output.push_str(line.trim_end());
        output.push('\n');
    }

    let offset = page.request.offset();
    let first_row = offset + 1;
    let last_row = offset + page.data.len();
    output.push_str(&format!(
        "\nShowing {first_row}-{last_row} of {}\n",
        page.total_count
    ));
    if let Some(next) = &page.links.next {
        output.push_str(&format!("Next: {next}\n"));
    }

    output
}
