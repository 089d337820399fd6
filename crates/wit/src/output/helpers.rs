//! Common helper functions for output formatting.

use owo_colors::OwoColorize;
use uuid::Uuid;

/// Truncates a UUID to its first 8 characters for display.
pub fn truncate_id(id: &Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

/// Truncates a string to a maximum number of characters.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        s.to_string()
    }
}

/// Formats a workflow state for display.
pub fn format_state(state: &str, use_colors: bool) -> String {
    if !use_colors {
        return state.to_string();
    }
    match state {
        "new" => state.cyan().to_string(),
        "open" | "in progress" => state.yellow().to_string(),
        "resolved" => state.green().to_string(),
        "closed" => state.dimmed().to_string(),
        _ => state.to_string(),
    }
}

/// Formats labels for display.
pub fn format_labels(labels: &[String], max_len: usize) -> String {
    if labels.is_empty() {
        return String::new();
    }

    let formatted: Vec<String> = labels.iter().map(|l| format!("@{l}")).collect();
    truncate_str(&formatted.join(" "), max_len)
}

/// Formats a table header line.
pub fn format_header(header: &str, use_colors: bool) -> String {
    if use_colors {
        format!("{}\n", header.dimmed())
    } else {
        format!("{header}\n")
    }
}
