//! Output formatting utilities for the wit CLI.
//!
//! This module provides functions for formatting data as tables or JSON.
//! It is organized into submodules by what is printed:
//!
//! - [`work_items`] - Pages of work items (list, search)
//! - [`links`] - Paging links (links)
//! - [`expression`] - Parsed filter expressions (filter)
//! - [`helpers`] - Common formatting utilities (truncation, states, labels)

mod expression;
pub mod helpers;
mod links;
mod work_items;

pub use expression::{format_expression_json, format_expression_tree};
pub use links::{format_links_json, format_links_table};
pub use work_items::{format_page_json, format_page_table};
