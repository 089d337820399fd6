//! Query core of a collaborative work item tracker.
//!
//! Every listing endpoint of the tracker (work items, search, backlog,
//! spaces) is built from the same two primitives:
//!
//! - [`filter`]: a JSON filter syntax parsed into an [`filter::Expression`]
//!   tree, composed with server-side scoping constraints and evaluated
//!   against records.
//! - [`pagination`]: normalization of `page[offset]`/`page[limit]` and the
//!   `first`/`prev`/`next`/`last` link calculation.
//!
//! [`listing`] wires both together over a [`listing::RowSource`], and
//! [`registry`] recognizes deep links pasted into free-text searches. The
//! [`Dataset`] is a JSON snapshot of the tracker that implements the row
//! source in memory; [`DatasetStore`] persists it.

pub mod filter;
pub mod listing;
pub mod model;
pub mod pagination;
pub mod registry;
pub mod store;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use model::{Iteration, Space, WorkItem, WorkItemType};
pub use store::{DatasetStore, DatasetStoreError};

/// A snapshot of the tracker's data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    /// Spaces.
    #[serde(default)]
    pub spaces: Vec<Space>,

    /// Iterations of all spaces.
    #[serde(default)]
    pub iterations: Vec<Iteration>,

    /// Known work item types.
    #[serde(default)]
    pub work_item_types: Vec<WorkItemType>,

    /// Work items of all spaces.
    #[serde(default)]
    pub work_items: Vec<WorkItem>,
}

impl Dataset {
    /// Creates an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the dataset holds no work items.
    pub fn is_empty(&self) -> bool {
        self.work_items.is_empty()
    }

    /// Finds a space by id.
    pub fn space(&self, id: Uuid) -> Option<&Space> {
        self.spaces.iter().find(|s| s.id == id)
    }

    /// Returns the root iteration of a space.
    pub fn root_iteration(&self, space: Uuid) -> Option<&Iteration> {
        self.iterations
            .iter()
            .find(|it| it.space == space && it.parent.is_none())
    }

    /// Returns the ids of the iterations whose items belong on the backlog:
    /// the root iteration and every iteration below it that is not running.
    ///
    /// Empty when the space has no root iteration.
    pub fn backlog_iterations(&self, space: Uuid) -> Vec<&str> {
        let Some(root) = self.root_iteration(space) else {
            return vec![];
        };

        let mut ids = vec![root.id.as_str()];
        let mut visited = HashSet::from([root.id.as_str()]);
        let mut pending = vec![root.id.as_str()];
        while let Some(parent_id) = pending.pop() {
            for iteration in self.iterations.iter().filter(|it| it.space == space) {
                if iteration.parent.as_deref() != Some(parent_id)
                    || !visited.insert(iteration.id.as_str())
                {
                    continue;
                }
                if !iteration.active {
                    ids.push(&iteration.id);
                }
                pending.push(&iteration.id);
            }
        }
        ids
    }

    /// Returns the names of the work item types planned on the backlog.
    pub fn planner_types(&self) -> Vec<&str> {
        self.work_item_types
            .iter()
            .filter(|t| t.planner_item)
            .map(|t| t.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iteration(id: &str, space: Uuid, parent: Option<&str>, active: bool) -> Iteration {
        Iteration {
            id: id.to_string(),
            space,
            name: id.to_uppercase(),
            parent: parent.map(str::to_string),
            active,
        }
    }

    #[test]
    fn test_dataset_new_is_empty() {
        let dataset = Dataset::new();
        assert!(dataset.is_empty());
        assert!(dataset.spaces.is_empty());
        assert!(dataset.planner_types().is_empty());
    }

    #[test]
    fn test_backlog_iterations_skip_active_ones() {
        let space = Uuid::new_v4();
        let dataset = Dataset {
            iterations: vec![
                iteration("root", space, None, false),
                iteration("sprint-1", space, Some("root"), false),
                iteration("sprint-2", space, Some("root"), true),
                iteration("sprint-2a", space, Some("sprint-2"), false),
                iteration("other-root", Uuid::new_v4(), None, false),
            ],
            ..Dataset::default()
        };

        assert_eq!(
            dataset.backlog_iterations(space),
            vec!["root", "sprint-1", "sprint-2a"]
        );
    }

    #[test]
    fn test_backlog_iterations_repeated_id() {
        let space = Uuid::new_v4();
        let dataset = Dataset {
            iterations: vec![
                iteration("root", space, None, false),
                iteration("root", space, Some("root"), false),
                iteration("sprint-1", space, Some("root"), false),
            ],
            ..Dataset::default()
        };

        assert_eq!(dataset.backlog_iterations(space), vec!["root", "sprint-1"]);
    }

    #[test]
    fn test_backlog_iterations_stay_in_space() {
        let space = Uuid::new_v4();
        let other = Uuid::new_v4();
        let dataset = Dataset {
            iterations: vec![
                iteration("root", space, None, false),
                iteration("sprint-1", space, Some("root"), false),
                iteration("root", other, None, false),
                iteration("root", other, Some("root"), false),
                iteration("foreign", other, Some("root"), false),
                iteration("foreign-child", other, Some("sprint-1"), false),
            ],
            ..Dataset::default()
        };

        assert_eq!(dataset.backlog_iterations(space), vec!["root", "sprint-1"]);
        assert_eq!(dataset.backlog_iterations(other), vec!["root", "foreign"]);
    }

    #[test]
    fn test_backlog_iterations_without_root() {
        let dataset = Dataset::new();
        assert!(dataset.backlog_iterations(Uuid::new_v4()).is_empty());
    }

    #[test]
    fn test_planner_types() {
        let dataset = Dataset {
            work_item_types: vec![
                WorkItemType {
                    name: "story".to_string(),
                    planner_item: true,
                },
                WorkItemType {
                    name: "epic".to_string(),
                    planner_item: false,
                },
                WorkItemType {
                    name: "bug".to_string(),
                    planner_item: true,
                },
            ],
            ..Dataset::default()
        };
        assert_eq!(dataset.planner_types(), vec!["story", "bug"]);
    }

    #[test]
    fn test_dataset_serde_roundtrip() {
        let space = Uuid::new_v4();
        let mut item = WorkItem::new(space, 1, "story", "Login", "open");
        item.labels = vec!["ui".to_string()];
        let dataset = Dataset {
            spaces: vec![Space {
                id: space,
                name: "Platform".to_string(),
            }],
            iterations: vec![iteration("root", space, None, false)],
            work_item_types: vec![],
            work_items: vec![item],
        };

        let json = serde_json::to_string_pretty(&dataset).unwrap();
        let decoded: Dataset = serde_json::from_str(&json).unwrap();
        assert_eq!(dataset, decoded);
    }

    #[test]
    fn test_dataset_deserialize_minimal() {
        let dataset: Dataset = serde_json::from_str("{}").unwrap();
        assert!(dataset.is_empty());
    }
}
