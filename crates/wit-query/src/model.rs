//! Records of the work item tracker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::filter::{AttributeValue, Record};

/// A space: the top-level container of areas, iterations and work items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    /// The space id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
}

/// An iteration (sprint) of a space.
///
/// Iterations form a tree below the space's root iteration, which has no
/// parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Iteration {
    /// The iteration id.
    pub id: String,
    /// The owning space.
    pub space: Uuid,
    /// Display name.
    pub name: String,
    /// The parent iteration. `None` for the root iteration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Whether the iteration is currently running.
    #[serde(default)]
    pub active: bool,
}

/// A work item type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemType {
    /// The type name, as stored in the `Type` attribute.
    pub name: String,
    /// Whether items of this type are planned on the backlog.
    #[serde(default)]
    pub planner_item: bool,
}

/// A work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    /// The work item id.
    pub id: Uuid,
    /// The owning space.
    pub space: Uuid,
    /// Human-facing number, unique within the space.
    pub number: i64,
    /// The work item type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Title.
    pub title: String,
    /// Workflow state (`new`, `open`, `in progress`, `resolved`, `closed`).
    pub state: String,
    /// The iteration the item is planned in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iteration: Option<String>,
    /// The area the item belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    /// Assigned identities.
    #[serde(default)]
    pub assignees: Vec<Uuid>,
    /// The identity that created the item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<Uuid>,
    /// Labels.
    #[serde(default)]
    pub labels: Vec<String>,
    /// The parent work item, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Uuid>,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl WorkItem {
    /// Creates a work item with the required attributes set and everything
    /// else empty.
    pub fn new(
        space: Uuid,
        number: i64,
        type_name: impl Into<String>,
        title: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            space,
            number,
            type_name: type_name.into(),
            title: title.into(),
            state: state.into(),
            iteration: None,
            area: None,
            assignees: Vec::new(),
            creator: None,
            labels: Vec::new(),
            parent: None,
            created_at: None,
            updated_at: None,
        }
    }
}

fn optional_text(value: &Option<String>) -> AttributeValue<'_> {
    value
        .as_deref()
        .map_or(AttributeValue::Null, AttributeValue::Text)
}

impl Record for WorkItem {
    fn attribute(&self, name: &str) -> Option<AttributeValue<'_>> {
        let value = match name {
            "id" => AttributeValue::Uuid(self.id),
            "space" => AttributeValue::Uuid(self.space),
            "system.number" => AttributeValue::Number(self.number),
            "system.title" => AttributeValue::Text(&self.title),
            "system.state" => AttributeValue::Text(&self.state),
            "system.iteration" => optional_text(&self.iteration),
            "system.area" => optional_text(&self.area),
            "Type" => AttributeValue::Text(&self.type_name),
            "system.assignees" => AttributeValue::UuidList(&self.assignees),
            "system.creator" => self
                .creator
                .map_or(AttributeValue::Null, AttributeValue::Uuid),
            "system.labels" => AttributeValue::TextList(&self.labels),
            "parent.exists" => AttributeValue::Bool(self.parent.is_some()),
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FieldTable;

    #[test]
    fn test_every_work_item_field_resolves_on_records() {
        let item = WorkItem::new(Uuid::new_v4(), 1, "bug", "Crash", "open");
        for def in FieldTable::work_items().fields() {
            assert!(
                item.attribute(def.attribute).is_some(),
                "attribute {} is not exposed",
                def.attribute
            );
        }
    }

    #[test]
    fn test_unknown_attribute_is_none() {
        let item = WorkItem::new(Uuid::new_v4(), 1, "bug", "Crash", "open");
        assert_eq!(item.attribute("system.nope"), None);
    }

    #[test]
    fn test_optional_attributes_are_null() {
        let item = WorkItem::new(Uuid::new_v4(), 1, "bug", "Crash", "open");
        assert_eq!(
            item.attribute("system.iteration"),
            Some(AttributeValue::Null)
        );
        assert_eq!(item.attribute("system.creator"), Some(AttributeValue::Null));
        assert_eq!(
            item.attribute("parent.exists"),
            Some(AttributeValue::Bool(false))
        );
    }

    #[test]
    fn test_work_item_deserialize_minimal() {
        let json = r#"{
            "id": "6f2d5a3e-8f43-4b5c-9d1e-2a7b8c9d0e1f",
            "space": "0b6c1f5a-2d3e-4f5a-8b9c-0d1e2f3a4b5c",
            "number": 12,
            "type": "story",
            "title": "Login page",
            "state": "new"
        }"#;
        let item: WorkItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.number, 12);
        assert_eq!(item.type_name, "story");
        assert!(item.assignees.is_empty());
        assert!(item.iteration.is_none());
    }
}
