/**
 * Task Data Structures
 *
 * Wire and domain types for tasks: the persisted `Task` record, the payloads
 * clients post to create, patch and reorder tasks, and the outcome types the
 * store reports back for writes.
 *
 * JSON field names follow the web client's conventions (`_id`, camelCase).
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Store-assigned task identifier
///
/// Serialized as the canonical hyphenated UUID string. Parsing is the only
/// place identifiers are validated, so a `TaskId` value is always well-formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier, naming `field` in the validation error
    pub fn parse_field(raw: &str, field: &str) -> Result<Self, SharedError> {
        Uuid::parse_str(raw.trim())
            .map(Self)
            .map_err(|_| SharedError::validation(field, format!("'{}' is not a valid task id", raw)))
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for TaskId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl FromStr for TaskId {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_field(s, "id")
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Workflow column a task sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskCategory {
    #[serde(rename = "To-Do", alias = "Not Started", alias = "todo")]
    ToDo,
    #[serde(rename = "In Progress", alias = "inProgress")]
    InProgress,
    #[serde(rename = "Done", alias = "done")]
    Done,
}

impl TaskCategory {
    /// Canonical stored/serialized name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToDo => "To-Do",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }

    /// Parse the `category` query parameter of the list endpoint.
    ///
    /// Absent, empty or `all` means no filter.
    pub fn from_query(raw: Option<&str>) -> Result<Option<Self>, SharedError> {
        match raw.map(str::trim) {
            None | Some("") | Some("all") => Ok(None),
            Some("todo") | Some("toDo") => Ok(Some(Self::ToDo)),
            Some("inProgress") => Ok(Some(Self::InProgress)),
            Some("done") => Ok(Some(Self::Done)),
            Some(other) => other.parse().map(Some),
        }
    }
}

impl FromStr for TaskCategory {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "To-Do" | "Not Started" => Ok(Self::ToDo),
            "In Progress" => Ok(Self::InProgress),
            "Done" => Ok(Self::Done),
            other => Err(SharedError::validation(
                "category",
                format!("unknown category '{}'", other),
            )),
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: TaskId,
    /// Owner email
    pub user: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: TaskCategory,
    /// Manual sort position within the owner's list
    pub order: i64,
    /// Creation time, used for recency sort
    pub timestamp: DateTime<Utc>,
}

/// Create-task payload
///
/// `order` and `timestamp` are assigned by the server when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub user: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: TaskCategory,
    #[serde(default)]
    pub order: Option<i64>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewTask {
    pub fn validate(&self) -> Result<(), SharedError> {
        if self.user.trim().is_empty() {
            return Err(SharedError::validation("user", "owner email is required"));
        }
        Ok(())
    }
}

/// Partial task update; only present fields are merged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<TaskCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.order.is_none()
    }

    /// Merge into `task`, returning whether any field changed
    pub fn apply_to(&self, task: &mut Task) -> bool {
        let before = task.clone();
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = Some(description.clone());
        }
        if let Some(category) = self.category {
            task.category = category;
        }
        if let Some(order) = self.order {
            task.order = order;
        }
        *task != before
    }
}

/// Per-user list query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFilter {
    pub user: String,
    pub category: Option<TaskCategory>,
}

impl TaskFilter {
    pub fn for_user(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            category: None,
        }
    }

    pub fn with_category(mut self, category: Option<TaskCategory>) -> Self {
        self.category = category;
        self
    }

    pub fn matches(&self, task: &Task) -> bool {
        task.user == self.user && self.category.map_or(true, |c| task.category == c)
    }
}

/// Store acknowledgement of a field merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Store acknowledgement of a delete
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

/// One entry of a reorder request; only `_id` is read
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderEntry {
    #[serde(rename = "_id")]
    pub id: String,
}

/// `PUT /tasks/reorder` body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub new_order: Vec<ReorderEntry>,
}

impl ReorderRequest {
    /// Parse every identifier before anything is written.
    ///
    /// Fails on the first malformed or repeated entry, naming its position.
    pub fn parse_ids(&self) -> Result<Vec<TaskId>, SharedError> {
        let mut seen = HashSet::with_capacity(self.new_order.len());
        self.new_order
            .iter()
            .enumerate()
            .map(|(position, entry)| {
                let field = format!("newOrder[{}]._id", position);
                let id = TaskId::parse_field(&entry.id, &field)?;
                if !seen.insert(id) {
                    return Err(SharedError::validation(field, format!("'{}' appears more than once", entry.id)));
                }
                Ok(id)
            })
            .collect()
    }
}

/// `PUT /tasks/reorder` response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderResponse {
    pub success: bool,
    pub modified_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task() -> Task {
        Task {
            id: TaskId::new(),
            user: "a@x.com".to_string(),
            title: "T1".to_string(),
            description: None,
            category: TaskCategory::ToDo,
            order: 0,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_task_id_parse_rejects_garbage() {
        let err = "not-an-id".parse::<TaskId>().unwrap_err();
        assert!(err.to_string().contains("not-an-id"));
    }

    #[test]
    fn test_task_serializes_with_underscore_id() {
        let task = sample_task();
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["_id"], task.id.to_string());
        assert_eq!(json["category"], "To-Do");
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_category_accepts_aliases() {
        let c: TaskCategory = serde_json::from_str("\"Not Started\"").unwrap();
        assert_eq!(c, TaskCategory::ToDo);
        let c: TaskCategory = serde_json::from_str("\"In Progress\"").unwrap();
        assert_eq!(c, TaskCategory::InProgress);
    }

    #[test]
    fn test_category_from_query() {
        assert_eq!(TaskCategory::from_query(None).unwrap(), None);
        assert_eq!(TaskCategory::from_query(Some("all")).unwrap(), None);
        assert_eq!(
            TaskCategory::from_query(Some("inProgress")).unwrap(),
            Some(TaskCategory::InProgress)
        );
        assert_eq!(TaskCategory::from_query(Some("done")).unwrap(), Some(TaskCategory::Done));
        assert!(TaskCategory::from_query(Some("archived")).is_err());
    }

    #[test]
    fn test_patch_merges_only_present_fields() {
        let mut task = sample_task();
        let patch = TaskPatch {
            category: Some(TaskCategory::Done),
            ..Default::default()
        };
        assert!(patch.apply_to(&mut task));
        assert_eq!(task.category, TaskCategory::Done);
        assert_eq!(task.title, "T1");

        // Same value again is not a modification
        assert!(!patch.apply_to(&mut task));
    }

    #[test]
    fn test_reorder_parse_ids_is_all_or_nothing() {
        let good = TaskId::new().to_string();
        let request = ReorderRequest {
            new_order: vec![
                ReorderEntry { id: good },
                ReorderEntry { id: "bogus".to_string() },
            ],
        };
        let err = request.parse_ids().unwrap_err();
        assert!(err.to_string().contains("newOrder[1]._id"));
    }

    #[test]
    fn test_reorder_parse_ids_rejects_repeated_id() {
        let id = TaskId::new().to_string();
        let request = ReorderRequest {
            new_order: vec![
                ReorderEntry { id: id.clone() },
                ReorderEntry { id: TaskId::new().to_string() },
                ReorderEntry { id },
            ],
        };
        let err = request.parse_ids().unwrap_err();
        assert_eq!(err.field(), Some("newOrder[2]._id"));
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_reorder_request_ignores_extra_fields() {
        let id = TaskId::new();
        let body = serde_json::json!({
            "newOrder": [{ "_id": id.to_string(), "title": "ignored", "order": 7 }]
        });
        let request: ReorderRequest = serde_json::from_value(body).unwrap();
        assert_eq!(request.parse_ids().unwrap(), vec![id]);
    }

    #[test]
    fn test_new_task_requires_owner() {
        let task: NewTask =
            serde_json::from_value(serde_json::json!({ "user": " ", "category": "Done" })).unwrap();
        assert!(task.validate().is_err());
    }
}
