/**
 * Live-Update Event System
 *
 * `ChangeEvent` is what the task service emits after a successful write.
 * `LiveMessage` is the envelope actually written to a live subscriber: every
 * change event plus the per-connection acknowledgement and diagnostic echo.
 *
 * On the wire every message is `{ "type": <kind>, "data": <payload> }`.
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::task::{Task, TaskId};

/// Kind of task mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
    Reordered,
}

/// A task mutation that has already been persisted
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    Created(Task),
    Updated(Task),
    /// Emitted even when nothing was removed
    Deleted(TaskId),
    /// New order, first id is position 0
    Reordered(Vec<TaskId>),
}

impl ChangeEvent {
    pub fn kind(&self) -> ChangeKind {
        match self {
            Self::Created(_) => ChangeKind::Created,
            Self::Updated(_) => ChangeKind::Updated,
            Self::Deleted(_) => ChangeKind::Deleted,
            Self::Reordered(_) => ChangeKind::Reordered,
        }
    }
}

/// Payload of the acknowledgement sent to a subscriber right after it connects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionAck {
    pub subscriber_id: Uuid,
    pub message: String,
}

/// Message delivered over the live channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum LiveMessage {
    Connected(ConnectionAck),
    TaskCreated(Task),
    TaskUpdated(Task),
    TaskDeleted(TaskId),
    TasksReordered(Vec<TaskId>),
    Echo(serde_json::Value),
}

impl LiveMessage {
    pub fn connected(subscriber_id: Uuid) -> Self {
        Self::Connected(ConnectionAck {
            subscriber_id,
            message: "connected to task updates".to_string(),
        })
    }

    /// The `type` tag, also used as the SSE event name
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Connected(_) => "connected",
            Self::TaskCreated(_) => "taskCreated",
            Self::TaskUpdated(_) => "taskUpdated",
            Self::TaskDeleted(_) => "taskDeleted",
            Self::TasksReordered(_) => "tasksReordered",
            Self::Echo(_) => "echo",
        }
    }
}

impl From<ChangeEvent> for LiveMessage {
    fn from(event: ChangeEvent) -> Self {
        match event {
            ChangeEvent::Created(task) => Self::TaskCreated(task),
            ChangeEvent::Updated(task) => Self::TaskUpdated(task),
            ChangeEvent::Deleted(id) => Self::TaskDeleted(id),
            ChangeEvent::Reordered(ids) => Self::TasksReordered(ids),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::task::TaskCategory;

    fn task() -> Task {
        Task {
            id: TaskId::new(),
            user: "a@x.com".to_string(),
            title: "T1".to_string(),
            description: None,
            category: TaskCategory::InProgress,
            order: 0,
            timestamp: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_created_wire_shape() {
        let task = task();
        let json = serde_json::to_value(LiveMessage::from(ChangeEvent::Created(task.clone()))).unwrap();
        assert_eq!(json["type"], "taskCreated");
        assert_eq!(json["data"]["title"], "T1");
        assert_eq!(json["data"]["_id"], task.id.to_string());
    }

    #[test]
    fn test_deleted_carries_bare_id() {
        let id = TaskId::new();
        let json = serde_json::to_value(LiveMessage::from(ChangeEvent::Deleted(id))).unwrap();
        assert_eq!(json["type"], "taskDeleted");
        assert_eq!(json["data"], id.to_string());
    }

    #[test]
    fn test_type_name_matches_serde_tag() {
        let messages = vec![
            LiveMessage::connected(Uuid::new_v4()),
            LiveMessage::TaskUpdated(task()),
            LiveMessage::TasksReordered(vec![TaskId::new()]),
            LiveMessage::Echo(serde_json::json!("ping")),
        ];
        for message in messages {
            let json = serde_json::to_value(&message).unwrap();
            assert_eq!(json["type"], message.type_name());
        }
    }

    #[test]
    fn test_change_kind() {
        assert_eq!(ChangeEvent::Deleted(TaskId::new()).kind(), ChangeKind::Deleted);
        assert_eq!(ChangeEvent::Reordered(vec![]).kind(), ChangeKind::Reordered);
    }
}
