/**
 * Task Mutation Service
 *
 * Owns the task CRUD contract. Every operation goes to the store through a
 * deadline; every successful write is followed by exactly one change event
 * handed to the Broadcast Hub.
 *
 * # Event Rules
 *
 * - create: re-read the inserted record, emit `Created` with it
 * - update: re-read after the merge, emit `Updated` only if the record is
 *   still there
 * - delete: always emit `Deleted`, even when nothing was removed
 * - reorder: emit `Reordered` with the requested ids once the bulk write
 *   returns
 *
 * Nothing is emitted when the store call fails or times out. Broadcasting
 * never fails the operation.
 */

use futures_util::{stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;

use crate::backend::error::BackendError;
use crate::backend::realtime::BroadcastHub;
use crate::backend::store::{bounded, StoreError, TaskStore, TaskStream};
use crate::shared::event::ChangeEvent;
use crate::shared::task::{
    DeleteOutcome, NewTask, ReorderRequest, ReorderResponse, Task, TaskFilter, TaskId, TaskPatch,
    UpdateOutcome,
};

#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
    hub: BroadcastHub,
    timeout: Duration,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>, hub: BroadcastHub, timeout: Duration) -> Self {
        Self { store, hub, timeout }
    }

    pub fn hub(&self) -> &BroadcastHub {
        &self.hub
    }

    pub async fn create(&self, new_task: NewTask) -> Result<Task, BackendError> {
        new_task.validate()?;

        let inserted = bounded(self.timeout, self.store.insert(new_task)).await?;
        tracing::info!("[Tasks] Created task {} for {}", inserted.id, inserted.user);

        match bounded(self.timeout, self.store.find(inserted.id)).await? {
            Some(task) => {
                self.emit(ChangeEvent::Created(task.clone()));
                Ok(task)
            }
            None => {
                let err = BackendError::consistency(format!("task {} not found after insert", inserted.id));
                tracing::warn!("[Tasks] {}", err);
                Ok(inserted)
            }
        }
    }

    /// Tasks for one user, newest first.
    ///
    /// Each pull from the store gets its own deadline; a timeout ends the
    /// stream after yielding the error.
    pub fn list(&self, filter: TaskFilter) -> TaskStream {
        let limit = self.timeout;
        let inner = self.store.list(filter);

        Box::pin(stream::unfold(Some(inner), move |state| async move {
            let mut inner = state?;
            match tokio::time::timeout(limit, inner.next()).await {
                Ok(Some(Ok(task))) => Some((Ok(task), Some(inner))),
                Ok(Some(Err(e))) => Some((Err(e), None)),
                Ok(None) => None,
                Err(_) => Some((Err(StoreError::Timeout(limit)), None)),
            }
        }))
    }

    pub async fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<UpdateOutcome, BackendError> {
        if patch.is_empty() {
            return Err(BackendError::validation("body", "no updatable fields supplied"));
        }

        let outcome = bounded(self.timeout, self.store.update(id, patch)).await?;

        match bounded(self.timeout, self.store.find(id)).await? {
            Some(task) => self.emit(ChangeEvent::Updated(task)),
            None => {
                let err = BackendError::consistency(format!("task {} not found after update", id));
                tracing::warn!("[Tasks] {} (modified {})", err, outcome.modified_count);
            }
        }
        Ok(outcome)
    }

    pub async fn delete(&self, id: TaskId) -> Result<DeleteOutcome, BackendError> {
        let outcome = bounded(self.timeout, self.store.delete(id)).await?;
        if outcome.deleted_count == 0 {
            tracing::debug!("[Tasks] Delete of {} removed nothing", id);
        }
        self.emit(ChangeEvent::Deleted(id));
        Ok(outcome)
    }

    /// Validates every id before the first write
    pub async fn reorder(&self, request: &ReorderRequest) -> Result<ReorderResponse, BackendError> {
        let ids = request.parse_ids()?;
        if ids.is_empty() {
            return Ok(ReorderResponse {
                success: true,
                modified_count: 0,
            });
        }

        let modified = bounded(self.timeout, self.store.reorder(&ids)).await?;
        if modified < ids.len() as u64 {
            tracing::debug!("[Tasks] Reorder changed {} of {} tasks", modified, ids.len());
        }
        self.emit(ChangeEvent::Reordered(ids));

        Ok(ReorderResponse {
            success: true,
            modified_count: modified,
        })
    }

    fn emit(&self, event: ChangeEvent) {
        let kind = event.kind();
        let report = self.hub.broadcast(event);
        tracing::info!(
            "[Realtime] {:?} event broadcast to {} subscribers",
            kind,
            report.delivered + report.dropped_oldest
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::store::MemoryTaskStore;
    use crate::shared::config::HubConfig;
    use crate::shared::event::LiveMessage;
    use crate::shared::task::{ReorderEntry, TaskCategory};
    use futures_util::TryStreamExt;
    use pretty_assertions::assert_eq;

    fn service() -> (TaskService, Arc<MemoryTaskStore>) {
        let store = Arc::new(MemoryTaskStore::new());
        let hub = BroadcastHub::new(HubConfig::default());
        let service = TaskService::new(store.clone(), hub, Duration::from_secs(1));
        (service, store)
    }

    fn new_task(title: &str, category: TaskCategory) -> NewTask {
        NewTask {
            user: "a@x.com".to_string(),
            title: title.to_string(),
            description: None,
            category,
            order: None,
            timestamp: None,
        }
    }

    async fn next_change(sub: &mut crate::backend::realtime::Subscription) -> LiveMessage {
        loop {
            let message = tokio::time::timeout(Duration::from_secs(1), sub.recv())
                .await
                .expect("no message")
                .expect("subscription closed");
            if !matches!(message, LiveMessage::Connected(_)) {
                return message;
            }
        }
    }

    #[tokio::test]
    async fn test_create_emits_full_record() {
        let (service, _) = service();
        let mut sub = service.hub().register();

        let task = service.create(new_task("T1", TaskCategory::InProgress)).await.unwrap();
        match next_change(&mut sub).await {
            LiveMessage::TaskCreated(sent) => assert_eq!(sent, task),
            other => panic!("Expected TaskCreated, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_missing_user() {
        let (service, store) = service();
        let mut task = new_task("T1", TaskCategory::ToDo);
        task.user = String::new();
        let err = service.create(task).await.unwrap_err();
        assert!(matches!(err, BackendError::Validation { .. }));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let (service, _) = service();
        let now = chrono::Utc::now();
        for (i, title) in ["first", "second", "third"].iter().enumerate() {
            let mut task = new_task(title, TaskCategory::ToDo);
            task.timestamp = Some(now + chrono::Duration::seconds(i as i64));
            service.create(task).await.unwrap();
        }

        let titles: Vec<String> = service
            .list(TaskFilter::for_user("a@x.com"))
            .map_ok(|t| t.title)
            .try_collect()
            .await
            .unwrap();
        assert_eq!(titles, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_update_emits_merged_record() {
        let (service, _) = service();
        let task = service.create(new_task("T1", TaskCategory::ToDo)).await.unwrap();
        let mut sub = service.hub().register();

        let patch = TaskPatch {
            category: Some(TaskCategory::Done),
            ..Default::default()
        };
        let outcome = service.update(task.id, &patch).await.unwrap();
        assert_eq!(outcome.modified_count, 1);

        match next_change(&mut sub).await {
            LiveMessage::TaskUpdated(sent) => {
                assert_eq!(sent.category, TaskCategory::Done);
                assert_eq!(sent.title, "T1");
            }
            other => panic!("Expected TaskUpdated, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_of_deleted_task_returns_zero_without_event() {
        let (service, _) = service();
        let task = service.create(new_task("T1", TaskCategory::ToDo)).await.unwrap();
        service.delete(task.id).await.unwrap();
        let mut sub = service.hub().register();

        let patch = TaskPatch {
            category: Some(TaskCategory::Done),
            ..Default::default()
        };
        let outcome = service.update(task.id, &patch).await.unwrap();
        assert_eq!(outcome.modified_count, 0);

        // Only the ack is queued
        assert!(matches!(sub.recv().await, Some(LiveMessage::Connected(_))));
        let pending = tokio::time::timeout(Duration::from_millis(20), sub.recv()).await;
        assert!(pending.is_err());
    }

    #[tokio::test]
    async fn test_empty_patch_is_rejected() {
        let (service, _) = service();
        let err = service.update(TaskId::new(), &TaskPatch::default()).await.unwrap_err();
        assert!(matches!(err, BackendError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_delete_missing_still_emits() {
        let (service, _) = service();
        let mut sub = service.hub().register();
        let id = TaskId::new();

        let outcome = service.delete(id).await.unwrap();
        assert_eq!(outcome.deleted_count, 0);
        assert_eq!(next_change(&mut sub).await, LiveMessage::TaskDeleted(id));
    }

    #[tokio::test]
    async fn test_reorder_with_bad_id_writes_nothing() {
        let (service, store) = service();
        let a = service.create(new_task("a", TaskCategory::ToDo)).await.unwrap();
        let b = service.create(new_task("b", TaskCategory::ToDo)).await.unwrap();

        let request = ReorderRequest {
            new_order: vec![
                ReorderEntry { id: b.id.to_string() },
                ReorderEntry { id: "not-an-id".to_string() },
                ReorderEntry { id: a.id.to_string() },
            ],
        };
        let err = service.reorder(&request).await.unwrap_err();
        assert!(matches!(err, BackendError::Validation { ref field, .. } if field == "newOrder[1]._id"));
        assert_eq!(store.find(a.id).await.unwrap().unwrap().order, 0);
        assert_eq!(store.find(b.id).await.unwrap().unwrap().order, 1);
    }

    #[tokio::test]
    async fn test_reorder_emits_new_order() {
        let (service, _) = service();
        let a = service.create(new_task("a", TaskCategory::ToDo)).await.unwrap();
        let b = service.create(new_task("b", TaskCategory::ToDo)).await.unwrap();
        let mut sub = service.hub().register();

        let request = ReorderRequest {
            new_order: vec![
                ReorderEntry { id: b.id.to_string() },
                ReorderEntry { id: a.id.to_string() },
            ],
        };
        let response = service.reorder(&request).await.unwrap();
        assert_eq!(response.modified_count, 2);
        assert_eq!(next_change(&mut sub).await, LiveMessage::TasksReordered(vec![b.id, a.id]));
    }
}
