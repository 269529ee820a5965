//! In-memory task and user stores
//!
//! Each store keeps one map behind a `tokio::sync::RwLock`. `list` snapshots
//! the matching tasks when first polled. Writes that must
//! be atomic (create-if-missing users, bulk reorder) happen under a single
//! write guard.

use async_trait::async_trait;
use chrono::Utc;
use futures_util::{stream, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::backend::store::{StoreError, TaskStore, TaskStream, UserInsert, UserStore};
use crate::shared::task::{DeleteOutcome, NewTask, Task, TaskFilter, TaskId, TaskPatch, UpdateOutcome};
use crate::shared::user::User;

#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    tasks: Arc<RwLock<HashMap<TaskId, Task>>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn insert(&self, new_task: NewTask) -> Result<Task, StoreError> {
        let mut tasks = self.tasks.write().await;

        let order = new_task.order.unwrap_or_else(|| {
            tasks
                .values()
                .filter(|t| t.user == new_task.user)
                .map(|t| t.order + 1)
                .max()
                .unwrap_or(0)
        });

        let task = Task {
            id: TaskId::new(),
            user: new_task.user,
            title: new_task.title,
            description: new_task.description,
            category: new_task.category,
            order,
            timestamp: new_task.timestamp.unwrap_or_else(Utc::now),
        };
        tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn find(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
        Ok(self.tasks.read().await.get(&id).cloned())
    }

    fn list(&self, filter: TaskFilter) -> TaskStream {
        let tasks = Arc::clone(&self.tasks);
        let snapshot = async move {
            let mut matching: Vec<Task> = tasks
                .read()
                .await
                .values()
                .filter(|t| filter.matches(t))
                .cloned()
                .collect();
            matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
            stream::iter(matching.into_iter().map(Ok))
        };
        Box::pin(stream::once(snapshot).flatten())
    }

    async fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<UpdateOutcome, StoreError> {
        let mut tasks = self.tasks.write().await;
        let outcome = match tasks.get_mut(&id) {
            Some(task) => UpdateOutcome {
                acknowledged: true,
                matched_count: 1,
                modified_count: u64::from(patch.apply_to(task)),
            },
            None => UpdateOutcome {
                acknowledged: true,
                ..Default::default()
            },
        };
        Ok(outcome)
    }

    async fn delete(&self, id: TaskId) -> Result<DeleteOutcome, StoreError> {
        let removed = self.tasks.write().await.remove(&id);
        Ok(DeleteOutcome {
            acknowledged: true,
            deleted_count: u64::from(removed.is_some()),
        })
    }

    async fn reorder(&self, ids: &[TaskId]) -> Result<u64, StoreError> {
        let mut tasks = self.tasks.write().await;
        let mut modified = 0;
        for (position, id) in ids.iter().enumerate() {
            let position = position as i64;
            if let Some(task) = tasks.get_mut(id) {
                if task.order != position {
                    task.order = position;
                    modified += 1;
                }
            }
        }
        Ok(modified)
    }
}

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert_if_absent(&self, user: User) -> Result<UserInsert, StoreError> {
        let mut users = self.users.write().await;
        if let Some(existing) = users.get(&user.email) {
            return Ok(UserInsert::Existing(existing.clone()));
        }
        users.insert(user.email.clone(), user.clone());
        Ok(UserInsert::Created(user))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(email).cloned())
    }
}
