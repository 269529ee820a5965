//! Persistence Gateway
//!
//! The task service and the user handlers talk to storage only through the
//! `TaskStore` and `UserStore` traits. Two implementations ship:
//!
//! - **`memory`** - `RwLock`-guarded maps, used when no database is configured
//!   and throughout the tests
//! - **`postgres`** - sqlx/PostgreSQL with embedded migrations
//!
//! Every call made by request handling goes through [`bounded`], which turns
//! an expired deadline into `StoreError::Timeout`.

use async_trait::async_trait;
use futures_util::Stream;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

use crate::shared::task::{DeleteOutcome, Task, TaskFilter, TaskId, TaskPatch, NewTask, UpdateOutcome};
use crate::shared::user::User;

/// In-memory store
pub mod memory;

/// PostgreSQL store
pub mod postgres;

pub use memory::{MemoryTaskStore, MemoryUserStore};
pub use postgres::{PgTaskStore, PgUserStore};

/// Lazy, finite, single-pass sequence of tasks
pub type TaskStream = Pin<Box<dyn Stream<Item = Result<Task, StoreError>> + Send>>;

/// Storage failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("stored record could not be decoded: {0}")]
    Decode(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Task collection
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Persist a new task, assigning id, order and timestamp where absent
    async fn insert(&self, task: NewTask) -> Result<Task, StoreError>;

    async fn find(&self, id: TaskId) -> Result<Option<Task>, StoreError>;

    /// Matching tasks, newest first
    fn list(&self, filter: TaskFilter) -> TaskStream;

    /// Field-level merge
    async fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<UpdateOutcome, StoreError>;

    async fn delete(&self, id: TaskId) -> Result<DeleteOutcome, StoreError>;

    /// Set `order = position` for every id; returns how many records changed
    async fn reorder(&self, ids: &[TaskId]) -> Result<u64, StoreError>;
}

/// Result of a create-if-missing user write
#[derive(Debug, Clone, PartialEq)]
pub enum UserInsert {
    Created(User),
    Existing(User),
}

impl UserInsert {
    pub fn into_user(self) -> User {
        match self {
            Self::Created(user) | Self::Existing(user) => user,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// User collection
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert unless a user with the same email exists; atomic per email
    async fn insert_if_absent(&self, user: User) -> Result<UserInsert, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}

/// Run a store call with a deadline
pub async fn bounded<T, F>(limit: Duration, operation: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_bounded_times_out() {
        let result: Result<(), StoreError> = bounded(Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(StoreError::Timeout(d)) if d == Duration::from_millis(50)));
    }

    #[tokio::test]
    async fn test_bounded_passes_through() {
        let result = bounded(Duration::from_secs(1), async { Ok::<_, StoreError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
