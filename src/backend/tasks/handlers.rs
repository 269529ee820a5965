//! HTTP handlers for `/tasks`
//!
//! `/tasks/{key}` is shared by three operations: `key` is the owner email for
//! GET and the task id for PUT and DELETE.

use axum::{extract::State, http::StatusCode, Json};
use futures_util::TryStreamExt;
use serde::Deserialize;

use crate::backend::error::{BackendError, ValidJson, ValidPath, ValidQuery};
use crate::backend::tasks::TaskService;
use crate::shared::task::{
    DeleteOutcome, NewTask, ReorderRequest, ReorderResponse, Task, TaskCategory, TaskFilter, TaskId,
    TaskPatch, UpdateOutcome,
};

/// POST /tasks
pub async fn create_task(
    State(service): State<TaskService>,
    ValidJson(new_task): ValidJson<NewTask>,
) -> Result<(StatusCode, Json<Task>), BackendError> {
    let task = service.create(new_task).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// Query parameters for listing tasks
#[derive(Debug, Deserialize)]
pub struct ListTasksParams {
    pub category: Option<String>,
}

/// GET /tasks/{email}?category=inProgress|done
pub async fn list_tasks(
    State(service): State<TaskService>,
    ValidPath(email): ValidPath<String>,
    ValidQuery(params): ValidQuery<ListTasksParams>,
) -> Result<Json<Vec<Task>>, BackendError> {
    let category = TaskCategory::from_query(params.category.as_deref())?;
    let filter = TaskFilter::for_user(email).with_category(category);

    let tasks: Vec<Task> = service.list(filter).try_collect().await?;
    tracing::debug!("[Tasks] Listed {} tasks", tasks.len());
    Ok(Json(tasks))
}

/// PUT /tasks/{id}
pub async fn update_task(
    State(service): State<TaskService>,
    ValidPath(id): ValidPath<String>,
    ValidJson(patch): ValidJson<TaskPatch>,
) -> Result<Json<UpdateOutcome>, BackendError> {
    let id = TaskId::parse_field(&id, "id")?;
    Ok(Json(service.update(id, &patch).await?))
}

/// DELETE /tasks/{id}
pub async fn delete_task(
    State(service): State<TaskService>,
    ValidPath(id): ValidPath<String>,
) -> Result<Json<DeleteOutcome>, BackendError> {
    let id = TaskId::parse_field(&id, "id")?;
    Ok(Json(service.delete(id).await?))
}

/// PUT /tasks/reorder
pub async fn reorder_tasks(
    State(service): State<TaskService>,
    ValidJson(request): ValidJson<ReorderRequest>,
) -> Result<Json<ReorderResponse>, BackendError> {
    Ok(Json(service.reorder(&request).await?))
}
