/**
 * PostgreSQL Stores
 *
 * sqlx-backed implementations of the persistence traits.
 *
 * # Tables
 *
 * - `tasks` - one row per task, `sort_order` holds the manual position
 * - `users` - keyed by `email` (unique), free-form profile kept as JSONB
 *
 * Listing pages through `tasks` with a keyset cursor on
 * `(created_at, id)` so rows are fetched only as the caller pulls them.
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::stream;
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::PgPool;
use std::collections::VecDeque;
use uuid::Uuid;

use crate::backend::store::{StoreError, TaskStore, TaskStream, UserInsert, UserStore};
use crate::shared::task::{
    DeleteOutcome, NewTask, Task, TaskCategory, TaskFilter, TaskId, TaskPatch, UpdateOutcome,
};
use crate::shared::user::{User, UserRole};

const TASK_COLUMNS: &str = "id, user_email, title, description, category, sort_order, created_at";

/// Rows fetched per round trip while listing
const DEFAULT_PAGE_SIZE: i64 = 100;

/// Raw `tasks` row
#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: Uuid,
    user_email: String,
    title: String,
    description: Option<String>,
    category: String,
    sort_order: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = StoreError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let category = row
            .category
            .parse::<TaskCategory>()
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(Task {
            id: TaskId::from(row.id),
            user: row.user_email,
            title: row.title,
            description: row.description,
            category,
            order: row.sort_order,
            timestamp: row.created_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PgTaskStore {
    pool: PgPool,
    page_size: i64,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}

/// Cursor state for a paged listing
struct Pager {
    pool: PgPool,
    filter: TaskFilter,
    page_size: i64,
    after: Option<(DateTime<Utc>, Uuid)>,
    buffer: VecDeque<TaskRow>,
    exhausted: bool,
}

impl Pager {
    async fn fetch_page(&mut self) -> Result<(), StoreError> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE user_email = $1
              AND ($2::text IS NULL OR category = $2)
              AND ($3::timestamptz IS NULL OR (created_at, id) < ($3::timestamptz, $4::uuid))
            ORDER BY created_at DESC, id DESC
            LIMIT $5
            "#
        ))
        .bind(&self.filter.user)
        .bind(self.filter.category.map(|c| c.as_str()))
        .bind(self.after.map(|(created_at, _)| created_at))
        .bind(self.after.map(|(_, id)| id))
        .bind(self.page_size)
        .fetch_all(&self.pool)
        .await?;

        if (rows.len() as i64) < self.page_size {
            self.exhausted = true;
        }
        if let Some(last) = rows.last() {
            self.after = Some((last.created_at, last.id));
        }
        self.buffer.extend(rows);
        Ok(())
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn insert(&self, task: NewTask) -> Result<Task, StoreError> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            INSERT INTO tasks (id, user_email, title, description, category, sort_order, created_at)
            VALUES (
                $1, $2, $3, $4, $5,
                COALESCE($6, (SELECT COALESCE(MAX(sort_order) + 1, 0) FROM tasks WHERE user_email = $2)),
                $7
            )
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(TaskId::new().as_uuid())
        .bind(&task.user)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.category.as_str())
        .bind(task.order)
        .bind(task.timestamp.unwrap_or_else(Utc::now))
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn find(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
        let row = sqlx::query_as::<_, TaskRow>(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Task::try_from).transpose()
    }

    fn list(&self, filter: TaskFilter) -> TaskStream {
        let pager = Pager {
            pool: self.pool.clone(),
            filter,
            page_size: self.page_size,
            after: None,
            buffer: VecDeque::new(),
            exhausted: false,
        };

        Box::pin(stream::unfold(pager, |mut pager| async move {
            loop {
                if let Some(row) = pager.buffer.pop_front() {
                    return Some((Task::try_from(row), pager));
                }
                if pager.exhausted {
                    return None;
                }
                if let Err(e) = pager.fetch_page().await {
                    pager.exhausted = true;
                    return Some((Err(e), pager));
                }
            }
        }))
    }

    async fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<UpdateOutcome, StoreError> {
        let (matched, modified) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            WITH target AS (
                SELECT id FROM tasks WHERE id = $1
            ),
            changed AS (
                UPDATE tasks SET
                    title = COALESCE($2, title),
                    description = COALESCE($3, description),
                    category = COALESCE($4, category),
                    sort_order = COALESCE($5, sort_order)
                WHERE id = $1
                  AND (
                      COALESCE($2, title) IS DISTINCT FROM title
                      OR COALESCE($3, description) IS DISTINCT FROM description
                      OR COALESCE($4, category) IS DISTINCT FROM category
                      OR COALESCE($5, sort_order) IS DISTINCT FROM sort_order
                  )
                RETURNING id
            )
            SELECT (SELECT COUNT(*) FROM target), (SELECT COUNT(*) FROM changed)
            "#,
        )
        .bind(id.as_uuid())
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(patch.category.map(|c| c.as_str()))
        .bind(patch.order)
        .fetch_one(&self.pool)
        .await?;

        Ok(UpdateOutcome {
            acknowledged: true,
            matched_count: matched as u64,
            modified_count: modified as u64,
        })
    }

    async fn delete(&self, id: TaskId) -> Result<DeleteOutcome, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(DeleteOutcome {
            acknowledged: true,
            deleted_count: result.rows_affected(),
        })
    }

    async fn reorder(&self, ids: &[TaskId]) -> Result<u64, StoreError> {
        let uuids: Vec<Uuid> = ids.iter().map(TaskId::as_uuid).collect();
        let positions: Vec<i64> = (0..ids.len() as i64).collect();

        let result = sqlx::query(
            r#"
            UPDATE tasks AS t
            SET sort_order = v.position
            FROM UNNEST($1::uuid[], $2::bigint[]) AS v(id, position)
            WHERE t.id = v.id AND t.sort_order IS DISTINCT FROM v.position
            "#,
        )
        .bind(&uuids)
        .bind(&positions)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

/// Raw `users` row
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    email: String,
    role: Option<String>,
    profile: Json<Map<String, Value>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            email: row.email,
            role: row.role.as_deref().and_then(UserRole::parse),
            profile: row.profile.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert_if_absent(&self, user: User) -> Result<UserInsert, StoreError> {
        let inserted = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (email, role, profile)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO NOTHING
            RETURNING email, role, profile
            "#,
        )
        .bind(&user.email)
        .bind(user.role.map(|r| r.as_str()))
        .bind(Json(&user.profile))
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = inserted {
            return Ok(UserInsert::Created(row.into()));
        }

        match self.find_by_email(&user.email).await? {
            Some(existing) => Ok(UserInsert::Existing(existing)),
            None => Err(StoreError::Unavailable(format!(
                "user {} conflicted on insert but could not be read back",
                user.email
            ))),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT email, role, profile FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(User::from))
    }
}
