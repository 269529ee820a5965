/**
 * Route Table
 *
 * Every HTTP route the server exposes, in one place, together with whether
 * it requires a verified session. The router reads this table; nothing else
 * decides authentication.
 *
 * # Routes
 *
 * | Route          | Method | Path                  | Session            |
 * |----------------|--------|-----------------------|--------------------|
 * | CreateTask     | POST   | /tasks                | `create_task`      |
 * | ListTasks      | GET    | /tasks/{key}          | `list_tasks`       |
 * | UpdateTask     | PUT    | /tasks/{key}          | `update_task`      |
 * | DeleteTask     | DELETE | /tasks/{key}          | `delete_task`      |
 * | ReorderTasks   | PUT    | /tasks/reorder        | `reorder_tasks`    |
 * | CreateUser     | POST   | /users                | `create_user`      |
 * | UserRole       | GET    | /users/role/{email}   | `user_role`        |
 * | IssueToken     | POST   | /jwt                  | never              |
 * | Logout         | POST   | /logout               | never              |
 * | LiveSocket     | GET    | /ws                   | `live_updates`     |
 * | LiveEvents     | GET    | /events               | `live_updates`     |
 */

use axum::routing::{delete, get, post, put, MethodRouter};

use crate::backend::auth::{create_user, issue_token, logout, user_role};
use crate::backend::realtime::{handle_live_events, handle_live_socket};
use crate::backend::server::state::AppState;
use crate::backend::tasks::handlers::{create_task, delete_task, list_tasks, reorder_tasks, update_task};
use crate::shared::RouteAuthTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteId {
    CreateTask,
    ListTasks,
    UpdateTask,
    DeleteTask,
    ReorderTasks,
    CreateUser,
    UserRole,
    IssueToken,
    Logout,
    LiveSocket,
    LiveEvents,
}

impl RouteId {
    pub const ALL: [RouteId; 11] = [
        RouteId::CreateTask,
        RouteId::ListTasks,
        RouteId::UpdateTask,
        RouteId::DeleteTask,
        RouteId::ReorderTasks,
        RouteId::CreateUser,
        RouteId::UserRole,
        RouteId::IssueToken,
        RouteId::Logout,
        RouteId::LiveSocket,
        RouteId::LiveEvents,
    ];

    /// axum path; `/tasks/{key}` is the owner email for GET and the task id otherwise
    pub fn path(self) -> &'static str {
        match self {
            RouteId::CreateTask => "/tasks",
            RouteId::ListTasks | RouteId::UpdateTask | RouteId::DeleteTask => "/tasks/{key}",
            RouteId::ReorderTasks => "/tasks/reorder",
            RouteId::CreateUser => "/users",
            RouteId::UserRole => "/users/role/{email}",
            RouteId::IssueToken => "/jwt",
            RouteId::Logout => "/logout",
            RouteId::LiveSocket => "/ws",
            RouteId::LiveEvents => "/events",
        }
    }

    pub fn method_router(self) -> MethodRouter<AppState> {
        match self {
            RouteId::CreateTask => post(create_task),
            RouteId::ListTasks => get(list_tasks),
            RouteId::UpdateTask => put(update_task),
            RouteId::DeleteTask => delete(delete_task),
            RouteId::ReorderTasks => put(reorder_tasks),
            RouteId::CreateUser => post(create_user),
            RouteId::UserRole => get(user_role),
            RouteId::IssueToken => post(issue_token),
            RouteId::Logout => post(logout),
            RouteId::LiveSocket => get(handle_live_socket),
            RouteId::LiveEvents => get(handle_live_events),
        }
    }

    pub fn requires_auth(self, table: &RouteAuthTable) -> bool {
        match self {
            RouteId::CreateTask => table.create_task,
            RouteId::ListTasks => table.list_tasks,
            RouteId::UpdateTask => table.update_task,
            RouteId::DeleteTask => table.delete_task,
            RouteId::ReorderTasks => table.reorder_tasks,
            RouteId::CreateUser => table.create_user,
            RouteId::UserRole => table.user_role,
            RouteId::IssueToken | RouteId::Logout => false,
            RouteId::LiveSocket | RouteId::LiveEvents => table.live_updates,
        }
    }
}
