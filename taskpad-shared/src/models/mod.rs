/// Database models for Taskpad
///
/// Each model owns its SQL. Anything that reads or writes a task takes the
/// owning user's id as an explicit argument and filters on it in the query
/// itself, so a caller cannot fetch another user's rows by accident.
///
/// # Models
///
/// - `user`: Registered accounts
/// - `task`: Tasks, their filters and owner-scoped CRUD
/// - `access_token`: Opaque bearer tokens issued at login
/// - `pagination`: Page request/response types used by list queries
///
/// # Example
///
/// ```no_run
/// use taskpad_shared::models::pagination::PageRequest;
/// use taskpad_shared::models::task::{Task, TaskFilters};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let page = Task::list_by_owner(&pool, user_id, &TaskFilters::default(), PageRequest::default()).await?;
/// println!("{} of {} tasks", page.data.len(), page.total);
/// # Ok(())
/// # }
/// ```

pub mod access_token;
pub mod pagination;
pub mod task;
pub mod user;
