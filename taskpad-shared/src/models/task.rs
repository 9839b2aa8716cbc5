/// Task model and owner-scoped database operations
///
/// Every function here that touches an existing task takes both the task id
/// and the owner's user id and puts `user_id = $owner` in the SQL. A task
/// belonging to someone else is indistinguishable from one that does not
/// exist: both come back as `None` / `false`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     due_date DATE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskpad_shared::models::task::{CreateTask, Task, UpdateTask};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, owner: Uuid) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, owner, CreateTask::titled("Write report")).await?;
///
/// let done = UpdateTask { completed: Some(true), ..Default::default() };
/// Task::update_for_owner(&pool, task.id, owner, done).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::pagination::{Page, PageRequest};

const TASK_COLUMNS: &str =
    "id, user_id, title, description, completed, due_date, created_at, updated_at";

/// A task owned by exactly one user
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    pub title: String,

    pub description: Option<String>,

    pub completed: bool,

    /// Calendar date, serialized as `YYYY-MM-DD`
    pub due_date: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task. The owner is passed separately.
#[derive(Debug, Clone, Default)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub due_date: Option<NaiveDate>,
}

impl CreateTask {
    /// A pending task with only a title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Partial update. `None` leaves a column untouched; for the nullable
/// columns `Some(None)` clears the value.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    pub due_date: Option<Option<NaiveDate>>,
}

/// Columns a task list may be explicitly ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    DueDate,
    CreatedAt,
}

impl SortField {
    /// Parses the `sort` query value; anything unrecognized yields `None`
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "due_date" => Some(SortField::DueDate),
            "created_at" => Some(SortField::CreatedAt),
            _ => None,
        }
    }

    fn column(&self) -> &'static str {
        match self {
            SortField::DueDate => "due_date",
            SortField::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// `asc` selects ascending; everything else, including absence, is descending
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("asc") => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }

    fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Filters and ordering for [`Task::list_by_owner`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilters {
    /// Only tasks with this completion state
    pub completed: Option<bool>,

    /// Case-insensitive substring of the title
    pub title: Option<String>,

    /// Explicit ordering; `None` keeps insertion order
    pub sort: Option<(SortField, SortDirection)>,
}

impl TaskFilters {
    /// Builds filters from raw query-string values
    ///
    /// Blank strings count as absent. An unknown `sort` is ignored rather
    /// than rejected, and then `dir` has no effect.
    pub fn from_params(
        completed: Option<&str>,
        title: Option<&str>,
        sort: Option<&str>,
        dir: Option<&str>,
    ) -> Self {
        fn filled(value: Option<&str>) -> Option<&str> {
            value.filter(|s| !s.trim().is_empty())
        }

        Self {
            completed: filled(completed).map(parse_bool_flag),
            title: filled(title).map(str::to_string),
            sort: filled(sort)
                .and_then(SortField::parse)
                .map(|field| (field, SortDirection::parse(dir))),
        }
    }
}

/// Lenient boolean parsing for query strings: `1`, `true`, `on` and `yes`
/// (any case) are true, everything else is false.
pub fn parse_bool_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}

/// Escapes `LIKE` metacharacters so user input matches literally
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_owner_filters<'a>(
    builder: &mut QueryBuilder<'a, Postgres>,
    user_id: Uuid,
    filters: &TaskFilters,
) {
    builder.push(" WHERE user_id = ").push_bind(user_id);

    if let Some(completed) = filters.completed {
        builder.push(" AND completed = ").push_bind(completed);
    }
    match filters.title {
        // Stored titles never contain NUL, and Postgres rejects it as a parameter
        Some(ref title) if title.contains('\0') => {
            builder.push(" AND FALSE");
        }
        Some(ref title) => {
            builder
                .push(" AND title ILIKE ")
                .push_bind(format!("%{}%", escape_like(title)));
        }
        None => {}
    }
}

fn order_clause(sort: Option<(SortField, SortDirection)>) -> String {
    match sort {
        None => " ORDER BY created_at ASC, id ASC".to_string(),
        Some((field @ SortField::DueDate, dir)) => format!(
            " ORDER BY {} {} NULLS LAST, id {}",
            field.column(),
            dir.keyword(),
            dir.keyword()
        ),
        Some((field, dir)) => format!(
            " ORDER BY {} {}, id {}",
            field.column(),
            dir.keyword(),
            dir.keyword()
        ),
    }
}

impl Task {
    /// Creates a task owned by `user_id`
    ///
    /// Accepts any executor so a batch can share one transaction.
    pub async fn create<'e, E>(executor: E, user_id: Uuid, data: CreateTask) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (user_id, title, description, completed, due_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.completed)
        .bind(data.due_date)
        .fetch_one(executor)
        .await?;

        Ok(task)
    }

    /// Creates several tasks for one owner atomically
    ///
    /// Either every task is inserted or none is.
    pub async fn create_many(
        pool: &PgPool,
        user_id: Uuid,
        items: Vec<CreateTask>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut created = Vec::with_capacity(items.len());

        for item in items {
            created.push(Self::create(&mut *tx, user_id, item).await?);
        }

        tx.commit().await?;
        Ok(created)
    }

    /// Finds a task by id, only if `user_id` owns it
    pub async fn find_for_owner(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Applies a partial update to a task owned by `user_id`
    ///
    /// Returns `None` when the task does not exist or belongs to someone
    /// else. `updated_at` is always refreshed, even for an empty update.
    pub async fn update_for_owner(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        // $1 = id, $2 = owner; optional columns follow in a fixed order
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.completed.is_some() {
            bind_count += 1;
            query.push_str(&format!(", completed = ${}", bind_count));
        }
        if data.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND user_id = $2 RETURNING {TASK_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id).bind(user_id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(completed) = data.completed {
            q = q.bind(completed);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Deletes a task owned by `user_id`; `false` if nothing matched
    pub async fn delete_for_owner(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists one page of `user_id`'s tasks matching `filters`
    pub async fn list_by_owner(
        pool: &PgPool,
        user_id: Uuid,
        filters: &TaskFilters,
        page: PageRequest,
    ) -> Result<Page<Self>, sqlx::Error> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tasks");
        push_owner_filters(&mut count, user_id, filters);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {TASK_COLUMNS} FROM tasks"));
        push_owner_filters(&mut select, user_id, filters);
        select.push(order_clause(filters.sort));
        select
            .push(" LIMIT ")
            .push_bind(page.per_page)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let tasks = select.build_query_as::<Task>().fetch_all(pool).await?;

        Ok(Page::new(tasks, page, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_flag() {
        for truthy in ["1", "true", "TRUE", "on", "yes", " Yes "] {
            assert!(parse_bool_flag(truthy), "{truthy} should be true");
        }
        for falsy in ["0", "false", "off", "no", "maybe", ""] {
            assert!(!parse_bool_flag(falsy), "{falsy} should be false");
        }
    }

    #[test]
    fn test_filters_from_params() {
        let filters = TaskFilters::from_params(Some("true"), Some("report"), Some("due_date"), Some("asc"));
        assert_eq!(filters.completed, Some(true));
        assert_eq!(filters.title.as_deref(), Some("report"));
        assert_eq!(filters.sort, Some((SortField::DueDate, SortDirection::Asc)));
    }

    #[test]
    fn test_blank_params_are_absent() {
        let filters = TaskFilters::from_params(Some(""), Some(""), Some(""), Some(""));
        assert_eq!(filters, TaskFilters::default());

        let filters = TaskFilters::from_params(Some(" "), Some("  "), Some("\t"), None);
        assert_eq!(filters, TaskFilters::default());
    }

    #[test]
    fn test_title_filter_keeps_inner_spaces() {
        let filters = TaskFilters::from_params(None, Some(" pay rent"), None, None);
        assert_eq!(filters.title.as_deref(), Some(" pay rent"));
    }

    #[test]
    fn test_nul_title_filter_matches_nothing() {
        let filters = TaskFilters::from_params(None, Some("a\0b"), None, None);
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tasks");
        push_owner_filters(&mut builder, Uuid::new_v4(), &filters);

        assert!(builder.sql().ends_with(" AND FALSE"));
        assert!(!builder.sql().contains("ILIKE"));
    }

    #[test]
    fn test_unknown_sort_is_ignored() {
        let filters = TaskFilters::from_params(None, None, Some("title; DROP TABLE tasks"), Some("asc"));
        assert_eq!(filters.sort, None);
        assert_eq!(order_clause(filters.sort), " ORDER BY created_at ASC, id ASC");
    }

    #[test]
    fn test_direction_defaults_to_desc() {
        assert_eq!(SortDirection::parse(None), SortDirection::Desc);
        assert_eq!(SortDirection::parse(Some("ASC")), SortDirection::Desc);
        assert_eq!(SortDirection::parse(Some("sideways")), SortDirection::Desc);
        assert_eq!(SortDirection::parse(Some("asc")), SortDirection::Asc);
    }

    #[test]
    fn test_order_clause() {
        assert_eq!(
            order_clause(Some((SortField::CreatedAt, SortDirection::Desc))),
            " ORDER BY created_at DESC, id DESC"
        );
        assert_eq!(
            order_clause(Some((SortField::DueDate, SortDirection::Asc))),
            " ORDER BY due_date ASC NULLS LAST, id ASC"
        );
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_task_serializes_due_date_as_plain_date() {
        let task = Task {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "File taxes".to_string(),
            description: None,
            completed: false,
            due_date: NaiveDate::from_ymd_opt(2025, 12, 31),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["due_date"], "2025-12-31");
        assert_eq!(json["completed"], false);
        assert!(json["description"].is_null());
    }
}
