/// Task endpoints
///
/// Every handler receives the caller's [`AuthContext`] and passes its user id
/// into the owner-scoped model functions. Another user's task is reported as
/// `404`, exactly like a task that does not exist.
///
/// # Endpoints
///
/// - `GET    /api/tasks` - Filtered, sorted, paginated list
/// - `POST   /api/tasks` - Create a task
/// - `GET    /api/tasks/:id` - Fetch one task
/// - `PUT    /api/tasks/:id` - Partial update
/// - `DELETE /api/tasks/:id` - Delete
/// - `POST   /api/tasks/generate-ai` - Generate tasks from a topic

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use taskpad_shared::{
    auth::middleware::AuthContext,
    models::{
        pagination::{Page, PageRequest},
        task::{CreateTask, Task, TaskFilters, UpdateTask},
    },
};
use uuid::Uuid;

/// Longest accepted title, in characters
pub const MAX_TITLE_LENGTH: usize = 255;

/// Longest accepted generation topic, in characters
pub const MAX_TOPIC_LENGTH: usize = 500;

/// Query string of the index endpoint; every value arrives as raw text
#[derive(Debug, Default, PartialEq, Eq)]
pub struct IndexParams {
    pub completed: Option<String>,
    pub title: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

impl IndexParams {
    /// Collects the recognized keys from decoded query pairs
    ///
    /// A repeated key keeps its last value; unknown keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "completed" => &mut params.completed,
                "title" => &mut params.title,
                "sort" => &mut params.sort,
                "dir" => &mut params.dir,
                "page" => &mut params.page,
                "per_page" => &mut params.per_page,
                _ => continue,
            };
            *slot = Some(value);
        }
        params
    }

    fn filters(&self) -> TaskFilters {
        TaskFilters::from_params(
            self.completed.as_deref(),
            self.title.as_deref(),
            self.sort.as_deref(),
            self.dir.as_deref(),
        )
    }

    fn page(&self) -> PageRequest {
        PageRequest::from_params(self.page.as_deref(), self.per_page.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct StoreTaskRequest {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub completed: bool,

    /// `YYYY-MM-DD`
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

/// Deserializes a present field, including an explicit `null`, as `Some(..)`
///
/// Paired with `#[serde(default)]` so an absent field stays `None`.
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial update; only fields present in the body change
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Option<String>>,

    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,

    #[serde(default)]
    pub completed: Option<bool>,

    #[serde(default, deserialize_with = "present")]
    pub due_date: Option<Option<NaiveDate>>,
}

impl UpdateTaskRequest {
    fn into_update(self) -> ApiResult<UpdateTask> {
        let title = match self.title {
            None => None,
            Some(None) => return Err(ApiError::invalid_field("title", "The title field is required.")),
            Some(Some(title)) => Some(validate_title(&title)?),
        };
        validate_description(self.description.as_ref().and_then(|d| d.as_deref()))?;

        Ok(UpdateTask {
            title,
            description: self.description,
            completed: self.completed,
            due_date: self.due_date,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateTasksRequest {
    #[serde(default)]
    pub topic: String,
}

/// Postgres text columns cannot store NUL, so such input is a field error
fn reject_nul(field: &str, value: &str) -> ApiResult<()> {
    if value.contains('\0') {
        return Err(ApiError::invalid_field(
            field,
            format!("The {} field must not contain NUL characters.", field),
        ));
    }
    Ok(())
}

/// Trims a title and checks it is present and short enough
fn validate_title(raw: &str) -> ApiResult<String> {
    let title = raw.trim();
    reject_nul("title", title)?;
    if title.is_empty() {
        return Err(ApiError::invalid_field("title", "The title field is required."));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ApiError::invalid_field(
            "title",
            "The title field must not exceed 255 characters.",
        ));
    }
    Ok(title.to_string())
}

fn validate_description(description: Option<&str>) -> ApiResult<()> {
    description.map_or(Ok(()), |d| reject_nul("description", d))
}

fn validate_topic(raw: &str) -> ApiResult<String> {
    let topic = raw.trim();
    reject_nul("topic", topic)?;
    if topic.is_empty() {
        return Err(ApiError::invalid_field("topic", "The topic field is required."));
    }
    if topic.chars().count() > MAX_TOPIC_LENGTH {
        return Err(ApiError::invalid_field(
            "topic",
            "The topic field must not exceed 500 characters.",
        ));
    }
    Ok(topic.to_string())
}

fn task_not_found() -> ApiError {
    ApiError::NotFound("Task not found".to_string())
}

/// Parses a path id; anything that is not a UUID cannot name a task
fn task_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| task_not_found())
}

/// List the caller's tasks
///
/// # Query Parameters
///
/// - `completed`: `1`/`true`/`on`/`yes` for done tasks, anything else for pending
/// - `title`: case-insensitive substring
/// - `sort`: `due_date` or `created_at` (others ignored); `dir`: `asc` or `desc`
/// - `page` (default 1), `per_page` (default 10, max 100)
pub async fn index(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> ApiResult<Json<Page<Task>>> {
    let Query(pairs) = query?;
    let params = IndexParams::from_pairs(pairs);
    let page = Task::list_by_owner(&state.db, auth.user_id, &params.filters(), params.page()).await?;
    Ok(Json(page))
}

/// Create a task; `201` with the stored task
pub async fn store(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<StoreTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let Json(req) = payload?;
    validate_description(req.description.as_deref())?;

    let data = CreateTask {
        title: validate_title(&req.title)?,
        description: req.description,
        completed: req.completed,
        due_date: req.due_date,
    };

    let task = Task::create(&state.db, auth.user_id, data).await?;
    tracing::debug!(user_id = %auth.user_id, task_id = %task.id, "Task created");

    Ok((StatusCode::CREATED, Json(task)))
}

/// Fetch one of the caller's tasks
pub async fn show(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let task = Task::find_for_owner(&state.db, task_id(&id)?, auth.user_id)
        .await?
        .ok_or_else(task_not_found)?;

    Ok(Json(task))
}

/// Update one of the caller's tasks
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let id = task_id(&id)?;
    let Json(req) = payload?;

    let task = Task::update_for_owner(&state.db, id, auth.user_id, req.into_update()?)
        .await?
        .ok_or_else(task_not_found)?;

    Ok(Json(task))
}

/// Delete one of the caller's tasks; `204` on success
pub async fn destroy(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if !Task::delete_for_owner(&state.db, task_id(&id)?, auth.user_id).await? {
        return Err(task_not_found());
    }

    tracing::debug!(user_id = %auth.user_id, task_id = %id, "Task deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Generate tasks from a topic and store them for the caller
///
/// The whole batch is stored in one transaction; a generation or storage
/// failure creates nothing.
///
/// # Endpoint
///
/// ```text
/// POST /api/tasks/generate-ai
/// Content-Type: application/json
///
/// { "topic": "Plan a birthday party" }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Missing or overlong topic
/// - `500 Internal Server Error` (`generation_failed`): The model output was unusable
pub async fn generate_ai(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<GenerateTasksRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Vec<Task>>)> {
    let Json(req) = payload?;
    let topic = validate_topic(&req.topic)?;

    let drafts = state.generator.generate(&topic).await?;

    let items = drafts
        .into_iter()
        .map(|draft| CreateTask {
            description: Some(draft.description),
            ..CreateTask::titled(draft.title)
        })
        .collect();

    let tasks = Task::create_many(&state.db, auth.user_id, items).await?;
    tracing::info!(user_id = %auth.user_id, topic = %topic, count = tasks.len(), "Stored generated tasks");

    Ok((StatusCode::CREATED, Json(tasks)))
}
