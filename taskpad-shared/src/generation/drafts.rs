/// Draft validation
///
/// Turns the extracted JSON payload into [`TaskDraft`]s. A single bad element
/// rejects the whole batch.

use serde_json::Value;

use super::{GenerationError, TaskDraft};

/// Longest title a draft may carry (matches `tasks.title`)
pub const MAX_TITLE_LENGTH: usize = 255;

fn draft_at(index: usize, value: &Value) -> Result<TaskDraft, GenerationError> {
    let malformed = |reason: &'static str| GenerationError::MalformedDraft { index, reason };

    let object = value.as_object().ok_or_else(|| malformed("not an object"))?;

    let title = object
        .get("title")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("missing string field 'title'"))?
        .trim();

    let description = object
        .get("description")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("missing string field 'description'"))?;

    if title.is_empty() {
        return Err(malformed("blank title"));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(malformed("title longer than 255 characters"));
    }
    if title.contains('\0') || description.contains('\0') {
        return Err(malformed("NUL character in text"));
    }

    Ok(TaskDraft {
        title: title.to_string(),
        description: description.to_string(),
    })
}

/// Parses a JSON array of `{title, description}` objects
///
/// Extra keys on an element are ignored. An empty array yields no drafts.
pub fn parse_drafts(payload: &str) -> Result<Vec<TaskDraft>, GenerationError> {
    if payload.trim().is_empty() {
        return Err(GenerationError::NoJsonContent);
    }

    let value: Value =
        serde_json::from_str(payload).map_err(|e| GenerationError::InvalidJson(e.to_string()))?;

    let items = value.as_array().ok_or(GenerationError::NotAnArray)?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| draft_at(index, item))
        .collect()
}
