/// Prompt sent to the text generator
///
/// The model is asked for a bare JSON array. Models frequently wrap the array
/// in a markdown fence anyway, which [`super::extract`] tolerates.

/// Builds the generation prompt for `topic`
pub fn build_prompt(topic: &str) -> String {
    format!(
        r#"Generate a list of tasks in JSON format for the following topic: "{topic}".
Each task must have two fields:
- "title": a short title for the task
- "description": a short explanation of the task.

Return ONLY valid JSON, with no additional explanation.

IMPORTANT: Make sure the JSON is correctly formatted. The format must be:
[
  {{
    "title": "Title of task 1",
    "description": "Description of task 1"
  }},
  {{
    "title": "Title of task 2",
    "description": "Description of task 2"
  }}
]
Do not include any other text outside the JSON."#
    )
}
