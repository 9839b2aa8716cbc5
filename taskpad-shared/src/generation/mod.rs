/// AI task generation
///
/// Converts a free-text topic into task drafts:
///
/// 1. [`prompt::build_prompt`] embeds the topic in a fixed instruction
/// 2. a [`client::TextGenerator`] (Gemini in production) returns free text
/// 3. [`extract::extract_json_payload`] strips an optional markdown fence
/// 4. [`drafts::parse_drafts`] validates the JSON array
///
/// Every failure is logged with the topic and the raw model output, then
/// surfaced as a [`GenerationFailure`].
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskpad_shared::generation::client::{GeminiClient, GeminiConfig};
/// use taskpad_shared::generation::TaskGenerator;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GeminiClient::new(GeminiConfig {
///     api_key: Some("key".to_string()),
///     ..GeminiConfig::default()
/// })?;
/// let generator = TaskGenerator::new(Arc::new(client));
///
/// for draft in generator.generate("moving house").await? {
///     println!("{}: {}", draft.title, draft.description);
/// }
/// # Ok(())
/// # }
/// ```

pub mod client;
pub mod drafts;
pub mod extract;
pub mod prompt;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use client::TextGenerator;

/// A task proposed by the model, not yet stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
}

/// Why a generation attempt failed
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// No API key configured
    #[error("Task generator is not configured")]
    NotConfigured,

    /// Transport or API error from the provider
    #[error("{0}")]
    Upstream(String),

    /// Provider returned no text
    #[error("Empty response from text generator")]
    EmptyResponse,

    /// Nothing left after fence extraction
    #[error("Could not extract JSON content from the response")]
    NoJsonContent,

    #[error("Failed to decode JSON: {0}")]
    InvalidJson(String),

    #[error("Response does not contain a valid array of tasks")]
    NotAnArray,

    /// Element `index` lacks a usable title or description
    #[error("Task at index {index} does not have the required structure ({reason})")]
    MalformedDraft { index: usize, reason: &'static str },
}

/// A [`GenerationError`] tagged with the topic it occurred for
#[derive(Debug, thiserror::Error)]
#[error("Failed to generate tasks for topic '{topic}': {source}")]
pub struct GenerationFailure {
    pub topic: String,
    pub source: GenerationError,
}

/// Topic-to-drafts pipeline over a shared [`TextGenerator`]
#[derive(Clone)]
pub struct TaskGenerator {
    client: Arc<dyn TextGenerator>,
}

impl TaskGenerator {
    pub fn new(client: Arc<dyn TextGenerator>) -> Self {
        Self { client }
    }

    /// Generates drafts for `topic`
    pub async fn generate(&self, topic: &str) -> Result<Vec<TaskDraft>, GenerationFailure> {
        let prompt = prompt::build_prompt(topic);

        let raw = self
            .client
            .generate_text(&prompt)
            .await
            .map_err(|e| failure(topic, None, e))?;

        if raw.trim().is_empty() {
            return Err(failure(topic, Some(&raw), GenerationError::EmptyResponse));
        }

        info!(topic = %topic, response = %raw, "Received generation response");

        let payload = extract::extract_json_payload(&raw);
        let drafts = drafts::parse_drafts(payload).map_err(|e| failure(topic, Some(&raw), e))?;

        info!(topic = %topic, count = drafts.len(), "Generated task drafts");
        Ok(drafts)
    }
}

fn failure(topic: &str, raw_response: Option<&str>, source: GenerationError) -> GenerationFailure {
    error!(
        topic = %topic,
        raw_response = raw_response.unwrap_or_default(),
        error = %source,
        "Task generation failed"
    );

    GenerationFailure {
        topic: topic.to_string(),
        source,
    }
}
