//! Gemini completion backend built on Rig.

use reqwest::Client as ReqwestClient;
use rig::client::CompletionClient;
use rig::completion::{CompletionModel, Message};
use rig::message::AssistantContent;
use rig::providers::gemini;
use tracing::debug;

use crate::llm::{CompletionBackend, CompletionError, CompletionFuture, CompletionResult};
use crate::memory::{ConversationTurn, Role};

/// Default Gemini model.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-lite";

/// Gemini connection settings.
#[derive(Clone)]
pub struct GeminiConfig {
    /// Google API key.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
}

impl GeminiConfig {
    /// Settings for the default model.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
        }
    }

    /// Use a different model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

type GeminiModel = <gemini::Client<ReqwestClient> as CompletionClient>::CompletionModel;

/// Production backend: Gemini via Rig.
pub struct GeminiBackend {
    model: GeminiModel,
    model_name: String,
}

impl GeminiBackend {
    /// Create a backend.
    ///
    /// # Errors
    /// Returns an error if the Gemini client cannot be built.
    pub fn new(config: &GeminiConfig) -> CompletionResult<Self> {
        let client = gemini::Client::<ReqwestClient>::builder()
            .api_key(config.api_key.clone())
            .build()?;
        let model = client.completion_model(config.model.clone());

        Ok(Self {
            model,
            model_name: config.model.clone(),
        })
    }

    async fn run(&self, history: &[ConversationTurn], prompt: &str) -> CompletionResult<String> {
        debug!(
            model = %self.model_name,
            history = history.len(),
            "Requesting completion"
        );

        let request = self
            .model
            .completion_request(prompt.to_string())
            .messages(to_messages(history))
            .build();

        let response = self.model.completion(request).await?;
        let text = extract_text(&response.choice);
        if text.trim().is_empty() {
            return Err(CompletionError::EmptyResponse);
        }
        Ok(text)
    }
}

impl CompletionBackend for GeminiBackend {
    fn complete<'a>(
        &'a self,
        history: &'a [ConversationTurn],
        prompt: &'a str,
    ) -> CompletionFuture<'a, CompletionResult<String>> {
        Box::pin(self.run(history, prompt))
    }
}

fn to_messages(history: &[ConversationTurn]) -> Vec<Message> {
    history
        .iter()
        .map(|turn| match turn.role {
            Role::User => Message::user(turn.content.clone()),
            Role::Assistant => Message::assistant(turn.content.clone()),
        })
        .collect()
}

fn extract_text(choice: &rig::OneOrMany<AssistantContent>) -> String {
    let mut out = String::new();
    for content in choice.iter() {
        if let AssistantContent::Text(text) = content {
            out.push_str(&text.text);
        }
    }
    out
}
