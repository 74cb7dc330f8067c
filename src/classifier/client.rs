use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_openai::types::chat::{CreateChatCompletionRequest, CreateChatCompletionRequestArgs};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::error::InferenceError;
use super::parse::Assessment;
use super::prompt::build_messages;
use crate::config::Config;
use crate::constants::{
    DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TOP_P,
    INFERENCE_RETRY_BACKOFF,
};

/// A text-completion service that answers one prompt with one reply.
pub trait CompletionClient: Send + Sync {
    /// Returns the text of the first choice.
    fn complete(
        &self,
        request: &CreateChatCompletionRequest,
    ) -> impl Future<Output = Result<String, InferenceError>> + Send;
}

impl<T: CompletionClient> CompletionClient for Arc<T> {
    fn complete(
        &self,
        request: &CreateChatCompletionRequest,
    ) -> impl Future<Output = Result<String, InferenceError>> + Send {
        (**self).complete(request)
    }
}

/// The only part of a completion response that is read: `choices[0].message.content`.
#[derive(Debug, Deserialize)]
struct CompletionReply {
    #[serde(default)]
    choices: Vec<ReplyChoice>,
}

#[derive(Debug, Deserialize)]
struct ReplyChoice {
    #[serde(default)]
    message: Option<ReplyMessage>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible `chat/completions` client (Perplexity by default).
pub struct HttpCompletionClient {
    http: HttpClient,
    endpoint: String,
    api_key: String,
    retries: u32,
    retry_backoff: Duration,
}

impl std::fmt::Debug for HttpCompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCompletionClient")
            .field("endpoint", &self.endpoint)
            .field("retries", &self.retries)
            .finish()
    }
}

impl HttpCompletionClient {
    /// `http` should carry the request timeout.
    pub fn new(http: HttpClient, endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            retries: 0,
            retry_backoff: INFERENCE_RETRY_BACKOFF,
        }
    }

    pub fn with_retries(mut self, retries: u32, backoff: Duration) -> Self {
        self.retries = retries;
        self.retry_backoff = backoff;
        self
    }

    async fn send_once(
        &self,
        request: &CreateChatCompletionRequest,
    ) -> Result<String, InferenceError> {
        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| InferenceError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| InferenceError::Transport(format!("failed to read body: {e}")))?;

        if !status.is_success() {
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CompletionReply = serde_json::from_str(&body)
            .map_err(|e| InferenceError::MalformedResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(InferenceError::EmptyReply)
    }
}

impl CompletionClient for HttpCompletionClient {
    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(
        &self,
        request: &CreateChatCompletionRequest,
    ) -> Result<String, InferenceError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;

            match self.send_once(request).await {
                Ok(content) => {
                    debug!(attempt, reply_len = content.len(), "Completion received");
                    return Ok(content);
                }
                Err(err) if err.is_retryable() && attempt <= self.retries => {
                    warn!(attempt, error = %err, "Retrying completion request");
                    tokio::time::sleep(self.retry_backoff).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Sampling and prompt options for [`RelevanceClassifier`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierSettings {
    pub model: String,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Append the body excerpt to the prompt.
    pub include_body: bool,
}

impl ClassifierSettings {
    /// Model and excerpt toggle from the config; sampling options keep their defaults.
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.model.clone(),
            include_body: config.include_body,
            ..Self::default()
        }
    }
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: Some(DEFAULT_TEMPERATURE),
            top_p: Some(DEFAULT_TOP_P),
            max_tokens: Some(DEFAULT_MAX_TOKENS),
            include_body: true,
        }
    }
}

/// Asks the completion service about one article and parses the reply.
#[derive(Debug)]
pub struct RelevanceClassifier<C> {
    client: C,
    settings: ClassifierSettings,
}

impl<C: CompletionClient> RelevanceClassifier<C> {
    pub fn new(client: C, settings: ClassifierSettings) -> Self {
        Self { client, settings }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn settings(&self) -> &ClassifierSettings {
        &self.settings
    }

    /// `max_tokens` is sent as-is; Perplexity does not read `max_completion_tokens`.
    #[allow(deprecated)]
    pub fn build_request(
        &self,
        title: &str,
        body_text: Option<&str>,
    ) -> Result<CreateChatCompletionRequest, InferenceError> {
        let body = if self.settings.include_body {
            body_text
        } else {
            None
        };

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.settings.model.as_str())
            .messages(build_messages(title, body)?);
        if let Some(temperature) = self.settings.temperature {
            args.temperature(temperature);
        }
        if let Some(top_p) = self.settings.top_p {
            args.top_p(top_p);
        }
        if let Some(max_tokens) = self.settings.max_tokens {
            args.max_tokens(max_tokens);
        }

        args.build()
            .map_err(|e| InferenceError::InvalidRequest(e.to_string()))
    }

    /// Transport and response failures are returned; an odd reply is not an error.
    pub async fn classify(
        &self,
        title: &str,
        body_text: Option<&str>,
    ) -> Result<Assessment, InferenceError> {
        let request = self.build_request(title, body_text)?;
        let reply = self.client.complete(&request).await?;
        debug!(reply = %reply, "Model reply");
        Ok(Assessment::from_reply(reply))
    }
}
