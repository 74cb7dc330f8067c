use std::sync::Mutex;
use std::time::Duration;

use async_openai::types::chat::CreateChatCompletionRequest;

use super::client::CompletionClient;
use super::error::InferenceError;
use super::prompt::user_content;

enum Script {
    Reply(String),
    Fail(InferenceError),
}

struct Rule {
    needle: String,
    script: Script,
}

/// Scripted [`CompletionClient`]. Rules match on a substring of the user prompt;
/// the first matching rule wins, otherwise the default reply is returned.
pub struct MockCompletionClient {
    default_reply: String,
    rules: Vec<Rule>,
    delays: Vec<(String, Duration)>,
    requests: Mutex<Vec<CreateChatCompletionRequest>>,
}

impl Default for MockCompletionClient {
    fn default() -> Self {
        Self::new("Score: 5. This article is not about the region.")
    }
}

impl MockCompletionClient {
    pub fn new(default_reply: impl Into<String>) -> Self {
        Self {
            default_reply: default_reply.into(),
            rules: Vec::new(),
            delays: Vec::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn reply_for(mut self, needle: &str, reply: impl Into<String>) -> Self {
        self.rules.push(Rule {
            needle: needle.to_string(),
            script: Script::Reply(reply.into()),
        });
        self
    }

    pub fn fail_for(mut self, needle: &str, error: InferenceError) -> Self {
        self.rules.push(Rule {
            needle: needle.to_string(),
            script: Script::Fail(error),
        });
        self
    }

    /// Sleeps (on the tokio clock) before answering prompts containing `needle`.
    pub fn delay_for(mut self, needle: &str, delay: Duration) -> Self {
        self.delays.push((needle.to_string(), delay));
        self
    }

    pub fn requests(&self) -> Vec<CreateChatCompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    /// User prompts in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| user_content(r).to_string())
            .collect()
    }
}

impl CompletionClient for MockCompletionClient {
    async fn complete(
        &self,
        request: &CreateChatCompletionRequest,
    ) -> Result<String, InferenceError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        let prompt = user_content(request);

        let delay = self
            .delays
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, d)| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match self
            .rules
            .iter()
            .find(|rule| prompt.contains(rule.needle.as_str()))
        {
            Some(Rule {
                script: Script::Reply(reply),
                ..
            }) => Ok(reply.clone()),
            Some(Rule {
                script: Script::Fail(err),
                ..
            }) => Err(err.clone()),
            None => Ok(self.default_reply.clone()),
        }
    }
}
