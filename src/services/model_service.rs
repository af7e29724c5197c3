use std::time::Duration;

use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;

use crate::{
    config::Config,
    errors::{AppError, AppResult},
};

/// One chat-completion call: a system prompt, a user prompt and sampling settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Ask the provider for a JSON object instead of prose.
    pub json: bool,
}

impl CompletionRequest {
    pub fn json(system: &str, user: String, temperature: f64, max_tokens: u32) -> Self {
        Self {
            system: system.to_string(),
            user,
            temperature,
            max_tokens,
            json: true,
        }
    }

    pub fn text(system: &str, user: String, temperature: f64, max_tokens: u32) -> Self {
        Self {
            system: system.to_string(),
            user,
            temperature,
            max_tokens,
            json: false,
        }
    }
}

/// Black-box text generation. Returns the raw completion text; callers validate it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> AppResult<String>;
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiLanguageModel {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
    max_retries: u32,
    retry_backoff: Duration,
}

impl OpenAiLanguageModel {
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self {
            client,
            model,
            timeout: Duration::from_secs(45),
            max_retries: 2,
            retry_backoff: Duration::from_millis(500),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let openai_config =
            OpenAIConfig::new().with_api_key(config.openai_api_key.expose_secret().to_string());

        Self::new(Client::with_config(openai_config), config.openai_model.clone())
            .with_timeout(config.generation_timeout())
            .with_retries(config.generation_max_retries, config.generation_retry_backoff())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, max_retries: u32, backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_backoff = backoff;
        self
    }

    fn request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        let mut body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user },
            ],
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });

        if request.json {
            body["response_format"] = json!({ "type": "json_object" });
        }

        body
    }

    async fn complete_once(&self, body: &serde_json::Value) -> AppResult<String> {
        let chat = self.client.chat();
        let call = chat.create_byot::<_, ChatCompletionResponse>(body.clone());

        let response = tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| {
                AppError::GenerationFailure(format!(
                    "model call timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| AppError::GenerationFailure(format!("model call failed: {}", e)))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(AppError::GenerationFailure(
                "model returned an empty completion".to_string(),
            ));
        }

        Ok(content)
    }
}

#[async_trait]
impl LanguageModel for OpenAiLanguageModel {
    async fn complete(&self, request: CompletionRequest) -> AppResult<String> {
        let body = self.request_body(&request);
        log::debug!("Model request ({}): {}", self.model, request.user);

        let mut attempt = 0;
        loop {
            match self.complete_once(&body).await {
                Ok(content) => return Ok(content),
                Err(err) if attempt < self.max_retries => {
                    let delay = self.retry_backoff * 2u32.pow(attempt);
                    attempt += 1;
                    log::warn!(
                        "Model call failed (attempt {}/{}), retrying in {}ms: {}",
                        attempt,
                        self.max_retries + 1,
                        delay.as_millis(),
                        err
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> OpenAiLanguageModel {
        let config = OpenAIConfig::new().with_api_key("sk-test");
        OpenAiLanguageModel::new(Client::with_config(config), "gpt-4o-mini".into())
    }

    #[test]
    fn json_requests_ask_for_json_object() {
        let body = model().request_body(&CompletionRequest::json("sys", "user".into(), 0.8, 3000));

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "user");
        assert_eq!(body["max_tokens"], 3000);
        assert_eq!(body["response_format"]["type"], "json_object");
    }

    #[test]
    fn text_requests_have_no_response_format() {
        let body = model().request_body(&CompletionRequest::text("sys", "user".into(), 0.7, 1000));

        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn builder_overrides_defaults() {
        let model = model()
            .with_timeout(Duration::from_secs(3))
            .with_retries(5, Duration::from_millis(10));

        assert_eq!(model.timeout, Duration::from_secs(3));
        assert_eq!(model.max_retries, 5);
        assert_eq!(model.retry_backoff, Duration::from_millis(10));
    }

    #[tokio::test]
    async fn unreachable_provider_is_a_generation_failure() {
        let config = OpenAIConfig::new()
            .with_api_key("sk-test")
            .with_api_base("http://127.0.0.1:9/v1");
        let model = OpenAiLanguageModel::new(Client::with_config(config), "gpt-4o-mini".into())
            .with_timeout(Duration::from_secs(5))
            .with_retries(0, Duration::from_millis(1));

        let err = model
            .complete(CompletionRequest::text("sys", "user".into(), 0.7, 10))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::GenerationFailure(_)));
    }
}
