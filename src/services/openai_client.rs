use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::error::{PlannerError, Result};

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Chat-completions client for an OpenAI-compatible endpoint.
///
/// The pipeline never retries an external call on its own (a failed stage is
/// surfaced as-is to the caller), so this client makes exactly one request
/// per invocation and reports rate limits as typed errors.
#[derive(Clone, Debug)]
pub struct OpenAIClient {
    api_key: String,
    base_url: String,
}

impl OpenAIClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.base_url = base_url.into();
    }

    pub async fn chat_completion(&self, body: &Value, timeout: Duration) -> Result<Value> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| PlannerError::Unknown(format!("Failed to build HTTP client: {err}")))?;

        let request_url = build_chat_url(&self.base_url);

        let response = client
            .post(&request_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let response_text = response.text().await?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = headers
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(PlannerError::RateLimit {
                retry_after: retry_after.max(1),
            });
        }

        let response_json: Value = serde_json::from_str(&response_text)
            .map_err(|err| PlannerError::Unknown(format!("Failed to parse JSON: {err}")))?;

        if !status.is_success() {
            let api_message = response_json
                .get("error")
                .and_then(|error| error.get("message"))
                .and_then(|value| value.as_str())
                .map(|s| s.to_string())
                .unwrap_or(response_text.clone());

            return Err(PlannerError::Unknown(format!(
                "HTTP {} error: {}",
                status, api_message
            )));
        }

        if let Some(error) = response_json.get("error") {
            let error_message = error
                .get("message")
                .and_then(|value| value.as_str())
                .map(|s| s.to_string())
                .unwrap_or_else(|| error.to_string());
            return Err(PlannerError::Unknown(format!(
                "API error: {}",
                error_message
            )));
        }

        Ok(response_json)
    }
}

fn build_chat_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with("/chat/completions") {
        trimmed.to_string()
    } else {
        format!("{}/chat/completions", trimmed)
    }
}

/// Request body builder for a single chat completion.
#[derive(Clone, Debug)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<Value>,
    max_tokens: Option<u32>,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Value>) -> Self {
        Self {
            model: model.into(),
            messages,
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn into_value(self) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": self.messages,
        });

        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        body
    }
}

/// Pull the assistant message text out of a chat-completion response.
pub fn message_content(response: &Value) -> Option<&str> {
    response
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_chat_url() {
        assert_eq!(
            build_chat_url("https://openrouter.ai/api/v1"),
            "https://openrouter.ai/api/v1/chat/completions"
        );
        assert_eq!(
            build_chat_url("https://host/api/v1/chat/completions/"),
            "https://host/api/v1/chat/completions"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let body = ChatCompletionRequest::new("test-model", vec![json!({"role": "user"})])
            .with_max_tokens(Some(100))
            .into_value();
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["max_tokens"], 100);
        assert!(body["messages"].is_array());
    }

    #[test]
    fn test_message_content() {
        let response = json!({
            "choices": [{"message": {"content": "hello"}}]
        });
        assert_eq!(message_content(&response), Some("hello"));
        assert_eq!(message_content(&json!({})), None);
    }
}
