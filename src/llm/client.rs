//! Chat client for the Ollama HTTP API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::InferenceError;

/// A single request/response call to a language model.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Send `system` and `user` as a two-message exchange and return the
    /// assistant's reply.
    async fn complete(&self, system: &str, user: &str) -> Result<String, InferenceError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Client for Ollama's non-streaming `/api/chat` endpoint.
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
    timeout_secs: u64,
}

impl OllamaClient {
    /// The request timeout bounds the whole call, including generation.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, InferenceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(InferenceError::ClientBuild)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            temperature,
            timeout_secs: timeout.as_secs(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl InferenceClient for OllamaClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, InferenceError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            stream: false,
            options: ChatOptions {
                temperature: self.temperature,
            },
        };

        let url = format!("{}/api/chat", self.base_url);
        debug!(model = %self.model, "POST {} ({} chars of diff)", url, user.len());

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    InferenceError::Timeout(self.timeout_secs)
                } else {
                    InferenceError::RequestFailed(e)
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                InferenceError::Timeout(self.timeout_secs)
            } else {
                InferenceError::RequestFailed(e)
            }
        })?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ChatResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .unwrap_or(body);
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body: detail,
            });
        }

        parse_chat_response(&body)
    }
}

/// Extract the assistant message from a `/api/chat` response body.
fn parse_chat_response(body: &str) -> Result<String, InferenceError> {
    let parsed: ChatResponse = serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        InferenceError::InvalidResponse(format!("{}. Response: {}", e, preview))
    })?;

    if let Some(error) = parsed.error {
        return Err(InferenceError::InvalidResponse(error));
    }

    match parsed.message {
        Some(message) if !message.content.trim().is_empty() => Ok(message.content),
        _ => Err(InferenceError::EmptyResponse),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(uri: &str) -> OllamaClient {
        OllamaClient::new(uri, "llama3.2", 0.0, Duration::from_secs(30)).unwrap()
    }

    #[test]
    fn test_parse_chat_response() {
        let body = r#"{"model":"llama3.2","message":{"role":"assistant","content":"Add tests"},"done":true}"#;
        assert_eq!(parse_chat_response(body).unwrap(), "Add tests");
    }

    #[test]
    fn test_parse_chat_response_blank_is_empty() {
        let body = r#"{"message":{"role":"assistant","content":"  \n"},"done":true}"#;
        assert!(matches!(parse_chat_response(body), Err(InferenceError::EmptyResponse)));
    }

    #[test]
    fn test_parse_chat_response_invalid_json() {
        assert!(matches!(
            parse_chat_response("not json"),
            Err(InferenceError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        assert_eq!(client("http://localhost:11434/").base_url(), "http://localhost:11434");
    }

    #[tokio::test]
    async fn test_complete_sends_system_and_user_messages() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama3.2",
                "stream": false,
                "options": { "temperature": 0.0 },
                "messages": [
                    { "role": "system", "content": "be terse" },
                    { "role": "user", "content": "diff --git a/x b/x" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "llama3.2",
                "message": { "role": "assistant", "content": "Update x" },
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client(&server.uri())
            .complete("be terse", "diff --git a/x b/x")
            .await
            .unwrap();
        assert_eq!(reply, "Update x");
    }

    #[tokio::test]
    async fn test_complete_surfaces_ollama_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({ "error": "model 'llama3.2' not found" })),
            )
            .mount(&server)
            .await;

        let err = client(&server.uri()).complete("s", "u").await.unwrap_err();
        match err {
            InferenceError::Status { status, body } => {
                assert_eq!(status, 404);
                assert!(body.contains("not found"));
            }
            other => panic!("Expected Status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_complete_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let client =
            OllamaClient::new(server.uri(), "llama3.2", 0.0, Duration::from_millis(200)).unwrap();
        let err = client.complete("s", "u").await.unwrap_err();
        assert!(matches!(err, InferenceError::Timeout(0)));
    }
}
