//! OpenAI-compatible chat completions client
//!
//! Async HTTP client for vLLM-style backends exposing the OpenAI
//! `/chat/completions` surface, with streaming support.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::{EndpointConfig, Result, TroupeError};
use crate::llm::traits::{CompletionProvider, GenerateOptions, StreamCallback};

/// Client for one OpenAI-compatible backend
///
/// The endpoint triple (base_url, model, api_key) is fixed at construction;
/// two clients with different triples address two independent models.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    endpoint: EndpointConfig,
    debug: bool,
}

/// Chat completions request
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
    stream: bool,
}

/// Chat message in OpenAI wire format
#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Chat completions response (non-streaming)
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// One streamed SSE chunk
#[derive(Debug, Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: Delta,
}

#[derive(Debug, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiClient {
    /// Create a client for the given endpoint
    pub fn new(endpoint: EndpointConfig) -> Self {
        Self::with_debug(endpoint, false)
    }

    /// Create a client with debug output enabled or disabled
    pub fn with_debug(endpoint: EndpointConfig, debug: bool) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(endpoint.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            endpoint,
            debug,
        }
    }

    /// Enable or disable debug output
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// The backend base URL this client addresses
    pub fn base_url(&self) -> &str {
        &self.endpoint.base_url
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.base_url.trim_end_matches('/'))
    }

    fn build_request<'a>(
        &'a self,
        prompt: &str,
        options: &Option<GenerateOptions>,
        stream: bool,
    ) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.endpoint.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: options.as_ref().and_then(|o| o.temperature),
            max_tokens: options.as_ref().and_then(|o| o.max_tokens),
            stop: options.as_ref().and_then(|o| o.stop.clone()),
            stream,
        }
    }

    async fn send(&self, request: &ChatRequest<'_>) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.endpoint.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    TroupeError::unavailable(&self.endpoint.base_url, e.to_string())
                } else {
                    TroupeError::from(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(TroupeError::protocol(
                &self.endpoint.base_url,
                format!("HTTP {}: {}", status, error_text),
            ));
        }

        Ok(response)
    }

    /// Debug print if enabled, truncating long content
    fn debug_print(&self, label: &str, content: &str) {
        if self.debug {
            match Self::truncate_on_char_boundary(content, 500) {
                Some(head) => eprintln!("DEBUG {}: {}...", label, head),
                None => eprintln!("DEBUG {}: {}", label, content),
            }
        }
    }

    /// Longest prefix of at most `max` bytes ending on a char boundary,
    /// or None when the content already fits
    fn truncate_on_char_boundary(content: &str, max: usize) -> Option<&str> {
        if content.len() <= max {
            return None;
        }
        let mut end = max;
        while !content.is_char_boundary(end) {
            end -= 1;
        }
        Some(&content[..end])
    }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    async fn complete(&self, prompt: &str, options: Option<GenerateOptions>) -> Result<String> {
        let request = self.build_request(prompt, &options, false);

        let request_json = serde_json::to_string(&request)?;
        self.debug_print("Request", &request_json);

        let response = self.send(&request).await?;
        let body: ChatResponse = response.json().await?;

        let content = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| {
                TroupeError::protocol(&self.endpoint.base_url, "response had no choices")
            })?;

        self.debug_print("Response", &content);

        if content.trim().is_empty() {
            return Err(TroupeError::empty_response(&self.endpoint.model));
        }

        Ok(content)
    }

    async fn complete_stream(
        &self,
        prompt: &str,
        options: Option<GenerateOptions>,
        on_token: StreamCallback,
    ) -> Result<String> {
        let request = self.build_request(prompt, &options, true);
        let response = self.send(&request).await?;

        let mut full_content = String::new();
        let mut buffer = String::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let bytes = chunk.map_err(|e| {
                TroupeError::unavailable(&self.endpoint.base_url, format!("stream broke: {}", e))
            })?;
            buffer.push_str(&String::from_utf8_lossy(&bytes));

            // SSE frames are newline-delimited "data: {...}" lines
            while let Some(pos) = buffer.find('\n') {
                let line = buffer[..pos].trim().to_string();
                buffer.drain(..=pos);

                let Some(payload) = line.strip_prefix("data:") else {
                    continue;
                };
                let payload = payload.trim();

                if payload.is_empty() || payload == "[DONE]" {
                    continue;
                }

                match serde_json::from_str::<StreamChunk>(payload) {
                    Ok(chunk) => {
                        for choice in chunk.choices {
                            if let Some(token) = choice.delta.content {
                                if !token.is_empty() {
                                    on_token(&token);
                                    full_content.push_str(&token);
                                }
                            }
                        }
                    }
                    Err(e) => {
                        self.debug_print("Unparseable chunk", &format!("{}: {}", e, payload));
                    }
                }
            }
        }

        if full_content.trim().is_empty() {
            return Err(TroupeError::empty_response(&self.endpoint.model));
        }

        Ok(full_content)
    }

    fn model(&self) -> &str {
        &self.endpoint.model
    }

    fn name(&self) -> &str {
        "openai-compatible"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(base_url: &str) -> EndpointConfig {
        EndpointConfig {
            base_url: base_url.to_string(),
            model: "test-model".to_string(),
            api_key: "EMPTY".to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_completions_url_strips_trailing_slash() {
        let client = OpenAiClient::new(endpoint("http://localhost:8005/v1/"));
        assert_eq!(
            client.completions_url(),
            "http://localhost:8005/v1/chat/completions"
        );
    }

    #[test]
    fn test_build_request_carries_options() {
        let client = OpenAiClient::new(endpoint("http://localhost:8005/v1"));
        let options = Some(GenerateOptions {
            temperature: Some(0.2),
            max_tokens: Some(128),
            stop: None,
        });
        let request = client.build_request("hello", &options, false);
        assert_eq!(request.model, "test-model");
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.max_tokens, Some(128));
        assert!(!request.stream);
    }

    #[test]
    fn test_debug_print_survives_multibyte_content() {
        let client = OpenAiClient::with_debug(endpoint("http://localhost:8005/v1"), true);
        // 200 three-byte chars: 600 bytes, and byte 500 falls mid-character
        let content = "…".repeat(200);
        client.debug_print("Response", &content);
    }

    #[test]
    fn test_truncate_on_char_boundary() {
        let content = "…".repeat(200);
        let head = OpenAiClient::truncate_on_char_boundary(&content, 500).unwrap();
        assert!(head.len() <= 500);
        assert!(head.chars().all(|c| c == '…'));

        assert!(OpenAiClient::truncate_on_char_boundary("short", 500).is_none());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_unavailable() {
        // Port 1 is never listening
        let client = OpenAiClient::new(endpoint("http://127.0.0.1:1/v1"));
        let err = client.complete("hello", None).await.unwrap_err();
        assert!(err.is_unavailable(), "got {:?}", err);
    }
}
