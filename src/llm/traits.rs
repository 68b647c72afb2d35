//! Completion provider trait for abstracting LLM backends
//!
//! Enables swapping the HTTP client for scripted providers in tests.

use async_trait::async_trait;

use crate::core::Result;

/// Options for LLM generation
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Temperature for sampling (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Stop sequences
    pub stop: Option<Vec<String>>,
}

/// Callback function for streaming tokens
pub type StreamCallback = Box<dyn Fn(&str) + Send + Sync>;

/// Trait for text-completion backends
///
/// One prompt in, one completion out. The call is the single suspension
/// point in a role's act() step; providers hold no per-role state.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Complete a prompt, returning the full response text
    async fn complete(&self, prompt: &str, options: Option<GenerateOptions>) -> Result<String>;

    /// Complete a prompt, invoking the callback for each token as it arrives
    ///
    /// Returns the accumulated response text. Providers without streaming
    /// support may fall back to a single callback with the whole response.
    async fn complete_stream(
        &self,
        prompt: &str,
        options: Option<GenerateOptions>,
        on_token: StreamCallback,
    ) -> Result<String> {
        let text = self.complete(prompt, options).await?;
        on_token(&text);
        Ok(text)
    }

    /// Cheap liveness probe: send a short fixed prompt and require a
    /// non-empty reply
    async fn probe(&self) -> Result<()> {
        self.complete("Hello, are you working?", None).await.map(|_| ())
    }

    /// Model identifier this provider addresses
    fn model(&self) -> &str;

    /// Provider name for diagnostics
    fn name(&self) -> &str;
}
