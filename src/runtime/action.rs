//! Actions - named units of work that turn an instruction into a result
//!
//! An action renders a prompt from its template and makes exactly one
//! completion call on the provider handed to it by the owning role. No
//! retries, no fallback; failures propagate unchanged.

use std::io::{self, Write};

use async_trait::async_trait;

use crate::core::{Result, TroupeError};
use crate::llm::{CompletionProvider, GenerateOptions};

/// Placeholder replaced with the instruction when rendering a template
pub const INSTRUCTION_SLOT: &str = "{instruction}";

/// A unit of work bound to a role
#[async_trait]
pub trait Action: Send + Sync {
    /// Name, unique within the owning role's action set; doubles as the
    /// kind tag of the messages this action produces
    fn name(&self) -> &str;

    /// Turn an instruction into a result via the role's provider
    async fn run(&self, llm: &dyn CompletionProvider, instruction: &str) -> Result<String>;
}

/// Template-driven action: renders a prompt and asks the provider once
pub struct PromptAction {
    name: String,
    template: String,
    options: Option<GenerateOptions>,
    stream_to_stdout: bool,
}

impl PromptAction {
    /// Create an action from a name and a prompt template
    ///
    /// The template should contain `{instruction}` where the incoming
    /// instruction goes; a template without the slot gets the instruction
    /// appended.
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            options: None,
            stream_to_stdout: false,
        }
    }

    /// Set generation options for the completion call
    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Print tokens to stdout as they arrive instead of waiting for the
    /// full completion
    pub fn with_streaming(mut self, enabled: bool) -> Self {
        self.stream_to_stdout = enabled;
        self
    }

    /// Render the prompt for an instruction
    pub fn render(&self, instruction: &str) -> String {
        if self.template.contains(INSTRUCTION_SLOT) {
            self.template.replace(INSTRUCTION_SLOT, instruction)
        } else {
            format!("{} {}", self.template, instruction)
        }
    }
}

#[async_trait]
impl Action for PromptAction {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, llm: &dyn CompletionProvider, instruction: &str) -> Result<String> {
        let prompt = self.render(instruction);

        let response = if self.stream_to_stdout {
            let text = llm
                .complete_stream(
                    &prompt,
                    self.options.clone(),
                    Box::new(|token| {
                        print!("{}", token);
                        let _ = io::stdout().flush();
                    }),
                )
                .await?;
            println!();
            text
        } else {
            llm.complete(&prompt, self.options.clone()).await?
        };

        // A non-empty reply is the sole correctness check; providers that
        // skip their own check still get caught here.
        if response.trim().is_empty() {
            return Err(TroupeError::empty_response(llm.model()));
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedProvider {
        reply: String,
    }

    #[async_trait]
    impl CompletionProvider for CannedProvider {
        async fn complete(
            &self,
            _prompt: &str,
            _options: Option<GenerateOptions>,
        ) -> Result<String> {
            Ok(self.reply.clone())
        }

        fn model(&self) -> &str {
            "canned"
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    #[test]
    fn test_render_replaces_slot() {
        let action = PromptAction::new(
            "cof_reasoning",
            "You are a video reasoning expert. Analyze this request: {instruction}",
        );
        assert_eq!(
            action.render("jumping"),
            "You are a video reasoning expert. Analyze this request: jumping"
        );
    }

    #[test]
    fn test_render_appends_without_slot() {
        let action = PromptAction::new("a", "Summarize:");
        assert_eq!(action.render("the video"), "Summarize: the video");
    }

    #[tokio::test]
    async fn test_run_passes_through_reply() {
        let action = PromptAction::new("a", "{instruction}");
        let provider = CannedProvider {
            reply: "a plan".to_string(),
        };
        let result = action.run(&provider, "go").await.unwrap();
        assert_eq!(result, "a plan");
    }

    #[tokio::test]
    async fn test_run_rejects_blank_reply() {
        let action = PromptAction::new("a", "{instruction}");
        let provider = CannedProvider {
            reply: "   \n".to_string(),
        };
        let err = action.run(&provider, "go").await.unwrap_err();
        assert!(matches!(err, TroupeError::EmptyResponse { .. }));
    }
}
