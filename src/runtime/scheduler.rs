//! Scheduler - offers each role a turn until no role can progress
//!
//! Decoupled from any individual role's logic: the scheduler only sees
//! turn outcomes. Roles run strictly one after another; there is no
//! concurrent execution of two roles' cycles.

use crate::core::Result;
use crate::runtime::bus::Bus;
use crate::runtime::message::Message;
use crate::runtime::role::Role;

/// Round-robin turn loop over a cast of roles
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    max_rounds: usize,
    debug: bool,
}

impl Scheduler {
    /// Create a scheduler bounded to `max_rounds` full passes
    pub fn new(max_rounds: usize) -> Self {
        Self {
            max_rounds,
            debug: false,
        }
    }

    /// Enable debug output
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Drive roles until quiescence or the round limit
    ///
    /// A round where no role publishes ends the run. Any role failure
    /// aborts the run with the failure surfaced verbatim; messages
    /// published before the failure are still in the bus transcript.
    pub async fn run(&self, bus: &mut Bus, roles: &mut [Role]) -> Result<Vec<Message>> {
        let mut published = Vec::new();

        for round in 0..self.max_rounds {
            let mut progressed = false;

            for role in roles.iter_mut() {
                let outcome = role.run(bus, None).await?;
                if let Some(message) = outcome.message() {
                    if self.debug {
                        eprintln!(
                            "DEBUG round {}: {} published {} ({})",
                            round + 1,
                            role.identity(),
                            message.id,
                            message.kind
                        );
                    }
                    published.push(message.clone());
                    progressed = true;
                }
            }

            if !progressed {
                break;
            }
        }

        Ok(published)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Result, TroupeError};
    use crate::llm::{CompletionProvider, GenerateOptions};
    use crate::runtime::action::PromptAction;
    use crate::runtime::message::Message;
    use crate::runtime::role::Role;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct EchoProvider {
        model: String,
        prefix: String,
    }

    #[async_trait]
    impl CompletionProvider for EchoProvider {
        async fn complete(
            &self,
            prompt: &str,
            _options: Option<GenerateOptions>,
        ) -> Result<String> {
            Ok(format!("{}: {}", self.prefix, prompt))
        }

        fn model(&self) -> &str {
            &self.model
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    fn cast() -> (Bus, Vec<Role>) {
        let planner = Role::builder("CoFPlanner", "Planner")
            .provider(Arc::new(EchoProvider {
                model: "CoF-rl-model-7b".to_string(),
                prefix: "plan".to_string(),
            }))
            .action(PromptAction::new("cof_reasoning", "{instruction}"))
            .route("user_input", "cof_reasoning")
            .build()
            .unwrap();

        let describer = Role::builder("OpenO3Agent", "ToolAgent")
            .provider(Arc::new(EchoProvider {
                model: "Open-o3-Video".to_string(),
                prefix: "describe".to_string(),
            }))
            .action(PromptAction::new("video_description", "{instruction}"))
            .route("cof_reasoning", "video_description")
            .build()
            .unwrap();

        let mut bus = Bus::new();
        planner.attach(&mut bus);
        describer.attach(&mut bus);

        (bus, vec![planner, describer])
    }

    #[tokio::test]
    async fn test_runs_pipeline_to_quiescence() {
        let (mut bus, mut roles) = cast();
        bus.publish(Message::user("the jump"));

        let published = Scheduler::new(8).run(&mut bus, &mut roles).await.unwrap();

        assert_eq!(published.len(), 2);
        assert_eq!(published[0].kind.as_str(), "cof_reasoning");
        assert_eq!(published[1].kind.as_str(), "video_description");
        assert_eq!(published[1].causal_parent, Some(published[0].id));
        // Quiescent: another run publishes nothing
        let again = Scheduler::new(8).run(&mut bus, &mut roles).await.unwrap();
        assert!(again.is_empty());
    }

    #[tokio::test]
    async fn test_round_limit_cuts_off() {
        let (mut bus, mut roles) = cast();
        bus.publish(Message::user("the jump"));

        // One round lets both roles take a turn once; the chain fits, so
        // a limit of 1 still completes it, but a limit of 0 does nothing.
        let published = Scheduler::new(0).run(&mut bus, &mut roles).await.unwrap();
        assert!(published.is_empty());
    }

    #[tokio::test]
    async fn test_failure_aborts_run() {
        struct Failing;

        #[async_trait]
        impl CompletionProvider for Failing {
            async fn complete(
                &self,
                _prompt: &str,
                _options: Option<GenerateOptions>,
            ) -> Result<String> {
                Err(TroupeError::unavailable("http://localhost:1/v1", "refused"))
            }

            fn model(&self) -> &str {
                "down"
            }

            fn name(&self) -> &str {
                "failing"
            }
        }

        let mut role = Role::builder("CoFPlanner", "Planner")
            .provider(Arc::new(Failing))
            .action(PromptAction::new("cof_reasoning", "{instruction}"))
            .route("user_input", "cof_reasoning")
            .build()
            .unwrap();

        let mut bus = Bus::new();
        role.attach(&mut bus);
        bus.publish(Message::user("doomed"));

        let err = Scheduler::new(4)
            .run(&mut bus, &mut [role])
            .await
            .unwrap_err();
        assert!(err.is_unavailable());
    }
}
