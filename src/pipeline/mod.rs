//! Video understanding pipeline - the demonstrated two-role cast
//!
//! A planner role running a chain-of-focus reasoning model analyzes the
//! user's request; a tool-agent role running a video description model
//! watches the planner's output and describes the visual content. Each
//! role talks to its own independently configured backend.

use std::sync::Arc;

use crate::core::{Config, Result, RuntimeConfig, TroupeError};
use crate::llm::{CompletionProvider, OpenAiClient};
use crate::runtime::{
    Bus, FailurePolicy, Message, PromptAction, Role, Scheduler, TurnOutcome, USER_INPUT_KIND,
};

/// Kind tag of the planner's reasoning output
pub const REASONING_ACTION: &str = "cof_reasoning";
/// Kind tag of the tool agent's description output
pub const DESCRIPTION_ACTION: &str = "video_description";

const PLANNER_IDENTITY: &str = "CoFPlanner";
const DESCRIBER_IDENTITY: &str = "OpenO3Agent";

const REASONING_TEMPLATE: &str =
    "You are a video reasoning expert. Analyze this request: {instruction}";
const DESCRIPTION_TEMPLATE: &str =
    "You are a video description expert. Describe the visual content for: {instruction}";

/// The planner-then-describer cast wired to a bus
pub struct VideoPipeline {
    bus: Bus,
    /// roles[0] is the planner; the seed instruction goes to it
    roles: Vec<Role>,
    runtime: RuntimeConfig,
}

impl VideoPipeline {
    /// Build the pipeline from configuration, one HTTP client per role
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let planner_llm: Arc<dyn CompletionProvider> = Arc::new(OpenAiClient::with_debug(
            config.planner.clone(),
            config.runtime.debug,
        ));
        let describer_llm: Arc<dyn CompletionProvider> = Arc::new(OpenAiClient::with_debug(
            config.describer.clone(),
            config.runtime.debug,
        ));

        Self::with_providers(planner_llm, describer_llm, config.runtime.clone())
    }

    /// Build the pipeline with explicit providers (test seam)
    pub fn with_providers(
        planner_llm: Arc<dyn CompletionProvider>,
        describer_llm: Arc<dyn CompletionProvider>,
        runtime: RuntimeConfig,
    ) -> Result<Self> {
        let policy = if runtime.retain_on_failure {
            FailurePolicy::Retain
        } else {
            FailurePolicy::Discard
        };

        let planner = Role::builder(PLANNER_IDENTITY, "Planner")
            .provider(planner_llm)
            .action(
                PromptAction::new(REASONING_ACTION, REASONING_TEMPLATE)
                    .with_streaming(runtime.stream),
            )
            .route(USER_INPUT_KIND, REASONING_ACTION)
            .failure_policy(policy)
            .build()?;

        let describer = Role::builder(DESCRIBER_IDENTITY, "ToolAgent")
            .provider(describer_llm)
            .action(
                PromptAction::new(DESCRIPTION_ACTION, DESCRIPTION_TEMPLATE)
                    .with_streaming(runtime.stream),
            )
            .route(REASONING_ACTION, DESCRIPTION_ACTION)
            .failure_policy(policy)
            .build()?;

        let mut bus = Bus::new();
        planner.attach(&mut bus);
        describer.attach(&mut bus);

        Ok(Self {
            bus,
            roles: vec![planner, describer],
            runtime,
        })
    }

    /// Probe both backends before driving the pipeline
    pub async fn preflight(&self) -> Result<()> {
        for role in &self.roles {
            role.preflight().await.map_err(|e| {
                TroupeError::with_context(
                    format!("Backend for {} ({}) failed preflight", role.identity(), role.model()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    /// Drive the pipeline on one user instruction
    ///
    /// Seeds the planner, then offers turns until quiescence. Returns the
    /// messages published during the run, planner output first.
    pub async fn run(&mut self, instruction: &str) -> Result<Vec<Message>> {
        let Self { bus, roles, runtime } = self;
        let mut published = Vec::new();

        let (planner, _) = roles
            .split_first_mut()
            .expect("pipeline always has a planner");

        println!("\n[User]: {}", instruction);
        println!("\n[{} ({})] is thinking...", planner.identity(), planner.model());

        match planner.run(bus, Some(instruction)).await? {
            TurnOutcome::Published(message) => {
                if !runtime.stream {
                    println!("[{}]: {}", message.producer_role, message.content);
                }
                published.push(message);
            }
            TurnOutcome::Declined | TurnOutcome::NoObservableInput => {
                println!("[{}]: no response generated.", planner.identity());
                return Ok(published);
            }
        }

        let scheduler = Scheduler::new(runtime.max_rounds).with_debug(runtime.debug);
        let downstream = scheduler.run(bus, roles).await?;

        for message in &downstream {
            if !runtime.stream {
                println!("\n[{}]: {}", message.producer_role, message.content);
            }
        }
        published.extend(downstream);

        Ok(published)
    }

    /// Every message stamped this run, in publish order
    pub fn transcript(&self) -> &[Message] {
        self.bus.transcript()
    }
}
