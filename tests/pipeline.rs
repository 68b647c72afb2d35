//! End-to-end pipeline tests
//!
//! Drives the two-role video pipeline with scripted backends and checks
//! routing, provenance, and failure surfacing.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use troupe::core::{Result, RuntimeConfig, TroupeError};
use troupe::llm::{CompletionProvider, GenerateOptions};
use troupe::pipeline::{VideoPipeline, DESCRIPTION_ACTION, REASONING_ACTION};

/// Scripted backend standing in for one endpoint/model pair
///
/// Records every prompt it receives so tests can check that each role's
/// prompts reached its own backend and no other.
struct MockBackend {
    endpoint: String,
    model: String,
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl MockBackend {
    fn new(endpoint: &str, model: &str, reply: &str) -> Arc<Self> {
        Arc::new(Self {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for MockBackend {
    async fn complete(&self, prompt: &str, _options: Option<GenerateOptions>) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(format!("[{}] {}", self.endpoint, self.reply))
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Backend whose endpoint is never reachable
struct DownBackend;

#[async_trait]
impl CompletionProvider for DownBackend {
    async fn complete(&self, _prompt: &str, _options: Option<GenerateOptions>) -> Result<String> {
        Err(TroupeError::unavailable(
            "http://localhost:9/v1",
            "connection refused",
        ))
    }

    fn model(&self) -> &str {
        "down-model"
    }

    fn name(&self) -> &str {
        "down"
    }
}

fn quiet_runtime() -> RuntimeConfig {
    RuntimeConfig {
        max_rounds: 8,
        retain_on_failure: true,
        debug: false,
        stream: false,
    }
}

const INSTRUCTION: &str = "Analyze the motion of a person jumping in the video.";

#[tokio::test]
async fn planner_publishes_one_reasoning_message() {
    let planner = MockBackend::new("http://localhost:8005/v1", "CoF-rl-model-7b", "a plan");
    let describer = MockBackend::new("http://localhost:8006/v1", "Open-o3-Video", "a description");

    let mut pipeline =
        VideoPipeline::with_providers(planner.clone(), describer.clone(), quiet_runtime()).unwrap();
    let published = pipeline.run(INSTRUCTION).await.unwrap();

    let reasoning: Vec<_> = published
        .iter()
        .filter(|m| m.kind.as_str() == REASONING_ACTION)
        .collect();
    assert_eq!(reasoning.len(), 1);
    assert!(!reasoning[0].content.trim().is_empty());
    assert_eq!(reasoning[0].producer_role, "CoFPlanner");
}

#[tokio::test]
async fn describer_consumes_planner_output() {
    let planner = MockBackend::new("http://localhost:8005/v1", "CoF-rl-model-7b", "a plan");
    let describer = MockBackend::new("http://localhost:8006/v1", "Open-o3-Video", "a description");

    let mut pipeline =
        VideoPipeline::with_providers(planner.clone(), describer.clone(), quiet_runtime()).unwrap();
    let published = pipeline.run(INSTRUCTION).await.unwrap();

    assert_eq!(published.len(), 2);
    assert_eq!(published[0].kind.as_str(), REASONING_ACTION);
    assert_eq!(published[1].kind.as_str(), DESCRIPTION_ACTION);
    assert_eq!(published[1].producer_role, "OpenO3Agent");
    assert!(!published[1].content.trim().is_empty());

    // Provenance chain: description <- reasoning <- seed
    assert_eq!(published[1].causal_parent, Some(published[0].id));
    let seed = &pipeline.transcript()[0];
    assert_eq!(seed.producer_role, "user");
    assert_eq!(published[0].causal_parent, Some(seed.id));

    // The describer was prompted with the planner's output
    let describer_prompts = describer.prompts();
    assert_eq!(describer_prompts.len(), 1);
    assert!(describer_prompts[0].contains(&published[0].content));
}

#[tokio::test]
async fn unreachable_backend_surfaces_and_publishes_nothing() {
    let describer = MockBackend::new("http://localhost:8006/v1", "Open-o3-Video", "a description");

    let mut pipeline =
        VideoPipeline::with_providers(Arc::new(DownBackend), describer.clone(), quiet_runtime())
            .unwrap();
    let err = pipeline.run(INSTRUCTION).await.unwrap_err();

    assert!(err.is_unavailable(), "got {:?}", err);
    // Only the seed is in the transcript; no action output was published
    assert_eq!(pipeline.transcript().len(), 1);
    assert_eq!(pipeline.transcript()[0].producer_role, "user");
    // The describer never saw a prompt
    assert!(describer.prompts().is_empty());
}

#[tokio::test]
async fn distinct_endpoints_are_never_cross_wired() {
    let planner = MockBackend::new("http://localhost:8005/v1", "CoF-rl-model-7b", "planner says");
    let describer = MockBackend::new(
        "http://localhost:8006/v1",
        "Open-o3-Video",
        "describer says",
    );

    let mut pipeline =
        VideoPipeline::with_providers(planner.clone(), describer.clone(), quiet_runtime()).unwrap();
    let published = pipeline.run(INSTRUCTION).await.unwrap();

    // Replies carry the endpoint they came from
    assert!(published[0].content.starts_with("[http://localhost:8005/v1]"));
    assert!(published[1].content.starts_with("[http://localhost:8006/v1]"));

    // Each backend saw exactly one prompt, and the planner's was built
    // from the user instruction, not the describer template
    let planner_prompts = planner.prompts();
    assert_eq!(planner_prompts.len(), 1);
    assert!(planner_prompts[0].contains("video reasoning expert"));
    assert!(planner_prompts[0].contains(INSTRUCTION));

    let describer_prompts = describer.prompts();
    assert_eq!(describer_prompts.len(), 1);
    assert!(describer_prompts[0].contains("video description expert"));
}

#[tokio::test]
async fn preflight_probes_both_backends() {
    let planner = MockBackend::new("http://localhost:8005/v1", "CoF-rl-model-7b", "pong");
    let describer = MockBackend::new("http://localhost:8006/v1", "Open-o3-Video", "pong");

    let pipeline =
        VideoPipeline::with_providers(planner.clone(), describer.clone(), quiet_runtime()).unwrap();
    pipeline.preflight().await.unwrap();

    assert_eq!(planner.prompts().len(), 1);
    assert_eq!(describer.prompts().len(), 1);
}

#[tokio::test]
async fn preflight_fails_on_dead_backend() {
    let describer = MockBackend::new("http://localhost:8006/v1", "Open-o3-Video", "pong");

    let pipeline =
        VideoPipeline::with_providers(Arc::new(DownBackend), describer, quiet_runtime()).unwrap();
    let err = pipeline.preflight().await.unwrap_err();

    assert!(err.to_string().contains("CoFPlanner"));
}
