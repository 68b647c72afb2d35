//! Troupe - A message-passing multi-agent runtime for LLM-backed roles
//!
//! Independent roles, each wrapping its own language-model backend,
//! exchange typed messages over a bus to collaborate on a task. A role
//! subscribes to message kinds, observes its inbox, selects an action by
//! table lookup, runs it against its provider, and publishes the result
//! for downstream roles.
//!
//! # Architecture
//!
//! - **Core**: Configuration and error handling
//! - **LLM**: Completion provider abstraction with an OpenAI-compatible client
//! - **Runtime**: Message, Bus, Action, Role, and Scheduler
//! - **Pipeline**: The two-role video-understanding cast
//! - **CLI**: Command-line interface
//!
//! # Usage
//!
//! ```rust,no_run
//! use troupe::core::Config;
//! use troupe::pipeline::VideoPipeline;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::load();
//!     let mut pipeline = VideoPipeline::from_config(&config).unwrap();
//!
//!     let messages = pipeline
//!         .run("Analyze the motion of a person jumping in the video.")
//!         .await
//!         .unwrap();
//!     println!("{} messages published", messages.len());
//! }
//! ```

pub mod cli;
pub mod core;
pub mod llm;
pub mod pipeline;
pub mod runtime;

// Re-export commonly used items
pub use crate::core::{Config, Result, TroupeError};
pub use crate::runtime::{Bus, Message, MessageKind, Role, Scheduler, TurnOutcome};
