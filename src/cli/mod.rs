//! CLI module - command handling for the troupe binary

pub mod commands;

pub use commands::{config_path, init_config, run_pipeline, show_config};
