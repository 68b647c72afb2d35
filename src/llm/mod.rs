//! LLM module - completion provider abstraction and HTTP client

pub mod openai;
pub mod traits;

pub use openai::OpenAiClient;
pub use traits::{CompletionProvider, GenerateOptions, StreamCallback};
