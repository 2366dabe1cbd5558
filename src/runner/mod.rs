//! The external generation boundary.
//!
//! Everything that actually produces text (the remote LLM, its tool use, its
//! own retry policy) lives behind [`TaskRunner`]. The pipeline only supplies
//! a well-formed agent persona and prompt and consumes the returned text; a
//! failure here aborts the remaining pipeline, since later tasks are not
//! well-defined without their inputs.

mod error;
mod openai;

pub use error::{classify_http_status, RetryConfig, RunnerError, RunnerErrorKind};
pub use openai::OpenAiRunner;

use async_trait::async_trait;

use crate::pipeline::AgentSpec;

/// Executes one task prompt as the given agent and returns the produced text.
#[async_trait]
pub trait TaskRunner: Send + Sync {
    async fn execute(&self, agent: &AgentSpec, prompt: &str) -> Result<String, RunnerError>;
}
