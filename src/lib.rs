//! # crewline
//!
//! A command line runner for YAML-configured agent pipelines that generate
//! documents: tailored resumes, interview preparation material, and technical
//! blog series.
//!
//! The heavy lifting (reasoning, web research) happens inside the remote LLM
//! behind the [`runner::TaskRunner`] boundary. This crate owns everything
//! around that boundary:
//!
//! ```text
//!   CLI / env
//!      │
//!      ▼
//!   ┌───────────────┐   ┌────────────────┐
//!   │ input resolver │   │ config loader  │  agents.yaml / tasks.yaml
//!   └───────┬───────┘   └───────┬────────┘
//!           │                   │
//!           ▼                   ▼
//!        ┌─────────────────────────┐
//!        │     execution plan      │  topological order, prompt templates
//!        └────────────┬────────────┘
//!                     ▼
//!        ┌─────────────────────────┐
//!        │   sequential executor   │──▶ TaskRunner (remote LLM)
//!        └────────────┬────────────┘
//!                     ▼
//!        ┌─────────────────────────┐
//!        │  atomic output writer   │──▶ *.md artifacts
//!        └─────────────────────────┘
//! ```
//!
//! ## Modules
//! - `pipeline`: agent/task model, YAML loading, ordering, execution
//! - `runner`: the external LLM boundary and its OpenAI-backed client
//! - `input`: CLI input validation and profile text extraction
//! - `workflow`: the shipped pipelines (job application, blog series)
//! - `output`: atomic Markdown artifact writer

pub mod cli;
pub mod credentials;
pub mod input;
pub mod output;
pub mod pipeline;
pub mod runner;
pub mod util;
pub mod workflow;

pub use credentials::{CredentialError, Credentials, DEFAULT_MODEL};
pub use pipeline::{AgentSpec, PipelineConfig, RunContext, TaskResult, TaskSpec, ToolId};
pub use runner::{OpenAiRunner, TaskRunner};
