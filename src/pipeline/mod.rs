//! Agent/task pipeline model.
//!
//! A pipeline is described by two YAML documents (agents, tasks), ordered into
//! an execution plan, and run strictly sequentially against a
//! [`crate::runner::TaskRunner`]. All types here are created fresh per
//! invocation and never persisted.

pub mod config;
pub mod executor;
pub mod plan;

pub use config::{ConfigError, PipelineConfig};
pub use executor::{run_plan, ExecError};
pub use plan::{ExecutionPlan, PlanError, PlannedTask};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tools an agent may be granted.
///
/// The set is closed: tool identifiers in `agents.yaml` are resolved against
/// these variants at load time, so an unknown identifier is a configuration
/// error rather than a runtime surprise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolId {
    /// SerperDev web search.
    Search,
    /// Website scraping.
    Scrape,
    /// Read the candidate's resume file.
    ReadResume,
    /// Semantic search over the resume.
    SemanticSearch,
    /// Search the LinkedIn profile PDF.
    PdfSearch,
}

impl ToolId {
    /// Stable identifier used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolId::Search => "search",
            ToolId::Scrape => "scrape",
            ToolId::ReadResume => "read_resume",
            ToolId::SemanticSearch => "semantic_search",
            ToolId::PdfSearch => "pdf_search",
        }
    }
}

impl std::str::FromStr for ToolId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "search" => Ok(ToolId::Search),
            "scrape" => Ok(ToolId::Scrape),
            "read_resume" => Ok(ToolId::ReadResume),
            "semantic_search" => Ok(ToolId::SemanticSearch),
            "pdf_search" => Ok(ToolId::PdfSearch),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for ToolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named agent persona loaded from `agents.yaml`.
///
/// Immutable once loaded; referenced by tasks through its name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Name the tasks document refers to this agent by.
    pub name: String,

    /// Short role line, e.g. "Tech Job Researcher".
    pub role: String,

    /// What the agent is trying to achieve.
    pub goal: String,

    /// Persona background woven into the system prompt.
    pub backstory: String,

    /// Tools this agent is permitted to use.
    #[serde(default)]
    pub tools: Vec<ToolId>,

    /// Model override for this agent; falls back to the run's model.
    #[serde(default)]
    pub model: Option<String>,
}

/// A unit of work loaded from `tasks.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Name upstream tasks and templates refer to this task by.
    pub name: String,

    /// Prompt template. `{key}` placeholders resolve from the run context
    /// and from upstream task outputs; `{{`/`}}` escape literal braces.
    pub description: String,

    /// Description of the expected result, appended to the prompt.
    pub expected_output: String,

    /// Name of the agent that executes this task.
    pub agent: String,

    /// Upstream tasks whose outputs feed this task's prompt, in order.
    #[serde(default)]
    pub depends_on: Vec<String>,

    /// Artifact file name this task's output is written to, if any.
    #[serde(default)]
    pub output_file: Option<String>,
}

/// Inputs and settings for one invocation.
///
/// Built once by the input resolver and read-only afterwards; no component
/// mutates it during execution.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Unique id for this run, used in logs.
    pub id: Uuid,

    /// Resolved input artifacts keyed by placeholder name.
    vars: BTreeMap<String, String>,

    /// Directory artifacts are written to.
    pub output_dir: PathBuf,

    /// Model used when an agent has no override.
    pub model: String,
}

impl RunContext {
    /// Create a context with no variables bound yet.
    pub fn new(output_dir: impl Into<PathBuf>, model: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            vars: BTreeMap::new(),
            output_dir: output_dir.into(),
            model: model.into(),
        }
    }

    /// Bind an input variable.
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Look up an input variable.
    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// All bound variables, for diagnostics.
    pub fn vars(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Output of one completed task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    /// Name of the task that produced this output.
    pub task: String,

    /// Text produced by the runner.
    pub output: String,

    /// When the task completed.
    pub completed_at: DateTime<Utc>,
}

impl TaskResult {
    pub fn new(task: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            output: output.into(),
            completed_at: Utc::now(),
        }
    }
}

/// Find a task's result by name in a completed-run sequence.
pub fn result_for<'a>(results: &'a [TaskResult], task: &str) -> Option<&'a TaskResult> {
    results.iter().find(|r| r.task == task)
}

/// True if `path` carries one of the accepted Markdown extensions.
pub fn is_markdown_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()).map(str::to_lowercase).as_deref(),
        Some("md") | Some("mdx") | Some("markdown")
    )
}
