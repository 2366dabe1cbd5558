//! Loading and validation of the agent/task YAML documents.
//!
//! A configuration directory holds `agents.yaml` and `tasks.yaml`, each a
//! mapping keyed by name. Declaration order is significant for tasks (it
//! breaks ties between independent tasks in the execution plan), so documents
//! are walked as raw YAML mappings rather than deserialized into unordered
//! maps.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::{AgentSpec, TaskSpec, ToolId};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read {file}: {source}")]
    Io {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {file}: {source}")]
    Parse {
        file: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{file}: expected a mapping of names to definitions")]
    NotAMapping { file: PathBuf },

    #[error("agent '{agent}' lists unknown tool '{tool}'")]
    UnknownTool { agent: String, tool: String },

    #[error("task '{task}' references undefined agent '{agent}'")]
    UnknownAgent { task: String, agent: String },
}

/// Raw agent entry as written in `agents.yaml` (tools still strings).
#[derive(Debug, Deserialize)]
struct AgentEntry {
    role: String,
    goal: String,
    backstory: String,
    #[serde(default)]
    tools: Vec<String>,
    #[serde(default)]
    model: Option<String>,
}

/// Raw task entry as written in `tasks.yaml`.
#[derive(Debug, Deserialize)]
struct TaskEntry {
    description: String,
    expected_output: String,
    agent: String,
    #[serde(default)]
    depends_on: Vec<String>,
    #[serde(default)]
    output_file: Option<String>,
}

/// Parsed and validated pipeline configuration.
///
/// Agents and tasks keep the declaration order of their source documents.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub agents: Vec<AgentSpec>,
    pub tasks: Vec<TaskSpec>,
}

impl PipelineConfig {
    /// Load `agents.yaml` and `tasks.yaml` from `dir`.
    ///
    /// # Errors
    ///
    /// - `NotFound` / `Io` / `Parse` for file-level problems
    /// - `UnknownTool` for a tool identifier outside [`ToolId`]
    /// - `UnknownAgent` for a task naming an agent absent from the agents
    ///   document
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let agents = load_agents(&dir.join("agents.yaml"))?;
        let tasks = load_tasks(&dir.join("tasks.yaml"))?;

        for task in &tasks {
            if !agents.iter().any(|a| a.name == task.agent) {
                return Err(ConfigError::UnknownAgent {
                    task: task.name.clone(),
                    agent: task.agent.clone(),
                });
            }
        }

        debug!(
            dir = %dir.display(),
            agents = agents.len(),
            tasks = tasks.len(),
            "loaded pipeline configuration"
        );
        Ok(Self { agents, tasks })
    }

    /// Look up an agent by name.
    pub fn agent(&self, name: &str) -> Option<&AgentSpec> {
        self.agents.iter().find(|a| a.name == name)
    }

    /// Look up a task by name.
    pub fn task(&self, name: &str) -> Option<&TaskSpec> {
        self.tasks.iter().find(|t| t.name == name)
    }
}

/// Read a YAML document as an ordered mapping of name → entry.
fn load_mapping(file: &Path) -> Result<Vec<(String, serde_yaml::Value)>, ConfigError> {
    if !file.exists() {
        return Err(ConfigError::NotFound(file.to_path_buf()));
    }
    let text = std::fs::read_to_string(file).map_err(|source| ConfigError::Io {
        file: file.to_path_buf(),
        source,
    })?;
    let doc: serde_yaml::Value =
        serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            file: file.to_path_buf(),
            source,
        })?;
    let mapping = doc.as_mapping().ok_or_else(|| ConfigError::NotAMapping {
        file: file.to_path_buf(),
    })?;

    mapping
        .iter()
        .map(|(key, value)| {
            let name = key
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| ConfigError::NotAMapping {
                    file: file.to_path_buf(),
                })?;
            Ok((name, value.clone()))
        })
        .collect()
}

fn load_agents(file: &Path) -> Result<Vec<AgentSpec>, ConfigError> {
    let mut agents = Vec::new();

    for (name, value) in load_mapping(file)? {
        let entry: AgentEntry =
            serde_yaml::from_value(value).map_err(|source| ConfigError::Parse {
                file: file.to_path_buf(),
                source,
            })?;

        let mut tools = Vec::with_capacity(entry.tools.len());
        for tool in &entry.tools {
            let id = ToolId::from_str(tool).map_err(|_| ConfigError::UnknownTool {
                agent: name.clone(),
                tool: tool.clone(),
            })?;
            tools.push(id);
        }

        agents.push(AgentSpec {
            name,
            role: entry.role,
            goal: entry.goal,
            backstory: entry.backstory,
            tools,
            model: entry.model,
        });
    }

    Ok(agents)
}

fn load_tasks(file: &Path) -> Result<Vec<TaskSpec>, ConfigError> {
    let mut tasks = Vec::new();

    for (name, value) in load_mapping(file)? {
        let entry: TaskEntry =
            serde_yaml::from_value(value).map_err(|source| ConfigError::Parse {
                file: file.to_path_buf(),
                source,
            })?;

        tasks.push(TaskSpec {
            name,
            description: entry.description,
            expected_output: entry.expected_output,
            agent: entry.agent,
            depends_on: entry.depends_on,
            output_file: entry.output_file,
        });
    }

    Ok(tasks)
}
