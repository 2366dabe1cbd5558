//! The shipped workflows.
//!
//! Each workflow resolves its inputs, loads a pipeline configuration, runs
//! the plan against a [`crate::runner::TaskRunner`], and writes the final
//! artifacts. Failures anywhere abort the run with the offending task or
//! field named.

pub mod blog;
pub mod job_application;

use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::input::InputError;
use crate::output::{OutputWriter, WriteError};
use crate::pipeline::{result_for, ConfigError, ExecError, ExecutionPlan, PlanError, TaskResult};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("task '{task}' returned malformed structured output: {reason}")]
    MalformedOutput { task: String, reason: String },
}

/// Write the artifact of every task that declares an `output_file`.
///
/// Walks the plan in execution order so artifact writes are deterministic.
pub(crate) fn write_artifacts(
    plan: &ExecutionPlan,
    results: &[TaskResult],
    writer: &OutputWriter,
) -> Result<Vec<PathBuf>, WriteError> {
    let mut written = Vec::new();
    for planned in plan.tasks() {
        let Some(file_name) = planned.task.output_file.as_deref() else {
            continue;
        };
        if let Some(result) = result_for(results, &planned.task.name) {
            let path = writer.write(file_name, &result.output)?;
            info!(task = %planned.task.name, path = %path.display(), "artifact saved");
            written.push(path);
        }
    }
    Ok(written)
}
