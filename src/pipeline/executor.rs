//! Sequential plan execution.
//!
//! One logical thread of control: each task blocks on the runner before the
//! next starts, and the result list is appended by this loop alone. A runner
//! failure aborts the remaining pipeline; later tasks are not well-defined
//! without their upstream outputs.

use thiserror::Error;
use tracing::info;

use super::plan::{render_template, ExecutionPlan, PlanError};
use super::{result_for, RunContext, TaskResult, TaskSpec};
use crate::runner::{RunnerError, TaskRunner};

#[derive(Debug, Error)]
pub enum ExecError {
    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("task '{task}' failed: {source}")]
    Generation {
        task: String,
        #[source]
        source: RunnerError,
    },
}

/// Resolve one task's full prompt from the context and upstream results.
///
/// Placeholders in the description and expected-output templates resolve
/// from context variables first, then upstream task outputs by task name.
/// Outputs of `depends_on` tasks are appended as labelled context blocks
/// whether or not the template references them.
fn build_prompt(
    task: &TaskSpec,
    ctx: &RunContext,
    results: &[TaskResult],
) -> Result<String, PlanError> {
    let lookup = |key: &str| {
        ctx.var(key)
            .map(str::to_string)
            .or_else(|| result_for(results, key).map(|r| r.output.clone()))
    };

    let description = render_template(&task.name, &task.description, lookup)?;
    let expected = render_template(&task.name, &task.expected_output, lookup)?;

    let mut prompt = description;
    prompt.push_str("\n\nExpected output:\n");
    prompt.push_str(&expected);

    for dep in &task.depends_on {
        // Plan validation guarantees the dependency ran already.
        if let Some(result) = result_for(results, dep) {
            prompt.push_str(&format!("\n\n## Context from {dep}:\n{}", result.output));
        }
    }

    Ok(prompt)
}

/// Run every task of `plan` in order against `runner`.
///
/// Returns the results in completion order (identical to plan order).
pub async fn run_plan(
    plan: &ExecutionPlan,
    ctx: &RunContext,
    runner: &dyn TaskRunner,
) -> Result<Vec<TaskResult>, ExecError> {
    let mut results: Vec<TaskResult> = Vec::with_capacity(plan.len());

    for (position, planned) in plan.tasks().iter().enumerate() {
        let task = &planned.task;

        info!(
            run = %ctx.id,
            task = %task.name,
            agent = %planned.agent.name,
            step = position + 1,
            of = plan.len(),
            "executing task"
        );

        let prompt = build_prompt(task, ctx, &results)?;
        let output = runner
            .execute(&planned.agent, &prompt)
            .await
            .map_err(|source| ExecError::Generation {
                task: task.name.clone(),
                source,
            })?;

        info!(task = %task.name, chars = output.len(), "task completed");
        results.push(TaskResult::new(task.name.clone(), output));
    }

    Ok(results)
}
