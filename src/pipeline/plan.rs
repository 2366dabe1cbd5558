//! Execution ordering and prompt template resolution.
//!
//! Tasks run in a topological order of their `depends_on` graph. Ties between
//! independent tasks are broken by declaration order in `tasks.yaml`, which
//! makes the order fully deterministic; downstream tasks that concatenate
//! upstream outputs positionally rely on this.

use thiserror::Error;

use super::{AgentSpec, PipelineConfig, TaskSpec};

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("dependency cycle among tasks: {}", .0.join(", "))]
    CyclicDependency(Vec<String>),

    #[error("task '{task}' references unknown name '{reference}'")]
    UnresolvedPlaceholder { task: String, reference: String },
}

/// A task bound to the agent that will execute it.
#[derive(Debug, Clone)]
pub struct PlannedTask {
    pub task: TaskSpec,
    pub agent: AgentSpec,
}

/// A deterministic, dependency-respecting task order.
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    tasks: Vec<PlannedTask>,
}

impl ExecutionPlan {
    /// Order the configured tasks.
    ///
    /// Kahn's algorithm with the ready set scanned in declaration order.
    ///
    /// # Errors
    ///
    /// - `UnresolvedPlaceholder` if a `depends_on` entry names a task that is
    ///   not declared, or a task names an agent absent from the configuration
    /// - `CyclicDependency` if the graph is not a DAG (names the tasks left
    ///   on the cycle)
    pub fn build(config: &PipelineConfig) -> Result<Self, PlanError> {
        let tasks = &config.tasks;

        for task in tasks {
            for dep in &task.depends_on {
                if !tasks.iter().any(|t| &t.name == dep) {
                    return Err(PlanError::UnresolvedPlaceholder {
                        task: task.name.clone(),
                        reference: dep.clone(),
                    });
                }
            }
        }

        let mut emitted = vec![false; tasks.len()];
        let mut ordered = Vec::with_capacity(tasks.len());

        while ordered.len() < tasks.len() {
            // First declared task whose dependencies are all emitted.
            let next = tasks.iter().enumerate().position(|(i, task)| {
                !emitted[i]
                    && task.depends_on.iter().all(|dep| {
                        tasks
                            .iter()
                            .position(|t| &t.name == dep)
                            .map(|j| emitted[j])
                            .unwrap_or(false)
                    })
            });

            match next {
                Some(i) => {
                    let agent = config.agent(&tasks[i].agent).cloned().ok_or_else(|| {
                        PlanError::UnresolvedPlaceholder {
                            task: tasks[i].name.clone(),
                            reference: tasks[i].agent.clone(),
                        }
                    })?;
                    emitted[i] = true;
                    ordered.push(PlannedTask {
                        task: tasks[i].clone(),
                        agent,
                    });
                }
                None => {
                    let stuck = tasks
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| !emitted[*i])
                        .map(|(_, t)| t.name.clone())
                        .collect();
                    return Err(PlanError::CyclicDependency(stuck));
                }
            }
        }

        Ok(Self { tasks: ordered })
    }

    /// Tasks in execution order, each bound to its agent.
    pub fn tasks(&self) -> &[PlannedTask] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Substitute `{key}` placeholders in a task's template.
///
/// `lookup` resolves a key from the run context or an upstream task result.
/// `{{` and `}}` produce literal braces. A key outside the lookup is an
/// `UnresolvedPlaceholder` naming the task and the key.
pub fn render_template(
    task: &str,
    template: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, PlanError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut key = String::new();
                let mut closed = false;
                for k in chars.by_ref() {
                    if k == '}' {
                        closed = true;
                        break;
                    }
                    key.push(k);
                }
                if !closed {
                    return Err(PlanError::UnresolvedPlaceholder {
                        task: task.to_string(),
                        reference: format!("{{{key}"),
                    });
                }
                match lookup(key.trim()) {
                    Some(value) => out.push_str(&value),
                    None => {
                        return Err(PlanError::UnresolvedPlaceholder {
                            task: task.to_string(),
                            reference: key.trim().to_string(),
                        })
                    }
                }
            }
            other => out.push(other),
        }
    }

    Ok(out)
}
