//! Job application workflow: tailor a resume for a specific posting.
//!
//! Four agents (researcher, profiler, resume strategist, interview preparer)
//! run as a fan-in pipeline. The strategist's and preparer's outputs become
//! `tailored_resume.md` and `interview_materials.md` in the output directory.

use tracing::info;

use super::{write_artifacts, WorkflowError};
use crate::cli::JobApplicationArgs;
use crate::credentials::DEFAULT_MODEL;
use crate::input::{resolve_job_application, ProfileExtractor};
use crate::output::OutputWriter;
use crate::pipeline::{run_plan, ExecutionPlan, PipelineConfig, RunContext};
use crate::runner::TaskRunner;

/// Run the job application pipeline end to end.
///
/// Inputs are validated and the configuration loaded before the output
/// directory is created or the runner is touched.
pub async fn run(
    args: &JobApplicationArgs,
    runner: &dyn TaskRunner,
    extractor: &dyn ProfileExtractor,
) -> Result<(), WorkflowError> {
    let inputs = resolve_job_application(args, extractor)?;
    let config = PipelineConfig::load(&args.config_dir)?;
    let plan = ExecutionPlan::build(&config)?;

    let model = args
        .model
        .clone()
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let ctx = RunContext::new(&args.output_dir, model)
        .with_var("job_posting_url", inputs.job_posting_url.as_str())
        .with_var("github_url", inputs.github_url.as_str())
        .with_var("personal_writeup", inputs.personal_writeup)
        .with_var("profile_text", inputs.profile_text);

    info!(run = %ctx.id, tasks = plan.len(), "starting job application pipeline");

    let writer = OutputWriter::create(&args.output_dir)?;
    let results = run_plan(&plan, &ctx, runner).await?;
    let written = write_artifacts(&plan, &results, &writer)?;

    info!(
        run = %ctx.id,
        artifacts = written.len(),
        dir = %writer.dir().display(),
        "job application pipeline completed"
    );
    Ok(())
}
