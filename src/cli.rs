//! Command line surface.
//!
//! Workflow inputs are deliberately optional at the parser level; the input
//! resolver owns required-field validation so a missing value is reported as
//! a `MissingArgument` naming the field, before any work starts.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// crewline - agent pipelines for document generation
#[derive(Debug, Parser)]
#[command(name = "crewline")]
#[command(about = "Run YAML-configured agent pipelines that generate documents", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Tailor a resume and interview materials for a specific job posting
    #[command(name = "tailor-resume")]
    TailorResume(JobApplicationArgs),

    /// Plan and write a technical blog series
    #[command(name = "write-blog")]
    WriteBlog(BlogArgs),

    /// Verify that credentials are configured, without calling anything
    #[command(name = "check-setup")]
    CheckSetup,
}

#[derive(Debug, Args)]
pub struct JobApplicationArgs {
    /// Path to the resume file (Markdown: .md, .mdx, or .markdown)
    #[arg(long)]
    pub resume: Option<PathBuf>,

    /// Path to a LinkedIn profile PDF (alternative to --resume)
    #[arg(long)]
    pub linkedin_pdf: Option<PathBuf>,

    /// URL of the job posting
    #[arg(long)]
    pub job_url: Option<String>,

    /// URL of the GitHub profile
    #[arg(long)]
    pub github_url: Option<String>,

    /// Personal writeup about the candidate
    #[arg(long)]
    pub personal_writeup: Option<String>,

    /// Directory to save output files
    #[arg(long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Directory containing agents.yaml and tasks.yaml
    #[arg(long, default_value = "config/job_application")]
    pub config_dir: PathBuf,

    /// LLM model to use
    #[arg(long)]
    pub model: Option<String>,
}

#[derive(Debug, Args)]
pub struct BlogArgs {
    /// Topic of the blog series
    #[arg(long)]
    pub topic: Option<String>,

    /// Goal the series should achieve
    #[arg(long)]
    pub goal: Option<String>,

    /// Skip the planning phase and reuse an existing roadmap file
    #[arg(long)]
    pub skip_planning: bool,

    /// Roadmap Markdown file (required with --skip-planning)
    #[arg(long)]
    pub roadmap_file: Option<PathBuf>,

    /// Directory to save output files
    #[arg(long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Directory containing the blog_planning/ and blog_writing/ configs
    #[arg(long, default_value = "config")]
    pub config_dir: PathBuf,

    /// LLM model to use
    #[arg(long)]
    pub model: Option<String>,
}
