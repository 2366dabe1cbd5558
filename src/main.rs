//! crewline - CLI entry point.
//!
//! Parses the command line, verifies credentials, and dispatches to the
//! selected workflow.

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crewline::cli::{Cli, Command};
use crewline::credentials::{Credentials, DEFAULT_MODEL};
use crewline::input::PdfProfileExtractor;
use crewline::runner::OpenAiRunner;
use crewline::workflow;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crewline=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::CheckSetup => check_setup(),
        Command::TailorResume(args) => {
            // Credentials are verified before the runner exists, so a missing
            // key is reported here rather than as a late network failure.
            let credentials = Credentials::from_env()?;
            let model = args.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string());
            let runner = OpenAiRunner::new(credentials.openai_api_key, model);

            workflow::job_application::run(&args, &runner, &PdfProfileExtractor).await?;
            info!("job application workflow finished");
            Ok(())
        }
        Command::WriteBlog(args) => {
            let credentials = Credentials::from_env()?;
            let model = args.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string());
            let runner = OpenAiRunner::new(credentials.openai_api_key, model);

            workflow::blog::run(&args, &runner).await?;
            info!("blog workflow finished");
            Ok(())
        }
    }
}

/// Report credential status without touching the network.
fn check_setup() -> anyhow::Result<()> {
    let status = Credentials::status();
    for (name, present) in &status {
        if *present {
            println!("ok       {name}");
        } else {
            println!("missing  {name}");
        }
    }

    if status.iter().all(|(_, present)| *present) {
        println!("setup looks good");
        Ok(())
    } else {
        anyhow::bail!("one or more credentials are missing");
    }
}
