// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (RUST_LOG controls the filter, default is info)
// 2. Parse command-line arguments and the environment into a Config
// 3. Rewrite the target section of the README
// 4. Exit with proper code (0 = success, 1 = error)
//
// Search failures for a single repository are not errors at this level;
// they are logged and counted as zero further down. Only things like a
// missing README or a failed write end up here.
// =============================================================================

mod annotate; // src/annotate/ - document and line rewriting
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - flags + environment
mod github; // src/github/ - URL parsing and the search API

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use annotate::{RunReport, Section};
use cli::Cli;
use config::Config;
use github::SearchClient;

#[tokio::main]
async fn main() {
    init_tracing();

    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            error!("Error updating README: {:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so --json output on stdout stays clean
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "readme_stats=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_cli(cli)?;

    if config.token.is_none() {
        warn!("No GitHub token in PAT_READ_ONLY or GITHUB_TOKEN, searching unauthenticated");
    }

    let client = SearchClient::new(&config.api_base, config.token.clone(), config.policy.clone())?;
    let section = Section::new(&config.section);

    info!(
        path = %config.path.display(),
        section = %config.section,
        author = %config.policy.author,
        "Annotating repository links"
    );

    let report = annotate::process_file(&config.path, &section, &client, !config.dry_run).await?;

    if config.json {
        print_report(&report)?;
    }

    if report.written {
        info!("README updated successfully!");
    } else {
        info!(
            "Dry run: {} of {} line(s) would change, {} not written",
            report.lines_rewritten,
            report.lines_total,
            report.path.display()
        );
    }

    Ok(())
}

fn print_report(report: &RunReport) -> Result<()> {
    let json_output = serde_json::to_string_pretty(report)?;
    println!("{}", json_output);
    Ok(())
}
