use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod config;
mod domain;
mod error;
mod git;
mod infrastructure;
mod outputs;
mod services;
mod ui;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with LOGGING env var support
    // LOGGING=debug,info,warn,error or just LOGGING=debug
    let log_level = std::env::var("LOGGING")
        .or_else(|_| std::env::var("LOG_LEVEL"))
        .unwrap_or_else(|_| {
            if cli.verbose {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        });

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(false) // CI logs don't want escape codes
        .init();

    match cli.command {
        Commands::Run {
            repository,
            token,
            project,
            branch,
            commit_sha,
            image,
            push_dockerhub,
            push_ghcr,
            dockerhub_namespace,
            ghcr_namespace,
            event,
            run_id,
            sbom,
            report,
            assets,
            dry_run,
        } => {
            commands::run::execute(
                repository,
                token,
                project,
                branch,
                commit_sha,
                image,
                push_dockerhub,
                push_ghcr,
                dockerhub_namespace,
                ghcr_namespace,
                event,
                run_id,
                sbom,
                report,
                assets,
                dry_run,
            )
            .await?;
        }
        Commands::Version {
            repository,
            token,
            project,
            branch,
        } => {
            commands::version::execute(repository, token, project, branch).await?;
        }
        Commands::Tags {
            base_version,
            build_number,
            suffix,
            image,
            sha,
            push_dockerhub,
            push_ghcr,
            dockerhub_namespace,
            ghcr_namespace,
        } => {
            commands::tags::execute(
                base_version,
                build_number,
                suffix,
                image,
                sha,
                push_dockerhub,
                push_ghcr,
                dockerhub_namespace,
                ghcr_namespace,
            )
            .await?;
        }
    }

    Ok(())
}
