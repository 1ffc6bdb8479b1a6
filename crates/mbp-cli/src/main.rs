// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use anyhow::Result;
use mbp_cli::config::{self, Settings};
use mbp_cli::{Cli, Commands, Parser};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let flags = cli.config_overrides();
    let (resolved, paths) = config::load(cli.config.as_deref(), &flags)?;
    let settings = Settings::from_resolved(&resolved, &paths.user_dir())?;

    let default_level = settings.logging.default_level();
    cli.logging.clone().init_with_default_level("mbp-seeder", default_level)?;

    // Ctrl-C stops the crawl; jobs already handled stay in the report
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    let succeeded = match cli.command {
        Commands::Seed(args) => args.run(&settings, cancel).await?,
        Commands::Discover(args) => {
            args.run(&settings, cancel).await?;
            true
        }
        Commands::Render(args) => {
            args.run(&settings).await?;
            true
        }
        Commands::Config { subcommand } => {
            subcommand.run(&resolved)?;
            true
        }
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
