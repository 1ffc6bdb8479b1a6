// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use clap::Subcommand;
use mbp_logging::CliLoggingArgs;
use serde_json::Value;

pub use clap::Parser;

pub mod config;
pub mod config_commands;
pub mod discover;
pub mod render;
pub mod seed;

/// Contributes dotted configuration keys set on the command line
pub trait SubcommandOverrides {
    fn config_overrides(&self) -> Vec<(&'static str, Value)>;
}

#[derive(clap::Parser)]
#[command(
    name = "mbp-seeder",
    about = "Create Jenkins multibranch pipeline jobs for the repositories of a team project",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Extra configuration file, layered above the system, user and project files
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Team project URL, e.g. https://tfs.example.com/tfs/DefaultCollection/Payments
    #[arg(long, global = true)]
    pub team_project_url: Option<String>,
    /// Credential id used to read the team project
    #[arg(long, global = true)]
    pub credentials_id: Option<String>,
    #[command(flatten)]
    pub logging: CliLoggingArgs,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Crawl the team project and create the missing jobs
    Seed(seed::SeedArgs),
    /// Crawl the team project and print what was found
    Discover(discover::DiscoverArgs),
    /// Print the job configuration generated for one repository
    Render(render::RenderArgs),
    Config {
        #[command(subcommand)]
        subcommand: config_commands::ConfigCommands,
    },
}

impl Cli {
    /// Command-line values as dotted keys for the flags configuration layer
    pub fn config_overrides(&self) -> Vec<(&'static str, Value)> {
        let mut flags = Vec::new();
        if let Some(url) = &self.team_project_url {
            flags.push(("git-host.team-project-url", Value::from(url.as_str())));
        }
        if let Some(id) = &self.credentials_id {
            flags.push(("git-host.credentials-id", Value::from(id.as_str())));
        }
        if let Some(level) = self.logging.log_level {
            flags.push(("log-level", Value::from(level.to_string())));
        }
        match &self.command {
            Commands::Seed(args) => flags.extend(args.config_overrides()),
            Commands::Discover(args) => flags.extend(args.config_overrides()),
            Commands::Render(_) | Commands::Config { .. } => {}
        }
        flags
    }
}
