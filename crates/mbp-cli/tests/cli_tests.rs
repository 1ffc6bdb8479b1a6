// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use config_core::Resolved;
use mbp_cli::config::Settings;
use mbp_cli::config_commands::ConfigCommands;
use mbp_cli::{Cli, Commands, Parser};
use mbp_domain_types::JobKind;
use serde_json::{Value, json};
use std::path::Path;

fn overrides(args: &[&str]) -> Vec<(&'static str, Value)> {
    Cli::try_parse_from(args).expect("parse").config_overrides()
}

#[test]
fn seed_flags_parse() {
    let cli = Cli::try_parse_from([
        "mbp-seeder",
        "seed",
        "--dry-run",
        "--run-pipelines",
        "--folder",
        "teams/pay",
        "--json",
    ])
    .unwrap();

    match cli.command {
        Commands::Seed(args) => {
            assert!(args.dry_run);
            assert!(args.run_pipelines);
            assert_eq!(args.folder.as_deref(), Some("teams/pay"));
            assert!(args.json);
        }
        _ => panic!("expected seed"),
    }
}

#[test]
fn global_flags_become_config_overrides() {
    let flags = overrides(&[
        "mbp-seeder",
        "discover",
        "--team-project-url",
        "https://tfs.example.com/tfs/Coll/Payments",
        "--credentials-id",
        "tfs-pat",
        "--log-level",
        "debug",
        "--no-ad-hoc",
    ]);

    assert_eq!(
        flags,
        vec![
            ("git-host.team-project-url", json!("https://tfs.example.com/tfs/Coll/Payments")),
            ("git-host.credentials-id", json!("tfs-pat")),
            ("log-level", json!("debug")),
            ("discovery.ad-hoc", json!(false)),
        ]
    );
}

#[test]
fn global_flags_are_accepted_after_the_subcommand() {
    let flags = overrides(&["mbp-seeder", "seed", "--credentials-id", "tfs-pat"]);
    assert_eq!(flags, vec![("git-host.credentials-id", json!("tfs-pat"))]);
}

#[test]
fn render_defaults_to_multibranch() {
    let cli = Cli::try_parse_from(["mbp-seeder", "render", "--repo", "svc-a"]).unwrap();
    match cli.command {
        Commands::Render(args) => {
            assert_eq!(args.kind, JobKind::Multibranch);
            assert_eq!(args.repo, "svc-a");
        }
        _ => panic!("expected render"),
    }
}

#[test]
fn render_requires_a_repository() {
    assert!(Cli::try_parse_from(["mbp-seeder", "render"]).is_err());
}

#[test]
fn config_subcommands_parse() {
    let cli = Cli::try_parse_from(["mbp-seeder", "config", "show", "jenkins.url", "--explain"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Config {
            subcommand: ConfigCommands::Show { ref key, explain: true }
        } if key.as_deref() == Some("jenkins.url")
    ));

    let cli = Cli::try_parse_from(["mbp-seeder", "config", "schema"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Config {
            subcommand: ConfigCommands::Schema
        }
    ));
}

fn settings(json: Value) -> Settings {
    let resolved = Resolved {
        json,
        provenance: Default::default(),
    };
    Settings::from_resolved(&resolved, Path::new("/nonexistent")).unwrap()
}

#[test]
fn render_builds_ad_hoc_descriptor_from_flags() {
    let cli = Cli::try_parse_from([
        "mbp-seeder",
        "render",
        "--repo",
        "svc-a",
        "--kind",
        "ad-hoc",
        "--file",
        "deploy.Jenkinsfile",
    ])
    .unwrap();
    let Commands::Render(args) = cli.command else {
        panic!("expected render");
    };

    let descriptor = args
        .descriptor(&settings(json!({
            "git-host": {
                "team-project-url": "https://tfs.example.com/tfs/Coll/Payments",
                "credentials-id": "tfs-pat"
            }
        })))
        .unwrap();

    assert_eq!(descriptor.kind, JobKind::AdHoc);
    assert_eq!(descriptor.job_name, "svc-a deploy");
    assert_eq!(descriptor.branch, "master");
    assert_eq!(descriptor.credential_reference, "tfs-pat");
}

#[test]
fn ad_hoc_render_without_file_fails() {
    let cli = Cli::try_parse_from(["mbp-seeder", "render", "--repo", "svc-a", "--kind", "ad-hoc"]).unwrap();
    let Commands::Render(args) = cli.command else {
        panic!("expected render");
    };

    let err = args
        .descriptor(&settings(json!({
            "git-host": {
                "team-project-url": "https://tfs.example.com/tfs/Coll/Payments",
                "credentials-id": "tfs-pat"
            }
        })))
        .unwrap_err();
    assert!(err.to_string().contains("--file"));
}

#[test]
fn explicit_config_file_is_layered_under_flags() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("seeder.toml");
    std::fs::write(
        &file,
        r#"
        [git-host]
        team-project-url = "https://tfs.example.com/tfs/Coll/Payments"
        credentials-id = "from-file"
        [jenkins]
        url = "https://ci.example.com"
        "#,
    )
    .unwrap();

    let flags = overrides(&["mbp-seeder", "discover", "--credentials-id", "from-flag"]);
    let (resolved, _) = mbp_cli::config::load(file.to_str(), &flags).unwrap();
    let settings = Settings::from_resolved(&resolved, dir.path()).unwrap();

    assert_eq!(settings.jenkins.url.as_deref(), Some("https://ci.example.com"));
    assert_eq!(settings.git_credentials_id().unwrap(), "from-flag");
    assert_eq!(settings.team_project().unwrap().name, "Payments");
}

#[test]
fn missing_explicit_config_file_is_an_error() {
    assert!(mbp_cli::config::load(Some("/nonexistent/seeder.toml"), &[]).is_err());
}
