// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Logging setup for the seeder binaries
//!
//! All crates log through `tracing`. Binaries call [`CliLoggingArgs::init_with_default_level`]
//! once at startup; `RUST_LOG` always takes precedence over the level chosen
//! on the command line.

pub mod logging_config;

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub use tracing::Level;

/// Directory and file stem used for log files
const APP_DIR: &str = "mbp-seeder";

/// Output format for log messages
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable plaintext format
    #[default]
    Plaintext,
    /// One JSON object per event
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Plaintext => write!(f, "plaintext"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plaintext" => Ok(LogFormat::Plaintext),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!(
                "Invalid log format: {}. Use 'plaintext' or 'json'",
                s
            )),
        }
    }
}

/// Log level as accepted on the command line and in config files
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CliLogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for Level {
    fn from(level: CliLogLevel) -> Self {
        match level {
            CliLogLevel::Error => Level::ERROR,
            CliLogLevel::Warn => Level::WARN,
            CliLogLevel::Info => Level::INFO,
            CliLogLevel::Debug => Level::DEBUG,
            CliLogLevel::Trace => Level::TRACE,
        }
    }
}

impl std::str::FromStr for CliLogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(CliLogLevel::Error),
            "warn" | "warning" => Ok(CliLogLevel::Warn),
            "info" => Ok(CliLogLevel::Info),
            "debug" => Ok(CliLogLevel::Debug),
            "trace" => Ok(CliLogLevel::Trace),
            other => Err(format!("Invalid log level: {}", other)),
        }
    }
}

impl std::fmt::Display for CliLogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CliLogLevel::Error => "error",
            CliLogLevel::Warn => "warn",
            CliLogLevel::Info => "info",
            CliLogLevel::Debug => "debug",
            CliLogLevel::Trace => "trace",
        };
        f.write_str(s)
    }
}

/// Logging arguments shared by every binary, flattened into its clap parser
///
/// Logs go to stderr unless `--log-file` or `--log-dir` is given, in which
/// case they are appended to a file instead. Stdout stays free for reports.
#[derive(Clone, Debug, Default, clap::Args, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CliLoggingArgs {
    /// Log verbosity level
    #[arg(long, value_enum, global = true, help = "Log verbosity level (default: info)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<CliLogLevel>,

    /// Log output format
    #[arg(long, value_enum, global = true, help = "Log output format (default: plaintext)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_format: Option<LogFormat>,

    /// Directory for log files
    #[arg(long, global = true, help = "Directory for log files (default: platform specific)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,

    /// Log filename
    #[arg(long, global = true, help = "Log filename")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
}

impl CliLoggingArgs {
    /// Initialize logging; `default_level` applies when `--log-level` is absent
    ///
    /// The CLI passes the `log-level` value from the resolved configuration here.
    pub fn init_with_default_level(
        self,
        component: &str,
        default_level: CliLogLevel,
    ) -> anyhow::Result<()> {
        let level = self.log_level.unwrap_or(default_level).into();
        let format = self.log_format.unwrap_or_default();

        if self.log_file.is_some() || self.log_dir.is_some() {
            let log_path = self.resolve_log_path(component);
            init_to_file(component, level, format, &log_path)
        } else {
            init(component, level, format)
        }
    }

    /// Resolve the log file path
    ///
    /// 1. An absolute `log_file` is used as is
    /// 2. A relative `log_file` is placed under `log_dir` when one is given
    /// 3. Without `log_file`, `{log_dir}/{component}.log` is used
    /// 4. Otherwise the platform standard location
    pub fn resolve_log_path(&self, component: &str) -> PathBuf {
        match (&self.log_file, &self.log_dir) {
            (Some(file), _) if Path::new(file).is_absolute() => PathBuf::from(file),
            (Some(file), Some(dir)) => Path::new(dir).join(file),
            (Some(file), None) => {
                if Path::new(file).parent().is_some_and(|p| !p.as_os_str().is_empty()) {
                    PathBuf::from(file)
                } else {
                    get_standard_log_path_for_component(component)
                        .with_file_name(file)
                }
            }
            (None, Some(dir)) => Path::new(dir).join(format!("{}.log", component)),
            (None, None) => get_standard_log_path_for_component(component),
        }
    }
}

/// Standard log file path for a component, next to [`get_standard_log_path`]
pub fn get_standard_log_path_for_component(component: &str) -> PathBuf {
    let base_path = get_standard_log_path();
    let parent = base_path.parent().unwrap_or(Path::new("/tmp"));
    parent.join(format!("{}.log", component))
}

/// Platform-specific log file location
///
/// - Windows: `%APPDATA%\mbp-seeder\mbp-seeder.log`
/// - macOS: `~/Library/Logs/mbp-seeder/mbp-seeder.log`
/// - Linux: `~/.local/share/mbp-seeder/mbp-seeder.log`
pub fn get_standard_log_path() -> PathBuf {
    #[cfg(target_os = "macos")]
    let mut path = {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
        path.push("Library");
        path.push("Logs");
        path
    };

    #[cfg(not(target_os = "macos"))]
    let mut path = dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("/tmp"));

    path.push(APP_DIR);
    path.push(format!("{}.log", APP_DIR));
    path
}

/// Initialize console logging on stderr
pub fn init(component: &str, default_level: Level, format: LogFormat) -> anyhow::Result<()> {
    init_with_writer(component, default_level, format, io::stderr)
}

/// Initialize logging appended to `log_path`, creating parent directories
pub fn init_to_file(
    component: &str,
    default_level: Level,
    format: LogFormat,
    log_path: &Path,
) -> anyhow::Result<()> {
    use std::fs;

    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let log_file = fs::OpenOptions::new().create(true).append(true).open(log_path)?;

    init_with_writer(component, default_level, format, log_file)
}

/// Initialize logging with a custom writer
pub fn init_with_writer<W>(
    component: &str,
    default_level: Level,
    format: LogFormat,
    writer: W,
) -> anyhow::Result<()>
where
    W: for<'writer> tracing_subscriber::fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(default_level)));

    match format {
        LogFormat::Json => {
            let layer = tracing_subscriber::fmt::layer().with_writer(writer).json();
            #[cfg(debug_assertions)]
            let layer = layer.with_file(true).with_line_number(true);

            tracing_subscriber::registry().with(filter).with(layer).try_init()?;
        }
        LogFormat::Plaintext => {
            let layer = tracing_subscriber::fmt::layer().with_writer(writer);
            #[cfg(debug_assertions)]
            let layer = layer.with_file(true).with_line_number(true);

            tracing_subscriber::registry().with(filter).with(layer).try_init()?;
        }
    }

    tracing::debug!(component, level = %default_level, %format, "logging initialized");
    Ok(())
}

/// Log targets of the seeder's own crates
const WORKSPACE_TARGETS: &[&str] = &[
    "mbp_cli",
    "mbp_core",
    "mbp_credentials",
    "mbp_jenkins",
    "mbp_rest_client",
    "config_core",
];

/// Filter directive used when `RUST_LOG` is unset
///
/// The seeder's crates log at `level`; dependencies such as reqwest and hyper
/// are capped at `warn`.
fn default_filter(level: Level) -> String {
    let dependencies = level.min(Level::WARN);
    let mut directives = vec![dependencies.to_string()];
    directives.extend(WORKSPACE_TARGETS.iter().map(|target| format!("{}={}", target, level)));
    directives.join(",")
}

/// Replace a secret with a fixed marker before it reaches a log line
///
/// ```rust
/// use mbp_logging::redact;
///
/// let token = "pat-1234567890abcdef";
/// tracing::info!(token = %redact(token), "git host token configured");
/// ```
pub fn redact(_value: impl std::fmt::Display) -> &'static str {
    "[REDACTED]"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact() {
        assert_eq!(redact("pat-secret"), "[REDACTED]");
    }

    #[test]
    fn test_level_conversion() {
        assert_eq!(Level::from(CliLogLevel::Warn), Level::WARN);
        assert_eq!(Level::from(CliLogLevel::default()), Level::INFO);
        assert_eq!("WARNING".parse::<CliLogLevel>().unwrap(), CliLogLevel::Warn);
        assert!("loud".parse::<CliLogLevel>().is_err());
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
        assert_eq!(LogFormat::default().to_string(), "plaintext");
    }

    #[test]
    fn test_default_filter_targets_workspace_crates() {
        let filter = default_filter(Level::DEBUG);
        assert!(filter.starts_with("WARN,"), "{}", filter);
        assert!(filter.contains("mbp_core=DEBUG"));
        assert!(filter.contains("mbp_cli=DEBUG"));
        assert!(!filter.contains("mbp_seeder"));

        // a quieter level also applies to dependencies
        assert!(default_filter(Level::ERROR).starts_with("ERROR,"));
    }

    #[test]
    fn test_resolve_log_path_with_dir_only() {
        let args = CliLoggingArgs {
            log_dir: Some("/var/log/seed".into()),
            ..Default::default()
        };
        assert_eq!(
            args.resolve_log_path("mbp-seeder"),
            PathBuf::from("/var/log/seed/mbp-seeder.log")
        );
    }

    #[test]
    fn test_resolve_log_path_with_absolute_file() {
        let args = CliLoggingArgs {
            log_file: Some("/tmp/seed.log".into()),
            log_dir: Some("/ignored".into()),
            ..Default::default()
        };
        assert_eq!(args.resolve_log_path("x"), PathBuf::from("/tmp/seed.log"));
    }

    #[test]
    fn test_resolve_log_path_relative_file_under_dir() {
        let args = CliLoggingArgs {
            log_file: Some("run.log".into()),
            log_dir: Some("/logs".into()),
            ..Default::default()
        };
        assert_eq!(args.resolve_log_path("x"), PathBuf::from("/logs/run.log"));
    }

    #[test]
    fn test_resolve_log_path_bare_file_uses_standard_dir() {
        let args = CliLoggingArgs {
            log_file: Some("run.log".into()),
            ..Default::default()
        };
        let path = args.resolve_log_path("x");
        assert_eq!(path.file_name().unwrap(), "run.log");
        assert!(path.to_string_lossy().contains(APP_DIR));
    }

    #[test]
    fn test_standard_log_path_is_namespaced() {
        let path = get_standard_log_path();
        assert!(path.to_string_lossy().contains(APP_DIR));
        assert_eq!(path.extension().unwrap(), "log");
    }
}
