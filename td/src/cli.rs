//! CLI command definitions and subcommands.
//!
//! A thin shell over [`crate::orchestrator::Orchestrator`] (spec.md §6:
//! "Process-internal surface consumed by CLI/TUI/HTTP shells that are out
//! of scope but must be spec'd to the extent the core exposes them").

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

/// Cognitive request orchestrator
#[derive(Parser)]
#[command(name = "cortex", about = "Cognitive request-processing orchestrator", version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level", global = true, help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Submit a single request and print the response (one-shot `Process`)
    Ask {
        /// The chat/query/command text
        input: String,

        /// Treat input as a shell command rather than chat
        #[arg(long)]
        command: bool,

        /// Allow unrestricted tool execution for this request
        #[arg(long)]
        unrestricted: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Interactive read-eval-print loop over the orchestrator
    Repl,

    /// Show running orchestrator statistics
    Stats {
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Get or set the active behavioral mode
    Mode {
        #[command(subcommand)]
        command: ModeCommand,
    },

    /// Get or set the active persona
    Persona {
        #[command(subcommand)]
        command: PersonaCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum ModeCommand {
    /// Print the active mode
    Get,
    /// Set the active mode (normal, debugging, teaching, pair, review)
    Set { mode: String },
}

#[derive(Debug, Subcommand)]
pub enum PersonaCommand {
    /// Print the active persona id
    Get,
    /// Set the active persona by id
    Set { id: String },
}

/// Result of checking a required tool.
pub struct ToolCheck {
    pub name: &'static str,
    pub available: bool,
    pub version: Option<String>,
}

impl ToolCheck {
    pub fn check(name: &'static str, version_args: &[&str]) -> Self {
        debug!(name, ?version_args, "ToolCheck::check: called");
        let result = std::process::Command::new(name).args(version_args).output();

        match result {
            Ok(output) if output.status.success() => {
                let version_str = String::from_utf8_lossy(&output.stdout);
                let version = parse_version(&version_str);
                Self {
                    name,
                    available: true,
                    version: Some(version),
                }
            }
            _ => Self {
                name,
                available: false,
                version: None,
            },
        }
    }
}

fn parse_version(output: &str) -> String {
    for word in output.split_whitespace() {
        let word = word.trim_start_matches('v');
        if word.chars().next().map(|c| c.is_ascii_digit()).unwrap_or(false) {
            let version: String = word.chars().take_while(|c| c.is_ascii_digit() || *c == '.').collect();
            if !version.is_empty() {
                return version;
            }
        }
    }
    "unknown".to_string()
}

/// Check the tools the bash tool shells out to.
pub fn check_required_tools() -> Vec<ToolCheck> {
    vec![ToolCheck::check("bash", &["--version"]), ToolCheck::check("git", &["--version"])]
}

/// Output format for stats/mode/persona commands.
#[derive(Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {s}. Use: text or json")),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parse_no_command() {
        let cli = Cli::parse_from(["td"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn cli_parse_ask() {
        let cli = Cli::parse_from(["td", "ask", "ls -la", "--command", "--unrestricted"]);
        if let Some(Command::Ask { input, command, unrestricted, .. }) = cli.command {
            assert_eq!(input, "ls -la");
            assert!(command);
            assert!(unrestricted);
        } else {
            panic!("expected Ask command");
        }
    }

    #[test]
    fn cli_parse_mode_set() {
        let cli = Cli::parse_from(["td", "mode", "set", "debugging"]);
        assert!(matches!(
            cli.command,
            Some(Command::Mode {
                command: ModeCommand::Set { .. }
            })
        ));
    }

    #[test]
    fn output_format_from_str() {
        assert!(matches!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text)));
        assert!(matches!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json)));
        assert!("invalid".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn parse_version_extracts_leading_number() {
        assert_eq!(parse_version("git version 2.43.0"), "2.43.0");
        assert_eq!(parse_version("v1.2.3"), "1.2.3");
    }
}
