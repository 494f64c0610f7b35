//! Clap derive structures for the `debot-dash` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use debot_core::View;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// debot-dash -- terminal dashboard for a debot gateway
#[derive(Debug, Parser)]
#[command(
    name = "debot-dash",
    version,
    about = "Inspect and configure a debot gateway from the command line",
    long_about = "Shows the status, channels and scheduled jobs of a debot gateway,\n\
        and edits its configuration one section at a time.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Gateway profile to use
    #[arg(long, short = 'p', env = "DEBOT_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Gateway URL (overrides profile)
    #[arg(long, short = 'g', env = "DEBOT_GATEWAY", global = true)]
    pub gateway: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "DEBOT_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "DEBOT_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "DEBOT_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show gateway version, uptime and summary counts
    #[command(alias = "st")]
    Status,

    /// List channels and their state
    #[command(alias = "ch")]
    Channels,

    /// List scheduled jobs
    Cron,

    /// Show and edit the gateway configuration
    #[command(alias = "cfg")]
    Config(ConfigArgs),

    /// Follow the dashboard live, printing refreshes and notifications
    Watch(WatchArgs),

    /// Manage local connection profiles
    Profiles(ProfilesArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the whole configuration, or one section
    Show {
        /// Section name (e.g., "providers", "channels")
        section: Option<String>,
    },

    /// List configured LLM providers
    Providers,

    /// Replace a section with the contents of a JSON file and save it
    Set {
        /// Section name
        section: String,

        /// JSON file holding the new section body
        #[arg(long, short = 'F')]
        from_file: PathBuf,
    },

    /// Set one field of a section and save it
    SetField {
        /// Section name
        section: String,

        /// Field name within the section
        key: String,

        /// New value. Parsed as JSON when valid, otherwise taken as a string.
        value: String,
    },
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// View to hold while watching; status only refreshes on `dashboard`
    #[arg(long, default_value = "dashboard")]
    pub view: View,

    /// Refresh period in seconds (overrides profile; 0 disables)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,
}

// ── Profiles ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProfilesArgs {
    #[command(subcommand)]
    pub command: ProfilesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProfilesCommand {
    /// List configured profiles
    #[command(alias = "ls")]
    List,

    /// Print the config file path
    Path,

    /// Add or replace a profile (`--insecure` is stored with it)
    Add {
        /// Profile name
        name: String,

        /// Gateway base URL
        #[arg(value_name = "GATEWAY")]
        url: String,

        /// Custom CA certificate for this profile
        #[arg(long)]
        ca_cert: Option<PathBuf>,

        /// Also make it the default profile
        #[arg(long)]
        default: bool,
    },

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_set_field() {
        let cli = Cli::try_parse_from([
            "debot-dash",
            "-o",
            "json",
            "config",
            "set-field",
            "gateway",
            "port",
            "8080",
        ])
        .unwrap();
        assert!(matches!(cli.global.output, OutputFormat::Json));
        match cli.command {
            Command::Config(ConfigArgs {
                command: ConfigCommand::SetField { section, key, value },
            }) => {
                assert_eq!(section, "gateway");
                assert_eq!(key, "port");
                assert_eq!(value, "8080");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn watch_view_is_case_insensitive() {
        let cli = Cli::try_parse_from(["debot-dash", "watch", "--view", "Cron"]).unwrap();
        match cli.command {
            Command::Watch(args) => assert_eq!(args.view, View::Cron),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
