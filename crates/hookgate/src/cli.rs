//! Clap derive structures for the `hookgate` CLI.
//!
//! Defines the command tree, global flags, and shared value types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// hookgate -- admin client for a webhook gateway
#[derive(Debug, Parser)]
#[command(
    name = "hookgate",
    version,
    about = "Administer a webhook gateway from the command line",
    long_about = "Manage webhook providers, inspect delivered webhooks and security \
        events, and check gateway health through the gateway's admin API.",
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
    /// Gateway base URL (overrides config and HOOKGATE_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "HOOKGATE_CONFIG", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "HOOKGATE_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to colorize notifications
    #[arg(long, env = "HOOKGATE_COLOR", default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation for destructive operations
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if stderr is a terminal)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show gateway health
    Health(HealthArgs),

    /// Manage webhook providers
    #[command(alias = "p")]
    Providers(ProvidersArgs),

    /// Inspect received webhooks
    #[command(alias = "wh")]
    Webhooks(WebhooksArgs),

    /// Inspect security logs
    Logs(LogsArgs),

    /// Store an admin bearer token
    Login {
        /// Bearer token issued by the gateway
        #[arg(long, env = "HOOKGATE_TOKEN", hide_env_values = true)]
        token: String,
    },

    /// Forget the stored admin token
    Logout,

    /// Show configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Health ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct HealthArgs {
    /// Also fetch system metrics
    #[arg(long)]
    pub metrics: bool,
}

// ── Pagination ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Args)]
pub struct PageArgs {
    /// Maximum results (1-100)
    #[arg(long, short = 'l', default_value = "50")]
    pub limit: u32,

    /// Results to skip
    #[arg(long, default_value = "0")]
    pub offset: u32,
}

// ── Providers ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProvidersArgs {
    #[command(subcommand)]
    pub command: ProvidersCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProvidersCommand {
    /// List providers
    #[command(alias = "ls")]
    List,

    /// Show one provider
    Get {
        /// Provider name
        name: String,
    },

    /// Register a provider
    Create {
        /// Provider name (3-50 chars: letters, digits, _ and -)
        #[arg(long)]
        name: String,

        /// Shared signing secret (at least 32 chars)
        #[arg(long, env = "HOOKGATE_PROVIDER_SECRET", hide_env_values = true)]
        secret: String,

        /// URL verified webhooks are forwarded to
        #[arg(long)]
        url: String,
    },

    /// Change a provider
    Update {
        /// Provider name
        name: String,

        /// New shared signing secret
        #[arg(long, env = "HOOKGATE_PROVIDER_SECRET", hide_env_values = true)]
        secret: Option<String>,

        /// New forwarding URL
        #[arg(long)]
        url: Option<String>,

        /// Enable the provider
        #[arg(long, conflicts_with = "disable")]
        enable: bool,

        /// Disable the provider
        #[arg(long)]
        disable: bool,
    },

    /// Delete a provider
    #[command(alias = "rm")]
    Delete {
        /// Provider name
        name: String,
    },

    /// Delivery statistics for a provider
    Stats {
        /// Provider name
        name: String,
    },
}

// ── Webhooks ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WebhooksArgs {
    #[command(subcommand)]
    pub command: WebhooksCommand,
}

#[derive(Debug, Subcommand)]
pub enum WebhooksCommand {
    /// List received webhooks
    #[command(alias = "ls")]
    List {
        /// Only webhooks for this provider
        #[arg(long, short = 'p')]
        provider: Option<String>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Show one webhook with payload and headers
    Get {
        /// Webhook ID
        id: String,
    },

    /// Re-forward a webhook
    Retry {
        /// Webhook ID
        id: String,
    },

    /// Delivery statistics
    Stats {
        /// Only this provider
        #[arg(long, short = 'p')]
        provider: Option<String>,
    },

    /// Send a synthetic webhook through the gateway's ingest route
    SendTest {
        /// Target provider name
        provider: String,

        /// JSON object payload
        #[arg(long, conflicts_with = "file")]
        payload: Option<String>,

        /// Read the JSON payload from a file
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,

        /// Extra header as NAME:VALUE (repeatable)
        #[arg(long = "header", short = 'H', value_name = "NAME:VALUE")]
        headers: Vec<String>,

        /// Sign the body with this secret instead of a placeholder signature
        #[arg(long, env = "HOOKGATE_SIGNING_SECRET", hide_env_values = true)]
        sign_with: Option<String>,
    },
}

// ── Security logs ────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LogsArgs {
    #[command(subcommand)]
    pub command: LogsCommand,
}

#[derive(Debug, Clone, Args)]
pub struct LogFilterArgs {
    /// Event type (e.g. invalid_signature, rate_limit_exceeded)
    #[arg(long, short = 't')]
    pub event_type: Option<String>,

    /// Only events for this provider
    #[arg(long, short = 'p')]
    pub provider: Option<String>,

    /// Start of range (RFC3339)
    #[arg(long)]
    pub from: Option<String>,

    /// End of range (RFC3339)
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum LogsCommand {
    /// List security events
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        filters: LogFilterArgs,

        /// Show full client IP addresses
        #[arg(long)]
        show_ips: bool,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Show one security event
    Get {
        /// Security log ID
        id: String,
    },

    /// Security event statistics
    Stats,

    /// Export matching events as CSV
    Export {
        #[command(flatten)]
        filters: LogFilterArgs,

        /// Write to this file instead of stdout
        #[arg(long = "out", short = 'O')]
        out: Option<PathBuf>,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Print config and token file locations
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
