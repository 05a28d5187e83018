mod cli;
mod commands;
mod error;
mod output;

use std::sync::Arc;

use clap::Parser;
use figment::providers::Serialized;
use tracing_subscriber::EnvFilter;

use hookgate_api::{ApiClient, FileTokenStore};
use hookgate_config::{LogFormat, Settings, config_path};
use hookgate_core::Dashboard;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let settings = load_settings(&cli.global);
    init_tracing(cli.global.verbose, settings.as_ref().ok());

    if let Err(err) = run(cli, settings).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// Config file + `HOOKGATE_*` env, then `--api-url` / `--timeout` on top.
fn load_settings(global: &GlobalOpts) -> Result<Settings, CliError> {
    let path = global.config.clone().unwrap_or_else(config_path);
    let mut figment = Settings::figment(&path);
    if let Some(url) = &global.api_url {
        figment = figment.merge(Serialized::default("api_url", url));
    }
    if let Some(timeout) = global.timeout {
        figment = figment.merge(Serialized::default("timeout_secs", timeout));
    }
    let settings: Settings = figment.extract()?;
    settings.validate()?;
    Ok(settings)
}

/// `RUST_LOG` wins, then `-v`/`-vv`, then the configured level.
fn init_tracing(verbosity: u8, settings: Option<&Settings>) {
    let configured = settings.map_or("warn", |s| {
        if s.features.debug { "debug" } else { s.log_level.as_str() }
    });
    let level = match verbosity {
        0 => configured,
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if settings.is_some_and(|s| s.log_format == LogFormat::Json) {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli, settings: Result<Settings, CliError>) -> Result<(), CliError> {
    let Cli { global, command } = cli;
    match command {
        // Config commands work without a valid gateway setup
        Command::Config(args) => commands::config_cmd::handle(&args, settings, &global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "hookgate", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let settings = settings?;
            let dashboard = build_dashboard(&settings)?;

            tracing::debug!(
                api_url = %settings.api_url,
                analytics = settings.features.analytics,
                error_tracking = settings.features.error_tracking,
                "dispatching command"
            );
            let result = commands::dispatch(cmd, &dashboard, &global).await;

            output::print_notifications(
                &dashboard.notifications().snapshot(),
                output::should_color(global.color),
                global.quiet,
            );
            dashboard.shutdown();
            result
        }
    }
}

fn build_dashboard(settings: &Settings) -> Result<Dashboard, CliError> {
    let tokens = FileTokenStore::open(settings.token_path())?;
    let api = ApiClient::new(&settings.client_config()?, Arc::new(tokens))?;
    Ok(Dashboard::new(settings.dashboard_config(), api))
}
