//! Config subcommand handlers.

use hookgate_config::{Settings, config_path, default_token_path};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

pub fn handle(
    args: &ConfigArgs,
    settings: Result<Settings, CliError>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let settings = settings?;
            let rendered = match global.output {
                OutputFormat::Json => output::render_json(&settings)?,
                _ => settings.to_toml()?,
            };
            output::print_output(rendered.trim_end(), global.quiet);
        }
        ConfigCommand::Path => {
            let config = global.config.clone().unwrap_or_else(config_path);
            let token = settings.map_or_else(|_| default_token_path(), |s| s.token_path());
            output::print_output(
                &format!("config: {}\ntoken:  {}", config.display(), token.display()),
                global.quiet,
            );
        }
    }
    Ok(())
}
