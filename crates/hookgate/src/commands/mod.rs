//! Command dispatch: bridges CLI args -> `Dashboard` calls -> output formatting.

pub mod config_cmd;
pub mod health;
pub mod logs;
pub mod providers;
pub mod session;
pub mod util;
pub mod webhooks;

use hookgate_core::Dashboard;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a gateway-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    dashboard: &Dashboard,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Health(args) => health::handle(dashboard, &args, global).await,
        Command::Providers(args) => providers::handle(dashboard, args, global).await,
        Command::Webhooks(args) => webhooks::handle(dashboard, args, global).await,
        Command::Logs(args) => logs::handle(dashboard, args, global).await,
        Command::Login { token } => session::login(dashboard, &token, global.quiet),
        Command::Logout => session::logout(dashboard, global.quiet),
        // Handled before a dashboard is built
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
