//! Login / logout: the persisted bearer token.

use secrecy::SecretString;

use hookgate_core::Dashboard;

use crate::error::CliError;

pub fn login(dashboard: &Dashboard, token: &str, quiet: bool) -> Result<(), CliError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(CliError::validation("token", "must not be empty"));
    }
    dashboard.login(SecretString::from(token.to_owned()))?;
    if !quiet {
        eprintln!("Token saved");
    }
    Ok(())
}

pub fn logout(dashboard: &Dashboard, quiet: bool) -> Result<(), CliError> {
    dashboard.logout()?;
    if !quiet {
        eprintln!("Logged out");
    }
    Ok(())
}
