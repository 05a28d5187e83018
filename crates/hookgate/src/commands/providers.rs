//! Provider command handlers.

use secrecy::SecretString;
use tabled::Tabled;

use hookgate_api::{Provider, ProviderCreate, ProviderStats, ProviderUpdate};
use hookgate_core::Dashboard;
use hookgate_core::format::{format_datetime, format_number, format_percentage};

use crate::cli::{GlobalOpts, ProvidersArgs, ProvidersCommand};
use crate::error::CliError;
use crate::output::{self, or_dash};

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ProviderRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Forwarding URL")]
    url: String,
    #[tabled(rename = "Active")]
    active: &'static str,
    #[tabled(rename = "Created")]
    created: String,
}

fn row(p: &Provider) -> ProviderRow {
    ProviderRow {
        name: p.name.clone(),
        url: p.forwarding_url.clone(),
        active: if p.is_active { "yes" } else { "no" },
        created: or_dash(p.created_at.as_ref().map(format_datetime)),
    }
}

fn detail(p: &Provider) -> String {
    [
        format!("ID:       {}", p.id),
        format!("Name:     {}", p.name),
        format!("URL:      {}", p.forwarding_url),
        format!("Active:   {}", p.is_active),
        format!("Created:  {}", or_dash(p.created_at.as_ref().map(format_datetime))),
        format!("Updated:  {}", or_dash(p.updated_at.as_ref().map(format_datetime))),
    ]
    .join("\n")
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn stats_detail(name: &str, s: &ProviderStats) -> String {
    let rate = if s.total_webhooks == 0 {
        "-".to_owned()
    } else {
        format_percentage(s.successful_webhooks as f64 / s.total_webhooks as f64, 1)
    };
    [
        format!("Provider:     {name}"),
        format!("Total:        {}", format_number(s.total_webhooks)),
        format!("Successful:   {}", format_number(s.successful_webhooks)),
        format!("Failed:       {}", format_number(s.failed_webhooks)),
        format!("Success rate: {rate}"),
        format!("Last webhook: {}", or_dash(s.last_webhook_at.as_ref().map(format_datetime))),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    dashboard: &Dashboard,
    args: ProvidersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let format = global.output;
    let rendered = match args.command {
        ProvidersCommand::List => {
            let providers = dashboard.providers().await?;
            output::render_list(format, &providers, row, |p| p.name.clone())?
        }

        ProvidersCommand::Get { name } => {
            let provider = dashboard.provider(&name).await?;
            output::render_single(format, &provider, detail, |p| p.name.clone())?
        }

        ProvidersCommand::Create { name, secret, url } => {
            let req = ProviderCreate::new(name, secret, url);
            let provider = dashboard.create_provider(&req).await?;
            output::render_single(format, &provider, detail, |p| p.name.clone())?
        }

        ProvidersCommand::Update {
            name,
            secret,
            url,
            enable,
            disable,
        } => {
            let req = ProviderUpdate {
                secret_key: secret.map(SecretString::from),
                forwarding_url: url,
                is_active: (enable || disable).then_some(enable),
            };
            if req.is_empty() {
                return Err(CliError::validation(
                    "update",
                    "nothing to change (use --secret, --url, --enable or --disable)",
                ));
            }
            let provider = dashboard.update_provider(&name, &req).await?;
            output::render_single(format, &provider, detail, |p| p.name.clone())?
        }

        ProvidersCommand::Delete { name } => {
            util::require_confirmation(&format!("delete provider '{name}'"), global.yes)?;
            dashboard.delete_provider(&name).await?;
            String::new()
        }

        ProvidersCommand::Stats { name } => {
            let stats = dashboard.provider_stats(&name).await?;
            output::render_single(
                format,
                &stats,
                |s| stats_detail(&name, s),
                |s| s.total_webhooks.to_string(),
            )?
        }
    };

    output::print_output(&rendered, global.quiet);
    Ok(())
}
