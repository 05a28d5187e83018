//! Webhook command handlers.

use secrecy::SecretString;
use tabled::Tabled;

use hookgate_api::{TestWebhook, Verdict, WebhookEvent, WebhookQuery, WebhookResponse, WebhookStats};
use hookgate_core::Dashboard;
use hookgate_core::format::{format_datetime, format_duration_ms, format_json, format_number, truncate};

use crate::cli::{GlobalOpts, WebhooksArgs, WebhooksCommand};
use crate::error::CliError;
use crate::output::{self, or_dash};

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct WebhookRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Request ID")]
    request_id: String,
    #[tabled(rename = "Signature")]
    signature: &'static str,
    #[tabled(rename = "Forwarded")]
    forwarded: &'static str,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Received")]
    received: String,
}

fn row(e: &WebhookEvent) -> WebhookRow {
    WebhookRow {
        id: e.id.to_string(),
        request_id: truncate(&e.request_id, 24),
        signature: if e.signature_valid { "valid" } else { "invalid" },
        forwarded: if e.forwarded { "yes" } else { "no" },
        status: or_dash(e.response_status),
        received: format_datetime(&e.received_at),
    }
}

fn detail(e: &WebhookEvent) -> String {
    let mut lines = vec![
        format!("ID:          {}", e.id),
        format!("Provider ID: {}", e.provider_id),
        format!("Request ID:  {}", e.request_id),
        format!("Signature:   {}", if e.signature_valid { "valid" } else { "invalid" }),
        format!("Forwarded:   {}", e.forwarded),
        format!("Received:    {}", format_datetime(&e.received_at)),
        format!("Sent at:     {}", or_dash(e.forwarded_at.as_ref().map(format_datetime))),
        format!("Response:    {}", or_dash(e.response_status)),
    ];
    if !e.headers.is_empty() {
        lines.push(String::from("Headers:"));
        lines.extend(e.headers.iter().map(|(k, v)| format!("  {k}: {v}")));
    }
    lines.push(String::from("Payload:"));
    lines.push(format_json(&serde_json::Value::Object(e.payload.clone())));
    if let Some(body) = &e.response_body {
        lines.push(String::from("Response body:"));
        lines.push(truncate(body, 500));
    }
    lines.join("\n")
}

fn stats_detail(provider: Option<&str>, s: &WebhookStats) -> String {
    [
        format!("Provider:      {}", provider.unwrap_or("all")),
        format!("Total:         {}", format_number(s.total)),
        format!("Successful:    {}", format_number(s.successful)),
        format!("Failed:        {}", format_number(s.failed)),
        format!("Pending:       {}", format_number(s.pending)),
        format!("Avg response:  {}", format_duration_ms(s.avg_response_time)),
    ]
    .join("\n")
}

fn response_detail(r: &WebhookResponse) -> String {
    let verdict = match r.status {
        Verdict::Accepted => "accepted",
        Verdict::Rejected => "rejected",
    };
    [
        format!("Status:  {verdict}"),
        format!("Message: {}", r.message),
        format!("ID:      {}", r.webhook_id.as_deref().unwrap_or("unknown")),
    ]
    .join("\n")
}

fn response_id(r: &WebhookResponse) -> String {
    r.webhook_id.clone().unwrap_or_default()
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    dashboard: &Dashboard,
    args: WebhooksArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let format = global.output;
    let rendered = match args.command {
        WebhooksCommand::List { provider, page } => {
            let query = WebhookQuery {
                provider_name: provider,
                page: util::page(page),
            };
            let events = dashboard.webhook_events(&query).await?;
            output::render_list(format, &events, row, |e| e.id.to_string())?
        }

        WebhooksCommand::Get { id } => {
            let event = dashboard.webhook_event(&id).await?;
            output::render_single(format, &event, detail, |e| e.id.to_string())?
        }

        WebhooksCommand::Retry { id } => {
            let resp = dashboard.retry_webhook(&id).await?;
            output::render_single(format, &resp, response_detail, response_id)?
        }

        WebhooksCommand::Stats { provider } => {
            let stats = dashboard.webhook_stats(provider.as_deref()).await?;
            output::render_single(
                format,
                &stats,
                |s| stats_detail(provider.as_deref(), s),
                |s| s.total.to_string(),
            )?
        }

        WebhooksCommand::SendTest {
            provider,
            payload,
            file,
            headers,
            sign_with,
        } => {
            let value = match (payload, file) {
                (Some(raw), _) => util::parse_json(&raw, "payload")?,
                (None, Some(path)) => util::read_json_file(&path)?,
                (None, None) => {
                    return Err(CliError::validation("payload", "pass --payload or --file"));
                }
            };
            let mut hook = TestWebhook::from_value(value)?;
            for raw in &headers {
                let (name, value) = util::parse_header(raw)?;
                hook = hook.header(name, value);
            }
            if let Some(secret) = sign_with {
                hook = hook.signed_with(SecretString::from(secret));
            }
            let resp = dashboard.send_test_webhook(&provider, &hook).await?;
            output::render_single(format, &resp, response_detail, response_id)?
        }
    };

    output::print_output(&rendered, global.quiet);
    Ok(())
}
