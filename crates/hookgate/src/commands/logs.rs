//! Security log command handlers.

use std::io::Write;

use tabled::Tabled;
use tracing::debug;

use hookgate_api::{SecurityEventType, SecurityLog, SecurityLogFilters, SecurityLogQuery, SecurityStats};
use hookgate_core::Dashboard;
use hookgate_core::format::{
    format_bytes, format_datetime, format_event_type, format_ip_address, format_json, format_number,
};

use crate::cli::{GlobalOpts, LogFilterArgs, LogsArgs, LogsCommand};
use crate::error::CliError;
use crate::output::{self, or_dash};

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SecurityLogRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Event")]
    event: String,
    #[tabled(rename = "Provider")]
    provider: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Time")]
    time: String,
}

fn row(log: &SecurityLog, mask_ips: bool) -> SecurityLogRow {
    SecurityLogRow {
        id: log.id.clone(),
        event: format_event_type(log.event_type.as_str()),
        provider: log.provider_name.clone(),
        ip: format_ip_address(&log.ip_address, mask_ips),
        time: format_datetime(&log.created_at),
    }
}

fn detail(log: &SecurityLog) -> String {
    let mut lines = vec![
        format!("ID:         {}", log.id),
        format!("Event:      {}", format_event_type(log.event_type.as_str())),
        format!("Provider:   {}", log.provider_name),
        format!("IP:         {}", log.ip_address),
        format!("Request ID: {}", or_dash(log.request_id.as_deref())),
        format!("Time:       {}", format_datetime(&log.created_at)),
    ];
    if !log.details.is_empty() {
        lines.push(String::from("Details:"));
        lines.push(format_json(&serde_json::Value::Object(log.details.clone())));
    }
    lines.join("\n")
}

fn stats_detail(s: &SecurityStats) -> String {
    let mut lines = vec![
        format!("Total events:       {}", format_number(s.total_events)),
        format!("Invalid signatures: {}", format_number(s.invalid_signatures)),
        format!("Rate limit events:  {}", format_number(s.rate_limit_events)),
        format!("Replay attempts:    {}", format_number(s.replay_attempts)),
        format!("Timestamp errors:   {}", format_number(s.timestamp_errors)),
    ];
    if !s.events_by_type.is_empty() {
        lines.push(String::from("By type:"));
        lines.extend(
            s.events_by_type
                .iter()
                .map(|(kind, count)| format!("  {}: {}", format_event_type(kind), format_number(*count))),
        );
    }
    lines.join("\n")
}

fn filters(args: LogFilterArgs) -> Result<SecurityLogFilters, CliError> {
    Ok(SecurityLogFilters {
        event_type: args.event_type.map(SecurityEventType::from),
        provider_name: args.provider,
        date_from: args.from.as_deref().map(|v| util::parse_time(v, "from")).transpose()?,
        date_to: args.to.as_deref().map(|v| util::parse_time(v, "to")).transpose()?,
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    dashboard: &Dashboard,
    args: LogsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let format = global.output;
    let rendered = match args.command {
        LogsCommand::List {
            filters: filter_args,
            show_ips,
            page,
        } => {
            let query = SecurityLogQuery {
                filters: filters(filter_args)?,
                page: util::page(page),
            };
            let logs = dashboard.security_logs(&query).await?;
            output::render_list(format, &logs, |l| row(l, !show_ips), |l| l.id.clone())?
        }

        LogsCommand::Get { id } => {
            let log = dashboard.security_log(&id).await?;
            output::render_single(format, &log, detail, |l| l.id.clone())?
        }

        LogsCommand::Stats => {
            let stats = dashboard.security_stats().await?;
            output::render_single(format, &stats, stats_detail, |s| s.total_events.to_string())?
        }

        LogsCommand::Export {
            filters: filter_args,
            out,
        } => {
            let csv = dashboard.export_security_logs(&filters(filter_args)?).await?;
            if let Some(path) = out {
                std::fs::write(&path, &csv)?;
                let size = u64::try_from(csv.len()).unwrap_or(u64::MAX);
                debug!(path = %path.display(), size = %format_bytes(size, 1), "export written");
            } else {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(&csv)?;
                stdout.flush()?;
            }
            String::new()
        }
    };

    output::print_output(&rendered, global.quiet);
    Ok(())
}
