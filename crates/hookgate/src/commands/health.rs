//! Health command handler.

use serde::Serialize;

use hookgate_api::{DependencyState, HealthState, HealthStatus, SystemMetrics};
use hookgate_core::Dashboard;
use hookgate_core::format::{format_datetime, format_duration_ms, format_number, format_percentage};

use crate::cli::{GlobalOpts, HealthArgs};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct HealthReport {
    #[serde(flatten)]
    health: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<SystemMetrics>,
}

fn state_label(state: HealthState) -> &'static str {
    match state {
        HealthState::Healthy => "healthy",
        HealthState::Degraded => "degraded",
        HealthState::Unhealthy => "unhealthy",
    }
}

fn dependency_label(state: Option<DependencyState>) -> &'static str {
    match state {
        Some(DependencyState::Connected) => "connected",
        Some(DependencyState::Disconnected) => "disconnected",
        None => "-",
    }
}

fn detail(report: &HealthReport) -> String {
    let h = &report.health;
    let mut lines = vec![
        format!("Status:   {}", state_label(h.status)),
        format!("Service:  {}", h.service),
        format!("Version:  {}", h.version),
        format!("Database: {}", dependency_label(h.database)),
        format!("Redis:    {}", dependency_label(h.redis)),
        format!("Checked:  {}", format_datetime(&h.timestamp)),
    ];
    if let Some(m) = &report.metrics {
        lines.extend([
            format!("Uptime:   {}", format_duration_ms(m.uptime * 1000.0)),
            format!("Memory:   {}", format_percentage(m.memory_usage / 100.0, 1)),
            format!("CPU:      {}", format_percentage(m.cpu_usage / 100.0, 1)),
            format!("Requests: {}", format_number(m.request_count)),
            format!("Errors:   {}", format_number(m.error_count)),
        ]);
    }
    lines.join("\n")
}

pub async fn handle(
    dashboard: &Dashboard,
    args: &HealthArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let health = dashboard.health().await?;
    let metrics = if args.metrics {
        Some(dashboard.system_metrics().await?)
    } else {
        None
    };
    let report = HealthReport { health, metrics };

    let rendered = output::render_single(global.output, &report, detail, |r| {
        state_label(r.health.status).to_owned()
    })?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}
