//! Status and channel command handlers.

use tabled::Tabled;

use debot_core::format::format_uptime;
use debot_core::{ChannelEntry, DashboardController, Status};

use crate::cli::GlobalOpts;
use crate::commands::util::{cell, yes_no};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ChannelRow {
    #[tabled(rename = "Channel")]
    name: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Running")]
    running: String,
    #[tabled(rename = "Details")]
    details: String,
}

impl From<&ChannelEntry> for ChannelRow {
    fn from(c: &ChannelEntry) -> Self {
        let details = c
            .info
            .iter()
            .filter(|(k, _)| !matches!(k.as_str(), "enabled" | "running"))
            .map(|(k, v)| format!("{k}={}", cell(v)))
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            name: c.name.clone(),
            enabled: yes_no(c.flag("enabled")),
            running: yes_no(c.flag("running")),
            details,
        }
    }
}

fn detail(s: &Status, jobs: usize, channels: &[ChannelEntry]) -> String {
    let enabled = channels
        .iter()
        .filter(|c| c.flag("enabled") == Some(true))
        .count();
    [
        format!("Version:   {}", s.version.as_deref().unwrap_or("-")),
        format!("Uptime:    {}", format_uptime(s.uptime_s)),
        format!("Channels:  {} ({enabled} enabled)", channels.len()),
        format!("Cron jobs: {jobs}"),
    ]
    .join("\n")
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle_status(
    controller: &DashboardController,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    controller.fetch_status().await?;
    let snapshot = controller.snapshot();
    let Some(status) = snapshot.status.as_deref() else {
        return Err(CliError::Internal("status missing after refresh".into()));
    };

    let channels = snapshot.channel_list();
    let jobs = snapshot.cron_jobs.len();
    let out = output::render_single(
        global.output,
        status,
        |s| detail(s, jobs, &channels),
        |s| s.version.clone().unwrap_or_default(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn handle_channels(
    controller: &DashboardController,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    controller.fetch_status().await?;
    let channels = controller.channel_list();
    let out = output::render_list(
        global.output,
        &channels,
        |c| ChannelRow::from(c),
        |c| c.name.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
