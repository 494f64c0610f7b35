//! Cron job command handler.

use tabled::Tabled;

use debot_core::format::format_time;
use debot_core::{CronJob, DashboardController};

use crate::cli::GlobalOpts;
use crate::commands::util::yes_no;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct CronRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Schedule")]
    schedule: String,
    #[tabled(rename = "Last Status")]
    last_status: String,
    #[tabled(rename = "Last Run")]
    last_run: String,
    #[tabled(rename = "Next Run")]
    next_run: String,
}

impl From<&CronJob> for CronRow {
    fn from(j: &CronJob) -> Self {
        Self {
            id: j.id.clone().unwrap_or_default(),
            name: j.name.clone().unwrap_or_default(),
            enabled: yes_no(j.enabled),
            schedule: j
                .schedule
                .as_ref()
                .map_or_else(|| "-".into(), |s| s.describe()),
            last_status: j.last_status.clone().unwrap_or_else(|| "-".into()),
            last_run: format_time(j.last_run_at_ms),
            next_run: format_time(j.next_run_at_ms),
        }
    }
}

pub async fn handle(controller: &DashboardController, global: &GlobalOpts) -> Result<(), CliError> {
    controller.fetch_status().await?;
    let jobs = controller.cron_jobs();
    let out = output::render_list(
        global.output,
        jobs.as_slice(),
        |j| CronRow::from(j),
        |j| j.id.clone().or_else(|| j.name.clone()).unwrap_or_default(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
