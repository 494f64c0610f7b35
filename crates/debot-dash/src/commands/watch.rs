//! `watch`: run the dashboard until Ctrl-C, printing each refresh and
//! every toast as it happens.

use chrono::Local;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use debot_core::{DashboardController, DashboardEvent, DashboardState};

use crate::cli::{GlobalOpts, WatchArgs};
use crate::error::CliError;
use crate::output;

fn status_line(state: &DashboardState) -> String {
    let version = state
        .status
        .as_ref()
        .and_then(|s| s.version.as_deref())
        .unwrap_or("-");
    let channels = state.channel_list();
    let running = channels
        .iter()
        .filter(|c| c.flag("running") == Some(true))
        .count();
    format!(
        "status: version {version}, up {}, {} channels ({running} running), {} cron jobs",
        state.uptime(),
        channels.len(),
        state.cron_jobs.len(),
    )
}

fn stamped(message: &str) -> String {
    format!("[{}] {message}", Local::now().format("%H:%M:%S"))
}

pub async fn handle(
    controller: &DashboardController,
    args: &WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(global.color);
    let mut events = controller.events();

    controller.set_view(args.view);
    controller.start().await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            res = &mut ctrl_c => {
                res?;
                break;
            }
            event = events.recv() => match event {
                Ok(DashboardEvent::StatusUpdated) => {
                    let line = stamped(&status_line(&controller.snapshot()));
                    output::print_activity(&line, color, global.quiet);
                }
                Ok(DashboardEvent::ConfigUpdated { section }) => {
                    let what = section.map_or_else(
                        || "config loaded".to_owned(),
                        |s| format!("config section {s} updated"),
                    );
                    output::print_activity(&stamped(&what), color, global.quiet);
                }
                Ok(DashboardEvent::ViewChanged(view)) => {
                    output::print_activity(&stamped(&format!("view: {view}")), color, global.quiet);
                }
                Ok(DashboardEvent::Toast(message)) => {
                    output::print_notice(&stamped(&message), color, global.quiet);
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "dropped dashboard events"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    controller.stop().await;
    Ok(())
}
