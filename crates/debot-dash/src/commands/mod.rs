//! Command dispatch: bridges CLI args -> controller calls -> output formatting.

pub mod config_cmd;
pub mod cron;
pub mod profiles;
pub mod status;
pub mod util;
pub mod watch;

use debot_core::DashboardController;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a gateway-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &DashboardController,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::handle_status(controller, global).await,
        Command::Channels => status::handle_channels(controller, global).await,
        Command::Cron => cron::handle(controller, global).await,
        Command::Config(args) => config_cmd::handle(controller, args, global).await,
        Command::Watch(args) => watch::handle(controller, &args, global).await,
        // Profiles and Completions are handled before dispatch
        Command::Profiles(_) | Command::Completions(_) => Err(CliError::Internal(
            "local command routed to the gateway dispatcher".into(),
        )),
    }
}
