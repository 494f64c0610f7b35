//! Dashboard view-model between `debot-api` and UI consumers (CLI, TUI, web
//! bridges).
//!
//! - **[`DashboardController`]**: owns the dashboard lifecycle:
//!   [`start()`](DashboardController::start) fetches status and config and
//!   spawns the periodic refresh task; [`stop()`](DashboardController::stop)
//!   releases it. Config sections are edited in memory and saved one at a
//!   time with [`save_section()`](DashboardController::save_section).
//!
//! - **[`DashboardState`]**: the snapshot observers bind to, published
//!   through a `tokio::sync::watch` channel. Discrete changes are also
//!   broadcast as [`DashboardEvent`]s.
//!
//! - **[`format`]**: pure display helpers (`format_uptime`,
//!   `format_time`, `is_masked`, `channel_list`, `provider_names`).

pub mod config;
pub mod controller;
pub mod error;
pub mod format;
pub mod state;
mod toast;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{DashboardConfig, TlsVerification};
pub use controller::DashboardController;
pub use error::CoreError;
pub use format::ChannelEntry;
pub use state::{DashboardEvent, DashboardState, Toast, View};

// Wire models are used as-is in the domain layer.
pub use debot_api::{ConfigDocument, CronJob, CronSchedule, Status};
