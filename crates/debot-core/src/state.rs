// ── Observable dashboard state ──
//
// Everything a rendering layer binds to. The controller owns the only
// writer (a `watch::Sender<DashboardState>`); every mutation is a single
// `send_modify`, so observers never see a half-applied refresh.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use debot_api::{ConfigDocument, CronJob, Status};

use crate::format::{self, ChannelEntry};

/// Which dashboard view the rendering layer is showing.
///
/// Periodic status refresh only runs while [`View::Dashboard`] is active.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Dashboard,
    Channels,
    Cron,
    Config,
}

impl View {
    /// Whether refresh ticks may refetch status while this view is active.
    pub fn polls_status(self) -> bool {
        matches!(self, Self::Dashboard)
    }
}

/// Snapshot of everything the dashboard shows.
///
/// Cheap to clone: the status document and job list sit behind `Arc`.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    /// Last successfully fetched status, `None` until the first fetch.
    pub status: Option<Arc<Status>>,
    /// Jobs from the same fetch cycle as `status`.
    pub cron_jobs: Arc<Vec<CronJob>>,
    /// In-memory configuration, including unsaved edits.
    pub config: Option<ConfigDocument>,
    pub view: View,
    /// When `status` and `cron_jobs` were last replaced.
    pub last_status_refresh: Option<DateTime<Utc>>,
}

impl DashboardState {
    pub fn channel_list(&self) -> Vec<ChannelEntry> {
        format::channel_list(self.status.as_deref())
    }

    pub fn provider_names(&self) -> Vec<String> {
        format::provider_names(self.config.as_ref())
    }

    pub fn uptime(&self) -> String {
        format::format_uptime(self.status.as_ref().and_then(|s| s.uptime_s))
    }
}

/// Discrete notifications for observers that react to changes rather
/// than re-render from the latest state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardEvent {
    /// Status and cron jobs were replaced.
    StatusUpdated,
    /// The config changed: `None` for a full reload, `Some` for one section
    /// (local edit or server-confirmed save).
    ConfigUpdated { section: Option<String> },
    ViewChanged(View),
    /// A toast was shown.
    Toast(String),
}

/// The toast currently on screen.
///
/// `id` increases with every `toast()` call; the dismissal timer only
/// clears the toast it was started for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
}
