// ── Runtime dashboard configuration ──
//
// These types describe *how* to talk to a debot gateway and how the
// dashboard paces itself. They never touch disk: the CLI (or any other
// front end) builds a `DashboardConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// How often the dashboard view refetches status.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// How long a toast stays visible after its most recent `toast()` call.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(3);

/// Per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Configuration for one dashboard bound to one gateway.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Gateway base URL (e.g., `http://127.0.0.1:8000`).
    pub url: Url,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// Period of the status refresh task. Zero disables periodic refresh.
    pub refresh_interval: Duration,
    /// Toast visibility window.
    pub toast_duration: Duration,
}

impl DashboardConfig {
    /// Config for `url` with every other knob at its default.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            tls: TlsVerification::default(),
            timeout: DEFAULT_TIMEOUT,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            toast_duration: DEFAULT_TOAST_DURATION,
        }
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn with_toast_duration(mut self, duration: Duration) -> Self {
        self.toast_duration = duration;
        self
    }
}
