//! Display helpers for dashboard values.
//!
//! Pure functions: no state, no I/O. The controller exposes thin wrappers
//! that feed them its current snapshot.

use chrono::{Local, TimeZone};
use serde::Serialize;
use serde_json::{Map, Value};

use debot_api::{ConfigDocument, Status};

/// Substring the gateway uses in place of withheld secret characters.
pub const MASK_MARKER: &str = "****";

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `true` iff `value` is a string containing [`MASK_MARKER`].
pub fn is_masked(value: &Value) -> bool {
    value.as_str().is_some_and(|s| s.contains(MASK_MARKER))
}

/// Provider keys of the `providers` section, in document order.
pub fn provider_names(config: Option<&ConfigDocument>) -> Vec<String> {
    config
        .and_then(|c| c.section("providers"))
        .and_then(Value::as_object)
        .map(|providers| providers.keys().cloned().collect())
        .unwrap_or_default()
}

/// Format seconds as `"{h}h {m}m"`, `"{m}m {s}s"` or `"{s}s"`.
///
/// Absent, negative and non-finite inputs render as `-`; zero is a real
/// value and renders as `0s`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
pub fn format_uptime(seconds: Option<f64>) -> String {
    let Some(secs) = seconds.filter(|s| s.is_finite() && *s >= 0.0) else {
        return "-".into();
    };
    let total = secs.floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let rest = total % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {rest}s")
    } else {
        format!("{rest}s")
    }
}

/// Format a millisecond epoch timestamp in local time.
///
/// `None`, `0` and out-of-range timestamps render as `-`.
pub fn format_time(millis: Option<i64>) -> String {
    match millis {
        None | Some(0) => "-".into(),
        Some(ms) => Local
            .timestamp_millis_opt(ms)
            .single()
            .map_or_else(|| "-".into(), |dt| dt.format(TIME_FORMAT).to_string()),
    }
}

/// One row of the channel table: the channel's info fields plus its name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelEntry {
    pub name: String,
    #[serde(flatten)]
    pub info: Map<String, Value>,
}

impl ChannelEntry {
    /// Boolean info field, e.g. `enabled` or `running`.
    pub fn flag(&self, key: &str) -> Option<bool> {
        self.info.get(key).and_then(Value::as_bool)
    }
}

/// Flatten the status channel mapping into ordered rows.
///
/// The mapping key names the row unless the info record carries its own
/// `name`, which wins. Non-object info contributes no fields.
pub fn channel_list(status: Option<&Status>) -> Vec<ChannelEntry> {
    let Some(channels) = status.and_then(|s| s.channels.as_ref()) else {
        return Vec::new();
    };
    channels
        .iter()
        .map(|(key, info)| {
            let mut info = info.as_object().cloned().unwrap_or_default();
            let name = match info.shift_remove("name") {
                Some(Value::String(name)) => name,
                Some(Value::Null) | None => key.clone(),
                Some(other) => other.to_string(),
            };
            ChannelEntry { name, info }
        })
        .collect()
}
