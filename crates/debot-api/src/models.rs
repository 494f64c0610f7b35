// Gateway wire models
//
// The gateway treats most of these documents as open-ended, so every
// struct keeps unknown fields in a flattened `extra` map. Known fields are
// all optional and decoded leniently: a missing key or a value of an
// unexpected type must never fail a refresh. Mistyped values are kept
// verbatim in `extra` instead.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Remove `key` from `fields` and decode it as `T`.
///
/// `null` yields `None`. A value that does not decode is put back so it
/// survives in the record's `extra` map.
fn take<T: DeserializeOwned>(fields: &mut Map<String, Value>, key: &str) -> Option<T> {
    let value = fields.shift_remove(key)?;
    if value.is_null() {
        return None;
    }
    match serde_json::from_value(value.clone()) {
        Ok(decoded) => Some(decoded),
        Err(_) => {
            fields.insert(key.to_owned(), value);
            None
        }
    }
}

/// Response of `GET /api/status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct Status {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Seconds since the gateway started (fractional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime_s: Option<f64>,

    /// Channel name -> channel info, in the order the gateway reported them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<IndexMap<String, Value>>,

    /// Scheduler summary. Shape is owned by the gateway.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Map<String, Value>> for Status {
    fn from(mut extra: Map<String, Value>) -> Self {
        Self {
            version: take(&mut extra, "version"),
            uptime_s: take(&mut extra, "uptime_s"),
            channels: take(&mut extra, "channels"),
            cron: take(&mut extra, "cron"),
            extra,
        }
    }
}

/// Response of `GET /api/status/cron`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CronStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,

    /// `None` when the gateway omitted the field or sent `null`.
    #[serde(default)]
    pub jobs: Option<Vec<CronJob>>,
}

impl CronStatus {
    /// Consume the response, yielding the job list (empty if omitted).
    pub fn into_jobs(self) -> Vec<CronJob> {
        self.jobs.unwrap_or_default()
    }
}

/// A scheduled job as reported by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct CronJob {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<CronSchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run_at_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_run_at_ms: Option<i64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Map<String, Value>> for CronJob {
    fn from(mut extra: Map<String, Value>) -> Self {
        Self {
            id: take(&mut extra, "id"),
            name: take(&mut extra, "name"),
            enabled: take(&mut extra, "enabled"),
            schedule: take(&mut extra, "schedule"),
            last_status: take(&mut extra, "last_status"),
            last_run_at_ms: take(&mut extra, "last_run_at_ms"),
            next_run_at_ms: take(&mut extra, "next_run_at_ms"),
            extra,
        }
    }
}

/// Schedule descriptor: `every` (interval), `cron` (expression) or `at`
/// (one-shot timestamp).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct CronSchedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub every_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_ms: Option<i64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Map<String, Value>> for CronSchedule {
    fn from(mut extra: Map<String, Value>) -> Self {
        Self {
            kind: take(&mut extra, "kind"),
            every_ms: take(&mut extra, "every_ms"),
            expr: take(&mut extra, "expr"),
            at_ms: take(&mut extra, "at_ms"),
            extra,
        }
    }
}

impl CronSchedule {
    /// Compact human description, e.g. `every 60s`, `cron 0 * * * *`.
    pub fn describe(&self) -> String {
        match self.kind.as_deref() {
            Some("every") => match self.every_ms {
                Some(ms) if ms % 1000 == 0 => format!("every {}s", ms / 1000),
                Some(ms) => format!("every {ms}ms"),
                None => "every ?".into(),
            },
            Some("cron") => format!("cron {}", self.expr.as_deref().unwrap_or("?")),
            Some("at") => match self.at_ms {
                Some(ms) => format!("at {ms}"),
                None => "at ?".into(),
            },
            Some(other) => other.to_owned(),
            None => "-".into(),
        }
    }
}

/// The full configuration document: section name -> section body.
///
/// Section order follows the gateway response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigDocument {
    pub sections: IndexMap<String, Value>,
}

impl ConfigDocument {
    pub fn section(&self, name: &str) -> Option<&Value> {
        self.sections.get(name)
    }

    pub fn section_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.sections.get_mut(name)
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }
}
