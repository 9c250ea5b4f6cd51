//! Input data model for raw access-log entries.
//!
//! Entries arrive as a JSON array produced by an external log collector; field
//! names on the wire are camelCase. Every field except the timestamp is
//! optional, and a missing timestamp only degrades session/timeline math for
//! that entry rather than failing the batch.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One recorded web request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// ISO-8601 timestamp of the request.
    #[serde(default)]
    pub timestamp: Option<String>,

    /// Client IP address.
    #[serde(default)]
    pub ip: Option<String>,

    /// User-Agent header value.
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Request path; collectors may emit it as `url`.
    #[serde(default, alias = "url")]
    pub path: Option<String>,

    /// Referer header value.
    #[serde(default)]
    pub referer: Option<String>,

    /// Country, when the collector already resolved it (pass-through only).
    #[serde(default)]
    pub country: Option<String>,

    /// City, when the collector already resolved it (pass-through only).
    #[serde(default)]
    pub city: Option<String>,

    /// Behavioral summary attached by an upstream enrichment step, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<BehaviorSummary>,
}

impl LogEntry {
    /// Parse the timestamp as an absolute UTC instant.
    ///
    /// Accepts RFC 3339 and the space-separated `%Y-%m-%d %H:%M:%S` form some
    /// collectors emit. Returns `None` for missing or malformed timestamps.
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        let raw = self.timestamp.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                    .ok()
                    .map(|naive| Utc.from_utc_datetime(&naive))
            })
    }
}

/// Input to a single classification: the identity signals of one request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassifyRequest {
    pub user_agent: Option<String>,
    pub ip: Option<String>,
    /// Behavioral summary, when upstream data provides one.
    pub session: Option<BehaviorSummary>,
}

impl ClassifyRequest {
    /// Build a classification request from a log entry.
    pub fn from_entry(entry: &LogEntry) -> Self {
        Self {
            user_agent: entry.user_agent.clone(),
            ip: entry.ip.clone(),
            session: entry.session.clone(),
        }
    }
}

/// Summary of one client's observed behavior, supplied by upstream tooling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BehaviorSummary {
    pub requests_per_minute: f64,

    /// Observed session duration in milliseconds.
    pub duration: Option<i64>,

    pub has_javascript: bool,

    /// Access pattern label, e.g. `sequential`.
    pub access_pattern: Option<String>,

    pub perfect_timing: bool,

    pub error_rate: Option<f64>,

    pub request_count: u64,

    pub headers: BehaviorHeaders,
}

/// Header presence signals from the behavioral summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BehaviorHeaders {
    pub accept_language: Option<String>,
    pub referer: Option<String>,
}
