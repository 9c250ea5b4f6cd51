//! Visitor session reconstruction.
//!
//! Groups legitimate entries by visitor fingerprint and splits each visitor's
//! timeline into sessions wherever the gap between consecutive events exceeds
//! the timeout. Sessions are derived transiently per analytics run; nothing
//! here persists between calls.

use crate::fingerprint::fingerprint;
use crate::model::LogEntry;
use crate::util::{percentage, ratio};
use chrono::{SecondsFormat, TimeZone, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Default gap that closes a session: 30 minutes.
pub const DEFAULT_SESSION_TIMEOUT_MS: i64 = 30 * 60 * 1000;

/// One contiguous run of a visitor's page views.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    /// First event time, ISO-8601 UTC.
    pub start: String,
    /// Last event time, ISO-8601 UTC.
    pub end: String,
    pub duration_ms: i64,
    pub page_count: usize,
}

/// Aggregate statistics across all reconstructed sessions.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub total_sessions: usize,
    pub avg_duration_ms: f64,
    pub avg_pages_per_session: f64,
    /// Share of single-page sessions, 0-100 with two decimals.
    pub bounce_rate: f64,
}

/// Sessions grouped by visitor fingerprint, plus aggregate stats.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub by_visitor: BTreeMap<String, Vec<Session>>,
    pub stats: SessionStats,
}

/// Reconstruct sessions from legitimate entries.
///
/// Entries without a parseable timestamp are skipped. A gap must be strictly
/// greater than `timeout_ms` to open a new session, so timestamp ties never
/// split one.
pub fn reconstruct(entries: &[LogEntry], timeout_ms: i64) -> SessionReport {
    let mut groups: BTreeMap<String, Vec<i64>> = BTreeMap::new();
    for entry in entries {
        let Some(ts) = entry.parsed_timestamp() else {
            continue;
        };
        let visitor = fingerprint(entry.ip.as_deref(), entry.user_agent.as_deref());
        groups.entry(visitor).or_default().push(ts.timestamp_millis());
    }

    let mut by_visitor: BTreeMap<String, Vec<Session>> = BTreeMap::new();
    let mut total_sessions = 0usize;
    let mut total_duration_ms = 0i64;
    let mut total_pages = 0usize;
    let mut bounces = 0usize;

    for (visitor, mut times) in groups {
        times.sort();
        let mut sessions = Vec::new();
        let mut current: Vec<i64> = Vec::new();

        for ts in times {
            if let Some(&last) = current.last() {
                if ts - last > timeout_ms {
                    sessions.push(close_session(&current));
                    current.clear();
                }
            }
            current.push(ts);
        }
        if !current.is_empty() {
            sessions.push(close_session(&current));
        }

        for session in &sessions {
            total_sessions += 1;
            total_duration_ms += session.duration_ms;
            total_pages += session.page_count;
            if session.page_count == 1 {
                bounces += 1;
            }
        }
        by_visitor.insert(visitor, sessions);
    }

    let stats = SessionStats {
        total_sessions,
        avg_duration_ms: ratio(total_duration_ms as f64, total_sessions as f64),
        avg_pages_per_session: ratio(total_pages as f64, total_sessions as f64),
        bounce_rate: percentage(bounces, total_sessions),
    };

    SessionReport { by_visitor, stats }
}

fn close_session(times: &[i64]) -> Session {
    let first = times[0];
    let last = times[times.len() - 1];
    Session {
        start: iso(first),
        end: iso(last),
        duration_ms: last - first,
        page_count: times.len(),
    }
}

fn iso(millis: i64) -> String {
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}
