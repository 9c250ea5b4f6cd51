//! Top-level analytics pipeline.
//!
//! Ties classification, partitioning, session reconstruction, and metric
//! aggregation together. Every `process_logs` call is independent: the only
//! shared state is the immutable pattern catalog, so separate batches may be
//! analyzed from separate threads.

use crate::catalog::PatternCatalog;
use crate::classifier::BotClassifier;
use crate::config::AnalyzerConfig;
use crate::metrics::{self, DeviceStats, GeographyStats, ImpressionStats, PageRow, TimelineStats, VisitorStats};
use crate::model::{ClassifyRequest, LogEntry};
use crate::partition::{LogPartitioner, Partitioned};
use crate::session::{self, SessionReport};
use crate::verdict::Verdict;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// First and last parseable timestamps in the batch, ISO-8601 UTC.
#[derive(Debug, Clone, Serialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// Headline numbers for one analytics run.
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    /// Legitimate (non-bot) requests.
    pub total_requests: usize,
    pub total_bots: usize,
    /// Share of bot traffic in the raw batch, 0-100 with two decimals.
    pub bot_percentage: f64,
    pub unique_visitors: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
}

/// Complete analytics output for one batch.
///
/// Computed once per call; nothing in here refers back to the input entries.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsResult {
    pub overview: Overview,
    pub visitors: VisitorStats,
    pub impressions: ImpressionStats,
    pub sessions: SessionReport,
    pub pages: Vec<PageRow>,
    pub referrers: BTreeMap<String, usize>,
    pub devices: DeviceStats,
    pub browsers: BTreeMap<String, usize>,
    pub geography: GeographyStats,
    pub timeline: TimelineStats,
}

/// The analytics engine: a configured classifier plus the batch pipeline.
pub struct Analyzer {
    config: AnalyzerConfig,
    classifier: BotClassifier,
}

impl Analyzer {
    /// Analyzer with the built-in catalog and default settings.
    pub fn new() -> Self {
        Self::with_config(AnalyzerConfig::default())
    }

    /// Analyzer with the given configuration.
    pub fn with_config(config: AnalyzerConfig) -> Self {
        let catalog = PatternCatalog::with_config(&config.detection);
        Self {
            config,
            classifier: BotClassifier::new(catalog),
        }
    }

    /// Classify a single request. Usable standalone for ad hoc checks.
    pub fn classify(&self, request: &ClassifyRequest) -> Verdict {
        self.classifier.classify(request)
    }

    /// Partition a batch into legitimate and bot traffic.
    pub fn partition(&self, entries: &[LogEntry]) -> Partitioned {
        let partitioner = if self.config.detection.enabled {
            LogPartitioner::new(&self.classifier)
        } else {
            LogPartitioner::passthrough()
        };
        partitioner.partition(entries)
    }

    /// Run the full pipeline over a batch of raw entries.
    pub fn process_logs(&self, entries: &[LogEntry]) -> AnalyticsResult {
        let partitioned = self.partition(entries);
        self.process_partition(&partitioned)
    }

    /// Build the analytics result from an already-partitioned batch.
    ///
    /// Lets callers that also report on bot traffic reuse one partition
    /// instead of classifying the batch twice.
    pub fn process_partition(&self, partitioned: &Partitioned) -> AnalyticsResult {
        let legitimate = &partitioned.legitimate;
        let sessions = session::reconstruct(legitimate, self.config.session.timeout_ms);
        let metrics = metrics::aggregate(legitimate);

        let overview = Overview {
            total_requests: legitimate.len(),
            total_bots: partitioned.stats.bots,
            bot_percentage: partitioned.stats.bot_percentage,
            unique_visitors: metrics.visitors.recommended,
            date_range: date_range(legitimate),
        };

        info!(
            total = partitioned.stats.total,
            legitimate = overview.total_requests,
            bots = overview.total_bots,
            sessions = sessions.stats.total_sessions,
            "processed log batch"
        );

        AnalyticsResult {
            overview,
            visitors: metrics.visitors,
            impressions: metrics.impressions,
            sessions,
            pages: metrics.pages,
            referrers: metrics.referrers,
            devices: metrics.devices,
            browsers: metrics.browsers,
            geography: metrics.geography,
            timeline: metrics.timeline,
        }
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Span of parseable timestamps in the batch; entries with malformed
/// timestamps simply don't contribute.
fn date_range(entries: &[LogEntry]) -> Option<DateRange> {
    let mut instants = entries.iter().filter_map(LogEntry::parsed_timestamp);
    let first = instants.next()?;
    let (min, max) = instants.fold((first, first), |(min, max), ts| {
        (min.min(ts), max.max(ts))
    });
    let iso = |ts: chrono::DateTime<Utc>| ts.to_rfc3339_opts(SecondsFormat::Millis, true);
    Some(DateRange {
        start: iso(min),
        end: iso(max),
    })
}
