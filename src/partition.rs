//! Splits a log batch into legitimate and bot traffic.

use crate::classifier::BotClassifier;
use crate::model::{ClassifyRequest, LogEntry};
use crate::util::percentage;
use crate::verdict::Verdict;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// A bot-flagged entry annotated with the verdict that flagged it.
#[derive(Debug, Clone, Serialize)]
pub struct FlaggedEntry {
    #[serde(flatten)]
    pub entry: LogEntry,
    pub verdict: Verdict,
}

/// Aggregate filtering statistics for one batch.
#[derive(Debug, Clone, Serialize)]
pub struct FilterStats {
    pub total: usize,
    pub legitimate: usize,
    pub bots: usize,
    /// Share of bot traffic, 0-100 with two decimals; 0.0 for an empty batch.
    pub bot_percentage: f64,
    /// Detection method name (or "unknown") to count of bots it caught.
    pub detection_methods: BTreeMap<String, usize>,
}

/// Result of partitioning one batch.
#[derive(Debug, Clone, Serialize)]
pub struct Partitioned {
    pub legitimate: Vec<LogEntry>,
    pub bots: Vec<FlaggedEntry>,
    pub stats: FilterStats,
}

/// Runs the classifier over a batch and splits it without reordering.
pub struct LogPartitioner<'a> {
    classifier: Option<&'a BotClassifier>,
}

impl<'a> LogPartitioner<'a> {
    pub fn new(classifier: &'a BotClassifier) -> Self {
        Self {
            classifier: Some(classifier),
        }
    }

    /// Partitioner without a classifier: every entry counts as legitimate.
    pub fn passthrough() -> Self {
        Self { classifier: None }
    }

    /// Split the batch into legitimate and bot subsets.
    ///
    /// The partition is stable: entry order within each output matches input
    /// order, legitimate entries pass through unmodified, and bot entries
    /// carry their full verdict.
    pub fn partition(&self, entries: &[LogEntry]) -> Partitioned {
        let mut legitimate = Vec::new();
        let mut bots = Vec::new();
        let mut detection_methods: BTreeMap<String, usize> = BTreeMap::new();

        for entry in entries {
            let verdict = match self.classifier {
                Some(classifier) => classifier.classify(&ClassifyRequest::from_entry(entry)),
                None => Verdict::human(),
            };

            if verdict.is_bot {
                let method = verdict
                    .method
                    .map_or("unknown", |m| m.as_str())
                    .to_string();
                *detection_methods.entry(method).or_insert(0) += 1;
                bots.push(FlaggedEntry {
                    entry: entry.clone(),
                    verdict,
                });
            } else {
                legitimate.push(entry.clone());
            }
        }

        let stats = FilterStats {
            total: entries.len(),
            legitimate: legitimate.len(),
            bots: bots.len(),
            bot_percentage: percentage(bots.len(), entries.len()),
            detection_methods,
        };

        debug!(
            total = stats.total,
            bots = stats.bots,
            bot_percentage = stats.bot_percentage,
            "partitioned log batch"
        );

        Partitioned {
            legitimate,
            bots,
            stats,
        }
    }
}
