//! Access-log analytics reconstruction.
//!
//! Rebuilds web-analytics metrics (unique visitors, sessions, impressions,
//! referrers, device and browser mix, temporal distributions) from raw
//! access-log entries after filtering automated traffic.
//!
//! # Features
//!
//! - Rule-based bot classification with explicit precedence: user-agent
//!   signatures, known bot IP prefixes, then behavioral scoring
//! - Stable pseudonymous visitor fingerprinting (no salt, reproducible runs)
//! - Time-windowed session reconstruction with duration and bounce statistics
//! - Impression, referrer, device, browser, geography, and timeline breakdowns
//!
//! # Example
//!
//! ```
//! use logsift::{Analyzer, LogEntry};
//!
//! let entries: Vec<LogEntry> = serde_json::from_str(r#"[
//!     {"timestamp": "2024-03-01T10:00:00Z", "ip": "203.0.113.7",
//!      "userAgent": "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/120.0.0.0",
//!      "path": "/"},
//!     {"timestamp": "2024-03-01T10:01:00Z", "ip": "66.249.64.1",
//!      "userAgent": "Googlebot/2.1", "path": "/sitemap.xml"}
//! ]"#).unwrap();
//!
//! let result = Analyzer::new().process_logs(&entries);
//! assert_eq!(result.overview.total_requests, 1);
//! assert_eq!(result.overview.total_bots, 1);
//! ```

pub mod analyzer;
pub mod catalog;
pub mod classifier;
pub mod config;
pub mod fingerprint;
pub mod metrics;
pub mod model;
pub mod partition;
pub mod report;
pub mod session;
pub mod verdict;

mod util;

pub use analyzer::{AnalyticsResult, Analyzer, DateRange, Overview};
pub use classifier::BotClassifier;
pub use config::AnalyzerConfig;
pub use fingerprint::fingerprint;
pub use model::{BehaviorSummary, ClassifyRequest, LogEntry};
pub use partition::{FilterStats, FlaggedEntry, LogPartitioner, Partitioned};
pub use report::ReportFormat;
pub use verdict::{DetectionMethod, Verdict};
