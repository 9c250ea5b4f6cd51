//! Configuration types for the analyzer.

use serde::{Deserialize, Serialize};

/// Main configuration for an analytics run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Bot detection settings
    pub detection: DetectionConfig,

    /// Session reconstruction settings
    pub session: SessionConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            detection: DetectionConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

/// Bot detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// When false, no classifier runs and every entry counts as legitimate.
    pub enabled: bool,

    /// Additional user-agent patterns (case-insensitive regex).
    pub custom_signatures: Vec<String>,

    /// Additional bot IP prefixes (literal prefix match).
    pub custom_ip_prefixes: Vec<String>,

    /// Behavioral scoring thresholds.
    pub thresholds: ThresholdConfig,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            custom_signatures: vec![],
            custom_ip_prefixes: vec![],
            thresholds: ThresholdConfig::default(),
        }
    }
}

/// Behavioral scoring thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Requests per minute above which traffic is considered automated.
    pub rapid_requests_per_minute: f64,

    /// Session durations below this many milliseconds are suspicious.
    pub short_session_ms: i64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            rapid_requests_per_minute: 100.0,
            short_session_ms: 2000,
        }
    }
}

/// Session reconstruction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Gap between consecutive events that closes a session, in milliseconds.
    pub timeout_ms: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30 * 60 * 1000,
        }
    }
}
