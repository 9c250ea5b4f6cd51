//! Behavioral indicator check.
//!
//! Fallback for traffic that evades signature matching but still behaves like
//! automation. Each triggered indicator adds a fixed penalty; the request is
//! a bot once the accumulated confidence reaches the detection threshold.

use super::Check;
use crate::catalog::PatternCatalog;
use crate::model::ClassifyRequest;
use crate::verdict::{DetectionMethod, Verdict};

/// Accumulated confidence at which the verdict flips to bot.
const DETECTION_THRESHOLD: u8 = 50;

const RAPID_RATE_PENALTY: u8 = 30;
const SHORT_SESSION_PENALTY: u8 = 20;
const NO_JAVASCRIPT_PENALTY: u8 = 25;
const SEQUENTIAL_TIMING_PENALTY: u8 = 25;
const ZERO_ERROR_PENALTY: u8 = 15;
const NO_ACCEPT_LANGUAGE_PENALTY: u8 = 10;
const NO_REFERER_PENALTY: u8 = 10;

/// Request count above which a zero error rate becomes suspicious.
const ZERO_ERROR_MIN_REQUESTS: u64 = 50;

/// Request count above which a missing referer becomes suspicious.
const NO_REFERER_MIN_REQUESTS: u64 = 5;

pub struct BehavioralCheck;

impl Check for BehavioralCheck {
    fn inspect(&self, request: &ClassifyRequest, catalog: &PatternCatalog) -> Option<Verdict> {
        let summary = request.session.as_ref()?;
        let thresholds = catalog.thresholds();

        let mut confidence = 0u8;
        let mut reasons = Vec::new();

        if summary.requests_per_minute > thresholds.rapid_requests_per_minute {
            confidence = confidence.saturating_add(RAPID_RATE_PENALTY);
            reasons.push(format!(
                "excessive request rate ({:.0}/min)",
                summary.requests_per_minute
            ));
        }

        if let Some(duration) = summary.duration {
            if duration < thresholds.short_session_ms {
                confidence = confidence.saturating_add(SHORT_SESSION_PENALTY);
                reasons.push(format!("suspiciously short session ({duration} ms)"));
            }
        }

        if !summary.has_javascript {
            confidence = confidence.saturating_add(NO_JAVASCRIPT_PENALTY);
            reasons.push("no javascript execution observed".to_string());
        }

        if summary.access_pattern.as_deref() == Some("sequential") && summary.perfect_timing {
            confidence = confidence.saturating_add(SEQUENTIAL_TIMING_PENALTY);
            reasons.push("sequential access with perfect timing".to_string());
        }

        if summary.error_rate == Some(0.0) && summary.request_count > ZERO_ERROR_MIN_REQUESTS {
            confidence = confidence.saturating_add(ZERO_ERROR_PENALTY);
            reasons.push(format!(
                "zero error rate across {} requests",
                summary.request_count
            ));
        }

        if summary.headers.accept_language.is_none() {
            confidence = confidence.saturating_add(NO_ACCEPT_LANGUAGE_PENALTY);
            reasons.push("no accept-language header".to_string());
        }

        if summary.headers.referer.is_none() && summary.request_count > NO_REFERER_MIN_REQUESTS {
            confidence = confidence.saturating_add(NO_REFERER_PENALTY);
            reasons.push(format!(
                "no referer header after {} requests",
                summary.request_count
            ));
        }

        if confidence < DETECTION_THRESHOLD {
            return None;
        }

        let mut verdict = Verdict::bot(confidence, DetectionMethod::Behavioral);
        verdict.reasons = reasons;
        Some(verdict)
    }

    fn name(&self) -> &'static str {
        "behavioral"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BehaviorHeaders, BehaviorSummary};

    fn inspect(summary: BehaviorSummary) -> Option<Verdict> {
        let catalog = PatternCatalog::builtin();
        let request = ClassifyRequest {
            user_agent: None,
            ip: None,
            session: Some(summary),
        };
        BehavioralCheck.inspect(&request, &catalog)
    }

    /// A summary that trips no indicators at all.
    fn quiet_summary() -> BehaviorSummary {
        BehaviorSummary {
            requests_per_minute: 10.0,
            duration: Some(120_000),
            has_javascript: true,
            access_pattern: Some("organic".to_string()),
            perfect_timing: false,
            error_rate: Some(0.02),
            request_count: 12,
            headers: BehaviorHeaders {
                accept_language: Some("en-US,en;q=0.9".to_string()),
                referer: Some("https://example.com/".to_string()),
            },
        }
    }

    #[test]
    fn test_no_summary_means_no_verdict() {
        let catalog = PatternCatalog::builtin();
        let request = ClassifyRequest::default();
        assert!(BehavioralCheck.inspect(&request, &catalog).is_none());
    }

    #[test]
    fn test_quiet_traffic_passes() {
        assert!(inspect(quiet_summary()).is_none());
    }

    #[test]
    fn test_rate_and_timing_cross_the_threshold() {
        // 30 (rate) + 25 (sequential/perfect timing) = 55 >= 50
        let summary = BehaviorSummary {
            requests_per_minute: 240.0,
            access_pattern: Some("sequential".to_string()),
            perfect_timing: true,
            ..quiet_summary()
        };

        let verdict = inspect(summary).unwrap();
        assert!(verdict.is_bot);
        assert_eq!(verdict.confidence, 55);
        assert_eq!(verdict.method, Some(DetectionMethod::Behavioral));
        assert_eq!(verdict.reasons.len(), 2);
    }

    #[test]
    fn test_single_indicator_stays_below_threshold() {
        let summary = BehaviorSummary {
            requests_per_minute: 240.0,
            ..quiet_summary()
        };
        assert!(inspect(summary).is_none());
    }

    #[test]
    fn test_headless_profile() {
        // No JS (25) + short session (20) + missing accept-language (10) = 55
        let summary = BehaviorSummary {
            duration: Some(900),
            has_javascript: false,
            headers: BehaviorHeaders {
                accept_language: None,
                referer: Some("https://example.com/".to_string()),
            },
            ..quiet_summary()
        };

        let verdict = inspect(summary).unwrap();
        assert_eq!(verdict.confidence, 55);
        assert!(verdict
            .reasons
            .iter()
            .any(|r| r.contains("javascript")));
    }

    #[test]
    fn test_zero_error_rate_only_counts_on_volume() {
        // error_rate 0 with few requests contributes nothing
        let low_volume = BehaviorSummary {
            error_rate: Some(0.0),
            request_count: 10,
            has_javascript: false,
            duration: Some(500),
            ..quiet_summary()
        };
        // 25 + 20 = 45, below threshold
        assert!(inspect(low_volume).is_none());

        let high_volume = BehaviorSummary {
            error_rate: Some(0.0),
            request_count: 80,
            has_javascript: false,
            duration: Some(500),
            ..quiet_summary()
        };
        // 25 + 20 + 15 = 60
        let verdict = inspect(high_volume).unwrap();
        assert_eq!(verdict.confidence, 60);
    }

    #[test]
    fn test_absent_fields_follow_falsy_semantics() {
        // Absent duration and error_rate trigger nothing; absent JS flag does.
        let summary = BehaviorSummary {
            requests_per_minute: 0.0,
            duration: None,
            has_javascript: false,
            access_pattern: None,
            perfect_timing: false,
            error_rate: None,
            request_count: 0,
            headers: BehaviorHeaders {
                accept_language: None,
                referer: None,
            },
        };
        // 25 (no JS) + 10 (no accept-language) = 35, below threshold;
        // missing referer needs request_count > 5
        assert!(inspect(summary).is_none());
    }
}
