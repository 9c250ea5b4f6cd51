//! Bot classification pipeline.
//!
//! Each check inspects one aspect of a request. Checks run in a fixed
//! precedence order (user-agent, then IP prefix, then behavior); the first
//! check that produces a verdict wins and later checks are not evaluated.
//! Identity signals come first because they are cheap and high-precision;
//! behavioral scoring is the fallback for traffic that evades signatures.

pub mod behavioral;
pub mod ip_prefix;
pub mod user_agent;

pub use behavioral::BehavioralCheck;
pub use ip_prefix::IpPrefixCheck;
pub use user_agent::UserAgentCheck;

use crate::catalog::PatternCatalog;
use crate::model::ClassifyRequest;
use crate::verdict::Verdict;
use tracing::debug;

/// One classification check.
///
/// Returns `Some` only when this check alone is decisive for the request;
/// `None` hands off to the next check in the pipeline.
pub trait Check: Send + Sync {
    fn inspect(&self, request: &ClassifyRequest, catalog: &PatternCatalog) -> Option<Verdict>;

    /// Get the check name.
    fn name(&self) -> &'static str;
}

/// Runs the ordered check pipeline against single requests.
pub struct BotClassifier {
    catalog: PatternCatalog,
    checks: Vec<Box<dyn Check>>,
}

impl BotClassifier {
    /// Classifier over the given catalog with the standard check order.
    pub fn new(catalog: PatternCatalog) -> Self {
        Self {
            catalog,
            checks: vec![
                Box::new(UserAgentCheck),
                Box::new(IpPrefixCheck),
                Box::new(BehavioralCheck),
            ],
        }
    }

    /// Classify one request.
    pub fn classify(&self, request: &ClassifyRequest) -> Verdict {
        for check in &self.checks {
            if let Some(verdict) = check.inspect(request, &self.catalog) {
                debug!(
                    check = check.name(),
                    confidence = verdict.confidence,
                    "check produced a verdict"
                );
                return verdict;
            }
        }
        Verdict::human()
    }

    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }
}

impl Default for BotClassifier {
    fn default() -> Self {
        Self::new(PatternCatalog::builtin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BehaviorSummary;
    use crate::verdict::DetectionMethod;

    fn request(ua: &str, ip: &str) -> ClassifyRequest {
        ClassifyRequest {
            user_agent: Some(ua.to_string()),
            ip: Some(ip.to_string()),
            session: None,
        }
    }

    #[test]
    fn test_user_agent_takes_precedence_over_ip() {
        let classifier = BotClassifier::default();
        // Both signals would fire; the user-agent check must win.
        let verdict = classifier.classify(&request("Googlebot/2.1", "66.249.64.1"));

        assert!(verdict.is_bot);
        assert_eq!(verdict.confidence, 95);
        assert_eq!(verdict.method, Some(DetectionMethod::UserAgent));
        assert!(!verdict.reasons.is_empty());
    }

    #[test]
    fn test_ip_check_runs_when_user_agent_is_clean() {
        let classifier = BotClassifier::default();
        let verdict = classifier.classify(&request(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            "66.249.64.1",
        ));

        assert!(verdict.is_bot);
        assert_eq!(verdict.confidence, 85);
        assert_eq!(verdict.method, Some(DetectionMethod::IpRange));
    }

    #[test]
    fn test_clean_request_is_not_a_bot() {
        let classifier = BotClassifier::default();
        let verdict = classifier.classify(&request(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            "203.0.113.9",
        ));

        assert!(!verdict.is_bot);
        assert_eq!(verdict.confidence, 0);
        assert!(verdict.method.is_none());
        assert!(verdict.reasons.is_empty());
    }

    #[test]
    fn test_identity_signals_beat_behavior() {
        let classifier = BotClassifier::default();
        let mut req = request("Googlebot/2.1", "203.0.113.9");
        req.session = Some(BehaviorSummary {
            requests_per_minute: 500.0,
            ..BehaviorSummary::default()
        });

        let verdict = classifier.classify(&req);
        assert_eq!(verdict.method, Some(DetectionMethod::UserAgent));
        assert_eq!(verdict.confidence, 95);
    }
}
