//! User-agent signature check.
//!
//! The highest-precedence check: a missing or empty user-agent is itself
//! suspicious, and any catalog signature match is decisive.

use super::Check;
use crate::catalog::PatternCatalog;
use crate::model::ClassifyRequest;
use crate::verdict::{DetectionMethod, Verdict};

/// Confidence for a signature match. Fixed, not computed, so verdicts stay
/// deterministic and explainable.
const SIGNATURE_CONFIDENCE: u8 = 95;

/// Confidence when the request carries no usable user-agent at all.
const MISSING_UA_CONFIDENCE: u8 = 90;

pub struct UserAgentCheck;

impl Check for UserAgentCheck {
    fn inspect(&self, request: &ClassifyRequest, catalog: &PatternCatalog) -> Option<Verdict> {
        let ua = match request.user_agent.as_deref() {
            Some(ua) if !ua.trim().is_empty() => ua,
            _ => {
                return Some(
                    Verdict::bot(MISSING_UA_CONFIDENCE, DetectionMethod::UserAgent)
                        .with_reason("missing or empty user-agent"),
                );
            }
        };

        catalog.match_user_agent(ua).map(|signature| {
            Verdict::bot(SIGNATURE_CONFIDENCE, DetectionMethod::UserAgent).with_reason(format!(
                "user-agent matched bot signature \"{}\"",
                signature.label()
            ))
        })
    }

    fn name(&self) -> &'static str {
        "user-agent"
    }
}
