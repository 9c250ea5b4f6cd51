//! Known bot IP prefix check.

use super::Check;
use crate::catalog::PatternCatalog;
use crate::model::ClassifyRequest;
use crate::verdict::{DetectionMethod, Verdict};

const IP_MATCH_CONFIDENCE: u8 = 85;

pub struct IpPrefixCheck;

impl Check for IpPrefixCheck {
    fn inspect(&self, request: &ClassifyRequest, catalog: &PatternCatalog) -> Option<Verdict> {
        let ip = request.ip.as_deref()?;

        catalog.match_ip(ip).map(|range| {
            Verdict::bot(IP_MATCH_CONFIDENCE, DetectionMethod::IpRange).with_reason(format!(
                "ip {} is in a known bot range ({})",
                ip, range.owner
            ))
        })
    }

    fn name(&self) -> &'static str {
        "ip-prefix"
    }
}
