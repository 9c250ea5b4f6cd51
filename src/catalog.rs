//! Static registry of bot signatures and behavioral thresholds.
//!
//! A catalog is pure data: user-agent signature patterns, known bot IP
//! prefixes, and the thresholds the behavioral check scores against. It is
//! constructed once (built-in set, optionally extended from configuration)
//! and read-only afterwards.

use crate::config::DetectionConfig;
use regex::Regex;

/// Built-in user-agent signatures, grouped roughly by bot family.
///
/// Matched case-insensitively as substrings anywhere in the user-agent.
const UA_SIGNATURES: &[&str] = &[
    // Search engine crawlers
    "googlebot",
    "bingbot",
    "msnbot",
    "slurp",
    "duckduckbot",
    "baiduspider",
    "yandexbot",
    "sogou",
    "exabot",
    "seznambot",
    "applebot",
    // Social media bots
    "facebookexternalhit",
    "facebot",
    "twitterbot",
    "linkedinbot",
    "pinterestbot",
    "slackbot",
    "discordbot",
    "telegrambot",
    "whatsapp",
    "skypeuripreview",
    // SEO and marketing tools
    "ahrefsbot",
    "semrushbot",
    "mj12bot",
    "dotbot",
    "rogerbot",
    "blexbot",
    "screaming frog",
    "serpstatbot",
    // Archive and research bots
    "ia_archiver",
    "archive.org_bot",
    "heritrix",
    "ccbot",
    // Generic bot terms
    "bot",
    "crawler",
    "spider",
    "scraper",
    "crawling",
    // Monitoring services
    "pingdom",
    "uptimerobot",
    "statuscake",
    "site24x7",
    "gtmetrix",
    "lighthouse",
    "datadog",
    // Security scanners
    "sqlmap",
    "nikto",
    "nessus",
    "nmap",
    "masscan",
    "zgrab",
    "nuclei",
    // CDN and platform bots
    "cloudflare",
    "amazonbot",
    "bytespider",
    "petalbot",
    // Headless browsers and automation
    "headlesschrome",
    "phantomjs",
    "puppeteer",
    "playwright",
    "selenium",
    "webdriver",
    "electron",
    // HTTP client libraries
    "curl",
    "wget",
    "httpie",
    "python-requests",
    "python-urllib",
    "aiohttp",
    "go-http-client",
    "java/",
    "okhttp",
    "axios",
    "node-fetch",
    "scrapy",
    "libwww-perl",
    "guzzlehttp",
    "php/",
];

/// Built-in bot IP prefixes with the operator they belong to.
///
/// Matched by literal string prefix against the entry's IP.
const IP_PREFIXES: &[(&str, &str)] = &[
    ("66.249.", "Googlebot"),
    ("64.233.", "Google"),
    ("216.239.", "Google"),
    ("157.55.", "Bingbot"),
    ("157.56.", "Bingbot"),
    ("207.46.", "Bingbot"),
    ("40.77.", "Bingbot"),
    ("72.30.", "Yahoo Slurp"),
    ("74.6.", "Yahoo Slurp"),
    ("69.171.", "Facebook"),
    ("173.252.", "Facebook"),
    ("199.59.148.", "Twitterbot"),
];

/// One compiled user-agent signature.
#[derive(Debug)]
pub struct Signature {
    label: String,
    pattern: Regex,
}

impl Signature {
    /// Compile a literal substring signature, matched case-insensitively.
    fn literal(label: &str) -> Option<Self> {
        let pattern = Regex::new(&format!("(?i){}", regex::escape(label))).ok()?;
        Some(Self {
            label: label.to_string(),
            pattern,
        })
    }

    /// Compile a user-supplied pattern as a case-insensitive regex.
    fn custom(raw: &str) -> Option<Self> {
        let pattern = Regex::new(&format!("(?i){raw}")).ok()?;
        Some(Self {
            label: raw.to_string(),
            pattern,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// A known bot IP prefix.
#[derive(Debug, Clone)]
pub struct IpPrefix {
    pub prefix: String,
    pub owner: String,
}

/// Thresholds for the behavioral check.
#[derive(Debug, Clone)]
pub struct BehavioralThresholds {
    /// Requests per minute above which traffic is considered automated.
    pub rapid_requests_per_minute: f64,
    /// Session durations below this many milliseconds are suspicious.
    pub short_session_ms: i64,
}

impl Default for BehavioralThresholds {
    fn default() -> Self {
        Self {
            rapid_requests_per_minute: 100.0,
            short_session_ms: 2000,
        }
    }
}

/// Read-only registry of bot signatures.
#[derive(Debug)]
pub struct PatternCatalog {
    signatures: Vec<Signature>,
    ip_prefixes: Vec<IpPrefix>,
    thresholds: BehavioralThresholds,
}

impl PatternCatalog {
    /// Catalog with the built-in signature set.
    pub fn builtin() -> Self {
        Self {
            signatures: UA_SIGNATURES
                .iter()
                .filter_map(|label| Signature::literal(label))
                .collect(),
            ip_prefixes: IP_PREFIXES
                .iter()
                .map(|(prefix, owner)| IpPrefix {
                    prefix: (*prefix).to_string(),
                    owner: (*owner).to_string(),
                })
                .collect(),
            thresholds: BehavioralThresholds::default(),
        }
    }

    /// Built-in catalog extended with configured custom signatures, prefixes,
    /// and threshold overrides. Invalid custom patterns are skipped.
    pub fn with_config(config: &DetectionConfig) -> Self {
        let mut catalog = Self::builtin();
        catalog.signatures.extend(
            config
                .custom_signatures
                .iter()
                .filter_map(|raw| Signature::custom(raw)),
        );
        catalog.ip_prefixes.extend(
            config
                .custom_ip_prefixes
                .iter()
                .map(|prefix| IpPrefix {
                    prefix: prefix.clone(),
                    owner: "custom".to_string(),
                }),
        );
        catalog.thresholds = BehavioralThresholds {
            rapid_requests_per_minute: config.thresholds.rapid_requests_per_minute,
            short_session_ms: config.thresholds.short_session_ms,
        };
        catalog
    }

    /// First signature matching the user-agent, if any.
    pub fn match_user_agent(&self, user_agent: &str) -> Option<&Signature> {
        self.signatures
            .iter()
            .find(|sig| sig.pattern.is_match(user_agent))
    }

    /// First known bot prefix the IP starts with, if any.
    pub fn match_ip(&self, ip: &str) -> Option<&IpPrefix> {
        self.ip_prefixes
            .iter()
            .find(|range| ip.starts_with(range.prefix.as_str()))
    }

    pub fn thresholds(&self) -> &BehavioralThresholds {
        &self.thresholds
    }

    pub fn signature_count(&self) -> usize {
        self.signatures.len()
    }
}

impl Default for PatternCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
