//! Aggregate metrics over legitimate traffic.
//!
//! Every map in the output is a `BTreeMap` (or fixed-size array) so that
//! serializing the same input twice produces identical bytes.

use crate::fingerprint::fingerprint;
use crate::model::LogEntry;
use crate::util::ratio;
use chrono::{Datelike, Timelike};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Referrer bucket for entries with no usable referer URL.
const DIRECT: &str = "Direct";

/// Geography bucket for entries without location data.
const UNKNOWN_PLACE: &str = "Unknown";

/// Unique visitor counts.
///
/// `recommended` mirrors the fingerprint count: raw IPs both over-count
/// (dynamic addressing) and under-count (NAT) real visitors.
#[derive(Debug, Clone, Serialize)]
pub struct VisitorStats {
    pub unique_by_ip: usize,
    pub unique_by_fingerprint: usize,
    pub recommended: usize,
}

/// Per-path view counters.
#[derive(Debug, Clone, Serialize)]
pub struct PathCounters {
    pub views: usize,
    pub unique_visitors: usize,
    pub views_per_visitor: f64,
}

/// Page-view totals with the per-path breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct ImpressionStats {
    pub total: usize,
    pub by_path: BTreeMap<String, PathCounters>,
}

/// One row of the top-pages view, sorted by views descending.
#[derive(Debug, Clone, Serialize)]
pub struct PageRow {
    pub path: String,
    pub views: usize,
    pub unique_visitors: usize,
}

/// Device class counts from ordered user-agent keyword tests.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeviceStats {
    pub mobile: usize,
    pub tablet: usize,
    pub desktop: usize,
    pub unknown: usize,
}

/// Pass-through tallies of collector-provided location fields.
#[derive(Debug, Clone, Serialize)]
pub struct GeographyStats {
    pub countries: BTreeMap<String, usize>,
    pub cities: BTreeMap<String, usize>,
}

/// Request counts bucketed by calendar day, hour of day, and day of week.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineStats {
    /// `YYYY-MM-DD` to count.
    pub by_day: BTreeMap<String, usize>,
    /// Index is the hour of day, 0-23.
    pub by_hour: [usize; 24],
    /// Index is days from Sunday: 0 = Sun .. 6 = Sat.
    pub by_weekday: [usize; 7],
}

/// All aggregate metrics for one batch of legitimate entries.
#[derive(Debug, Clone, Serialize)]
pub struct Metrics {
    pub visitors: VisitorStats,
    pub impressions: ImpressionStats,
    pub pages: Vec<PageRow>,
    pub referrers: BTreeMap<String, usize>,
    pub devices: DeviceStats,
    pub browsers: BTreeMap<String, usize>,
    pub geography: GeographyStats,
    pub timeline: TimelineStats,
}

/// Compute all metrics for a batch of legitimate entries.
///
/// Malformed fields degrade locally: bad paths become `/`, unusable referers
/// count as `Direct`, and unparseable timestamps are left out of the timeline.
pub fn aggregate(entries: &[LogEntry]) -> Metrics {
    let mut ips = BTreeSet::new();
    let mut fingerprints = BTreeSet::new();
    let mut views: BTreeMap<String, usize> = BTreeMap::new();
    let mut visitors_per_path: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut referrers: BTreeMap<String, usize> = BTreeMap::new();
    let mut devices = DeviceStats::default();
    let mut browsers: BTreeMap<String, usize> = BTreeMap::new();
    let mut countries: BTreeMap<String, usize> = BTreeMap::new();
    let mut cities: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_day: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_hour = [0usize; 24];
    let mut by_weekday = [0usize; 7];

    for entry in entries {
        let visitor = fingerprint(entry.ip.as_deref(), entry.user_agent.as_deref());
        ips.insert(entry.ip.clone().unwrap_or_else(|| "unknown".to_string()));
        fingerprints.insert(visitor.clone());

        let path = normalize_path(entry.path.as_deref());
        *views.entry(path.clone()).or_insert(0) += 1;
        visitors_per_path.entry(path).or_default().insert(visitor);

        *referrers
            .entry(referrer_host(entry.referer.as_deref()))
            .or_insert(0) += 1;

        match classify_device(entry.user_agent.as_deref()) {
            DeviceClass::Mobile => devices.mobile += 1,
            DeviceClass::Tablet => devices.tablet += 1,
            DeviceClass::Desktop => devices.desktop += 1,
            DeviceClass::Unknown => devices.unknown += 1,
        }

        *browsers
            .entry(classify_browser(entry.user_agent.as_deref()).to_string())
            .or_insert(0) += 1;

        *countries
            .entry(place(entry.country.as_deref()))
            .or_insert(0) += 1;
        *cities.entry(place(entry.city.as_deref())).or_insert(0) += 1;

        if let Some(ts) = entry.parsed_timestamp() {
            *by_day.entry(ts.format("%Y-%m-%d").to_string()).or_insert(0) += 1;
            by_hour[ts.hour() as usize] += 1;
            by_weekday[ts.weekday().num_days_from_sunday() as usize] += 1;
        }
    }

    let by_path: BTreeMap<String, PathCounters> = views
        .iter()
        .map(|(path, &count)| {
            let unique = visitors_per_path.get(path).map_or(0, |set| set.len());
            (
                path.clone(),
                PathCounters {
                    views: count,
                    unique_visitors: unique,
                    views_per_visitor: ratio(count as f64, unique as f64),
                },
            )
        })
        .collect();

    let mut pages: Vec<PageRow> = by_path
        .iter()
        .map(|(path, counters)| PageRow {
            path: path.clone(),
            views: counters.views,
            unique_visitors: counters.unique_visitors,
        })
        .collect();
    pages.sort_by(|a, b| b.views.cmp(&a.views).then_with(|| a.path.cmp(&b.path)));

    Metrics {
        visitors: VisitorStats {
            unique_by_ip: ips.len(),
            unique_by_fingerprint: fingerprints.len(),
            recommended: fingerprints.len(),
        },
        impressions: ImpressionStats {
            total: entries.len(),
            by_path,
        },
        pages,
        referrers,
        devices,
        browsers,
        geography: GeographyStats { countries, cities },
        timeline: TimelineStats {
            by_day,
            by_hour,
            by_weekday,
        },
    }
}

enum DeviceClass {
    Mobile,
    Tablet,
    Desktop,
    Unknown,
}

const MOBILE_KEYWORDS: &[&str] = &[
    "mobile",
    "iphone",
    "ipod",
    "android",
    "blackberry",
    "windows phone",
    "opera mini",
];

const TABLET_KEYWORDS: &[&str] = &["tablet", "ipad", "kindle", "silk", "playbook"];

const DESKTOP_KEYWORDS: &[&str] = &[
    "chrome", "safari", "firefox", "edg", "opera", "msie", "trident",
];

/// Classify the device from user-agent keywords, in fixed priority order:
/// mobile, then tablet, then known desktop browsers.
fn classify_device(user_agent: Option<&str>) -> DeviceClass {
    let ua = match user_agent {
        Some(ua) if !ua.is_empty() => ua.to_ascii_lowercase(),
        _ => return DeviceClass::Unknown,
    };

    if MOBILE_KEYWORDS.iter().any(|kw| ua.contains(kw)) {
        DeviceClass::Mobile
    } else if TABLET_KEYWORDS.iter().any(|kw| ua.contains(kw)) {
        DeviceClass::Tablet
    } else if DESKTOP_KEYWORDS.iter().any(|kw| ua.contains(kw)) {
        DeviceClass::Desktop
    } else {
        DeviceClass::Unknown
    }
}

/// Classify the browser from user-agent tokens. Order matters: Edge and Opera
/// embed "chrome", and Chrome embeds "safari".
fn classify_browser(user_agent: Option<&str>) -> &'static str {
    let ua = match user_agent {
        Some(ua) if !ua.is_empty() => ua.to_ascii_lowercase(),
        _ => return "Unknown",
    };

    if ua.contains("edg") {
        "Edge"
    } else if ua.contains("opr/") || ua.contains("opera") {
        "Opera"
    } else if ua.contains("chrome") || ua.contains("crios") {
        "Chrome"
    } else if ua.contains("firefox") || ua.contains("fxios") {
        "Firefox"
    } else if ua.contains("safari") {
        "Safari"
    } else if ua.contains("msie") || ua.contains("trident") {
        "Internet Explorer"
    } else {
        "Other"
    }
}

/// Normalize a request path: strip scheme/host, query, and fragment; default
/// empty or unusable input to `/`.
fn normalize_path(path: Option<&str>) -> String {
    let mut raw = path.map(str::trim).unwrap_or("");
    if raw.is_empty() {
        return "/".to_string();
    }

    if let Some(rest) = raw
        .strip_prefix("https://")
        .or_else(|| raw.strip_prefix("http://"))
    {
        raw = match rest.find('/') {
            Some(idx) => &rest[idx..],
            None => "/",
        };
    }

    let end = raw.find(['?', '#']).unwrap_or(raw.len());
    let trimmed = &raw[..end];
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Extract the referring hostname; anything without a parseable absolute URL
/// counts as direct traffic.
fn referrer_host(referer: Option<&str>) -> String {
    let raw = match referer.map(str::trim) {
        Some(r) if !r.is_empty() => r,
        _ => return DIRECT.to_string(),
    };

    let rest = match raw
        .strip_prefix("https://")
        .or_else(|| raw.strip_prefix("http://"))
    {
        Some(rest) => rest,
        None => return DIRECT.to_string(),
    };

    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let host = rest[..end].split(':').next().unwrap_or("");
    if host.is_empty() {
        DIRECT.to_string()
    } else {
        host.to_ascii_lowercase()
    }
}

fn place(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => UNKNOWN_PLACE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ua: &str, ip: &str, path: &str) -> LogEntry {
        LogEntry {
            timestamp: Some("2024-03-01T10:00:00Z".to_string()),
            ip: Some(ip.to_string()),
            user_agent: Some(ua.to_string()),
            path: Some(path.to_string()),
            referer: None,
            country: None,
            city: None,
            session: None,
        }
    }

    const CHROME_DESKTOP: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Mobile/15E148 Safari/604.1";

    #[test]
    fn test_path_normalization() {
        assert_eq!(normalize_path(None), "/");
        assert_eq!(normalize_path(Some("")), "/");
        assert_eq!(normalize_path(Some("/about")), "/about");
        assert_eq!(normalize_path(Some("/search?q=rust")), "/search");
        assert_eq!(normalize_path(Some("/docs#intro")), "/docs");
        assert_eq!(
            normalize_path(Some("https://example.com/pricing?ref=x")),
            "/pricing"
        );
        assert_eq!(normalize_path(Some("https://example.com")), "/");
        assert_eq!(normalize_path(Some("about")), "/about");
    }

    #[test]
    fn test_referrer_host_extraction() {
        assert_eq!(referrer_host(None), "Direct");
        assert_eq!(referrer_host(Some("")), "Direct");
        assert_eq!(referrer_host(Some("not a url")), "Direct");
        assert_eq!(
            referrer_host(Some("https://www.google.com/search?q=x")),
            "www.google.com"
        );
        assert_eq!(referrer_host(Some("http://Example.COM:8080/a")), "example.com");
    }

    #[test]
    fn test_device_classification_order() {
        assert!(matches!(
            classify_device(Some(SAFARI_IPHONE)),
            DeviceClass::Mobile
        ));
        assert!(matches!(
            classify_device(Some("Mozilla/5.0 (iPad; CPU OS 17_1) AppleWebKit/605.1.15 Safari/604.1")),
            DeviceClass::Tablet
        ));
        assert!(matches!(
            classify_device(Some(CHROME_DESKTOP)),
            DeviceClass::Desktop
        ));
        assert!(matches!(classify_device(None), DeviceClass::Unknown));
        assert!(matches!(
            classify_device(Some("ExoticAgent/1.0")),
            DeviceClass::Unknown
        ));
    }

    #[test]
    fn test_browser_classification_order() {
        assert_eq!(classify_browser(Some(CHROME_DESKTOP)), "Chrome");
        assert_eq!(classify_browser(Some(SAFARI_IPHONE)), "Safari");
        assert_eq!(
            classify_browser(Some("Mozilla/5.0 (Windows NT 10.0) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0")),
            "Edge"
        );
        assert_eq!(
            classify_browser(Some("Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0")),
            "Firefox"
        );
        assert_eq!(classify_browser(None), "Unknown");
        assert_eq!(classify_browser(Some("ExoticAgent/1.0")), "Other");
    }

    #[test]
    fn test_visitor_counting() {
        let entries = vec![
            entry(CHROME_DESKTOP, "203.0.113.1", "/"),
            entry(CHROME_DESKTOP, "203.0.113.1", "/about"),
            entry(SAFARI_IPHONE, "203.0.113.2", "/"),
        ];
        let metrics = aggregate(&entries);

        assert_eq!(metrics.visitors.unique_by_ip, 2);
        assert_eq!(metrics.visitors.unique_by_fingerprint, 2);
        assert_eq!(metrics.visitors.recommended, 2);
        assert_eq!(metrics.impressions.total, 3);
    }

    #[test]
    fn test_per_path_breakdown() {
        let entries = vec![
            entry(CHROME_DESKTOP, "203.0.113.1", "/"),
            entry(CHROME_DESKTOP, "203.0.113.1", "/"),
            entry(SAFARI_IPHONE, "203.0.113.2", "/"),
            entry(SAFARI_IPHONE, "203.0.113.2", "/about"),
        ];
        let metrics = aggregate(&entries);

        let root = metrics.impressions.by_path.get("/").unwrap();
        assert_eq!(root.views, 3);
        assert_eq!(root.unique_visitors, 2);
        assert_eq!(root.views_per_visitor, 1.5);

        // Top pages sorted by views descending
        assert_eq!(metrics.pages[0].path, "/");
        assert_eq!(metrics.pages[1].path, "/about");
    }

    #[test]
    fn test_referrer_buckets() {
        let mut with_ref = entry(CHROME_DESKTOP, "203.0.113.1", "/");
        with_ref.referer = Some("https://news.ycombinator.com/item?id=1".to_string());
        let direct = entry(CHROME_DESKTOP, "203.0.113.2", "/");

        let metrics = aggregate(&[with_ref, direct]);
        assert_eq!(metrics.referrers.get("news.ycombinator.com"), Some(&1));
        assert_eq!(metrics.referrers.get("Direct"), Some(&1));
    }

    #[test]
    fn test_timeline_buckets() {
        // 2024-03-01 is a Friday (weekday index 5 from Sunday).
        let entries = vec![
            entry(CHROME_DESKTOP, "203.0.113.1", "/"),
            entry(CHROME_DESKTOP, "203.0.113.1", "/about"),
        ];
        let metrics = aggregate(&entries);

        assert_eq!(metrics.timeline.by_day.get("2024-03-01"), Some(&2));
        assert_eq!(metrics.timeline.by_hour[10], 2);
        assert_eq!(metrics.timeline.by_weekday[5], 2);
    }

    #[test]
    fn test_geography_pass_through() {
        let mut located = entry(CHROME_DESKTOP, "203.0.113.1", "/");
        located.country = Some("DE".to_string());
        located.city = Some("Berlin".to_string());
        let unlocated = entry(CHROME_DESKTOP, "203.0.113.2", "/");

        let metrics = aggregate(&[located, unlocated]);
        assert_eq!(metrics.geography.countries.get("DE"), Some(&1));
        assert_eq!(metrics.geography.countries.get("Unknown"), Some(&1));
        assert_eq!(metrics.geography.cities.get("Berlin"), Some(&1));
    }

    #[test]
    fn test_empty_batch() {
        let metrics = aggregate(&[]);
        assert_eq!(metrics.impressions.total, 0);
        assert_eq!(metrics.visitors.recommended, 0);
        assert!(metrics.pages.is_empty());
        assert!(metrics.referrers.is_empty());
    }
}
