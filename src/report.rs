//! Report rendering for analytics results.
//!
//! This is the boundary layer: it reads result fields by name and formats
//! them (percentages get two decimals here), but never recomputes a
//! statistic. The core returns plain numbers; presentation lives here.

use crate::analyzer::AnalyticsResult;
use crate::partition::FilterStats;
use clap::ValueEnum;
use std::fmt::Write;

/// Supported report output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Json,
    Csv,
    Text,
    Markdown,
}

/// Render the analytics result and filtering stats in the given format.
pub fn render(
    result: &AnalyticsResult,
    stats: &FilterStats,
    format: ReportFormat,
) -> anyhow::Result<String> {
    match format {
        ReportFormat::Json => render_json(result, stats),
        ReportFormat::Csv => Ok(render_csv(result, stats)),
        ReportFormat::Text => Ok(render_text(result, stats)),
        ReportFormat::Markdown => Ok(render_markdown(result, stats)),
    }
}

fn render_json(result: &AnalyticsResult, stats: &FilterStats) -> anyhow::Result<String> {
    let report = serde_json::json!({
        "analytics": result,
        "filtering": stats,
    });
    Ok(serde_json::to_string_pretty(&report)?)
}

fn render_text(result: &AnalyticsResult, stats: &FilterStats) -> String {
    let mut out = String::new();
    let o = &result.overview;

    let _ = writeln!(out, "Access log analytics");
    let _ = writeln!(out, "====================");
    let _ = writeln!(out);
    let _ = writeln!(out, "Overview");
    let _ = writeln!(out, "  Legitimate requests:  {}", o.total_requests);
    let _ = writeln!(
        out,
        "  Bot requests:         {} ({:.2}%)",
        o.total_bots, o.bot_percentage
    );
    let _ = writeln!(out, "  Unique visitors:      {}", o.unique_visitors);
    if let Some(range) = &o.date_range {
        let _ = writeln!(out, "  Date range:           {} .. {}", range.start, range.end);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Sessions");
    let s = &result.sessions.stats;
    let _ = writeln!(out, "  Total:                {}", s.total_sessions);
    let _ = writeln!(out, "  Avg duration:         {:.2} ms", s.avg_duration_ms);
    let _ = writeln!(out, "  Avg pages/session:    {:.2}", s.avg_pages_per_session);
    let _ = writeln!(out, "  Bounce rate:          {:.2}%", s.bounce_rate);

    if !stats.detection_methods.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Detection methods");
        for (method, count) in &stats.detection_methods {
            let _ = writeln!(out, "  {method}: {count}");
        }
    }

    if !result.pages.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Top pages");
        for page in result.pages.iter().take(10) {
            let _ = writeln!(out, "  {:<40} {}", page.path, page.views);
        }
    }

    if !result.referrers.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Referrers");
        for (host, count) in sorted_desc(&result.referrers).into_iter().take(10) {
            let _ = writeln!(out, "  {host:<40} {count}");
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Devices");
    let d = &result.devices;
    let _ = writeln!(out, "  mobile: {}  tablet: {}  desktop: {}  unknown: {}",
        d.mobile, d.tablet, d.desktop, d.unknown);

    if !result.browsers.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Browsers");
        for (browser, count) in sorted_desc(&result.browsers) {
            let _ = writeln!(out, "  {browser:<40} {count}");
        }
    }

    out
}

fn render_markdown(result: &AnalyticsResult, stats: &FilterStats) -> String {
    let mut out = String::new();
    let o = &result.overview;

    let _ = writeln!(out, "# Access log analytics");
    let _ = writeln!(out);
    let _ = writeln!(out, "## Overview");
    let _ = writeln!(out);
    let _ = writeln!(out, "| Metric | Value |");
    let _ = writeln!(out, "|---|---|");
    let _ = writeln!(out, "| Legitimate requests | {} |", o.total_requests);
    let _ = writeln!(out, "| Bot requests | {} ({:.2}%) |", o.total_bots, o.bot_percentage);
    let _ = writeln!(out, "| Unique visitors | {} |", o.unique_visitors);
    if let Some(range) = &o.date_range {
        let _ = writeln!(out, "| Date range | {} .. {} |", range.start, range.end);
    }
    let s = &result.sessions.stats;
    let _ = writeln!(out, "| Sessions | {} |", s.total_sessions);
    let _ = writeln!(out, "| Bounce rate | {:.2}% |", s.bounce_rate);
    let _ = writeln!(out, "| Avg session duration | {:.2} ms |", s.avg_duration_ms);

    if !stats.detection_methods.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Detection methods");
        let _ = writeln!(out);
        let _ = writeln!(out, "| Method | Bots |");
        let _ = writeln!(out, "|---|---|");
        for (method, count) in &stats.detection_methods {
            let _ = writeln!(out, "| {method} | {count} |");
        }
    }

    if !result.pages.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Top pages");
        let _ = writeln!(out);
        let _ = writeln!(out, "| Path | Views | Unique visitors |");
        let _ = writeln!(out, "|---|---|---|");
        for page in result.pages.iter().take(10) {
            let _ = writeln!(out, "| {} | {} | {} |", page.path, page.views, page.unique_visitors);
        }
    }

    if !result.referrers.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Referrers");
        let _ = writeln!(out);
        let _ = writeln!(out, "| Host | Requests |");
        let _ = writeln!(out, "|---|---|");
        for (host, count) in sorted_desc(&result.referrers).into_iter().take(10) {
            let _ = writeln!(out, "| {host} | {count} |");
        }
    }

    if !result.browsers.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Browsers");
        let _ = writeln!(out);
        let _ = writeln!(out, "| Browser | Requests |");
        let _ = writeln!(out, "|---|---|");
        for (browser, count) in sorted_desc(&result.browsers) {
            let _ = writeln!(out, "| {browser} | {count} |");
        }
    }

    out
}

fn render_csv(result: &AnalyticsResult, stats: &FilterStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "section,key,value");

    let o = &result.overview;
    let _ = writeln!(out, "overview,legitimate_requests,{}", o.total_requests);
    let _ = writeln!(out, "overview,bot_requests,{}", o.total_bots);
    let _ = writeln!(out, "overview,bot_percentage,{:.2}", o.bot_percentage);
    let _ = writeln!(out, "overview,unique_visitors,{}", o.unique_visitors);

    let s = &result.sessions.stats;
    let _ = writeln!(out, "sessions,total,{}", s.total_sessions);
    let _ = writeln!(out, "sessions,avg_duration_ms,{:.2}", s.avg_duration_ms);
    let _ = writeln!(out, "sessions,avg_pages_per_session,{:.2}", s.avg_pages_per_session);
    let _ = writeln!(out, "sessions,bounce_rate,{:.2}", s.bounce_rate);

    for (method, count) in &stats.detection_methods {
        let _ = writeln!(out, "detection_methods,{},{}", csv_field(method), count);
    }
    for page in &result.pages {
        let _ = writeln!(out, "pages,{},{}", csv_field(&page.path), page.views);
    }
    for (host, count) in &result.referrers {
        let _ = writeln!(out, "referrers,{},{}", csv_field(host), count);
    }
    let d = &result.devices;
    let _ = writeln!(out, "devices,mobile,{}", d.mobile);
    let _ = writeln!(out, "devices,tablet,{}", d.tablet);
    let _ = writeln!(out, "devices,desktop,{}", d.desktop);
    let _ = writeln!(out, "devices,unknown,{}", d.unknown);
    for (browser, count) in &result.browsers {
        let _ = writeln!(out, "browsers,{},{}", csv_field(browser), count);
    }
    for (country, count) in &result.geography.countries {
        let _ = writeln!(out, "countries,{},{}", csv_field(country), count);
    }
    for (day, count) in &result.timeline.by_day {
        let _ = writeln!(out, "timeline_day,{},{}", day, count);
    }

    out
}

/// Quote a CSV field when it contains a delimiter or quote.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Map entries sorted by count descending, key ascending on ties.
fn sorted_desc(map: &std::collections::BTreeMap<String, usize>) -> Vec<(&str, usize)> {
    let mut rows: Vec<(&str, usize)> = map.iter().map(|(k, &v)| (k.as_str(), v)).collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::Analyzer;
    use crate::model::LogEntry;

    fn sample() -> (AnalyticsResult, FilterStats) {
        let entries: Vec<LogEntry> = serde_json::from_str(
            r#"[
                {"timestamp": "2024-03-01T10:00:00Z", "ip": "203.0.113.1",
                 "userAgent": "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/120.0.0.0 Safari/537.36",
                 "path": "/", "referer": "https://www.google.com/"},
                {"timestamp": "2024-03-01T10:01:00Z", "ip": "66.249.64.1",
                 "userAgent": "Googlebot/2.1", "path": "/robots.txt"}
            ]"#,
        )
        .unwrap();

        let analyzer = Analyzer::new();
        let partitioned = analyzer.partition(&entries);
        let result = analyzer.process_partition(&partitioned);
        (result, partitioned.stats)
    }

    #[test]
    fn test_json_report_carries_both_sections() {
        let (result, stats) = sample();
        let report = render(&result, &stats, ReportFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&report).unwrap();

        assert_eq!(parsed["analytics"]["overview"]["total_requests"], 1);
        assert_eq!(parsed["filtering"]["bots"], 1);
        assert_eq!(parsed["filtering"]["detection_methods"]["user-agent"], 1);
    }

    #[test]
    fn test_text_report_formats_percentages() {
        let (result, stats) = sample();
        let report = render(&result, &stats, ReportFormat::Text).unwrap();

        assert!(report.contains("Bot requests:         1 (50.00%)"));
        assert!(report.contains("www.google.com"));
    }

    #[test]
    fn test_markdown_report_has_tables() {
        let (result, stats) = sample();
        let report = render(&result, &stats, ReportFormat::Markdown).unwrap();

        assert!(report.contains("# Access log analytics"));
        assert!(report.contains("| Legitimate requests | 1 |"));
        assert!(report.contains("| user-agent | 1 |"));
    }

    #[test]
    fn test_csv_report_rows() {
        let (result, stats) = sample();
        let report = render(&result, &stats, ReportFormat::Csv).unwrap();

        assert!(report.starts_with("section,key,value\n"));
        assert!(report.contains("overview,bot_percentage,50.00"));
        assert!(report.contains("pages,/,1"));
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
