//! Report rendering.
//!
//! A pure function of the final [`Stats`] snapshot and the display
//! configuration. Aggregation keys are never transformed here; obfuscation
//! is applied only to what gets printed.

use std::fmt::Write as _;

use rsyncstat_core::error::Result;
use rsyncstat_core::formatting::{crunch, obfuscate, percentage, unit_prefix, ObfuscationStyle};
use rsyncstat_core::models::Stats;
use rsyncstat_core::settings::Settings;
use rsyncstat_core::Counter;

/// Rows shown in each ranked table.
pub const TOP_ENTRIES: usize = 10;

/// Fraction of hosts summarised as the "top 5%".
const TOP_SHARE: f64 = 0.05;

const BYTE_DIVISOR: f64 = 1024.0;

// ── ReportConfig ──────────────────────────────────────────────────────────────

/// Display configuration for one report.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub style: ObfuscationStyle,
    /// Smallest-first row order instead of the classic biggest-first.
    pub reverse: bool,
    /// Only the two ranked tables, no summaries.
    pub short: bool,
    /// Process-lifetime salt for fancy obfuscation. Tests inject a fixed
    /// value; the binary generates a fresh one per run.
    pub salt: String,
}

impl ReportConfig {
    pub fn from_settings(settings: &Settings, salt: String) -> Result<Self> {
        Ok(Self {
            style: settings.obfuscation_style()?,
            reverse: settings.reverse,
            short: settings.short,
            salt,
        })
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Render the complete report. Infallible: an empty snapshot produces a
/// report full of zeroes, never an error.
pub fn render(stats: &Stats, config: &ReportConfig) -> String {
    let mut out = String::new();

    if !config.short {
        render_header(&mut out, stats);
    }

    render_bytes_table(&mut out, stats, config);
    if !config.short {
        render_traffic_share(&mut out, stats);
    }

    render_sessions_table(&mut out, stats, config);
    if !config.short {
        render_session_totals(&mut out, stats);
        render_throughput(&mut out, stats);
    }

    out
}

fn render_header(out: &mut String, stats: &Stats) {
    let (traffic, magnitude) = crunch(stats.total_traffic as f64, BYTE_DIVISOR);
    let _ = writeln!(
        out,
        "Total traffic: {:.2} {}Bytes",
        traffic,
        unit_prefix(magnitude)
    );
    let _ = writeln!(
        out,
        "Total number of unique hosts: {}",
        stats.bytes_by_host.distinct_seen()
    );
    match stats.span_days {
        Some(days) => {
            let _ = writeln!(out, "Log seems to span {days:.2} days.");
        }
        None => {
            let _ = writeln!(out, "Log time span unknown.");
        }
    }
    out.push('\n');
}

fn render_bytes_table(out: &mut String, stats: &Stats, config: &ReportConfig) {
    let _ = writeln!(out, " Top {TOP_ENTRIES} hosts by byte count");
    let _ = writeln!(out, "rank        bytes   (scaled)  host");
    let _ = writeln!(out, "{}", "-".repeat(64));
    for (rank, value, addr) in ranked(&stats.bytes_by_host, config.reverse) {
        let (scaled, magnitude) = crunch(value as f64, BYTE_DIVISOR);
        let scaled_str = format!("{:.2}{}B", scaled, unit_prefix(magnitude));
        let _ = writeln!(
            out,
            "{:>4} {:>12} ({:>9}) {}",
            rank,
            value,
            scaled_str,
            display_host(&addr, stats, config)
        );
    }
    let _ = writeln!(out, "{}", "-".repeat(64));
    out.push('\n');
}

fn render_traffic_share(out: &mut String, stats: &Stats) {
    let (sample, sum) = top_share(&stats.bytes_by_host);
    let (scaled, magnitude) = crunch(sum as f64, BYTE_DIVISOR);
    let _ = writeln!(
        out,
        "Top 5% of hosts ({sample}) account for {sum} bytes ({:.2} {}B) of traffic,",
        scaled,
        unit_prefix(magnitude)
    );
    let _ = writeln!(
        out,
        "which is {:.2}% of the total traffic.",
        percentage(sum as f64, stats.total_traffic as f64, 2)
    );
    out.push('\n');
}

fn render_sessions_table(out: &mut String, stats: &Stats, config: &ReportConfig) {
    let _ = writeln!(out, " Top {TOP_ENTRIES} hosts by session count");
    let _ = writeln!(out, "rank sessions   per day  host");
    let _ = writeln!(out, "{}", "-".repeat(48));
    for (rank, value, addr) in ranked(&stats.sessions_by_host, config.reverse) {
        let per_day = match stats.span_days {
            Some(days) if days > 0.0 => format!("{:.2}", value as f64 / days),
            _ => "n/a".to_string(),
        };
        let _ = writeln!(
            out,
            "{:>4} {:>8} {:>9} {}",
            rank,
            value,
            per_day,
            display_host(&addr, stats, config)
        );
    }
    let _ = writeln!(out, "{}", "-".repeat(48));
    out.push('\n');
}

fn render_session_totals(out: &mut String, stats: &Stats) {
    let _ = writeln!(out, "Total number of sessions: {}", stats.total_sessions);
    match stats.span_days {
        Some(days) if days > 0.0 => {
            let _ = writeln!(
                out,
                "Average sessions per day: {:.2}",
                stats.total_sessions as f64 / days
            );
        }
        _ => {
            let _ = writeln!(out, "Average sessions per day: n/a");
        }
    }
    out.push('\n');

    let (sample, sum) = top_share(&stats.sessions_by_host);
    let _ = writeln!(out, "Top 5% of hosts ({sample}) account for {sum} sessions,");
    let _ = writeln!(
        out,
        "which is {:.2}% of the total number of sessions.",
        percentage(sum as f64, stats.total_sessions as f64, 2)
    );
    out.push('\n');
}

fn render_throughput(out: &mut String, stats: &Stats) {
    let _ = writeln!(
        out,
        "Analyzed {} lines in {:.2} seconds ({:.2} lines per second)",
        stats.line_count,
        stats.elapsed_seconds,
        stats.lines_per_second()
    );
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// The up-to-ten largest entries in display order, each with its rank.
///
/// The snapshot is ascending, so the largest entries are its tail. Classic
/// display reverses them (biggest first); `--reverse` keeps them ascending.
/// Either way the rank column counts down N..1 top-to-bottom: the rank
/// sequence is fixed and consumed bottom-to-top, independent of row order.
fn ranked(counter: &Counter, reverse: bool) -> Vec<(usize, i64, String)> {
    let snapshot = counter.sorted_snapshot(false);
    let start = snapshot.len().saturating_sub(TOP_ENTRIES);
    let mut rows = snapshot[start..].to_vec();
    if !reverse {
        rows.reverse();
    }
    let count = rows.len();
    rows.into_iter()
        .enumerate()
        .map(|(i, (value, key))| (count - i, value, key))
        .collect()
}

/// Sample size and value sum of the top 5% of a counter's keys.
///
/// The sample is `floor(distinct * 0.05)` entries off the tail of the
/// ascending snapshot; a sample of zero sums to zero rather than erroring.
fn top_share(counter: &Counter) -> (usize, i64) {
    let snapshot = counter.sorted_snapshot(false);
    let sample = (counter.distinct_seen() as f64 * TOP_SHARE).floor() as usize;
    let sum = snapshot[snapshot.len() - sample..]
        .iter()
        .map(|(value, _)| value)
        .sum();
    (sample, sum)
}

/// Obfuscated address plus the cached hostname, when one exists.
fn display_host(addr: &str, stats: &Stats, config: &ReportConfig) -> String {
    let shown = obfuscate(addr, config.style, &config.salt);
    match stats.hostnames.get(addr) {
        Some(name) => format!(
            "{:>15} ({})",
            shown,
            obfuscate(name, config.style, &config.salt)
        ),
        None => format!("{:>15}", shown),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(style: ObfuscationStyle, reverse: bool, short: bool) -> ReportConfig {
        ReportConfig {
            style,
            reverse,
            short,
            salt: "orange pekoe".to_string(),
        }
    }

    fn sample_stats() -> Stats {
        let mut stats = Stats {
            line_count: 6,
            elapsed_seconds: 0.5,
            total_traffic: 600,
            span_days: Some(2.0),
            total_sessions: 6,
            ..Stats::default()
        };
        for (addr, bytes, sessions) in [
            ("10.0.0.1", 100, 1),
            ("10.0.0.2", 200, 2),
            ("10.0.0.3", 300, 3),
        ] {
            stats.bytes_by_host.increment(addr, bytes);
            stats.sessions_by_host.increment(addr, sessions);
        }
        stats.hostnames.record("10.0.0.3", "mirror.example.org");
        stats
    }

    fn rank_of<'a>(report: &'a str, needle: &str) -> &'a str {
        report
            .lines()
            .find(|l| l.contains(needle))
            .unwrap_or_else(|| panic!("no line containing {needle}"))
            .split_whitespace()
            .next()
            .unwrap()
    }

    // ── Ordering and ranks ────────────────────────────────────────────────────

    #[test]
    fn test_classic_order_biggest_first() {
        let report = render(&sample_stats(), &config(ObfuscationStyle::None, false, true));
        let pos3 = report.find("10.0.0.3").unwrap();
        let pos1 = report.find("10.0.0.1").unwrap();
        assert!(pos3 < pos1, "biggest host must come first");
        // Top row carries the highest rank, bottom row rank 1.
        assert_eq!(rank_of(&report, "10.0.0.3"), "3");
        assert_eq!(rank_of(&report, "10.0.0.1"), "1");
    }

    #[test]
    fn test_reverse_order_smallest_first() {
        let report = render(&sample_stats(), &config(ObfuscationStyle::None, true, true));
        let pos3 = report.find("10.0.0.3").unwrap();
        let pos1 = report.find("10.0.0.1").unwrap();
        assert!(pos1 < pos3, "smallest host must come first");
        // The rank column still counts down top-to-bottom.
        assert_eq!(rank_of(&report, "10.0.0.1"), "3");
        assert_eq!(rank_of(&report, "10.0.0.3"), "1");
    }

    #[test]
    fn test_only_ten_largest_shown() {
        let mut stats = Stats::default();
        for i in 1..=12 {
            stats
                .bytes_by_host
                .increment(&format!("192.0.2.{i}"), i * 10);
        }
        let report = render(&stats, &config(ObfuscationStyle::None, false, true));
        // The two smallest hosts fall off the table. Rows end with the bare
        // address, so match against the line terminator.
        assert!(!report.contains("192.0.2.1\n"));
        assert!(!report.contains("192.0.2.2\n"));
        assert!(report.contains("192.0.2.3"));
        assert!(report.contains("192.0.2.12"));
        assert_eq!(rank_of(&report, "192.0.2.12"), "10");
    }

    // ── Content ───────────────────────────────────────────────────────────────

    #[test]
    fn test_full_report_sections() {
        let report = render(&sample_stats(), &config(ObfuscationStyle::None, false, false));
        assert!(report.contains("Total traffic: 600.00 Bytes"));
        assert!(report.contains("Total number of unique hosts: 3"));
        assert!(report.contains("Log seems to span 2.00 days."));
        assert!(report.contains(" Top 10 hosts by byte count"));
        assert!(report.contains(" Top 10 hosts by session count"));
        assert!(report.contains("Total number of sessions: 6"));
        assert!(report.contains("Average sessions per day: 3.00"));
        assert!(report.contains("Analyzed 6 lines in 0.50 seconds (12.00 lines per second)"));
        // Cached hostname shown next to its address.
        assert!(report.contains("10.0.0.3 (mirror.example.org)"));
    }

    #[test]
    fn test_per_day_column() {
        let report = render(&sample_stats(), &config(ObfuscationStyle::None, false, true));
        // 3 sessions over 2.0 days.
        let line = report
            .lines()
            .find(|l| l.contains("10.0.0.3") && l.contains("1.50"))
            .unwrap();
        assert!(line.split_whitespace().any(|t| t == "1.50"));
    }

    #[test]
    fn test_short_output_tables_only() {
        let report = render(&sample_stats(), &config(ObfuscationStyle::None, false, true));
        assert!(report.contains(" Top 10 hosts by byte count"));
        assert!(report.contains(" Top 10 hosts by session count"));
        assert!(!report.contains("Total traffic"));
        assert!(!report.contains("Top 5%"));
        assert!(!report.contains("Analyzed"));
        assert!(!report.contains("Total number of sessions"));
    }

    #[test]
    fn test_top_share_summaries() {
        let mut stats = Stats::default();
        // 20 hosts puts the 5% sample at exactly one entry.
        for i in 1..=20 {
            stats.bytes_by_host.increment(&format!("10.1.1.{i}"), i);
            stats.sessions_by_host.increment(&format!("10.1.1.{i}"), 1);
        }
        stats.total_traffic = 210;
        stats.total_sessions = 20;
        let report = render(&stats, &config(ObfuscationStyle::None, false, false));
        // Largest entry has 20 bytes; 20/210 = 9.52%.
        assert!(report.contains("Top 5% of hosts (1) account for 20 bytes"));
        assert!(report.contains("which is 9.52% of the total traffic."));
        assert!(report.contains("Top 5% of hosts (1) account for 1 sessions,"));
    }

    #[test]
    fn test_top_share_zero_sample() {
        let report = render(&sample_stats(), &config(ObfuscationStyle::None, false, false));
        // 3 hosts → floor(0.15) = 0 sampled, sum zero, no panic.
        assert!(report.contains("Top 5% of hosts (0) account for 0 bytes"));
        assert!(report.contains("which is 0.00% of the total traffic."));
    }

    // ── Obfuscation ───────────────────────────────────────────────────────────

    #[test]
    fn test_simple_obfuscation_in_report() {
        let report = render(
            &sample_stats(),
            &config(ObfuscationStyle::Simple, false, false),
        );
        assert!(report.contains("10.0..."));
        assert!(report.contains("mirror.example..."));
        assert!(!report.contains("10.0.0.3"));
        assert!(!report.contains("mirror.example.org"));
    }

    #[test]
    fn test_fancy_obfuscation_hides_identities() {
        let report = render(
            &sample_stats(),
            &config(ObfuscationStyle::Fancy, false, false),
        );
        assert!(!report.contains("10.0.0.3"));
        assert!(!report.contains("mirror.example.org"));
        // Fixed salt makes the digest reproducible.
        assert!(report.contains("..."));
    }

    // ── Empty snapshot ────────────────────────────────────────────────────────

    #[test]
    fn test_empty_stats_render_zero_totals() {
        let report = render(&Stats::default(), &config(ObfuscationStyle::None, false, false));
        assert!(report.contains("Total traffic: 0.00 Bytes"));
        assert!(report.contains("Total number of unique hosts: 0"));
        assert!(report.contains("Log time span unknown."));
        assert!(report.contains("Average sessions per day: n/a"));
        assert!(report.contains("Top 5% of hosts (0) account for 0 bytes"));
        assert!(report.contains("Analyzed 0 lines in 0.00 seconds (0.00 lines per second)"));
    }
}
