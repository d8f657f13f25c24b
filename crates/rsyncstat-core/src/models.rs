use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::counter::Counter;

/// Hostname placeholder the daemon writes when reverse lookup failed.
pub const UNKNOWN_HOSTNAME: &str = "UNKNOWN";

/// One parsed log line.
///
/// The parser is total: every line maps to exactly one of these, with `Skip`
/// absorbing blank, truncated and otherwise malformed lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogEvent {
    /// A client connected to a module.
    SessionStart {
        pid: String,
        host: String,
        addr: String,
    },
    /// A transfer finished; byte counts as reported by the daemon.
    SessionEnd {
        pid: String,
        sent_bytes: u64,
        received_bytes: u64,
    },
    /// Nothing of interest on this line.
    Skip,
}

// ── HostNameCache ─────────────────────────────────────────────────────────────

/// Display names for remote addresses.
///
/// The first non-placeholder hostname observed for an address wins; later
/// observations are ignored. Used only when rendering the report, never for
/// correlation or accounting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostNameCache {
    names: HashMap<String, String>,
}

impl HostNameCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `host` as the display name for `addr` unless one is already
    /// cached or `host` is the daemon's placeholder.
    pub fn record(&mut self, addr: &str, host: &str) {
        if host == UNKNOWN_HOSTNAME {
            return;
        }
        self.names
            .entry(addr.to_string())
            .or_insert_with(|| host.to_string());
    }

    pub fn get(&self, addr: &str) -> Option<&str> {
        self.names.get(addr).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// ── Stats ─────────────────────────────────────────────────────────────────────

/// Aggregate result of one pass over the log.
///
/// Owned exclusively by the aggregator while it runs, then handed read-only
/// to the report builder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stats {
    /// Lines that carried a parsable timestamp.
    pub line_count: u64,
    /// Wall-clock seconds spent consuming the input.
    pub elapsed_seconds: f64,
    /// Sum of sent + received bytes over all session-end events, matched or
    /// not.
    pub total_traffic: u64,
    /// Session count per remote address.
    pub sessions_by_host: Counter,
    /// Byte volume per remote address.
    pub bytes_by_host: Counter,
    /// Display names collected along the way.
    pub hostnames: HostNameCache,
    /// Calendar days between the first and last timestamped line, fractional.
    /// `None` when fewer than two lines were timestamped.
    pub span_days: Option<f64>,
    /// Lifetime session-start count (includes sessions that never ended).
    pub total_sessions: u64,
    /// Session-end events that had no matching start and were dropped from
    /// the per-host tallies.
    pub unmatched_ends: u64,
}

impl Stats {
    /// Processing rate for the throughput line. Zero when no time elapsed.
    pub fn lines_per_second(&self) -> f64 {
        if self.elapsed_seconds <= 0.0 {
            return 0.0;
        }
        self.line_count as f64 / self.elapsed_seconds
    }
}
