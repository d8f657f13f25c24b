//! Line-level parsing of the rsync daemon log grammar.
//!
//! Every meaningful line starts with a fixed-width timestamp region
//! (`YYYY/MM/DD HH:MM:SS `), followed by the daemon's pid token and the
//! message body. The field offsets are a contract with the daemon, not
//! negotiable at runtime, which is why extraction is positional rather than
//! pattern-based. The parser is total: malformed content of any kind maps to
//! [`LogEvent::Skip`], never to an error.

use chrono::NaiveDateTime;
use rsyncstat_core::models::LogEvent;

/// Byte width of the leading timestamp region, including the trailing space.
pub const TIMESTAMP_WIDTH: usize = 20;

const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Message-body prefix of a finished transfer.
const END_MARKER: &str = "sent ";

/// Extract the timestamp from the two leading whitespace-separated tokens.
///
/// Returns `None` for blank lines, lines with fewer than two tokens, and
/// tokens that do not form a `YYYY/MM/DD HH:MM:SS` timestamp.
pub fn parse_timestamp(line: &str) -> Option<NaiveDateTime> {
    let mut tokens = line.split_whitespace();
    let date = tokens.next()?;
    let time = tokens.next()?;
    NaiveDateTime::parse_from_str(&format!("{date} {time}"), TIMESTAMP_FORMAT).ok()
}

// ── LineParser ────────────────────────────────────────────────────────────────

/// Recognizes session-start and session-end lines.
///
/// The module prefix and the excluded submodule paths reflect how the daemon
/// being analyzed names its modules; metadata-only transfers are excluded
/// because they are automated churn, not mirror sessions.
#[derive(Debug, Clone)]
pub struct LineParser {
    /// Body prefix shared by all connection lines, e.g. `"rsync on "`.
    start_marker: String,
    /// Module names must start with this to count as a session.
    module_prefix: String,
    /// Submodule paths that never count as sessions.
    excluded_modules: Vec<String>,
    /// Bodies starting with this are daemon-side failures and carry no
    /// session or byte information.
    error_marker: String,
}

impl Default for LineParser {
    fn default() -> Self {
        Self {
            start_marker: "rsync on ".to_string(),
            module_prefix: "gentoo-".to_string(),
            excluded_modules: vec![
                "gentoo-portage/metadata".to_string(),
                "gentoo-portage//metadata".to_string(),
            ],
            error_marker: "rsync error:".to_string(),
        }
    }
}

impl LineParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map one raw line (no trailing newline) to exactly one event.
    pub fn parse(&self, line: &str) -> LogEvent {
        // A line shorter than the timestamp region, or one whose 20th byte
        // falls inside a multi-byte character, cannot carry a message.
        let Some(rest) = line.get(TIMESTAMP_WIDTH..) else {
            return LogEvent::Skip;
        };

        let mut parts = rest.splitn(2, ' ');
        let pid = match parts.next() {
            Some(p) if !p.is_empty() => p,
            _ => return LogEvent::Skip,
        };
        let Some(body) = parts.next() else {
            return LogEvent::Skip;
        };

        if body.starts_with(&self.error_marker) {
            return LogEvent::Skip;
        }
        if self.is_session_start(body) {
            return parse_session_start(pid, body);
        }
        if body.starts_with(END_MARKER) {
            return parse_session_end(pid, body);
        }
        LogEvent::Skip
    }

    fn is_session_start(&self, body: &str) -> bool {
        let Some(module) = body.strip_prefix(self.start_marker.as_str()) else {
            return false;
        };
        if !module.starts_with(self.module_prefix.as_str()) {
            return false;
        }
        !self
            .excluded_modules
            .iter()
            .any(|excluded| module.starts_with(excluded.as_str()))
    }
}

// ── Field extraction ──────────────────────────────────────────────────────────

/// `rsync on <module> from <host> (<addr>)`: host and address are the 5th
/// and 6th whitespace tokens of the body.
fn parse_session_start(pid: &str, body: &str) -> LogEvent {
    let tokens: Vec<&str> = body.split_whitespace().collect();
    if tokens.len() < 6 {
        return LogEvent::Skip;
    }
    let host = tokens[4];
    let addr = tokens[5].trim_start_matches('(').trim_end_matches(')');
    if addr.is_empty() {
        return LogEvent::Skip;
    }
    LogEvent::SessionStart {
        pid: pid.to_string(),
        host: host.to_string(),
        addr: addr.to_string(),
    }
}

/// `sent <n> bytes  received <m> bytes  total size <k>`: byte counts are
/// body tokens 1 and 4.
fn parse_session_end(pid: &str, body: &str) -> LogEvent {
    let tokens: Vec<&str> = body.split_whitespace().collect();
    if tokens.len() < 5 {
        return LogEvent::Skip;
    }
    let (Some(sent_bytes), Some(received_bytes)) =
        (parse_byte_count(tokens[1]), parse_byte_count(tokens[4]))
    else {
        return LogEvent::Skip;
    };
    LogEvent::SessionEnd {
        pid: pid.to_string(),
        sent_bytes,
        received_bytes,
    }
}

/// Parse a byte count, tolerating thousands separators in either locale
/// convention (`11,777` or `11.777`).
fn parse_byte_count(token: &str) -> Option<u64> {
    let cleaned = token.replace([',', '.'], "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}
