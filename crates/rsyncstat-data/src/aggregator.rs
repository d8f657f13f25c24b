//! Streaming aggregation over a whole logfile.
//!
//! Drives the [`LineParser`] across every input line, correlating starts and
//! ends through the [`SessionTable`] and tallying per-host sessions and
//! bytes. One aggregator owns its tables for exactly one run; the result is
//! an immutable [`Stats`] snapshot.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use chrono::NaiveDateTime;
use rsyncstat_core::error::{AnalyzerError, Result};
use rsyncstat_core::models::{HostNameCache, LogEvent, Stats};
use rsyncstat_core::{Counter, SessionTable};
use tracing::debug;

use crate::parser::{parse_timestamp, LineParser};

const SECONDS_PER_DAY: f64 = 86_400.0;

pub struct StreamAggregator {
    parser: LineParser,
    sessions_by_host: Counter,
    bytes_by_host: Counter,
    table: SessionTable,
    hostnames: HostNameCache,
    /// Lines whose timestamp parsed.
    line_count: u64,
    /// Every line read, parsable or not.
    raw_line_count: u64,
    total_traffic: u64,
    unmatched_ends: u64,
    first_ts: Option<NaiveDateTime>,
    last_ts: Option<NaiveDateTime>,
}

impl Default for StreamAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamAggregator {
    pub fn new() -> Self {
        Self {
            parser: LineParser::new(),
            sessions_by_host: Counter::new(),
            bytes_by_host: Counter::new(),
            table: SessionTable::new(),
            hostnames: HostNameCache::new(),
            line_count: 0,
            raw_line_count: 0,
            total_traffic: 0,
            unmatched_ends: 0,
            first_ts: None,
            last_ts: None,
        }
    }

    /// Consume the entire input and return the final snapshot.
    ///
    /// The `interrupt` flag is polled once per line; when it flips the run
    /// aborts with [`AnalyzerError::Interrupted`] and no snapshot is
    /// produced, so a cancelled run can never emit a partial report.
    pub fn consume<R: BufRead>(mut self, reader: R, interrupt: &AtomicBool) -> Result<Stats> {
        let started = Instant::now();

        for line_result in reader.lines() {
            if interrupt.load(Ordering::Relaxed) {
                return Err(AnalyzerError::Interrupted);
            }
            let line = match line_result {
                Ok(l) => l,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {
                    return Err(AnalyzerError::Interrupted)
                }
                Err(e) => return Err(e.into()),
            };
            self.observe(&line);
        }

        self.finish(started.elapsed().as_secs_f64())
    }

    /// Fold one line into the running state.
    fn observe(&mut self, line: &str) {
        self.raw_line_count += 1;

        // A line counts toward the line total only once its timestamp
        // parses; the first successfully timestamped line is line 1.
        if let Some(ts) = parse_timestamp(line) {
            self.line_count += 1;
            if self.first_ts.is_none() {
                self.first_ts = Some(ts);
            }
            self.last_ts = Some(ts);
        }

        match self.parser.parse(line) {
            LogEvent::SessionStart { pid, host, addr } => {
                self.hostnames.record(&addr, &host);
                self.sessions_by_host.increment(&addr, 1);
                self.table.push(&pid, &addr);
            }
            LogEvent::SessionEnd {
                pid,
                sent_bytes,
                received_bytes,
            } => {
                let bytes = sent_bytes + received_bytes;
                self.total_traffic += bytes;
                match self.table.pop(&pid) {
                    Some(addr) => self.bytes_by_host.increment(&addr, bytes as i64),
                    // End without a visible start (log truncated at the
                    // head): the bytes stay in the grand total but are not
                    // attributed to any host.
                    None => {
                        self.unmatched_ends += 1;
                        debug!("end event for {pid} has no matching start, {bytes} bytes unattributed");
                    }
                }
            }
            LogEvent::Skip => {}
        }
    }

    fn finish(self, elapsed_seconds: f64) -> Result<Stats> {
        if self.raw_line_count > 0 && self.line_count == 0 {
            return Err(AnalyzerError::MalformedLog(format!(
                "no parsable timestamp in {} lines",
                self.raw_line_count
            )));
        }

        let span_days = match (self.first_ts, self.last_ts) {
            (Some(first), Some(last)) if last > first => {
                Some((last - first).num_seconds() as f64 / SECONDS_PER_DAY)
            }
            _ => None,
        };

        if self.table.active_count() > 0 {
            debug!(
                "{} sessions never saw their end event",
                self.table.active_count()
            );
        }

        Ok(Stats {
            line_count: self.line_count,
            elapsed_seconds,
            total_traffic: self.total_traffic,
            sessions_by_host: self.sessions_by_host,
            bytes_by_host: self.bytes_by_host,
            hostnames: self.hostnames,
            span_days,
            total_sessions: self.table.seen_count(),
            unmatched_ends: self.unmatched_ends,
        })
    }
}
