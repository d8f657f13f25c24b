use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Correlation table for in-flight sessions.
///
/// A session-start event pushes the remote address under the daemon's
/// transient pid; the matching session-end pops it. Pids are only unique for
/// a connection's lifetime and are freely reused afterwards, so `push`
/// overwrites unconditionally. Entries whose end event never arrives (log
/// truncated mid-session) simply stay in the table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionTable {
    active: HashMap<String, String>,
    seen_count: u64,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session under `pid`, replacing any stale entry.
    pub fn push(&mut self, pid: &str, host: &str) {
        self.seen_count += 1;
        self.active.insert(pid.to_string(), host.to_string());
    }

    /// Remove and return the host for `pid`, or `None` when the pid was
    /// never pushed or was already popped.
    pub fn pop(&mut self, pid: &str) -> Option<String> {
        self.active.remove(pid)
    }

    /// Lifetime push counter. Never decremented; this is the total number of
    /// sessions ever started, not the size of the table.
    pub fn seen_count(&self) -> u64 {
        self.seen_count
    }

    /// Number of sessions still awaiting their end event.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}
