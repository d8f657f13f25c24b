//! Core data structures and pure helpers for rsyncstat.
//!
//! Everything here is independent of I/O: the accounting structures, the
//! session correlation table, the typed log events, report formatting
//! helpers and the CLI settings surface.

pub mod counter;
pub mod error;
pub mod formatting;
pub mod models;
pub mod sessions;
pub mod settings;

pub use counter::Counter;
pub use error::{AnalyzerError, Result};
pub use models::{HostNameCache, LogEvent, Stats};
pub use sessions::SessionTable;
