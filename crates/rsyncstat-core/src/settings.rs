use clap::Parser;
use std::path::PathBuf;

use crate::error::Result;
use crate::formatting::ObfuscationStyle;

/// Traffic and session statistics from rsync daemon logs
#[derive(Parser, Debug, Clone)]
#[command(
    name = "rsyncstat",
    about = "Per-host traffic and session report from an rsync daemon logfile",
    version
)]
pub struct Settings {
    /// Logfile to analyze; read from stdin when omitted
    pub logfile: Option<PathBuf>,

    /// Obfuscation style for displayed hosts and addresses
    #[arg(short = 'o', long, default_value = "none", value_parser = ["none", "simple", "fancy"])]
    pub obfuscate: String,

    /// Print the top-10 tables smallest-first instead of biggest-first
    #[arg(short, long)]
    pub reverse: bool,

    /// Only print the two ranked tables, no summaries
    #[arg(short, long)]
    pub short: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,
}

impl Settings {
    /// Parse from an explicit argument list, enabling unit tests without
    /// touching the process arguments.
    pub fn from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(args)
    }

    /// The obfuscation flag as a typed style.
    ///
    /// clap already restricts the flag to the known names, so this only
    /// fails for hand-constructed settings.
    pub fn obfuscation_style(&self) -> Result<ObfuscationStyle> {
        self.obfuscate.parse()
    }
}
