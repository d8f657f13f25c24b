use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the analyzer.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// The logfile could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The stream-wide structure of the input is broken: not a single line
    /// yielded a usable timestamp, so session correlation is meaningless.
    #[error("Malformed logfile: {0}")]
    MalformedLog(String),

    /// The run was cancelled by the user before the report was built.
    #[error("Interrupted")]
    Interrupted,

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AnalyzerError {
    /// Process exit code for this error.
    ///
    /// A clean run exits 0. Malformed input and user interruption get their
    /// own codes so callers can tell the failure shapes apart:
    ///
    /// * `1`: I/O or configuration failure
    /// * `2`: structurally malformed logfile
    /// * `130`: interrupted (conventional 128 + SIGINT)
    pub fn exit_code(&self) -> u8 {
        match self {
            AnalyzerError::MalformedLog(_) => 2,
            AnalyzerError::Interrupted => 130,
            _ => 1,
        }
    }
}

/// Convenience alias used throughout the rsyncstat crates.
pub type Result<T> = std::result::Result<T, AnalyzerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = AnalyzerError::FileRead {
            path: PathBuf::from("/var/log/rsyncd.log"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/var/log/rsyncd.log"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_malformed_log() {
        let err = AnalyzerError::MalformedLog("no parsable timestamp in 42 lines".to_string());
        assert_eq!(
            err.to_string(),
            "Malformed logfile: no parsable timestamp in 42 lines"
        );
    }

    #[test]
    fn test_error_display_interrupted() {
        assert_eq!(AnalyzerError::Interrupted.to_string(), "Interrupted");
    }

    #[test]
    fn test_error_display_config() {
        let err = AnalyzerError::Config("unknown obfuscation style: blurry".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: unknown obfuscation style: blurry"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: AnalyzerError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let malformed = AnalyzerError::MalformedLog("x".to_string());
        let io: AnalyzerError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();

        assert_eq!(malformed.exit_code(), 2);
        assert_eq!(AnalyzerError::Interrupted.exit_code(), 130);
        assert_eq!(io.exit_code(), 1);
    }
}
