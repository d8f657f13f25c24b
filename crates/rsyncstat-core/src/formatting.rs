use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AnalyzerError;

/// Unit prefixes indexed by the magnitude returned from [`crunch`].
pub const UNIT_PREFIXES: [&str; 6] = ["", "k", "M", "G", "T", "P"];

/// Scale `value` down by repeated division.
///
/// Divides as long as the value is at least `divisor`, counting the
/// divisions. The count indexes [`UNIT_PREFIXES`].
///
/// # Examples
///
/// ```
/// use rsyncstat_core::formatting::crunch;
///
/// assert_eq!(crunch(1024.0, 1024.0), (1.0, 1));
/// assert_eq!(crunch(1023.0, 1024.0), (1023.0, 0));
/// assert_eq!(crunch(1_048_576.0, 1024.0), (1.0, 2));
/// assert_eq!(crunch(894.352, 1000.0), (894.352, 0));
/// ```
pub fn crunch(value: f64, divisor: f64) -> (f64, u32) {
    if divisor <= 1.0 {
        return (value, 0);
    }
    let mut scaled = value;
    let mut magnitude = 0u32;
    while scaled >= divisor {
        scaled /= divisor;
        magnitude += 1;
    }
    (scaled, magnitude)
}

/// Unit prefix for a [`crunch`] magnitude.
///
/// Magnitudes beyond the table render without a prefix letter rather than
/// failing; byte counts that large do not occur in practice.
pub fn unit_prefix(magnitude: u32) -> &'static str {
    UNIT_PREFIXES.get(magnitude as usize).copied().unwrap_or("")
}

/// Calculate `(part / whole) * 100`, rounded to `decimal_places`.
///
/// Returns `0.0` if `whole` is zero to avoid division by zero.
pub fn percentage(part: f64, whole: f64, decimal_places: u32) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    let raw = (part / whole) * 100.0;
    let factor = 10_f64.powi(decimal_places as i32);
    (raw * factor).round() / factor
}

// ── Obfuscation ───────────────────────────────────────────────────────────────

/// Display-time transform applied to host and address strings.
///
/// Aggregation always runs on the true keys; obfuscation only affects the
/// rendered report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObfuscationStyle {
    /// Identities are shown unchanged.
    #[default]
    None,
    /// Keep the leading address fields, truncate the rest.
    Simple,
    /// Salted digest, unrecognisable but stable within one run.
    Fancy,
}

impl ObfuscationStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObfuscationStyle::None => "none",
            ObfuscationStyle::Simple => "simple",
            ObfuscationStyle::Fancy => "fancy",
        }
    }
}

impl fmt::Display for ObfuscationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObfuscationStyle {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" | "" => Ok(ObfuscationStyle::None),
            "simple" => Ok(ObfuscationStyle::Simple),
            "fancy" => Ok(ObfuscationStyle::Fancy),
            other => Err(AnalyzerError::Config(format!(
                "unknown obfuscation style: {other}"
            ))),
        }
    }
}

/// Obfuscate one host or address string for display.
///
/// * `none` returns the value unchanged.
/// * `simple` keeps the first two `:`-fields of an IPv6 address (the
///   loopback shorthand `::1` is returned verbatim) or the first two
///   `.`-fields of an IPv4 address or hostname, followed by `...`.
/// * `fancy` renders the first and last 8 hex digits of the MD5 digest of
///   the value concatenated with `salt`. The salt lives for one process
///   invocation, so fancy values are only comparable within a single run.
///
/// The empty string is never obfuscated.
///
/// # Examples
///
/// ```
/// use rsyncstat_core::formatting::{obfuscate, ObfuscationStyle};
///
/// assert_eq!(obfuscate("127.0.0.1", ObfuscationStyle::Simple, ""), "127.0...");
/// assert_eq!(obfuscate("::1", ObfuscationStyle::Simple, ""), "::1");
/// assert_eq!(obfuscate("", ObfuscationStyle::Fancy, "salt"), "");
/// ```
pub fn obfuscate(value: &str, style: ObfuscationStyle, salt: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    match style {
        ObfuscationStyle::None => value.to_string(),
        ObfuscationStyle::Simple => obfuscate_simple(value),
        ObfuscationStyle::Fancy => obfuscate_fancy(value, salt),
    }
}

/// Generate the process-lifetime salt for fancy obfuscation.
///
/// Not persisted anywhere; a new salt means a new identity mapping on every
/// run.
pub fn random_salt() -> String {
    use rand::Rng;
    format!("{:032x}", rand::rng().random::<u128>())
}

fn obfuscate_simple(value: &str) -> String {
    if value.contains(':') {
        if value == "::1" {
            return value.to_string();
        }
        let fields: Vec<&str> = value.split(':').collect();
        let keep = fields.len().min(2);
        format!("{}...", fields[..keep].join(":"))
    } else {
        let fields: Vec<&str> = value.split('.').collect();
        let keep = fields.len().min(2);
        format!("{}...", fields[..keep].join("."))
    }
}

fn obfuscate_fancy(value: &str, salt: &str) -> String {
    let digest = format!("{:x}", md5::compute(format!("{value}{salt}")));
    format!("{}...{}", &digest[..8], &digest[digest.len() - 8..])
}
