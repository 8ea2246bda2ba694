//! Severities and the bands that route them to destinations.

use std::fmt;

/// Record severity, ordered from least to most severe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
    /// Logged, then unwinds the calling thread.
    Panic,
    /// Logged, then terminates the process.
    Fatal,
}

impl Severity {
    pub const ALL: [Severity; 6] = [
        Severity::Debug,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
        Severity::Panic,
        Severity::Fatal,
    ];

    /// Capitalized level name used by both encoders.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Panic => "PANIC",
            Severity::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<tracing::Level> for Severity {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE | tracing::Level::DEBUG => Severity::Debug,
            tracing::Level::INFO => Severity::Info,
            tracing::Level::WARN => Severity::Warn,
            tracing::Level::ERROR => Severity::Error,
        }
    }
}

/// A severity range routed to one destination.
///
/// `Debug`, `Custom`, `Warn` and `Error` partition the severities; `All`
/// overlaps every one of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Band {
    /// Below info.
    Debug,
    /// Info only.
    Custom,
    /// Warn only.
    Warn,
    /// Error and above, including panic and fatal.
    Error,
    /// Everything.
    All,
}

impl Band {
    pub fn accepts(&self, severity: Severity) -> bool {
        match self {
            Band::Debug => severity < Severity::Info,
            Band::Custom => severity >= Severity::Info && severity < Severity::Warn,
            Band::Warn => severity == Severity::Warn,
            Band::Error => severity >= Severity::Error,
            Band::All => true,
        }
    }

    /// File stem used when this band is written to disk: `<dir>/<stem>.log`.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Band::Debug => "debug",
            Band::Custom => "custom",
            Band::Warn => "warn",
            Band::Error => "err",
            Band::All => "default",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}
