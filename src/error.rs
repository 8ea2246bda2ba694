//! Error types shared across the crate.

use std::fmt;
use std::path::PathBuf;

/// Error returned by a record-inspection hook.
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used by every fallible zlog operation.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open rotating log file {path}: {reason}")]
    Rotation { path: PathBuf, reason: String },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("{} record hook(s) failed: {}", .0.len(), HookFailures(.0))]
    Hooks(Vec<HookFailure>),

    #[error("the process-wide logger is already initialized")]
    AlreadyInitialized,
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// A single hook failure, tagged with the hook's registration index.
#[derive(Debug)]
pub struct HookFailure {
    pub index: usize,
    pub error: HookError,
}

impl fmt::Display for HookFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hook #{}: {}", self.index, self.error)
    }
}

struct HookFailures<'a>(&'a [HookFailure]);

impl fmt::Display for HookFailures<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", failure)?;
        }
        Ok(())
    }
}
