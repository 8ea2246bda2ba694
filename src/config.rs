use crate::defaults;
use crate::error::{Error, Result};
use crate::hooks::{self, Entry, Hook};
use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// How file output is split across destinations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// One warn-only file plus one file receiving everything.
    Simple,
    /// One file per band; call sites and error backtraces are captured.
    #[default]
    Detailed,
}

/// Stream the always-on console destination writes to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleTarget {
    #[default]
    Stdout,
    Stderr,
}

/// Logger configuration.
///
/// Every field has a default, so a partial JSON document is a valid
/// configuration. Out-of-range values are repaired rather than rejected.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mode: Mode,
    /// Enable rotating file destinations.
    pub write_log: bool,
    /// Encode file destinations as JSON. The console is always plain text.
    pub write_json: bool,
    pub write_config: WriteConfig,
    pub service_name: String,
    /// Key under which derived loggers are bound into a [`crate::Context`].
    pub context_key: String,
    pub console: ConsoleTarget,
    pub console_color: bool,
    /// Invoked for every emitted record, in registration order.
    #[serde(skip)]
    pub hooks: Vec<Hook>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            write_log: false,
            write_json: false,
            write_config: WriteConfig::default(),
            service_name: String::new(),
            context_key: defaults::CONTEXT_KEY.to_string(),
            console: ConsoleTarget::default(),
            console_color: true,
            hooks: Vec::new(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("mode", &self.mode)
            .field("write_log", &self.write_log)
            .field("write_json", &self.write_json)
            .field("write_config", &self.write_config)
            .field("service_name", &self.service_name)
            .field("context_key", &self.context_key)
            .field("console", &self.console)
            .field("console_color", &self.console_color)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json_str(&raw)
    }

    /// Register a record hook. Hooks run in the order they are added.
    pub fn with_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Entry<'_>) -> std::result::Result<(), crate::HookError> + Send + Sync + 'static,
    {
        self.hooks.push(hooks::hook(hook));
        self
    }

    /// Service name, replaced by `"unknown"` when empty or when it is not a
    /// single path component.
    pub fn service_name(&self) -> &str {
        let name = self.service_name.trim();
        let unusable = name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(|c| c == '/' || c == '\\');
        if unusable {
            defaults::SERVICE_NAME
        } else {
            name
        }
    }

    pub fn context_key(&self) -> &str {
        let key = self.context_key.trim();
        if key.is_empty() {
            defaults::CONTEXT_KEY
        } else {
            key
        }
    }
}

/// File output settings. Numeric rotation values are floored to the defaults.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteConfig {
    /// Root directory; `<root>/<service>/<date>/` holds the band files.
    pub log_path: Option<PathBuf>,
    pub max_size_mb: u64,
    pub max_backups: u64,
    pub max_age_days: u64,
    pub compress: bool,
    /// Write files on the calling thread instead of a background worker.
    pub sync_writes: bool,
}

impl Default for WriteConfig {
    fn default() -> Self {
        Self {
            log_path: None,
            max_size_mb: 0,
            max_backups: 0,
            max_age_days: 0,
            compress: defaults::COMPRESS,
            sync_writes: false,
        }
    }
}

impl WriteConfig {
    /// Effective rotation policy after floor substitution.
    pub fn rotation_policy(&self) -> RotationPolicy {
        RotationPolicy {
            max_size_mb: self.max_size_mb,
            max_backups: self.max_backups,
            max_age_days: self.max_age_days,
            compress: self.compress,
        }
        .floored()
    }

    /// Directory holding the band files for `service` on `date`.
    pub fn log_dir(&self, service: &str, date: NaiveDate) -> PathBuf {
        let root = match &self.log_path {
            Some(path) if !path.as_os_str().is_empty() => path.clone(),
            _ => default_log_root(),
        };
        root.join(service).join(date.format("%Y-%m-%d").to_string())
    }
}

/// Root used when no `log_path` is configured.
pub fn default_log_root() -> PathBuf {
    if cfg!(target_os = "macos") {
        PathBuf::from("/tmp")
    } else if cfg!(windows) {
        std::env::temp_dir()
    } else {
        PathBuf::from("/var/log")
    }
}

/// Size/age/count thresholds governing when a band file is archived.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RotationPolicy {
    pub max_size_mb: u64,
    pub max_backups: u64,
    pub max_age_days: u64,
    pub compress: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_size_mb: defaults::MAX_SIZE_MB,
            max_backups: defaults::MAX_BACKUPS,
            max_age_days: defaults::MAX_AGE_DAYS,
            compress: defaults::COMPRESS,
        }
    }
}

impl RotationPolicy {
    /// Replace every numeric value at or below its default with the default.
    pub fn floored(self) -> Self {
        Self {
            max_size_mb: self.max_size_mb.max(defaults::MAX_SIZE_MB),
            max_backups: self.max_backups.max(defaults::MAX_BACKUPS),
            max_age_days: self.max_age_days.max(defaults::MAX_AGE_DAYS),
            compress: self.compress,
        }
    }
}
