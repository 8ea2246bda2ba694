use crate::config::{Config, ConsoleTarget, Mode};
use crate::hooks;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// zlog demo - emits a sample record at every severity through a banded logger
#[derive(Parser, Debug, Default)]
#[clap(version, about, long_about = None)]
pub struct Args {
    /// JSON configuration file; flags below override its values
    #[clap(short = 'c', long, help_heading = "Core Options")]
    pub config: Option<PathBuf>,

    /// Routing mode (simple: warn + default files, detailed: one file per band)
    #[clap(short = 'm', long, value_enum, help_heading = "Core Options")]
    pub mode: Option<Mode>,

    /// Service name used in the log directory
    #[clap(short = 's', long, help_heading = "Core Options")]
    pub service: Option<String>,

    /// Write rotating band files in addition to the console
    #[clap(long, default_value_t = false)]
    pub write_log: bool,

    /// Encode band files as JSON
    #[clap(long, default_value_t = false)]
    pub json: bool,

    /// Root directory for band files
    #[clap(long)]
    pub log_path: Option<PathBuf>,

    /// Maximum file size in MB before rotation (floored to the default)
    #[clap(long)]
    pub max_size_mb: Option<u64>,

    /// Rotated files to keep (floored to the default)
    #[clap(long)]
    pub max_backups: Option<u64>,

    /// Days to keep rotated files (floored to the default)
    #[clap(long)]
    pub max_age_days: Option<u64>,

    /// Write files on the calling thread
    #[clap(long, default_value_t = false)]
    pub sync_writes: bool,

    /// Write console output to stderr instead of stdout
    #[clap(long, default_value_t = false)]
    pub stderr: bool,

    /// Disable level colors on the console
    #[clap(long, default_value_t = false)]
    pub no_color: bool,

    /// Echo warn-and-above records to stderr through a hook
    #[clap(long, default_value_t = false)]
    pub echo_hook: bool,

    /// Request identifier to correlate the sample records (random when omitted)
    #[clap(long)]
    pub request_id: Option<String>,

    /// Finish with a panic or fatal record
    #[clap(long, value_enum)]
    pub escalate: Option<Escalation>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Escalation {
    Panic,
    Fatal,
}

impl Args {
    /// Resolve the logger configuration: file values first, then flags.
    pub fn to_config(&self) -> crate::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)?,
            None => Config::default(),
        };

        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(service) = &self.service {
            config.service_name = service.clone();
        }
        config.write_log |= self.write_log;
        config.write_json |= self.json;

        let write = &mut config.write_config;
        if self.log_path.is_some() {
            write.log_path = self.log_path.clone();
        }
        if let Some(size) = self.max_size_mb {
            write.max_size_mb = size;
        }
        if let Some(backups) = self.max_backups {
            write.max_backups = backups;
        }
        if let Some(age) = self.max_age_days {
            write.max_age_days = age;
        }
        write.sync_writes |= self.sync_writes;

        if self.stderr {
            config.console = ConsoleTarget::Stderr;
        }
        if self.no_color {
            config.console_color = false;
        }
        if self.echo_hook {
            config = config.with_hook(hooks::warn_echo());
        }
        Ok(config)
    }
}
