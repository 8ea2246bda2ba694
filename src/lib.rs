//! # zlog
//!
//! A configuration façade that assembles encoders, output sinks, level
//! filters and rotation policies into a ready-to-use logger, and binds derived
//! loggers into a request-scoped [`Context`] for correlating records.
//!
//! ## Routing
//!
//! The console always receives every record as plain text. With file output
//! enabled, records are additionally written to rotating files under
//! `<root>/<service>/<date>/`:
//!
//! - **simple** mode: `warn.log` (warn only) and `default.log` (everything)
//! - **detailed** mode: `debug.log`, `custom.log` (info), `warn.log` and
//!   `err.log` (error and above)
//!
//! File records are plain text or JSON. Rotation (size, backups, compression)
//! is handled by `logroller`, buffering by `tracing-appender`.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use zlog::{Config, Context, Logger, Mode};
//!
//! fn main() -> zlog::Result<()> {
//!     let logger = Logger::new(Config {
//!         mode: Mode::Detailed,
//!         write_log: true,
//!         write_json: true,
//!         service_name: "billing".to_string(),
//!         ..Default::default()
//!     })?;
//!
//!     let (ctx, request_logger) = logger.with_request_id(&Context::background(), "req-42");
//!     request_logger.info("charging card")?;
//!
//!     // Later, anywhere the context travels:
//!     logger.from_context(&ctx).error(format_args!("charge failed: {}", "declined"))?;
//!     Ok(())
//! }
//! ```

pub mod cli;

/// Configuration values, defaults and the rotation floor rule.
pub mod config;

/// Request-scoped context and derived loggers.
pub mod context;

/// Line encoders: tab separated text and JSON.
pub mod encoder;

pub mod error;

/// Optional process-wide logger and the `z*!` macros.
pub mod global;

/// Record-inspection hooks.
pub mod hooks;

/// `tracing_subscriber::Layer` bridge.
pub mod layer;

pub mod logger;
pub mod record;

/// Routing table and fan-out to sinks.
pub mod router;

pub mod severity;
pub mod sink;

pub use config::{Config, ConsoleTarget, Mode, RotationPolicy, WriteConfig};
pub use context::{Context, RequestId};
pub use error::{Error, HookError, Result};
pub use hooks::{Entry, Hook};
pub use layer::ZlogLayer;
pub use logger::{Logger, LoggerBuilder};
pub use severity::{Band, Severity};

/// The current version of zlog
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration values
///
/// Configured rotation values at or below these are replaced by them.
pub mod defaults {
    /// Maximum size of a band file in megabytes before it is rotated.
    pub const MAX_SIZE_MB: u64 = 50;

    /// Rotated files kept per band.
    pub const MAX_BACKUPS: u64 = 3;

    /// Days a rotated file is kept.
    pub const MAX_AGE_DAYS: u64 = 7;

    pub const COMPRESS: bool = true;

    /// Service name used when none is configured.
    pub const SERVICE_NAME: &str = "unknown";

    /// Context key derived loggers are bound under.
    pub const CONTEXT_KEY: &str = "zlog";
}
