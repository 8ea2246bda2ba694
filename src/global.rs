//! Optional process-wide logger.
//!
//! Components that can hold a [`Logger`] should; this module exists for code
//! that cannot thread a handle through. Until [`init`] succeeds every entry
//! point degrades to a no-op after a one-time diagnostic.

use crate::config::Config;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::logger::Logger;
use serde_json::Value;
use std::fmt;
use std::sync::{Once, OnceLock};

static GLOBAL: OnceLock<Logger> = OnceLock::new();
static NOOP: OnceLock<Logger> = OnceLock::new();
static UNINITIALIZED: Once = Once::new();

/// Build the process-wide logger. Fails if one is already installed.
pub fn init(config: Config) -> Result<Logger> {
    if GLOBAL.get().is_some() {
        return Err(Error::AlreadyInitialized);
    }
    let logger = Logger::new(config)?;
    GLOBAL
        .set(logger.clone())
        .map_err(|_| Error::AlreadyInitialized)?;
    Ok(logger)
}

pub fn is_initialized() -> bool {
    GLOBAL.get().is_some()
}

/// The installed logger, if [`init`] has succeeded.
pub fn try_logger() -> Option<&'static Logger> {
    GLOBAL.get()
}

/// The installed logger, or a no-op logger before [`init`].
pub fn logger() -> &'static Logger {
    match GLOBAL.get() {
        Some(logger) => logger,
        None => {
            report_uninitialized();
            NOOP.get_or_init(Logger::noop)
        }
    }
}

fn report_uninitialized() {
    UNINITIALIZED.call_once(|| {
        if tracing::dispatcher::has_been_set() {
            tracing::warn!("zlog used before global::init; records are discarded");
        } else {
            eprintln!("zlog: used before global::init; records are discarded");
        }
    });
}

/// The logger bound in `ctx`, or the process-wide logger.
pub fn from_context(ctx: &Context) -> Logger {
    logger().from_context(ctx)
}

/// See [`Logger::derive_with_fields`].
pub fn derive_with_fields<I, K, V>(ctx: &Context, fields: I) -> (Context, Logger)
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    logger().derive_with_fields(ctx, fields)
}

/// Flush the process-wide logger, draining buffered files to disk.
///
/// The installed logger is never dropped, so call this before the process
/// exits. A no-op before [`init`].
pub fn sync() {
    if let Some(logger) = GLOBAL.get() {
        logger.sync();
    }
}

#[track_caller]
pub fn debug(message: impl fmt::Display) -> Result<()> {
    logger().debug(message)
}

#[track_caller]
pub fn info(message: impl fmt::Display) -> Result<()> {
    logger().info(message)
}

#[track_caller]
pub fn warn(message: impl fmt::Display) -> Result<()> {
    logger().warn(message)
}

#[track_caller]
pub fn error(message: impl fmt::Display) -> Result<()> {
    logger().error(message)
}

#[track_caller]
pub fn panic(message: impl fmt::Display) -> ! {
    logger().panic(message)
}

#[track_caller]
pub fn fatal(message: impl fmt::Display) -> ! {
    logger().fatal(message)
}

/// Log a formatted message at debug severity through the process-wide logger.
#[macro_export]
macro_rules! zdebug {
    ($($arg:tt)+) => {
        $crate::global::debug(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! zinfo {
    ($($arg:tt)+) => {
        $crate::global::info(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! zwarn {
    ($($arg:tt)+) => {
        $crate::global::warn(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! zerror {
    ($($arg:tt)+) => {
        $crate::global::error(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! zpanic {
    ($($arg:tt)+) => {
        $crate::global::panic(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! zfatal {
    ($($arg:tt)+) => {
        $crate::global::fatal(::std::format_args!($($arg)+))
    };
}
