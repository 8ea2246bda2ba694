//! # zlog demo - Main Entry Point
//!
//! Builds a banded logger from a JSON config file and/or flags, installs the
//! tracing bridge, then emits one record per severity inside a request
//! context. Useful for checking which files a configuration produces:
//!
//! ```text
//! zlog-demo -m detailed --write-log --json --log-path /tmp/zlog --sync-writes
//! ```
//!
//! `RUST_LOG` filters the events that reach the logger through `tracing`.

use anyhow::{Context as _, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use zlog::{
    cli::{Args, Escalation},
    Context, Logger, RequestId, ZlogLayer,
};

fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.to_config().context("failed to load configuration")?;
    let logger = Logger::new(config).context("failed to build logger")?;

    // tracing events go through the same bands as direct calls
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::registry()
        .with(ZlogLayer::new(logger.clone()).with_filter(filter))
        .init();

    info!(version = zlog::VERSION, "zlog demo starting");
    if let Some(dir) = logger.log_dir() {
        info!("Writing band files to {}", dir.display());
    }

    let request_id = args
        .request_id
        .clone()
        .map(RequestId::from)
        .unwrap_or_default();
    let (ctx, _) = logger.with_request_id(&Context::background(), request_id);
    handle_request(&logger, &ctx)?;

    match args.escalate {
        Some(Escalation::Panic) => logger.from_context(&ctx).panic("escalating to panic"),
        Some(Escalation::Fatal) => logger.from_context(&ctx).fatal("escalating to fatal"),
        None => {}
    }

    logger.sync();
    Ok(())
}

/// Emit one record per band through the logger bound in `ctx`.
fn handle_request(logger: &Logger, ctx: &Context) -> Result<()> {
    let (ctx, _) = logger.derive_with_fields(ctx, [("handler", "demo")]);
    let log = logger.from_context(&ctx);

    log.debug("resolving route")?;
    log.info(format_args!("accepted request with {} field(s)", log.fields().len()))?;
    log.warn("upstream slow, retrying")?;
    log.error("upstream failed")?;
    Ok(())
}
