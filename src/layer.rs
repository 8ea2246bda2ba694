//! Bridge from `tracing` events into a [`Logger`].
//!
//! Installing [`ZlogLayer`] on a `tracing_subscriber` registry routes every
//! `tracing::info!` (and friends) through the same bands, files and hooks as
//! direct logger calls.

use crate::logger::Logger;
use crate::record::{Caller, Field};
use crate::severity::Severity;
use serde_json::Value;
use std::fmt;
use tracing::field::{Field as TracingField, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context as LayerContext, Layer};

pub struct ZlogLayer {
    logger: Logger,
}

impl ZlogLayer {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

impl<S> Layer<S> for ZlogLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: LayerContext<'_, S>) {
        let metadata = event.metadata();
        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let caller = if self.logger.captures_caller() {
            match (metadata.file(), metadata.line()) {
                (Some(file), Some(line)) => Some(Caller { file, line }),
                _ => None,
            }
        } else {
            None
        };

        let result = self.logger.emit(
            Severity::from(*metadata.level()),
            visitor.message,
            &visitor.fields,
            caller,
            Some(metadata.target()),
        );
        if let Err(err) = result {
            eprintln!("zlog: {}", err);
        }
    }
}

/// Splits an event into its `message` and the remaining structured fields.
#[derive(Default)]
struct EventVisitor {
    message: String,
    fields: Vec<Field>,
}

impl EventVisitor {
    fn insert(&mut self, field: &TracingField, value: Value) {
        if field.name() == "message" {
            self.message = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
        } else {
            self.fields.push((field.name().to_string(), value));
        }
    }
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &TracingField, value: &dyn fmt::Debug) {
        self.insert(field, Value::String(format!("{:?}", value)));
    }

    fn record_str(&mut self, field: &TracingField, value: &str) {
        self.insert(field, Value::String(value.to_string()));
    }

    fn record_i64(&mut self, field: &TracingField, value: i64) {
        self.insert(field, value.into());
    }

    fn record_u64(&mut self, field: &TracingField, value: u64) {
        self.insert(field, value.into());
    }

    fn record_f64(&mut self, field: &TracingField, value: f64) {
        self.insert(field, value.into());
    }

    fn record_bool(&mut self, field: &TracingField, value: bool) {
        self.insert(field, value.into());
    }
}
