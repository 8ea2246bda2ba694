use crate::severity::Severity;
use chrono::{DateTime, Local};
use serde_json::Value;
use std::fmt;
use std::panic::Location;

/// A structured key/value pair carried by a logger and attached to its records.
pub type Field = (String, Value);

/// Source location of a log call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Caller {
    pub file: &'static str,
    pub line: u32,
}

impl From<&'static Location<'static>> for Caller {
    fn from(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
        }
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One log record on its way to the sinks.
#[derive(Debug, Clone)]
pub struct Record<'a> {
    pub time: DateTime<Local>,
    pub severity: Severity,
    pub message: String,
    pub fields: &'a [Field],
    pub logger: Option<&'a str>,
    pub caller: Option<Caller>,
    pub stacktrace: Option<String>,
}

impl<'a> Record<'a> {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            time: Local::now(),
            severity,
            message: message.into(),
            fields: &[],
            logger: None,
            caller: None,
            stacktrace: None,
        }
    }
}
