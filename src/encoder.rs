use crate::record::Record;
use crate::severity::Severity;
use colored::*;
use serde_json::{Map, Value};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoding {
    /// Tab separated, one record per line.
    Text,
    /// One JSON object per line.
    Json,
}

/// Turns a [`Record`] into a single output line (without the trailing newline).
#[derive(Clone, Copy, Debug)]
pub struct Encoder {
    encoding: Encoding,
    color: bool,
}

impl Encoder {
    pub fn new(encoding: Encoding) -> Self {
        Self {
            encoding,
            color: false,
        }
    }

    /// Plain-text encoder for the console, optionally colorizing the level.
    pub fn console(color: bool) -> Self {
        Self {
            encoding: Encoding::Text,
            color,
        }
    }

    pub fn encode(&self, record: &Record<'_>) -> String {
        match self.encoding {
            Encoding::Text => self.encode_text(record),
            Encoding::Json => encode_json(record),
        }
    }

    fn encode_text(&self, record: &Record<'_>) -> String {
        let mut parts = Vec::with_capacity(6);
        parts.push(record.time.format(TIME_FORMAT).to_string());
        parts.push(self.level(record.severity));
        if let Some(logger) = record.logger {
            parts.push(logger.to_string());
        }
        if let Some(caller) = &record.caller {
            parts.push(caller.to_string());
        }
        parts.push(record.message.clone());
        if !record.fields.is_empty() {
            parts.push(fields_object(record).to_string());
        }

        let mut line = parts.join("\t");
        if let Some(stacktrace) = &record.stacktrace {
            line.push('\n');
            line.push_str(stacktrace.trim_end());
        }
        line
    }

    fn level(&self, severity: Severity) -> String {
        if !self.color {
            return severity.as_str().to_string();
        }
        let level = severity.as_str();
        match severity {
            Severity::Debug => level.blue(),
            Severity::Info => level.white(),
            Severity::Warn => level.yellow(),
            Severity::Error => level.red(),
            Severity::Panic | Severity::Fatal => level.red().bold(),
        }
        .to_string()
    }
}

fn fields_object(record: &Record<'_>) -> Value {
    let map: Map<String, Value> = record
        .fields
        .iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    Value::Object(map)
}

fn encode_json(record: &Record<'_>) -> String {
    let mut map = Map::new();
    map.insert("level".into(), record.severity.as_str().into());
    map.insert("ts".into(), record.time.format(TIME_FORMAT).to_string().into());
    if let Some(logger) = record.logger {
        map.insert("logger".into(), logger.into());
    }
    if let Some(caller) = &record.caller {
        map.insert("caller".into(), caller.to_string().into());
    }
    map.insert("msg".into(), record.message.clone().into());
    for (key, value) in record.fields {
        map.insert(key.clone(), value.clone());
    }
    if let Some(stacktrace) = &record.stacktrace {
        map.insert("stacktrace".into(), stacktrace.clone().into());
    }
    Value::Object(map).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Caller, Field};
    use serde_json::json;

    fn fields() -> Vec<Field> {
        vec![
            ("request_id".to_string(), json!("abc-123")),
            ("attempt".to_string(), json!(2)),
        ]
    }

    #[test]
    fn test_text_layout() {
        let fields = fields();
        let mut record = Record::new(Severity::Warn, "disk almost full");
        record.fields = &fields;
        record.caller = Some(Caller {
            file: "src/disk.rs",
            line: 42,
        });

        let line = Encoder::new(Encoding::Text).encode(&record);
        let parts: Vec<&str> = line.split('\t').collect();
        assert_eq!(parts.len(), 5);
        assert_eq!(parts[1], "WARN");
        assert_eq!(parts[2], "src/disk.rs:42");
        assert_eq!(parts[3], "disk almost full");
        assert_eq!(parts[4], r#"{"request_id":"abc-123","attempt":2}"#);
        assert!(!line.contains('\n'));
    }

    #[test]
    fn test_text_without_optionals() {
        let record = Record::new(Severity::Debug, "x");
        let line = Encoder::console(false).encode(&record);
        let parts: Vec<&str> = line.split('\t').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1], "DEBUG");
        assert_eq!(parts[2], "x");
    }

    #[test]
    fn test_text_appends_stacktrace() {
        let mut record = Record::new(Severity::Error, "failed");
        record.stacktrace = Some("frame 0\nframe 1\n".to_string());
        let line = Encoder::new(Encoding::Text).encode(&record);
        assert!(line.ends_with("failed\nframe 0\nframe 1"));
    }

    #[test]
    fn test_json_key_order_and_fields() {
        let fields = fields();
        let mut record = Record::new(Severity::Error, "y");
        record.fields = &fields;
        record.logger = Some("billing");

        let line = Encoder::new(Encoding::Json).encode(&record);
        let value: Value = serde_json::from_str(&line).unwrap();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, ["level", "ts", "logger", "msg", "request_id", "attempt"]);
        assert_eq!(value["level"], "ERROR");
        assert_eq!(value["msg"], "y");
        assert_eq!(value["attempt"], 2);
    }

    #[test]
    fn test_json_escapes_message() {
        let record = Record::new(Severity::Info, "quote \" and\nnewline");
        let line = Encoder::new(Encoding::Json).encode(&record);
        assert!(!line.contains('\n'));
        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["msg"], "quote \" and\nnewline");
    }
}
