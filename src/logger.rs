//! The logger handle.
//!
//! A [`Logger`] is a cheap-to-clone handle onto a shared core (the router plus
//! its hooks). Children created with [`Logger::with_fields`] or
//! [`Logger::named`] share the core and carry their own fields.

use crate::config::{Config, ConsoleTarget, Mode};
use crate::error::Result;
use crate::hooks::{self, Entry, Hook};
use crate::record::{Caller, Field, Record};
use crate::router::Router;
use crate::severity::Severity;
use serde_json::Value;
use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::fmt;
use std::io::Write;
use std::panic::Location;
use std::path::Path;
use std::sync::Arc;

struct Core {
    router: Router,
    hooks: Vec<Hook>,
    /// Detailed mode: record call sites and error backtraces.
    capture_caller: bool,
    context_key: String,
}

#[derive(Clone)]
pub struct Logger {
    core: Arc<Core>,
    fields: Arc<Vec<Field>>,
    name: Option<Arc<str>>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("sinks", &self.core.router.sinks().len())
            .field("hooks", &self.core.hooks.len())
            .finish()
    }
}

/// Builds a [`Logger`], optionally overriding the console stream.
pub struct LoggerBuilder {
    config: Config,
    console: Option<Box<dyn Write + Send>>,
}

impl LoggerBuilder {
    /// Send console output to `writer` instead of the configured stream.
    pub fn console_writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.console = Some(Box::new(writer));
        self
    }

    pub fn build(self) -> Result<Logger> {
        let console = match self.console {
            Some(writer) => writer,
            None => console_stream(self.config.console),
        };
        let router = Router::build(&self.config, console)?;
        let core = Core {
            router,
            capture_caller: self.config.mode == Mode::Detailed,
            context_key: self.config.context_key().to_string(),
            hooks: self.config.hooks,
        };
        Ok(Logger {
            core: Arc::new(core),
            fields: Arc::new(Vec::new()),
            name: None,
        })
    }
}

fn console_stream(target: ConsoleTarget) -> Box<dyn Write + Send> {
    match target {
        ConsoleTarget::Stdout => Box::new(std::io::stdout()),
        ConsoleTarget::Stderr => Box::new(std::io::stderr()),
    }
}

impl Logger {
    /// Build a logger writing to the configured console stream and files.
    pub fn new(config: Config) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: Config) -> LoggerBuilder {
        LoggerBuilder {
            config,
            console: None,
        }
    }

    /// A logger with no destinations and no hooks.
    pub fn noop() -> Self {
        Self {
            core: Arc::new(Core {
                router: Router::empty(),
                hooks: Vec::new(),
                capture_caller: false,
                context_key: crate::defaults::CONTEXT_KEY.to_string(),
            }),
            fields: Arc::new(Vec::new()),
            name: None,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.core.router.is_empty() && self.core.hooks.is_empty()
    }

    /// Child logger carrying `fields` in addition to this logger's own.
    ///
    /// A key already present is overridden by the new value.
    pub fn with_fields<I, K, V>(&self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut merged: Vec<Field> = self.fields.as_ref().clone();
        for (key, value) in fields {
            let key = key.into();
            let value = value.into();
            match merged.iter_mut().find(|(existing, _)| *existing == key) {
                Some(slot) => slot.1 = value,
                None => merged.push((key, value)),
            }
        }
        Self {
            core: Arc::clone(&self.core),
            fields: Arc::new(merged),
            name: self.name.clone(),
        }
    }

    /// Child logger with a name, appended with `.` to any existing name.
    pub fn named(&self, name: &str) -> Self {
        let name: Arc<str> = match &self.name {
            Some(parent) => format!("{}.{}", parent, name).into(),
            None => name.into(),
        };
        Self {
            core: Arc::clone(&self.core),
            fields: Arc::clone(&self.fields),
            name: Some(name),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Key this logger's children are bound under in a [`crate::Context`].
    pub fn context_key(&self) -> &str {
        &self.core.context_key
    }

    /// Directory holding the band files, when file output is enabled.
    pub fn log_dir(&self) -> Option<&Path> {
        self.core.router.log_dir()
    }

    /// Emit `message` at `severity`.
    ///
    /// The record reaches every destination before hooks run. Hook failures
    /// are returned, but never prevent the write.
    #[track_caller]
    pub fn log(&self, severity: Severity, message: impl fmt::Display) -> Result<()> {
        let location = Location::caller();
        let caller = self.core.capture_caller.then(|| Caller::from(location));
        self.emit(severity, message.to_string(), &[], caller, None)
    }

    #[track_caller]
    pub fn debug(&self, message: impl fmt::Display) -> Result<()> {
        self.log(Severity::Debug, message)
    }

    #[track_caller]
    pub fn info(&self, message: impl fmt::Display) -> Result<()> {
        self.log(Severity::Info, message)
    }

    #[track_caller]
    pub fn warn(&self, message: impl fmt::Display) -> Result<()> {
        self.log(Severity::Warn, message)
    }

    #[track_caller]
    pub fn error(&self, message: impl fmt::Display) -> Result<()> {
        self.log(Severity::Error, message)
    }

    /// Log at panic severity, flush, then panic with `message`.
    #[track_caller]
    pub fn panic(&self, message: impl fmt::Display) -> ! {
        let message = message.to_string();
        if let Err(err) = self.log(Severity::Panic, &message) {
            eprintln!("zlog: {}", err);
        }
        self.sync();
        panic!("{}", message)
    }

    /// Log at fatal severity, flush every destination, then exit with status 1.
    #[track_caller]
    pub fn fatal(&self, message: impl fmt::Display) -> ! {
        if let Err(err) = self.log(Severity::Fatal, message) {
            eprintln!("zlog: {}", err);
        }
        self.core.router.shutdown();
        std::process::exit(1)
    }

    /// Best-effort flush of every destination.
    ///
    /// Blocks until records queued for buffered files are on disk; the files
    /// keep accepting records afterwards.
    pub fn sync(&self) {
        self.core.router.flush();
    }

    pub(crate) fn emit(
        &self,
        severity: Severity,
        message: String,
        extra: &[Field],
        caller: Option<Caller>,
        target: Option<&str>,
    ) -> Result<()> {
        if self.is_noop() {
            return Ok(());
        }
        let fields: Cow<'_, [Field]> = if extra.is_empty() {
            Cow::Borrowed(self.fields.as_slice())
        } else {
            let mut all = self.fields.as_ref().clone();
            all.extend_from_slice(extra);
            Cow::Owned(all)
        };
        let stacktrace = (self.core.capture_caller && severity >= Severity::Error)
            .then(|| Backtrace::force_capture().to_string());

        let record = Record {
            time: chrono::Local::now(),
            severity,
            message,
            fields: &fields,
            logger: self.name.as_deref().or(target),
            caller,
            stacktrace,
        };
        self.core.router.dispatch(&record);
        hooks::run(&self.core.hooks, &Entry::from(&record))
    }

    pub(crate) fn captures_caller(&self) -> bool {
        self.core.capture_caller
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use parking_lot::Mutex;
    use serde_json::json;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().clone()).unwrap()
        }
    }

    fn console_logger(mode: Mode) -> (Logger, Capture) {
        let capture = Capture::default();
        let config = Config {
            mode,
            console_color: false,
            ..Default::default()
        };
        let logger = Logger::builder(config)
            .console_writer(capture.clone())
            .build()
            .unwrap();
        (logger, capture)
    }

    #[test]
    fn test_with_fields_overrides_and_keeps_parent() {
        let (logger, _) = console_logger(Mode::Simple);
        let child = logger.with_fields([("a", json!(1)), ("b", json!("x"))]);
        let grandchild = child.with_fields([("a", 2)]);

        assert!(logger.fields().is_empty());
        assert_eq!(child.fields().len(), 2);
        assert_eq!(grandchild.fields()[0], ("a".to_string(), json!(2)));
        assert_eq!(grandchild.fields()[1], ("b".to_string(), json!("x")));
    }

    #[test]
    fn test_named_children_join_with_dot() {
        let (logger, capture) = console_logger(Mode::Simple);
        let child = logger.named("http").named("auth");
        assert_eq!(child.name(), Some("http.auth"));
        child.info("login").unwrap();
        assert!(capture.text().contains("\thttp.auth\tlogin"));
    }

    #[test]
    fn test_simple_mode_omits_caller() {
        let (logger, capture) = console_logger(Mode::Simple);
        logger.info("plain").unwrap();
        let line = capture.text();
        assert_eq!(line.trim_end().split('\t').count(), 3);
        assert!(!logger.captures_caller());
    }

    #[test]
    fn test_detailed_mode_records_call_site() {
        let (logger, capture) = console_logger(Mode::Detailed);
        let expected = format!("{}:{}", file!(), line!() + 1);
        logger.warn("here").unwrap();
        let line = capture.text();
        assert!(line.contains(&format!("\t{}\t", expected)), "{}", line);
    }

    #[test]
    fn test_detailed_mode_attaches_stacktrace_to_errors() {
        let (logger, capture) = console_logger(Mode::Detailed);
        logger.info("fine").unwrap();
        assert_eq!(capture.text().lines().count(), 1);
        logger.error("broken").unwrap();
        assert!(capture.text().lines().count() > 2);
    }

    #[test]
    fn test_hook_failure_is_returned_after_write() {
        let capture = Capture::default();
        let config = Config {
            mode: Mode::Simple,
            console_color: false,
            ..Default::default()
        }
        .with_hook(|entry| {
            if entry.severity >= Severity::Error {
                Err(format!("rejected {}", entry.message).into())
            } else {
                Ok(())
            }
        });
        let logger = Logger::builder(config)
            .console_writer(capture.clone())
            .build()
            .unwrap();

        assert!(logger.info("ok").is_ok());
        match logger.error("bad") {
            Err(Error::Hooks(failures)) => assert_eq!(failures[0].error.to_string(), "rejected bad"),
            other => panic!("expected hook failure, got {:?}", other),
        }
        assert!(capture.text().contains("\tbad"));
    }

    #[test]
    fn test_noop_logger_discards() {
        let logger = Logger::noop();
        assert!(logger.is_noop());
        assert!(logger.error("nothing").is_ok());
        assert!(logger.log_dir().is_none());
        assert_eq!(logger.context_key(), "zlog");
    }

    #[test]
    #[should_panic(expected = "unrecoverable")]
    fn test_panic_severity_unwinds() {
        let (logger, _) = console_logger(Mode::Simple);
        logger.panic("unrecoverable");
    }
}
