#![allow(dead_code)]

use parking_lot::Mutex;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use zlog::{Config, Logger};

/// Console writer capturing everything written to it.
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().clone()).unwrap()
    }

    /// Lines that start a record (stack trace lines excluded).
    pub fn records(&self) -> Vec<String> {
        self.text()
            .lines()
            .filter(|line| line.split('\t').count() >= 3)
            .map(str::to_string)
            .collect()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn build(config: Config) -> (Logger, Capture) {
    let capture = Capture::default();
    let logger = Logger::builder(Config {
        console_color: false,
        ..config
    })
    .console_writer(capture.clone())
    .build()
    .expect("logger builds");
    (logger, capture)
}

/// Contents of every file in `dir` belonging to `stem` (`<stem>.log` and its backups).
pub fn band_contents(dir: &Path, stem: &str) -> String {
    let prefix = format!("{}.", stem);
    let Ok(entries) = std::fs::read_dir(dir) else {
        return String::new();
    };
    let mut names: Vec<_> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map_or(false, |name| name.starts_with(&prefix))
        })
        .collect();
    names.sort();
    names
        .iter()
        .map(|path| String::from_utf8_lossy(&std::fs::read(path).unwrap()).into_owned())
        .collect()
}
