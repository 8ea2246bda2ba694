//! Level routing: which bands go to which destinations with which encoding.

use crate::config::{Config, Mode};
use crate::encoder::{Encoder, Encoding};
use crate::error::Result;
use crate::record::Record;
use crate::severity::Band;
use crate::sink::Sink;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Destination {
    Console,
    /// Rotating file `<dir>/<stem>.log`.
    File(&'static str),
}

/// One row of the routing table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Route {
    pub band: Band,
    pub destination: Destination,
    pub encoding: Encoding,
}

impl Route {
    fn file(band: Band, encoding: Encoding) -> Self {
        Self {
            band,
            destination: Destination::File(band.file_stem()),
            encoding,
        }
    }
}

/// Routing table for a configuration.
///
/// The console route is always first, always text and always receives every
/// band. File routes exist only when `write_log` is set.
pub fn route_table(mode: Mode, write_log: bool, write_json: bool) -> Vec<Route> {
    let mut routes = vec![Route {
        band: Band::All,
        destination: Destination::Console,
        encoding: Encoding::Text,
    }];
    if !write_log {
        return routes;
    }

    let encoding = if write_json {
        Encoding::Json
    } else {
        Encoding::Text
    };
    let bands: &[Band] = match mode {
        Mode::Simple => &[Band::Warn, Band::All],
        Mode::Detailed => &[Band::Warn, Band::Debug, Band::Custom, Band::Error],
    };
    routes.extend(bands.iter().map(|&band| Route::file(band, encoding)));
    routes
}

/// The composed set of sinks a logger fans records out to.
pub struct Router {
    sinks: Vec<Sink>,
    log_dir: Option<PathBuf>,
}

impl Router {
    /// A router with no destinations.
    pub fn empty() -> Self {
        Self {
            sinks: Vec::new(),
            log_dir: None,
        }
    }

    /// Open every destination the routing table names for `config`.
    pub fn build(config: &Config, console: Box<dyn Write + Send>) -> Result<Self> {
        let routes = route_table(config.mode, config.write_log, config.write_json);
        let write = &config.write_config;
        let policy = write.rotation_policy();
        let log_dir = config
            .write_log
            .then(|| write.log_dir(config.service_name(), chrono::Local::now().date_naive()));

        let mut console = Some(console);
        let mut sinks = Vec::with_capacity(routes.len());
        for route in routes {
            match route.destination {
                Destination::Console => {
                    if let Some(writer) = console.take() {
                        sinks.push(Sink::console(writer, config.console_color));
                    }
                }
                Destination::File(stem) => {
                    let Some(dir) = log_dir.as_deref() else {
                        continue;
                    };
                    let sink = Sink::file(
                        dir,
                        stem,
                        route.band,
                        Encoder::new(route.encoding),
                        policy,
                        write.sync_writes,
                    )?;
                    sinks.push(sink);
                }
            }
        }

        debug!(
            "Built router with {} sink(s) for service {}",
            sinks.len(),
            config.service_name()
        );
        Ok(Self {
            sinks,
            log_dir,
        })
    }

    pub fn sinks(&self) -> &[Sink] {
        &self.sinks
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Directory holding the band files, when file output is enabled.
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }

    /// Write `record` to every sink whose band accepts it.
    ///
    /// A failing sink is reported on stderr and does not stop the others.
    /// Returns the number of sinks that received the record.
    pub fn dispatch(&self, record: &Record<'_>) -> usize {
        let mut delivered = 0;
        for sink in &self.sinks {
            match sink.write(record) {
                Ok(true) => delivered += 1,
                Ok(false) => {}
                // stderr: reporting through tracing could re-enter this router
                Err(err) => eprintln!("zlog: failed to write to {}: {}", sink.name(), err),
            }
        }
        delivered
    }

    /// Best-effort flush of every sink, draining buffered files to disk.
    pub fn flush(&self) {
        for sink in &self.sinks {
            if let Err(err) = sink.flush() {
                eprintln!("zlog: failed to flush {}: {}", sink.name(), err);
            }
        }
    }

    /// Flush everything and stop the background writers.
    ///
    /// Buffered file sinks reject later records; only used before the process exits.
    pub fn shutdown(&self) {
        for sink in &self.sinks {
            if let Err(err) = sink.close() {
                eprintln!("zlog: failed to close {}: {}", sink.name(), err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::Severity;

    fn file_bands(routes: &[Route]) -> Vec<(Band, &'static str)> {
        routes
            .iter()
            .filter_map(|route| match route.destination {
                Destination::File(stem) => Some((route.band, stem)),
                Destination::Console => None,
            })
            .collect()
    }

    #[test]
    fn test_console_route_is_constant() {
        for mode in [Mode::Simple, Mode::Detailed] {
            for write_log in [false, true] {
                for write_json in [false, true] {
                    let routes = route_table(mode, write_log, write_json);
                    assert_eq!(
                        routes[0],
                        Route {
                            band: Band::All,
                            destination: Destination::Console,
                            encoding: Encoding::Text,
                        }
                    );
                    let consoles = routes
                        .iter()
                        .filter(|r| r.destination == Destination::Console)
                        .count();
                    assert_eq!(consoles, 1);
                }
            }
        }
    }

    #[test]
    fn test_no_files_without_write_log() {
        assert_eq!(route_table(Mode::Detailed, false, true).len(), 1);
        assert_eq!(route_table(Mode::Simple, false, false).len(), 1);
    }

    #[test]
    fn test_simple_mode_files() {
        let routes = route_table(Mode::Simple, true, true);
        assert_eq!(
            file_bands(&routes),
            vec![(Band::Warn, "warn"), (Band::All, "default")]
        );
        assert!(routes[1..].iter().all(|r| r.encoding == Encoding::Json));
    }

    #[test]
    fn test_detailed_mode_files() {
        let routes = route_table(Mode::Detailed, true, false);
        assert_eq!(
            file_bands(&routes),
            vec![
                (Band::Warn, "warn"),
                (Band::Debug, "debug"),
                (Band::Custom, "custom"),
                (Band::Error, "err"),
            ]
        );
        assert!(routes.iter().all(|r| r.encoding == Encoding::Text));
    }

    #[test]
    fn test_detailed_files_receive_exactly_one_band_each() {
        let routes = route_table(Mode::Detailed, true, true);
        for severity in Severity::ALL {
            let files = routes
                .iter()
                .filter(|r| matches!(r.destination, Destination::File(_)))
                .filter(|r| r.band.accepts(severity))
                .count();
            assert_eq!(files, 1, "{} reached {} files", severity, files);
        }
    }

    #[test]
    fn test_empty_router_dispatches_nowhere() {
        let router = Router::empty();
        assert!(router.is_empty());
        assert!(router.log_dir().is_none());
        assert_eq!(router.dispatch(&Record::new(Severity::Error, "lost")), 0);
        router.shutdown();
    }
}
