//! Output destinations: the console stream and rotating band files.

use crate::config::RotationPolicy;
use crate::encoder::Encoder;
use crate::error::{Error, Result};
use crate::record::Record;
use crate::severity::Band;
use logroller::{Compression, LogRollerBuilder, Rotation, RotationSize};
use parking_lot::{Mutex, RwLock};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::debug;
use tracing_appender::non_blocking::{NonBlocking, NonBlockingBuilder, WorkerGuard};

const SECS_PER_DAY: u64 = 24 * 60 * 60;
const BYTES_PER_MB: u64 = 1024 * 1024;

enum Writer {
    /// Written on the calling thread under a lock.
    Locked(Mutex<Box<dyn Write + Send>>),
    /// Handed to a background worker.
    Buffered(BufferedFile),
}

/// Where a band file lives and how it rotates; enough to reopen it.
struct BandFile {
    dir: String,
    filename: String,
    policy: RotationPolicy,
}

impl BandFile {
    fn open(&self) -> std::result::Result<impl Write + Send + 'static, String> {
        let mut builder = LogRollerBuilder::new(&self.dir, &self.filename)
            .rotation(Rotation::SizeBased(RotationSize::Bytes(
                self.policy.max_size_mb.saturating_mul(BYTES_PER_MB),
            )))
            .max_keep_files(self.policy.max_backups);
        if self.policy.compress {
            builder = builder.compression(Compression::Gzip);
        }
        builder.build().map_err(|e| e.to_string())
    }

    fn spawn(&self) -> std::result::Result<(NonBlocking, WorkerGuard), String> {
        let roller = self.open()?;
        Ok(NonBlockingBuilder::default().lossy(false).finish(roller))
    }
}

/// A band file written by a background worker.
struct BufferedFile {
    file: BandFile,
    /// `None` once the file has been closed for good.
    worker: RwLock<Option<(NonBlocking, WorkerGuard)>>,
}

impl BufferedFile {
    /// Write out everything queued so far.
    ///
    /// Dropping the guard blocks until the worker has drained its queue; a
    /// fresh worker is started on the same file unless `reopen` is false.
    /// Must not emit tracing events: the tracing bridge may route them back here.
    fn drain(&self, reopen: bool) -> io::Result<()> {
        let mut worker = self.worker.write();
        drop(worker.take());
        if reopen {
            let spawned = self
                .file
                .spawn()
                .map_err(|reason| io::Error::new(io::ErrorKind::Other, reason))?;
            *worker = Some(spawned);
        }
        Ok(())
    }
}

/// A destination paired with its band filter and encoder.
pub struct Sink {
    name: String,
    band: Band,
    encoder: Encoder,
    writer: Writer,
}

impl Sink {
    /// Console destination. Receives every record as plain text.
    pub fn console(writer: Box<dyn Write + Send>, color: bool) -> Self {
        Self {
            name: "console".to_string(),
            band: Band::All,
            encoder: Encoder::console(color),
            writer: Writer::Locked(Mutex::new(writer)),
        }
    }

    /// Rotating file `<dir>/<stem>.log`.
    ///
    /// With `sync_writes` unset, records are queued to a background worker
    /// that [`Sink::flush`] drains.
    pub fn file(
        dir: &Path,
        stem: &str,
        band: Band,
        encoder: Encoder,
        policy: RotationPolicy,
        sync_writes: bool,
    ) -> Result<Self> {
        std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

        let filename = format!("{}.log", stem);
        let path = dir.join(&filename);
        let max_age = Duration::from_secs(policy.max_age_days.saturating_mul(SECS_PER_DAY));
        if let Some(cutoff) = SystemTime::now().checked_sub(max_age) {
            let pruned = prune_expired(dir, &filename, cutoff).map_err(|e| Error::io(dir, e))?;
            if pruned > 0 {
                debug!("Pruned {} expired backup(s) of {}", pruned, path.display());
            }
        }

        let dir_str = dir.to_str().ok_or_else(|| Error::Rotation {
            path: path.clone(),
            reason: "log directory is not valid UTF-8".to_string(),
        })?;
        let file = BandFile {
            dir: dir_str.to_string(),
            filename,
            policy,
        };
        let rotation_error = |reason: String| Error::Rotation {
            path: path.clone(),
            reason,
        };

        let writer = if sync_writes {
            let roller = file.open().map_err(rotation_error)?;
            Writer::Locked(Mutex::new(Box::new(roller)))
        } else {
            let worker = file.spawn().map_err(rotation_error)?;
            Writer::Buffered(BufferedFile {
                file,
                worker: RwLock::new(Some(worker)),
            })
        };

        debug!(
            "Opened {} sink at {} (max {} MB, {} backups, {} days)",
            band,
            path.display(),
            policy.max_size_mb,
            policy.max_backups,
            policy.max_age_days
        );
        Ok(Self {
            name: path.display().to_string(),
            band,
            encoder,
            writer,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Encode and write `record` if this sink's band accepts it.
    ///
    /// Returns `Ok(false)` when the record was filtered out.
    pub fn write(&self, record: &Record<'_>) -> io::Result<bool> {
        if !self.band.accepts(record.severity) {
            return Ok(false);
        }
        let mut line = self.encoder.encode(record);
        line.push('\n');
        match &self.writer {
            Writer::Locked(writer) => writer.lock().write_all(line.as_bytes())?,
            Writer::Buffered(file) => match file.worker.read().as_ref() {
                Some((writer, _)) => writer.clone().write_all(line.as_bytes())?,
                None => {
                    return Err(io::Error::new(
                        io::ErrorKind::BrokenPipe,
                        "band file already closed",
                    ))
                }
            },
        }
        Ok(true)
    }

    /// Flush the destination. Buffered files are drained to disk and keep
    /// accepting records afterwards.
    pub fn flush(&self) -> io::Result<()> {
        match &self.writer {
            Writer::Locked(writer) => writer.lock().flush(),
            Writer::Buffered(file) => file.drain(true),
        }
    }

    /// Flush, then stop any background worker. Later records are rejected.
    pub fn close(&self) -> io::Result<()> {
        match &self.writer {
            Writer::Locked(writer) => writer.lock().flush(),
            Writer::Buffered(file) => file.drain(false),
        }
    }
}

/// Remove rotated copies of `filename` in `dir` last modified before `cutoff`.
///
/// The active file itself is never removed.
pub(crate) fn prune_expired(dir: &Path, filename: &str, cutoff: SystemTime) -> io::Result<usize> {
    let mut removed = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name == filename || !name.starts_with(filename) {
            continue;
        }
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        if metadata.modified()? < cutoff {
            let path: PathBuf = entry.path();
            std::fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}
