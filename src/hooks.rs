//! Record-inspection hooks.
//!
//! A hook observes every record after it has been handed to the sinks. It
//! can report a failure, which is returned to the caller of the log call,
//! but it cannot alter the record or stop other hooks from running.

use crate::error::{Error, HookError, HookFailure, Result};
use crate::record::{Caller, Record};
use crate::severity::Severity;
use chrono::{DateTime, Local};
use std::sync::Arc;

pub type Hook = Arc<dyn Fn(&Entry<'_>) -> std::result::Result<(), HookError> + Send + Sync>;

/// Wrap a closure as a [`Hook`].
pub fn hook<F>(f: F) -> Hook
where
    F: Fn(&Entry<'_>) -> std::result::Result<(), HookError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Read-only view of a record handed to hooks.
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
    pub severity: Severity,
    pub message: &'a str,
    pub time: DateTime<Local>,
    pub caller: Option<&'a Caller>,
    pub logger: Option<&'a str>,
}

impl<'a> From<&'a Record<'a>> for Entry<'a> {
    fn from(record: &'a Record<'a>) -> Self {
        Self {
            severity: record.severity,
            message: &record.message,
            time: record.time,
            caller: record.caller.as_ref(),
            logger: record.logger,
        }
    }
}

/// Run every hook in order, collecting failures instead of stopping at the first.
pub(crate) fn run(hooks: &[Hook], entry: &Entry<'_>) -> Result<()> {
    let failures: Vec<HookFailure> = hooks
        .iter()
        .enumerate()
        .filter_map(|(index, hook)| hook(entry).err().map(|error| HookFailure { index, error }))
        .collect();

    if failures.is_empty() {
        Ok(())
    } else {
        Err(Error::Hooks(failures))
    }
}

/// Sample hook that echoes warn-and-above messages to stderr.
pub fn warn_echo() -> impl Fn(&Entry<'_>) -> std::result::Result<(), HookError> + Send + Sync {
    |entry: &Entry<'_>| -> std::result::Result<(), HookError> {
        if entry.severity >= Severity::Warn {
            eprintln!("hook [{}] {}", entry.severity, entry.message);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn entry(severity: Severity) -> Entry<'static> {
        Entry {
            severity,
            message: "payload",
            time: Local::now(),
            caller: None,
            logger: None,
        }
    }

    #[test]
    fn test_hooks_run_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let hooks: Vec<Hook> = (0..3)
            .map(|i| {
                let seen = Arc::clone(&seen);
                hook(move |_| {
                    seen.lock().push(i);
                    Ok(())
                })
            })
            .collect();

        run(&hooks, &entry(Severity::Info)).unwrap();
        assert_eq!(*seen.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn test_failing_hook_does_not_stop_later_hooks() {
        let calls = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&calls);
        let hooks: Vec<Hook> = vec![
            hook(|_| Err("boom".into())),
            hook(move |entry| {
                assert_eq!(entry.message, "payload");
                *counter.lock() += 1;
                Ok(())
            }),
        ];

        match run(&hooks, &entry(Severity::Error)) {
            Err(Error::Hooks(failures)) => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].index, 0);
                assert_eq!(failures[0].error.to_string(), "boom");
            }
            other => panic!("expected hook failure, got {:?}", other),
        }
        assert_eq!(*calls.lock(), 1);
    }

    #[test]
    fn test_warn_echo_never_fails() {
        let hook = warn_echo();
        for severity in Severity::ALL {
            assert!(hook(&entry(severity)).is_ok());
        }
    }
}
