use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use super::{HandleError, Handler, Scope, normalize};
use crate::context::Context;
use crate::level::Level;
use crate::record::{Record, Source};
use crate::value::{Attr, Value};

/// An owned copy of a handled record, as seen by a [`CaptureHandler`].
#[derive(Clone, Debug)]
pub struct CapturedRecord {
    /// When the logging call was made.
    pub time: SystemTime,

    /// The severity level of the record.
    pub level: Level,

    /// The message body.
    pub message: String,

    /// Where the logging call was made, if known.
    pub source: Option<Source>,

    /// Bound and record attributes combined, with groups applied and lazy values resolved.
    pub attrs: Vec<Attr>,

    /// The context the record was handled with.
    pub context: Context,
}

impl CapturedRecord {
    /// Returns the value of the first top-level attribute named `key`.
    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attrs
            .iter()
            .find(|attr| attr.key == key)
            .map(|attr| &attr.value)
    }
}

#[derive(Debug, Default)]
struct CaptureState {
    records: Mutex<Vec<CapturedRecord>>,
    enabled_calls: AtomicUsize,
    handle_calls: AtomicUsize,
    failing: AtomicBool,
}

/// Shared access to what a [`CaptureHandler`] and the handlers derived from it have seen.
#[derive(Clone, Debug)]
pub struct Captures(Arc<CaptureState>);

impl Captures {
    /// Returns a copy of the stored records.
    pub fn records(&self) -> Vec<CapturedRecord> {
        self.0
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Removes and returns the stored records.
    pub fn take(&self) -> Vec<CapturedRecord> {
        core::mem::take(
            &mut *self
                .0
                .records
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    /// Returns how often [`Handler::enabled`] was asked.
    pub fn enabled_calls(&self) -> usize {
        self.0.enabled_calls.load(Ordering::Relaxed)
    }

    /// Returns how often [`Handler::handle`] was called, failed calls included.
    pub fn handle_calls(&self) -> usize {
        self.0.handle_calls.load(Ordering::Relaxed)
    }

    /// Makes every following [`Handler::handle`] call fail (or succeed again).
    ///
    /// Failed calls store nothing.
    pub fn set_failing(&self, failing: bool) {
        self.0.failing.store(failing, Ordering::Relaxed);
    }
}

/// A handler for testing that stores all records in memory.
///
/// This handler is useful for unit tests and integration tests where you need to verify that
/// specific records were logged.
///
/// # Examples
///
/// ```rust
/// use strict_log::handler::CaptureHandler;
/// use strict_log::{Attr, Level, Logger, StrictLogger};
///
/// let (handler, captures) = CaptureHandler::with_min_level(Level::WARN);
/// let logger = StrictLogger::new(handler);
///
/// logger.info(None, "ignored", &[]);
/// logger.warn(None, "disk almost full", &[Attr::new("free_mb", 12)]);
///
/// let records = captures.take();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].level, Level::WARN);
/// ```
#[derive(Debug)]
pub struct CaptureHandler {
    state: Arc<CaptureState>,
    min_level: Level,
    scope: Scope,
}

impl CaptureHandler {
    /// Creates a handler enabled for every level, and a handle to what it captures.
    pub fn new() -> (Self, Captures) {
        Self::with_min_level(Level::new(i32::MIN))
    }

    /// Creates a handler enabled for `min_level` and above, and a handle to what it captures.
    pub fn with_min_level(min_level: Level) -> (Self, Captures) {
        let state = Arc::new(CaptureState::default());
        (
            Self {
                state: state.clone(),
                min_level,
                scope: Scope::default(),
            },
            Captures(state),
        )
    }

    fn derive(&self, scope: Scope) -> Self {
        Self {
            state: self.state.clone(),
            min_level: self.min_level,
            scope,
        }
    }
}

impl Handler for CaptureHandler {
    fn enabled(&self, _: &Context, level: Level) -> bool {
        self.state.enabled_calls.fetch_add(1, Ordering::Relaxed);
        level >= self.min_level
    }

    fn handle(&self, ctx: &Context, record: &Record<'_>) -> Result<(), HandleError> {
        self.state.handle_calls.fetch_add(1, Ordering::Relaxed);
        if self.state.failing.load(Ordering::Relaxed) {
            return Err(HandleError::Rejected("capture handler set to fail".into()));
        }

        let captured = CapturedRecord {
            time: record.time,
            level: record.level,
            message: record.message.to_owned(),
            source: record.source,
            attrs: normalize(self.scope.apply(&record.attrs)),
            context: ctx.clone(),
        };
        self.state
            .records
            .lock()
            .map_err(|_| HandleError::Poisoned)?
            .push(captured);
        Ok(())
    }

    fn with_attrs(&self, attrs: &[Attr]) -> Arc<dyn Handler> {
        Arc::new(self.derive(self.scope.with_attrs(attrs)))
    }

    fn with_group(&self, name: &str) -> Arc<dyn Handler> {
        Arc::new(self.derive(self.scope.with_group(name)))
    }
}
