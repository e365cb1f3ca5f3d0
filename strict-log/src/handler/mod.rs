//! The backend capability behind the logger, and the bundled backends.
//!
//! The logger does no filtering, formatting or output of its own. It asks a [`Handler`] whether
//! a level is enabled, builds a [`Record`] and hands it over. Scoping through
//! [`Logger::with`][crate::Logger::with] and [`Logger::with_group`][crate::Logger::with_group]
//! is delegated to the handler as well.
//!
//! # Handler Trait
//!
//! Custom backends implement [`Handler`]. The bundled backends share the [`Scope`] helper for
//! the scoping half of the trait.
//!
//! # Built-in Handlers
//!
//! Formatting and output are not done here. [`TracingHandler`] hands records to whatever
//! `tracing` subscriber the application installed.
//!
//! - [`TracingHandler`] - Forwards records to `tracing` events
//! - [`CaptureHandler`] - Collects records in memory for testing purposes
//! - [`DiscardHandler`] - Drops everything

mod capture;
mod scope;
mod tracing_bridge;

use core::fmt::Debug;
use std::sync::Arc;

use serde::Deserialize;

pub use capture::{CaptureHandler, CapturedRecord, Captures};
pub use scope::Scope;
pub(crate) use scope::normalize;
pub use tracing_bridge::TracingHandler;

use crate::context::Context;
use crate::level::{Level, LevelVar};
use crate::record::Record;
use crate::value::Attr;

/// The structured-logging backend a logger writes to.
///
/// Implementations must be safe to call from many threads at once; the logger adds no locking
/// of its own.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
///
/// use strict_log::handler::{HandleError, Handler};
/// use strict_log::{Attr, Context, Level, Record};
///
/// #[derive(Debug)]
/// struct Stderr;
///
/// impl Handler for Stderr {
///     fn enabled(&self, _ctx: &Context, level: Level) -> bool {
///         level >= Level::WARN
///     }
///
///     fn handle(&self, _ctx: &Context, record: &Record<'_>) -> Result<(), HandleError> {
///         eprintln!("{} {}", record.level, record.message);
///         Ok(())
///     }
///
///     fn with_attrs(&self, _attrs: &[Attr]) -> Arc<dyn Handler> {
///         Arc::new(Stderr)
///     }
///
///     fn with_group(&self, _name: &str) -> Arc<dyn Handler> {
///         Arc::new(Stderr)
///     }
/// }
/// ```
pub trait Handler: Debug + Send + Sync {
    /// Returns whether records at `level` would be handled.
    ///
    /// Called before a record is built, so a `false` here makes the logging call free.
    fn enabled(&self, ctx: &Context, level: Level) -> bool;

    /// Handles one record.
    ///
    /// Only called when [`enabled`][Self::enabled] returned `true` for the record's level.
    fn handle(&self, ctx: &Context, record: &Record<'_>) -> Result<(), HandleError>;

    /// Returns a handler that includes `attrs` with every record, after any already bound.
    fn with_attrs(&self, attrs: &[Attr]) -> Arc<dyn Handler>;

    /// Returns a handler that nests later bound and record attributes under `name`.
    fn with_group(&self, name: &str) -> Arc<dyn Handler>;
}

/// The ways handling a record can fail.
#[derive(Debug, thiserror::Error)]
pub enum HandleError {
    /// Writing the output failed.
    #[error("failed to write log record: {0}")]
    Io(#[from] std::io::Error),

    /// A lock guarding the output was poisoned by a panicking writer.
    #[error("log output lock poisoned")]
    Poisoned,

    /// The handler refused the record.
    #[error("log record rejected: {0}")]
    Rejected(String),
}

/// Configuration of a [`TracingHandler`].
///
/// Can be loaded from any serde format; levels use their text form:
///
/// ```rust
/// use strict_log::Level;
/// use strict_log::handler::HandlerOptions;
///
/// let options: HandlerOptions = serde_json::from_str(r#"{ "level": "debug" }"#).unwrap();
/// assert_eq!(options.min_level(), Level::DEBUG);
/// ```
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HandlerOptions {
    /// The minimum level that is handled.
    pub level: Level,

    /// Overrides [`level`][Self::level] with a level that can change at runtime.
    #[serde(skip)]
    pub level_var: Option<Arc<LevelVar>>,
}

impl HandlerOptions {
    /// Returns the minimum level that is currently handled.
    pub fn min_level(&self) -> Level {
        self.level_var
            .as_ref()
            .map_or(self.level, |level_var| level_var.get())
    }

    /// Returns whether records at `level` pass the minimum level.
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.min_level()
    }
}

/// A handler that is enabled for nothing.
///
/// Backs the global logger until one is installed.
#[derive(Debug, Default)]
pub struct DiscardHandler(());

impl DiscardHandler {
    /// A `const` version of `DiscardHandler::default()` to allow use as a `&'static`.
    pub const DEFAULT: Self = DiscardHandler(());
}

impl Handler for DiscardHandler {
    fn enabled(&self, _: &Context, _: Level) -> bool {
        false
    }

    fn handle(&self, _: &Context, _: &Record<'_>) -> Result<(), HandleError> {
        Ok(())
    }

    fn with_attrs(&self, _: &[Attr]) -> Arc<dyn Handler> {
        Arc::new(DiscardHandler::DEFAULT)
    }

    fn with_group(&self, _: &str) -> Arc<dyn Handler> {
        Arc::new(DiscardHandler::DEFAULT)
    }
}
