//! The process-wide default logger.
//!
//! Libraries that cannot have a logger passed in can log through [`get_logger`]. Until the
//! application installs one with [`set_global`], everything logged there is discarded.
//!
//! ```rust
//! use strict_log::handler::{HandlerOptions, TracingHandler};
//! use strict_log::{Logger, StrictLogger, global};
//!
//! let logger = StrictLogger::new(TracingHandler::new(HandlerOptions::default()));
//! global::set_global(logger).unwrap();
//!
//! global::get_logger().info(None, "installed", &[]);
//! ```

use core::{error, fmt};
use std::sync::{LazyLock, OnceLock};

use crate::handler::DiscardHandler;
use crate::logger::StrictLogger;

static GLOBAL_LOGGER: OnceLock<StrictLogger> = OnceLock::new();

static NO_LOGGER: LazyLock<StrictLogger> =
    LazyLock::new(|| StrictLogger::new(DiscardHandler::DEFAULT));

/// Installs `logger` as the global logger.
///
/// This can only be called once per process.
pub fn set_global(logger: StrictLogger) -> Result<(), SetGlobalError> {
    GLOBAL_LOGGER.set(logger).map_err(|_| SetGlobalError(()))
}

/// Returns the global logger.
///
/// If no logger has been installed, a logger discarding everything is returned.
pub fn get_logger() -> &'static StrictLogger {
    GLOBAL_LOGGER.get().unwrap_or(&NO_LOGGER)
}

/// The type returned by [`set_global`] if the global logger has already been set.
#[derive(Debug)]
pub struct SetGlobalError(());

impl SetGlobalError {
    const MESSAGE: &'static str = "a global logger has already been set";
}

impl fmt::Display for SetGlobalError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(Self::MESSAGE)
    }
}

impl error::Error for SetGlobalError {}
