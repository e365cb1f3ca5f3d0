//! # `strict-log`
//!
//! A strict facade over a structured-logging backend.
//!
//! The [`Logger`] interface is deliberately narrow: every call carries a [`Context`] and
//! structured [`Attr`]ibutes, and there is no way to log a formatted string. Filtering and output
//! are left to the [`Handler`][handler::Handler] behind the logger.
//!
//! ## Features
//!
//! - **Strict calls**: `debug`, `info`, `warn`, `error` and `log` all take a context and attributes
//! - **Scoping**: `with` and `with_group` derive loggers with bound attributes or nested groups
//! - **Call sites**: Every record carries the location of the logging call
//! - **Handlers**: a `tracing` bridge and an in-memory backend, or your own
//!
//! ## Basic Usage
//!
//! First, pick a handler and create a logger:
//!
//! ```rust
//! use strict_log::handler::{HandlerOptions, TracingHandler};
//! use strict_log::{Level, StrictLogger};
//!
//! let options = HandlerOptions {
//!     level: Level::DEBUG,
//!     ..HandlerOptions::default()
//! };
//! let logger = StrictLogger::new(TracingHandler::new(options));
//! ```
//!
//! Then log through the [`Logger`] trait:
//!
//! ```rust
//! use strict_log::handler::CaptureHandler;
//! use strict_log::{Attr, Context, Level, Logger, StrictLogger, attrs};
//!
//! # let (handler, _captures) = CaptureHandler::new();
//! # let logger = StrictLogger::new(handler);
//! let ctx = Context::background();
//!
//! // Structured logging
//! logger.info(Some(&ctx), "server started", attrs!(port = 8080, "version" = "1.0.0"));
//!
//! // Errors get an `err` attribute
//! let err = std::io::Error::other("connection reset");
//! logger.error(Some(&ctx), "request failed", Some(&err), &[]);
//!
//! // Custom levels
//! logger.log(None, Level::new(2), "notice", &[]);
//!
//! // Scoped loggers
//! let request_logger = logger.with_group("request").with(&[Attr::new("id", 7)]);
//! request_logger.debug(Some(&ctx), "parsed", &[]);
//! ```

pub mod context;
pub mod global;
pub mod handler;
pub mod level;
mod logger;
mod macros;
pub mod record;
pub mod value;

pub use context::Context;
pub use level::{Level, LevelVar, ParseLevelError};
pub use logger::{Logger, StrictLogger};
pub use record::{Record, Source};
pub use value::{Attr, LogValuer, Value};
