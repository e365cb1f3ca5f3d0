//! The strict logging facade.
//!
//! [`Logger`] is the narrow surface application code logs through. Every call takes a
//! [`Context`] (or `None`, standing in for [`Context::background`]) and structured
//! [`Attr`]ibutes; there is no way to log an interpolated string or to skip the context.
//!
//! [`StrictLogger`] is the only implementation. It holds a shared [`Handler`] and forwards to it:
//!
//! 1. The handler is asked whether the level is enabled; if not, the call returns without
//!    building anything.
//! 2. A [`Record`] is built with the current time and the call site of the logging call.
//! 3. The handler handles the record. Failures are dropped; logging never fails the caller.

use std::borrow::Cow;
use std::error::Error;
use std::panic::Location;
use std::sync::Arc;
use std::time::SystemTime;

use crate::context::{BACKGROUND, Context};
use crate::handler::Handler;
use crate::level::Level;
use crate::record::Record;
use crate::value::Attr;

/// The restricted logging interface.
///
/// All methods take `&self` and are safe to call concurrently, provided the handler is.
///
/// # Examples
///
/// ```rust
/// use strict_log::handler::{HandlerOptions, TracingHandler};
/// use strict_log::{Attr, Context, Logger, StrictLogger};
///
/// fn serve(logger: &impl Logger, ctx: &Context) {
///     let logger = logger.with_group("request").with(&[Attr::new("path", "/health")]);
///     logger.info(Some(ctx), "served", &[Attr::new("status", 200)]);
/// }
///
/// let logger = StrictLogger::new(TracingHandler::new(HandlerOptions::default()));
/// serve(&logger, &Context::background());
/// ```
pub trait Logger: Clone + Send + Sync {
    /// Returns a logger that adds `attrs` to every record, after any attributes already bound.
    fn with(&self, attrs: &[Attr]) -> Self;

    /// Returns a logger that nests everything bound or logged later under `name`.
    fn with_group(&self, name: &str) -> Self;

    /// Logs at [`Level::DEBUG`].
    #[track_caller]
    fn debug(&self, ctx: Option<&Context>, message: &str, attrs: &[Attr]);

    /// Logs at [`Level::INFO`].
    #[track_caller]
    fn info(&self, ctx: Option<&Context>, message: &str, attrs: &[Attr]);

    /// Logs at [`Level::WARN`].
    #[track_caller]
    fn warn(&self, ctx: Option<&Context>, message: &str, attrs: &[Attr]);

    /// Logs at [`Level::ERROR`].
    ///
    /// When `err` is given, an `err` attribute holding its message goes in front of `attrs`.
    #[track_caller]
    fn error(
        &self,
        ctx: Option<&Context>,
        message: &str,
        err: Option<&dyn Error>,
        attrs: &[Attr],
    );

    /// Logs at an arbitrary, possibly custom, level.
    #[track_caller]
    fn log(&self, ctx: Option<&Context>, level: Level, message: &str, attrs: &[Attr]);

    /// Returns the handler behind this logger.
    ///
    /// This is an escape hatch for functionality the restricted interface does not offer; code
    /// using it bypasses the guarantees of [`Logger`].
    fn handler(&self) -> &Arc<dyn Handler>;
}

/// A [`Logger`] writing to a shared [`Handler`].
///
/// Cloning is cheap and scoping never changes the logger it is called on.
#[derive(Clone, Debug)]
pub struct StrictLogger {
    handler: Arc<dyn Handler>,
}

impl StrictLogger {
    /// Creates a logger writing to `handler`.
    pub fn new(handler: impl Handler + 'static) -> Self {
        Self::from_handler(Arc::new(handler))
    }

    /// Creates a logger writing to an already shared handler.
    pub fn from_handler(handler: Arc<dyn Handler>) -> Self {
        Self { handler }
    }

    #[track_caller]
    fn emit(
        &self,
        ctx: Option<&Context>,
        level: Level,
        message: &str,
        err: Option<&dyn Error>,
        attrs: &[Attr],
    ) {
        let ctx = ctx.unwrap_or(&BACKGROUND);
        if !self.handler.enabled(ctx, level) {
            return;
        }

        let attrs = match err {
            Some(err) => {
                let mut with_err = Vec::with_capacity(attrs.len() + 1);
                with_err.push(Attr::new("err", err.to_string()));
                with_err.extend_from_slice(attrs);
                Cow::Owned(with_err)
            }
            None => Cow::Borrowed(attrs),
        };

        let record = Record {
            time: SystemTime::now(),
            level,
            message,
            source: Some(Location::caller().into()),
            attrs,
        };

        if let Err(error) = self.handler.handle(ctx, &record) {
            tracing::debug!(%error, %level, "log record dropped by handler");
        }
    }
}

impl Logger for StrictLogger {
    fn with(&self, attrs: &[Attr]) -> Self {
        if attrs.is_empty() {
            return self.clone();
        }
        Self::from_handler(self.handler.with_attrs(attrs))
    }

    fn with_group(&self, name: &str) -> Self {
        if name.is_empty() {
            return self.clone();
        }
        Self::from_handler(self.handler.with_group(name))
    }

    #[track_caller]
    fn debug(&self, ctx: Option<&Context>, message: &str, attrs: &[Attr]) {
        self.emit(ctx, Level::DEBUG, message, None, attrs);
    }

    #[track_caller]
    fn info(&self, ctx: Option<&Context>, message: &str, attrs: &[Attr]) {
        self.emit(ctx, Level::INFO, message, None, attrs);
    }

    #[track_caller]
    fn warn(&self, ctx: Option<&Context>, message: &str, attrs: &[Attr]) {
        self.emit(ctx, Level::WARN, message, None, attrs);
    }

    #[track_caller]
    fn error(
        &self,
        ctx: Option<&Context>,
        message: &str,
        err: Option<&dyn Error>,
        attrs: &[Attr],
    ) {
        self.emit(ctx, Level::ERROR, message, err, attrs);
    }

    #[track_caller]
    fn log(&self, ctx: Option<&Context>, level: Level, message: &str, attrs: &[Attr]) {
        self.emit(ctx, level, message, None, attrs);
    }

    fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{Logger, StrictLogger};
    use crate::context::Context;
    use crate::handler::{CaptureHandler, HandleError, Handler};
    use crate::level::Level;
    use crate::record::Record;
    use crate::value::{Attr, Value};
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    #[test]
    fn logger_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StrictLogger>();
    }

    #[test]
    fn records_call_site_of_public_method() {
        let (handler, captures) = CaptureHandler::new();
        let logger = StrictLogger::new(handler);

        let info_line = line!() + 1;
        logger.info(None, "here", &[]);
        let error_line = line!() + 1;
        logger.error(None, "there", None, &[]);
        let log_line = line!() + 1;
        logger.with_group("g").log(None, Level::new(1), "everywhere", &[]);

        let lines: Vec<_> = captures
            .take()
            .into_iter()
            .map(|record| {
                let source = record.source.unwrap();
                assert_eq!(source.file, file!());
                source.line
            })
            .collect();
        assert_eq!(lines, [info_line, error_line, log_line]);
    }

    #[test]
    fn call_site_survives_generic_callers() {
        fn log_through(logger: &impl Logger) -> u32 {
            let line = line!() + 1;
            logger.warn(None, "generic", &[]);
            line
        }

        let (handler, captures) = CaptureHandler::new();
        let line = log_through(&StrictLogger::new(handler));
        assert_eq!(captures.take()[0].source.unwrap().line, line);
    }

    #[test]
    fn missing_context_becomes_background() {
        let (handler, captures) = CaptureHandler::new();
        let logger = StrictLogger::new(handler);

        logger.debug(None, "no context", &[]);
        let ctx = Context::background().with_value(Attr::new("request_id", "r-1"));
        logger.debug(Some(&ctx), "with context", &[]);

        let records = captures.take();
        assert!(records[0].context.is_background());
        assert_eq!(records[1].context.values(), ctx.values());
    }

    #[test]
    fn error_prepends_err_attribute() {
        let (handler, captures) = CaptureHandler::new();
        let logger = StrictLogger::new(handler);
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "config.toml missing");

        logger.error(None, "startup failed", Some(&err), &[Attr::new("attempt", 3)]);
        logger.error(None, "startup failed", None, &[Attr::new("attempt", 4)]);

        let records = captures.take();
        assert_eq!(
            records[0].attrs,
            [
                Attr::new("err", "config.toml missing"),
                Attr::new("attempt", 3)
            ]
        );
        assert_eq!(records[1].attrs, [Attr::new("attempt", 4)]);
        assert!(records[1].attr("err").is_none());
    }

    #[test]
    fn empty_scoping_keeps_handler() {
        let (handler, _captures) = CaptureHandler::new();
        let logger = StrictLogger::new(handler);
        assert!(Arc::ptr_eq(logger.with(&[]).handler(), logger.handler()));
        assert!(Arc::ptr_eq(logger.with_group("").handler(), logger.handler()));
        assert!(!Arc::ptr_eq(
            logger.with(&[Attr::new("a", 1)]).handler(),
            logger.handler()
        ));
    }

    #[test]
    fn escape_hatch_reaches_handler() {
        let (handler, _captures) = CaptureHandler::with_min_level(Level::WARN);
        let logger = StrictLogger::new(handler);
        assert!(!logger.handler().enabled(&Context::background(), Level::INFO));
    }

    #[test]
    fn lazy_attributes_are_skipped_when_disabled() {
        let (handler, captures) = CaptureHandler::with_min_level(Level::ERROR);
        let logger = StrictLogger::new(handler);
        logger.info(
            None,
            "skipped",
            &[Attr::lazy("expensive", || -> Value { panic!("must not be computed") })],
        );
        assert_eq!(captures.handle_calls(), 0);
    }

    #[test]
    #[traced_test]
    fn handler_failures_are_reported_as_diagnostics() {
        let (handler, captures) = CaptureHandler::new();
        let logger = StrictLogger::new(handler);
        captures.set_failing(true);

        logger.info(None, "lost", &[]);

        assert!(logs_contain("log record dropped by handler"));
        assert!(logs_contain("capture handler set to fail"));
    }

    /// Fails every record the way a closed output stream would.
    #[derive(Debug)]
    struct ClosedOutput;

    impl Handler for ClosedOutput {
        fn enabled(&self, _: &Context, _: Level) -> bool {
            true
        }

        fn handle(&self, _: &Context, _: &Record<'_>) -> Result<(), HandleError> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "output closed").into())
        }

        fn with_attrs(&self, _: &[Attr]) -> Arc<dyn Handler> {
            Arc::new(ClosedOutput)
        }

        fn with_group(&self, _: &str) -> Arc<dyn Handler> {
            Arc::new(ClosedOutput)
        }
    }

    #[test]
    #[traced_test]
    fn dropped_records_report_the_cause() {
        let logger = StrictLogger::new(ClosedOutput);

        logger.info(None, "lost", &[]);

        assert!(logs_contain("failed to write log record: output closed"));
        assert!(logs_contain("level=INFO"));
    }
}
