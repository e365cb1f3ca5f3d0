use core::fmt;
use std::sync::Arc;

use super::{HandleError, Handler, HandlerOptions, Scope, normalize};
use crate::context::Context;
use crate::level::Level;
use crate::record::Record;
use crate::value::{Attr, Value};

/// A handler that forwards records to the `tracing` ecosystem.
///
/// Each record becomes a `tracing` event whose message is the record message. The record
/// level is kept in a `severity` field, the attributes are rendered into one `attrs` field and the
/// call site goes into `file` and `line`. A record is enabled when it passes both the
/// [`HandlerOptions`] minimum level and the installed subscriber.
///
/// | record level          | `tracing` level |
/// |-----------------------|-----------------|
/// | below `DEBUG`         | `TRACE`         |
/// | `DEBUG` up to `INFO`  | `DEBUG`         |
/// | `INFO` up to `WARN`   | `INFO`          |
/// | `WARN` up to `ERROR`  | `WARN`          |
/// | `ERROR` and above     | `ERROR`         |
///
/// # Examples
///
/// ```rust
/// use strict_log::handler::{HandlerOptions, TracingHandler};
/// use strict_log::{Attr, Level, Logger, StrictLogger};
///
/// let options = HandlerOptions {
///     level: Level::DEBUG,
///     ..HandlerOptions::default()
/// };
/// let logger = StrictLogger::new(TracingHandler::new(options));
/// logger.info(None, "listening", &[Attr::new("port", 8080)]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct TracingHandler {
    options: Arc<HandlerOptions>,
    scope: Scope,
}

impl TracingHandler {
    /// Creates a handler without any bound attributes.
    pub fn new(options: HandlerOptions) -> Self {
        Self {
            options: Arc::new(options),
            scope: Scope::default(),
        }
    }

    fn derive(&self, scope: Scope) -> Self {
        Self {
            options: self.options.clone(),
            scope,
        }
    }
}

/// Renders attributes as `key: value` pairs, flattening groups into dotted keys.
struct Rendered<'a>(&'a [Attr]);

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_attrs(f, "", self.0, &mut true)
    }
}

fn write_attrs(
    f: &mut fmt::Formatter<'_>,
    prefix: &str,
    attrs: &[Attr],
    first: &mut bool,
) -> fmt::Result {
    for attr in attrs {
        match &attr.value {
            Value::Group(group) => {
                write_attrs(f, &format!("{prefix}{}.", attr.key), group, first)?;
            }
            value => {
                if !*first {
                    f.write_str(", ")?;
                }
                *first = false;
                write!(f, "{prefix}{}: {value}", attr.key)?;
            }
        }
    }
    Ok(())
}

/// The `tracing` level a record is emitted at.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Bridged {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<Level> for Bridged {
    fn from(level: Level) -> Self {
        if level < Level::DEBUG {
            Bridged::Trace
        } else if level < Level::INFO {
            Bridged::Debug
        } else if level < Level::WARN {
            Bridged::Info
        } else if level < Level::ERROR {
            Bridged::Warn
        } else {
            Bridged::Error
        }
    }
}

// `tracing` needs the level as a constant at every callsite.
macro_rules! bridge_event {
    ($bridged:expr, $($fields:tt)*) => {
        match $bridged {
            Bridged::Trace => tracing::event!(tracing::Level::TRACE, $($fields)*),
            Bridged::Debug => tracing::event!(tracing::Level::DEBUG, $($fields)*),
            Bridged::Info => tracing::event!(tracing::Level::INFO, $($fields)*),
            Bridged::Warn => tracing::event!(tracing::Level::WARN, $($fields)*),
            Bridged::Error => tracing::event!(tracing::Level::ERROR, $($fields)*),
        }
    };
}

impl Handler for TracingHandler {
    fn enabled(&self, _: &Context, level: Level) -> bool {
        if !self.options.enabled(level) {
            return false;
        }
        match Bridged::from(level) {
            Bridged::Trace => tracing::enabled!(tracing::Level::TRACE),
            Bridged::Debug => tracing::enabled!(tracing::Level::DEBUG),
            Bridged::Info => tracing::enabled!(tracing::Level::INFO),
            Bridged::Warn => tracing::enabled!(tracing::Level::WARN),
            Bridged::Error => tracing::enabled!(tracing::Level::ERROR),
        }
    }

    fn handle(&self, _: &Context, record: &Record<'_>) -> Result<(), HandleError> {
        let attrs = normalize(self.scope.apply(&record.attrs));

        let file = record.source.map(|source| source.file);
        let line = record.source.map(|source| source.line);

        bridge_event!(
            Bridged::from(record.level),
            severity = %record.level,
            attrs = %Rendered(&attrs),
            file,
            line,
            "{}",
            record.message
        );
        Ok(())
    }

    fn with_attrs(&self, attrs: &[Attr]) -> Arc<dyn Handler> {
        Arc::new(self.derive(self.scope.with_attrs(attrs)))
    }

    fn with_group(&self, name: &str) -> Arc<dyn Handler> {
        Arc::new(self.derive(self.scope.with_group(name)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::SystemTime;

    use super::{Bridged, Rendered, TracingHandler};
    use crate::context::BACKGROUND;
    use crate::handler::{Handler, HandlerOptions};
    use crate::level::{Level, LevelVar};
    use crate::record::Record;
    use crate::value::Attr;
    use pretty_assertions::assert_eq;
    use test_case::test_case;
    use tracing_test::traced_test;

    #[test_case(Level::new(-5), Bridged::Trace)]
    #[test_case(Level::DEBUG, Bridged::Debug)]
    #[test_case(Level::new(-1), Bridged::Debug)]
    #[test_case(Level::INFO, Bridged::Info)]
    #[test_case(Level::new(3), Bridged::Info)]
    #[test_case(Level::WARN, Bridged::Warn)]
    #[test_case(Level::ERROR, Bridged::Error)]
    #[test_case(Level::new(100), Bridged::Error)]
    fn level_mapping(level: Level, expected: Bridged) {
        assert_eq!(Bridged::from(level), expected);
    }

    #[test]
    #[traced_test]
    fn forwards_records_as_events() {
        let options = HandlerOptions {
            level: Level::new(-8),
            ..HandlerOptions::default()
        };
        let handler = TracingHandler::new(options)
            .with_attrs(&[Attr::new("service", "api")])
            .with_group("request");
        assert!(handler.enabled(&BACKGROUND, Level::new(-8)));

        let attrs = [Attr::new("status", 503)];
        let record = Record::new(SystemTime::now(), Level::new(6), "upstream slow", &attrs[..]);
        handler.handle(&BACKGROUND, &record).unwrap();

        assert!(logs_contain("upstream slow"));
        assert!(logs_contain("severity=WARN+2"));
        assert!(logs_contain("request.status: 503"));
    }

    #[test]
    fn renders_groups_as_dotted_keys() {
        let attrs = [
            Attr::new("method", "GET"),
            Attr::group(
                "request",
                [Attr::new("id", 7), Attr::group("peer", [Attr::new("port", 443)])],
            ),
            Attr::new("cached", false),
        ];
        assert_eq!(
            Rendered(&attrs).to_string(),
            r#"method: "GET", request.id: 7, request.peer.port: 443, cached: false"#
        );
        assert_eq!(Rendered(&[]).to_string(), "");
    }

    #[test]
    #[traced_test]
    fn options_gate_before_the_subscriber() {
        let level_var = Arc::new(LevelVar::new(Level::ERROR));
        let handler = TracingHandler::new(HandlerOptions {
            level: Level::DEBUG,
            level_var: Some(level_var.clone()),
        });

        assert!(!handler.enabled(&BACKGROUND, Level::WARN));
        level_var.set(Level::WARN);
        assert!(handler.enabled(&BACKGROUND, Level::WARN));
        assert!(!handler.with_group("g").enabled(&BACKGROUND, Level::INFO));
    }
}
