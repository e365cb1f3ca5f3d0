//! Log records handed from the logger to a handler.

use std::borrow::Cow;
use std::panic::Location;
use std::time::SystemTime;

use serde::Serialize;

use crate::level::Level;
use crate::value::Attr;

/// A single log event.
///
/// Records are built fresh for every enabled logging call, lent to the handler and dropped when
/// the call returns. Handlers that keep records around must copy what they need.
#[derive(Clone, Debug)]
pub struct Record<'a> {
    /// When the logging call was made.
    pub time: SystemTime,

    /// The severity level of this record.
    pub level: Level,

    /// The message body.
    pub message: &'a str,

    /// Where the logging call was made, if known.
    pub source: Option<Source>,

    /// The attributes passed with the logging call, in call order.
    ///
    /// Attributes bound through [`Handler::with_attrs`][crate::handler::Handler::with_attrs] are
    /// held by the handler and are not part of this list.
    pub attrs: Cow<'a, [Attr]>,
}

impl<'a> Record<'a> {
    /// Creates a record without call-site information.
    pub fn new(
        time: SystemTime,
        level: Level,
        message: &'a str,
        attrs: impl Into<Cow<'a, [Attr]>>,
    ) -> Self {
        Self {
            time,
            level,
            message,
            source: None,
            attrs: attrs.into(),
        }
    }

    /// Attaches call-site information to this record.
    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }
}

/// The location of the logging call in the application's source code.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub struct Source {
    /// The source file path, as reported by the compiler.
    pub file: &'static str,

    /// The 1-based line number.
    pub line: u32,

    /// The 1-based column number.
    pub column: u32,
}

impl From<&'static Location<'static>> for Source {
    fn from(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
            column: location.column(),
        }
    }
}

impl core::fmt::Display for Source {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}
