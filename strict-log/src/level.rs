//! Severity levels.
//!
//! A [`Level`] is a plain `i32`, ordered from most verbose to most critical.
//! The named levels are spaced four apart so custom levels can sit between and beyond them:
//!
//! - [`Level::DEBUG`] (`-4`) - Detailed debugging information
//! - [`Level::INFO`] (`0`) - General informational messages
//! - [`Level::WARN`] (`4`) - Warning messages for potential issues
//! - [`Level::ERROR`] (`8`) - Error messages for serious problems
//!
//! # Examples
//!
//! ```rust
//! use strict_log::Level;
//!
//! let notice = Level::new(2);
//! assert!(Level::INFO < notice && notice < Level::WARN);
//! assert_eq!(notice.to_string(), "INFO+2");
//! assert_eq!("info+2".parse::<Level>(), Ok(notice));
//! ```

use core::fmt;
use core::str::FromStr;
use core::sync::atomic::{AtomicI32, Ordering};

use serde_with::{DeserializeFromStr, SerializeDisplay};

/// The importance of a log record.
///
/// Serializes through its text form, see [`Display`][fmt::Display] and [`FromStr`].
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    SerializeDisplay,
    DeserializeFromStr,
)]
pub struct Level(i32);

impl Level {
    /// The "debug" level.
    ///
    /// Designates lower priority information.
    pub const DEBUG: Self = Level(-4);

    /// The "info" level.
    ///
    /// Designates useful information.
    pub const INFO: Self = Level(0);

    /// The "warn" level.
    ///
    /// Designates hazardous situations.
    pub const WARN: Self = Level(4);

    /// The "error" level.
    ///
    /// Designates very serious errors.
    pub const ERROR: Self = Level(8);

    /// Creates a custom level.
    pub const fn new(value: i32) -> Self {
        Level(value)
    }

    /// Returns the numeric value of this level.
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Returns the named level this level is displayed relative to.
    fn base(self) -> (&'static str, Level) {
        if self < Level::INFO {
            ("DEBUG", Level::DEBUG)
        } else if self < Level::WARN {
            ("INFO", Level::INFO)
        } else if self < Level::ERROR {
            ("WARN", Level::WARN)
        } else {
            ("ERROR", Level::ERROR)
        }
    }
}

impl From<i32> for Level {
    fn from(value: i32) -> Self {
        Level(value)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, base) = self.base();
        // Cannot overflow: `base` is always on the same side of zero as `self`.
        match self.0 - base.0 {
            0 => f.write_str(name),
            offset => write!(f, "{name}{offset:+}"),
        }
    }
}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let (name, offset) = match text.find(['+', '-']) {
            Some(index) => {
                let offset = text[index..]
                    .parse::<i32>()
                    .map_err(|_| ParseLevelError::Offset(text.into()))?;
                (&text[..index], offset)
            }
            None => (text, 0),
        };

        let base = match name.to_ascii_uppercase().as_str() {
            "DEBUG" => Level::DEBUG,
            "INFO" => Level::INFO,
            "WARN" => Level::WARN,
            "ERROR" => Level::ERROR,
            _ => return Err(ParseLevelError::Name(text.into())),
        };

        base.0
            .checked_add(offset)
            .map(Level)
            .ok_or_else(|| ParseLevelError::Offset(text.into()))
    }
}

/// The error returned when parsing a [`Level`] from text fails.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseLevelError {
    /// The text does not start with a known level name.
    #[error("unknown level name in {0:?}")]
    Name(String),

    /// The offset after the level name is not a valid `i32`, or overflows.
    #[error("invalid level offset in {0:?}")]
    Offset(String),
}

/// A [`Level`] that can be changed while handlers are reading it.
///
/// Share one through [`HandlerOptions::level_var`][crate::handler::HandlerOptions::level_var]
/// to adjust the minimum level of running handlers.
#[derive(Debug, Default)]
pub struct LevelVar(AtomicI32);

impl LevelVar {
    /// Creates a variable holding `level`.
    pub const fn new(level: Level) -> Self {
        LevelVar(AtomicI32::new(level.0))
    }

    /// Returns the current level.
    pub fn get(&self) -> Level {
        Level(self.0.load(Ordering::Relaxed))
    }

    /// Replaces the current level.
    pub fn set(&self, level: Level) {
        self.0.store(level.0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::{Level, LevelVar, ParseLevelError};
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(Level::DEBUG, "DEBUG")]
    #[test_case(Level::INFO, "INFO")]
    #[test_case(Level::WARN, "WARN")]
    #[test_case(Level::ERROR, "ERROR")]
    #[test_case(Level::new(-6), "DEBUG-2")]
    #[test_case(Level::new(-1), "DEBUG+3")]
    #[test_case(Level::new(2), "INFO+2")]
    #[test_case(Level::new(7), "WARN+3")]
    #[test_case(Level::new(12), "ERROR+4")]
    #[test_case(Level::new(i32::MIN), "DEBUG-2147483644")]
    #[test_case(Level::new(i32::MAX), "ERROR+2147483639")]
    fn display(level: Level, expected: &str) {
        assert_eq!(level.to_string(), expected);
    }

    #[test_case("DEBUG", Level::DEBUG)]
    #[test_case("info", Level::INFO)]
    #[test_case("Warn", Level::WARN)]
    #[test_case("error", Level::ERROR)]
    #[test_case("INFO+2", Level::new(2))]
    #[test_case("debug-2", Level::new(-6))]
    #[test_case("ERROR+4", Level::new(12))]
    #[test_case("WARN+0", Level::WARN)]
    fn parse(text: &str, expected: Level) {
        assert_eq!(text.parse::<Level>(), Ok(expected));
    }

    #[test_case("", ParseLevelError::Name("".into()))]
    #[test_case("verbose", ParseLevelError::Name("verbose".into()))]
    #[test_case("+2", ParseLevelError::Name("+2".into()))]
    #[test_case("INFO+", ParseLevelError::Offset("INFO+".into()))]
    #[test_case("INFO+two", ParseLevelError::Offset("INFO+two".into()))]
    #[test_case("ERROR+2147483647", ParseLevelError::Offset("ERROR+2147483647".into()))]
    fn parse_invalid(text: &str, expected: ParseLevelError) {
        assert_eq!(text.parse::<Level>(), Err(expected));
    }

    #[test]
    fn display_parses_back() {
        for value in -10..=14 {
            let level = Level::new(value);
            assert_eq!(level.to_string().parse::<Level>(), Ok(level));
        }
    }

    #[test]
    fn serde_uses_text_form() {
        assert_eq!(
            serde_json::to_string(&Level::new(5)).unwrap(),
            r#""WARN+1""#
        );
        assert_eq!(
            serde_json::from_str::<Level>(r#""debug""#).unwrap(),
            Level::DEBUG
        );
        assert!(serde_json::from_str::<Level>(r#""loud""#).is_err());
    }

    #[test]
    fn level_var_updates() {
        let var = LevelVar::new(Level::WARN);
        assert_eq!(var.get(), Level::WARN);
        var.set(Level::DEBUG);
        assert_eq!(var.get(), Level::DEBUG);
        assert_eq!(LevelVar::default().get(), Level::INFO);
    }
}
