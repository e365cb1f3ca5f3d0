//! Key-value attribute types.
//!
//! Attributes are key-value pairs that provide additional context for log records.
//! They are immutable once constructed and sequences of them keep the order they were given in,
//! duplicate keys included.
//!
//! # Value Types
//!
//! The [`Value`] enum supports:
//! - **String**: Text values
//! - **Bool**: Boolean values (true/false)
//! - **I64** / **U64**: 64-bit integers
//! - **F64**: 64-bit floating-point numbers
//! - **Time** / **Duration**: Points in time and spans of time
//! - **Group**: A nested list of attributes
//! - **Lazy**: A value computed by a [`LogValuer`] when a handler needs it
//!
//! # Examples
//!
//! ```rust
//! use strict_log::{Attr, Value};
//!
//! let user_id = Attr::new("user_id", 123);
//! let username = Attr::new("username", "alice");
//! let request = Attr::group("request", [Attr::new("method", "GET"), Attr::new("status", 200)]);
//!
//! assert_eq!(user_id.value, Value::I64(123));
//! assert_eq!(request.to_string(), r#"request: {method: "GET", status: 200}"#);
//! ```

use std::borrow::Cow;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// How many times [`Value::resolve`] calls into [`LogValuer`]s before giving up.
const MAX_LAZY_RESOLUTIONS: usize = 100;

/// A key-value attribute attached to a log record.
#[derive(Clone, Debug, PartialEq)]
pub struct Attr {
    /// The attribute key (name).
    pub key: Cow<'static, str>,

    /// The attribute value.
    pub value: Value,
}

impl Attr {
    /// Creates a new key-value attribute pair.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strict_log::Attr;
    ///
    /// let user_id = Attr::new("user_id", 123);
    /// let username = Attr::new("username", String::from("alice"));
    /// ```
    pub fn new<K, V>(key: K, value: V) -> Self
    where
        K: Into<Cow<'static, str>>,
        V: Into<Value>,
    {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Creates an attribute that nests `attrs` under `key`.
    ///
    /// A group with an empty key is inlined into its parent by the bundled handlers.
    pub fn group<K, I>(key: K, attrs: I) -> Self
    where
        K: Into<Cow<'static, str>>,
        I: IntoIterator<Item = Attr>,
    {
        Self::new(key, Value::Group(attrs.into_iter().collect()))
    }

    /// Creates an attribute whose value is computed by `valuer` when a handler outputs it.
    pub fn lazy<K, L>(key: K, valuer: L) -> Self
    where
        K: Into<Cow<'static, str>>,
        L: LogValuer + 'static,
    {
        Self::new(key, Value::Lazy(Arc::new(valuer)))
    }

    /// Returns whether this attribute carries nothing and is skipped on output.
    pub(crate) fn is_empty(&self) -> bool {
        self.key.is_empty() && matches!(&self.value, Value::String(value) if value.is_empty())
    }
}

impl core::fmt::Display for Attr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.key, self.value)
    }
}

/// Produces a [`Value`] on demand.
///
/// Use this for values that are expensive to compute and should only be computed when a record is
/// actually output. Implemented for closures returning a [`Value`].
pub trait LogValuer: Send + Sync {
    /// Computes the value. It may itself be [`Value::Lazy`].
    fn log_value(&self) -> Value;

    /// Names the implementing type in diagnostics.
    fn type_name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

impl<F> LogValuer for F
where
    F: Fn() -> Value + Send + Sync,
{
    fn log_value(&self) -> Value {
        self()
    }
}

/// A value that can be stored in an attribute.
#[derive(Clone)]
pub enum Value {
    /// A string value
    String(Cow<'static, str>),

    /// A boolean value
    Bool(bool),

    /// A 64-bit signed integer
    I64(i64),

    /// A 64-bit unsigned integer
    U64(u64),

    /// A 64-bit floating-point number
    F64(f64),

    /// A point in time
    Time(SystemTime),

    /// A span of time
    Duration(Duration),

    /// Nested attributes
    Group(Vec<Attr>),

    /// A value computed when it is needed
    Lazy(Arc<dyn LogValuer>),
}

impl Value {
    /// Replaces a [`Value::Lazy`] with the value it produces.
    ///
    /// Resolution repeats while the produced value is itself lazy. A valuer chain that does not
    /// settle is cut off and replaced by a string describing the problem. Values nested in groups
    /// are left alone.
    pub fn resolve(self) -> Value {
        let mut value = self;
        for _ in 0..MAX_LAZY_RESOLUTIONS {
            match value {
                Value::Lazy(valuer) => value = valuer.log_value(),
                resolved => return resolved,
            }
        }
        match value {
            Value::Lazy(valuer) => Value::String(
                format!(
                    "log_value called too many times on value of type {}",
                    valuer.type_name()
                )
                .into(),
            ),
            resolved => resolved,
        }
    }
}

impl core::fmt::Debug for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Value::String(value) => f.debug_tuple("String").field(value).finish(),
            Value::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
            Value::I64(value) => f.debug_tuple("I64").field(value).finish(),
            Value::U64(value) => f.debug_tuple("U64").field(value).finish(),
            Value::F64(value) => f.debug_tuple("F64").field(value).finish(),
            Value::Time(value) => f.debug_tuple("Time").field(value).finish(),
            Value::Duration(value) => f.debug_tuple("Duration").field(value).finish(),
            Value::Group(value) => f.debug_tuple("Group").field(value).finish(),
            Value::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::Group(a), Value::Group(b)) => a == b,
            (Value::Lazy(a), Value::Lazy(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            // Strings get delimiters so it stays clear where they end.
            Value::String(value) => write!(f, "{value:?}"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::I64(value) => write!(f, "{value}"),
            Value::U64(value) => write!(f, "{value}"),
            Value::F64(value) => write!(f, "{value}"),
            Value::Time(value) => write!(f, "{}", unix_nanos(*value)),
            Value::Duration(value) => write!(f, "{value:?}"),
            Value::Group(attrs) => {
                f.write_str("{")?;
                for (index, attr) in attrs.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{attr}")?;
                }
                f.write_str("}")
            }
            Value::Lazy(valuer) => write!(f, "{}", valuer.log_value().resolve()),
        }
    }
}

/// Serializes as the plain value; groups become maps and lazy values are resolved first.
impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::String(value) => serializer.serialize_str(value),
            Value::Bool(value) => serializer.serialize_bool(*value),
            Value::I64(value) => serializer.serialize_i64(*value),
            Value::U64(value) => serializer.serialize_u64(*value),
            Value::F64(value) => serializer.serialize_f64(*value),
            Value::Time(value) => serializer.serialize_u128(unix_nanos(*value)),
            Value::Duration(value) => serializer.serialize_u128(value.as_nanos()),
            Value::Group(attrs) => AttrMap(attrs).serialize(serializer),
            Value::Lazy(valuer) => valuer.log_value().resolve().serialize(serializer),
        }
    }
}

/// Serializes a list of attributes as a map, keeping order and duplicate keys.
#[derive(Debug)]
pub(crate) struct AttrMap<'a>(pub(crate) &'a [Attr]);

impl Serialize for AttrMap<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for attr in self.0 {
            map.serialize_entry(attr.key.as_ref(), &attr.value)?;
        }
        map.end()
    }
}

/// Returns nanoseconds since the Unix epoch, or zero for times before it.
pub(crate) fn unix_nanos(time: SystemTime) -> u128 {
    time.duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_nanos())
        .unwrap_or_default()
}

impl From<Cow<'static, str>> for Value {
    fn from(value: Cow<'static, str>) -> Self {
        Value::String(value)
    }
}

impl From<&'static str> for Value {
    fn from(value: &'static str) -> Self {
        Value::String(Cow::Borrowed(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(Cow::Owned(value))
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::String(Cow::Owned(value.clone()))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! impl_from_lossless {
    ($($ty:ty => $variant:ident($target:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(<$target>::from(value))
                }
            }
        )*
    };
}

impl_from_lossless! {
    i8 => I64(i64),
    i16 => I64(i64),
    i32 => I64(i64),
    i64 => I64(i64),
    u8 => I64(i64),
    u16 => I64(i64),
    u32 => I64(i64),
    u64 => U64(u64),
    f32 => F64(f64),
    f64 => F64(f64),
}

impl From<isize> for Value {
    fn from(value: isize) -> Self {
        // `isize` is at most 64 bits wide on every supported target.
        Value::I64(value as i64)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::U64(value as u64)
    }
}

impl From<SystemTime> for Value {
    fn from(value: SystemTime) -> Self {
        Value::Time(value)
    }
}

impl From<Duration> for Value {
    fn from(value: Duration) -> Self {
        Value::Duration(value)
    }
}

impl From<Vec<Attr>> for Value {
    fn from(value: Vec<Attr>) -> Self {
        Value::Group(value)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, UNIX_EPOCH};

    use super::{Attr, LogValuer, Value};
    use pretty_assertions::assert_eq;

    #[test]
    fn conversions_pick_variant() {
        assert_eq!(Value::from(7u8), Value::I64(7));
        assert_eq!(Value::from(-7i32), Value::I64(-7));
        assert_eq!(Value::from(7u64), Value::U64(7));
        assert_eq!(Value::from(7usize), Value::U64(7));
        assert_eq!(Value::from(0.5f32), Value::F64(0.5));
        assert_eq!(Value::from("text"), Value::String("text".into()));
        assert_eq!(Value::from(String::from("text")), Value::String("text".into()));
        assert_eq!(
            Value::from(Duration::from_millis(3)),
            Value::Duration(Duration::from_millis(3))
        );
    }

    #[test]
    fn display() {
        let attr = Attr::group(
            "request",
            [
                Attr::new("path", "/"),
                Attr::new("ok", true),
                Attr::new("ratio", 0.25),
                Attr::new("took", Duration::from_millis(5)),
                Attr::new("at", UNIX_EPOCH + Duration::from_nanos(42)),
            ],
        );
        assert_eq!(
            attr.to_string(),
            r#"request: {path: "/", ok: true, ratio: 0.25, took: 5ms, at: 42}"#
        );
    }

    #[test]
    fn lazy_values_are_computed_on_demand() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let attr = Attr::lazy("expensive", move || {
            counter.fetch_add(1, Ordering::Relaxed);
            Value::from(99)
        });
        assert_eq!(calls.load(Ordering::Relaxed), 0);

        assert_eq!(attr.value.clone().resolve(), Value::I64(99));
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn nested_lazy_values_resolve() {
        let value = Value::Lazy(Arc::new(|| Value::Lazy(Arc::new(|| Value::from("inner")))));
        assert_eq!(value.resolve(), Value::from("inner"));
    }

    #[test]
    fn endless_lazy_values_are_cut_off() {
        struct Endless;

        impl LogValuer for Endless {
            fn log_value(&self) -> Value {
                Value::Lazy(Arc::new(Endless))
            }
        }

        let Value::String(message) = Value::Lazy(Arc::new(Endless)).resolve() else {
            panic!("expected a string");
        };
        assert!(message.starts_with("log_value called too many times on value of type "));
        assert!(message.ends_with("::Endless"), "{message}");
    }

    #[test]
    fn serializes_groups_as_maps() {
        let value = Value::Group(vec![
            Attr::new("a", 1),
            Attr::group("b", [Attr::new("c", "d")]),
            Attr::new("a", 2),
            Attr::lazy("e", || Value::from(false)),
        ]);
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            r#"{"a":1,"b":{"c":"d"},"a":2,"e":false}"#
        );
    }
}
