//! Macros for building attributes.
//!
//! - `attrs!`: Creates a slice of attributes
//! - `attr!`: Creates a single attribute
//!
//! Keys can be identifiers (also dotted paths, which are stringified as written) or string
//! literals. A bare identifier uses the variable of the same name as its value.

/// Constructs a slice of [`Attr`][crate::Attr]s.
///
/// # Examples
///
/// ```rust
/// use strict_log::{Attr, attrs};
///
/// let user_id = 42;
/// let attrs = attrs!(user_id, "service" = "api", retry = true);
/// assert_eq!(
///     attrs,
///     &[
///         Attr::new("user_id", 42),
///         Attr::new("service", "api"),
///         Attr::new("retry", true),
///     ]
/// );
///
/// let none: &[Attr] = attrs!();
/// assert!(none.is_empty());
/// ```
#[macro_export]
macro_rules! attrs {
    ($($kvs:tt)*) => {
        $crate::attrs_inner!(@ { }, { $($kvs)* })
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! attrs_inner {
    // Base case, remaining tokens is empty.
    (@ { $($val:expr,)* }, { } ) => {
        &[ $($val,)* ]
    };

    // Recursive cases, take one key-value pair, add it to the output, and recurse on the remaining
    // tokens.
    (@ { $($out:expr,)* }, { $key:ident = $value:expr $(, $($rest:tt)*)? }) => {
        $crate::attrs_inner!(
            @ { $($out,)* $crate::attr!($key = $value), },
            { $($($rest)*)? }
        )
    };
    (@ { $($out:expr,)* }, { $key:literal = $value:expr $(, $($rest:tt)*)? }) => {
        $crate::attrs_inner!(
            @ { $($out,)* $crate::attr!($key = $value), },
            { $($($rest)*)? }
        )
    };
    (@ { $($out:expr,)* }, { $($key:ident).+ $(, $($rest:tt)*)? }) => {
        $crate::attrs_inner!(
            @ { $($out,)* $crate::attr!($($key).+), },
            { $($($rest)*)? }
        )
    };
}

/// Constructs a single [`Attr`][crate::Attr].
///
/// # Examples
///
/// ```rust
/// use strict_log::{Attr, attr};
///
/// let port = 8080;
/// assert_eq!(attr!(port), Attr::new("port", 8080));
/// assert_eq!(attr!("listen.port" = port), Attr::new("listen.port", 8080));
/// ```
#[macro_export]
macro_rules! attr {
    ($key:ident = $value:expr) => {
        $crate::Attr::new(::core::stringify!($key), $value)
    };
    ($key:literal = $value:expr) => {
        $crate::Attr::new($key, $value)
    };
    ($($key:ident).+) => {
        $crate::Attr::new(::core::stringify!($($key).+), $($key).+)
    };
}
