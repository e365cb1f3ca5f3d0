//! The request-scoped context threaded through every logging call.
//!
//! A [`Context`] carries a cancellation signal, a deadline and request-scoped attribute values
//! from the caller to the [`Handler`][crate::handler::Handler].
//! The logger never creates one on behalf of the caller except for substituting
//! [`Context::background`] when no context was given.

use std::time::Instant;

use tokio_util::sync::CancellationToken;

use crate::value::Attr;

/// The empty context, used whenever a logging call passes `None`.
pub static BACKGROUND: Context = Context::background();

/// Caller-supplied carrier for cancellation and request-scoped values.
///
/// Contexts are cheap to build up from [`Context::background`]:
///
/// ```rust
/// use std::time::{Duration, Instant};
///
/// use strict_log::{Attr, Context};
/// use tokio_util::sync::CancellationToken;
///
/// let token = CancellationToken::new();
/// let ctx = Context::background()
///     .with_cancellation(token.child_token())
///     .with_deadline(Instant::now() + Duration::from_secs(5))
///     .with_value(Attr::new("request_id", "b7e1"));
///
/// assert!(!ctx.is_cancelled());
/// token.cancel();
/// assert!(ctx.is_cancelled());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Context {
    cancellation: Option<CancellationToken>,
    deadline: Option<Instant>,
    values: Vec<Attr>,
}

impl Context {
    /// Returns the empty context: never cancelled, no deadline, no values.
    pub const fn background() -> Self {
        Self {
            cancellation: None,
            deadline: None,
            values: Vec::new(),
        }
    }

    /// Returns a copy of this context that is cancelled together with `token`.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Returns a copy of this context with the given deadline.
    ///
    /// An earlier deadline already present is kept.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// Returns a copy of this context carrying one more request-scoped value.
    pub fn with_value(mut self, value: Attr) -> Self {
        self.values.push(value);
        self
    }

    /// Returns whether this is indistinguishable from [`Context::background`].
    pub fn is_background(&self) -> bool {
        self.cancellation.is_none() && self.deadline.is_none() && self.values.is_empty()
    }

    /// Returns whether the cancellation token has fired or the deadline has passed.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
            || self.deadline.is_some_and(|deadline| deadline <= Instant::now())
    }

    /// Returns the cancellation token, if any.
    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }

    /// Returns the deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the request-scoped values in the order they were added.
    pub fn values(&self) -> &[Attr] {
        &self.values
    }
}
