//! Error types produced by registration and dispatch.
//!
//! This module defines:
//!
//! - [`Error`] - every failure the registry reports (registration or dispatch).
//! - [`HandlerError`] - a handler's own error, qualified with the handler's display name.
//! - [`AggregateError`] - all [`HandlerError`]s collected from one `notify` fan-out.
//! - [`HandlerPanicked`] - cause recorded when an isolated event handler panics.
//!
//! Handler causes stay intact: [`HandlerError::is`], [`HandlerError::wraps`] and their
//! aggregate/`Error` counterparts walk the cause's `source()` chain, so callers can ask
//! "did this fail because of `C`?" without caring how it was wrapped.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

use crate::key::{RequestKey, Slot};

/// Boxed error returned by handlers and interceptors.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Result alias using the crate [`enum@Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Which boundary of the interceptor chain failed type narrowing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// Payload entering the handler.
    Request,
    /// Payload leaving the chain.
    Response,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Request => f.write_str("request"),
            Side::Response => f.write_str("response"),
        }
    }
}

/// # Errors produced by the registry.
///
/// Registration errors leave the registry unchanged. Dispatch errors are returned to
/// the caller as-is, except that handler errors are qualified with the handler name.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    /// Nothing is registered for the addressed type combination.
    #[error("no {slot} registered")]
    HandlerNotFound {
        /// Slot that was looked up.
        slot: Slot,
    },

    /// The handler reference is empty; registration was aborted.
    #[error("invalid {slot}: handler is empty")]
    InvalidHandler {
        /// Slot the handler was meant for.
        slot: Slot,
    },

    /// A request handler for this pair already exists; registration was aborted.
    #[error("duplicate request handler for {key}")]
    DuplicateHandler {
        /// The occupied `(request, response)` pair.
        key: RequestKey,
    },

    /// A value inside the interceptor chain no longer has the expected type.
    #[error("unmarshal: {side} is {actual}, want {expected}")]
    Unmarshal {
        /// Boundary where narrowing failed.
        side: Side,
        /// Type the dispatcher expected.
        expected: &'static str,
        /// Type the chain actually carried.
        actual: &'static str,
    },

    /// A single handler (or interceptor) failed.
    #[error(transparent)]
    Handler(#[from] HandlerError),

    /// One or more event handlers failed during `notify`.
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

impl Error {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use typemob::{Error, Side};
    ///
    /// let err = Error::Unmarshal { side: Side::Request, expected: "u8", actual: "i64" };
    /// assert_eq!(err.as_label(), "unmarshal");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            Error::HandlerNotFound { .. } => "handler_not_found",
            Error::InvalidHandler { .. } => "invalid_handler",
            Error::DuplicateHandler { .. } => "duplicate_handler",
            Error::Unmarshal { .. } => "unmarshal",
            Error::Handler(_) => "handler_failed",
            Error::Aggregate(_) => "handler_failed_aggregate",
        }
    }

    /// Returns `true` if a handler failure inside this error has a cause of type `C`.
    ///
    /// Registry-level variants (not found, duplicate, ...) carry no handler cause and
    /// always return `false`.
    pub fn is<C: StdError + 'static>(&self) -> bool {
        self.find::<C>().is_some()
    }

    /// Returns `true` if a handler failure inside this error wraps a cause equal to `target`.
    pub fn wraps<C: StdError + PartialEq + 'static>(&self, target: &C) -> bool {
        match self {
            Error::Handler(e) => e.wraps(target),
            Error::Aggregate(e) => e.wraps(target),
            _ => false,
        }
    }

    /// Returns the first handler cause of type `C`, if any.
    pub fn find<C: StdError + 'static>(&self) -> Option<&C> {
        match self {
            Error::Handler(e) => e.find::<C>(),
            Error::Aggregate(e) => e.find::<C>(),
            _ => None,
        }
    }
}

/// # A handler's error, qualified with the handler's display name.
///
/// Displays as `"<name>: <cause>"`, or just `"<cause>"` for unnamed handlers.
#[derive(Debug)]
pub struct HandlerError {
    name: Option<Cow<'static, str>>,
    cause: BoxError,
}

impl HandlerError {
    /// Wraps `cause` for the handler called `name`.
    pub fn new(name: Option<Cow<'static, str>>, cause: impl Into<BoxError>) -> Self {
        Self {
            name,
            cause: cause.into(),
        }
    }

    /// Display name of the failing handler, if one was set at registration.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The handler's own error.
    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.cause
    }

    /// Consumes the wrapper and returns the handler's own error.
    pub fn into_cause(self) -> BoxError {
        self.cause
    }

    /// Returns `true` if the cause, or anything in its `source()` chain, is a `C`.
    pub fn is<C: StdError + 'static>(&self) -> bool {
        self.find::<C>().is_some()
    }

    /// Returns `true` if the cause chain contains a `C` equal to `target`.
    pub fn wraps<C: StdError + PartialEq + 'static>(&self, target: &C) -> bool {
        chain(self.cause()).any(|err| err.downcast_ref::<C>() == Some(target))
    }

    /// Returns the first `C` found in the cause chain.
    pub fn find<C: StdError + 'static>(&self) -> Option<&C> {
        chain(self.cause()).find_map(|err| err.downcast_ref::<C>())
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name}: {}", self.cause),
            None => write!(f, "{}", self.cause),
        }
    }
}

impl StdError for HandlerError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.cause())
    }
}

/// Walks an error and its `source()` chain.
fn chain<'a>(
    head: &'a (dyn StdError + 'static),
) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    std::iter::successors(Some(head), |&err| err.source())
}

/// # Failures collected from one `notify` call.
///
/// Holds exactly one [`HandlerError`] per failed handler. Order follows arrival and
/// carries no meaning.
#[derive(Debug, Default)]
pub struct AggregateError {
    errors: Vec<HandlerError>,
}

impl AggregateError {
    /// Builds an aggregate from collected handler errors.
    pub fn new(errors: Vec<HandlerError>) -> Self {
        Self { errors }
    }

    /// Number of failed handlers.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns `true` if no handler failed.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterates over the member errors.
    pub fn iter(&self) -> std::slice::Iter<'_, HandlerError> {
        self.errors.iter()
    }

    /// Member errors as a slice.
    pub fn errors(&self) -> &[HandlerError] {
        &self.errors
    }

    /// Consumes the aggregate and returns its members.
    pub fn into_errors(self) -> Vec<HandlerError> {
        self.errors
    }

    /// Returns `true` if any member's cause chain contains a `C`.
    pub fn is<C: StdError + 'static>(&self) -> bool {
        self.errors.iter().any(HandlerError::is::<C>)
    }

    /// Returns `true` if any member's cause chain contains a `C` equal to `target`.
    pub fn wraps<C: StdError + PartialEq + 'static>(&self, target: &C) -> bool {
        self.errors.iter().any(|err| err.wraps(target))
    }

    /// Returns the first `C` found across the members.
    pub fn find<C: StdError + 'static>(&self) -> Option<&C> {
        self.errors.iter().find_map(HandlerError::find::<C>)
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for err in &self.errors {
            if !first {
                f.write_str(";")?;
            }
            first = false;
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl StdError for AggregateError {}

impl IntoIterator for AggregateError {
    type Item = HandlerError;
    type IntoIter = std::vec::IntoIter<HandlerError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a AggregateError {
    type Item = &'a HandlerError;
    type IntoIter = std::slice::Iter<'a, HandlerError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// Cause recorded when an event handler panics and panics are isolated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("handler panicked: {message}")]
pub struct HandlerPanicked {
    /// Panic payload rendered as text (`"unknown panic"` for non-string payloads).
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::TypeKey;

    #[derive(Error, Debug, PartialEq)]
    #[error("boom {0}")]
    struct Boom(u8);

    #[derive(Error, Debug)]
    #[error("outer")]
    struct Outer(#[source] Boom);

    #[test]
    fn test_named_display() {
        let err = HandlerError::new(Some("audit".into()), Boom(1));
        assert_eq!(err.to_string(), "audit: boom 1");
        assert_eq!(err.name(), Some("audit"));
    }

    #[test]
    fn test_unnamed_display_is_cause_only() {
        let err = HandlerError::new(None, Boom(2));
        assert_eq!(err.to_string(), "boom 2");
    }

    #[test]
    fn test_is_and_wraps_delegate_to_cause() {
        let err = HandlerError::new(None, Boom(3));
        assert!(err.is::<Boom>());
        assert!(err.wraps(&Boom(3)));
        assert!(!err.wraps(&Boom(4)));
        assert!(!err.is::<HandlerPanicked>());
    }

    #[test]
    fn test_cause_chain_is_walked() {
        let err = HandlerError::new(Some("x".into()), Outer(Boom(5)));
        assert!(err.is::<Outer>());
        assert!(err.wraps(&Boom(5)));
        assert_eq!(err.find::<Boom>(), Some(&Boom(5)));
    }

    #[test]
    fn test_aggregate_display_has_no_trailing_separator() {
        let agg = AggregateError::new(vec![
            HandlerError::new(Some("a".into()), Boom(1)),
            HandlerError::new(Some("b".into()), Boom(2)),
        ]);
        assert_eq!(agg.to_string(), "a: boom 1;b: boom 2");

        let single = AggregateError::new(vec![HandlerError::new(None, Boom(9))]);
        assert_eq!(single.to_string(), "boom 9");
    }

    #[test]
    fn test_aggregate_membership() {
        let agg = AggregateError::new(vec![
            HandlerError::new(None, HandlerPanicked { message: "oops".into() }),
            HandlerError::new(None, Boom(7)),
        ]);
        assert_eq!(agg.len(), 2);
        assert!(agg.wraps(&Boom(7)));
        assert!(agg.is::<HandlerPanicked>());
        assert!(!agg.wraps(&Boom(8)));
    }

    #[test]
    fn test_error_forwards_membership() {
        let err = Error::from(HandlerError::new(Some("h".into()), Boom(1)));
        assert!(err.wraps(&Boom(1)));
        assert_eq!(err.to_string(), "h: boom 1");
        assert_eq!(err.as_label(), "handler_failed");

        let not_found = Error::HandlerNotFound {
            slot: Slot::Event(TypeKey::of::<u8>()),
        };
        assert!(!not_found.is::<Boom>());
        assert_eq!(not_found.to_string(), "no event handler for u8 registered");
    }

    #[test]
    fn test_nested_dispatch_error_is_found() {
        // A handler that forwards an inner dispatch failure keeps the inner cause reachable.
        let inner = Error::from(HandlerError::new(Some("inner".into()), Boom(6)));
        let outer = HandlerError::new(Some("outer".into()), inner);
        assert!(outer.wraps(&Boom(6)));
        assert_eq!(outer.to_string(), "outer: inner: boom 6");
    }
}
