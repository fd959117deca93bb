//! # Dispatch context.
//!
//! [`Context`] travels with every `send`/`notify` call into interceptors and handlers.
//! It carries:
//! - a [`CancellationToken`] that handlers may observe to stop cooperatively;
//! - an immutable set of typed values that interceptors attach for downstream code.
//!
//! The dispatcher never observes cancellation itself: a cancelled context is advisory.
//!
//! ## Example
//! ```rust
//! use typemob::Context;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct RequestId(u64);
//!
//! let ctx = Context::new();
//! let traced = ctx.with_value(RequestId(7));
//!
//! assert_eq!(traced.value::<RequestId>(), Some(&RequestId(7)));
//! assert!(ctx.value::<RequestId>().is_none()); // the parent is unchanged
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

type Values = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

/// Cancellation signal plus typed values, passed to every handler.
///
/// Cheap to clone: the token and the value set are shared.
#[derive(Clone, Default)]
pub struct Context {
    token: CancellationToken,
    values: Arc<Values>,
}

impl Context {
    /// Creates an empty, non-cancelled context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context driven by an existing cancellation token.
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            values: Arc::default(),
        }
    }

    /// Returns a copy of this context with `value` attached.
    ///
    /// A value of the same type attached earlier is shadowed in the copy only.
    #[must_use]
    pub fn with_value<T: Send + Sync + 'static>(&self, value: T) -> Self {
        let mut values = Values::clone(&self.values);
        values.insert(TypeId::of::<T>(), Arc::new(value));
        Self {
            token: self.token.clone(),
            values: Arc::new(values),
        }
    }

    /// Returns the attached value of type `T`, if any.
    pub fn value<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref::<T>())
    }

    /// Returns a context whose token is a child of this one.
    ///
    /// Cancelling the child does not cancel the parent; values are inherited.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            values: Arc::clone(&self.values),
        }
    }

    /// Cancels this context (and every child).
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns `true` once the context is cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes when the context is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// Underlying cancellation token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("cancelled", &self.token.is_cancelled())
            .field("values", &self.values.len())
            .finish()
    }
}
