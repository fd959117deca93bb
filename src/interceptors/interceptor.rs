//! # Interceptor trait and chain continuation.
//!
//! An [`Interceptor`] wraps every `send` dispatched by a registry. It receives the
//! context, the type-erased request and a [`Next`] continuation, and decides whether
//! (and with what) to continue:
//!
//! ```text
//! send(req) ──► A.intercept ──► B.intercept ──► handler
//!                  pre-A           pre-B          │
//!                  post-A ◄─────── post-B ◄───────┘
//! ```
//!
//! ## Rules
//! - Interceptors run in registration order; the first added is outermost.
//! - Not calling [`Next::run`] short-circuits the rest of the chain and the handler.
//! - The context and request passed to `next` may be replaced; so may the result.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::context::Context;
use crate::error::BoxError;
use crate::interceptors::Payload;

/// Terminal step of a chain: the type-erased handler invocation.
pub(crate) type Invoke =
    dyn Fn(Context, Payload) -> BoxFuture<'static, Result<Payload, BoxError>> + Send + Sync;

/// # Cross-cutting wrapper around request dispatch.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use typemob::{BoxError, Context, Interceptor, Next, Payload};
///
/// struct RejectEmpty;
///
/// #[async_trait]
/// impl Interceptor for RejectEmpty {
///     async fn intercept(&self, ctx: Context, req: Payload, next: Next<'_>) -> Result<Payload, BoxError> {
///         if req.downcast_ref::<String>().is_some_and(|s| s.is_empty()) {
///             return Err("empty request".into());
///         }
///         next.run(ctx, req).await
///     }
/// }
/// ```
#[async_trait]
pub trait Interceptor: Send + Sync + 'static {
    /// Handles one `send`, optionally delegating to `next`.
    async fn intercept(
        &self,
        ctx: Context,
        req: Payload,
        next: Next<'_>,
    ) -> Result<Payload, BoxError>;
}

#[async_trait]
impl<I> Interceptor for Arc<I>
where
    I: Interceptor + ?Sized,
{
    async fn intercept(
        &self,
        ctx: Context,
        req: Payload,
        next: Next<'_>,
    ) -> Result<Payload, BoxError> {
        (**self).intercept(ctx, req, next).await
    }
}

/// Continuation handed to an interceptor: the remaining interceptors plus the handler.
pub struct Next<'a> {
    rest: &'a [Arc<dyn Interceptor>],
    invoke: &'a Invoke,
}

impl<'a> Next<'a> {
    pub(crate) fn new(rest: &'a [Arc<dyn Interceptor>], invoke: &'a Invoke) -> Self {
        Self { rest, invoke }
    }

    /// Invokes the next interceptor, or the handler when none is left.
    pub async fn run(self, ctx: Context, req: Payload) -> Result<Payload, BoxError> {
        match self.rest.split_first() {
            Some((head, rest)) => head.intercept(ctx, req, Next::new(rest, self.invoke)).await,
            None => (self.invoke)(ctx, req).await,
        }
    }

    /// Number of interceptors still ahead of the handler.
    pub fn remaining(&self) -> usize {
        self.rest.len()
    }
}

/// Interceptor backed by a closure; build it with [`interceptor_fn`].
pub struct InterceptorFn<F> {
    f: F,
}

/// Wraps a closure as an [`Interceptor`].
///
/// ```
/// use typemob::{interceptor_fn, Registry};
///
/// let registry = Registry::new();
/// registry.add_interceptor(interceptor_fn(|ctx, req, next| {
///     Box::pin(async move { next.run(ctx, req).await })
/// }));
/// assert_eq!(registry.interceptor_count(), 1);
/// ```
pub fn interceptor_fn<F>(f: F) -> InterceptorFn<F>
where
    F: for<'a> Fn(Context, Payload, Next<'a>) -> BoxFuture<'a, Result<Payload, BoxError>>
        + Send
        + Sync
        + 'static,
{
    InterceptorFn { f }
}

#[async_trait]
impl<F> Interceptor for InterceptorFn<F>
where
    F: for<'a> Fn(Context, Payload, Next<'a>) -> BoxFuture<'a, Result<Payload, BoxError>>
        + Send
        + Sync
        + 'static,
{
    async fn intercept(
        &self,
        ctx: Context,
        req: Payload,
        next: Next<'_>,
    ) -> Result<Payload, BoxError> {
        (self.f)(ctx, req, next).await
    }
}
