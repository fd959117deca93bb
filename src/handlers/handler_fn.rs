//! # Function-backed handlers.
//!
//! [`RequestHandlerFn`] and [`EventHandlerFn`] wrap closures that *create* a new future
//! per call, so plain functions can be registered without a dedicated type.
//!
//! ## Example
//! ```rust
//! use typemob::{BoxError, Context, RequestHandlerFn, Registry};
//!
//! # async fn demo() -> Result<(), typemob::Error> {
//! let registry = Registry::new();
//! registry.register_request_handler(RequestHandlerFn::new(|_ctx: Context, n: u32| async move {
//!     Ok::<_, BoxError>(u64::from(n) * 2)
//! }))?;
//!
//! let doubled: u64 = registry.send(Context::new(), 21u32).await?;
//! assert_eq!(doubled, 42);
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::Context;
use crate::error::BoxError;
use crate::handlers::{EventHandler, RequestHandler};

/// Request handler backed by `Fn(Context, Req) -> impl Future<Output = Result<Res, BoxError>>`.
pub struct RequestHandlerFn<F, Req, Res> {
    f: F,
    _types: PhantomData<fn(Req) -> Res>,
}

impl<F, Req, Res, Fut> RequestHandlerFn<F, Req, Res>
where
    F: Fn(Context, Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Res, BoxError>> + Send + 'static,
{
    /// Wraps `f` as a request handler.
    pub fn new(f: F) -> Self {
        Self {
            f,
            _types: PhantomData,
        }
    }

    /// Wraps `f` and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Req, Res, Fut> RequestHandler<Req, Res> for RequestHandlerFn<F, Req, Res>
where
    F: Fn(Context, Req) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<Res, BoxError>> + Send + 'static,
    Req: Send + 'static,
    Res: Send + 'static,
{
    async fn handle(&self, ctx: Context, req: Req) -> Result<Res, BoxError> {
        (self.f)(ctx, req).await
    }
}

/// Event handler backed by `Fn(Context, E) -> impl Future<Output = Result<(), BoxError>>`.
///
/// Every call receives its own clone of the event, so the closure's future owns it.
pub struct EventHandlerFn<F, E> {
    f: F,
    _event: PhantomData<fn(E)>,
}

impl<F, E, Fut> EventHandlerFn<F, E>
where
    F: Fn(Context, E) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    /// Wraps `f` as an event handler.
    pub fn new(f: F) -> Self {
        Self {
            f,
            _event: PhantomData,
        }
    }

    /// Wraps `f` and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, E, Fut> EventHandler<E> for EventHandlerFn<F, E>
where
    F: Fn(Context, E) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    E: Clone + Send + Sync + 'static,
{
    async fn handle(&self, ctx: Context, event: &E) -> Result<(), BoxError> {
        (self.f)(ctx, event.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_request_fn_produces_fresh_future_per_call() {
        let h = RequestHandlerFn::new(|_ctx: Context, n: i32| async move { Ok::<_, BoxError>(n + 1) });
        assert_eq!(h.handle(Context::new(), 1).await.unwrap(), 2);
        assert_eq!(h.handle(Context::new(), 41).await.unwrap(), 42);
        assert!(RequestHandler::<i32, i32>::is_valid(&h));
    }

    #[tokio::test]
    async fn test_event_fn_receives_owned_clone() {
        let h = EventHandlerFn::new(|_ctx: Context, ev: String| async move {
            if ev.is_empty() {
                Err::<(), BoxError>("empty".into())
            } else {
                Ok(())
            }
        });
        assert!(h.handle(Context::new(), &"x".to_string()).await.is_ok());
        let err = h.handle(Context::new(), &String::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "empty");
    }
}
