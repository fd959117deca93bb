//! # Request dispatch (`send`).
//!
//! ```text
//! send::<Req, Res>(ctx, req)
//!   ├─► lookup (Req, Res)            ── missing ──► Error::HandlerNotFound
//!   ├─ chain empty ─► handler.handle(ctx, req)
//!   └─ chain present:
//!        Payload(req) ─► interceptors ─► terminal: narrow to Req ─► handler.handle
//!        result payload ─► narrow to Res          ── mismatch ──► Error::Unmarshal
//! ```
//!
//! `send` runs entirely on the caller's task and never spawns. Handler and interceptor
//! errors are qualified with the handler's display name. Only the `Unmarshal` errors this
//! dispatcher raises at the chain boundary are returned as-is; an `Unmarshal` coming out
//! of a handler (e.g. from a nested `send`) is that handler's error like any other.

use std::any::type_name;
use std::marker::PhantomData;
use std::sync::Arc;

use futures::future::BoxFuture;
use thiserror::Error as ThisError;
use tracing::trace;

use crate::context::Context;
use crate::core::registry::{Registry, RequestRecord};
use crate::error::{BoxError, Error, HandlerError, Result, Side};
use crate::interceptors::Payload;
use crate::key::{RequestKey, Slot};

impl Registry {
    /// Sends `req` to the handler registered for `(Req, Res)` and returns its response.
    ///
    /// `Res` is chosen by the caller (usually through the binding's type annotation); it
    /// is part of the lookup key, not inferred from any value.
    ///
    /// # Errors
    /// - [`Error::HandlerNotFound`] if no handler serves `(Req, Res)`
    /// - [`Error::Handler`] if the handler or an interceptor failed
    /// - [`Error::Unmarshal`] if an interceptor swapped the request or response for a
    ///   value of another type
    pub async fn send<Req, Res>(&self, ctx: Context, req: Req) -> Result<Res>
    where
        Req: Send + 'static,
        Res: Send + 'static,
    {
        let record = self
            .request_record::<Req, Res>()
            .ok_or_else(|| Error::HandlerNotFound {
                slot: Slot::Request(RequestKey::of::<Req, Res>()),
            })?;
        let chain = self.chain();

        trace!(
            registry = %self.config.label,
            request = type_name::<Req>(),
            response = type_name::<Res>(),
            interceptors = chain.len(),
            "send"
        );

        if chain.is_empty() {
            return record
                .handler
                .handle(ctx, req)
                .await
                .map_err(|cause| qualify(&record, cause));
        }

        let handler = Arc::clone(&record.handler);
        let invoke = move |ctx: Context, payload: Payload| -> BoxFuture<'static, Result<Payload, BoxError>> {
            let handler = Arc::clone(&handler);
            Box::pin(async move {
                let req = payload.downcast::<Req>().map_err(|other| {
                    RequestMismatch(Error::Unmarshal {
                        side: Side::Request,
                        expected: type_name::<Req>(),
                        actual: other.type_name(),
                    })
                })?;
                let res = handler.handle(ctx, req).await?;
                Ok::<_, BoxError>(Payload::new(res))
            })
        };

        let out = chain
            .invoke(ctx, Payload::new(req), &invoke)
            .await
            .map_err(|cause| qualify(&record, cause))?;

        out.downcast::<Res>().map_err(|other| Error::Unmarshal {
            side: Side::Response,
            expected: type_name::<Res>(),
            actual: other.type_name(),
        })
    }

    /// Returns a sender bound to this registry for the `(Req, Res)` pair.
    pub fn sender<Req, Res>(&self) -> RequestSender<'_, Req, Res>
    where
        Req: Send + 'static,
        Res: Send + 'static,
    {
        RequestSender {
            registry: self,
            _types: PhantomData,
        }
    }
}

/// Request-side narrowing failure raised by the chain terminal.
///
/// Only this module constructs it, so [`qualify`] can tell it apart from an `Unmarshal`
/// returned by a handler.
#[derive(ThisError, Debug)]
#[error(transparent)]
struct RequestMismatch(Error);

/// Wraps a handler-side failure with the handler's display name.
fn qualify<Req, Res>(record: &RequestRecord<Req, Res>, cause: BoxError) -> Error
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    match cause.downcast::<RequestMismatch>() {
        Ok(mismatch) => mismatch.0,
        Err(cause) => Error::Handler(HandlerError::new(record.name.clone(), cause)),
    }
}

/// # Typed facade for one `(Req, Res)` pair.
///
/// Useful when the same request type is sent from many places: the response type is
/// fixed once instead of at every call site.
///
/// ```
/// use typemob::{BoxError, Context, Registry, RequestHandlerFn};
///
/// # async fn demo() -> Result<(), typemob::Error> {
/// let registry = Registry::new();
/// registry.register_request_handler(RequestHandlerFn::new(|_ctx: Context, n: u8| async move {
///     Ok::<_, BoxError>(n.to_string())
/// }))?;
///
/// let to_text = registry.sender::<u8, String>();
/// assert_eq!(to_text.send(Context::new(), 7).await?, "7");
/// # Ok(())
/// # }
/// ```
pub struct RequestSender<'r, Req, Res> {
    registry: &'r Registry,
    _types: PhantomData<fn(Req) -> Res>,
}

impl<Req, Res> RequestSender<'_, Req, Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    /// Same as [`Registry::send`] for this sender's pair.
    pub async fn send(&self, ctx: Context, req: Req) -> Result<Res> {
        self.registry.send::<Req, Res>(ctx, req).await
    }
}

impl<Req, Res> Clone for RequestSender<'_, Req, Res> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Req, Res> Copy for RequestSender<'_, Req, Res> {}
