//! # Request handler abstraction.
//!
//! A [`RequestHandler<Req, Res>`] answers exactly one `(Req, Res)` pair. A registry
//! holds at most one handler per pair; the pair is the lookup key, so there is no name
//! or route to configure.
//!
//! Smart pointers forward to the pointee: `Arc<H>`, `Box<H>` and `Option<H>` are handlers
//! whenever `H` is. `None` is the empty handler reference and fails
//! [`is_valid`](RequestHandler::is_valid), which makes registration reject it.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::Context;
use crate::error::{BoxError, Error};
use crate::key::{RequestKey, Slot};

/// # Single handler for a `(Req, Res)` pair.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use typemob::{BoxError, Context, RequestHandler};
///
/// struct Upper;
///
/// #[async_trait]
/// impl RequestHandler<String, String> for Upper {
///     async fn handle(&self, _ctx: Context, req: String) -> Result<String, BoxError> {
///         Ok(req.to_uppercase())
///     }
/// }
/// ```
#[async_trait]
pub trait RequestHandler<Req, Res>: Send + Sync + 'static
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    /// Produces the response for `req`.
    ///
    /// Errors are returned to the `send` caller, qualified with the handler's display name.
    async fn handle(&self, ctx: Context, req: Req) -> Result<Res, BoxError>;

    /// Returns `false` when this reference holds no underlying handler.
    ///
    /// Invalid handlers are rejected at registration with [`Error::InvalidHandler`].
    fn is_valid(&self) -> bool {
        true
    }
}

#[async_trait]
impl<Req, Res, H> RequestHandler<Req, Res> for Arc<H>
where
    Req: Send + 'static,
    Res: Send + 'static,
    H: RequestHandler<Req, Res> + ?Sized,
{
    async fn handle(&self, ctx: Context, req: Req) -> Result<Res, BoxError> {
        (**self).handle(ctx, req).await
    }

    fn is_valid(&self) -> bool {
        (**self).is_valid()
    }
}

#[async_trait]
impl<Req, Res, H> RequestHandler<Req, Res> for Box<H>
where
    Req: Send + 'static,
    Res: Send + 'static,
    H: RequestHandler<Req, Res> + ?Sized,
{
    async fn handle(&self, ctx: Context, req: Req) -> Result<Res, BoxError> {
        (**self).handle(ctx, req).await
    }

    fn is_valid(&self) -> bool {
        (**self).is_valid()
    }
}

#[async_trait]
impl<Req, Res, H> RequestHandler<Req, Res> for Option<H>
where
    Req: Send + 'static,
    Res: Send + 'static,
    H: RequestHandler<Req, Res>,
{
    async fn handle(&self, ctx: Context, req: Req) -> Result<Res, BoxError> {
        match self {
            Some(handler) => handler.handle(ctx, req).await,
            None => Err(Error::InvalidHandler {
                slot: Slot::Request(RequestKey::of::<Req, Res>()),
            }
            .into()),
        }
    }

    fn is_valid(&self) -> bool {
        self.as_ref()
            .is_some_and(|handler| RequestHandler::<Req, Res>::is_valid(handler))
    }
}
