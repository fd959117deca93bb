//! # Event handler abstraction.
//!
//! Any number of [`EventHandler<E>`]s may observe the same event type. `notify` runs
//! every one of them concurrently, each on its own task, and hands them a shared
//! reference to the same event value.
//!
//! As with request handlers, `Arc<H>`, `Box<H>` and `Option<H>` forward to the pointee
//! and `None` is rejected at registration.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::Context;
use crate::error::{BoxError, Error};
use crate::key::{Slot, TypeKey};

/// # Observer of events of type `E`.
///
/// ### Implementation requirements
/// - Runs on a spawned task; avoid blocking the executor.
/// - Return an error to have it reported in the `notify` aggregate; siblings keep running.
/// - Check [`Context::is_cancelled`] for long work: the dispatcher never aborts handlers.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use typemob::{BoxError, Context, EventHandler};
///
/// struct UserCreated { id: u64 }
/// struct Audit;
///
/// #[async_trait]
/// impl EventHandler<UserCreated> for Audit {
///     async fn handle(&self, _ctx: Context, ev: &UserCreated) -> Result<(), BoxError> {
///         let _ = ev.id;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait EventHandler<E>: Send + Sync + 'static
where
    E: Send + Sync + 'static,
{
    /// Reacts to `event`.
    async fn handle(&self, ctx: Context, event: &E) -> Result<(), BoxError>;

    /// Returns `false` when this reference holds no underlying handler.
    fn is_valid(&self) -> bool {
        true
    }
}

#[async_trait]
impl<E, H> EventHandler<E> for Arc<H>
where
    E: Send + Sync + 'static,
    H: EventHandler<E> + ?Sized,
{
    async fn handle(&self, ctx: Context, event: &E) -> Result<(), BoxError> {
        (**self).handle(ctx, event).await
    }

    fn is_valid(&self) -> bool {
        (**self).is_valid()
    }
}

#[async_trait]
impl<E, H> EventHandler<E> for Box<H>
where
    E: Send + Sync + 'static,
    H: EventHandler<E> + ?Sized,
{
    async fn handle(&self, ctx: Context, event: &E) -> Result<(), BoxError> {
        (**self).handle(ctx, event).await
    }

    fn is_valid(&self) -> bool {
        (**self).is_valid()
    }
}

#[async_trait]
impl<E, H> EventHandler<E> for Option<H>
where
    E: Send + Sync + 'static,
    H: EventHandler<E>,
{
    async fn handle(&self, ctx: Context, event: &E) -> Result<(), BoxError> {
        match self {
            Some(handler) => handler.handle(ctx, event).await,
            None => Err(Error::InvalidHandler {
                slot: Slot::Event(TypeKey::of::<E>()),
            }
            .into()),
        }
    }

    fn is_valid(&self) -> bool {
        self.as_ref()
            .is_some_and(|handler| EventHandler::<E>::is_valid(handler))
    }
}
