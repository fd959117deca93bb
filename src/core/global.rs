//! # Process-wide default registry.
//!
//! The free functions re-exported at the crate root operate on one lazily created
//! [`Registry`] labelled `"default"`. Code that needs isolation (tests, plugins) should
//! create its own [`Registry`] instead; the two never share handlers.

use std::sync::LazyLock;

use crate::context::Context;
use crate::core::config::RegistryConfig;
use crate::core::registry::Registry;
use crate::error::Result;
use crate::handlers::{EventHandler, Options, RequestHandler};
use crate::interceptors::Interceptor;

static DEFAULT: LazyLock<Registry> =
    LazyLock::new(|| Registry::with_config(RegistryConfig::labeled("default")));

/// Returns the process-wide registry used by the crate-level free functions.
pub fn default_registry() -> &'static Registry {
    &DEFAULT
}

/// [`Registry::register_request_handler`] on the default registry.
pub fn register_request_handler<Req, Res, H>(handler: H) -> Result<()>
where
    Req: Send + 'static,
    Res: Send + 'static,
    H: RequestHandler<Req, Res>,
{
    DEFAULT.register_request_handler(handler)
}

/// [`Registry::register_request_handler_with`] on the default registry.
pub fn register_request_handler_with<Req, Res, H>(handler: H, opts: Options) -> Result<()>
where
    Req: Send + 'static,
    Res: Send + 'static,
    H: RequestHandler<Req, Res>,
{
    DEFAULT.register_request_handler_with(handler, opts)
}

/// [`Registry::register_event_handler`] on the default registry.
pub fn register_event_handler<E, H>(handler: H) -> Result<()>
where
    E: Send + Sync + 'static,
    H: EventHandler<E>,
{
    DEFAULT.register_event_handler(handler)
}

/// [`Registry::register_event_handler_with`] on the default registry.
pub fn register_event_handler_with<E, H>(handler: H, opts: Options) -> Result<()>
where
    E: Send + Sync + 'static,
    H: EventHandler<E>,
{
    DEFAULT.register_event_handler_with(handler, opts)
}

/// [`Registry::add_interceptor`] on the default registry.
pub fn add_interceptor<I: Interceptor>(interceptor: I) {
    DEFAULT.add_interceptor(interceptor);
}

/// [`Registry::send`] on the default registry.
pub async fn send<Req, Res>(ctx: Context, req: Req) -> Result<Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    DEFAULT.send(ctx, req).await
}

/// [`Registry::notify`] on the default registry.
pub async fn notify<E>(ctx: Context, event: E) -> Result<()>
where
    E: Send + Sync + 'static,
{
    DEFAULT.notify(ctx, event).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BoxError, Error};
    use crate::handlers::{with_name, EventHandlerFn, RequestHandlerFn};
    use crate::interceptors::interceptor_fn;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    // Types private to this module, so the shared registry cannot collide with other tests.
    #[derive(Clone, Debug)]
    struct Ping(u32);
    #[derive(Debug, PartialEq)]
    struct Pong(u32);
    #[derive(Clone, Debug)]
    struct Tick;

    #[tokio::test]
    async fn test_default_registry_free_functions() {
        assert_eq!(default_registry().config().label, "default");

        register_request_handler_with(
            RequestHandlerFn::new(|_ctx: Context, p: Ping| async move { Ok::<_, BoxError>(Pong(p.0 + 1)) }),
            with_name("ping"),
        )
        .unwrap();
        let err = register_request_handler(RequestHandlerFn::new(|_ctx: Context, p: Ping| async move {
            Ok::<_, BoxError>(Pong(p.0))
        }))
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateHandler { .. }));

        let pong: Pong = send(Context::new(), Ping(1)).await.unwrap();
        assert_eq!(pong, Pong(2));
        assert!(default_registry().has_request_handler::<Ping, Pong>());
        assert!(!Registry::new().has_request_handler::<Ping, Pong>(), "fresh registries are isolated");

        let ticks = Arc::new(AtomicUsize::new(0));
        for _ in 0..2 {
            let ticks = ticks.clone();
            register_event_handler(EventHandlerFn::new(move |_ctx: Context, _t: Tick| {
                let ticks = ticks.clone();
                async move {
                    ticks.fetch_add(1, Ordering::SeqCst);
                    Ok::<(), BoxError>(())
                }
            }))
            .unwrap();
        }
        notify(Context::new(), Tick).await.unwrap();
        assert_eq!(ticks.load(Ordering::SeqCst), 2);
    }

    #[derive(Debug)]
    struct Shout(String);

    #[tokio::test]
    async fn test_default_registry_interceptor() {
        let before = default_registry().interceptor_count();
        register_request_handler(RequestHandlerFn::new(|_ctx: Context, s: Shout| async move {
            Ok::<_, BoxError>(s.0)
        }))
        .unwrap();

        // Upper-cases `Shout` requests; everything else passes through untouched.
        add_interceptor(interceptor_fn(|ctx, mut req, next| {
            Box::pin(async move {
                if let Some(shout) = req.downcast_mut::<Shout>() {
                    shout.0 = shout.0.to_uppercase();
                }
                next.run(ctx, req).await
            })
        }));
        assert!(default_registry().interceptor_count() > before);

        let out: String = send(Context::new(), Shout("hey".into())).await.unwrap();
        assert_eq!(out, "HEY");
    }
}
