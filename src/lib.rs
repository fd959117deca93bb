//! # typemob
//!
//! **Typemob** is an in-process, type-indexed mediator and observer for async Rust.
//!
//! Components talk to each other by *type* instead of by name or reference:
//! - a **request** of type `Req` expecting a `Res` goes to the single handler
//!   registered for the `(Req, Res)` pair (`send`);
//! - an **event** of type `E` is broadcast to every handler registered for `E`
//!   (`notify`), concurrently, with all failures collected.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  caller                                   Registry
//!    │                     ┌───────────────────────────────────────────────┐
//!    │ send::<Req, Res>    │ requests: (Req, Res) ──► RequestRecord        │
//!    ├────────────────────►│ chain:    [Interceptor A, Interceptor B, ...] │
//!    │                     │ events:   E ──► [EventRecord, EventRecord...] │
//!    │ notify::<E>         └───────┬───────────────────────┬───────────────┘
//!    ├─────────────────────────────┼───────────────┐       │
//!    │                             ▼               │       ▼
//!    │              A ──► B ──► RequestHandler     │   snapshot handlers
//!    │              (caller's task, in sequence)   │       │
//!    │                                             │   ┌───┴────┬────────┐
//!    │                                             │   ▼        ▼        ▼
//!    │                                             │ task 1   task 2   task N
//!    │                                             │   └───┬────┴────────┘
//!    │                                             │       ▼
//!    │◄──────────────── Result<Res> ───────────────┘  [mpsc] ──► AggregateError
//! ```
//!
//! ### Dispatch rules
//! ```text
//! send:    lookup (Req, Res) ─► missing?  HandlerNotFound
//!                            ─► chain ─► handler ─► Ok(Res) | Handler(name: cause)
//!
//! notify:  lookup E ─► missing? HandlerNotFound
//!                   ─► run all ─► 0 failed: Ok(())
//!                              ─► k failed: Aggregate([name: cause; ...])
//! ```
//!
//! ## Features
//! | Area              | Description                                                       | Key types / traits                             |
//! |-------------------|-------------------------------------------------------------------|------------------------------------------------|
//! | **Registry**      | Type-keyed handler maps, default instance, introspection.         | [`Registry`], [`default_registry`]             |
//! | **Handlers**      | Request/event contracts and closure adapters.                     | [`RequestHandler`], [`EventHandler`], [`RequestHandlerFn`], [`EventHandlerFn`] |
//! | **Interceptors**  | Ordered middleware around `send`.                                 | [`Interceptor`], [`Next`], [`interceptor_fn`]  |
//! | **Context**       | Cancellation token plus typed values for handlers.                | [`Context`]                                    |
//! | **Errors**        | Typed dispatch errors, named handler failures, aggregates.        | [`Error`], [`HandlerError`], [`AggregateError`]|
//! | **Configuration** | Per-registry label and panic isolation.                           | [`RegistryConfig`]                             |
//!
//! ## Optional features
//! - `logging`: exports a ready-made [`LogInterceptor`] that records every `send` with
//!   `tracing` _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use typemob::{with_name, BoxError, Context, EventHandlerFn, Registry, RequestHandlerFn};
//!
//! #[derive(Clone, Debug)]
//! struct UserCreated { id: u64 }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), typemob::Error> {
//!     let registry = Registry::new();
//!
//!     // Request/response: exactly one handler per (Req, Res).
//!     registry.register_request_handler_with(
//!         RequestHandlerFn::new(|_ctx: Context, id: u64| async move {
//!             Ok::<_, BoxError>(format!("user-{id}"))
//!         }),
//!         with_name("users"),
//!     )?;
//!     let name: String = registry.send(Context::new(), 7u64).await?;
//!     assert_eq!(name, "user-7");
//!
//!     // Events: any number of observers.
//!     registry.register_event_handler(EventHandlerFn::new(|_ctx: Context, ev: UserCreated| async move {
//!         println!("welcome mail for {}", ev.id);
//!         Ok::<(), BoxError>(())
//!     }))?;
//!     registry.notify(Context::new(), UserCreated { id: 7 }).await?;
//!     Ok(())
//! }
//! ```
mod context;
mod core;
mod error;
mod handlers;
mod interceptors;
mod key;

// ---- Public re-exports ----

pub use context::Context;
pub use self::core::{
    add_interceptor, default_registry, notify, register_event_handler,
    register_event_handler_with, register_request_handler, register_request_handler_with,
    send, Registry, RegistryConfig, RequestSender,
};
pub use error::{AggregateError, BoxError, Error, HandlerError, HandlerPanicked, Result, Side};
pub use handlers::{
    with_name, EventHandler, EventHandlerFn, Options, RequestHandler, RequestHandlerFn,
};
pub use interceptors::{interceptor_fn, Interceptor, InterceptorFn, Next, Payload};
pub use key::{RequestKey, Slot, TypeKey};

// Optional: expose a ready-made logging interceptor (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use interceptors::LogInterceptor;
