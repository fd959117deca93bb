//! # Interceptors around request dispatch.
//!
//! Interceptors apply to `send` only; `notify` is never intercepted.
//!
//! ## Contents
//! - [`Interceptor`], [`Next`] - the wrapper contract and its continuation
//! - [`Payload`] - type-erased request/response inside the chain
//! - [`interceptor_fn`], [`InterceptorFn`] - closure-backed interceptors
//! - `LogInterceptor` - tracing-based request logger (feature `logging`)
//!
//! Values are opaque inside the chain and are narrowed back to the concrete request
//! and response types at its boundary; a mismatch becomes
//! [`Error::Unmarshal`](crate::Error::Unmarshal).

mod chain;
mod interceptor;
mod payload;

#[cfg(feature = "logging")]
mod log;

pub(crate) use chain::Chain;
pub use interceptor::{interceptor_fn, Interceptor, InterceptorFn, Next};
pub use payload::Payload;

#[cfg(feature = "logging")]
pub use log::LogInterceptor;
