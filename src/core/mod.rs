//! Registry core: storage, dispatch and the process-wide default instance.
//!
//! The public API from this module is [`Registry`] (with its [`RegistryConfig`]),
//! the typed [`RequestSender`] facade, and the free functions bound to
//! [`default_registry`].
//!
//! Internal modules:
//! - [`registry`]: handler maps, interceptor chain, registration rules;
//! - [`send`]: single-handler request dispatch through the interceptor chain;
//! - [`notify`]: concurrent event fan-out with error aggregation;
//! - [`global`]: lazily created default registry and its free functions;
//! - [`config`]: per-registry settings.

mod config;
mod global;
mod notify;
mod registry;
mod send;

pub use config::RegistryConfig;
pub use global::{
    add_interceptor, default_registry, notify, register_event_handler,
    register_event_handler_with, register_request_handler, register_request_handler_with,
    send,
};
pub use registry::Registry;
pub use send::RequestSender;
